use chrono::{DateTime, Duration, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use pollbox::config::PollsConfig;
use pollbox::error::AppError;
use pollbox::polls::{CatalogError, Poll, PollCatalog, PollId};
use std::collections::BTreeMap;
use std::fs;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Poll catalog loaded once at startup, standing in for the administrative database.
#[derive(Default)]
pub(crate) struct InMemoryPollCatalog {
    polls: BTreeMap<PollId, Poll>,
}

impl InMemoryPollCatalog {
    pub(crate) fn from_polls(polls: Vec<Poll>) -> Self {
        Self {
            polls: polls.into_iter().map(|poll| (poll.id, poll)).collect(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.polls.len()
    }
}

impl PollCatalog for InMemoryPollCatalog {
    fn fetch(&self, id: PollId) -> Result<Option<Poll>, CatalogError> {
        Ok(self.polls.get(&id).cloned())
    }

    fn list(&self) -> Result<Vec<Poll>, CatalogError> {
        Ok(self.polls.values().cloned().collect())
    }
}

/// Loads the seed file when configured, else the built-in demo polls.
pub(crate) fn load_catalog(
    config: &PollsConfig,
    now: DateTime<Utc>,
) -> Result<InMemoryPollCatalog, AppError> {
    let polls = match &config.seed_path {
        Some(path) => {
            let raw = fs::read_to_string(path)?;
            let polls = parse_seed(&raw)?;
            info!(path = %path.display(), count = polls.len(), "loaded poll seed file");
            polls
        }
        None => demo_polls(now),
    };
    Ok(InMemoryPollCatalog::from_polls(polls))
}

/// Parses a JSON array of polls, rejecting polls that repeat a choice label.
pub(crate) fn parse_seed(raw: &str) -> Result<Vec<Poll>, AppError> {
    let polls: Vec<Poll> = serde_json::from_str(raw)?;
    if let Some((poll, label)) = polls
        .iter()
        .find_map(|poll| poll.duplicate_choice().map(|label| (poll.id, label)))
    {
        return Err(AppError::DuplicateChoice {
            poll,
            label: label.to_string(),
        });
    }
    Ok(polls)
}

/// One choice-type and one free-form poll, both open for a week from `now`.
pub(crate) fn demo_polls(now: DateTime<Utc>) -> Vec<Poll> {
    vec![
        Poll {
            id: PollId(1),
            title: "Team lunch".to_string(),
            question: None,
            start_date: now,
            end_date: now + Duration::days(7),
            choices: vec![
                "Pizza".to_string(),
                "Sushi".to_string(),
                "Tacos".to_string(),
            ],
        },
        Poll {
            id: PollId(2),
            title: "Office feedback".to_string(),
            question: Some("What one thing would improve the office?".to_string()),
            start_date: now,
            end_date: now + Duration::days(7),
            choices: Vec::new(),
        },
    ]
}
