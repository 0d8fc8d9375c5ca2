use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::domain::{Poll, PollId, RespondentId};
use super::store::{RespondentRecord, RespondentStore, StoreError};

/// Externally visible representation of a poll and everyone who answered it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollView {
    pub id: PollId,
    pub title: String,
    pub end_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    pub choices: Vec<String>,
    pub start_date: DateTime<Utc>,
    pub respondents: Vec<RespondentView>,
}

impl PollView {
    pub fn respondent(&self, id: RespondentId) -> Option<&RespondentView> {
        self.respondents
            .iter()
            .find(|entry| entry.identifier == id)
    }
}

/// One respondent's contribution. Serialized with `answer-N` keys for each answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RespondentView {
    pub identifier: RespondentId,
    pub choices: Vec<String>,
    pub answers: Vec<String>,
}

impl Serialize for RespondentView {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut len = 1 + self.answers.len();
        if !self.choices.is_empty() {
            len += 1;
        }

        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("identifier", &self.identifier)?;
        if !self.choices.is_empty() {
            map.serialize_entry("choices", &self.choices)?;
        }
        for (index, answer) in self.answers.iter().enumerate() {
            map.serialize_entry(&format!("answer-{index}"), answer)?;
        }
        map.end()
    }
}

/// Builds [`PollView`]s from a read-only snapshot of the respondent store.
pub struct AggregationReporter<S> {
    store: Arc<S>,
}

impl<S> AggregationReporter<S>
where
    S: RespondentStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn build_view(&self, poll: &Poll) -> Result<PollView, StoreError> {
        let records = self.store.snapshot(poll.id)?;
        Ok(assemble(poll, records))
    }
}

fn assemble(poll: &Poll, records: Vec<RespondentRecord>) -> PollView {
    let allowed = poll.schema().allowed_choices();
    let respondents = records
        .into_iter()
        .filter_map(|record| {
            let choices: Vec<String> = record
                .choices
                .into_iter()
                .filter(|label| allowed.contains(label.as_str()))
                .collect();
            if choices.is_empty() && record.answers.is_empty() {
                return None;
            }
            Some(RespondentView {
                identifier: record.respondent,
                choices,
                answers: record.answers,
            })
        })
        .collect();

    PollView {
        id: poll.id,
        title: poll.title.clone(),
        end_date: poll.end_date,
        question: poll.question.clone(),
        choices: poll.choices.clone(),
        start_date: poll.start_date,
        respondents,
    }
}
