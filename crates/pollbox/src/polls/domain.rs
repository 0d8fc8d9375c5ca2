use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier assigned to a poll by the administrative catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PollId(pub u64);

impl fmt::Display for PollId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Client-held identifier that keeps an anonymous respondent stable across visits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RespondentId(pub Uuid);

impl RespondentId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for RespondentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A timed poll as configured by the administrative collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Poll {
    pub id: PollId,
    pub title: String,
    #[serde(default)]
    pub question: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    /// Ordered, unique choice labels. Empty for free-form polls.
    #[serde(default)]
    pub choices: Vec<String>,
}

impl Poll {
    pub fn schema(&self) -> PollSchema<'_> {
        PollSchema { poll: self }
    }

    /// First label configured more than once, if any.
    pub fn duplicate_choice(&self) -> Option<&str> {
        let mut seen = BTreeSet::new();
        self.choices
            .iter()
            .map(String::as_str)
            .find(|label| !seen.insert(*label))
    }
}

/// Whether a poll collects selections or free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PollKind {
    Choice,
    FreeForm,
}

/// Read-only view of the voting configuration of a poll.
#[derive(Debug, Clone, Copy)]
pub struct PollSchema<'a> {
    poll: &'a Poll,
}

impl<'a> PollSchema<'a> {
    pub fn kind(&self) -> PollKind {
        if self.poll.choices.is_empty() {
            PollKind::FreeForm
        } else {
            PollKind::Choice
        }
    }

    pub fn is_choice_type(&self) -> bool {
        self.kind() == PollKind::Choice
    }

    pub fn allowed_choices(&self) -> BTreeSet<&'a str> {
        self.poll.choices.iter().map(String::as_str).collect()
    }

    /// Only the end boundary gates voting; ballots cast before the start are accepted.
    pub fn is_open(&self, at: DateTime<Utc>) -> bool {
        at <= self.poll.end_date
    }
}

/// Raw vote body as received from a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteSubmission {
    #[serde(default, alias = "uuid", skip_serializing_if = "Option::is_none")]
    pub identifier: Option<RespondentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<String>>,
    #[serde(default, alias = "answer", skip_serializing_if = "Option::is_none")]
    pub free_text: Option<String>,
}

impl VoteSubmission {
    pub fn choices(identifier: RespondentId, labels: &[&str]) -> Self {
        Self {
            identifier: Some(identifier),
            choices: Some(labels.iter().map(|label| label.to_string()).collect()),
            free_text: None,
        }
    }

    pub fn text(identifier: RespondentId, text: impl Into<String>) -> Self {
        Self {
            identifier: Some(identifier),
            choices: None,
            free_text: Some(text.into()),
        }
    }

    /// Classifies the payload by which answer modes carry content.
    ///
    /// Any non-empty `free_text` counts as text when choices are also present, so padding
    /// alone still makes a mixed ballot. Without choices, text that trims to nothing is empty.
    pub fn ballot(&self) -> Ballot {
        let choices = self.choices.clone().unwrap_or_default();
        let text = self.free_text.as_deref().filter(|text| !text.is_empty());

        match (choices.is_empty(), text) {
            (true, None) => Ballot::Empty,
            (false, None) => Ballot::Choices(choices),
            (true, Some(text)) => match text.trim() {
                "" => Ballot::Empty,
                trimmed => Ballot::Text(trimmed.to_string()),
            },
            (false, Some(text)) => Ballot::Mixed {
                choices,
                text: text.trim().to_string(),
            },
        }
    }
}

/// Answer modes present in a submission, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ballot {
    Choices(Vec<String>),
    Text(String),
    Mixed { choices: Vec<String>, text: String },
    Empty,
}

impl Ballot {
    pub fn has_choices(&self) -> bool {
        matches!(self, Ballot::Choices(_) | Ballot::Mixed { .. })
    }

    pub fn has_text(&self) -> bool {
        matches!(self, Ballot::Text(_) | Ballot::Mixed { .. })
    }

    pub fn labels(&self) -> &[String] {
        match self {
            Ballot::Choices(choices) | Ballot::Mixed { choices, .. } => choices,
            Ballot::Text(_) | Ballot::Empty => &[],
        }
    }
}

/// A ballot that passed validation and may be applied to the respondent store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcceptedBallot {
    Choices(Vec<String>),
    Text(String),
}
