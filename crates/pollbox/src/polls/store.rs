use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock};

use super::domain::{PollId, RespondentId};

/// Outcome of registering a respondent against a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registration {
    /// The identifier had never been seen by the store.
    pub respondent_created: bool,
    /// The respondent was not yet registered against this poll.
    pub newly_registered: bool,
}

/// Everything one respondent has recorded for one poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RespondentRecord {
    pub respondent: RespondentId,
    pub choices: Vec<String>,
    pub answers: Vec<String>,
}

impl RespondentRecord {
    pub fn is_empty(&self) -> bool {
        self.choices.is_empty() && self.answers.is_empty()
    }
}

/// Respondent state keyed per poll.
///
/// Each method is atomic on its own. Callers that need several calls to act as one unit for a
/// (respondent, poll) pair serialize on that key themselves.
pub trait RespondentStore: Send + Sync {
    /// Get-or-create the respondent and add it to the poll's respondent set. Idempotent.
    fn register(&self, poll: PollId, respondent: RespondentId)
        -> Result<Registration, StoreError>;

    /// Clears the respondent's selection for the poll and stores `choices` in its place.
    fn replace_choices(
        &self,
        poll: PollId,
        respondent: RespondentId,
        choices: &[String],
    ) -> Result<(), StoreError>;

    /// Appends an answer unless the exact text is already recorded. Returns whether it was added.
    fn add_answer(
        &self,
        poll: PollId,
        respondent: RespondentId,
        text: &str,
    ) -> Result<bool, StoreError>;

    /// Registered respondents of a poll, in registration order, copied under one read.
    fn snapshot(&self, poll: PollId) -> Result<Vec<RespondentRecord>, StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("respondent {respondent} is not registered against poll {poll}")]
    NotRegistered {
        poll: PollId,
        respondent: RespondentId,
    },
    #[error("respondent store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Default)]
struct StoreState {
    respondents: HashSet<RespondentId>,
    registrations: HashMap<PollId, Vec<RespondentId>>,
    entries: HashMap<(PollId, RespondentId), PollResponses>,
}

#[derive(Debug, Default, Clone)]
struct PollResponses {
    choices: Vec<String>,
    answers: Vec<String>,
}

/// Process-local store guarded by a single reader/writer lock.
#[derive(Debug, Default)]
pub struct InMemoryRespondentStore {
    state: RwLock<StoreState>,
}

impl InMemoryRespondentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned<T>(_: PoisonError<T>) -> StoreError {
        StoreError::Unavailable("respondent store lock poisoned".to_string())
    }
}

impl RespondentStore for InMemoryRespondentStore {
    fn register(
        &self,
        poll: PollId,
        respondent: RespondentId,
    ) -> Result<Registration, StoreError> {
        let mut state = self.state.write().map_err(Self::poisoned)?;

        let respondent_created = state.respondents.insert(respondent);
        let newly_registered = match state.entries.entry((poll, respondent)) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(PollResponses::default());
                true
            }
        };
        if newly_registered {
            state.registrations.entry(poll).or_default().push(respondent);
        }

        Ok(Registration {
            respondent_created,
            newly_registered,
        })
    }

    fn replace_choices(
        &self,
        poll: PollId,
        respondent: RespondentId,
        choices: &[String],
    ) -> Result<(), StoreError> {
        let mut state = self.state.write().map_err(Self::poisoned)?;
        let entry = state
            .entries
            .get_mut(&(poll, respondent))
            .ok_or(StoreError::NotRegistered { poll, respondent })?;

        entry.choices.clear();
        for choice in choices {
            if !entry.choices.contains(choice) {
                entry.choices.push(choice.clone());
            }
        }
        Ok(())
    }

    fn add_answer(
        &self,
        poll: PollId,
        respondent: RespondentId,
        text: &str,
    ) -> Result<bool, StoreError> {
        let mut state = self.state.write().map_err(Self::poisoned)?;
        let entry = state
            .entries
            .get_mut(&(poll, respondent))
            .ok_or(StoreError::NotRegistered { poll, respondent })?;

        if entry.answers.iter().any(|existing| existing == text) {
            return Ok(false);
        }
        entry.answers.push(text.to_string());
        Ok(true)
    }

    fn snapshot(&self, poll: PollId) -> Result<Vec<RespondentRecord>, StoreError> {
        let state = self.state.read().map_err(Self::poisoned)?;
        let Some(registered) = state.registrations.get(&poll) else {
            return Ok(Vec::new());
        };

        Ok(registered
            .iter()
            .map(|respondent| {
                let responses = state
                    .entries
                    .get(&(poll, *respondent))
                    .cloned()
                    .unwrap_or_default();
                RespondentRecord {
                    respondent: *respondent,
                    choices: responses.choices,
                    answers: responses.answers,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> (PollId, RespondentId) {
        (PollId(1), RespondentId::generate())
    }

    #[test]
    fn register_is_idempotent() {
        let store = InMemoryRespondentStore::new();
        let (poll, respondent) = ids();

        let first = store.register(poll, respondent).expect("register");
        assert!(first.respondent_created && first.newly_registered);

        let second = store.register(poll, respondent).expect("register again");
        assert!(!second.respondent_created && !second.newly_registered);

        let other_poll = store.register(PollId(2), respondent).expect("second poll");
        assert!(!other_poll.respondent_created);
        assert!(other_poll.newly_registered);

        assert_eq!(store.snapshot(poll).expect("snapshot").len(), 1);
    }

    #[test]
    fn replace_choices_overwrites_previous_selection() {
        let store = InMemoryRespondentStore::new();
        let (poll, respondent) = ids();
        store.register(poll, respondent).expect("register");

        store
            .replace_choices(poll, respondent, &["Red".to_string(), "Blue".to_string()])
            .expect("first vote");
        store
            .replace_choices(poll, respondent, &["Blue".to_string(), "Blue".to_string()])
            .expect("second vote");

        let records = store.snapshot(poll).expect("snapshot");
        assert_eq!(records[0].choices, vec!["Blue".to_string()]);
    }

    #[test]
    fn answers_append_without_duplicates() {
        let store = InMemoryRespondentStore::new();
        let (poll, respondent) = ids();
        store.register(poll, respondent).expect("register");

        assert!(store.add_answer(poll, respondent, "hi").expect("add"));
        assert!(!store.add_answer(poll, respondent, "hi").expect("repeat"));
        assert!(store.add_answer(poll, respondent, "bye").expect("add second"));

        let records = store.snapshot(poll).expect("snapshot");
        assert_eq!(records[0].answers, vec!["hi".to_string(), "bye".to_string()]);
    }

    #[test]
    fn selections_are_scoped_to_a_poll() {
        let store = InMemoryRespondentStore::new();
        let respondent = RespondentId::generate();
        store.register(PollId(1), respondent).expect("register one");
        store.register(PollId(2), respondent).expect("register two");

        store
            .replace_choices(PollId(1), respondent, &["Red".to_string()])
            .expect("vote on one");

        let second = store.snapshot(PollId(2)).expect("snapshot");
        assert!(second[0].is_empty());
    }

    #[test]
    fn mutations_require_registration() {
        let store = InMemoryRespondentStore::new();
        let (poll, respondent) = ids();

        assert_eq!(
            store.add_answer(poll, respondent, "hi"),
            Err(StoreError::NotRegistered { poll, respondent })
        );
        assert!(store.snapshot(poll).expect("snapshot").is_empty());
    }
}
