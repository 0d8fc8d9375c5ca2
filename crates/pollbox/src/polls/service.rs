use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info, warn};

use super::catalog::{CatalogError, PollCatalog};
use super::clock::{Clock, SystemClock};
use super::domain::{AcceptedBallot, Poll, PollId, RespondentId, VoteSubmission};
use super::report::{AggregationReporter, PollView};
use super::store::{RespondentStore, StoreError};
use super::validation::{ValidationFailure, VoteValidator};

/// Validates votes, applies them to the respondent store, and reports poll views.
pub struct VoteProcessor<C, S> {
    catalog: Arc<C>,
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    validator: VoteValidator,
    reporter: AggregationReporter<S>,
    locks: KeyedLocks,
}

impl<C, S> VoteProcessor<C, S>
where
    C: PollCatalog + 'static,
    S: RespondentStore + 'static,
{
    pub fn new(catalog: Arc<C>, store: Arc<S>) -> Self {
        Self::with_clock(catalog, store, Arc::new(SystemClock))
    }

    pub fn with_clock(catalog: Arc<C>, store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        let reporter = AggregationReporter::new(store.clone());
        Self {
            catalog,
            store,
            clock,
            validator: VoteValidator::new(),
            reporter,
            locks: KeyedLocks::default(),
        }
    }

    /// Current view of a poll, for anonymous and administrative callers alike.
    pub fn get_poll_view(&self, poll_id: PollId) -> Result<PollView, VoteServiceError> {
        let poll = self.load(poll_id)?;
        Ok(self.reporter.build_view(&poll)?)
    }

    /// Views of every poll still accepting votes, ordered by id.
    pub fn list_open_polls(&self) -> Result<Vec<PollView>, VoteServiceError> {
        let now = self.clock.now();
        let mut polls: Vec<Poll> = self
            .catalog
            .list()?
            .into_iter()
            .filter(|poll| poll.schema().is_open(now))
            .collect();
        polls.sort_by_key(|poll| poll.id);

        polls
            .iter()
            .map(|poll| {
                self.reporter
                    .build_view(poll)
                    .map_err(VoteServiceError::from)
            })
            .collect()
    }

    /// Registers the respondent, validates the submission, and applies it.
    ///
    /// A respondent seen for the first time stays registered against the poll even when the
    /// vote is then rejected; it only shows up in views once it has recorded something.
    pub fn submit_vote(
        &self,
        poll_id: PollId,
        submission: VoteSubmission,
    ) -> Result<PollView, VoteServiceError> {
        let poll = self.load(poll_id)?;
        let respondent = submission
            .identifier
            .unwrap_or_else(RespondentId::generate);

        let slot = self.locks.slot(poll_id, respondent);
        let outcome = {
            let _held = slot.lock().unwrap_or_else(PoisonError::into_inner);
            self.record(&poll, respondent, &submission)
        };
        self.locks.release(poll_id, respondent, slot);
        outcome?;

        Ok(self.reporter.build_view(&poll)?)
    }

    fn record(
        &self,
        poll: &Poll,
        respondent: RespondentId,
        submission: &VoteSubmission,
    ) -> Result<(), VoteServiceError> {
        let poll_id = poll.id;
        let registration = self.store.register(poll_id, respondent)?;
        if registration.newly_registered {
            debug!(
                poll = %poll_id,
                %respondent,
                created = registration.respondent_created,
                "registered respondent"
            );
        }

        let ballot = self
            .validator
            .validate(poll.schema(), submission, self.clock.now())
            .map_err(|reason| {
                warn!(poll = %poll_id, %respondent, reason = reason.code(), "vote rejected");
                reason
            })?;

        match &ballot {
            AcceptedBallot::Choices(choices) => {
                self.store.replace_choices(poll_id, respondent, choices)?;
                info!(
                    poll = %poll_id,
                    %respondent,
                    selected = choices.len(),
                    "choices recorded"
                );
            }
            AcceptedBallot::Text(text) => {
                let added = self.store.add_answer(poll_id, respondent, text)?;
                info!(poll = %poll_id, %respondent, added, "answer recorded");
            }
        }
        Ok(())
    }

    fn load(&self, poll_id: PollId) -> Result<Poll, VoteServiceError> {
        self.catalog
            .fetch(poll_id)?
            .ok_or(VoteServiceError::NotFound(poll_id))
    }
}

/// Serializes work per (poll, respondent) without blocking other respondents.
#[derive(Default)]
struct KeyedLocks {
    slots: Mutex<HashMap<(PollId, RespondentId), Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    fn slot(&self, poll: PollId, respondent: RespondentId) -> Arc<Mutex<()>> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.entry((poll, respondent)).or_default().clone()
    }

    /// Hands back a slot taken with [`KeyedLocks::slot`], dropping it once nobody else holds it.
    fn release(&self, poll: PollId, respondent: RespondentId, slot: Arc<Mutex<()>>) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        // One reference lives in the map, the other is `slot`.
        if Arc::strong_count(&slot) <= 2 {
            slots.remove(&(poll, respondent));
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Error raised by the vote processor.
#[derive(Debug, thiserror::Error)]
pub enum VoteServiceError {
    #[error("poll {0} not found")]
    NotFound(PollId),
    #[error(transparent)]
    Validation(#[from] ValidationFailure),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn released_slots_are_evicted() {
        let locks = KeyedLocks::default();
        let poll = PollId(1);
        let respondent = RespondentId::generate();

        let slot = locks.slot(poll, respondent);
        assert_eq!(locks.len(), 1);
        locks.release(poll, respondent, slot);
        assert_eq!(locks.len(), 0);
    }

    #[test]
    fn shared_slot_survives_until_last_release() {
        let locks = KeyedLocks::default();
        let poll = PollId(1);
        let respondent = RespondentId::generate();

        let first = locks.slot(poll, respondent);
        let second = locks.slot(poll, respondent);
        assert!(Arc::ptr_eq(&first, &second));

        locks.release(poll, respondent, first);
        assert_eq!(locks.len(), 1);
        locks.release(poll, respondent, second);
        assert_eq!(locks.len(), 0);
    }

    #[test]
    fn rejected_anonymous_votes_leave_no_slots_behind() {
        use crate::polls::catalog::{CatalogError, PollCatalog};
        use crate::polls::clock::FixedClock;
        use crate::polls::store::InMemoryRespondentStore;
        use chrono::{Duration, TimeZone, Utc};

        struct OnePoll(Poll);

        impl PollCatalog for OnePoll {
            fn fetch(&self, id: PollId) -> Result<Option<Poll>, CatalogError> {
                Ok((id == self.0.id).then(|| self.0.clone()))
            }

            fn list(&self) -> Result<Vec<Poll>, CatalogError> {
                Ok(vec![self.0.clone()])
            }
        }

        let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        let poll = Poll {
            id: PollId(1),
            title: "Colours".to_string(),
            question: None,
            start_date: now - Duration::days(1),
            end_date: now + Duration::days(1),
            choices: vec!["Red".to_string()],
        };
        let processor = VoteProcessor::with_clock(
            Arc::new(OnePoll(poll)),
            Arc::new(InMemoryRespondentStore::new()),
            Arc::new(FixedClock(now)),
        );

        for _ in 0..5 {
            let anonymous = VoteSubmission {
                identifier: None,
                choices: Some(vec!["Green".to_string()]),
                free_text: None,
            };
            assert!(processor.submit_vote(PollId(1), anonymous).is_err());
        }
        assert_eq!(processor.locks.len(), 0);
    }
}
