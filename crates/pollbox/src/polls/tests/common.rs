use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::polls::catalog::{CatalogError, PollCatalog};
use crate::polls::clock::FixedClock;
use crate::polls::domain::{Poll, PollId, RespondentId};
use crate::polls::store::{
    InMemoryRespondentStore, Registration, RespondentRecord, RespondentStore, StoreError,
};
use crate::polls::{poll_router, VoteProcessor};

pub(super) const CHOICE_POLL: PollId = PollId(1);
pub(super) const FREE_FORM_POLL: PollId = PollId(2);
pub(super) const EXPIRED_POLL: PollId = PollId(3);

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0)
        .single()
        .expect("valid instant")
}

pub(super) fn choice_poll() -> Poll {
    Poll {
        id: CHOICE_POLL,
        title: "Favourite colour".to_string(),
        question: None,
        start_date: now() - Duration::days(1),
        end_date: now() + Duration::days(6),
        choices: vec!["Red".to_string(), "Blue".to_string()],
    }
}

pub(super) fn free_form_poll() -> Poll {
    Poll {
        id: FREE_FORM_POLL,
        title: "Team offsite".to_string(),
        question: Some("Where should we go?".to_string()),
        start_date: now() - Duration::days(1),
        end_date: now() + Duration::days(6),
        choices: Vec::new(),
    }
}

pub(super) fn expired_poll() -> Poll {
    Poll {
        id: EXPIRED_POLL,
        title: "Last quarter".to_string(),
        question: None,
        start_date: now() - Duration::days(30),
        end_date: now() - Duration::seconds(1),
        choices: vec!["Red".to_string(), "Blue".to_string()],
    }
}

pub(super) fn respondent() -> RespondentId {
    RespondentId::generate()
}

#[derive(Default, Clone)]
pub(super) struct MemoryCatalog {
    pub(super) polls: Arc<Mutex<BTreeMap<PollId, Poll>>>,
}

impl MemoryCatalog {
    pub(super) fn seeded() -> Self {
        let catalog = Self::default();
        for poll in [choice_poll(), free_form_poll(), expired_poll()] {
            catalog.put(poll);
        }
        catalog
    }

    pub(super) fn put(&self, poll: Poll) {
        self.polls
            .lock()
            .expect("catalog mutex poisoned")
            .insert(poll.id, poll);
    }
}

impl PollCatalog for MemoryCatalog {
    fn fetch(&self, id: PollId) -> Result<Option<Poll>, CatalogError> {
        let guard = self.polls.lock().expect("catalog mutex poisoned");
        Ok(guard.get(&id).cloned())
    }

    fn list(&self) -> Result<Vec<Poll>, CatalogError> {
        let guard = self.polls.lock().expect("catalog mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

pub(super) struct UnavailableCatalog;

impl PollCatalog for UnavailableCatalog {
    fn fetch(&self, _id: PollId) -> Result<Option<Poll>, CatalogError> {
        Err(CatalogError::Unavailable("admin database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<Poll>, CatalogError> {
        Err(CatalogError::Unavailable("admin database offline".to_string()))
    }
}

pub(super) struct ReadOnlyStore;

impl RespondentStore for ReadOnlyStore {
    fn register(
        &self,
        _poll: PollId,
        _respondent: RespondentId,
    ) -> Result<Registration, StoreError> {
        Err(StoreError::Unavailable("read only".to_string()))
    }

    fn replace_choices(
        &self,
        _poll: PollId,
        _respondent: RespondentId,
        _choices: &[String],
    ) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("read only".to_string()))
    }

    fn add_answer(
        &self,
        _poll: PollId,
        _respondent: RespondentId,
        _text: &str,
    ) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable("read only".to_string()))
    }

    fn snapshot(&self, _poll: PollId) -> Result<Vec<RespondentRecord>, StoreError> {
        Ok(Vec::new())
    }
}

pub(super) fn build_service() -> (
    VoteProcessor<MemoryCatalog, InMemoryRespondentStore>,
    Arc<MemoryCatalog>,
    Arc<InMemoryRespondentStore>,
) {
    let catalog = Arc::new(MemoryCatalog::seeded());
    let store = Arc::new(InMemoryRespondentStore::new());
    let service =
        VoteProcessor::with_clock(catalog.clone(), store.clone(), Arc::new(FixedClock(now())));
    (service, catalog, store)
}

pub(super) fn router_with_service(
    service: VoteProcessor<MemoryCatalog, InMemoryRespondentStore>,
) -> axum::Router {
    poll_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
