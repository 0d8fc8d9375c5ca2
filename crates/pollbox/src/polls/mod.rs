//! Vote submission validation, respondent tracking, and per-poll aggregation.
//!
//! Polls are read from a [`PollCatalog`] and never modified here. Accepted votes are applied to
//! a [`RespondentStore`] by the [`VoteProcessor`], which also answers view requests through the
//! [`AggregationReporter`].

pub mod catalog;
pub mod clock;
pub mod domain;
pub mod report;
pub mod router;
pub mod service;
pub mod store;
pub mod validation;

#[cfg(test)]
mod tests;

pub use catalog::{CatalogError, PollCatalog};
pub use clock::{Clock, FixedClock, SystemClock};
pub use domain::{
    AcceptedBallot, Ballot, Poll, PollId, PollKind, PollSchema, RespondentId, VoteSubmission,
};
pub use report::{AggregationReporter, PollView, RespondentView};
pub use router::poll_router;
pub use service::{VoteProcessor, VoteServiceError};
pub use store::{InMemoryRespondentStore, Registration, RespondentRecord, RespondentStore, StoreError};
pub use validation::{ValidationFailure, VoteValidator};
