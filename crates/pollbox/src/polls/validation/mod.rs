mod reason;
mod rules;

pub use reason::ValidationFailure;

use chrono::{DateTime, Utc};

use super::domain::{AcceptedBallot, Ballot, PollSchema, VoteSubmission};
use rules::{VoteContext, RULES};

/// Stateless gate deciding whether a submission may be applied to a poll.
#[derive(Debug, Clone, Copy, Default)]
pub struct VoteValidator;

impl VoteValidator {
    pub fn new() -> Self {
        Self
    }

    /// Runs every rule in order and returns the first failure, or the typed ballot to apply.
    pub fn validate(
        &self,
        schema: PollSchema<'_>,
        submission: &VoteSubmission,
        now: DateTime<Utc>,
    ) -> Result<AcceptedBallot, ValidationFailure> {
        let ballot = submission.ballot();
        let ctx = VoteContext {
            schema,
            ballot: &ballot,
            now,
        };

        for rule in RULES {
            rule(&ctx)?;
        }

        match ballot {
            Ballot::Choices(choices) => Ok(AcceptedBallot::Choices(choices)),
            Ballot::Text(text) => Ok(AcceptedBallot::Text(text)),
            // Both rejected by the rules above.
            Ballot::Mixed { .. } => Err(ValidationFailure::MixedAnswer),
            Ballot::Empty => Err(ValidationFailure::AnswerRequired),
        }
    }
}
