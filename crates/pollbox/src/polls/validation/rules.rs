use chrono::{DateTime, Utc};

use super::super::domain::{Ballot, PollSchema};
use super::reason::ValidationFailure;

/// Inputs shared by every check.
pub(crate) struct VoteContext<'a> {
    pub schema: PollSchema<'a>,
    pub ballot: &'a Ballot,
    pub now: DateTime<Utc>,
}

pub(crate) type Rule = fn(&VoteContext<'_>) -> Result<(), ValidationFailure>;

/// Checks run in this order; the first failure is the one reported.
pub(crate) const RULES: [Rule; 7] = [
    poll_is_open,
    single_answer_mode,
    no_choices_on_free_form,
    no_text_on_choice_type,
    choice_type_has_choices,
    has_answer,
    choices_are_configured,
];

fn poll_is_open(ctx: &VoteContext<'_>) -> Result<(), ValidationFailure> {
    if ctx.schema.is_open(ctx.now) {
        Ok(())
    } else {
        Err(ValidationFailure::Expired)
    }
}

fn single_answer_mode(ctx: &VoteContext<'_>) -> Result<(), ValidationFailure> {
    match ctx.ballot {
        Ballot::Mixed { .. } => Err(ValidationFailure::MixedAnswer),
        _ => Ok(()),
    }
}

fn no_choices_on_free_form(ctx: &VoteContext<'_>) -> Result<(), ValidationFailure> {
    if !ctx.schema.is_choice_type() && ctx.ballot.has_choices() {
        return Err(ValidationFailure::ChoicesOnFreeFormPoll);
    }
    Ok(())
}

fn no_text_on_choice_type(ctx: &VoteContext<'_>) -> Result<(), ValidationFailure> {
    if ctx.schema.is_choice_type() && ctx.ballot.has_text() {
        return Err(ValidationFailure::TextOnChoiceTypePoll);
    }
    Ok(())
}

fn choice_type_has_choices(ctx: &VoteContext<'_>) -> Result<(), ValidationFailure> {
    if ctx.schema.is_choice_type() && !ctx.ballot.has_choices() {
        return Err(ValidationFailure::ChoicesRequired);
    }
    Ok(())
}

fn has_answer(ctx: &VoteContext<'_>) -> Result<(), ValidationFailure> {
    match ctx.ballot {
        Ballot::Empty => Err(ValidationFailure::AnswerRequired),
        _ => Ok(()),
    }
}

fn choices_are_configured(ctx: &VoteContext<'_>) -> Result<(), ValidationFailure> {
    let allowed = ctx.schema.allowed_choices();
    if ctx
        .ballot
        .labels()
        .iter()
        .all(|label| allowed.contains(label.as_str()))
    {
        Ok(())
    } else {
        Err(ValidationFailure::InvalidChoiceSelection)
    }
}
