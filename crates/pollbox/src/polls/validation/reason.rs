use serde::Serialize;

/// Why a vote was refused. Every variant is a client-input problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum ValidationFailure {
    #[error("The poll has expired")]
    Expired,
    #[error("This is a long form answer poll")]
    ChoicesOnFreeFormPoll,
    #[error("This is a multiple choice poll")]
    TextOnChoiceTypePoll,
    #[error("Select either a choice or write an answer, not both.")]
    MixedAnswer,
    #[error("No choices were selected.")]
    ChoicesRequired,
    #[error("You must either select or write an answer")]
    AnswerRequired,
    #[error("The selected choice/s are invalid choice.")]
    InvalidChoiceSelection,
}

impl ValidationFailure {
    /// Stable machine-readable code used in HTTP error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationFailure::Expired => "expired",
            ValidationFailure::ChoicesOnFreeFormPoll => "choices_on_free_form_poll",
            ValidationFailure::TextOnChoiceTypePoll => "text_on_choice_type_poll",
            ValidationFailure::MixedAnswer => "mixed_answer",
            ValidationFailure::ChoicesRequired => "choices_required",
            ValidationFailure::AnswerRequired => "answer_required",
            ValidationFailure::InvalidChoiceSelection => "invalid_choice_selection",
        }
    }
}
