use crate::infra::load_catalog;
use chrono::Utc;
use clap::Args;
use pollbox::config::PollsConfig;
use pollbox::error::AppError;
use pollbox::polls::{
    InMemoryRespondentStore, Poll, PollCatalog, PollView, RespondentId, RespondentStore,
    VoteProcessor, VoteServiceError, VoteSubmission,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// JSON file of polls to run the session against (defaults to the built-in demo polls)
    #[arg(long)]
    pub(crate) seed: Option<PathBuf>,
    /// Print full JSON views instead of the condensed summary
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { seed, json } = args;

    let config = PollsConfig { seed_path: seed };
    let catalog = Arc::new(load_catalog(&config, Utc::now())?);
    let polls = catalog.list().map_err(VoteServiceError::from)?;
    let store = Arc::new(InMemoryRespondentStore::new());
    let processor = VoteProcessor::new(catalog, store);

    println!("Poll voting demo");
    let alice = RespondentId::generate();
    let bob = RespondentId::generate();

    if let Some(poll) = polls.iter().find(|poll| poll.schema().is_choice_type()) {
        println!("\nChoice poll #{}: {}", poll.id, poll.title);
        let first = poll.choices[0].as_str();
        let last = poll.choices[poll.choices.len() - 1].as_str();
        let steps = vec![
            ("alice selects the first choice", VoteSubmission::choices(alice, &[first])),
            ("bob selects the last choice", VoteSubmission::choices(bob, &[last])),
            ("alice switches to the last choice", VoteSubmission::choices(alice, &[last])),
            ("bob writes text instead", VoteSubmission::text(bob, "none of these")),
            (
                "alice picks an unlisted option",
                VoteSubmission::choices(alice, &["Something else"]),
            ),
        ];
        run_steps(&processor, poll, steps);
        render_view(&processor.get_poll_view(poll.id)?, json);
    }

    if let Some(poll) = polls.iter().find(|poll| !poll.schema().is_choice_type()) {
        println!("\nFree-form poll #{}: {}", poll.id, poll.title);
        if let Some(question) = &poll.question {
            println!("Question: {question}");
        }
        let steps = vec![
            ("alice answers", VoteSubmission::text(alice, "More plants")),
            ("alice sends the same answer again", VoteSubmission::text(alice, "More plants")),
            ("alice adds a second idea", VoteSubmission::text(alice, "Quieter booths")),
            (
                "bob answers and selects at once",
                VoteSubmission {
                    identifier: Some(bob),
                    choices: Some(vec!["Yes".to_string()]),
                    free_text: Some("Better coffee".to_string()),
                },
            ),
            (
                "anonymous visitor answers",
                VoteSubmission {
                    identifier: None,
                    choices: None,
                    free_text: Some("Standing desks".to_string()),
                },
            ),
        ];
        run_steps(&processor, poll, steps);
        render_view(&processor.get_poll_view(poll.id)?, json);
    }

    Ok(())
}

fn run_steps<C, S>(
    processor: &VoteProcessor<C, S>,
    poll: &Poll,
    steps: Vec<(&str, VoteSubmission)>,
) where
    C: PollCatalog + 'static,
    S: RespondentStore + 'static,
{
    for (label, submission) in steps {
        match processor.submit_vote(poll.id, submission) {
            Ok(view) => println!(
                "- {label}: accepted ({} respondent(s) with answers)",
                view.respondents.len()
            ),
            Err(VoteServiceError::Validation(reason)) => {
                println!("- {label}: rejected [{}] {reason}", reason.code())
            }
            Err(other) => println!("- {label}: failed ({other})"),
        }
    }
}

fn render_view(view: &PollView, json: bool) {
    if json {
        match serde_json::to_string_pretty(view) {
            Ok(rendered) => println!("{rendered}"),
            Err(err) => println!("could not render view: {err}"),
        }
        return;
    }

    println!("Results ({} respondent(s))", view.respondents.len());
    for entry in &view.respondents {
        let mut parts = Vec::new();
        if !entry.choices.is_empty() {
            parts.push(format!("choices {}", entry.choices.join(", ")));
        }
        for (index, answer) in entry.answers.iter().enumerate() {
            parts.push(format!("answer-{index} \"{answer}\""));
        }
        println!("  - {}: {}", entry.identifier, parts.join(" | "));
    }
}
