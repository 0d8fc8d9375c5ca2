use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde_json::json;

use super::catalog::PollCatalog;
use super::domain::{PollId, VoteSubmission};
use super::service::{VoteProcessor, VoteServiceError};
use super::store::RespondentStore;

/// Router builder exposing the public poll and voting endpoints.
pub fn poll_router<C, S>(service: Arc<VoteProcessor<C, S>>) -> Router
where
    C: PollCatalog + 'static,
    S: RespondentStore + 'static,
{
    Router::new()
        .route("/api/v1/polls", get(list_handler::<C, S>))
        .route("/api/v1/polls/:poll_id", get(view_handler::<C, S>))
        .route(
            "/api/v1/polls/:poll_id/vote",
            get(view_handler::<C, S>).post(vote_handler::<C, S>),
        )
        .with_state(service)
}

pub(crate) async fn list_handler<C, S>(
    State(service): State<Arc<VoteProcessor<C, S>>>,
) -> Response
where
    C: PollCatalog + 'static,
    S: RespondentStore + 'static,
{
    match service.list_open_polls() {
        Ok(views) => (StatusCode::OK, axum::Json(views)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn view_handler<C, S>(
    State(service): State<Arc<VoteProcessor<C, S>>>,
    Path(poll_id): Path<u64>,
) -> Response
where
    C: PollCatalog + 'static,
    S: RespondentStore + 'static,
{
    match service.get_poll_view(PollId(poll_id)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn vote_handler<C, S>(
    State(service): State<Arc<VoteProcessor<C, S>>>,
    Path(poll_id): Path<u64>,
    axum::Json(submission): axum::Json<VoteSubmission>,
) -> Response
where
    C: PollCatalog + 'static,
    S: RespondentStore + 'static,
{
    match service.submit_vote(PollId(poll_id), submission) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: VoteServiceError) -> Response {
    match error {
        VoteServiceError::Validation(reason) => {
            let payload = json!({
                "error": reason.to_string(),
                "reason": reason.code(),
            });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        VoteServiceError::NotFound(poll_id) => {
            let payload = json!({
                "error": format!("poll {poll_id} not found"),
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        other => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
