use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use uuid::Uuid;

use crate::models::QuoteRequest;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::success_with_warning;

pub async fn quote(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(body): Json<QuoteRequest>,
) -> Result<Response, AppError> {
    let outcome = state.quotes.quote(event_id, body).await?;
    Ok(success_with_warning(
        outcome.quote,
        "Quote calculated",
        outcome.warning,
    ))
}
