use crate::errors::AppError;
use crate::models::{Action, ActionInput, ActionStats, Envelope, HealthResponse};
use crate::state::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use tracing::warn;

type ActionPath = Result<Path<u64>, PathRejection>;
type ActionBody = Result<Json<ActionInput>, JsonRejection>;

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let statistics = state.actions.health().await;
    Json(HealthResponse {
        success: true,
        status: "healthy".to_string(),
        message: Some("Sustainability Tracker API is running".to_string()),
        statistics,
    })
}

pub async fn get_stats(State(state): State<AppState>) -> Json<Envelope<ActionStats>> {
    Json(Envelope::ok(state.actions.stats().await))
}

pub async fn list_actions(State(state): State<AppState>) -> Json<Envelope<Vec<Action>>> {
    let actions = state.actions.list().await;
    let count = actions.len();
    Json(Envelope::ok(actions).with_count(count))
}

pub async fn create_action(
    State(state): State<AppState>,
    payload: ActionBody,
) -> Result<(StatusCode, Json<Envelope<Action>>), AppError> {
    let input = action_input(payload)?;
    let action = state.actions.create(&input).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(action).with_message("Action created successfully")),
    ))
}

pub async fn get_action(
    State(state): State<AppState>,
    path: ActionPath,
) -> Result<Json<Envelope<Action>>, AppError> {
    let id = action_id(path)?;
    let action = state.actions.get(id).await?;
    Ok(Json(Envelope::ok(action)))
}

pub async fn replace_action(
    State(state): State<AppState>,
    path: ActionPath,
    payload: ActionBody,
) -> Result<Json<Envelope<Action>>, AppError> {
    let id = action_id(path)?;
    let input = action_input(payload)?;
    let action = state.actions.replace(id, &input).await?;
    Ok(Json(Envelope::ok(action).with_message("Action updated successfully")))
}

pub async fn merge_action(
    State(state): State<AppState>,
    path: ActionPath,
    payload: ActionBody,
) -> Result<Json<Envelope<Action>>, AppError> {
    let id = action_id(path)?;
    let input = action_input(payload)?;
    let action = state.actions.merge(id, &input).await?;
    Ok(Json(Envelope::ok(action).with_message("Action updated successfully")))
}

pub async fn delete_action(
    State(state): State<AppState>,
    path: ActionPath,
) -> Result<StatusCode, AppError> {
    let id = action_id(path)?;
    state.actions.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn action_id(path: ActionPath) -> Result<u64, AppError> {
    match path {
        Ok(Path(id)) => Ok(id),
        Err(rejection) => {
            warn!("invalid action id: {}", rejection.body_text());
            Err(AppError::not_found("Invalid action ID format"))
        }
    }
}

fn action_input(payload: ActionBody) -> Result<ActionInput, AppError> {
    match payload {
        Ok(Json(input)) => Ok(input),
        Err(rejection) => {
            warn!("rejected request body: {}", rejection.body_text());
            Err(AppError::bad_request(rejection.body_text()))
        }
    }
}
