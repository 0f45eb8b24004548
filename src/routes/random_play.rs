use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    middleware,
    routing::get,
};

use crate::{
    dao::models::QuizId,
    dto::random_play::{
        CheckAnswerQuery, CheckAnswerResponse, CountdownResponse, RandomPlayResponse,
        RandomTipResponse, TimeUpResponse,
    },
    error::AppError,
    routes::session::ensure_session,
    services::random_play_service,
    state::{SharedState, session::SessionId},
};

/// Random play endpoints; the game lives in the caller's session.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/quizzes/randomplay", get(random_play))
        .route("/quizzes/randomcheck/{quiz_id}", get(random_check))
        .route("/quizzes/randomplay/countdown", get(countdown))
        .route("/quizzes/randomplay/timeup", get(time_up))
        .route("/quizzes/randomplay/randomtip", get(random_tip))
        .route_layer(middleware::from_fn(ensure_session))
}

/// Serve a random quiz that was not answered yet in the current game.
#[utoipa::path(
    get,
    path = "/quizzes/randomplay",
    tag = "random_play",
    responses(
        (status = 200, description = "Quiz to answer, or final score when none is left", body = RandomPlayResponse),
        (status = 503, description = "Quiz store unavailable")
    )
)]
pub async fn random_play(
    State(state): State<SharedState>,
    Extension(session): Extension<SessionId>,
) -> Result<Json<RandomPlayResponse>, AppError> {
    let payload = random_play_service::start_or_continue(&state, session).await?;
    Ok(Json(payload))
}

/// Check an answer; a wrong answer ends the game.
#[utoipa::path(
    get,
    path = "/quizzes/randomcheck/{quizId}",
    tag = "random_play",
    params(
        ("quizId" = u32, Path, description = "Identifier of the answered quiz"),
        CheckAnswerQuery
    ),
    responses(
        (status = 200, description = "Result of the check", body = CheckAnswerResponse),
        (status = 404, description = "Unknown quiz"),
        (status = 503, description = "Quiz store unavailable")
    )
)]
pub async fn random_check(
    State(state): State<SharedState>,
    Extension(session): Extension<SessionId>,
    Path(quiz_id): Path<QuizId>,
    Query(query): Query<CheckAnswerQuery>,
) -> Result<Json<CheckAnswerResponse>, AppError> {
    let payload =
        random_play_service::check_answer(&state, session, quiz_id, &query.answer).await?;
    Ok(Json(payload))
}

/// Advance the advisory countdown by one tick.
#[utoipa::path(
    get,
    path = "/quizzes/randomplay/countdown",
    tag = "random_play",
    responses((status = 200, description = "Countdown state", body = CountdownResponse))
)]
pub async fn countdown(
    State(state): State<SharedState>,
    Extension(session): Extension<SessionId>,
) -> Json<CountdownResponse> {
    Json(random_play_service::poll_countdown(&state, session).await)
}

/// End the game because time ran out and return the final score.
#[utoipa::path(
    get,
    path = "/quizzes/randomplay/timeup",
    tag = "random_play",
    responses((status = 200, description = "Final score", body = TimeUpResponse))
)]
pub async fn time_up(
    State(state): State<SharedState>,
    Extension(session): Extension<SessionId>,
) -> Json<TimeUpResponse> {
    Json(random_play_service::time_up(&state, session).await)
}

/// Reveal one tip of the current quiz at the cost of a credit.
#[utoipa::path(
    get,
    path = "/quizzes/randomplay/randomtip",
    tag = "random_play",
    responses((status = 200, description = "Revealed tip, if any", body = RandomTipResponse))
)]
pub async fn random_tip(
    State(state): State<SharedState>,
    Extension(session): Extension<SessionId>,
) -> Json<RandomTipResponse> {
    Json(random_play_service::random_tip(&state, session).await)
}
