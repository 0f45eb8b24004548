use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the random play backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::random_play::random_play,
        crate::routes::random_play::random_check,
        crate::routes::random_play::countdown,
        crate::routes::random_play::time_up,
        crate::routes::random_play::random_tip,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::random_play::RandomQuizView,
            crate::dto::random_play::RandomPlayResponse,
            crate::dto::random_play::CheckAnswerResponse,
            crate::dto::random_play::CountdownResponse,
            crate::dto::random_play::TimeUpResponse,
            crate::dto::random_play::RandomTipResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "random_play", description = "Timed random quiz game driven by the session cookie"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_random_play_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/healthcheck",
            "/quizzes/randomplay",
            "/quizzes/randomcheck/{quizId}",
            "/quizzes/randomplay/countdown",
            "/quizzes/randomplay/timeup",
            "/quizzes/randomplay/randomtip",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
