//! HTTP routers of the random play backend.

use axum::Router;

use crate::state::SharedState;

/// Swagger UI and OpenAPI document.
pub mod docs;
/// Liveness and storage health.
pub mod health;
/// The `/quizzes/...` random play endpoints.
pub mod random_play;
pub mod session;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    health::router()
        .merge(random_play::router())
        .merge(docs::router())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{
            Request, StatusCode,
            header::{COOKIE, SET_COOKIE},
        },
    };
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::quiz_store::memory::tests::store_with,
        state::{AppState, selector::tests::ScriptedOffsets},
    };

    struct Reply {
        status: StatusCode,
        set_cookie: Option<String>,
        body: Value,
    }

    async fn send(app: &Router, uri: &str, cookie: Option<&str>) -> Reply {
        let mut request = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie);
        }
        let response = app
            .clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let set_cookie = response
            .headers()
            .get(SET_COOKIE)
            .map(|value| value.to_str().unwrap().to_owned());
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        Reply {
            status,
            set_cookie,
            body,
        }
    }

    async fn app(ids: &[u32]) -> Router {
        let state = AppState::with_offsets(
            AppConfig::default(),
            Arc::new(ScriptedOffsets::new([0, 0, 0])),
        );
        state.set_quiz_store(Arc::new(store_with(ids))).await;
        router(state)
    }

    #[tokio::test]
    async fn issued_cookie_carries_the_game_across_requests() {
        let app = app(&[1, 2]).await;

        let first = send(&app, "/quizzes/randomplay", None).await;
        assert_eq!(first.status, StatusCode::OK);
        assert_eq!(
            first.body,
            json!({
                "status": "playing",
                "quiz": {"id": 1, "question": "question 1", "tipCount": 2},
                "score": 0,
                "creditsLeft": 3
            })
        );
        let issued = first.set_cookie.expect("first request gets a session cookie");
        assert!(issued.starts_with("quiz_session="));
        assert!(issued.contains("HttpOnly"));
        let cookie = issued.split(';').next().unwrap().to_owned();

        let checked = send(&app, "/quizzes/randomcheck/1?answer=Answer%201", Some(&cookie)).await;
        assert_eq!(checked.status, StatusCode::OK);
        assert_eq!(checked.set_cookie, None);
        assert_eq!(
            checked.body,
            json!({"result": true, "answer": "answer 1", "score": 1})
        );

        let tick = send(&app, "/quizzes/randomplay/countdown", Some(&cookie)).await;
        assert_eq!(
            tick.body,
            json!({"count": 9, "blockrefresh": true, "isNewQuiz": false})
        );

        let next = send(&app, "/quizzes/randomplay", Some(&cookie)).await;
        assert_eq!(next.body["quiz"]["id"], 2);
        assert_eq!(next.body["score"], 1);

        let tip = send(&app, "/quizzes/randomplay/randomtip", Some(&cookie)).await;
        assert_eq!(tip.body, json!({"tip": "first tip for 2", "creditsLeft": 2}));

        let done = send(&app, "/quizzes/randomplay/timeup", Some(&cookie)).await;
        assert_eq!(done.body, json!({"score": 1}));

        // Another browser plays its own game.
        let stranger = send(&app, "/quizzes/randomplay/timeup", None).await;
        assert_eq!(stranger.body, json!({"score": 0}));
        assert!(stranger.set_cookie.is_some());
    }

    #[tokio::test]
    async fn malformed_cookie_is_replaced() {
        let app = app(&[1]).await;
        let reply = send(&app, "/quizzes/randomplay/timeup", Some("quiz_session=oops")).await;
        assert_eq!(reply.status, StatusCode::OK);
        let issued = reply.set_cookie.expect("a fresh cookie is issued");
        assert!(!issued.starts_with("quiz_session=oops"));
    }

    #[tokio::test]
    async fn unknown_quiz_and_missing_store_map_to_http_errors() {
        let app = app(&[1]).await;
        let missing = send(&app, "/quizzes/randomcheck/99?answer=x", None).await;
        assert_eq!(missing.status, StatusCode::NOT_FOUND);
        assert!(missing.body["message"].is_string());

        let not_a_number = send(&app, "/quizzes/randomcheck/abc?answer=x", None).await;
        assert_eq!(not_a_number.status, StatusCode::BAD_REQUEST);

        let degraded = router(AppState::new(AppConfig::default()));
        let play = send(&degraded, "/quizzes/randomplay", None).await;
        assert_eq!(play.status, StatusCode::SERVICE_UNAVAILABLE);
        let health = send(&degraded, "/healthcheck", None).await;
        assert_eq!(health.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(health.body["status"], "degraded");
    }
}
