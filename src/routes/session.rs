//! Session cookie handling: every game request carries a [`SessionId`].

use axum::{extract::Request, middleware::Next, response::Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::debug;

use crate::state::session::SessionId;

/// Name of the cookie holding the session identifier.
pub const SESSION_COOKIE_NAME: &str = "quiz_session";

/// Attach the caller's [`SessionId`] to the request, issuing a new cookie when
/// the request carries none (or an unreadable one).
pub async fn ensure_session(jar: CookieJar, mut req: Request, next: Next) -> (CookieJar, Response) {
    let (session, jar) = match session_from_jar(&jar) {
        Some(session) => (session, jar),
        None => {
            let session = SessionId::generate();
            debug!(%session, "issuing new session cookie");
            (session, jar.add(session_cookie(session)))
        }
    };

    req.extensions_mut().insert(session);
    (jar, next.run(req).await)
}

/// Session identifier carried by the request cookies, if present and valid.
pub fn session_from_jar(jar: &CookieJar) -> Option<SessionId> {
    jar.get(SESSION_COOKIE_NAME)
        .and_then(|cookie| cookie.value().parse().ok())
}

fn session_cookie(session: SessionId) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, session.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, HeaderValue, header::COOKIE};

    use super::*;

    fn jar(cookies: &[&str]) -> CookieJar {
        let mut headers = HeaderMap::new();
        for cookie in cookies {
            headers.append(COOKIE, HeaderValue::from_str(cookie).unwrap());
        }
        CookieJar::from_headers(&headers)
    }

    #[test]
    fn finds_session_among_other_cookies() {
        let session = SessionId::generate();
        let found = session_from_jar(&jar(&[
            "theme=dark",
            &format!("lang=en; {SESSION_COOKIE_NAME}={session}"),
        ]));
        assert_eq!(found, Some(session));
    }

    #[test]
    fn ignores_missing_or_malformed_cookie() {
        assert_eq!(session_from_jar(&jar(&[])), None);
        assert_eq!(session_from_jar(&jar(&["theme=dark"])), None);
        assert_eq!(
            session_from_jar(&jar(&[&format!("{SESSION_COOKIE_NAME}=oops")])),
            None
        );
    }

    #[test]
    fn cookie_is_scoped_to_the_whole_site() {
        let session = SessionId::generate();
        let cookie = session_cookie(session);
        assert_eq!(cookie.name(), SESSION_COOKIE_NAME);
        assert_eq!(cookie.value(), session.to_string());
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    }
}
