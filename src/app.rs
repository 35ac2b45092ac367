use std::net::SocketAddr;

use axum::{
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::AppError;
use crate::state::AppState;
use crate::{auth, friends, profile};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .nest(
            "/api",
            Router::new()
                .merge(auth::router())
                .merge(profile::router())
                .merge(friends::router())
                .route("/health", get(|| async { "ok" })),
        )
        .fallback(not_found)
        .with_state(state)
        .layer(middleware::map_response(method_not_allowed))
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

async fn not_found() -> AppError {
    AppError::NotFound("Resource not found".into())
}

/// Routing answers a known path with the wrong method with an empty 405.
async fn method_not_allowed(res: Response) -> Response {
    if res.status() == StatusCode::METHOD_NOT_ALLOWED {
        AppError::MethodNotAllowed.into_response()
    } else {
        res
    }
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt; // for .oneshot()

    async fn call(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<String>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let req = match body {
            Some(body) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
            None => req.body(Body::empty()).unwrap(),
        };

        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn register(app: &Router, username: &str) -> String {
        let body = json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "Secur3P@ss",
            "firstName": "Ana",
            "lastName": "Lima",
            "birthDate": "1990-04-18",
        });
        let (status, value) = call(
            app,
            Method::POST,
            "/api/auth/register",
            None,
            Some(body.to_string()),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{value}");
        assert_eq!(value["username"], username);
        value["token"].as_str().unwrap().to_string()
    }

    fn friend_body(first_name: &str, birth_date: &str) -> String {
        json!({ "firstName": first_name, "lastName": "Souza", "birthDate": birth_date }).to_string()
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = build_app(AppState::fake());
        let req = Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn register_login_and_manage_friends() {
        let app = build_app(AppState::fake());
        register(&app, "ana").await;

        let (status, login) = call(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "username": "ana", "password": "Secur3P@ss" }).to_string()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let token = login["token"].as_str().unwrap().to_string();

        let (status, created) = call(
            &app,
            Method::POST,
            "/api/friends",
            Some(&token),
            Some(friend_body("Carla", "1990-01-10")),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{created}");
        assert_eq!(created["firstName"], "Carla");
        assert_eq!(created["birthDate"], "1990-01-10");
        assert!(created["daysUntilBirthday"].as_i64().unwrap() >= 0);
        assert!(created["nextBirthday"].is_string());

        let (status, listed) = call(&app, Method::GET, "/api/friends", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let (status, upcoming) =
            call(&app, Method::GET, "/api/friends/upcoming", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(upcoming[0]["id"], created["id"]);

        let uri = format!("/api/friends/{}", created["id"].as_str().unwrap());
        let (status, updated) = call(
            &app,
            Method::PUT,
            &uri,
            Some(&token),
            Some(friend_body("Carolina", "1991-02-11")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["firstName"], "Carolina");

        let (status, _) = call(&app, Method::DELETE, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = call(&app, Method::DELETE, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn other_users_friend_is_forbidden() {
        let app = build_app(AppState::fake());
        let ana = register(&app, "ana").await;
        let bea = register(&app, "bea").await;

        let (_, created) = call(
            &app,
            Method::POST,
            "/api/friends",
            Some(&ana),
            Some(friend_body("Carla", "1990-01-10")),
        )
        .await;
        let uri = format!("/api/friends/{}", created["id"].as_str().unwrap());

        let (status, body) = call(
            &app,
            Method::PUT,
            &uri,
            Some(&bea),
            Some(friend_body("Hacked", "1990-01-10")),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["status"], 403);

        let (status, _) = call(&app, Method::DELETE, &uri, Some(&bea), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (_, listed) = call(&app, Method::GET, "/api/friends", Some(&bea), None).await;
        assert!(listed.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_registration_is_conflict() {
        let app = build_app(AppState::fake());
        register(&app, "ana").await;
        let body = json!({
            "username": "ana",
            "email": "other@example.com",
            "password": "Secur3P@ss",
            "firstName": "Ana",
            "lastName": "Lima",
            "birthDate": "1990-04-18",
        });
        let (status, value) = call(
            &app,
            Method::POST,
            "/api/auth/register",
            None,
            Some(body.to_string()),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(value["message"], "Username already exists");
    }

    #[tokio::test]
    async fn protected_routes_need_a_token() {
        let app = build_app(AppState::fake());
        let (status, body) = call(&app, Method::GET, "/api/friends", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["status"], 401);

        let (status, _) = call(&app, Method::GET, "/api/me", Some("not-a-jwt"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn validation_failures_carry_field_errors() {
        let app = build_app(AppState::fake());
        let token = register(&app, "ana").await;
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/friends",
            Some(&token),
            Some(json!({ "firstName": "", "lastName": "Souza" }).to_string()),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"]["firstName"], "First name is required");
        assert_eq!(body["errors"]["birthDate"], "Birth date is required");
    }

    fn assert_envelope(body: &Value, status: StatusCode) {
        assert_eq!(body["status"], status.as_u16());
        assert!(body["message"].is_string(), "{body}");
        assert!(body["timestamp"].is_string(), "{body}");
    }

    #[tokio::test]
    async fn non_uuid_friend_id_gets_error_envelope() {
        let app = build_app(AppState::fake());
        let token = register(&app, "ana").await;

        let (status, body) = call(
            &app,
            Method::PUT,
            "/api/friends/not-a-uuid",
            Some(&token),
            Some(friend_body("Carla", "1990-01-10")),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_envelope(&body, StatusCode::BAD_REQUEST);

        let (status, body) =
            call(&app, Method::DELETE, "/api/friends/not-a-uuid", Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_envelope(&body, StatusCode::BAD_REQUEST);
        assert!(body.get("errors").is_none());
    }

    #[tokio::test]
    async fn unparseable_birth_date_is_reported_on_the_field() {
        let app = build_app(AppState::fake());
        let body = json!({
            "username": "ana",
            "email": "ana@example.com",
            "password": "Secur3P@ss",
            "firstName": "Ana",
            "lastName": "Lima",
            "birthDate": "1990-13-45",
        });
        let (status, value) = call(
            &app,
            Method::POST,
            "/api/auth/register",
            None,
            Some(body.to_string()),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_envelope(&value, StatusCode::BAD_REQUEST);
        assert_eq!(
            value["errors"]["birthDate"],
            "Invalid format: date expected as YYYY-MM-DD"
        );
    }

    #[tokio::test]
    async fn wrongly_typed_field_is_reported_on_the_field() {
        let app = build_app(AppState::fake());
        let token = register(&app, "ana").await;
        let (status, value) = call(
            &app,
            Method::POST,
            "/api/friends",
            Some(&token),
            Some(json!({ "firstName": 42, "lastName": "Souza", "birthDate": "1990-01-10" }).to_string()),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["errors"]["firstName"], "Invalid value");
    }

    #[tokio::test]
    async fn unknown_route_and_wrong_method_get_error_envelope() {
        let app = build_app(AppState::fake());

        let (status, body) = call(&app, Method::GET, "/api/nowhere", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_envelope(&body, StatusCode::NOT_FOUND);

        let (status, body) = call(&app, Method::GET, "/api/auth/login", None, None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_envelope(&body, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let app = build_app(AppState::fake());
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some("{not json".into()),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_envelope(&body, StatusCode::BAD_REQUEST);
        assert!(body.get("errors").is_none());
    }

    #[tokio::test]
    async fn deleted_profile_is_gone() {
        let app = build_app(AppState::fake());
        let token = register(&app, "ana").await;

        let (status, profile) = call(&app, Method::GET, "/api/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(profile["email"], "ana@example.com");
        assert!(profile.get("passwordHash").is_none());

        let (status, _) = call(&app, Method::DELETE, "/api/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = call(&app, Method::GET, "/api/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn change_password_then_login_with_new_one() {
        let app = build_app(AppState::fake());
        let token = register(&app, "ana").await;

        let (status, body) = call(
            &app,
            Method::PATCH,
            "/api/me/password",
            Some(&token),
            Some(
                json!({
                    "oldPassword": "Secur3P@ss",
                    "newPassword": "N3w@Passw",
                    "confirmNewPassword": "N3w@Passw",
                })
                .to_string(),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Password changed successfully");

        let (status, _) = call(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "username": "ana", "password": "Secur3P@ss" }).to_string()),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
