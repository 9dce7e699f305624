//! HTTP API over the aggregation service.
//!
//! Every GitHub route accepts an optional `token` query parameter. Public-data
//! routes fall back to the configured default token when it is absent.
//! Routes that can expose private data (private repositories, and the
//! organization visibility check of the full profile) only ever use the
//! caller's own token.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use gitpulse::{GitHubError, GitHubService, short_error_message};
use serde::Deserialize;
use serde_json::json;

use crate::shutdown::shutdown_signal;

/// Shared state for request handlers.
pub(crate) struct AppState {
    pub service: GitHubService,
    pub default_token: Option<String>,
}

impl AppState {
    /// Token for routes that only read public data.
    fn public_token<'a>(&'a self, query: &'a TokenQuery) -> Option<&'a str> {
        query.caller_token().or(self.default_token.as_deref())
    }
}

/// Query parameters accepted by every GitHub route.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct TokenQuery {
    pub token: Option<String>,
}

impl TokenQuery {
    /// The token sent with the request, ignoring blank values.
    fn caller_token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.trim().is_empty())
    }
}

/// A [`GitHubError`] rendered as a JSON error response.
pub(crate) struct ApiError(GitHubError);

impl From<GitHubError> for ApiError {
    fn from(err: GitHubError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::BAD_GATEWAY);

        if status.is_server_error() {
            tracing::warn!(code = self.0.code(), "{}", short_error_message(&self.0));
        } else {
            tracing::debug!(code = self.0.code(), "{}", short_error_message(&self.0));
        }

        let body = json!({
            "error": {
                "code": self.0.code(),
                "message": self.0.to_string(),
            }
        });
        (status, Json(body)).into_response()
    }
}

type ApiResult = Result<Response, ApiError>;

pub(crate) fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/github/{username}", get(full_profile))
        .route("/github/{username}/dashboard", get(dashboard))
        .route("/github/{username}/languages", get(languages))
        .route("/github/{username}/metrics", get(metrics))
        .route("/github/{username}/private-repos", get(private_repos))
        .route("/github/{username}/{repo}/contents", get(contents))
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl+C.
pub(crate) async fn serve(
    addr: SocketAddr,
    state: Arc<AppState>,
) -> Result<(), Box<dyn std::error::Error>> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;

    tracing::info!(
        "gitpulse listening on http://{}",
        listener.local_addr().unwrap_or(addr)
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({"status": "ok"}))
}

async fn full_profile(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    Query(query): Query<TokenQuery>,
) -> ApiResult {
    let profile = state
        .service
        .full_profile(&username, query.caller_token())
        .await?;
    Ok(Json(profile).into_response())
}

async fn dashboard(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    Query(query): Query<TokenQuery>,
) -> ApiResult {
    let outcome = state
        .service
        .dashboard(&username, state.public_token(&query))
        .await?;
    Ok(Json(outcome).into_response())
}

async fn languages(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    Query(query): Query<TokenQuery>,
) -> ApiResult {
    let outcome = state
        .service
        .language_proficiency(&username, state.public_token(&query))
        .await?;
    Ok(Json(outcome).into_response())
}

async fn metrics(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    Query(query): Query<TokenQuery>,
) -> ApiResult {
    let summary = state
        .service
        .metrics_summary(&username, state.public_token(&query))
        .await?;
    Ok(Json(summary).into_response())
}

async fn private_repos(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    Query(query): Query<TokenQuery>,
) -> ApiResult {
    let repos = state
        .service
        .private_repositories(&username, query.caller_token())
        .await?;
    Ok(Json(repos).into_response())
}

async fn contents(
    State(state): State<Arc<AppState>>,
    Path((username, repo)): Path<(String, String)>,
    Query(query): Query<TokenQuery>,
) -> ApiResult {
    let listing = state
        .service
        .repository_contents(&username, &repo, state.public_token(&query))
        .await?;
    Ok(Json(listing).into_response())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use gitpulse::ServiceOptions;
    use gitpulse::http::{HttpError, HttpRequest, HttpResponse, HttpTransport};

    use super::*;

    const HOST: &str = "https://api.github.test";

    /// Answers from a fixed table; unknown URLs get a 404.
    #[derive(Default)]
    struct TableTransport {
        bodies: HashMap<String, serde_json::Value>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    #[async_trait]
    impl HttpTransport for TableTransport {
        async fn get(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
            let response = match self.bodies.get(&request.url) {
                Some(body) => HttpResponse {
                    status: 200,
                    headers: Vec::new(),
                    body: body.to_string().into_bytes(),
                },
                None => HttpResponse {
                    status: 404,
                    headers: Vec::new(),
                    body: br#"{"message":"Not Found"}"#.to_vec(),
                },
            };
            self.requests.lock().unwrap().push(request);
            Ok(response)
        }
    }

    fn state(transport: Arc<TableTransport>, default_token: Option<&str>) -> Arc<AppState> {
        let options = ServiceOptions {
            api_base: HOST.to_string(),
            ..ServiceOptions::default()
        };
        Arc::new(AppState {
            service: GitHubService::with_transport(options, transport),
            default_token: default_token.map(String::from),
        })
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        serde_json::from_slice(&bytes).expect("body should be JSON")
    }

    fn no_token() -> Query<TokenQuery> {
        Query(TokenQuery::default())
    }

    #[tokio::test]
    async fn test_health() {
        let Json(body) = health().await;
        assert_eq!(body, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_missing_token_maps_to_bad_request() {
        let transport = Arc::new(TableTransport::default());
        let response = private_repos(
            State(state(transport.clone(), None)),
            Path("octocat".to_string()),
            no_token(),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "MISSING_CREDENTIAL");
        assert!(transport.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_private_repos_ignore_configured_token() {
        let mut transport = TableTransport::default();
        transport.bodies.insert(
            format!("{HOST}/user/repos?per_page=100&sort=updated&type=private"),
            json!([{
                "name": "secret",
                "html_url": "https://github.com/operator/secret",
                "private": true,
                "owner": {"login": "operator"}
            }]),
        );
        let transport = Arc::new(transport);

        let response = private_repos(
            State(state(transport.clone(), Some("operator-pat"))),
            Path("operator".to_string()),
            no_token(),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "MISSING_CREDENTIAL");
        assert!(transport.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_full_profile_without_query_token_is_anonymous() {
        let mut transport = TableTransport::default();
        transport.bodies.insert(
            format!("{HOST}/users/operator"),
            json!({
                "login": "operator",
                "public_repos": 0,
                "followers": 0,
                "following": 0,
                "created_at": "2020-01-01T00:00:00Z",
                "updated_at": "2024-01-01T00:00:00Z",
                "avatar_url": "",
                "html_url": "https://github.com/operator"
            }),
        );
        for path in ["repos?per_page=100&sort=updated", "orgs", "gists", "events/public"] {
            transport
                .bodies
                .insert(format!("{HOST}/users/operator/{path}"), json!([]));
        }
        let transport = Arc::new(transport);

        let response = full_profile(
            State(state(transport.clone(), Some("operator-pat"))),
            Path("operator".to_string()),
            no_token(),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let requests = transport.requests.lock().unwrap();
        assert!(!requests.is_empty());
        assert!(
            requests
                .iter()
                .all(|r| r.headers.iter().all(|(k, _)| k != "Authorization"))
        );
        assert!(!requests.iter().any(|r| r.url == format!("{HOST}/user")));
    }

    #[tokio::test]
    async fn test_unknown_user_maps_to_not_found() {
        let transport = Arc::new(TableTransport::default());
        let response = full_profile(
            State(state(transport, None)),
            Path("ghost".to_string()),
            no_token(),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_empty_listing_returns_message_payload() {
        let mut transport = TableTransport::default();
        transport
            .bodies
            .insert(format!("{HOST}/users/quiet/repos?per_page=100"), json!([]));

        let response = dashboard(
            State(state(Arc::new(transport), None)),
            Path("quiet".to_string()),
            no_token(),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["message"], "no repositories found");
    }

    #[tokio::test]
    async fn test_query_token_overrides_default_token() {
        let mut transport = TableTransport::default();
        transport.bodies.insert(
            format!("{HOST}/repos/octocat/hello/contents"),
            json!([{"name": "README"}]),
        );
        let transport = Arc::new(transport);
        let state = state(transport.clone(), Some("configured"));

        let response = contents(
            State(state.clone()),
            Path(("octocat".to_string(), "hello".to_string())),
            Query(TokenQuery {
                token: Some("from-query".to_string()),
            }),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let response = contents(
            State(state),
            Path(("octocat".to_string(), "hello".to_string())),
            no_token(),
        )
        .await
        .into_response();
        assert_eq!(body_json(response).await[0]["name"], "README");

        let auth: Vec<_> = transport
            .requests
            .lock()
            .unwrap()
            .iter()
            .filter_map(|r| {
                r.headers
                    .iter()
                    .find(|(k, _)| k == "Authorization")
                    .map(|(_, v)| v.clone())
            })
            .collect();
        assert_eq!(auth, vec!["token from-query", "token configured"]);
    }

    #[tokio::test]
    async fn test_invalid_username_maps_to_bad_request() {
        let transport = Arc::new(TableTransport::default());
        let response = metrics(
            State(state(transport, None)),
            Path("has space".to_string()),
            no_token(),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "INVALID_INPUT");
    }

    #[test]
    fn test_router_builds_with_all_routes() {
        let _ = router(state(Arc::new(TableTransport::default()), None));
    }

    #[test]
    fn test_upstream_status_is_passed_through() {
        let response = ApiError::from(GitHubError::Upstream {
            status: 422,
            body: "unprocessable".to_string(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
