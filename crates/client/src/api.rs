//! Typed API surface and the HTTP implementation.
//!
//! [`HttpApi`] owns the outbound policy: transient transport failures are
//! retried with exponential backoff up to a fixed ceiling, and a 401 on an
//! authorized request triggers exactly one silent refresh-and-retry before
//! the failure is surfaced as [`ClientError::SessionExpired`].

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use async_trait::async_trait;
use mockall::automock;
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::errors::ClientError;

/// Login payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Registration payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// User as returned by the auth endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiUser {
    pub uuid: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
}

/// Login/registration response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthPayload {
    pub token: String,
    pub user: ApiUser,
}

/// Refresh response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshPayload {
    pub token: String,
}

/// Catalog data cached with each cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub product_uuid: Uuid,
    pub title: String,
    pub author: String,
    pub image: String,
    pub original_price: u64,
    pub discount_price: Option<u64>,
    pub stock: i64,
}

/// One server cart line from the profile response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerCartLine {
    #[serde(flatten)]
    pub product: ProductSummary,
    pub quantity: i64,
}

/// Profile response: the user plus their server cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfilePayload {
    pub user: ApiUser,
    pub cart: Vec<ServerCartLine>,
}

/// One line of a wholesale cart push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartPush {
    pub product_uuid: Uuid,
    pub quantity: i64,
}

/// One requested checkout line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLinePush {
    pub product_uuid: Uuid,
    pub quantity: i64,
}

/// Checkout payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRequest {
    pub lines: Vec<OrderLinePush>,
    pub total_amount: u64,
}

/// Placed order, as much of it as the client needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPayload {
    pub uuid: Uuid,
    pub status: String,
    pub total_amount: u64,
}

/// Shared access token slot.
///
/// The store writes it on login/refresh and clears it on logout; the HTTP
/// client reads it when attaching the Authorization header.
#[derive(Debug, Clone, Default)]
pub struct TokenCell(Arc<Mutex<Option<String>>>);

impl TokenCell {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self) -> Option<String> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn set(&self, token: String) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    pub fn clear(&self) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

#[automock]
#[async_trait]
pub trait Api: Send + Sync {
    /// POST /auth/login. Stores the returned access token on success.
    async fn login(&self, credentials: &Credentials) -> Result<AuthPayload, ClientError>;

    /// POST /auth/register. Stores the returned access token on success.
    async fn register(&self, registration: &Registration) -> Result<AuthPayload, ClientError>;

    /// POST /auth/refresh. Exchanges the refresh cookie for a new pair.
    async fn refresh(&self) -> Result<RefreshPayload, ClientError>;

    /// POST /auth/logout. Clears the stored access token.
    async fn logout(&self) -> Result<(), ClientError>;

    /// GET /auth/profile.
    async fn profile(&self) -> Result<ProfilePayload, ClientError>;

    /// POST /auth/sync-cart. Wholesale overwrite of the server cart.
    async fn sync_cart(&self, lines: &[CartPush]) -> Result<(), ClientError>;

    /// POST /orders.
    async fn place_order(&self, order: &OrderRequest) -> Result<OrderPayload, ClientError>;
}

/// Transport retry settings.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

/// reqwest-backed [`Api`] implementation.
#[derive(Debug, Clone)]
pub struct HttpApi {
    http: reqwest::Client,
    base_url: String,
    token: TokenCell,
    retry: RetryPolicy,
}

impl HttpApi {
    /// Build a client against the given base URL.
    ///
    /// The refresh token travels in an http-only cookie, so the underlying
    /// client keeps a cookie store.
    ///
    /// # Errors
    ///
    /// Returns an error when the underlying HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, token: TokenCell) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .map_err(ClientError::Transport)?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            token,
            retry: RetryPolicy::default(),
        })
    }

    /// Override the retry policy. Used by tests to keep backoff short.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn dispatch(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        authed: bool,
    ) -> Result<reqwest::Response, ClientError> {
        let mut delay = self.retry.base_delay;
        let mut retries_left = self.retry.max_retries;
        let mut refreshed = false;

        loop {
            let mut builder = self
                .http
                .request(method.clone(), format!("{}{path}", self.base_url));

            if authed && let Some(token) = self.token.get() {
                builder = builder.bearer_auth(token);
            }

            if let Some(body) = body {
                builder = builder.json(body);
            }

            match builder.send().await {
                Ok(response) if authed && response.status() == StatusCode::UNAUTHORIZED => {
                    if refreshed {
                        // The refreshed token was rejected too. Surface the
                        // failure instead of looping.
                        return Err(ClientError::SessionExpired);
                    }

                    refreshed = true;

                    debug!("got 401 on {path}, attempting silent refresh");

                    if self.do_refresh().await.is_err() {
                        return Err(ClientError::SessionExpired);
                    }
                }
                Ok(response) => return Ok(response),
                Err(transport) => {
                    if retries_left == 0 {
                        return Err(ClientError::Transport(transport));
                    }

                    retries_left -= 1;

                    tokio::time::sleep(delay).await;

                    delay *= 2;
                }
            }
        }
    }

    /// Issue the refresh call directly, outside [`Self::dispatch`].
    ///
    /// A refresh must never trigger another silent refresh, and a rejected
    /// refresh is a session expiry rather than a transient, so none of the
    /// dispatch policy applies here.
    async fn do_refresh(&self) -> Result<RefreshPayload, ClientError> {
        let response = self
            .http
            .post(format!("{}/auth/refresh", self.base_url))
            .send()
            .await
            .map_err(ClientError::Transport)?;

        let payload: RefreshPayload = decode(response).await?;

        self.token.set(payload.token.clone());

        Ok(payload)
    }

    fn encode<T: Serialize>(body: &T) -> Result<Value, ClientError> {
        serde_json::to_value(body).map_err(ClientError::Decode)
    }
}

async fn decode<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClientError> {
    let status = response.status();

    if status.is_success() {
        return response.json::<T>().await.map_err(ClientError::Transport);
    }

    let message = response.text().await.unwrap_or_default();

    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

async fn expect_success(response: reqwest::Response) -> Result<(), ClientError> {
    let status = response.status();

    if status.is_success() {
        return Ok(());
    }

    let message = response.text().await.unwrap_or_default();

    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl Api for HttpApi {
    async fn login(&self, credentials: &Credentials) -> Result<AuthPayload, ClientError> {
        let body = Self::encode(credentials)?;

        let response = self
            .dispatch(Method::POST, "/auth/login", Some(&body), false)
            .await?;

        let payload: AuthPayload = decode(response).await?;

        self.token.set(payload.token.clone());

        Ok(payload)
    }

    async fn register(&self, registration: &Registration) -> Result<AuthPayload, ClientError> {
        let body = Self::encode(registration)?;

        let response = self
            .dispatch(Method::POST, "/auth/register", Some(&body), false)
            .await?;

        let payload: AuthPayload = decode(response).await?;

        self.token.set(payload.token.clone());

        Ok(payload)
    }

    async fn refresh(&self) -> Result<RefreshPayload, ClientError> {
        self.do_refresh().await
    }

    async fn logout(&self) -> Result<(), ClientError> {
        let response = self
            .dispatch(Method::POST, "/auth/logout", None, false)
            .await?;

        self.token.clear();

        expect_success(response).await
    }

    async fn profile(&self) -> Result<ProfilePayload, ClientError> {
        let response = self
            .dispatch(Method::GET, "/auth/profile", None, true)
            .await?;

        decode(response).await
    }

    async fn sync_cart(&self, lines: &[CartPush]) -> Result<(), ClientError> {
        let body = Self::encode(&serde_json::json!({ "cart": lines }))?;

        let response = self
            .dispatch(Method::POST, "/auth/sync-cart", Some(&body), true)
            .await?;

        expect_success(response).await
    }

    async fn place_order(&self, order: &OrderRequest) -> Result<OrderPayload, ClientError> {
        let body = Self::encode(order)?;

        let response = self
            .dispatch(Method::POST, "/orders", Some(&body), true)
            .await?;

        decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use std::{net::SocketAddr, sync::Mutex as StdMutex};

    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    use super::*;

    /// Canned HTTP/1.1 responder.
    ///
    /// Serves one scripted response per connection and records the request
    /// line of every request it sees.
    struct ScriptedServer {
        addr: SocketAddr,
        requests: Arc<StdMutex<Vec<String>>>,
    }

    impl ScriptedServer {
        async fn start(responses: Vec<(u16, String)>) -> Self {
            let listener = TcpListener::bind("127.0.0.1:0")
                .await
                .expect("bind test listener");
            let addr = listener.local_addr().expect("listener addr");
            let requests = Arc::new(StdMutex::new(Vec::new()));
            let seen = Arc::clone(&requests);

            tokio::spawn(async move {
                let mut responses = responses.into_iter();

                while let Ok((mut socket, _peer)) = listener.accept().await {
                    let mut buffer = Vec::new();
                    let mut chunk = [0_u8; 1024];

                    // Read until the end of headers; bodies are small enough
                    // to arrive in the same read.
                    loop {
                        let Ok(n) = socket.read(&mut chunk).await else {
                            break;
                        };

                        if n == 0 {
                            break;
                        }

                        buffer.extend_from_slice(chunk.get(..n).unwrap_or_default());

                        if buffer.windows(4).any(|w| w == b"\r\n\r\n") {
                            break;
                        }
                    }

                    let request_line = String::from_utf8_lossy(&buffer)
                        .lines()
                        .next()
                        .unwrap_or_default()
                        .to_string();

                    seen.lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .push(request_line);

                    let (status, body) = responses
                        .next()
                        .unwrap_or((500, "{\"message\":\"script exhausted\"}".to_string()));

                    let reason = match status {
                        200 => "OK",
                        401 => "Unauthorized",
                        _ => "Error",
                    };

                    let response = format!(
                        "HTTP/1.1 {status} {reason}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                        body.len(),
                    );

                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                }
            });

            Self { addr, requests }
        }

        fn request_lines(&self) -> Vec<String> {
            self.requests
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }
    }

    fn fast_retry() -> RetryPolicy {
        RetryPolicy {
            max_retries: 2,
            base_delay: Duration::from_millis(5),
        }
    }

    fn api_for(addr: SocketAddr, token: &TokenCell) -> HttpApi {
        HttpApi::new(format!("http://{addr}"), token.clone())
            .expect("client should build")
            .with_retry_policy(fast_retry())
    }

    fn profile_body() -> String {
        "{\"user\":{\"uuid\":\"00000000-0000-0000-0000-000000000000\",\"name\":\"Ada\",\
         \"email\":\"ada@example.com\",\"role\":\"user\"},\"cart\":[]}"
            .to_string()
    }

    #[tokio::test]
    async fn profile_success_decodes_payload() {
        let server = ScriptedServer::start(vec![(200, profile_body())]).await;
        let token = TokenCell::new();

        token.set("access".to_string());

        let api = api_for(server.addr, &token);
        let profile = api.profile().await.expect("profile should succeed");

        assert_eq!(profile.user.name, "Ada");
        assert!(profile.cart.is_empty());
    }

    #[tokio::test]
    async fn unauthorized_request_refreshes_once_then_succeeds() {
        let server = ScriptedServer::start(vec![
            (401, "{\"message\":\"expired\"}".to_string()),
            (200, "{\"token\":\"fresh-access\"}".to_string()),
            (200, profile_body()),
        ])
        .await;
        let token = TokenCell::new();

        token.set("stale-access".to_string());

        let api = api_for(server.addr, &token);
        let profile = api.profile().await.expect("retry after refresh should succeed");

        assert_eq!(profile.user.email, "ada@example.com");
        assert_eq!(token.get().as_deref(), Some("fresh-access"));

        let lines = server.request_lines();

        assert_eq!(
            lines,
            vec![
                "GET /auth/profile HTTP/1.1".to_string(),
                "POST /auth/refresh HTTP/1.1".to_string(),
                "GET /auth/profile HTTP/1.1".to_string(),
            ],
            "exactly one silent refresh-and-retry"
        );
    }

    #[tokio::test]
    async fn second_unauthorized_surfaces_session_expired() {
        let server = ScriptedServer::start(vec![
            (401, "{\"message\":\"expired\"}".to_string()),
            (200, "{\"token\":\"fresh-access\"}".to_string()),
            (401, "{\"message\":\"still expired\"}".to_string()),
        ])
        .await;
        let token = TokenCell::new();

        token.set("stale-access".to_string());

        let api = api_for(server.addr, &token);
        let result = api.profile().await;

        assert!(
            matches!(result, Err(ClientError::SessionExpired)),
            "expected SessionExpired, got {result:?}"
        );

        // One refresh, two profile attempts, and nothing after: the session
        // expiry is not retried.
        assert_eq!(server.request_lines().len(), 3, "no retry loop after expiry");
    }

    #[tokio::test]
    async fn failed_refresh_surfaces_session_expired() {
        let server = ScriptedServer::start(vec![
            (401, "{\"message\":\"expired\"}".to_string()),
            (403, "{\"message\":\"bad refresh\"}".to_string()),
        ])
        .await;
        let token = TokenCell::new();

        token.set("stale-access".to_string());

        let api = api_for(server.addr, &token);
        let result = api.profile().await;

        assert!(
            matches!(result, Err(ClientError::SessionExpired)),
            "expected SessionExpired, got {result:?}"
        );
    }

    #[tokio::test]
    async fn transport_failures_retry_up_to_the_ceiling() {
        // Nothing is listening on this address: every attempt fails at the
        // transport layer.
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind probe listener");
        let addr = listener.local_addr().expect("probe addr");

        drop(listener);

        let api = api_for(addr, &TokenCell::new());
        let started = std::time::Instant::now();
        let result = api.profile().await;

        assert!(
            matches!(result, Err(ClientError::Transport(_))),
            "expected Transport error, got {result:?}"
        );

        // Two retries with 5ms/10ms backoff must have slept at least 15ms.
        assert!(
            started.elapsed() >= Duration::from_millis(15),
            "backoff delays must be applied"
        );
    }

    #[tokio::test]
    async fn login_stores_the_access_token() {
        let body = format!(
            "{{\"token\":\"issued-access\",\"user\":{}}}",
            "{\"uuid\":\"00000000-0000-0000-0000-000000000000\",\"name\":\"Ada\",\
             \"email\":\"ada@example.com\",\"role\":\"user\"}"
        );
        let server = ScriptedServer::start(vec![(200, body)]).await;
        let token = TokenCell::new();
        let api = api_for(server.addr, &token);

        let payload = api
            .login(&Credentials {
                email: "ada@example.com".to_string(),
                password: "pw".to_string(),
            })
            .await
            .expect("login should succeed");

        assert_eq!(payload.user.name, "Ada");
        assert_eq!(token.get().as_deref(), Some("issued-access"));
    }

    #[tokio::test]
    async fn api_error_carries_status_and_message() {
        let server =
            ScriptedServer::start(vec![(409, "{\"message\":\"no stock\"}".to_string())]).await;
        let token = TokenCell::new();

        token.set("access".to_string());

        let api = api_for(server.addr, &token);
        let result = api
            .place_order(&OrderRequest {
                lines: vec![OrderLinePush {
                    product_uuid: Uuid::nil(),
                    quantity: 1,
                }],
                total_amount: 100,
            })
            .await;

        match result {
            Err(ClientError::Api { status, message }) => {
                assert_eq!(status, 409);
                assert!(message.contains("no stock"), "message was {message}");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }
}
