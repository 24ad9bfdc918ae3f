use crate::domain::model::{ApiResponse, AuthTokens, Destination, SessionState, StoredCredentials};
use crate::domain::ports::{ConfigProvider, CredentialStore, Navigator};
use crate::utils::error::{ClientError, Result};
use reqwest::header::{AUTHORIZATION, COOKIE, SET_COOKIE};
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

pub const LOGIN_PATH: &str = "/auth/login";
pub const REGISTER_PATH: &str = "/auth/register";
pub const REFRESH_PATH: &str = "/auth/refresh";
pub const LOGOUT_PATH: &str = "/auth/logout";
pub const CURRENT_USER_PATH: &str = "/auth/me";

/// 伺服器以 http-only cookie 回寫的 token 名稱
pub const TOKEN_COOKIE: &str = "token";

/// 這些端點的 401 直接交給呼叫端，不做續期重試
const UNINTERCEPTED_PATHS: [&str; 4] = [LOGIN_PATH, REGISTER_PATH, REFRESH_PATH, LOGOUT_PATH];

/// 可重建的請求描述，`retried` 即每個請求的重試旗標
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    pub retried: bool,
    token_override: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            retried: false,
            token_override: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn mark_retried(mut self) -> Self {
        self.retried = true;
        self
    }

    /// 以指定 token 送出，不讀取已儲存的憑證
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token_override = Some(token.into());
        self
    }

    fn is_intercepted(&self) -> bool {
        !UNINTERCEPTED_PATHS.contains(&self.path.as_str())
    }
}

/// 共用的 HTTP client：附加 bearer token、攔截 401 並續期一次
pub struct ApiClient {
    http: Client,
    base_url: String,
    store: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
    state: Arc<RwLock<SessionState>>,
    refresh_lock: Mutex<()>,
}

impl ApiClient {
    pub fn new<C: ConfigProvider + ?Sized>(
        config: &C,
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url().trim_end_matches('/').to_string(),
            store,
            navigator,
            state: Arc::new(RwLock::new(SessionState::default())),
            refresh_lock: Mutex::new(()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    pub fn state_handle(&self) -> Arc<RwLock<SessionState>> {
        Arc::clone(&self.state)
    }

    pub async fn session_state(&self) -> SessionState {
        self.state.read().await.clone()
    }

    pub async fn current_access_token(&self) -> Result<Option<String>> {
        let credentials = self.store.load().await?;
        Ok(credentials.effective_access_token().map(str::to_string))
    }

    /// 送出請求並解析 envelope 的 `data`
    pub async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let response = self.execute(request).await?;
        let envelope: ApiResponse<T> = Self::read_envelope(response).await?;
        envelope.data.ok_or_else(|| ClientError::EnvelopeError {
            message: "response contained no data".to_string(),
        })
    }

    /// 只確認 `success`，忽略 `data`
    pub async fn send_empty(&self, request: ApiRequest) -> Result<String> {
        let response = self.execute(request).await?;
        let envelope: ApiResponse<serde_json::Value> = Self::read_envelope(response).await?;
        Ok(envelope.message)
    }

    /// 攔截器：401 且尚未重試時續期一次並以新 token 重送
    pub async fn execute(&self, request: ApiRequest) -> Result<Response> {
        let mut request = request;

        loop {
            let token = match &request.token_override {
                Some(token) => Some(token.clone()),
                None => self.current_access_token().await?,
            };

            let response = self.dispatch(&request, token.as_deref()).await?;
            self.capture_token_cookie(&response).await?;

            if response.status() != StatusCode::UNAUTHORIZED || !request.is_intercepted() {
                return Ok(response);
            }

            if request.retried {
                tracing::warn!(
                    "🔒 {} {} still unauthorized after renewal",
                    request.method,
                    request.path
                );
                self.expire_session().await;
                return Err(ClientError::unauthorized(Self::error_message(response).await));
            }

            tracing::info!(
                "🔄 {} {} returned 401, renewing access token",
                request.method,
                request.path
            );

            match self.renew_access_token(token.as_deref()).await {
                Ok(_) => {
                    request.retried = true;
                    request.token_override = None;
                }
                Err(ClientError::SessionExpiredError) => {
                    // 另一個請求已續期失敗並結束 session
                    tracing::debug!("🔒 {} {} dropped, session already expired", request.method, request.path);
                    return Err(ClientError::SessionExpiredError);
                }
                Err(e) => {
                    tracing::warn!("🔒 Token renewal failed: {}", e);
                    self.expire_session().await;
                    return Err(e);
                }
            }
        }
    }

    /// 續期 access token。若等待鎖期間其他請求已完成續期，直接沿用新 token；
    /// 若其他請求的續期已失敗並清除憑證，回傳 `SessionExpiredError` 而不再呼叫伺服器
    pub async fn renew_access_token(&self, stale_token: Option<&str>) -> Result<String> {
        let _guard = self.refresh_lock.lock().await;

        let credentials = self.store.load().await?;
        match credentials.effective_access_token() {
            Some(current) if Some(current) != stale_token => {
                tracing::debug!("🔄 Access token already renewed by a concurrent request");
                return Ok(current.to_string());
            }
            None if stale_token.is_some() => {
                tracing::debug!("🔒 Credentials cleared while waiting for renewal");
                return Err(ClientError::SessionExpiredError);
            }
            _ => {}
        }

        let tokens = match self.request_renewal(&credentials).await {
            Ok(tokens) => tokens,
            Err(e) => {
                // 持有鎖時清除，等待中的請求不會再送出續期
                if let Err(clear_err) = self.store.clear().await {
                    tracing::error!("❌ Failed to clear stored credentials: {}", clear_err);
                }
                return Err(e);
            }
        };
        let access_token = tokens.access_token.clone();
        self.persist_tokens(tokens).await?;

        tracing::info!("✅ Access token renewed");
        Ok(access_token)
    }

    async fn request_renewal(&self, credentials: &StoredCredentials) -> Result<AuthTokens> {
        let body = match &credentials.refresh_token {
            Some(refresh_token) => serde_json::json!({ "refreshToken": refresh_token }),
            None => serde_json::json!({}),
        };

        let mut builder = self
            .http
            .post(self.url(REFRESH_PATH))
            .json(&body);
        if let Some(cookie) = &credentials.cookie_token {
            builder = builder.header(COOKIE, format!("{}={}", TOKEN_COOKIE, cookie));
        }

        tracing::debug!("📡 POST {}", REFRESH_PATH);
        let response = builder.send().await?;
        self.capture_token_cookie(&response).await?;

        if response.status() == StatusCode::UNAUTHORIZED || response.status() == StatusCode::FORBIDDEN {
            return Err(ClientError::unauthorized(Self::error_message(response).await));
        }

        let envelope: ApiResponse<AuthTokens> = Self::read_envelope(response).await?;
        envelope.data.ok_or_else(|| {
            ClientError::unauthorized("renewal response did not include an access token")
        })
    }

    /// 儲存新 token；伺服器未輪替 refresh token 時保留舊的
    pub async fn persist_tokens(&self, tokens: AuthTokens) -> Result<()> {
        let mut credentials = self.store.load().await?;
        credentials.access_token = Some(tokens.access_token);
        if tokens.refresh_token.is_some() {
            credentials.refresh_token = tokens.refresh_token;
        }
        self.store.save(&credentials).await
    }

    /// 清除所有憑證、重設 session 並導向登入頁
    pub async fn expire_session(&self) {
        if let Err(e) = self.store.clear().await {
            tracing::error!("❌ Failed to clear stored credentials: {}", e);
        }
        *self.state.write().await = SessionState::signed_out();
        self.navigator.navigate(Destination::Login);
    }

    async fn dispatch(&self, request: &ApiRequest, token: Option<&str>) -> Result<Response> {
        let mut builder = self
            .http
            .request(request.method.clone(), self.url(&request.path));

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        tracing::debug!(
            "📡 {} {}{}",
            request.method,
            request.path,
            if request.retried { " (retry)" } else { "" }
        );
        let response = builder.send().await?;
        tracing::debug!("📡 {} {} -> {}", request.method, request.path, response.status());

        Ok(response)
    }

    /// 讀取 `Set-Cookie: token=...`，空值代表伺服器清除 cookie
    async fn capture_token_cookie(&self, response: &Response) -> Result<()> {
        let cookie = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(|value| {
                let pair = value.split(';').next()?.trim();
                let (name, token) = pair.split_once('=')?;
                (name.trim() == TOKEN_COOKIE).then(|| token.trim().to_string())
            });

        let Some(token) = cookie else {
            return Ok(());
        };

        let mut credentials = self.store.load().await?;
        let updated = if token.is_empty() { None } else { Some(token) };
        if credentials.cookie_token != updated {
            credentials.cookie_token = updated;
            self.store.save(&credentials).await?;
        }
        Ok(())
    }

    async fn read_envelope<T: DeserializeOwned>(response: Response) -> Result<ApiResponse<T>> {
        let status = response.status();
        if !status.is_success() {
            let message = Self::error_message(response).await;
            if status == StatusCode::UNAUTHORIZED {
                return Err(ClientError::unauthorized(message));
            }
            return Err(ClientError::ServerError {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let envelope: ApiResponse<T> = serde_json::from_str(&body)?;
        if !envelope.success {
            return Err(ClientError::EnvelopeError {
                message: envelope_message(&envelope.message, envelope.error.as_deref()),
            });
        }
        Ok(envelope)
    }

    async fn error_message(response: Response) -> String {
        let status = response.status();
        let fallback = status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string();

        match response.text().await {
            Ok(body) => serde_json::from_str::<ApiResponse<serde_json::Value>>(&body)
                .map(|envelope| envelope_message(&envelope.message, envelope.error.as_deref()))
                .ok()
                .filter(|message| !message.is_empty())
                .unwrap_or(fallback),
            Err(_) => fallback,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn envelope_message(message: &str, error: Option<&str>) -> String {
    if !message.is_empty() {
        message.to_string()
    } else {
        error.unwrap_or_default().to_string()
    }
}
