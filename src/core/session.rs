use crate::core::http_client::{
    ApiClient, ApiRequest, CURRENT_USER_PATH, LOGIN_PATH, LOGOUT_PATH, REGISTER_PATH,
};
use crate::core::routing::destination_for_roles;
use crate::core::token;
use crate::domain::model::{
    Destination, LoginRequest, LoginResponse, PasswordChange, ProfileUpdate, RegisterRequest,
    Role, SessionState, User,
};
use crate::domain::ports::{Clock, SystemClock};
use crate::utils::error::Result;
use std::sync::Arc;

pub const PROFILE_PATH: &str = "/users/profile";
pub const PASSWORD_PATH: &str = "/users/password";

/// Session 生命週期：啟動還原、登入、登出與個人資料
pub struct SessionManager {
    client: Arc<ApiClient>,
    clock: Arc<dyn Clock>,
}

impl SessionManager {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self::with_clock(client, Arc::new(SystemClock))
    }

    pub fn with_clock(client: Arc<ApiClient>, clock: Arc<dyn Clock>) -> Self {
        Self { client, clock }
    }

    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    pub async fn state(&self) -> SessionState {
        self.client.session_state().await
    }

    /// 啟動時還原 session，任何路徑結束後 `is_loading` 皆為 false
    pub async fn initialize(&self) -> SessionState {
        let state = match self.restore().await {
            Ok(Some(user)) => {
                tracing::info!("✅ Session restored for {}", user.email);
                SessionState::signed_in(user)
            }
            Ok(None) => SessionState::signed_out(),
            Err(e) => {
                tracing::warn!("🔒 Could not restore session: {}", e);
                if e.is_unauthorized() {
                    self.clear_credentials().await;
                }
                SessionState::signed_out()
            }
        };

        self.set_state(state.clone()).await;
        state
    }

    async fn restore(&self) -> Result<Option<User>> {
        let credentials = self.client.store().load().await?;
        let Some(access_token) = credentials.effective_access_token() else {
            tracing::debug!("No stored access token, starting signed out");
            return Ok(None);
        };

        let expired = match token::is_expired(access_token, self.clock.now_timestamp()) {
            Ok(expired) => expired,
            Err(e) => {
                tracing::warn!("🔒 Stored access token is unreadable: {}", e);
                self.clear_credentials().await;
                return Ok(None);
            }
        };

        if expired {
            tracing::info!("🔄 Stored access token expired, renewing");
            if let Err(e) = self.client.renew_access_token(Some(access_token)).await {
                // 續期失敗即結束 session，不再重試
                tracing::warn!("🔒 Renewal failed during startup: {}", e);
                self.clear_credentials().await;
                return Ok(None);
            }
        }

        // 啟動時 /auth/me 的 401 直接結束 session，不走續期
        let user = self
            .client
            .send(ApiRequest::get(CURRENT_USER_PATH).mark_retried())
            .await?;
        Ok(Some(user))
    }

    pub async fn fetch_current_user(&self) -> Result<User> {
        self.client.send(ApiRequest::get(CURRENT_USER_PATH)).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let request = ApiRequest::post(LOGIN_PATH).json(&LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        })?;

        let response: LoginResponse = self.client.send(request).await?;
        tracing::info!("✅ Logged in as {}", response.user.email);
        self.start_session(response).await
    }

    /// 註冊；伺服器若同時回傳 token 則直接登入
    pub async fn register(&self, registration: &RegisterRequest) -> Result<User> {
        let request = ApiRequest::post(REGISTER_PATH).json(registration)?;
        let data: serde_json::Value = self.client.send(request).await?;

        match serde_json::from_value::<LoginResponse>(data.clone()) {
            Ok(response) => self.start_session(response).await,
            Err(_) => {
                let user: User = serde_json::from_value(data)?;
                tracing::info!("📝 Registered {}, login required", user.email);
                self.client.navigator().navigate(Destination::Login);
                Ok(user)
            }
        }
    }

    async fn start_session(&self, response: LoginResponse) -> Result<User> {
        self.client.persist_tokens(response.tokens).await?;

        let user = response.user;
        let destination = destination_for_roles(&user.roles);
        self.set_state(SessionState::signed_in(user.clone())).await;
        self.client.navigator().navigate(destination);
        Ok(user)
    }

    /// 先清除本地狀態，再盡力通知伺服器；伺服器結果不影響本地狀態
    pub async fn logout(&self) -> SessionState {
        let credentials = self.client.store().load().await.unwrap_or_default();

        self.clear_credentials().await;
        self.set_state(SessionState::signed_out()).await;
        self.client.navigator().navigate(Destination::Login);
        tracing::info!("👋 Logged out");

        if let Some(access_token) = credentials.effective_access_token() {
            let body = match &credentials.refresh_token {
                Some(refresh_token) => serde_json::json!({ "refreshToken": refresh_token }),
                None => serde_json::json!({}),
            };
            let outcome = match ApiRequest::post(LOGOUT_PATH)
                .with_token(access_token)
                .json(&body)
            {
                Ok(request) => self.client.send_empty(request).await,
                Err(e) => Err(e),
            };

            match outcome {
                Ok(_) => tracing::debug!("Server session invalidated"),
                Err(e) => tracing::warn!("⚠️ Server-side logout failed: {}", e),
            }
        }

        SessionState::signed_out()
    }

    pub async fn refresh_user(&self) -> Result<User> {
        let user = self.fetch_current_user().await?;
        self.set_state(SessionState::signed_in(user.clone())).await;
        Ok(user)
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User> {
        let request = ApiRequest::put(PROFILE_PATH).json(update)?;
        let user: User = self.client.send(request).await?;
        self.set_state(SessionState::signed_in(user.clone())).await;
        tracing::info!("✅ Profile updated");
        Ok(user)
    }

    pub async fn change_password(&self, change: &PasswordChange) -> Result<()> {
        let request = ApiRequest::put(PASSWORD_PATH).json(change)?;
        let message = self.client.send_empty(request).await?;
        tracing::info!("✅ Password changed: {}", message);
        Ok(())
    }

    /// 依目前使用者角色決定導向
    pub async fn home_destination(&self) -> Destination {
        match self.state().await.user {
            Some(user) => destination_for_roles(&user.roles),
            None => Destination::Login,
        }
    }

    /// 路由守衛：未登入導向登入頁，角色不符導回自己的首頁
    pub async fn authorize(&self, allowed: &[Role]) -> std::result::Result<User, Destination> {
        let state = self.state().await;
        let user = match state.user {
            Some(user) if state.is_authenticated => user,
            _ => return Err(Destination::Login),
        };

        if allowed.is_empty() || allowed.iter().any(|role| user.has_role(role)) {
            Ok(user)
        } else {
            Err(destination_for_roles(&user.roles))
        }
    }

    async fn set_state(&self, state: SessionState) {
        *self.client.state_handle().write().await = state;
    }

    async fn clear_credentials(&self) {
        if let Err(e) = self.client.store().clear().await {
            tracing::error!("❌ Failed to clear stored credentials: {}", e);
        }
    }
}
