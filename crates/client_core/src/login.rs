//! Login screen controller: OAuth2 password grant, session persistence,
//! push-token registration, and role-based navigation.

use std::{sync::Arc, time::Duration};

use shared::{
    domain::UserProfile,
    protocol::{PasswordGrantRequest, TokenResponse, PASSWORD_GRANT_TYPE},
};
use storage::KeyValueStore;
use tokio::{sync::watch, task::JoinHandle};
use tracing::{info, warn};

use crate::{
    api::ApiClient,
    config::ClientConfig,
    error::{LoginError, MissingField},
    messages::{self, Locale},
    navigation::{destination_for, Destination, Navigator},
    push::{spawn_registration, PushMessaging},
    session::{Session, SessionState, REFRESH_TOKEN_KEY, TOKEN_KEY, USER_KEY},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginPhase {
    Idle,
    Validating,
    Submitting,
    FetchingProfile,
    RegisteringPushToken,
    NavigatingAway,
    Failed(LoginError),
}

impl LoginPhase {
    fn accepts_new_attempt(&self) -> bool {
        matches!(
            self,
            LoginPhase::Idle | LoginPhase::Failed(_) | LoginPhase::NavigatingAway
        )
    }
}

#[derive(Debug)]
pub struct LoginSuccess {
    pub profile: UserProfile,
    pub destination: Destination,
    /// Background push registration. Dropping the handle does not cancel it.
    pub push_registration: JoinHandle<()>,
}

pub struct LoginController {
    api: ApiClient,
    client_id: String,
    client_secret: String,
    store: Arc<dyn KeyValueStore>,
    session: Arc<SessionState>,
    push: Arc<dyn PushMessaging>,
    navigator: Arc<dyn Navigator>,
    navigation_delay: Duration,
    locale: Locale,
    phase: watch::Sender<LoginPhase>,
}

impl LoginController {
    pub fn new(
        config: &ClientConfig,
        api: ApiClient,
        store: Arc<dyn KeyValueStore>,
        session: Arc<SessionState>,
        push: Arc<dyn PushMessaging>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let (phase, _) = watch::channel(LoginPhase::Idle);
        Self {
            api,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            store,
            session,
            push,
            navigator,
            navigation_delay: config.navigation_delay,
            locale: config.locale,
            phase,
        }
    }

    pub fn phase(&self) -> LoginPhase {
        self.phase.borrow().clone()
    }

    pub fn subscribe_phase(&self) -> watch::Receiver<LoginPhase> {
        self.phase.subscribe()
    }

    /// Text the screen shows for the current phase, if any.
    pub fn status_message(&self) -> Option<String> {
        match &*self.phase.borrow() {
            LoginPhase::Failed(err) => Some(messages::login_failed(err, self.locale)),
            LoginPhase::NavigatingAway => Some(messages::login_succeeded(self.locale).to_string()),
            _ => None,
        }
    }

    /// Called once the failure message has been shown.
    pub fn acknowledge(&self) {
        self.phase.send_if_modified(|phase| {
            if matches!(phase, LoginPhase::Failed(_)) {
                *phase = LoginPhase::Idle;
                true
            } else {
                false
            }
        });
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginSuccess, LoginError> {
        let started = self.phase.send_if_modified(|phase| {
            if phase.accepts_new_attempt() {
                *phase = LoginPhase::Validating;
                true
            } else {
                false
            }
        });
        if !started {
            return Err(LoginError::Busy);
        }

        let result = self.run(username, password).await;
        if let Err(err) = &result {
            warn!(username, error = %err, "login failed");
            self.phase.send_replace(LoginPhase::Failed(err.clone()));
        }
        result
    }

    async fn run(&self, username: &str, password: &str) -> Result<LoginSuccess, LoginError> {
        validate(username, password)?;

        self.phase.send_replace(LoginPhase::Submitting);
        info!(username, "requesting access token");
        let tokens = self
            .api
            .request_token(&PasswordGrantRequest {
                username: username.to_string(),
                password: password.to_string(),
                client_id: self.client_id.clone(),
                client_secret: self.client_secret.clone(),
                grant_type: PASSWORD_GRANT_TYPE,
            })
            .await?;
        self.persist(TOKEN_KEY, &tokens.access_token).await;
        self.persist(REFRESH_TOKEN_KEY, &tokens.refresh_token).await;

        self.phase.send_replace(LoginPhase::FetchingProfile);
        let profile = match self.api.current_user(&tokens.access_token).await {
            Ok(profile) => profile,
            Err(err) => {
                self.discard_tokens().await;
                return Err(err.into());
            }
        };
        match serde_json::to_string(&profile) {
            Ok(serialized) => self.persist(USER_KEY, &serialized).await,
            Err(err) => warn!(error = %err, "failed to serialize user profile"),
        }

        let TokenResponse {
            access_token,
            refresh_token,
            ..
        } = tokens;
        self.session
            .publish_login(Session {
                access_token: access_token.clone(),
                refresh_token,
                current_user: profile.clone(),
            })
            .await;

        self.phase.send_replace(LoginPhase::RegisteringPushToken);
        let push_registration =
            spawn_registration(self.api.clone(), Arc::clone(&self.push), access_token);

        let destination = destination_for(&profile);
        self.phase.send_replace(LoginPhase::NavigatingAway);
        if !self.navigation_delay.is_zero() {
            tokio::time::sleep(self.navigation_delay).await;
        }
        info!(route = destination.route_name(), user_id = %profile.id, "navigating after login");
        self.navigator
            .reset_to(destination.route_name(), destination.params());

        Ok(LoginSuccess {
            profile,
            destination,
            push_registration,
        })
    }

    async fn persist(&self, key: &str, value: &str) {
        if let Err(err) = self.store.set(key, value).await {
            warn!(key, error = %err, "failed to persist session value");
        }
    }

    async fn discard_tokens(&self) {
        for key in [TOKEN_KEY, REFRESH_TOKEN_KEY] {
            if let Err(err) = self.store.remove(key).await {
                warn!(key, error = %err, "failed to discard session value");
            }
        }
    }
}

/// Credentials are sent exactly as typed; only empty fields are rejected.
fn validate(username: &str, password: &str) -> Result<(), LoginError> {
    if username.is_empty() {
        return Err(LoginError::Validation(MissingField::Username));
    }
    if password.is_empty() {
        return Err(LoginError::Validation(MissingField::Password));
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/login_tests.rs"]
mod tests;
