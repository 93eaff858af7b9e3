use anyhow::{Context, Result};
use shared::domain::UserProfile;
use storage::KeyValueStore;
use tokio::sync::{broadcast, RwLock};
use tracing::{info, warn};

pub const TOKEN_KEY: &str = "token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const USER_KEY: &str = "user";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub current_user: UserProfile,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn(UserProfile),
    LoggedOut,
}

pub struct SessionState {
    current: RwLock<Option<Session>>,
    events: broadcast::Sender<SessionEvent>,
}

impl Default for SessionState {
    fn default() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            current: RwLock::new(None),
            events,
        }
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub async fn current(&self) -> Option<Session> {
        self.current.read().await.clone()
    }

    pub async fn current_user(&self) -> Option<UserProfile> {
        self.current
            .read()
            .await
            .as_ref()
            .map(|session| session.current_user.clone())
    }

    pub async fn access_token(&self) -> Option<String> {
        self.current
            .read()
            .await
            .as_ref()
            .map(|session| session.access_token.clone())
    }

    pub async fn publish_login(&self, session: Session) {
        let profile = session.current_user.clone();
        *self.current.write().await = Some(session);
        info!(user_id = %profile.id, role = ?profile.role, "session established");
        let _ = self.events.send(SessionEvent::LoggedIn(profile));
    }

    /// Loads a session persisted by an earlier login. Returns `None` when any
    /// of the session keys is missing.
    pub async fn restore(&self, store: &dyn KeyValueStore) -> Result<Option<UserProfile>> {
        let access_token = store.get(TOKEN_KEY).await?;
        let refresh_token = store.get(REFRESH_TOKEN_KEY).await?;
        let user = store.get(USER_KEY).await?;
        let (Some(access_token), Some(refresh_token), Some(user)) =
            (access_token, refresh_token, user)
        else {
            return Ok(None);
        };

        let current_user: UserProfile =
            serde_json::from_str(&user).context("stored user profile is malformed")?;
        self.publish_login(Session {
            access_token,
            refresh_token,
            current_user: current_user.clone(),
        })
        .await;
        Ok(Some(current_user))
    }

    /// Forgets the session in memory and in the store. Store failures are
    /// logged; the in-memory session is cleared regardless.
    pub async fn logout(&self, store: &dyn KeyValueStore) {
        *self.current.write().await = None;
        for key in [TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY] {
            if let Err(err) = store.remove(key).await {
                warn!(key, error = %err, "failed to remove session key");
            }
        }
        info!("session cleared");
        let _ = self.events.send(SessionEvent::LoggedOut);
    }
}

#[cfg(test)]
mod tests {
    use shared::domain::{Role, UserId};
    use storage::MemoryStore;

    use super::*;

    fn profile() -> UserProfile {
        UserProfile {
            id: UserId(12),
            username: "linh".into(),
            role: Role::Organizer,
            is_staff: false,
            email: None,
            avatar: None,
        }
    }

    #[tokio::test]
    async fn restore_requires_every_session_key() {
        let store = MemoryStore::new();
        store.set(TOKEN_KEY, "access").await.expect("set");
        let state = SessionState::new();
        assert_eq!(state.restore(&store).await.expect("restore"), None);
        assert_eq!(state.current().await, None);
    }

    #[tokio::test]
    async fn restore_then_logout_round_trip() {
        let store = MemoryStore::new();
        store.set(TOKEN_KEY, "access").await.expect("set");
        store.set(REFRESH_TOKEN_KEY, "refresh").await.expect("set");
        store
            .set(USER_KEY, &serde_json::to_string(&profile()).expect("json"))
            .await
            .expect("set");

        let state = SessionState::new();
        let mut events = state.subscribe();
        let restored = state.restore(&store).await.expect("restore");
        assert_eq!(restored, Some(profile()));
        assert_eq!(state.access_token().await.as_deref(), Some("access"));
        assert_eq!(
            events.recv().await.expect("event"),
            SessionEvent::LoggedIn(profile())
        );

        state.logout(&store).await;
        assert_eq!(state.current_user().await, None);
        assert!(store.snapshot().await.is_empty());
        assert_eq!(events.recv().await.expect("event"), SessionEvent::LoggedOut);
    }

    #[tokio::test]
    async fn malformed_stored_profile_is_an_error() {
        let store = MemoryStore::new();
        store.set(TOKEN_KEY, "access").await.expect("set");
        store.set(REFRESH_TOKEN_KEY, "refresh").await.expect("set");
        store.set(USER_KEY, "not json").await.expect("set");

        let err = SessionState::new()
            .restore(&store)
            .await
            .expect_err("must fail");
        assert!(err.to_string().contains("malformed"), "{err}");
    }
}
