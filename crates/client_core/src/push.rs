use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{info, warn};

use crate::{api::ApiClient, error::PushRegistrationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationStatus {
    Authorized,
    Provisional,
    Denied,
}

impl AuthorizationStatus {
    pub fn allows_notifications(self) -> bool {
        matches!(
            self,
            AuthorizationStatus::Authorized | AuthorizationStatus::Provisional
        )
    }
}

#[async_trait]
pub trait PushMessaging: Send + Sync {
    async fn request_permission(&self) -> Result<AuthorizationStatus>;
    async fn get_token(&self) -> Result<Option<String>>;
}

/// Used where the platform has no push service.
pub struct UnavailablePushMessaging;

#[async_trait]
impl PushMessaging for UnavailablePushMessaging {
    async fn request_permission(&self) -> Result<AuthorizationStatus> {
        Ok(AuthorizationStatus::Denied)
    }

    async fn get_token(&self) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Reports a fixed permission and device token.
pub struct StaticPushMessaging {
    status: AuthorizationStatus,
    token: Option<String>,
}

impl StaticPushMessaging {
    pub fn new(status: AuthorizationStatus, token: Option<String>) -> Self {
        Self { status, token }
    }

    pub fn authorized(token: impl Into<String>) -> Self {
        Self::new(AuthorizationStatus::Authorized, Some(token.into()))
    }
}

#[async_trait]
impl PushMessaging for StaticPushMessaging {
    async fn request_permission(&self) -> Result<AuthorizationStatus> {
        Ok(self.status)
    }

    async fn get_token(&self) -> Result<Option<String>> {
        Ok(self.token.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushRegistration {
    Registered,
    PermissionDenied,
    NoToken,
}

pub(crate) async fn register_device(
    api: &ApiClient,
    push: &dyn PushMessaging,
    access_token: &str,
) -> Result<PushRegistration, PushRegistrationError> {
    let status = push
        .request_permission()
        .await
        .map_err(PushRegistrationError::Messaging)?;
    if !status.allows_notifications() {
        info!(?status, "notification permission denied");
        return Ok(PushRegistration::PermissionDenied);
    }

    let Some(token) = push
        .get_token()
        .await
        .map_err(PushRegistrationError::Messaging)?
    else {
        return Ok(PushRegistration::NoToken);
    };

    api.save_fcm_token(access_token, &token).await?;
    Ok(PushRegistration::Registered)
}

/// Runs [`register_device`] in the background. The task never reports an
/// error to its owner.
pub(crate) fn spawn_registration(
    api: ApiClient,
    push: Arc<dyn PushMessaging>,
    access_token: String,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        match register_device(&api, push.as_ref(), &access_token).await {
            Ok(PushRegistration::Registered) => info!("push token registered"),
            Ok(outcome) => info!(?outcome, "push token not registered"),
            Err(err) => warn!(error = %err, "push token registration failed"),
        }
    })
}
