pub mod api;
pub mod config;
pub mod error;
pub mod list_loader;
pub mod login;
pub mod messages;
pub mod navigation;
pub mod presentation;
pub mod push;
pub mod session;

pub use api::ApiClient;
pub use config::{ClientConfig, Endpoints};
pub use error::{ApiError, ConfigError, FetchError, LoginError, MissingField, PushRegistrationError};
pub use list_loader::{Cursor, ListLoader, ListState};
pub use login::{LoginController, LoginPhase, LoginSuccess};
pub use messages::Locale;
pub use navigation::{destination_for, Destination, Navigator};
pub use presentation::EventCard;
pub use push::{
    AuthorizationStatus, PushMessaging, PushRegistration, StaticPushMessaging,
    UnavailablePushMessaging,
};
pub use session::{Session, SessionEvent, SessionState};

#[cfg(test)]
#[path = "tests/mock_backend.rs"]
mod mock_backend;
