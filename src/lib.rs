// Infrastructure layer (shared components)
pub mod config;
pub mod error;
pub mod telemetry;

// Domain layer
pub mod notification;

pub use config::Settings;
pub use error::{AppError, Result};
pub use notification::{
    NotificationContent, NotificationKind, NotificationState, NotificationStore, Subscription,
};
