mod store;
mod types;

pub use store::{NotificationStore, StoreStatsSnapshot, Subscription};
pub use types::{NotificationContent, NotificationKind, NotificationState};
