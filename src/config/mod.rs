mod settings;

pub use settings::{NotificationConfig, ProxyConfig, ServerConfig, Settings};
