//! Outbound ポート: アダプタが外界を使うための trait

pub mod env_resolver;
pub mod log;
pub mod vault_transport;

pub use env_resolver::EnvResolver;
pub use log::{now_iso8601, Log, LogLevel, LogRecord};
pub use vault_transport::{TransportRequest, VaultTransport};
