//! アダプター（外界の I/O を trait で抽象化した実装）
//!
//! 実装は標準実装（Std* / Http*）やテスト用のインメモリ実装を注入する。

pub mod file_json_log;
pub mod http_transport;
pub mod std_env_resolver;

pub use file_json_log::{FileJsonLog, NoopLog, StderrLog};
pub use http_transport::HttpVaultTransport;
pub use std_env_resolver::{MapEnvResolver, StdEnvResolver};
