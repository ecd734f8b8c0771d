//! 配線: 標準アダプタで App を組み立てる

use crate::app::App;
use crate::cli::Config;
use std::path::PathBuf;
use std::sync::Arc;
use tokenizer::adapter::{FileJsonLog, NoopLog, StderrLog};
use tokenizer::ports::outbound::{EnvResolver, Log};
use tokenizer::{Tokenizer, TokenizerConfig};

/// JSONL ログの出力先を指定する環境変数（--log-file が優先）
pub const ENV_LOG_FILE: &str = "TOKENIZE_LOG_FILE";

/// 配線: 環境変数とフラグから設定を解決し、HTTP 送信の Tokenizer を組み立てる
pub fn wire_tkn(config: &Config, env: &dyn EnvResolver) -> App {
    let mut tokenizer_config = TokenizerConfig::from_env(env);
    if let Some(ms) = config.timeout_ms {
        tokenizer_config.timeout_ms = ms;
    }
    App {
        tokenizer: Tokenizer::http(),
        tokenizer_config,
        logger: logger_for(config, env),
    }
}

/// ログファイル指定 > --verbose（stderr）> 出力なし
pub fn logger_for(config: &Config, env: &dyn EnvResolver) -> Arc<dyn Log> {
    let path = config
        .log_file
        .clone()
        .or_else(|| env.non_empty(ENV_LOG_FILE).map(PathBuf::from));
    match path {
        Some(path) => Arc::new(FileJsonLog::new(path)),
        None if config.verbose => Arc::new(StderrLog),
        None => Arc::new(NoopLog),
    }
}
