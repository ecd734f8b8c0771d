//! エラーハンドリング
//!
//! アダプタが返すエラーはすべてこの型に集約する。呼び出し側（CLI / CRUD サーバ）は
//! バリアントで失敗の種類を判別し、表示方針や終了コードを決める。

/// ベンダーとのやり取りが契約どおりでなかった場合の詳細
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("tokenization API failed with status {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("tokenization API response length does not match the request (expected {expected}, got {actual})")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("tokenization entry {index} failed: {entry}")]
    EntryFailed { index: usize, entry: String },
    #[error("tokenization API returned an unexpected payload: {0}")]
    UnexpectedPayload(String),
}

/// エラー型
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// 接続先・認証情報の不足（ネットワーク呼び出し前に検出）
    #[error("configuration error: {0}")]
    Configuration(String),
    /// 送るものが無い等、入力レコードの不備
    #[error("{0}")]
    Validation(String),
    /// 接続拒否・DNS・TLS 等の通信失敗
    #[error("tokenization API request failed: {0}")]
    Transport(String),
    /// タイムアウトで打ち切った
    #[error("tokenization API request timed out after {0}ms")]
    Timeout(u64),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    /// ペイロードをどの形式でも解釈できなかった
    #[error("unable to decode token payload: {0}")]
    Decoding(String),
    /// 呼び出し側の引数不正（CLI）
    #[error("{0}")]
    InvalidArgument(String),
    #[error("I/O error: {0}")]
    Io(String),
    #[error("JSON error: {0}")]
    Json(String),
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn decoding(msg: impl Into<String>) -> Self {
        Self::Decoding(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn io_msg(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    pub fn json(msg: impl Into<String>) -> Self {
        Self::Json(msg.into())
    }

    /// 使い方の誤り（usage を表示すべきもの）
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    pub fn is_protocol(&self) -> bool {
        matches!(self, Self::Protocol(_))
    }

    /// sysexits に揃えた終了コード
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidArgument(_) | Self::Validation(_) => 64,
            Self::Decoding(_) | Self::Json(_) => 65,
            Self::Transport(_) | Self::Timeout(_) => 69,
            Self::Io(_) => 74,
            Self::Protocol(_) => 76,
            Self::Configuration(_) => 78,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
