//! ベンダー API 呼び出し Outbound ポート
//!
//! 1 回の tokenize / detokenize につき 1 回だけ呼ばれ、全エントリを 1 リクエストで送る。
//! リトライはしない。

use crate::domain::Operation;
use crate::error::Error;
use crate::reconcile::VendorResponseEntry;
use crate::request::VendorEntry;
use std::time::Duration;

/// 1 回分のバッチ送信内容
#[derive(Debug, Clone)]
pub struct TransportRequest<'a> {
    pub operation: Operation,
    pub url: String,
    /// `Authorization` ヘッダの値（`Basic ...`）
    pub authorization: String,
    pub timeout: Duration,
    /// 不正な証明書を受け入れるか（このクライアントに限る）
    pub insecure_tls: bool,
    pub entries: &'a [VendorEntry],
}

/// ベンダー API への送信抽象
///
/// 実装は `HttpVaultTransport`（reqwest）やテスト用のスタブ。
pub trait VaultTransport: Send + Sync {
    /// バッチを送り、レスポンス配列を返す（長さ・status の検証は呼び出し側）
    ///
    /// タイムアウトは `Error::Timeout`、それ以外の通信失敗は `Error::Transport`、
    /// 2xx 以外は `ProtocolError::HttpStatus` で返す。
    fn post_batch(&self, request: &TransportRequest<'_>) -> Result<Vec<VendorResponseEntry>, Error>;
}
