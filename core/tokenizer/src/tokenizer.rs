//! tokenize / detokenize の入口
//!
//! 流れ: 設定解決 → リクエスト組み立て → 1 回の送信 → 突き合わせ。
//! 呼び出しごとに設定を受け取り、内部で共有状態を持たない（並行に呼んでよい）。

use crate::adapter::HttpVaultTransport;
use crate::config::TokenizerConfig;
use crate::domain::{Credentials, Operation, SensitiveRecord};
use crate::error::Error;
use crate::ports::outbound::{TransportRequest, VaultTransport};
use crate::reconcile::reconcile;
use crate::request::build_request;
use std::sync::Arc;

/// トークナイザ（送信手段だけを保持する）
#[derive(Clone)]
pub struct Tokenizer {
    transport: Arc<dyn VaultTransport>,
}

impl Tokenizer {
    pub fn new(transport: Arc<dyn VaultTransport>) -> Self {
        Self { transport }
    }

    /// reqwest による標準の送信手段で作る
    pub fn http() -> Self {
        Self::new(Arc::new(HttpVaultTransport::new()))
    }

    /// 値のあるフィールドをトークンに置き換えたレコードを返す
    ///
    /// `auth_override` は設定の認証情報より優先される（特権ユーザーでの呼び出し等）。
    pub fn tokenize(
        &self,
        config: &TokenizerConfig,
        record: &SensitiveRecord,
        auth_override: Option<&Credentials>,
    ) -> Result<SensitiveRecord, Error> {
        self.run(Operation::Tokenize, config, record, auth_override)
    }

    /// トークンを元の値に戻したレコードを返す
    pub fn detokenize(
        &self,
        config: &TokenizerConfig,
        record: &SensitiveRecord,
        auth_override: Option<&Credentials>,
    ) -> Result<SensitiveRecord, Error> {
        self.run(Operation::Detokenize, config, record, auth_override)
    }

    fn run(
        &self,
        operation: Operation,
        config: &TokenizerConfig,
        record: &SensitiveRecord,
        auth_override: Option<&Credentials>,
    ) -> Result<SensitiveRecord, Error> {
        // ネットワークに触れる前に設定と入力を検証する
        let url = config.endpoint(operation)?;
        let credentials = config.resolve_credentials(auth_override)?;
        let batch = build_request(operation, record, config)?;

        let request = TransportRequest {
            operation,
            url,
            authorization: credentials.basic_auth_header(),
            timeout: config.timeout(),
            insecure_tls: config.insecure_tls,
            entries: &batch.entries,
        };
        let response = self.transport.post_batch(&request)?;

        reconcile(operation, record, &batch.meta, &response)
    }
}
