//! reqwest（blocking）によるベンダー API 送信
//!
//! 呼び出しごとにタイムアウトと TLS 方針を反映したクライアントを作る。
//! 不正証明書の許可はこのクライアントに閉じ、プロセス全体の設定は変えない。

use crate::error::{Error, ProtocolError};
use crate::ports::outbound::{TransportRequest, VaultTransport};
use crate::reconcile::VendorResponseEntry;
use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use std::time::Duration;

/// reqwest による VaultTransport 実装
#[derive(Debug, Clone, Default)]
pub struct HttpVaultTransport;

impl HttpVaultTransport {
    pub fn new() -> Self {
        Self
    }

    fn client(timeout: Duration, insecure_tls: bool) -> Result<Client, Error> {
        Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(insecure_tls)
            .build()
            .map_err(|e| Error::transport(format!("failed to build HTTP client: {}", e)))
    }
}

impl VaultTransport for HttpVaultTransport {
    fn post_batch(&self, request: &TransportRequest<'_>) -> Result<Vec<VendorResponseEntry>, Error> {
        let client = Self::client(request.timeout, request.insecure_tls)?;
        let body = serde_json::to_string(request.entries)?;

        let response = client
            .post(&request.url)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, request.authorization.as_str())
            .body(body)
            .send()
            .map_err(|e| classify(e, request.timeout))?;

        let status = response.status();
        if !status.is_success() {
            // 本文が読めなくてもステータスは返す
            let body = response
                .text()
                .ok()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| status.canonical_reason().unwrap_or_default().to_string());
            return Err(ProtocolError::HttpStatus {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let response_text = response.text().map_err(|e| classify(e, request.timeout))?;
        parse_response(&response_text)
    }
}

/// レスポンス本文を JSON 配列として読む
fn parse_response(text: &str) -> Result<Vec<VendorResponseEntry>, Error> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| ProtocolError::UnexpectedPayload(format!("invalid JSON: {}", e)))?;
    let Value::Array(items) = value else {
        return Err(ProtocolError::UnexpectedPayload("expected a JSON array".to_string()).into());
    };
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            serde_json::from_value::<VendorResponseEntry>(item)
                .map_err(|e| Error::from(ProtocolError::UnexpectedPayload(format!("entry {}: {}", i, e))))
        })
        .collect()
}

/// タイムアウトとそれ以外の通信失敗を分ける
fn classify(e: reqwest::Error, timeout: Duration) -> Error {
    if e.is_timeout() {
        return Error::Timeout(timeout_ms(timeout));
    }
    Error::transport(error_chain(&e))
}

fn timeout_ms(timeout: Duration) -> u64 {
    u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX)
}

fn error_chain(e: &dyn std::error::Error) -> String {
    let mut msg = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !msg.contains(&text) {
            msg.push_str(": ");
            msg.push_str(&text);
        }
        source = cause.source();
    }
    msg
}
