//! レスポンスとメタの突き合わせ
//!
//! ベンダーはエントリにフィールド名を付けて返さないため、配列位置だけが対応付けのキーになる。
//! 長さが合わない・失敗エントリがある場合は全体を失敗にする（部分的な結果は返さない）。

use crate::codec::{self, DecodedValue};
use crate::domain::{Field, Operation, SensitiveRecord};
use crate::error::{Error, ProtocolError};
use crate::request::EntryMeta;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const STATUS_SUCCEED: &str = "Succeed";

/// ベンダーが返す 1 エントリ
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VendorResponseEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// エラーメッセージ等、その他のキー（失敗時の表示用）
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VendorResponseEntry {
    pub fn succeeded(token: impl Into<String>) -> Self {
        Self {
            status: Some(STATUS_SUCCEED.to_string()),
            token: Some(Value::String(token.into())),
            ..Default::default()
        }
    }

    pub fn is_succeed(&self) -> bool {
        self.status.as_deref() == Some(STATUS_SUCCEED)
    }

    /// ペイロード文字列。tokenize は token、detokenize は data を優先し、無ければもう一方を見る。
    /// 文字列以外の JSON は JSON テキストに戻す
    pub fn payload_text(&self, operation: Operation) -> Option<String> {
        let (primary, secondary) = match operation {
            Operation::Tokenize => (&self.token, &self.data),
            Operation::Detokenize => (&self.data, &self.token),
        };
        let value = primary
            .as_ref()
            .filter(|v| !v.is_null())
            .or(secondary.as_ref().filter(|v| !v.is_null()))?;
        match value {
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    fn describe(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{:?}", self))
    }
}

/// レスポンス配列から出力レコードを組み立てる
///
/// 入力レコードのコピーに、解決できた値だけを上書きする。送らなかったフィールドはそのまま残る。
pub fn reconcile(
    operation: Operation,
    input: &SensitiveRecord,
    meta: &[EntryMeta],
    response: &[VendorResponseEntry],
) -> Result<SensitiveRecord, Error> {
    if response.len() != meta.len() {
        return Err(ProtocolError::LengthMismatch {
            expected: meta.len(),
            actual: response.len(),
        }
        .into());
    }

    let mut result = input.clone();
    for (index, (entry, entry_meta)) in response.iter().zip(meta).enumerate() {
        if !entry.is_succeed() {
            return Err(ProtocolError::EntryFailed {
                index,
                entry: entry.describe(),
            }
            .into());
        }
        let raw = entry
            .payload_text(operation)
            .ok_or_else(|| Error::decoding(format!("entry {} is missing its token payload", index)))?;
        let decoded = codec::decode(&raw)?;

        for (position, field) in entry_meta.fields.iter().enumerate() {
            if let Some(value) = resolve_field(operation, input, *field, position, &decoded, &raw) {
                result.set(*field, value);
            }
        }
    }
    Ok(result)
}

/// 値の解決順: キー一致 → 位置 → 生ペイロード → （detokenize のみ）入力値のパススルー。空でない最初のものを採用
fn resolve_field(
    operation: Operation,
    input: &SensitiveRecord,
    field: Field,
    position: usize,
    decoded: &DecodedValue,
    raw: &str,
) -> Option<String> {
    let passthrough = match operation {
        Operation::Detokenize => input.get(field),
        Operation::Tokenize => None,
    };
    decoded
        .lookup(field.as_str())
        .filter(|v| !v.is_empty())
        .or_else(|| decoded.positional(position).filter(|v| !v.is_empty()))
        .or_else(|| Some(raw).filter(|v| !v.is_empty()))
        .or_else(|| passthrough.filter(|v| !v.is_empty()))
        .map(str::to_string)
}
