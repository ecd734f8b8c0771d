//! リクエスト組み立て
//!
//! 入力レコードを、値のあるフィールドごとに 1 つのベンダーエントリへ分解する。
//! エントリとメタは同じ順序・同じ長さで並び、レスポンスとの対応付けは配列位置だけで行う。

use crate::codec;
use crate::config::TokenizerConfig;
use crate::domain::{Field, Operation, SensitiveRecord};
use crate::error::Error;
use serde::Serialize;

/// ベンダーへ送る 1 エントリ
///
/// tokenize では `data`、detokenize では `token` にペイロードを載せる。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VendorEntry {
    pub tokengroup: String,
    pub tokentemplate: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl VendorEntry {
    /// 載せているペイロード（data / token のどちらか）
    pub fn payload(&self) -> Option<&str> {
        self.data.as_deref().or(self.token.as_deref())
    }
}

/// エントリがどのフィールドを表すか（現状は常に 1 フィールド）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryMeta {
    pub fields: Vec<Field>,
}

impl EntryMeta {
    pub fn single(field: Field) -> Self {
        Self { fields: vec![field] }
    }
}

/// 並列リスト（entries[i] と meta[i] が対応する）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBatch {
    pub entries: Vec<VendorEntry>,
    pub meta: Vec<EntryMeta>,
}

impl RequestBatch {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// 固定のフィールド順でエントリを積む。値のあるフィールドが 1 つも無ければ Validation エラー
pub fn build_request(
    operation: Operation,
    record: &SensitiveRecord,
    config: &TokenizerConfig,
) -> Result<RequestBatch, Error> {
    let mut entries = Vec::new();
    let mut meta = Vec::new();

    for field in Field::ALL {
        let Some(value) = record.present(field) else {
            continue;
        };
        let assignment = config.assignment(field);
        let (data, token) = match operation {
            Operation::Tokenize => (Some(codec::encode(value)), None),
            Operation::Detokenize => (None, Some(codec::ensure_brace_wrapped(value))),
        };
        entries.push(VendorEntry {
            tokengroup: assignment.group.to_string(),
            tokentemplate: assignment.template.to_string(),
            data,
            token,
        });
        meta.push(EntryMeta::single(field));
    }

    if entries.is_empty() {
        return Err(Error::validation(format!("No data provided to {}.", operation)));
    }

    Ok(RequestBatch { entries, meta })
}
