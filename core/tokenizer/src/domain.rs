//! ドメイン型
//!
//! フィールド名を文字列のまま運ばず、固定順序を持つ enum に包む。
//! レコードは呼び出し側が作り、アダプタは新しいレコードを返す（入力は変更しない）。

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// 機微フィールド
///
/// 宣言順がそのままリクエストのエントリ順になる（`Ord` の派生に依存）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Firstname,
    Lastname,
    Phone,
    Creditcard,
    IDcard,
}

impl Field {
    /// リクエストに積む順序
    pub const ALL: [Field; 5] = [
        Field::Firstname,
        Field::Lastname,
        Field::Phone,
        Field::Creditcard,
        Field::IDcard,
    ];

    /// ワイヤ上の名前
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Firstname => "Firstname",
            Self::Lastname => "Lastname",
            Self::Phone => "Phone",
            Self::Creditcard => "Creditcard",
            Self::IDcard => "IDcard",
        }
    }

    /// 大文字小文字を無視して名前から解決する（firstName / FIRSTNAME 等）
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(name))
    }

    /// 氏名系（name テンプレートを使う）かどうか
    pub fn is_name(&self) -> bool {
        matches!(self, Self::Firstname | Self::Lastname)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// tokenize / detokenize の向き
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Tokenize,
    Detokenize,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tokenize => "tokenize",
            Self::Detokenize => "detokenize",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 機微レコード（フィールド名 -> 値）
///
/// 未設定と空文字はどちらも「未提供」として扱う。
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "BTreeMap<String, Value>")]
pub struct SensitiveRecord {
    values: BTreeMap<Field, String>,
}

impl SensitiveRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// ビルダー形式で値を設定する
    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    /// 値があり、trim 後に空でない場合だけ返す
    pub fn present(&self, field: Field) -> Option<&str> {
        self.get(field).filter(|v| !v.trim().is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.values.iter().map(|(f, v)| (*f, v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        Field::ALL.iter().all(|f| self.present(*f).is_none())
    }
}

impl From<BTreeMap<String, Value>> for SensitiveRecord {
    fn from(raw: BTreeMap<String, Value>) -> Self {
        let mut record = SensitiveRecord::new();
        for (key, value) in raw {
            let Some(field) = Field::from_name(&key) else {
                continue;
            };
            match value {
                Value::Null => {}
                Value::String(s) => record.set(field, s),
                other => record.set(field, other.to_string()),
            }
        }
        record
    }
}

impl Serialize for SensitiveRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (field, value) in &self.values {
            map.serialize_entry(field.as_str(), value)?;
        }
        map.end()
    }
}

/// Basic 認証のユーザー名とパスワード
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// `Authorization` ヘッダの値（`Basic base64(username:password)`）
    pub fn basic_auth_header(&self) -> String {
        let raw = format!("{}:{}", self.username, self.password);
        format!("Basic {}", STANDARD.encode(raw.as_bytes()))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
