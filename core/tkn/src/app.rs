//! 入力レコードの読み取りとアダプタ呼び出し
//!
//! stdin の JSON（オブジェクト 1 件または配列）かフラグで与えた値を受け取り、
//! 1 レコードずつ Tokenizer に渡す。フィールド以外のキー（id 等）はそのまま残す。

use crate::cli::Config;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::io::Read;
use std::sync::Arc;
use tokenizer::domain::{Credentials, Field, Operation};
use tokenizer::ports::outbound::{Log, LogLevel, LogRecord};
use tokenizer::{Error, SensitiveRecord, Tokenizer, TokenizerConfig};

/// 処理対象の入力
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    /// 1 件（フラグまたは stdin の JSON オブジェクト）
    Single(Map<String, Value>),
    /// stdin の JSON 配列。要素ごとに独立して呼び出す
    Batch(Vec<Map<String, Value>>),
}

/// フラグ指定があればそれを、無ければ reader の JSON を入力にする
pub fn read_input(config: &Config, reader: &mut dyn Read) -> Result<Input, Error> {
    if !config.fields.is_empty() {
        let record = config
            .fields
            .iter()
            .map(|(field, value)| (field.as_str().to_string(), Value::String(value.clone())))
            .collect();
        return Ok(Input::Single(record));
    }
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    parse_input(&text)
}

/// JSON テキストを入力として解釈する
pub fn parse_input(text: &str) -> Result<Input, Error> {
    if text.trim().is_empty() {
        return Err(Error::invalid_argument(
            "no input: pass field flags or a JSON record on stdin",
        ));
    }
    match serde_json::from_str::<Value>(text)? {
        Value::Object(record) => Ok(Input::Single(record)),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::Object(record) => Ok(record),
                _ => Err(Error::json(format!("record {}: expected a JSON object", i))),
            })
            .collect::<Result<Vec<_>, Error>>()
            .map(Input::Batch),
        _ => Err(Error::json("expected a JSON object or an array of objects")),
    }
}

/// 配線済みの依存一式
pub struct App {
    pub tokenizer: Tokenizer,
    pub tokenizer_config: TokenizerConfig,
    pub logger: Arc<dyn Log>,
}

impl App {
    /// 入力を処理して出力 JSON を返す
    ///
    /// 配列入力で `keep_raw_on_error` が真なら、失敗したレコードは元のまま出力し warn を 1 件記録する。
    pub fn process(
        &self,
        operation: Operation,
        input: Input,
        credentials: Option<&Credentials>,
        keep_raw_on_error: bool,
    ) -> Result<Value, Error> {
        match input {
            Input::Single(raw) => self
                .process_one(operation, &raw, credentials)
                .map(Value::Object),
            Input::Batch(rows) => {
                let mut out = Vec::with_capacity(rows.len());
                for (index, raw) in rows.into_iter().enumerate() {
                    match self.process_one(operation, &raw, credentials) {
                        Ok(record) => out.push(Value::Object(record)),
                        Err(e) if keep_raw_on_error => {
                            let _ = self.logger.log(
                                &LogRecord::new(
                                    LogLevel::Warn,
                                    "cli",
                                    "record",
                                    format!("{} failed; keeping raw record", operation),
                                )
                                .field("index", json!(index))
                                .field("error", json!(e.to_string()))
                                .field("exit_code", json!(e.exit_code())),
                            );
                            out.push(Value::Object(raw));
                        }
                        Err(e) => return Err(e),
                    }
                }
                Ok(Value::Array(out))
            }
        }
    }

    fn process_one(
        &self,
        operation: Operation,
        raw: &Map<String, Value>,
        credentials: Option<&Credentials>,
    ) -> Result<Map<String, Value>, Error> {
        let record = to_record(raw);
        let result = match operation {
            Operation::Tokenize => self
                .tokenizer
                .tokenize(&self.tokenizer_config, &record, credentials)?,
            Operation::Detokenize => self
                .tokenizer
                .detokenize(&self.tokenizer_config, &record, credentials)?,
        };
        Ok(overlay(raw, &result))
    }
}

fn to_record(raw: &Map<String, Value>) -> SensitiveRecord {
    raw.iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect::<BTreeMap<String, Value>>()
        .into()
}

/// 元のオブジェクトのキー（大文字小文字も含めて）を保ったまま結果の値を書き戻す
fn overlay(raw: &Map<String, Value>, result: &SensitiveRecord) -> Map<String, Value> {
    let mut out = raw.clone();
    let mut written: Vec<Field> = Vec::new();
    for (key, value) in out.iter_mut() {
        let Some(field) = Field::from_name(key) else {
            continue;
        };
        if let Some(v) = result.get(field) {
            *value = Value::String(v.to_string());
            written.push(field);
        }
    }
    for (field, v) in result.iter() {
        if !written.contains(&field) {
            out.insert(field.as_str().to_string(), Value::String(v.to_string()));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_input_object() {
        let input = parse_input(r#"{"id": 3, "Firstname": "Ann"}"#).unwrap();
        let Input::Single(record) = input else {
            panic!("expected single record");
        };
        assert_eq!(record["id"], 3);
    }

    #[test]
    fn test_parse_input_array() {
        let input = parse_input(r#"[{"Firstname": "Ann"}, {"Lastname": "Lee"}]"#).unwrap();
        assert!(matches!(input, Input::Batch(ref rows) if rows.len() == 2));
    }

    #[test]
    fn test_parse_input_rejects_scalars() {
        let err = parse_input("42").unwrap_err();
        assert_eq!(err.exit_code(), 65);
        let err = parse_input(r#"[{"Firstname": "Ann"}, "Lee"]"#).unwrap_err();
        assert!(err.to_string().contains("record 1"));
        let err = parse_input("{not json").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_parse_input_empty_is_usage_error() {
        assert!(parse_input("  \n").unwrap_err().is_usage());
    }

    #[test]
    fn test_read_input_prefers_flags() {
        let config = Config {
            fields: vec![(Field::Phone, "0812345678".to_string())],
            ..Default::default()
        };
        let mut stdin: &[u8] = b"this is never read";
        let input = read_input(&config, &mut stdin).unwrap();
        let Input::Single(record) = input else {
            panic!("expected single record");
        };
        assert_eq!(record["Phone"], "0812345678");
    }

    #[test]
    fn test_overlay_keeps_original_keys() {
        let raw: Map<String, Value> =
            serde_json::from_str(r#"{"id": 7, "firstname": "Ann", "Phone": 812345678, "IDcard": null}"#)
                .unwrap();
        let result = SensitiveRecord::new()
            .with(Field::Firstname, "TKN-A")
            .with(Field::Phone, "TKN-P");
        let out = overlay(&raw, &result);
        assert_eq!(out["id"], 7);
        assert_eq!(out["firstname"], "TKN-A");
        assert_eq!(out["Phone"], "TKN-P");
        assert_eq!(out["IDcard"], Value::Null);
        assert!(!out.contains_key("Firstname"));
        let keys: Vec<&str> = out.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["id", "firstname", "Phone", "IDcard"]);
    }
}
