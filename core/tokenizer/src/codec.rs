//! フィールドコーデック
//!
//! 送信時は値を `{"<JSON 文字列>"}` 形式（要素 1 つのブレース区切りリスト）に包む。
//! 受信時のベンダー表現は一定しないため、次の優先順で解釈を試み、最初に成功したものを使う。
//!
//! 1. ブレース区切りリスト `{"a","b"}`（JSON としては不正な疑似配列）
//! 2. 汎用 JSON（オブジェクト・配列・JSON 文字列）
//! 3. 元の文字列をそのままスカラーとして扱う
//!
//! ブレース形式を先に見るのは、JSON パーサでは失敗する入力をブレース文法で救えるため。

use crate::error::Error;
use serde_json::Value;

/// ペイロードを解釈した結果（突き合わせの間だけ存在する）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedValue {
    /// キー付き構造（キー順を保持）
    Mapping(Vec<(String, String)>),
    /// 順序付きリスト
    List(Vec<String>),
    /// 素の文字列
    Scalar(String),
}

impl DecodedValue {
    /// Mapping のキーを大文字小文字を無視して引く（Firstname / firstname / firstName）
    pub fn lookup(&self, key: &str) -> Option<&str> {
        match self {
            Self::Mapping(entries) => entries
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    /// 位置で値を取る。List は要素、Mapping は値の並び順
    pub fn positional(&self, index: usize) -> Option<&str> {
        match self {
            Self::List(items) => items.get(index).map(String::as_str),
            Self::Mapping(entries) => entries.get(index).map(|(_, v)| v.as_str()),
            Self::Scalar(_) => None,
        }
    }
}

/// 値を要素 1 つのブレース区切りリストに変換する
///
/// 値そのものを JSON 文字列としてエスケープしてから包むので、`"` や `,` を含んでも崩れない。
pub fn encode(value: &str) -> String {
    format!("{{{}}}", Value::from(value))
}

/// detokenize 用: すでにブレース区切りリストとして読めるトークンはそのまま、そうでなければ encode する
pub fn ensure_brace_wrapped(value: &str) -> String {
    if parse_brace_list(value).is_some() {
        value.to_string()
    } else {
        encode(value)
    }
}

/// ベンダーが返した文字列を解釈する
pub fn decode(raw: &str) -> Result<DecodedValue, Error> {
    if raw.trim().is_empty() {
        return Err(Error::decoding("token payload is empty"));
    }
    if let Some(items) = parse_brace_list(raw) {
        return Ok(DecodedValue::List(items));
    }
    if let Some(value) = parse_json(raw) {
        return Ok(value);
    }
    Ok(DecodedValue::Scalar(raw.to_string()))
}

/// ブレース区切りリストとして解釈する。文法に合わなければ None
pub fn parse_brace_list(raw: &str) -> Option<Vec<String>> {
    let t = raw.trim();
    if t.len() < 2 || !t.starts_with('{') || !t.ends_with('}') {
        return None;
    }
    let inner = &t[1..t.len() - 1];
    if inner.trim().is_empty() {
        return Some(Vec::new());
    }
    split_segments(inner)?
        .into_iter()
        .map(parse_segment)
        .collect()
}

/// 汎用 JSON として解釈する。オブジェクト・配列・JSON 文字列のみ成功とする
pub fn parse_json(raw: &str) -> Option<DecodedValue> {
    match serde_json::from_str::<Value>(raw.trim()).ok()? {
        Value::Object(map) => Some(DecodedValue::Mapping(
            map.into_iter().map(|(k, v)| (k, value_text(v))).collect(),
        )),
        Value::Array(items) => Some(DecodedValue::List(items.into_iter().map(value_text).collect())),
        Value::String(s) => Some(DecodedValue::Scalar(s)),
        _ => None,
    }
}

/// クォート外のカンマで分割する。閉じていないクォートがあれば None
fn split_segments(inner: &str) -> Option<Vec<&str>> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;

    for (i, c) in inner.char_indices() {
        if in_quotes {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_quotes = false;
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            ',' => {
                segments.push(&inner[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if in_quotes {
        return None;
    }
    segments.push(&inner[start..]);
    Some(segments)
}

/// 1 セグメントを文字列にする
///
/// クォート付きなら全体が 1 つの JSON 文字列であること（`"k":"v"` のような JSON オブジェクトの断片は不可）。
/// クォート無しの素のトークンは `"` を含まないこと（`TKN:1` のような記号入りトークンは可）。
fn parse_segment(segment: &str) -> Option<String> {
    let seg = segment.trim();
    if seg.starts_with('"') {
        if closing_quote(seg)? != seg.len() - 1 {
            return None;
        }
        return serde_json::from_str::<String>(seg)
            .ok()
            .or_else(|| Some(seg[1..seg.len() - 1].to_string()));
    }
    if seg.contains('"') {
        return None;
    }
    Some(seg.trim_matches('\'').to_string())
}

/// 先頭の `"` に対応する閉じクォートのバイト位置
fn closing_quote(seg: &str) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in seg.char_indices().skip(1) {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '"' {
            return Some(i);
        }
    }
    None
}

fn value_text(v: Value) -> String {
    match v {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(items: &[&str]) -> DecodedValue {
        DecodedValue::List(items.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_encode_wraps_json_string() {
        assert_eq!(encode("Ann"), r#"{"Ann"}"#);
        assert_eq!(encode(""), r#"{""}"#);
        assert_eq!(encode(r#"a"b"#), r#"{"a\"b"}"#);
    }

    #[test]
    fn test_round_trip_with_special_characters() {
        let samples = [
            "Ann",
            "0812345678",
            r#"say "hi""#,
            "a,b,c",
            "{braced}",
            "}{",
            r#"\"#,
            "  padded  ",
            "สมชาย",
            r#"{"k":"v"}"#,
        ];
        for v in samples {
            assert_eq!(decode(&encode(v)).unwrap(), list(&[v]), "value: {:?}", v);
        }
    }

    #[test]
    fn test_comma_inside_quotes_is_not_a_delimiter() {
        assert_eq!(decode(r#"{"a","b,c"}"#).unwrap(), list(&["a", "b,c"]));
    }

    #[test]
    fn test_bare_tokens_in_braces() {
        assert_eq!(decode("{TKN-A, TKN-B}").unwrap(), list(&["TKN-A", "TKN-B"]));
        assert_eq!(decode("{'x'}").unwrap(), list(&["x"]));
        assert_eq!(decode(" {} ").unwrap(), list(&[]));
        assert_eq!(decode(r#"{"a",,"b"}"#).unwrap(), list(&["a", "", "b"]));
    }

    #[test]
    fn test_bare_tokens_may_contain_structural_characters() {
        assert_eq!(decode("{TKN:1}").unwrap(), list(&["TKN:1"]));
        assert_eq!(decode(r#"{"a", urn:tok:9}"#).unwrap(), list(&["a", "urn:tok:9"]));
        assert_eq!(decode("{tok[2]}").unwrap(), list(&["tok[2]"]));
        // 素のトークン中の `"` は不可
        assert_eq!(parse_brace_list(r#"{ab"c}"#), None);
    }

    #[test]
    fn test_json_object_is_not_taken_as_brace_list() {
        assert_eq!(parse_brace_list(r#"{"Phone":"111","Creditcard":"222"}"#), None);
        let decoded = decode(r#"{"Phone":"111","Creditcard":"222"}"#).unwrap();
        assert_eq!(
            decoded,
            DecodedValue::Mapping(vec![
                ("Phone".to_string(), "111".to_string()),
                ("Creditcard".to_string(), "222".to_string()),
            ])
        );
        assert_eq!(decoded.lookup("creditcard"), Some("222"));
        assert_eq!(decoded.positional(0), Some("111"));
    }

    #[test]
    fn test_json_array_and_string() {
        assert_eq!(decode(r#"["x", 42, null]"#).unwrap(), list(&["x", "42", ""]));
        assert_eq!(
            decode(r#""TKN-1""#).unwrap(),
            DecodedValue::Scalar("TKN-1".to_string())
        );
    }

    #[test]
    fn test_scalar_fallback() {
        assert_eq!(decode("TKN-1").unwrap(), DecodedValue::Scalar("TKN-1".to_string()));
        // JSON の数値はスカラー扱い（元の文字列を保つ）
        assert_eq!(
            decode("0012345").unwrap(),
            DecodedValue::Scalar("0012345".to_string())
        );
        assert_eq!(decode("12345").unwrap(), DecodedValue::Scalar("12345".to_string()));
        // 閉じていないクォートはブレース文法でも JSON でも読めない
        assert_eq!(
            decode(r#"{"abc}"#).unwrap(),
            DecodedValue::Scalar(r#"{"abc}"#.to_string())
        );
    }

    #[test]
    fn test_empty_payload_is_decoding_error() {
        assert!(matches!(decode(""), Err(Error::Decoding(_))));
        assert!(matches!(decode("   "), Err(Error::Decoding(_))));
    }

    #[test]
    fn test_ensure_brace_wrapped() {
        assert_eq!(ensure_brace_wrapped(r#"{"TKN-A"}"#), r#"{"TKN-A"}"#);
        assert_eq!(ensure_brace_wrapped("TKN-A"), r#"{"TKN-A"}"#);
        assert_eq!(ensure_brace_wrapped(r#"{"k":"v"}"#), r#"{"{\"k\":\"v\"}"}"#);
    }

    #[test]
    fn test_scalar_has_no_lookup_or_position() {
        let v = DecodedValue::Scalar("x".to_string());
        assert_eq!(v.lookup("x"), None);
        assert_eq!(v.positional(0), None);
    }
}
