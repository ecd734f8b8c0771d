//! 個人情報トークナイザ
//!
//! 氏名・電話番号・カード番号・身分証番号をリモートのトークナイズサービスで
//! 不透明なトークンに置き換え、読み出し時に元の値へ戻すアダプタ。

/// エラーハンドリング
pub mod error;

/// ドメイン型（フィールド・レコード・認証情報）
pub mod domain;

/// 接続先・テンプレート・タイムアウトの設定
pub mod config;

/// フィールド値とベンダー表現の相互変換
pub mod codec;

/// リクエスト組み立て（エントリとメタの並列リスト）
pub mod request;

/// レスポンスとメタの突き合わせ
pub mod reconcile;

/// tokenize / detokenize の入口
pub mod tokenizer;

/// Ports & Adapters のポート定義
pub mod ports;

/// 標準アダプタ
pub mod adapter;

#[cfg(test)]
mod tests;

pub use config::TokenizerConfig;
pub use domain::{Credentials, Field, SensitiveRecord};
pub use error::{Error, ProtocolError};
pub use tokenizer::Tokenizer;
