//! Ports & Adapters のポート定義
//!
//! - inbound: なし（ライブラリのためアプリの入り口を持たない）
//! - outbound: アダプタが外界（環境変数・ログ・ベンダー API）に依頼するための trait

pub mod outbound;
