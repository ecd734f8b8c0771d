//! 環境変数解決 Outbound ポート
//!
//! 設定の組み立て（`TokenizerConfig::from_env`）はこの trait 経由でのみ環境変数を読む。
//! テストでは `MapEnvResolver` を注入してプロセス全体の状態に触れない。

/// 環境変数解決抽象（Outbound ポート）
///
/// 実装は `tokenizer::adapter::StdEnvResolver` やテスト用の `MapEnvResolver` など。
pub trait EnvResolver: Send + Sync {
    /// 変数の値を返す。未設定なら None
    fn var(&self, key: &str) -> Option<String>;

    /// 未設定と空文字をどちらも None にする
    fn non_empty(&self, key: &str) -> Option<String> {
        self.var(key).filter(|s| !s.trim().is_empty())
    }
}
