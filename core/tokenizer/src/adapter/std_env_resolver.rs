//! 環境変数解決の実装（std::env への委譲とインメモリ版）

use crate::ports::outbound::EnvResolver;
use std::collections::HashMap;
use std::env;

/// 標準環境変数解決実装
#[derive(Debug, Clone, Default)]
pub struct StdEnvResolver;

impl EnvResolver for StdEnvResolver {
    fn var(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }
}

/// HashMap を引くだけの実装（テスト・埋め込み用）
#[derive(Debug, Clone, Default)]
pub struct MapEnvResolver {
    vars: HashMap<String, String>,
}

impl MapEnvResolver {
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            vars: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }
}

impl EnvResolver for MapEnvResolver {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}
