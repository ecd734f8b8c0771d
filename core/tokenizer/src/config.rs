//! トークナイザ設定
//!
//! 呼び出し側が一度組み立てて、呼び出しごとに明示的に渡す値。
//! アダプタ内部ではプロセス全体の設定（環境変数）を読まない。

use crate::domain::{Credentials, Field, Operation};
use crate::error::Error;
use crate::ports::outbound::EnvResolver;
use regex::Regex;
use std::time::Duration;

pub const ENV_TOKENIZE_URL: &str = "TOKENIZE_API_URL";
pub const ENV_DETOKENIZE_URL: &str = "TOKENIZE_DETOKENIZE_API_URL";
pub const ENV_USERNAME: &str = "TOKENIZE_API_USERNAME";
pub const ENV_PASSWORD: &str = "TOKENIZE_API_PASSWORD";
pub const ENV_GROUP: &str = "TOKENIZE_API_GROUP";
pub const ENV_NAME_TEMPLATE: &str = "TOKENIZE_NAME_TEMPLATE";
pub const ENV_CARD_TEMPLATE: &str = "TOKENIZE_CREDITCARD_TEMPLATE";
pub const ENV_TIMEOUT_MS: &str = "TOKENIZE_TIMEOUT_MS";
pub const ENV_ALLOW_INSECURE_TLS: &str = "TOKENIZE_ALLOW_INSECURE_TLS";

pub const DEFAULT_GROUP: &str = "Test";
pub const DEFAULT_NAME_TEMPLATE: &str = "NameTemplate";
pub const DEFAULT_CARD_TEMPLATE: &str = "CreditCardTemplate";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// フィールドごとのテンプレートとトークングループ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateAssignment<'a> {
    pub group: &'a str,
    pub template: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizerConfig {
    pub tokenize_url: Option<String>,
    /// 未指定なら tokenize_url の末尾 `tokenize` を `detokenize` に置き換えて使う
    pub detokenize_url: Option<String>,
    pub credentials: Option<Credentials>,
    pub group: String,
    /// 氏名系（Firstname / Lastname）のテンプレート
    pub name_template: String,
    /// 連絡先・識別子系（Phone / Creditcard / IDcard）のテンプレート
    pub card_template: String,
    pub timeout_ms: u64,
    pub insecure_tls: bool,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            tokenize_url: None,
            detokenize_url: None,
            credentials: None,
            group: DEFAULT_GROUP.to_string(),
            name_template: DEFAULT_NAME_TEMPLATE.to_string(),
            card_template: DEFAULT_CARD_TEMPLATE.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            insecure_tls: false,
        }
    }
}

impl TokenizerConfig {
    /// 環境変数から組み立てる。URL や認証情報が無くてもここでは失敗しない（呼び出し時に検出する）
    pub fn from_env(env: &dyn EnvResolver) -> Self {
        let credentials = match (env.non_empty(ENV_USERNAME), env.non_empty(ENV_PASSWORD)) {
            (Some(u), Some(p)) => Some(Credentials::new(u, p)),
            _ => None,
        };
        let timeout_ms = env
            .var(ENV_TIMEOUT_MS)
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .unwrap_or(DEFAULT_TIMEOUT_MS);
        let insecure_tls = env
            .var(ENV_ALLOW_INSECURE_TLS)
            .map(|s| s.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Self {
            tokenize_url: env.non_empty(ENV_TOKENIZE_URL),
            detokenize_url: env.non_empty(ENV_DETOKENIZE_URL),
            credentials,
            group: env.non_empty(ENV_GROUP).unwrap_or_else(|| DEFAULT_GROUP.to_string()),
            name_template: env
                .non_empty(ENV_NAME_TEMPLATE)
                .unwrap_or_else(|| DEFAULT_NAME_TEMPLATE.to_string()),
            card_template: env
                .non_empty(ENV_CARD_TEMPLATE)
                .unwrap_or_else(|| DEFAULT_CARD_TEMPLATE.to_string()),
            timeout_ms,
            insecure_tls,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn assignment(&self, field: Field) -> TemplateAssignment<'_> {
        let template = if field.is_name() {
            &self.name_template
        } else {
            &self.card_template
        };
        TemplateAssignment {
            group: &self.group,
            template,
        }
    }

    /// 操作ごとのエンドポイントを解決する
    pub fn endpoint(&self, operation: Operation) -> Result<String, Error> {
        let tokenize_url = self.tokenize_url.as_deref().filter(|s| !s.trim().is_empty());
        match operation {
            Operation::Tokenize => tokenize_url
                .map(str::to_string)
                .ok_or_else(|| Error::config(format!("missing {} for tokenization endpoint", ENV_TOKENIZE_URL))),
            Operation::Detokenize => {
                if let Some(url) = self.detokenize_url.as_deref().filter(|s| !s.trim().is_empty()) {
                    return Ok(url.to_string());
                }
                let url = tokenize_url.ok_or_else(|| {
                    Error::config(format!(
                        "missing {} (or {}) for detokenization endpoint",
                        ENV_DETOKENIZE_URL, ENV_TOKENIZE_URL
                    ))
                })?;
                derive_detokenize_url(url)
            }
        }
    }

    /// 呼び出しごとの上書きを優先して認証情報を決める
    pub fn resolve_credentials<'a>(
        &'a self,
        auth_override: Option<&'a Credentials>,
    ) -> Result<&'a Credentials, Error> {
        let usable = |c: &&Credentials| !c.username.is_empty() && !c.password.is_empty();
        auth_override
            .filter(usable)
            .or(self.credentials.as_ref().filter(usable))
            .ok_or_else(|| {
                Error::config(format!(
                    "tokenization requires {} and {} to be set",
                    ENV_USERNAME, ENV_PASSWORD
                ))
            })
    }
}

/// `.../tokenize` を `.../detokenize` に置き換える（末尾スラッシュは保持）
fn derive_detokenize_url(tokenize_url: &str) -> Result<String, Error> {
    let re = Regex::new(r"(?i)/tokenize(/*)$").map_err(|e| Error::config(e.to_string()))?;
    if !re.is_match(tokenize_url) {
        return Err(Error::config(format!(
            "cannot derive detokenize endpoint from '{}'; set {}",
            tokenize_url, ENV_DETOKENIZE_URL
        )));
    }
    Ok(re.replace(tokenize_url, "/detokenize${1}").into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::MapEnvResolver;

    #[test]
    fn test_from_env_defaults() {
        let cfg = TokenizerConfig::from_env(&MapEnvResolver::default());
        assert_eq!(cfg, TokenizerConfig::default());
        assert_eq!(cfg.group, "Test");
        assert_eq!(cfg.timeout_ms, 10_000);
        assert!(!cfg.insecure_tls);
        assert!(cfg.credentials.is_none());
    }

    #[test]
    fn test_from_env_all_values() {
        let env = MapEnvResolver::from_pairs(&[
            (ENV_TOKENIZE_URL, "https://vault.local/api/tokenize"),
            (ENV_USERNAME, "svc"),
            (ENV_PASSWORD, "pw"),
            (ENV_GROUP, "Prod"),
            (ENV_NAME_TEMPLATE, "NT"),
            (ENV_CARD_TEMPLATE, "CT"),
            (ENV_TIMEOUT_MS, "2500"),
            (ENV_ALLOW_INSECURE_TLS, "TRUE"),
        ]);
        let cfg = TokenizerConfig::from_env(&env);
        assert_eq!(cfg.tokenize_url.as_deref(), Some("https://vault.local/api/tokenize"));
        assert_eq!(cfg.credentials, Some(Credentials::new("svc", "pw")));
        assert_eq!(cfg.group, "Prod");
        assert_eq!(cfg.timeout(), Duration::from_millis(2500));
        assert!(cfg.insecure_tls);
        assert_eq!(cfg.assignment(Field::Lastname).template, "NT");
        assert_eq!(cfg.assignment(Field::IDcard).template, "CT");
        assert_eq!(cfg.assignment(Field::Phone).group, "Prod");
    }

    #[test]
    fn test_from_env_invalid_timeout_falls_back() {
        for raw in ["0", "-5", "abc", ""] {
            let env = MapEnvResolver::from_pairs(&[(ENV_TIMEOUT_MS, raw)]);
            assert_eq!(TokenizerConfig::from_env(&env).timeout_ms, DEFAULT_TIMEOUT_MS, "{}", raw);
        }
    }

    #[test]
    fn test_from_env_partial_credentials_is_none() {
        let env = MapEnvResolver::from_pairs(&[(ENV_USERNAME, "svc"), (ENV_PASSWORD, "")]);
        assert!(TokenizerConfig::from_env(&env).credentials.is_none());
    }

    #[test]
    fn test_resolve_credentials_override_wins() {
        let cfg = TokenizerConfig {
            credentials: Some(Credentials::new("base", "pw")),
            ..Default::default()
        };
        let admin = Credentials::new("admin", "root");
        assert_eq!(cfg.resolve_credentials(Some(&admin)).unwrap().username, "admin");
        assert_eq!(cfg.resolve_credentials(None).unwrap().username, "base");
    }

    #[test]
    fn test_resolve_credentials_blank_override_falls_back() {
        let cfg = TokenizerConfig {
            credentials: Some(Credentials::new("base", "pw")),
            ..Default::default()
        };
        let blank = Credentials::new("admin", "");
        assert_eq!(cfg.resolve_credentials(Some(&blank)).unwrap().username, "base");

        let err = TokenizerConfig::default()
            .resolve_credentials(Some(&blank))
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_resolve_credentials_missing() {
        let cfg = TokenizerConfig::default();
        let err = cfg.resolve_credentials(None).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(err.to_string().contains(ENV_USERNAME));
    }

    #[test]
    fn test_endpoint_derives_detokenize() {
        let cfg = TokenizerConfig {
            tokenize_url: Some("https://vault.local/v1/Tokenize/".to_string()),
            ..Default::default()
        };
        assert_eq!(
            cfg.endpoint(Operation::Detokenize).unwrap(),
            "https://vault.local/v1/detokenize/"
        );
        assert_eq!(
            cfg.endpoint(Operation::Tokenize).unwrap(),
            "https://vault.local/v1/Tokenize/"
        );
    }

    #[test]
    fn test_endpoint_explicit_detokenize_wins() {
        let cfg = TokenizerConfig {
            tokenize_url: Some("https://vault.local/tokenize".to_string()),
            detokenize_url: Some("https://other.local/reveal".to_string()),
            ..Default::default()
        };
        assert_eq!(cfg.endpoint(Operation::Detokenize).unwrap(), "https://other.local/reveal");
    }

    #[test]
    fn test_endpoint_errors() {
        let cfg = TokenizerConfig::default();
        assert!(matches!(cfg.endpoint(Operation::Tokenize), Err(Error::Configuration(_))));
        assert!(matches!(cfg.endpoint(Operation::Detokenize), Err(Error::Configuration(_))));

        let cfg = TokenizerConfig {
            tokenize_url: Some("https://vault.local/protect".to_string()),
            ..Default::default()
        };
        let err = cfg.endpoint(Operation::Detokenize).unwrap_err();
        assert!(err.to_string().contains(ENV_DETOKENIZE_URL));
    }
}
