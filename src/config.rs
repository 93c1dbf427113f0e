//! Config file, credentials and declaration files

use crate::paths;
use anyhow::{Context, Result, bail};
use declarative::{Intent, Params};
use serde::Deserialize;
use statuscake::{CheckType, Credentials, DEFAULT_API_BASE, ProviderConfig};
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const ENV_USERNAME: &str = "STATUSCAKE_USERNAME";
pub const ENV_API_KEY: &str = "STATUSCAKE_API_KEY";

pub const LIST_NOT_ALLOWED: &str = "state 'list' is not allowed in a declaration file";

const MISSING_CREDENTIALS: &str = "You must set STATUSCAKE_USERNAME and STATUSCAKE_API_KEY \
                                   environment variables or pass --username/--api-key";

// ============================================================================
// Config File
// ============================================================================

/// `config.toml`
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub provider: ProviderSection,
}

/// `[provider]` table
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderSection {
    pub api_base: String,
    pub timeout_secs: u64,
    pub username: Option<String>,
    pub api_key: Option<String>,
}

impl Default for ProviderSection {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            timeout_secs: 30,
            username: None,
            api_key: None,
        }
    }
}

impl Config {
    /// Load the config file from the config directory. A missing file yields defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_file()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Invalid config file {}", path.display()))
    }
}

// ============================================================================
// Credentials
// ============================================================================

/// Where a username/API key pair may come from, highest priority first.
#[derive(Debug, Default)]
pub struct CredentialSources {
    pub args: (Option<String>, Option<String>),
    pub env: (Option<String>, Option<String>),
    pub file: (Option<String>, Option<String>),
}

impl CredentialSources {
    /// Arguments, the process environment and the config file.
    pub fn gather(username: Option<String>, api_key: Option<String>, config: &Config) -> Self {
        Self {
            args: (username, api_key),
            env: (
                std::env::var(ENV_USERNAME).ok(),
                std::env::var(ENV_API_KEY).ok(),
            ),
            file: (
                config.provider.username.clone(),
                config.provider.api_key.clone(),
            ),
        }
    }

    /// The first complete pair. Halves from different sources are never mixed.
    pub fn resolve(self) -> declarative::Result<Credentials> {
        [("arguments", self.args), ("environment", self.env), ("config file", self.file)]
            .into_iter()
            .find_map(|(source, pair)| match pair {
                (Some(user), Some(key)) if !user.is_empty() && !key.is_empty() => {
                    log::debug!("Using credentials from {source}");
                    Some(Credentials::new(user, key))
                }
                _ => None,
            })
            .ok_or_else(|| declarative::Error::validation(MISSING_CREDENTIALS))
    }
}

/// Provider settings from the config file, credentials and the base URL override.
pub fn provider_config(
    config: &Config,
    credentials: Credentials,
    api_base: Option<&str>,
) -> ProviderConfig {
    ProviderConfig::new(credentials)
        .with_api_base(api_base.unwrap_or(&config.provider.api_base))
        .with_timeout(Duration::from_secs(config.provider.timeout_secs))
}

// ============================================================================
// Declaration Files
// ============================================================================

/// One check declared in a file.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub check: CheckType,
    pub intent: Intent,
    pub params: Params,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct DeclarationFile {
    uptime: Vec<toml::Table>,
    ssl: Vec<toml::Table>,
}

/// Read a declaration file: `[[uptime]]` entries first, then `[[ssl]]`, each in file order.
pub fn load_declarations(path: &Path) -> Result<Vec<Declaration>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Could not read {}", path.display()))?;
    parse_declarations(&content).with_context(|| format!("Invalid declaration file {}", path.display()))
}

pub fn parse_declarations(content: &str) -> Result<Vec<Declaration>> {
    let file: DeclarationFile = toml::from_str(content)?;
    let uptime = file.uptime.into_iter().map(|t| (CheckType::Uptime, t));
    let ssl = file.ssl.into_iter().map(|t| (CheckType::Ssl, t));

    uptime
        .chain(ssl)
        .enumerate()
        .map(|(index, (check, table))| {
            declaration(check, table)
                .with_context(|| format!("entry {} ([[{}]])", index + 1, check.key()))
        })
        .collect()
}

fn declaration(check: CheckType, mut table: toml::Table) -> Result<Declaration> {
    let intent = match table.remove("state") {
        None => Intent::Present,
        Some(value) => match value.as_str() {
            Some("present") => Intent::Present,
            Some("absent") => Intent::Absent,
            Some("list") => bail!(LIST_NOT_ALLOWED),
            _ => bail!("state must be present or absent, got {value}"),
        },
    };

    let params = match serde_json::to_value(table)? {
        serde_json::Value::Object(map) => map,
        _ => Params::new(),
    };
    Ok(Declaration {
        check,
        intent,
        params,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn pair(user: &str, key: &str) -> (Option<String>, Option<String>) {
        (Some(user.to_string()), Some(key.to_string()))
    }

    #[test]
    fn test_missing_config_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.provider.api_base, DEFAULT_API_BASE);
        assert_eq!(config.provider.timeout_secs, 30);
    }

    #[test]
    fn test_config_file_parsed() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[provider]\napi_base = \"http://localhost:8080/API\"\ntimeout_secs = 5\nusername = \"alice\"\napi_key = \"k\""
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.provider.api_base, "http://localhost:8080/API");
        assert_eq!(config.provider.username.as_deref(), Some("alice"));

        let provider = provider_config(&config, Credentials::new("alice", "k"), None);
        assert_eq!(provider.timeout(), Duration::from_secs(5));
        assert_eq!(provider.url("/SSL"), "http://localhost:8080/API/SSL");

        let overridden = provider_config(&config, Credentials::new("alice", "k"), Some("http://other/API"));
        assert_eq!(overridden.api_base(), "http://other/API");
    }

    #[test]
    fn test_unknown_config_key_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[provider]\napi_url = \"x\"").unwrap();
        assert!(Config::load_from(file.path()).is_err());
    }

    #[test]
    fn test_credentials_priority() {
        let sources = CredentialSources {
            args: pair("arg-user", "arg-key"),
            env: pair("env-user", "env-key"),
            file: pair("file-user", "file-key"),
        };
        assert_eq!(sources.resolve().unwrap().username(), "arg-user");

        let sources = CredentialSources {
            args: (Some("arg-user".into()), None),
            env: pair("env-user", "env-key"),
            ..Default::default()
        };
        assert_eq!(sources.resolve().unwrap().username(), "env-user");

        let sources = CredentialSources {
            env: (None, Some("env-key".into())),
            file: pair("file-user", "file-key"),
            ..Default::default()
        };
        assert_eq!(sources.resolve().unwrap().api_key(), "file-key");
    }

    #[test]
    fn test_missing_credentials_is_validation_error() {
        let err = CredentialSources::default().resolve().unwrap_err();
        assert!(matches!(err, declarative::Error::Validation(_)));
        assert!(err.to_string().contains("STATUSCAKE_USERNAME"));
    }

    #[test]
    fn test_parse_declarations() {
        let decls = parse_declarations(
            r#"
            [[ssl]]
            domain = "https://a.test"
            contact_group = 1000

            [[uptime]]
            name = "site1"
            url = "https://a.test"
            tags = ["prod", "web"]

            [[uptime]]
            name = "old"
            state = "absent"
            "#,
        )
        .unwrap();

        assert_eq!(decls.len(), 3);
        assert_eq!(decls[0].check, CheckType::Uptime);
        assert_eq!(decls[0].params["tags"], json!(["prod", "web"]));
        assert_eq!(decls[1].intent, Intent::Absent);
        assert!(!decls[1].params.contains_key("state"));
        assert_eq!(decls[2].check, CheckType::Ssl);
        assert_eq!(decls[2].params["contact_group"], json!(1000));
    }

    #[test]
    fn test_list_state_rejected_in_file() {
        let err = parse_declarations("[[uptime]]\nname = \"x\"\nstate = \"list\"").unwrap_err();
        assert!(format!("{err:#}").contains("not allowed"));
    }

    #[test]
    fn test_unknown_section_rejected() {
        assert!(parse_declarations("[[pagespeed]]\nname = \"x\"").is_err());
    }

    #[test]
    fn test_load_declarations_reports_path() {
        let err = load_declarations(Path::new("/nonexistent/checks.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/checks.toml"));
    }
}
