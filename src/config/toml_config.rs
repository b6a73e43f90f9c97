use crate::config::{LedgerConfig, ServerSettings};
use crate::utils::error::{GatewayError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    pub server: Option<ServerSection>,
    pub ledger: Option<LedgerSection>,
    pub logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerSection {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerSection {
    pub client: Option<String>,
    pub contract_id: Option<String>,
    pub operator_public_key: Option<String>,
    pub source: Option<String>,
    pub network: Option<String>,
    pub invoke_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingSection {
    pub json: Option<bool>,
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern is valid"))
}

impl FileConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(GatewayError::IoError)?;
        Self::from_toml_str(&content, |key| std::env::var(key).ok())
    }

    /// 從 TOML 字串解析配置，`${VAR}` 以 lookup 的結果替換
    pub fn from_toml_str<F>(content: &str, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let processed_content = Self::substitute_env_vars(content, lookup);

        toml::from_str(&processed_content).map_err(|e| GatewayError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 未定義的變數替換為空字串，讓對應欄位視同未設定
    fn substitute_env_vars<F>(content: &str, lookup: F) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        placeholder_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                lookup(&caps[1]).unwrap_or_default()
            })
            .into_owned()
    }

    pub fn apply(self, server: &mut ServerSettings, ledger: &mut LedgerConfig) {
        if let Some(section) = self.server {
            if let Some(host) = section.host {
                server.host = host;
            }
            if let Some(port) = section.port {
                server.port = port;
            }
        }

        if let Some(section) = self.ledger {
            let non_empty = |v: String| if v.trim().is_empty() { None } else { Some(v) };

            if let Some(client) = section.client.and_then(non_empty) {
                ledger.client = client;
            }
            if let Some(contract_id) = section.contract_id.and_then(non_empty) {
                ledger.contract_id = Some(contract_id);
            }
            if let Some(key) = section.operator_public_key.and_then(non_empty) {
                ledger.operator_public_key = Some(key);
            }
            if let Some(source) = section.source.and_then(non_empty) {
                ledger.source = source;
            }
            if let Some(network) = section.network.and_then(non_empty) {
                ledger.network = network;
            }
            if section.invoke_timeout_secs.is_some() {
                ledger.invoke_timeout_secs = section.invoke_timeout_secs;
            }
        }

        if let Some(json) = self.logging.and_then(|l| l.json) {
            server.log_json = json;
        }
    }
}
