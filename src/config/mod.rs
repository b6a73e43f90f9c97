pub mod toml_config;

use crate::utils::error::{GatewayError, Result};
use crate::utils::validation::{validate_cli_token, validate_host, validate_range, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use toml_config::FileConfig;

pub const CONTRACT_ID_VAR: &str = "SOROBAN_CONTRACT_ID";
pub const OPERATOR_KEY_VAR: &str = "ALICE_PUBLIC_KEY";
pub const CLIENT_VAR: &str = "SOROBAN_CLI";
pub const SOURCE_VAR: &str = "SOROBAN_SOURCE";
pub const NETWORK_VAR: &str = "SOROBAN_NETWORK";
pub const TIMEOUT_VAR: &str = "SOROBAN_INVOKE_TIMEOUT_SECS";

pub const DEFAULT_CLIENT: &str = "soroban";
pub const DEFAULT_SOURCE: &str = "alice";
pub const DEFAULT_NETWORK: &str = "testnet";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Clone, Parser)]
#[command(name = "product-authenticity-gateway")]
#[command(about = "HTTP gateway for the product authenticity Soroban contract")]
pub struct ServerArgs {
    #[arg(long, help = "Address to bind (default 127.0.0.1)")]
    pub host: Option<String>,

    #[arg(long, help = "Port to bind (default 8000)")]
    pub port: Option<u16>,

    #[arg(long, help = "Optional TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, default_value = ".env", help = "dotenv file loaded before reading the environment")]
    pub env_file: PathBuf,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

/// 合約呼叫所需的設定；啟動時讀取一次後唯讀
///
/// `contract_id` 與 `operator_public_key` 允許缺值：缺值不會讓服務啟動失敗，
/// 而是在每個需要它們的請求上回報 `ConfigurationError`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    pub client: String,
    pub contract_id: Option<String>,
    pub operator_public_key: Option<String>,
    pub source: String,
    pub network: String,
    pub invoke_timeout_secs: Option<u64>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            client: DEFAULT_CLIENT.to_string(),
            contract_id: None,
            operator_public_key: None,
            source: DEFAULT_SOURCE.to_string(),
            network: DEFAULT_NETWORK.to_string(),
            invoke_timeout_secs: None,
        }
    }
}

impl LedgerConfig {
    pub fn new(contract_id: &str, operator_public_key: &str) -> Self {
        Self {
            contract_id: Some(contract_id.to_string()),
            operator_public_key: Some(operator_public_key.to_string()),
            ..Self::default()
        }
    }

    /// 以查詢函式覆寫欄位；空字串視為未設定
    pub fn overlay_lookup<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(client) = get(CLIENT_VAR) {
            self.client = client;
        }
        if let Some(contract_id) = get(CONTRACT_ID_VAR) {
            self.contract_id = Some(contract_id);
        }
        if let Some(key) = get(OPERATOR_KEY_VAR) {
            self.operator_public_key = Some(key);
        }
        if let Some(source) = get(SOURCE_VAR) {
            self.source = source;
        }
        if let Some(network) = get(NETWORK_VAR) {
            self.network = network;
        }
        if let Some(raw) = get(TIMEOUT_VAR) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .map_err(|e| GatewayError::InvalidConfigValueError {
                    field: TIMEOUT_VAR.to_string(),
                    value: raw.clone(),
                    reason: format!("Expected whole seconds: {}", e),
                })?;
            self.invoke_timeout_secs = Some(secs);
        }
        Ok(())
    }

    pub fn contract_id(&self) -> Option<&str> {
        self.contract_id.as_deref().filter(|v| !v.trim().is_empty())
    }

    pub fn operator_public_key(&self) -> Option<&str> {
        self.operator_public_key
            .as_deref()
            .filter(|v| !v.trim().is_empty())
    }
}

impl Validate for LedgerConfig {
    fn validate(&self) -> Result<()> {
        validate_cli_token("ledger.client", &self.client)?;
        validate_cli_token("ledger.source", &self.source)?;
        validate_cli_token("ledger.network", &self.network)?;

        if let Some(secs) = self.invoke_timeout_secs {
            validate_range("ledger.invoke_timeout_secs", secs, 1, 3600)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub log_json: bool,
}

impl ServerSettings {
    pub fn bind_address(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl Validate for ServerSettings {
    fn validate(&self) -> Result<()> {
        validate_host("server.host", &self.host)?;
        validate_range("server.port", self.port, 1, u16::MAX)?;
        Ok(())
    }
}

/// 合併後的最終設定：預設值 < TOML 檔 < 環境變數（含 .env） < 命令列參數
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub ledger: LedgerConfig,
}

impl AppConfig {
    pub fn load(args: &ServerArgs) -> Result<Self> {
        let file = args
            .config
            .as_ref()
            .map(FileConfig::from_file)
            .transpose()?;

        Self::resolve(args, file, |key| std::env::var(key).ok())
    }

    pub fn resolve<F>(args: &ServerArgs, file: Option<FileConfig>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut server = ServerSettings {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            log_json: false,
        };
        let mut ledger = LedgerConfig::default();

        if let Some(file) = file {
            file.apply(&mut server, &mut ledger);
        }

        ledger.overlay_lookup(lookup)?;

        if let Some(host) = &args.host {
            server.host = host.clone();
        }
        if let Some(port) = args.port {
            server.port = port;
        }
        if args.log_json {
            server.log_json = true;
        }

        Ok(Self { server, ledger })
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.server.validate()?;
        self.ledger.validate()
    }
}
