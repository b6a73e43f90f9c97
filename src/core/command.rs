use crate::config::{LedgerConfig, CONTRACT_ID_VAR, OPERATOR_KEY_VAR};
use crate::domain::model::{OwnershipTransfer, ProductRegistration};
use crate::utils::error::{GatewayError, Result};
use std::fmt;

/// 合約的進入點
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    RegisterProduct,
    TransferOwnership,
    GetProductDetails,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::RegisterProduct => "register_product",
            Verb::TransferOwnership => "transfer_ownership",
            Verb::GetProductDetails => "get_product_details",
        }
    }

    pub fn is_write(&self) -> bool {
        !matches!(self, Verb::GetProductDetails)
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 將 (verb, 參數) 轉為 `soroban contract invoke` 的參數列表
///
/// 純函式：相同輸入永遠產生相同的參數序列。所有寫入操作都以設定中的
/// 單一簽署身分 (`source`) 送出，與請求中名義上的擁有者無關。
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    config: LedgerConfig,
}

impl CommandBuilder {
    pub fn new(config: LedgerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn register_product(&self, request: &ProductRegistration) -> Result<Vec<String>> {
        let operator_key = self.require_operator_key()?;
        self.build(
            Verb::RegisterProduct,
            &[
                ("manufacturer", operator_key),
                ("product_id", request.product_id.as_str()),
            ],
        )
    }

    pub fn transfer_ownership(&self, request: &OwnershipTransfer) -> Result<Vec<String>> {
        self.require_operator_key()?;
        self.build(
            Verb::TransferOwnership,
            &[
                ("current_owner", request.current_owner_public_key.as_str()),
                ("product_id", request.product_id.as_str()),
                ("new_owner", request.new_owner_public_key.as_str()),
            ],
        )
    }

    pub fn get_product_details(&self, product_id: &str) -> Result<Vec<String>> {
        self.build(Verb::GetProductDetails, &[("product_id", product_id)])
    }

    /// 參數依傳入順序展開為 `--name value`
    pub fn build(&self, verb: Verb, params: &[(&str, &str)]) -> Result<Vec<String>> {
        let contract_id = self.require_contract_id(verb)?;

        let mut argv = Vec::with_capacity(10 + params.len() * 2);
        argv.extend(
            [
                self.config.client.as_str(),
                "contract",
                "invoke",
                "--id",
                contract_id,
                "--source",
                self.config.source.as_str(),
                "--network",
                self.config.network.as_str(),
                "--",
                verb.as_str(),
            ]
            .iter()
            .map(|s| s.to_string()),
        );

        for (name, value) in params {
            argv.push(format!("--{}", name));
            argv.push(value.to_string());
        }

        Ok(argv)
    }

    fn require_contract_id(&self, verb: Verb) -> Result<&str> {
        match self.config.contract_id() {
            Some(id) => Ok(id),
            None => {
                let mut missing = vec![CONTRACT_ID_VAR];
                if verb.is_write() && self.config.operator_public_key().is_none() {
                    missing.push(OPERATOR_KEY_VAR);
                }
                Err(GatewayError::ConfigurationError { missing })
            }
        }
    }

    fn require_operator_key(&self) -> Result<&str> {
        match (self.config.contract_id(), self.config.operator_public_key()) {
            (_, Some(key)) => Ok(key),
            (Some(_), None) => Err(GatewayError::ConfigurationError {
                missing: vec![OPERATOR_KEY_VAR],
            }),
            (None, None) => Err(GatewayError::ConfigurationError {
                missing: vec![CONTRACT_ID_VAR, OPERATOR_KEY_VAR],
            }),
        }
    }
}
