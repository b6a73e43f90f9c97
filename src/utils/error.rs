use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("{} environment variable(s) not set. Please check your .env file.", .missing.join(" or "))]
    ConfigurationError { missing: Vec<&'static str> },

    #[error("Failed to start `{program}`: {source}")]
    InvocationError {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Soroban CLI error: {stderr}")]
    CommandError {
        stdout: String,
        stderr: String,
        exit_code: Option<i32>,
    },

    #[error("Failed to parse product details from CLI output. Raw output: {raw}")]
    ParseError { raw: String },

    #[error("Product not found")]
    NotFoundError { product_id: String },

    #[error("Soroban CLI did not finish within {seconds}s")]
    TimeoutError { seconds: u64 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid configuration value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

impl GatewayError {
    /// 是否為「產品不存在」類錯誤
    pub fn is_not_found(&self) -> bool {
        matches!(self, GatewayError::NotFoundError { .. })
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_names_every_missing_variable() {
        let err = GatewayError::ConfigurationError {
            missing: vec!["SOROBAN_CONTRACT_ID", "ALICE_PUBLIC_KEY"],
        };
        let message = err.to_string();
        assert!(message.contains("SOROBAN_CONTRACT_ID"));
        assert!(message.contains("ALICE_PUBLIC_KEY"));
    }

    #[test]
    fn test_not_found_message_hides_product_id() {
        let err = GatewayError::NotFoundError {
            product_id: "secret-sku".to_string(),
        };
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Product not found");
    }
}
