use crate::config::LedgerConfig;
use crate::core::command::{CommandBuilder, Verb};
use crate::core::invoker::SorobanCli;
use crate::core::normalizer::{self, contract_error_code, Normalized};
use crate::domain::model::{OwnershipTransfer, ProductDetails, ProductRegistration};
use crate::domain::ports::CommandRunner;
use crate::utils::error::{GatewayError, Result};
use std::sync::Arc;
use std::time::Duration;

/// 組合 CommandBuilder → CommandRunner → normalizer 的流程
#[derive(Clone)]
pub struct LedgerGateway {
    builder: CommandBuilder,
    runner: Arc<dyn CommandRunner>,
}

impl LedgerGateway {
    pub fn new(config: LedgerConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            builder: CommandBuilder::new(config),
            runner,
        }
    }

    /// 以真實的 soroban CLI 作為執行器
    pub fn with_soroban_cli(config: LedgerConfig) -> Self {
        let timeout = config.invoke_timeout_secs.map(Duration::from_secs);
        let runner = Arc::new(SorobanCli::new().with_timeout(timeout));
        Self::new(config, runner)
    }

    pub fn config(&self) -> &LedgerConfig {
        self.builder.config()
    }

    pub async fn register_product(&self, request: &ProductRegistration) -> Result<String> {
        let argv = self.builder.register_product(request)?;
        self.write(Verb::RegisterProduct, &argv, &request.product_id)
            .await
    }

    pub async fn transfer_ownership(&self, request: &OwnershipTransfer) -> Result<String> {
        let argv = self.builder.transfer_ownership(request)?;
        self.write(Verb::TransferOwnership, &argv, &request.product_id)
            .await
    }

    pub async fn get_product_details(&self, product_id: &str) -> Result<ProductDetails> {
        let verb = Verb::GetProductDetails;
        let argv = self.builder.get_product_details(product_id)?;

        let output = match self.runner.run(&argv).await {
            Ok(output) => output,
            Err(GatewayError::CommandError {
                stdout,
                stderr,
                exit_code,
            }) => {
                if let Some(Normalized::NotFound { product_id }) =
                    normalizer::normalize_failure(verb, &stdout, &stderr, product_id)
                {
                    tracing::info!("🔍 Product {} not found on ledger", product_id);
                    return Err(GatewayError::NotFoundError { product_id });
                }
                return Err(GatewayError::CommandError {
                    stdout,
                    stderr,
                    exit_code,
                });
            }
            Err(e) => return Err(e),
        };

        match normalizer::normalize(verb, output.trimmed_stdout(), product_id) {
            Normalized::Details(details) => {
                tracing::debug!(
                    product_id = %details.product_id,
                    registered_at = ?details.registered_at_utc(),
                    "Product details resolved"
                );
                Ok(details)
            }
            Normalized::NotFound { product_id } => {
                tracing::info!("🔍 Product {} not found on ledger", product_id);
                Err(GatewayError::NotFoundError { product_id })
            }
            Normalized::ParseError { raw } => Err(GatewayError::ParseError { raw }),
            Normalized::OpaqueSuccess(raw) => Err(GatewayError::ParseError { raw }),
        }
    }

    async fn write(&self, verb: Verb, argv: &[String], product_id: &str) -> Result<String> {
        match self.runner.run(argv).await {
            Ok(output) => {
                tracing::info!("✅ {} submitted for product {}", verb, product_id);
                // 寫入動作的輸出不解析，原樣回傳
                Ok(output.trimmed_stdout().to_string())
            }
            Err(e) => {
                if let GatewayError::CommandError { stderr, stdout, .. } = &e {
                    if let Some(code) =
                        contract_error_code(stderr).or_else(|| contract_error_code(stdout))
                    {
                        tracing::warn!("❌ {} rejected by contract: {}", verb, code);
                    }
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::CommandOutput;
    use async_trait::async_trait;
    use std::sync::Mutex;

    const CONTRACT: &str = "CCONTRACT";
    const OPERATOR: &str = "GOPERATOR";

    /// 回傳預先設定的結果並記錄收到的參數
    struct ScriptedRunner {
        reply: Mutex<Option<Result<CommandOutput>>>,
        calls: Mutex<Vec<Vec<String>>>,
    }

    impl ScriptedRunner {
        fn new(reply: Result<CommandOutput>) -> Arc<Self> {
            Arc::new(Self {
                reply: Mutex::new(Some(reply)),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn stdout(text: &str) -> Arc<Self> {
            Self::new(Ok(CommandOutput {
                stdout: text.to_string(),
                stderr: String::new(),
                exit_code: Some(0),
            }))
        }

        fn failure(stderr: &str) -> Arc<Self> {
            Self::failure_with("", stderr)
        }

        fn failure_with(stdout: &str, stderr: &str) -> Arc<Self> {
            Self::new(Err(GatewayError::CommandError {
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
                exit_code: Some(1),
            }))
        }

        fn calls(&self) -> Vec<Vec<String>> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CommandRunner for ScriptedRunner {
        async fn run(&self, argv: &[String]) -> Result<CommandOutput> {
            self.calls.lock().unwrap().push(argv.to_vec());
            self.reply
                .lock()
                .unwrap()
                .take()
                .expect("runner called more than once")
        }
    }

    fn gateway(runner: Arc<ScriptedRunner>) -> LedgerGateway {
        LedgerGateway::new(LedgerConfig::new(CONTRACT, OPERATOR), runner)
    }

    #[tokio::test]
    async fn test_register_returns_trimmed_cli_output() {
        let runner = ScriptedRunner::stdout("\"Product registered successfully\"\n\n");
        let output = gateway(runner.clone())
            .register_product(&ProductRegistration {
                product_id: "P1".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(output, "\"Product registered successfully\"");
        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(&calls[0][10..12], &["register_product", "--manufacturer"]);
    }

    #[tokio::test]
    async fn test_write_failure_is_command_error_even_for_not_found_code() {
        let runner = ScriptedRunner::failure("HostError: Error(Contract, #101)");
        let err = gateway(runner)
            .transfer_ownership(&OwnershipTransfer {
                product_id: "P1".to_string(),
                current_owner_public_key: "O".to_string(),
                new_owner_public_key: "N".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::CommandError { .. }));
    }

    #[tokio::test]
    async fn test_details_are_parsed() {
        let runner = ScriptedRunner::stdout(
            "ℹ️ Simulating transaction\n{\"product_id\":\"P1\",\"manufacturer\":\"M\",\"current_owner\":\"C\",\"registered_at\":1700000000}\n",
        );
        let details = gateway(runner).get_product_details("P1").await.unwrap();
        assert_eq!(details.current_owner, "C");
        assert_eq!(details.registered_at, 1_700_000_000);
    }

    #[tokio::test]
    async fn test_not_found_in_stderr_of_failed_read() {
        let runner = ScriptedRunner::failure("error: HostError: Error(Contract, #101)");
        let err = gateway(runner).get_product_details("ghost").await.unwrap_err();

        match err {
            GatewayError::NotFoundError { product_id } => assert_eq!(product_id, "ghost"),
            other => panic!("expected not found, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_not_found_in_stdout_of_failed_read() {
        let runner = ScriptedRunner::failure_with("HostError: Error(Contract, #101)", "boom");
        let err = gateway(runner).get_product_details("ghost").await.unwrap_err();

        match err {
            GatewayError::NotFoundError { product_id } => assert_eq!(product_id, "ghost"),
            other => panic!("expected not found, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_write_output_is_not_parsed() {
        let runner = ScriptedRunner::stdout("{\"unexpected\": true}\n");
        let output = gateway(runner)
            .register_product(&ProductRegistration {
                product_id: "P1".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(output, "{\"unexpected\": true}");
    }

    #[tokio::test]
    async fn test_not_found_in_stdout_of_successful_read() {
        let runner = ScriptedRunner::stdout("ProductNotFound");
        let err = gateway(runner).get_product_details("ghost").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_unrelated_read_failure_stays_command_error() {
        let runner = ScriptedRunner::failure("error: network unreachable");
        let err = gateway(runner).get_product_details("P1").await.unwrap_err();
        assert!(matches!(err, GatewayError::CommandError { .. }));
    }

    #[tokio::test]
    async fn test_garbage_output_is_parse_error() {
        let runner = ScriptedRunner::stdout("Success");
        let err = gateway(runner).get_product_details("P1").await.unwrap_err();
        match err {
            GatewayError::ParseError { raw } => assert_eq!(raw, "Success"),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_config_never_invokes_runner() {
        let runner = ScriptedRunner::stdout("unused");
        let gateway = LedgerGateway::new(LedgerConfig::default(), runner.clone());

        let err = gateway.get_product_details("P1").await.unwrap_err();
        assert!(matches!(err, GatewayError::ConfigurationError { .. }));
        assert!(runner.calls().is_empty());
    }
}
