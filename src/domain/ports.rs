use crate::utils::error::Result;
use async_trait::async_trait;

/// 外部程序執行後擷取的輸出
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    pub fn trimmed_stdout(&self) -> &str {
        self.stdout.trim_end()
    }
}

/// 執行 CLI 參數列表的抽象，測試時以腳本化實作替換
///
/// 實作必須：exit code 為 0 時回傳 `Ok(CommandOutput)`；非 0 時回傳
/// `GatewayError::CommandError`；程序無法啟動時回傳 `GatewayError::InvocationError`。
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, argv: &[String]) -> Result<CommandOutput>;
}
