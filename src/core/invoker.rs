use crate::domain::ports::{CommandOutput, CommandRunner};
use crate::utils::error::{GatewayError, Result};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// 以子程序執行 soroban CLI（不經過 shell）
#[derive(Debug, Clone, Default)]
pub struct SorobanCli {
    timeout: Option<Duration>,
}

impl SorobanCli {
    pub fn new() -> Self {
        Self { timeout: None }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl CommandRunner for SorobanCli {
    async fn run(&self, argv: &[String]) -> Result<CommandOutput> {
        let (program, args) = argv.split_first().ok_or_else(|| GatewayError::InvocationError {
            program: String::new(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
        })?;

        tracing::info!("Executing command: {}", argv.join(" "));

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = command.spawn().map_err(|e| GatewayError::InvocationError {
            program: program.clone(),
            source: e,
        })?;

        // kill_on_drop：逾時時 future 被丟棄，子程序隨之終止
        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| {
                    tracing::warn!("⏱️ `{}` exceeded {:?}, killed", program, limit);
                    GatewayError::TimeoutError {
                        seconds: limit.as_secs(),
                    }
                })?,
            None => child.wait_with_output().await,
        }
        .map_err(|e| GatewayError::InvocationError {
            program: program.clone(),
            source: e,
        })?;

        let captured = CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        };

        tracing::debug!("Command stdout: {}", captured.stdout);
        tracing::debug!("Command stderr: {}", captured.stderr);

        if output.status.success() {
            Ok(captured)
        } else {
            tracing::warn!(
                exit_code = ?captured.exit_code,
                "Soroban CLI exited with failure: {}",
                captured.stderr.trim_end()
            );
            Err(GatewayError::CommandError {
                stdout: captured.stdout,
                stderr: captured.stderr,
                exit_code: captured.exit_code,
            })
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["sh".to_string(), "-c".to_string(), script.to_string()]
    }

    #[tokio::test]
    async fn test_success_captures_both_streams() {
        let output = SorobanCli::new()
            .run(&sh("echo 'INFO: simulating' 1>&2; printf 'hello\\n\\n'"))
            .await
            .unwrap();

        assert!(output.success());
        assert_eq!(output.trimmed_stdout(), "hello");
        assert!(output.stderr.contains("INFO: simulating"));
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_command_error() {
        let err = SorobanCli::new()
            .run(&sh("echo partial; echo 'Error(Contract, #101)' 1>&2; exit 3"))
            .await
            .unwrap_err();

        match err {
            GatewayError::CommandError {
                stdout,
                stderr,
                exit_code,
            } => {
                assert_eq!(stdout.trim(), "partial");
                assert!(stderr.contains("Error(Contract, #101)"));
                assert_eq!(exit_code, Some(3));
            }
            other => panic!("expected command error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_binary_is_invocation_error() {
        let err = SorobanCli::new()
            .run(&["definitely-not-a-real-soroban-binary".to_string()])
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::InvocationError { .. }));
    }

    #[tokio::test]
    async fn test_empty_argv_is_invocation_error() {
        let err = SorobanCli::new().run(&[]).await.unwrap_err();
        assert!(matches!(err, GatewayError::InvocationError { .. }));
    }

    #[tokio::test]
    async fn test_arguments_are_not_shell_interpreted() {
        let output = SorobanCli::new()
            .run(&["echo".to_string(), "$HOME; `id`".to_string()])
            .await
            .unwrap();
        assert_eq!(output.trimmed_stdout(), "$HOME; `id`");
    }

    #[tokio::test]
    async fn test_deadline_kills_hung_process() {
        let err = SorobanCli::new()
            .with_timeout(Some(Duration::from_millis(200)))
            .run(&sh("sleep 5"))
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::TimeoutError { .. }));
    }
}
