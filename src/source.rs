//! Runs the measurement command and captures its output.

use anyhow::{Context, Result};
use tokio::process::Command;
use tracing::warn;

use crate::config::MeasurementConfig;

/// Output of one measurement run.
#[derive(Debug)]
pub struct MeasurementOutput {
    /// Raw stdout text, preserved verbatim for the delivery path.
    pub stdout: String,
    /// Diagnostic text; logged, never fatal on its own.
    pub stderr: String,
}

/// Invokes the configured measurement command.
pub struct MeasurementRunner {
    command: String,
    args: Vec<String>,
}

impl MeasurementRunner {
    pub fn new(config: &MeasurementConfig) -> Self {
        Self {
            command: config.command.clone(),
            args: config.args.clone(),
        }
    }

    /// Run the command to completion and capture both output streams.
    ///
    /// A command that cannot be spawned aborts the cycle; anything it prints
    /// to stderr is logged and the cycle continues with whatever stdout holds.
    pub async fn run(&self) -> Result<MeasurementOutput> {
        let output = Command::new(&self.command)
            .args(&self.args)
            .output()
            .await
            .with_context(|| format!("failed to run measurement command '{}'", self.command))?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            warn!("{} exited with {}", self.command, output.status);
        }
        if !stderr.is_empty() {
            warn!("{} reported: {}", self.command, stderr.trim_end());
        }

        Ok(MeasurementOutput { stdout, stderr })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner(command: &str, args: &[&str]) -> MeasurementRunner {
        MeasurementRunner::new(&MeasurementConfig {
            command: command.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
        })
    }

    #[tokio::test]
    async fn test_captures_stdout_verbatim() {
        let output = runner("echo", &["-n", r#"{"download": 1.0}"#])
            .run()
            .await
            .unwrap();

        assert_eq!(output.stdout, r#"{"download": 1.0}"#);
        assert!(output.stderr.is_empty());
    }

    #[tokio::test]
    async fn test_stderr_does_not_abort_the_run() {
        let output = runner("sh", &["-c", "echo diagnostic >&2; echo -n result"])
            .run()
            .await
            .unwrap();

        assert_eq!(output.stdout, "result");
        assert_eq!(output.stderr, "diagnostic\n");
    }

    #[tokio::test]
    async fn test_missing_binary_is_fatal() {
        let result = runner("definitely-not-a-real-speedtest-client", &[])
            .run()
            .await;

        assert!(result.is_err());
    }
}
