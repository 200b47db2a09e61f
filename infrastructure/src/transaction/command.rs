//! Lead transaction backed by an external command.
//!
//! The command is spawned once per attempt. It receives a JSON request on
//! stdin and answers with a JSON object on the last non-empty line of
//! stdout. Earlier stdout lines are treated as the script's own logging.

use async_trait::async_trait;
use leadforge_application::{LeadTransaction, RunContext, TransactionError};
use leadforge_domain::{ConfigValue, LeadIdentity, LeadOutcome};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

/// Default timeout per attempt (5 minutes; UI automation is slow)
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Maximum stderr echoed into an error message
const MAX_STDERR_CHARS: usize = 2000;

/// JSON written to the command's stdin
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LeadRequest<'a> {
    ordinal: u32,
    attempt: u32,
    environment: &'a str,
    customer_type: &'a str,
    /// `true` when the lead must be created through the browser flow
    ui_automation: bool,
    city_code: &'a str,
    mobile_number: &'a str,
    email: &'a str,
    customer_name: &'a str,
    environment_settings: BTreeMap<String, String>,
    credentials: BTreeMap<String, String>,
    config: BTreeMap<&'a str, &'a ConfigValue>,
}

/// Structured rejection printed by a failing command
#[derive(Debug, Deserialize)]
struct RejectionBody {
    error: String,
}

/// Runs `program args...` for each lead attempt
#[derive(Debug, Clone)]
pub struct CommandLeadTransaction {
    program: String,
    args: Vec<String>,
    timeout: Duration,
    working_dir: Option<PathBuf>,
}

impl CommandLeadTransaction {
    /// Build from an argv list; `None` when it is empty
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        if program.trim().is_empty() {
            return None;
        }
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            working_dir: None,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_working_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.working_dir = dir;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn request_body(
        &self,
        ordinal: u32,
        attempt: u32,
        context: &RunContext,
    ) -> Result<Vec<u8>, TransactionError> {
        let state = &context.run_state;
        let identity = LeadIdentity::for_ordinal(state, ordinal);
        let request = LeadRequest {
            ordinal,
            attempt,
            environment: state.environment.as_str(),
            customer_type: state.customer_type.as_str(),
            ui_automation: state.customer_type.uses_ui_automation(),
            city_code: state.city_code.as_str(),
            mobile_number: &identity.mobile_number,
            email: &identity.email,
            customer_name: &identity.customer_name,
            environment_settings: context.environment_settings(),
            credentials: context.credentials(),
            config: context
                .config
                .iter()
                .map(|(k, v)| (k.as_str(), v))
                .collect(),
        };
        serde_json::to_vec(&request)
            .map_err(|e| TransactionError::Unexpected(format!("could not encode request: {e}")))
    }
}

#[async_trait]
impl LeadTransaction for CommandLeadTransaction {
    async fn execute(
        &self,
        ordinal: u32,
        attempt: u32,
        context: &RunContext,
    ) -> Result<LeadOutcome, TransactionError> {
        let body = self.request_body(ordinal, attempt, context)?;

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn().map_err(|e| {
            TransactionError::Unexpected(format!("failed to spawn '{}': {}", self.program, e))
        })?;
        debug!(ordinal, attempt, program = %self.program, "Transaction command started");

        let stdin = child.stdin.take();
        let run = async move {
            if let Some(mut stdin) = stdin {
                // A command that ignores its input may exit before reading it
                if let Err(e) = stdin.write_all(&body).await {
                    debug!("Could not write request to command stdin: {}", e);
                }
                drop(stdin);
            }
            child.wait_with_output().await
        };

        // On timeout the future is dropped with the child, which kills it
        let output = match tokio::time::timeout(self.timeout, run).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(TransactionError::Unexpected(format!(
                    "failed to wait for '{}': {}",
                    self.program, e
                )));
            }
            Err(_) => {
                warn!(ordinal, attempt, "Transaction command timed out");
                return Err(TransactionError::Unexpected(format!(
                    "timed out after {} seconds",
                    self.timeout.as_secs()
                )));
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let answer = last_line(&stdout);

        if output.status.success() {
            return serde_json::from_str::<LeadOutcome>(answer).map_err(|e| {
                TransactionError::Unexpected(format!("malformed result ({e}): {answer}"))
            });
        }

        if let Ok(rejection) = serde_json::from_str::<RejectionBody>(answer) {
            return Err(TransactionError::ApplicationRejected(rejection.error));
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        let tail: String = stderr
            .chars()
            .skip(stderr.chars().count().saturating_sub(MAX_STDERR_CHARS))
            .collect();
        Err(TransactionError::Unexpected(format!(
            "exited with {}: {}",
            output
                .status
                .code()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string()),
            tail
        )))
    }
}

fn last_line(output: &str) -> &str {
    output
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("")
}
