//! Local model lifecycle through the `ollama` CLI
//!
//! Makes sure the configured model is present before a run (pulling it when
//! missing) and unloads it afterwards to release memory.

use super::error::{OllamaError, Result};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Drives `ollama list`, `ollama pull` and `ollama stop`.
pub struct OllamaModelManager {
    program: String,
}

impl Default for OllamaModelManager {
    fn default() -> Self {
        Self::new()
    }
}

impl OllamaModelManager {
    pub fn new() -> Self {
        Self::with_program("ollama")
    }

    /// Use a different executable (for testing)
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Ensure `model` is installed locally. Returns `true` if it had to be pulled.
    pub async fn ensure_model(&self, model: &str) -> Result<bool> {
        let listing = self.run(&["list"]).await?;
        if is_installed(&listing, model) {
            debug!("Model {} already installed", model);
            return Ok(false);
        }

        info!("Pulling model {}", model);
        self.run(&["pull", model]).await?;
        Ok(true)
    }

    /// Unload `model`. Failures are logged and otherwise ignored.
    pub async fn stop(&self, model: &str) {
        match self.run(&["stop", model]).await {
            Ok(_) => debug!("Stopped model {}", model),
            Err(e) => warn!("Could not stop model {}: {}", model, e),
        }
    }

    async fn run(&self, args: &[&str]) -> Result<String> {
        let output = Command::new(&self.program).args(args).output().await?;
        if !output.status.success() {
            return Err(OllamaError::CommandFailed {
                command: args.join(" "),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Whether an `ollama list` table contains `model`.
///
/// A name without a tag matches its `:latest` entry.
pub fn is_installed(listing: &str, model: &str) -> bool {
    let wanted = model.trim();
    if wanted.is_empty() {
        return false;
    }
    let wanted_latest = format!("{}:latest", wanted);

    listing
        .lines()
        .skip(1)
        .filter_map(|line| line.split_whitespace().next())
        .any(|name| name == wanted || name == wanted_latest)
}
