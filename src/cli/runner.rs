//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::{load_config, IngestConfig};
use crate::engine::{execution_order, IngestStats, IngestionEngine, STEPS};
use crate::error::{Result, ResultExt};
use crate::types::LogLevel;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Validate => self.validate().await,
            Commands::Ingest { output } => self.ingest(output).await,
            Commands::Steps => self.steps(),
        }
    }

    /// Config from `--config`, or from the environment when absent
    fn load_config(&self) -> Result<IngestConfig> {
        match &self.cli.config {
            Some(path) => {
                debug!(path = %path.display(), "Loading config file");
                load_config(path)
            }
            None => {
                debug!("No config file given, reading environment");
                Ok(IngestConfig::from_env())
            }
        }
    }

    /// Check credentials and scopes
    async fn validate(&self) -> Result<()> {
        let engine = IngestionEngine::new(self.load_config()?)?;

        self.output_message(&log_message(
            LogLevel::Info,
            format!("Validating access to {}", engine.config().domain),
        ));

        match engine.validate().await {
            Ok(()) => {
                self.output_message(&connection_status(true, "Connection successful"));
                Ok(())
            }
            Err(e) => {
                self.output_message(&connection_status(
                    false,
                    &format!("Connection failed: {e}"),
                ));
                Err(e)
            }
        }
    }

    /// Run every step and write the snapshot to `output`
    async fn ingest(&self, output: &Path) -> Result<()> {
        let engine = IngestionEngine::new(self.load_config()?)?;

        self.output_message(&log_message(
            LogLevel::Info,
            format!("Starting ingestion of {}", engine.config().domain),
        ));

        let stats = match engine.run().await {
            Ok(stats) => stats,
            Err(e) => {
                self.output_message(&log_message(
                    LogLevel::Error,
                    format!("Ingestion failed: {e}"),
                ));
                return Err(e);
            }
        };

        if stats.user_shortfall > 0 {
            self.output_message(&log_message(
                LogLevel::Warn,
                format!(
                    "{} users reported by the API were not reached",
                    stats.user_shortfall
                ),
            ));
        }

        engine
            .state()
            .save_to_file(output)
            .await
            .with_context(|| format!("Failed to write graph to '{}'", output.display()))?;

        let type_counts = engine.state().type_counts().await;
        self.output_message(&summary_message(&stats, &type_counts, output));
        Ok(())
    }

    /// List steps in the order they run
    fn steps(&self) -> Result<()> {
        for step in execution_order(&STEPS)? {
            self.output_message(&json!({
                "type": "STEP",
                "step": step
            }));
        }
        Ok(())
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

fn log_message(level: LogLevel, message: impl Into<String>) -> Value {
    json!({
        "type": "LOG",
        "log": {
            "level": level,
            "message": message.into()
        }
    })
}

fn connection_status(succeeded: bool, message: &str) -> Value {
    json!({
        "type": "CONNECTION_STATUS",
        "connectionStatus": {
            "status": if succeeded { "SUCCEEDED" } else { "FAILED" },
            "message": message
        }
    })
}

fn summary_message(
    stats: &IngestStats,
    type_counts: &BTreeMap<String, usize>,
    output: &Path,
) -> Value {
    json!({
        "type": "SUMMARY",
        "summary": {
            "stats": stats,
            "typeCounts": type_counts,
            "output": output.display().to_string()
        }
    })
}
