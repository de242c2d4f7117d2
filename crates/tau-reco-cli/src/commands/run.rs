//! Run command - one pipeline instance per worker, events in parallel

use anyhow::{Context as _, Result};
use clap::Args;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;
use tau_reco_core::{
    EventId, EventRecord, PluginConfig, ProducerConfig, Registry, Tau, TauPipeline,
};
use tracing::{error, info};

#[derive(Args)]
pub struct RunCommand {
    /// Producer configuration (YAML)
    #[arg(short, long)]
    config: PathBuf,

    /// Events to process (JSON array of event records)
    #[arg(short, long)]
    input: PathBuf,

    /// Output file for the tau collections (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Worker threads (default: rayon global pool)
    #[arg(short = 'j', long)]
    threads: Option<usize>,

    /// Drop failed events instead of aborting the run
    #[arg(long)]
    keep_going: bool,

    /// Print a blake3 fingerprint of the serialized output
    #[arg(long)]
    digest: bool,
}

/// Tau collection produced for one event
#[derive(Debug, Serialize)]
pub struct EventOutput {
    pub id: EventId,
    pub taus: Vec<Tau>,
}

impl RunCommand {
    pub fn execute(self) -> Result<()> {
        let config = ProducerConfig::from_yaml_file(&self.config)
            .with_context(|| format!("Failed to load config {}", self.config.display()))?;
        let registry = Registry::with_builtin_plugins()?;

        let contents = fs::read_to_string(&self.input)
            .with_context(|| format!("Failed to read {}", self.input.display()))?;
        let records: Vec<EventRecord> =
            serde_json::from_str(&contents).context("Failed to parse event records")?;

        info!("Events: {}", records.len());
        let start = Instant::now();
        let outputs = match self.threads {
            Some(threads) => ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .context("Failed to build thread pool")?
                .install(|| process_events(&config, &registry, &records, self.keep_going))?,
            None => process_events(&config, &registry, &records, self.keep_going)?,
        };
        info!(
            "Processed {} events in {:.3}s",
            outputs.len(),
            start.elapsed().as_secs_f64()
        );

        let json = serde_json::to_string_pretty(&outputs)?;
        match &self.output {
            Some(path) => fs::write(path, &json)
                .with_context(|| format!("Failed to write {}", path.display()))?,
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(json.as_bytes())?;
                writeln!(stdout)?;
            }
        }

        if self.digest {
            eprintln!("digest: {}", digest(json.as_bytes()));
        }

        Ok(())
    }
}

/// Run every record through a pipeline built from `config`.
///
/// Each rayon worker owns its own pipeline instance. Output keeps input order.
pub fn process_events(
    config: &ProducerConfig,
    registry: &Registry,
    records: &[EventRecord],
    keep_going: bool,
) -> Result<Vec<EventOutput>> {
    // Surface configuration errors before any event runs
    TauPipeline::from_config(config, registry).context("Invalid producer configuration")?;
    info!(
        "Builders: [{}], modifiers: [{}]",
        plugin_list(&config.builders),
        plugin_list(&config.modifiers)
    );

    let results: Vec<Result<EventOutput>> = records
        .par_iter()
        .map_init(
            || TauPipeline::from_config(config, registry),
            |pipeline, record| {
                let pipeline = pipeline
                    .as_mut()
                    .map_err(|e| anyhow::anyhow!("Pipeline construction failed: {}", e))?;
                let taus = pipeline
                    .run_record(record)
                    .with_context(|| format!("Event {} failed", record.id))?;
                Ok(EventOutput {
                    id: record.id,
                    taus,
                })
            },
        )
        .collect();

    let mut outputs = Vec::with_capacity(results.len());
    let mut failed = 0usize;
    for result in results {
        match result {
            Ok(output) => outputs.push(output),
            Err(e) => {
                error!("{:#}", e);
                failed += 1;
            }
        }
    }

    if failed > 0 && !keep_going {
        anyhow::bail!("{} of {} events failed", failed, records.len());
    }

    Ok(outputs)
}

fn plugin_list(plugins: &[PluginConfig]) -> String {
    plugins
        .iter()
        .map(|p| format!("{} ({})", p.name, p.plugin))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Hex blake3 hash of the serialized output
pub fn digest(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}
