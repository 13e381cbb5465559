//! Concrete report sinks.

use crate::config::ReportConfig;
use crate::report::text::render_run;
use crate::report::ReportSink;
use crate::simulation::RunReport;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Logs every cycle and the summary through `tracing`.
#[derive(Debug, Default)]
pub struct TracingSink;

impl ReportSink for TracingSink {
    fn record(&mut self, scenario: &str, report: &RunReport) -> Result<()> {
        for cycle in &report.cycles {
            debug!(
                %scenario,
                cycle = cycle.cycle,
                strategy = %cycle.strategy,
                ltv_before = %cycle.ltv_before.round_dp(6),
                ltv_after = %cycle.ltv_after.round_dp(6),
                fees = %cycle.fees_total,
                wallet_delta = %cycle.wallet_delta,
                health_factor = %cycle.health_factor.round_dp(4),
                "Cycle"
            );
        }

        let summary = &report.summary;
        info!(
            %scenario,
            status = summary.status_label(),
            cycles = summary.cycles_executed,
            collateral = %summary.final_position.collateral,
            target_collateral = %summary.targets.target_collateral,
            cash = %summary.final_position.cash,
            total_fees = %summary.total_fees,
            "Run report"
        );

        Ok(())
    }
}

/// Appends the dense audit log of every run to a text file.
pub struct TextFileSink {
    path: PathBuf,
}

impl TextFileSink {
    /// Create (truncating) the file and write the header.
    pub fn create<P: AsRef<Path>>(path: P, generated_at: DateTime<Utc>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = std::fs::File::create(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;

        writeln!(
            file,
            "=== FULL AUDIT LOG (ALL SCENARIOS) - generated {} ===",
            generated_at.to_rfc3339()
        )?;

        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportSink for TextFileSink {
    fn record(&mut self, scenario: &str, report: &RunReport) -> Result<()> {
        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;

        file.write_all(render_run(scenario, report).as_bytes())?;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct JsonRun<'a> {
    scenario: &'a str,
    #[serde(flatten)]
    report: &'a RunReport,
}

/// Collects runs and writes them as one JSON document on `finish`.
pub struct JsonFileSink {
    path: PathBuf,
    runs: Vec<serde_json::Value>,
}

impl JsonFileSink {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            runs: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportSink for JsonFileSink {
    fn record(&mut self, scenario: &str, report: &RunReport) -> Result<()> {
        let value = serde_json::to_value(JsonRun { scenario, report })
            .context("Failed to serialize run report")?;
        self.runs.push(value);
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.runs)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;

        info!("📁 JSON report saved to: {}", self.path.display());
        Ok(())
    }
}

/// Forwards every report to several sinks.
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Box<dyn ReportSink + Send>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sink: Box<dyn ReportSink + Send>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl ReportSink for FanoutSink {
    fn record(&mut self, scenario: &str, report: &RunReport) -> Result<()> {
        for sink in &mut self.sinks {
            sink.record(scenario, report)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        for sink in &mut self.sinks {
            sink.finish()?;
        }
        Ok(())
    }
}

/// Build the sinks selected by the report configuration.
///
/// Always logs; file sinks are added only when an output directory is set.
pub fn build_sinks(config: &ReportConfig) -> Result<FanoutSink> {
    let mut fanout = FanoutSink::new();
    fanout.push(Box::new(TracingSink));

    if let Some(dir) = &config.output_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {}", dir))?;
        let dir = Path::new(dir);

        if config.write_text {
            let sink = TextFileSink::create(dir.join(&config.text_file), Utc::now())?;
            info!("📁 Text report: {}", sink.path().display());
            fanout.push(Box::new(sink));
        }

        if config.write_json {
            fanout.push(Box::new(JsonFileSink::new(dir.join(&config.json_file))));
        }
    }

    Ok(fanout)
}
