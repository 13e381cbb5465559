//! Batch runner for scenario batteries.
//!
//! Each scenario gets its own engine run and its own position; nothing is
//! shared between runs, so they can execute concurrently.

use crate::config::StrategyConfig;
use crate::report::ReportSink;
use crate::simulation::engine::SimulationEngine;
use crate::simulation::metrics::RunReport;
use crate::simulation::scenario::Scenario;
use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{info, warn};

/// Outcome of one scenario in a batch.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    pub scenario: Scenario,
    /// `Err` holds the validation message for rejected input
    pub report: std::result::Result<RunReport, String>,
}

/// Results of a batch, in input order.
#[derive(Debug, Clone, Serialize)]
pub struct BatchResults {
    pub results: Vec<ScenarioResult>,
    pub succeeded: usize,
    pub partial: usize,
    pub rejected: usize,
}

impl BatchResults {
    /// Hand every completed report to the sink, in input order.
    pub fn publish(&self, sink: &mut dyn ReportSink) -> Result<()> {
        for result in &self.results {
            if let Ok(report) = &result.report {
                sink.record(&result.scenario.name, report)?;
            }
        }
        sink.finish()
    }

    /// One line per scenario.
    pub fn summary(&self) -> String {
        let mut s = String::new();

        s.push_str("═══════════════════════════════════════════════════════════════\n");
        s.push_str("SCENARIO BATTERY RESULTS\n");
        s.push_str("═══════════════════════════════════════════════════════════════\n");
        s.push_str(&format!(
            "Total: {} | Success: {} | Partial: {} | Rejected: {}\n\n",
            self.results.len(),
            self.succeeded,
            self.partial,
            self.rejected
        ));

        for result in &self.results {
            match &result.report {
                Ok(report) => s.push_str(&format!(
                    "  [{}] {} - {} cycles, collateral {:.8} / {:.8}\n",
                    report.summary.status_label(),
                    result.scenario.name,
                    report.summary.cycles_executed,
                    report.summary.final_position.collateral,
                    report.summary.targets.target_collateral,
                )),
                Err(e) => s.push_str(&format!("  [REJECTED] {} - {}\n", result.scenario.name, e)),
            }
        }

        s.push_str("═══════════════════════════════════════════════════════════════\n");
        s
    }
}

/// Runs many scenarios with bounded concurrency.
pub struct ScenarioRunner {
    config: StrategyConfig,
    parallelism: usize,
}

impl ScenarioRunner {
    pub fn new(config: StrategyConfig, parallelism: usize) -> Self {
        Self {
            config,
            parallelism: parallelism.max(1),
        }
    }

    /// Run every scenario in isolation.
    pub async fn run(&self, scenarios: Vec<Scenario>) -> Result<BatchResults> {
        let total = scenarios.len();
        info!(
            "Running {} scenarios, parallelism={}",
            total, self.parallelism
        );

        let semaphore = Arc::new(Semaphore::new(self.parallelism));
        let mut handles = Vec::with_capacity(total);

        for (i, scenario) in scenarios.into_iter().enumerate() {
            let sem = semaphore.clone();
            let engine = SimulationEngine::new(self.config.clone());

            let handle = tokio::spawn(async move {
                let _permit = sem.acquire_owned().await?;

                info!("[{}/{}] Scenario: {}", i + 1, total, scenario.name);

                let report = match scenario.validate() {
                    Ok((position, targets)) => Ok(engine.run(position, targets)),
                    Err(e) => {
                        warn!("[{}/{}] Rejected: {}", i + 1, total, e);
                        Err(e.to_string())
                    }
                };

                anyhow::Ok(ScenarioResult { scenario, report })
            });

            handles.push(handle);
        }

        let mut results = Vec::with_capacity(total);
        for handle in handles {
            results.push(handle.await??);
        }

        let succeeded = results
            .iter()
            .filter(|r| matches!(&r.report, Ok(report) if report.summary.success))
            .count();
        let rejected = results.iter().filter(|r| r.report.is_err()).count();

        Ok(BatchResults {
            partial: total - succeeded - rejected,
            results,
            succeeded,
            rejected,
        })
    }
}
