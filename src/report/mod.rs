//! Report sinks for finished runs.
//!
//! The core hands finished `RunReport`s to a `ReportSink`; how they are
//! rendered or persisted is entirely up to the sink:
//! - `TracingSink`: structured log lines
//! - `TextFileSink`: dense human-readable audit log
//! - `JsonFileSink`: structured records, one document per batch

mod sinks;
mod text;

pub use sinks::{build_sinks, FanoutSink, JsonFileSink, TextFileSink, TracingSink};
pub use text::{render_cycle, render_run, render_summary};

use crate::simulation::RunReport;
use anyhow::Result;

/// Consumer of finished run reports.
#[cfg_attr(test, mockall::automock)]
pub trait ReportSink {
    /// Record one finished run.
    fn record(&mut self, scenario: &str, report: &RunReport) -> Result<()>;

    /// Flush anything buffered. Called once after the last report.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}
