//! Simulation metrics exported by worldtests for CI artifacts.
//!
//! Reports are plain JSON so regressions in plant population or event load
//! can be tracked across commits.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level metrics report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsReport {
    /// Test/benchmark identifier.
    pub test_name: String,

    /// Timestamp when metrics were collected (RFC 3339).
    pub timestamp: String,

    /// Overall test result.
    pub result: TestResult,

    /// Vegetation simulation metrics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vegetation: Option<VegetationMetrics>,

    /// Loot roll metrics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loot: Option<LootMetrics>,

    /// Test execution metrics.
    pub execution: ExecutionMetrics,
}

/// Overall test result status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestResult {
    /// Test passed all validations.
    Pass,
    /// Test failed.
    Fail,
    /// Test was skipped.
    Skip,
}

/// Plant population over a simulated run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VegetationMetrics {
    /// Ticks simulated.
    pub ticks: u64,
    /// Chunks in the world.
    pub chunks: usize,
    /// Plants alive at the start.
    pub plants_initial: usize,
    /// Plants alive at the end.
    pub plants_final: usize,
    /// Highest per-chunk density seen at the end.
    pub max_density: f64,
    /// Mean per-chunk density at the end.
    pub avg_density: f64,
    /// Narrative messages emitted.
    pub narrative_messages: usize,
}

/// Outcome distribution of a batch of loot rolls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LootMetrics {
    /// Rolls performed.
    pub rolls: usize,
    /// Successful rolls.
    pub successes: usize,
    /// Mean final chance across rolls.
    pub avg_final_chance: f64,
}

/// How long the test ran.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionMetrics {
    /// Wall-clock duration.
    pub duration_seconds: f64,
    /// Assertions evaluated, if counted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assertions_checked: Option<usize>,
}

/// Builder for [`MetricsReport`].
pub struct MetricsReportBuilder {
    report: MetricsReport,
}

impl MetricsReportBuilder {
    /// Start a passing report stamped with the current time.
    pub fn new(test_name: impl Into<String>) -> Self {
        Self {
            report: MetricsReport {
                test_name: test_name.into(),
                timestamp: chrono::Utc::now().to_rfc3339(),
                result: TestResult::Pass,
                vegetation: None,
                loot: None,
                execution: ExecutionMetrics::default(),
            },
        }
    }

    /// Set test result.
    pub fn result(mut self, result: TestResult) -> Self {
        self.report.result = result;
        self
    }

    /// Set vegetation metrics.
    pub fn vegetation(mut self, metrics: VegetationMetrics) -> Self {
        self.report.vegetation = Some(metrics);
        self
    }

    /// Set loot metrics.
    pub fn loot(mut self, metrics: LootMetrics) -> Self {
        self.report.loot = Some(metrics);
        self
    }

    /// Set execution metrics.
    pub fn execution(mut self, metrics: ExecutionMetrics) -> Self {
        self.report.execution = metrics;
        self
    }

    /// Finish the report.
    pub fn build(self) -> MetricsReport {
        self.report
    }
}

/// Writes metrics reports to a JSON file.
pub struct MetricsSink {
    path: PathBuf,
}

impl MetricsSink {
    /// Point a sink at `path`, creating parent directories.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        Ok(Self { path })
    }

    /// Write `report` as pretty JSON.
    pub fn write(&self, report: &MetricsReport) -> Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write metrics to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn metrics_report_roundtrip() {
        let report = MetricsReportBuilder::new("growth_example")
            .vegetation(VegetationMetrics {
                ticks: 500,
                chunks: 16,
                plants_initial: 20,
                plants_final: 31,
                max_density: 64.0,
                avg_density: 22.5,
                narrative_messages: 4,
            })
            .build();

        let json = serde_json::to_string_pretty(&report).unwrap();
        let parsed: MetricsReport = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.test_name, "growth_example");
        assert_eq!(parsed.result, TestResult::Pass);
        assert_eq!(parsed.vegetation.unwrap().plants_final, 31);
        assert!(parsed.loot.is_none());
    }

    #[test]
    fn metrics_sink_writes_file() {
        let path = std::env::temp_dir().join(format!(
            "wildgrove-metrics-{}.json",
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));

        let report = MetricsReportBuilder::new("sink_test")
            .result(TestResult::Skip)
            .build();
        let sink = MetricsSink::create(&path).unwrap();
        sink.write(&report).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("sink_test"));
        assert!(contents.contains("\"result\": \"skip\""));

        fs::remove_file(&path).ok();
    }
}
