//! Benchmark reporting
//!
//! Markdown, JSON, CSV and plain-text renderings of benchmark results.

use crate::suite::{BenchmarkResult, BenchmarkStatistics, Strategy};
use std::fmt::{self, Write};

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// Markdown table
    Markdown,
    /// JSON
    Json,
    /// CSV
    Csv,
    /// Plain text summary
    Text,
}

/// Benchmark reporter
pub struct Reporter;

impl Reporter {
    /// Generate report in specified format
    pub fn report(results: &[BenchmarkResult], format: ReportFormat) -> String {
        match format {
            ReportFormat::Markdown => Self::to_markdown(results),
            ReportFormat::Json => Self::to_json(results),
            ReportFormat::Csv => Self::to_csv(results),
            ReportFormat::Text => Self::to_text(results),
        }
    }

    /// Convert results to Markdown
    pub fn to_markdown(results: &[BenchmarkResult]) -> String {
        render(|out| {
            let stats = BenchmarkStatistics::from_results(results);

            writeln!(out, "# QSched Benchmark Results\n")?;
            writeln!(out, "## Summary\n")?;
            writeln!(out, "- **Benchmarks**: {}", stats.count)?;
            writeln!(out, "- **Avg Makespan**: {:.2}", stats.avg_makespan)?;
            writeln!(out, "- **Avg Efficiency**: {:.1}%", stats.avg_efficiency * 100.0)?;
            writeln!(out, "- **Worst Efficiency**: {:.1}%", stats.min_efficiency * 100.0)?;
            writeln!(out, "- **Improved by Search**: {}\n", stats.improved_by_search)?;

            writeln!(out, "## Detailed Results\n")?;
            writeln!(
                out,
                "| Name | Ops | Policy | Strategy | Makespan | Critical | Depth | Parallel | Trial | Time(us) |"
            )?;
            writeln!(
                out,
                "|------|-----|--------|----------|----------|----------|-------|----------|-------|----------|"
            )?;
            for r in results {
                writeln!(
                    out,
                    "| {} | {} | {} | {} | {:.2} | {:.2} | {} | {:.2}x | {} | {} |",
                    r.name,
                    r.operations,
                    r.policy,
                    r.strategy,
                    r.makespan,
                    r.critical_path,
                    r.depth,
                    r.parallelism,
                    r.best_trial,
                    r.time_us
                )?;
            }
            Ok(())
        })
    }

    /// Convert results to JSON
    pub fn to_json(results: &[BenchmarkResult]) -> String {
        let stats = BenchmarkStatistics::from_results(results);

        let report = serde_json::json!({
            "statistics": stats,
            "results": results,
        });

        serde_json::to_string_pretty(&report).unwrap_or_else(|_| "{}".to_string())
    }

    /// Convert results to CSV
    pub fn to_csv(results: &[BenchmarkResult]) -> String {
        render(|out| {
            writeln!(
                out,
                "name,operations,policy,strategy,makespan,critical_path,depth,parallelism,best_trial,time_us"
            )?;
            for r in results {
                writeln!(
                    out,
                    "{},{},{},{},{},{},{},{},{},{}",
                    r.name,
                    r.operations,
                    r.policy,
                    r.strategy,
                    r.makespan,
                    r.critical_path,
                    r.depth,
                    r.parallelism,
                    r.best_trial,
                    r.time_us
                )?;
            }
            Ok(())
        })
    }

    /// Convert results to plain text summary
    pub fn to_text(results: &[BenchmarkResult]) -> String {
        render(|out| {
            let stats = BenchmarkStatistics::from_results(results);

            writeln!(out, "QSched Benchmark Results")?;
            writeln!(out, "========================\n")?;
            writeln!(out, "Summary:")?;
            writeln!(out, "  Benchmarks run: {}", stats.count)?;
            writeln!(out, "  Average makespan: {:.2}", stats.avg_makespan)?;
            writeln!(out, "  Average efficiency: {:.1}%", stats.avg_efficiency * 100.0)?;
            writeln!(out, "  Improved by search: {}\n", stats.improved_by_search)?;

            writeln!(out, "Individual Results:")?;
            for r in results {
                writeln!(
                    out,
                    "  {} ({} {}): makespan {:.2} / critical {:.2}, {}us",
                    r.name, r.policy, r.strategy, r.makespan, r.critical_path, r.time_us
                )?;
            }
            Ok(())
        })
    }

    /// Side-by-side makespans per workload and strategy
    pub fn comparison_table(results: &[BenchmarkResult]) -> String {
        render(|out| {
            writeln!(out, "## Strategy Comparison\n")?;
            writeln!(out, "| Name | Policy | Strategy | Makespan | vs Deterministic |")?;
            writeln!(out, "|------|--------|----------|----------|------------------|")?;

            for r in results {
                let baseline = results
                    .iter()
                    .find(|b| {
                        b.name == r.name
                            && b.policy == r.policy
                            && b.strategy == Strategy::Deterministic
                    })
                    .map(|b| b.makespan);

                let delta = match baseline {
                    Some(base) if base > 0.0 => {
                        format!("{:+.1}%", (r.makespan - base) / base * 100.0)
                    }
                    _ => "-".to_string(),
                };
                writeln!(
                    out,
                    "| {} | {} | {} | {:.2} | {} |",
                    r.name, r.policy, r.strategy, r.makespan, delta
                )?;
            }
            Ok(())
        })
    }
}

/// Run a writer closure against a fresh string
fn render<F>(write: F) -> String
where
    F: FnOnce(&mut String) -> fmt::Result,
{
    let mut output = String::new();
    // Writing into a String cannot fail
    let _ = write(&mut output);
    output
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use qsched_schedule::Policy;

    fn sample() -> Vec<BenchmarkResult> {
        let make = |strategy, makespan| BenchmarkResult {
            name: "fan_out".to_string(),
            operations: 7,
            policy: Policy::Asap,
            strategy,
            makespan,
            critical_path: 3.0,
            depth: 3,
            parallelism: 1.5,
            best_trial: 0,
            time_us: 12,
        };
        vec![
            make(Strategy::Deterministic, 4.0),
            make(Strategy::Randomized(10), 3.0),
        ]
    }

    #[test]
    fn test_markdown() {
        let md = Reporter::report(&sample(), ReportFormat::Markdown);

        assert!(md.starts_with("# QSched Benchmark Results"));
        assert!(md.contains("| fan_out | 7 | ASAP | random(10) | 3.00 |"));
    }

    #[test]
    fn test_json() {
        let json = Reporter::report(&sample(), ReportFormat::Json);
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["statistics"]["count"], 2);
        assert_eq!(parsed["results"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_csv() {
        let csv = Reporter::report(&sample(), ReportFormat::Csv);
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("name,operations"));
        assert!(lines[1].starts_with("fan_out,7,ASAP,deterministic,4,"));
    }

    #[test]
    fn test_text() {
        let text = Reporter::report(&sample(), ReportFormat::Text);
        assert!(text.contains("Benchmarks run: 2"));
    }

    #[test]
    fn test_comparison_table() {
        let table = Reporter::comparison_table(&sample());

        assert!(table.contains("| fan_out | ASAP | deterministic | 4.00 | +0.0% |"));
        assert!(table.contains("| fan_out | ASAP | random(10) | 3.00 | -25.0% |"));
    }
}
