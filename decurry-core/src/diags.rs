//! Per-file diagnostics collected while the passes run.
//!
//! Passes record into an [`InlineContext`] owned by the run; once the pipeline
//! has finished it is frozen into an [`InlineReport`] and handed to a
//! [`DiagnosticsSink`].

use crate::split_decls::FuncSplit;
use indexmap::{IndexMap, IndexSet};
use log::info;
use serde::Serialize;

/// Mutable diagnostic state of one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct InlineContext {
    /// Original names of split curry-wrapper declarations
    pub splits: IndexSet<String>,
    /// Apply-wrapper targets that were left as indirect dispatch
    pub partial_applications: IndexSet<String>,
    /// Specialized call sites per target function
    pub inlined: IndexMap<String, usize>,
    /// Rewrites per pass name
    pub rewrites: IndexMap<&'static str, usize>,
}

impl InlineContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_split(&mut self, split: &FuncSplit) {
        self.splits.insert(split.original_name.clone());
    }

    pub fn record_partial_application(&mut self, target: &str) {
        self.partial_applications.insert(target.to_string());
    }

    pub fn record_inlined(&mut self, target: &str) {
        *self.inlined.entry(target.to_string()).or_insert(0) += 1;
    }

    pub fn count_rewrite(&mut self, pass: &'static str) {
        self.add_rewrites(pass, 1);
    }

    /// Passes that rewrote nothing do not show up in the report.
    pub fn add_rewrites(&mut self, pass: &'static str, count: usize) {
        if count > 0 {
            *self.rewrites.entry(pass).or_insert(0) += count;
        }
    }

    pub fn rewrite_count(&self, pass: &str) -> usize {
        self.rewrites.get(pass).copied().unwrap_or(0)
    }

    /// Snapshot for reporting.
    pub fn report(&self, file_id: &str) -> InlineReport {
        InlineReport {
            file_id: file_id.to_string(),
            splits_count: self.splits.len(),
            partial_applications_count: self.partial_applications.len(),
            inlined: self.inlined.clone(),
            rewrites: self.rewrites.iter().map(|(pass, n)| (pass.to_string(), *n)).collect(),
        }
    }
}

/// What the diagnostics sink receives for each file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InlineReport {
    pub file_id: String,
    pub splits_count: usize,
    pub partial_applications_count: usize,
    pub inlined: IndexMap<String, usize>,
    pub rewrites: IndexMap<String, usize>,
}

impl InlineReport {
    /// Total number of specialized call sites.
    pub fn inlined_total(&self) -> usize {
        self.inlined.values().sum()
    }

    /// One-line human readable summary.
    pub fn summary(&self) -> String {
        format!(
            "functionInlineTransformer: splitCount={}, partialApplicationCount={}, inlined={} ({} functions)",
            self.splits_count,
            self.partial_applications_count,
            self.inlined_total(),
            self.inlined.len()
        )
    }
}

/// Serialize reports to a JSON string.
pub fn to_json(reports: &[InlineReport]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(reports)
}

/// Receives one report per processed file.
pub trait DiagnosticsSink {
    fn report(&mut self, report: &InlineReport);
}

/// Writes each report through `log::info!`.
#[derive(Debug, Default)]
pub struct LogSink;

impl DiagnosticsSink for LogSink {
    fn report(&mut self, report: &InlineReport) {
        info!("{}: {}", report.file_id, report.summary());
        for (pass, count) in &report.rewrites {
            info!("{}:   {} rewrote {} node(s)", report.file_id, pass, count);
        }
    }
}

/// Keeps reports in memory.
#[derive(Debug, Default)]
pub struct CollectSink {
    pub reports: Vec<InlineReport>,
}

impl DiagnosticsSink for CollectSink {
    fn report(&mut self, report: &InlineReport) {
        self.reports.push(report.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(name: &str, arity: usize) -> FuncSplit {
        FuncSplit {
            original_name: name.to_string(),
            raw_lambda_name: format!("{}_raw", name),
            arity,
        }
    }

    #[test]
    fn test_report_counts() {
        let mut ctx = InlineContext::new();
        ctx.record_split(&split("add", 2));
        ctx.record_split(&split("map", 2));
        ctx.record_inlined("add");
        ctx.record_inlined("add");
        ctx.record_inlined("map");
        ctx.record_partial_application("foldl");
        ctx.record_partial_application("foldl");
        ctx.count_rewrite("inline-equality");

        let report = ctx.report("main.js");
        assert_eq!(report.splits_count, 2);
        assert_eq!(report.partial_applications_count, 1);
        assert_eq!(report.inlined_total(), 3);
        assert_eq!(report.inlined.get("add"), Some(&2));
        assert_eq!(report.rewrites.get("inline-equality"), Some(&1));
        assert_eq!(ctx.rewrite_count("inline-equality"), 1);
        assert_eq!(ctx.rewrite_count("list-literals"), 0);
    }

    #[test]
    fn test_summary_line() {
        let mut ctx = InlineContext::new();
        ctx.record_split(&split("add", 2));
        ctx.record_inlined("add");
        assert_eq!(
            ctx.report("a.js").summary(),
            "functionInlineTransformer: splitCount=1, partialApplicationCount=0, inlined=1 (1 functions)"
        );
    }

    #[test]
    fn test_collect_sink_and_json() {
        let mut sink = CollectSink::default();
        let mut ctx = InlineContext::new();
        ctx.record_inlined("f");
        sink.report(&ctx.report("a.js"));
        sink.report(&InlineContext::new().report("b.js"));
        assert_eq!(sink.reports.len(), 2);

        let json = to_json(&sink.reports).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["file_id"], "a.js");
        assert_eq!(value[0]["inlined"]["f"], 1);
        assert_eq!(value[1]["splits_count"], 0);
    }
}
