use std::collections::HashMap;
use std::time::Instant;

use crate::navigation::domain::decision_engine::Decision;
use crate::navigation::domain::navigation_result::NavigationResult;

/// Observer for what the navigate stage decided and how long it took.
///
/// Keeps the pipeline free of output concerns; the CLI logs through the
/// `log` facade, tests discard everything.
pub trait NavigationLogger: Send {
    /// One processed utterance. `matched_text` is the matched segment's text.
    fn navigation(&mut self, cursor: usize, result: &NavigationResult, matched_text: Option<&str>);

    /// The cursor moved from `from` to `to`.
    fn advance(&mut self, from: usize, to: usize);

    fn timing(&mut self, stage: &str, duration_ms: f64);

    fn info(&mut self, message: &str);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

pub struct NullNavigationLogger;

impl NavigationLogger for NullNavigationLogger {
    fn navigation(&mut self, _cursor: usize, _result: &NavigationResult, _text: Option<&str>) {}
    fn advance(&mut self, _from: usize, _to: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Running totals for one stage; constant size however long the session.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StageTiming {
    pub calls: usize,
    pub total_ms: f64,
    pub max_ms: f64,
}

impl StageTiming {
    fn record(&mut self, duration_ms: f64) {
        self.calls += 1;
        self.total_ms += duration_ms;
        self.max_ms = self.max_ms.max(duration_ms);
    }

    pub fn avg_ms(&self) -> f64 {
        self.total_ms / self.calls.max(1) as f64
    }
}

/// Logs each outcome through `log` and keeps per-stage timings and
/// decision counts for the summary.
pub struct LogNavigationLogger {
    timings: HashMap<String, StageTiming>,
    start_time: Instant,
    forwards: usize,
    stays: usize,
    advances: usize,
}

impl LogNavigationLogger {
    pub fn new() -> Self {
        Self {
            timings: HashMap::new(),
            start_time: Instant::now(),
            forwards: 0,
            stays: 0,
            advances: 0,
        }
    }

    /// Returns the formatted summary, or `None` if nothing was processed.
    pub fn summary_string(&self) -> Option<String> {
        let utterances = self.forwards + self.stays;
        if utterances == 0 && self.timings.is_empty() {
            return None;
        }

        let elapsed_s = self.start_time.elapsed().as_secs_f64();
        let mut lines = vec![format!(
            "Navigation summary ({utterances} utterances, {elapsed_s:.1}s):"
        )];
        lines.push(format!(
            "  decisions: {} forward, {} stay; {} advances",
            self.forwards, self.stays, self.advances
        ));

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let t = &self.timings[stage];
            lines.push(format!(
                "  {stage:12}: avg {:6.1}ms  max {:6.1}ms  ({} calls)",
                t.avg_ms(),
                t.max_ms,
                t.calls
            ));
        }

        Some(lines.join("\n"))
    }

    pub fn timings_for(&self, stage: &str) -> Option<StageTiming> {
        self.timings.get(stage).copied()
    }
}

impl Default for LogNavigationLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl NavigationLogger for LogNavigationLogger {
    fn navigation(&mut self, cursor: usize, result: &NavigationResult, matched_text: Option<&str>) {
        match result.decision {
            Decision::Forward => self.forwards += 1,
            Decision::Stay => self.stays += 1,
        }
        log::info!("[{cursor}] heard: \"{}\"", result.query);
        if let Some(text) = matched_text {
            log::info!(
                "[{cursor}] matched {}: \"{text}\"",
                result.matched_segment_id.as_deref().unwrap_or("-")
            );
        }
        log::info!(
            "[{cursor}] {:?} -> {} ({:.1}ms)",
            result.decision,
            result.target_transcript_id.as_deref().unwrap_or("-"),
            result.elapsed_ms
        );
        for s in &result.suggestions {
            log::debug!("[{cursor}]   {:.3} {}", s.score, s.segment_id);
        }
    }

    fn advance(&mut self, from: usize, to: usize) {
        self.advances += 1;
        log::info!("Advanced {from} -> {to}");
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .record(duration_ms);
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}
