// Metrics module - Prometheus-compatible metrics tracking
// Thread-safe via atomic operations and mutexes; shared across submissions
// behind an Arc.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Counters and timings for the submission pipeline and the sanitizer.
#[derive(Default)]
pub struct Metrics {
    // Submissions that passed the gate
    submissions: AtomicU64,

    // Successful composites
    composites: AtomicU64,

    // Gate denials by reason label
    gate_denials: Mutex<HashMap<&'static str, u64>>,

    // Pipeline failures by kind label
    pipeline_failures: Mutex<HashMap<&'static str, u64>>,

    // Messages removed by the channel sanitizer
    sanitizer_removals: AtomicU64,

    // Composite wall time in microseconds
    composite_durations_us: Mutex<Vec<u64>>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_submission(&self) {
        self.submissions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_denial(&self, reason: &'static str) {
        if let Ok(mut denials) = self.gate_denials.lock() {
            *denials.entry(reason).or_insert(0) += 1;
        }
    }

    pub fn record_failure(&self, kind: &'static str) {
        if let Ok(mut failures) = self.pipeline_failures.lock() {
            *failures.entry(kind).or_insert(0) += 1;
        }
    }

    pub fn record_composite(&self, duration: Duration) {
        self.composites.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut durations) = self.composite_durations_us.lock() {
            durations.push(duration.as_micros() as u64);
        }
    }

    pub fn record_sanitizer_removal(&self) {
        self.sanitizer_removals.fetch_add(1, Ordering::Relaxed);
    }

    /// Get submission count (for testing)
    pub fn submission_count(&self) -> u64 {
        self.submissions.load(Ordering::Relaxed)
    }

    /// Get composite count (for testing)
    pub fn composite_count(&self) -> u64 {
        self.composites.load(Ordering::Relaxed)
    }

    /// Get denial count for a reason (for testing)
    pub fn denial_count(&self, reason: &str) -> u64 {
        self.gate_denials
            .lock()
            .map(|d| d.get(reason).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Get failure count for a kind (for testing)
    pub fn failure_count(&self, kind: &str) -> u64 {
        self.pipeline_failures
            .lock()
            .map(|f| f.get(kind).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Export metrics in Prometheus text format
    /// Returns metrics as text/plain content for the /metrics endpoint
    pub fn export_prometheus(&self) -> String {
        let mut output = String::new();

        output.push_str("# HELP vouchmark_submissions_total Submissions that passed the gate\n");
        output.push_str("# TYPE vouchmark_submissions_total counter\n");
        output.push_str(&format!(
            "vouchmark_submissions_total {}\n",
            self.submissions.load(Ordering::Relaxed)
        ));

        output.push_str("\n# HELP vouchmark_composites_total Successfully delivered composites\n");
        output.push_str("# TYPE vouchmark_composites_total counter\n");
        output.push_str(&format!(
            "vouchmark_composites_total {}\n",
            self.composites.load(Ordering::Relaxed)
        ));

        output.push_str("\n# HELP vouchmark_gate_denials_total Gate denials by reason\n");
        output.push_str("# TYPE vouchmark_gate_denials_total counter\n");
        if let Ok(denials) = self.gate_denials.lock() {
            for (reason, count) in denials.iter() {
                output.push_str(&format!(
                    "vouchmark_gate_denials_total{{reason=\"{}\"}} {}\n",
                    reason, count
                ));
            }
        }

        output.push_str("\n# HELP vouchmark_pipeline_failures_total Pipeline failures by kind\n");
        output.push_str("# TYPE vouchmark_pipeline_failures_total counter\n");
        if let Ok(failures) = self.pipeline_failures.lock() {
            for (kind, count) in failures.iter() {
                output.push_str(&format!(
                    "vouchmark_pipeline_failures_total{{kind=\"{}\"}} {}\n",
                    kind, count
                ));
            }
        }

        output.push_str(
            "\n# HELP vouchmark_sanitizer_removals_total Messages removed by the sanitizer\n",
        );
        output.push_str("# TYPE vouchmark_sanitizer_removals_total counter\n");
        output.push_str(&format!(
            "vouchmark_sanitizer_removals_total {}\n",
            self.sanitizer_removals.load(Ordering::Relaxed)
        ));

        if let Ok(durations) = self.composite_durations_us.lock() {
            let sum: u64 = durations.iter().sum();
            output.push_str(
                "\n# HELP vouchmark_composite_duration_microseconds Composite wall time\n",
            );
            output.push_str("# TYPE vouchmark_composite_duration_microseconds summary\n");
            output.push_str(&format!(
                "vouchmark_composite_duration_microseconds_sum {}\n",
                sum
            ));
            output.push_str(&format!(
                "vouchmark_composite_duration_microseconds_count {}\n",
                durations.len()
            ));
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_zero() {
        let metrics = Metrics::new();
        assert_eq!(metrics.submission_count(), 0);
        assert_eq!(metrics.composite_count(), 0);
        assert_eq!(metrics.denial_count("wrong_channel"), 0);
    }

    #[test]
    fn test_record_and_read_back() {
        let metrics = Metrics::new();
        metrics.record_submission();
        metrics.record_submission();
        metrics.record_denial("wrong_channel");
        metrics.record_failure("missing_emblem");
        metrics.record_composite(Duration::from_millis(12));

        assert_eq!(metrics.submission_count(), 2);
        assert_eq!(metrics.composite_count(), 1);
        assert_eq!(metrics.denial_count("wrong_channel"), 1);
        assert_eq!(metrics.failure_count("missing_emblem"), 1);
    }

    #[test]
    fn test_export_prometheus_format() {
        let metrics = Metrics::new();
        metrics.record_submission();
        metrics.record_denial("bad_content_type");
        metrics.record_composite(Duration::from_micros(500));

        let output = metrics.export_prometheus();

        assert!(output.contains("# TYPE vouchmark_submissions_total counter"));
        assert!(output.contains("vouchmark_submissions_total 1"));
        assert!(output.contains("vouchmark_gate_denials_total{reason=\"bad_content_type\"} 1"));
        assert!(output.contains("vouchmark_composite_duration_microseconds_sum 500"));
        assert!(output.contains("vouchmark_composite_duration_microseconds_count 1"));
    }
}
