//! The options job: fetch, transform, persist, notify.

use crate::notifier::Notifier;
use crate::report::PersistedReport;
use crate::sink::TableSink;
use crate::source::TableSource;
use chrono::NaiveDate;
use optflow_analytics::{Pipeline, RunStats};
use optflow_core::{Config, Result};
use tracing::{info, warn};

/// Outcome of one job run.
#[derive(Debug, Clone)]
pub struct JobReport {
    /// Pipeline counters.
    pub stats: RunStats,
    /// What the sink persisted.
    pub persisted: PersistedReport,
    /// Whether the notifier accepted the report.
    pub notified: bool,
}

/// One delivery target wired around the shared pipeline.
pub struct OptionsJob<S, K, N> {
    config: Config,
    pipeline: Pipeline,
    source: S,
    sink: K,
    notifier: N,
}

impl<S, K, N> OptionsJob<S, K, N>
where
    S: TableSource,
    K: TableSink,
    N: Notifier,
{
    /// Create a job from configuration and its collaborators.
    pub fn new(config: Config, source: S, sink: K, notifier: N) -> Self {
        let pipeline = Pipeline::new(&config);
        Self {
            config,
            pipeline,
            source,
            sink,
            notifier,
        }
    }

    /// Run once for the given date.
    ///
    /// Nothing is persisted or sent unless the transform succeeds. A failed
    /// notification is logged and reported, not raised.
    pub fn run(&self, as_of: NaiveDate) -> Result<JobReport> {
        info!(source = %self.source.describe(), %as_of, "options job started");

        let table = self.source.fetch()?;
        let output = self.pipeline.run(&table, as_of)?;

        let persisted = self
            .sink
            .persist(&self.config.output.file_name, &output.summaries)?;

        let notified = match self.notifier.notify(&persisted, &self.config.output.caption) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, name = %persisted.name, "notification failed");
                false
            }
        };

        Ok(JobReport {
            stats: output.stats,
            persisted,
            notified,
        })
    }

    /// The job's configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifier::RecordingNotifier;
    use crate::sink::MemorySink;
    use crate::source::BytesSource;
    use optflow_core::Error;

    const HEADER: &str = "Symbol,Price~,Type,Strike,Exp Date,Bid,Ask,Last,Volume,Open Int,IV,Delta\n";

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn test_run_persists_then_notifies() {
        let csv = format!(
            "{HEADER}AAPL,185.5,Call,190,2024-01-19,1,1.1,1.05,600,10,45.2%,0.5\n\
             AAPL,185.5,Call,190,2024-01-19,1,1.1,1.05,500,10,45.2%,-0.5\n"
        );
        let job = OptionsJob::new(
            Config::default(),
            BytesSource::new("inline", csv),
            MemorySink::new(),
            RecordingNotifier::new(),
        );

        let report = job.run(as_of()).unwrap();
        assert_eq!(report.stats.kept_groups, 1);
        assert_eq!(report.persisted.rows, 1);
        assert!(report.notified);

        let sent = job.notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].caption, job.config().output.caption);
        assert_eq!(sent[0].bytes, report.persisted.bytes);
    }

    #[test]
    fn test_failed_transform_persists_nothing() {
        let csv = format!("{HEADER}AAPL,185.5,Call,190,2024-01-19,1,1.1,oops,600,10,45%,0.5\n");
        let job = OptionsJob::new(
            Config::default(),
            BytesSource::new("inline", csv),
            MemorySink::new(),
            RecordingNotifier::new(),
        );

        let err = job.run(as_of()).unwrap_err();
        assert!(matches!(err, Error::Parse { ref column, .. } if column == "Last"));
        assert!(job.sink.reports().is_empty());
        assert!(job.notifier.sent().is_empty());
    }

    #[test]
    fn test_missing_column_persists_nothing() {
        let job = OptionsJob::new(
            Config::default(),
            BytesSource::new("inline", "Symbol,Price~\nAAPL,1\n"),
            MemorySink::new(),
            RecordingNotifier::new(),
        );
        assert!(matches!(job.run(as_of()), Err(Error::Schema { .. })));
        assert!(job.sink.reports().is_empty());
    }

    #[test]
    fn test_notify_failure_is_not_fatal() {
        let job = OptionsJob::new(
            Config::default(),
            BytesSource::new("inline", HEADER),
            MemorySink::new(),
            RecordingNotifier::failing(),
        );
        let report = job.run(as_of()).unwrap();
        assert!(!report.notified);
        assert_eq!(report.persisted.rows, 0);
        assert_eq!(job.sink.reports().len(), 1);
    }
}
