//! Notification collaborators: announce a persisted result.

use crate::report::PersistedReport;
use optflow_core::{Error, Result};
use std::sync::Mutex;
use tracing::info;

/// Delivers a persisted report plus caption to a messaging endpoint.
pub trait Notifier {
    fn notify(&self, report: &PersistedReport, caption: &str) -> Result<()>;
}

impl<T: Notifier + ?Sized> Notifier for Box<T> {
    fn notify(&self, report: &PersistedReport, caption: &str) -> Result<()> {
        (**self).notify(report, caption)
    }
}

/// Does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _report: &PersistedReport, _caption: &str) -> Result<()> {
        Ok(())
    }
}

/// Announces the report through the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, report: &PersistedReport, caption: &str) -> Result<()> {
        info!(
            caption,
            name = %report.name,
            location = %report.location,
            bytes = report.bytes.len(),
            rows = report.rows,
            "result file delivered"
        );
        Ok(())
    }
}

/// A sent notification.
#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub caption: String,
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Records notifications in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentMessage>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier whose every delivery fails.
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Messages sent so far.
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, report: &PersistedReport, caption: &str) -> Result<()> {
        if self.fail {
            return Err(Error::notify("endpoint unavailable"));
        }
        self.sent
            .lock()
            .map_err(|_| Error::notify("recording notifier lock poisoned"))?
            .push(SentMessage {
                caption: caption.to_string(),
                name: report.name.clone(),
                bytes: report.bytes.clone(),
            });
        Ok(())
    }
}
