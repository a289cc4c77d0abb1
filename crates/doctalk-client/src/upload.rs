//! Progress tracking for document uploads.

use strum_macros::Display;

/// Lifecycle of one transfer. Terminal states are absorbing.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum UploadState {
    #[strum(serialize = "pending")]
    Pending,
    #[strum(serialize = "active")]
    Active,
    #[strum(serialize = "succeeded")]
    Succeeded,
    #[strum(serialize = "failed")]
    Failed,
}

/// Converts raw `(bytes_loaded, bytes_total)` notifications into a bounded
/// percentage. The published value never moves backwards within a transfer;
/// a notification reporting fewer bytes than already seen is stale and leaves
/// the percentage where it was.
#[derive(Debug, Default)]
pub struct UploadProgress {
    seen_bytes: u64,
    percent: u8,
}

impl UploadProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a notification and return the percentage to publish.
    pub fn update(&mut self, loaded: u64, total: u64) -> u8 {
        if total == 0 || loaded < self.seen_bytes {
            return self.percent;
        }

        self.seen_bytes = loaded;
        let computed = ((loaded as f64 * 100.0) / total as f64).round() as u64;
        self.percent = self.percent.max(computed.min(100) as u8);
        self.percent
    }

    pub fn percent(&self) -> u8 {
        self.percent
    }
}

/// Per-transfer record owned by the upload initiator and discarded once a
/// terminal state has been reported to the view.
#[derive(Clone, Debug)]
pub struct UploadTask {
    pub filename: String,
    pub mime_type: String,
    pub data: Vec<u8>,
    state: UploadState,
    percent: u8,
}

impl UploadTask {
    pub fn new(filename: &str, mime_type: &str, data: Vec<u8>) -> Self {
        Self {
            filename: filename.to_string(),
            mime_type: mime_type.to_string(),
            data,
            state: UploadState::Pending,
            percent: 0,
        }
    }

    pub fn state(&self) -> UploadState {
        self.state
    }

    pub fn percent(&self) -> u8 {
        self.percent
    }

    /// Transition to `Active` and zero the percentage for the new transfer.
    pub fn start(&mut self) {
        if self.state == UploadState::Pending {
            self.state = UploadState::Active;
            self.percent = 0;
        }
    }

    /// Record a published percentage. Ignored outside the `Active` state,
    /// and never moves backwards.
    pub fn set_percent(&mut self, percent: u8) {
        if self.state == UploadState::Active {
            self.percent = self.percent.max(percent.min(100));
        }
    }

    pub fn succeed(&mut self) {
        if self.state == UploadState::Active {
            self.state = UploadState::Succeeded;
        }
    }

    pub fn fail(&mut self) {
        if !matches!(self.state, UploadState::Succeeded | UploadState::Failed) {
            self.state = UploadState::Failed;
        }
    }
}

#[cfg(test)]
mod test {
    use super::{UploadProgress, UploadState, UploadTask};

    #[test]
    fn test_percentages_for_a_simple_transfer() {
        let mut progress = UploadProgress::new();
        assert_eq!(progress.update(0, 200), 0);
        assert_eq!(progress.update(100, 200), 50);
        assert_eq!(progress.update(200, 200), 100);
    }

    #[test]
    fn test_stale_notifications_do_not_regress() {
        let mut progress = UploadProgress::new();
        assert_eq!(progress.update(150, 200), 75);
        assert_eq!(progress.update(100, 200), 75);
        assert_eq!(progress.update(200, 200), 100);
    }

    #[test]
    fn test_clamped_to_one_hundred() {
        let mut progress = UploadProgress::new();
        // A transport may report a final size larger than the advertised
        // total once framing overhead is included.
        assert_eq!(progress.update(260, 200), 100);
    }

    #[test]
    fn test_zero_total_is_ignored() {
        let mut progress = UploadProgress::new();
        assert_eq!(progress.update(10, 0), 0);
    }

    #[test]
    fn test_rounding_matches_display_expectations() {
        let mut progress = UploadProgress::new();
        assert_eq!(progress.update(1, 3), 33);
        assert_eq!(progress.update(2, 3), 67);
    }

    #[test]
    fn test_task_lifecycle() {
        let mut task = UploadTask::new("report.pdf", "application/pdf", vec![0u8; 16]);
        assert_eq!(task.state(), UploadState::Pending);

        // Percentages reported before the transfer starts are ignored.
        task.set_percent(50);
        assert_eq!(task.percent(), 0);

        task.start();
        assert_eq!(task.state(), UploadState::Active);
        task.set_percent(50);
        assert_eq!(task.percent(), 50);
        task.set_percent(25);
        assert_eq!(task.percent(), 50);

        task.succeed();
        assert_eq!(task.state(), UploadState::Succeeded);

        // Terminal states absorb further signals.
        task.set_percent(100);
        assert_eq!(task.percent(), 50);
        task.fail();
        assert_eq!(task.state(), UploadState::Succeeded);
    }
}
