//! Progress reporting across the loading boundary.
//!
//! Workers report progress as owned values pushed through a [`ProgressSink`];
//! the consumer drains them on its own schedule. Nothing UI-affecting is ever
//! invoked from the reporting side.

/// Named stage of a specification load.
///
/// Each stage is independently addressable by the progress dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgressStage {
    /// Downloading the source document.
    Download,
    /// Parsing the IOD module list table.
    ParseTable,
    /// Parsing the referenced module/attribute tables.
    ParseModules,
    /// Saving the derived model to the cache.
    SaveModel,
}

impl ProgressStage {
    /// Number of stages a full tree load goes through.
    pub const COUNT: usize = 4;

    /// Display label for the stage's progress bar.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Download => "Downloading",
            Self::ParseTable => "Parsing module list",
            Self::ParseModules => "Parsing modules",
            Self::SaveModel => "Saving model",
        }
    }
}

/// A single progress update emitted by a loading task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Stage the update belongs to.
    pub stage: ProgressStage,
    /// Percent complete within the stage, or [`Progress::UNKNOWN`].
    pub percent: i8,
    /// Total number of stages of the task this update belongs to.
    pub total_stages: usize,
}

impl Progress {
    /// Sentinel percent for work that cannot estimate completion.
    pub const UNKNOWN: i8 = -1;

    /// Progress at a known percentage.
    #[must_use]
    pub fn new(stage: ProgressStage, percent: i8) -> Self {
        Self {
            stage,
            percent,
            total_stages: ProgressStage::COUNT,
        }
    }

    /// Progress with an unknown completion estimate.
    #[must_use]
    pub fn unknown(stage: ProgressStage) -> Self {
        Self::new(stage, Self::UNKNOWN)
    }

    /// `true` when the percent is the unknown sentinel.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.percent == Self::UNKNOWN
    }
}

/// Receiver side of progress updates crossing a thread boundary.
///
/// Implemented for plain closures so tests and workers can pass `&|p| ...`.
pub trait ProgressSink: Send + Sync {
    /// Accept one progress update.
    fn report(&self, progress: Progress);
}

impl<F> ProgressSink for F
where
    F: Fn(Progress) + Send + Sync,
{
    fn report(&self, progress: Progress) {
        self(progress);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_sentinel() {
        assert!(Progress::unknown(ProgressStage::Download).is_unknown());
        assert!(!Progress::new(ProgressStage::Download, 0).is_unknown());
        assert_eq!(Progress::unknown(ProgressStage::Download).percent, -1);
    }

    #[test]
    fn test_closure_sink() {
        let seen = std::sync::Mutex::new(Vec::new());
        let sink = |p: Progress| seen.lock().unwrap().push(p.percent);
        let sink: &dyn ProgressSink = &sink;
        sink.report(Progress::new(ProgressStage::ParseTable, 40));
        sink.report(Progress::new(ProgressStage::ParseTable, 80));
        assert_eq!(*seen.lock().unwrap(), vec![40, 80]);
    }
}
