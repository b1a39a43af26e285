use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Progress events emitted while a structure is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// A load has begun reading `source`.
    Started { source: String },
    /// A line was consumed. `percent` is `None` when the total size is unknown.
    Advanced { percent: Option<u8>, message: String },
    /// The structure is assembled. Always reports 100 with no message.
    Completed,

    Message(String),
}

impl Progress {
    /// The percent value carried by the event, with -1 meaning indeterminate.
    pub fn percent(&self) -> Option<i32> {
        match self {
            Progress::Started { .. } => Some(0),
            Progress::Advanced { percent, .. } => Some(percent.map_or(-1, i32::from)),
            Progress::Completed => Some(100),
            Progress::Message(_) => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Progress::Started { source } => Some(source),
            Progress::Advanced { message, .. } => Some(message),
            Progress::Completed => None,
            Progress::Message(msg) => Some(msg),
        }
    }
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}

/// A flag a caller can set to stop a load at the next line boundary.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}
