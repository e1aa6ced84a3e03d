//! Per-window session: the loaded document, the processing status shown to
//! the user, and the table's view state.
//!
//! Every ingestion attempt gets a generation number from [`Session::begin`].
//! Reports tagged with an older generation are dropped, so the most recently
//! started ingestion always wins.

use std::sync::Arc;

use log::{debug, error, info};

use crate::error::IngestError;
use crate::model::ResultDocument;
use crate::source::Origin;
use crate::view_state::ViewState;

/// Share of the progress bar covered by reading and decoding.
const DECODED_PROGRESS: u8 = 20;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Status {
    #[default]
    Idle,
    Uploading,
    Processing,
    Success,
    Error,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessingStatus {
    pub status: Status,
    pub progress: u8,
    pub message: String,
}

impl ProcessingStatus {
    fn new(status: Status, progress: u8, message: impl Into<String>) -> Self {
        Self {
            status,
            progress: progress.min(100),
            message: message.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Session {
    document: Option<Arc<ResultDocument>>,
    origin: Option<Origin>,
    status: ProcessingStatus,
    pub view: ViewState,
    generation: u64,
    pending_origin: Option<Origin>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document(&self) -> Option<&Arc<ResultDocument>> {
        self.document.as_ref()
    }

    /// Where the current document came from.
    pub fn origin(&self) -> Option<Origin> {
        self.origin
    }

    pub fn status(&self) -> &ProcessingStatus {
        &self.status
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.status.status, Status::Uploading | Status::Processing)
    }

    /// Custom-file data is never replaced by the default dataset.
    pub fn should_load_default(&self) -> bool {
        !(self.document.is_some() && self.origin == Some(Origin::CustomFile))
    }

    pub fn begin(&mut self, origin: Origin) -> u64 {
        self.generation += 1;
        self.pending_origin = Some(origin);
        let message = match origin {
            Origin::CustomFile => "Reading file...",
            Origin::DefaultData => "Loading default enzymes data...",
        };
        self.status = ProcessingStatus::new(Status::Uploading, 0, message);
        debug!("Ingestion {} started ({})", self.generation, origin.describe());
        self.generation
    }

    pub fn decoded(&mut self, generation: u64) -> bool {
        let Some(origin) = self.current(generation) else {
            return false;
        };
        let message = match origin {
            Origin::CustomFile => "File decompressed. Processing JSON data...",
            Origin::DefaultData => "Default file loaded. Processing data...",
        };
        self.status = ProcessingStatus::new(Status::Processing, DECODED_PROGRESS, message);
        true
    }

    /// Maps chunk progress onto the 20..=100 span of the bar.
    pub fn progress(&mut self, generation: u64, percent: u8) -> bool {
        if self.current(generation).is_none() {
            return false;
        }
        let percent = percent.min(100);
        let scaled = DECODED_PROGRESS + (percent as u32 * 8 / 10) as u8;
        self.status = ProcessingStatus::new(
            Status::Processing,
            scaled,
            format!("Processing data... {}%", percent),
        );
        true
    }

    pub fn complete(&mut self, generation: u64, document: ResultDocument) -> bool {
        let Some(origin) = self.current(generation) else {
            debug!("Dropping result of superseded ingestion {}", generation);
            return false;
        };
        let rows = document.row_count();
        let document = Arc::new(document);
        self.document = Some(Arc::clone(&document));
        self.origin = Some(origin);
        self.pending_origin = None;
        self.view.set_document(Some(document));
        self.status = ProcessingStatus::new(
            Status::Success,
            100,
            format!("Successfully loaded {} rows from {}.", rows, origin.describe()),
        );
        info!("{}", self.status.message);
        true
    }

    /// Records a failed attempt. The previously loaded document stays.
    pub fn fail(&mut self, generation: u64, err: &IngestError) -> bool {
        let Some(origin) = self.current(generation) else {
            debug!("Dropping error of superseded ingestion {}: {}", generation, err);
            return false;
        };
        self.pending_origin = None;
        let message = match origin {
            Origin::CustomFile => err.to_string(),
            Origin::DefaultData => format!("Error loading default data: {}", err),
        };
        error!("{}", message);
        self.status = ProcessingStatus::new(Status::Error, 0, message);
        true
    }

    fn current(&self, generation: u64) -> Option<Origin> {
        if generation == self.generation {
            self.pending_origin
        } else {
            None
        }
    }
}
