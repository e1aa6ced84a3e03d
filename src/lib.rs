//! Desktop viewer for SPARQL JSON query results.
//!
//! Raw bytes from a local file or the default dataset go through
//! [`ingest`] into a [`model::ResultDocument`]. The [`session::Session`]
//! owns that document together with the [`view_state::ViewState`] that
//! filters and sorts it, and [`table::DataTable`] draws the visible slice
//! computed by [`viewport`].

pub mod app;
pub mod config;
pub mod error;
pub mod ingest;
pub mod model;
pub mod session;
pub mod source;
pub mod table;
pub mod view_state;
pub mod viewport;

pub use app::SparqlViewer;
pub use config::ViewerConfig;
pub use error::IngestError;
pub use ingest::{ChunkedIngest, ingest};
pub use model::{Cell, ResultDocument, Row};
