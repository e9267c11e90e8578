//! certmint batch driver
//!
//! Reads recipient rows, assigns identifiers, and stamps one certificate per
//! row in parallel. Failures are reported per record in the manifest.

pub mod batch;
pub mod ingest;
pub mod logging;

pub use batch::{assign_ids, run_batch, BatchOptions, Failed, Issued, Manifest};
pub use ingest::{parse_rows, Row};
