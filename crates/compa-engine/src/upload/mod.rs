//! # Upload Codec
//!
//! Uploads arrive already split into cells: a [`Sheet`] of rows, the first
//! row being the header. [`decode_sheet`] checks the header against the
//! fixed column order and yields pending rows. [`encode_run`] and
//! [`encode_errors`] write a processed run back out in the same layout.

pub mod export;
pub mod schema;
pub mod sheet;

pub use export::{encode_errors, encode_run, ERROR_MARKER, RESULT_COLUMNS};
pub use schema::decode_sheet;
pub use sheet::Sheet;
