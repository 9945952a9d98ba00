//! Record parser for conversion upload files
//!
//! This module streams rows out of a delimited file with a header row and
//! hands them to the validator as [`RawRow`](crate::app::models::RawRow)s,
//! one per data line, in file order.
//!
//! ## Architecture
//!
//! - [`reader`] - Lazy row iterator and file handling
//! - [`column_mapping`] - Header canonicalisation and required-column checks
//!
//! ## Usage
//!
//! ```rust,no_run
//! use conversion_uploader::app::services::record_parser::RecordReader;
//!
//! # fn example() -> conversion_uploader::Result<()> {
//! let reader = RecordReader::open(std::path::Path::new("conversions.csv"))?;
//! for row in reader {
//!     let row = row?;
//!     println!("line {}: {:?}", row.line, row.get("identifier"));
//! }
//! # Ok(())
//! # }
//! ```

pub mod column_mapping;
pub mod reader;

#[cfg(test)]
pub mod tests;

pub use column_mapping::ColumnMapping;
pub use reader::RecordReader;
