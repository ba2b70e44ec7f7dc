//! Output formatters for duplicate scan results.
//!
//! - [`TextOutput`]: the group listing followed by the final count
//! - [`JsonOutput`]: a single JSON document for automation and scripting
//!
//! # Example
//!
//! ```no_run
//! use dupsift::duplicates::DuplicateFinder;
//! use dupsift::output::TextOutput;
//! use std::path::PathBuf;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (results, _summary) = finder.find_duplicates(&[PathBuf::from(".")]).unwrap();
//!
//! TextOutput::new(&results).write_to(&mut std::io::stdout()).unwrap();
//! ```

pub mod json;
pub mod text;

pub use json::{JsonOutput, JsonOutputError};
pub use text::{format_size, TextOutput};
