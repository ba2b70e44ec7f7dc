//! Plaintext group listing.
//!
//! ```text
//!
//! Group #1 (2 files * 1 bytes):
//! /data/a
//! /data/b
//! Final count: 2 duplicate files in 1 sets
//! Redundant data size: 1 bytes
//! ```

use std::io::{self, Write};

use bytesize::ByteSize;

use crate::duplicates::Results;

/// Sizes at or above this get a human-readable suffix.
const HUMAN_SIZE_THRESHOLD: u64 = 10_000;

/// Format a byte count, e.g. `512 bytes` or `1048576 bytes (1.0 MiB)`.
#[must_use]
pub fn format_size(bytes: u64) -> String {
    if bytes < HUMAN_SIZE_THRESHOLD {
        format!("{} bytes", bytes)
    } else {
        format!("{} bytes ({})", bytes, ByteSize::b(bytes))
    }
}

/// Plaintext renderer for [`Results`].
#[derive(Debug)]
pub struct TextOutput<'a> {
    results: &'a Results,
    summary_only: bool,
}

impl<'a> TextOutput<'a> {
    #[must_use]
    pub fn new(results: &'a Results) -> Self {
        Self {
            results,
            summary_only: false,
        }
    }

    /// Print only the two summary lines.
    #[must_use]
    pub fn with_summary_only(mut self, summary_only: bool) -> Self {
        self.summary_only = summary_only;
        self
    }

    /// Write the listing.
    ///
    /// # Errors
    ///
    /// Returns any error from the writer.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        if !self.summary_only {
            for (index, group) in self.results.groups.iter().enumerate() {
                writeln!(
                    writer,
                    "\nGroup #{} ({} files * {}):",
                    index + 1,
                    group.len(),
                    format_size(group.size)
                )?;
                for path in &group.paths {
                    writeln!(writer, "{}", path.display())?;
                }
            }
        }

        writeln!(
            writer,
            "Final count: {} duplicate files in {} sets",
            self.results.duplicates,
            self.results.group_count()
        )?;
        writeln!(
            writer,
            "Redundant data size: {}",
            format_size(self.results.redundant_size)
        )?;
        Ok(())
    }

    /// Render to a `String`.
    #[must_use]
    pub fn render(&self) -> String {
        let mut buffer = Vec::new();
        // Writing to a Vec cannot fail.
        let _ = self.write_to(&mut buffer);
        String::from_utf8_lossy(&buffer).into_owned()
    }
}
