//! Human-readable run summary.
//!
//! ```text
//! Examined 1204 files, 312 candidates (48.2 MiB hashed)
//! Skipped 17 duplicates
//! Failed 1 file:
//!   /pics/locked.jpg: Cannot fingerprint /pics/locked.jpg: Unreadable file: Permission denied: /pics/locked.jpg
//! Created 294 symlinks
//! ```

use std::io::{self, Write};

use bytesize::ByteSize;
use yansi::Paint;

use crate::linker::RunResult;

/// Text formatter for a [`RunResult`].
pub struct TextOutput<'a> {
    result: &'a RunResult,
    color: bool,
}

impl<'a> TextOutput<'a> {
    /// Create a formatter. `color` enables ANSI styling.
    #[must_use]
    pub fn new(result: &'a RunResult, color: bool) -> Self {
        Self { result, color }
    }

    /// Write the summary to `writer`.
    ///
    /// # Errors
    ///
    /// Returns any error from the writer.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let r = self.result;
        let cond = if self.color {
            yansi::Condition::ALWAYS
        } else {
            yansi::Condition::NEVER
        };

        writeln!(
            writer,
            "Examined {} files, {} candidates ({} hashed)",
            r.examined,
            r.candidates,
            ByteSize::b(r.bytes_hashed)
        )?;

        if r.duplicates > 0 {
            writeln!(writer, "Skipped {} duplicates", r.duplicates)?;
        }

        if !r.scan_errors.is_empty() {
            let header = format!("{} entries could not be scanned", r.scan_errors.len());
            writeln!(writer, "{}", header.yellow().whenever(cond))?;
        }

        if !r.failures.is_empty() {
            let noun = if r.failures.len() == 1 { "file" } else { "files" };
            let header = format!("Failed {} {}:", r.failures.len(), noun);
            writeln!(writer, "{}", header.red().whenever(cond))?;
            for failure in &r.failures {
                writeln!(writer, "  {}: {}", failure.path.display(), failure.error)?;
            }
        }

        if r.interrupted {
            let note = format!("Interrupted, {} candidates not processed", r.unprocessed());
            writeln!(writer, "{}", note.yellow().whenever(cond))?;
        }

        let created = format!("Created {} symlinks", r.created);
        writeln!(writer, "{}", created.green().bold().whenever(cond))
    }

    /// Render the summary to a string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut buf = Vec::new();
        // Writing to a Vec cannot fail.
        let _ = self.write_to(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }
}
