//! Session transcript recording.
//!
//! A transcript is the raw byte log of a live session: every line consumed
//! from the verifier and every answer written back, in the order they
//! happened. Feeding it to a replay session reproduces the original event
//! sequence without spawning the verifier.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Append-only trace file held open for the lifetime of a session.
///
/// Dropping a `Transcript` flushes it (errors ignored); call
/// [`Transcript::finish`] on the normal path to observe flush errors.
#[derive(Debug)]
pub struct Transcript {
    path: PathBuf,
    out: BufWriter<File>,
    bytes: u64,
}

impl Transcript {
    /// Creates (or truncates) the trace file at `path`.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when the file cannot be created.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)?;
        tracing::info!(path = %path.display(), "recording transcript");
        Ok(Self { path, out: BufWriter::new(file), bytes: 0 })
    }

    /// Appends raw bytes in call order.
    pub fn record(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.out.write_all(bytes)?;
        self.bytes += bytes.len() as u64;
        Ok(())
    }

    /// Flushes and closes the file.
    pub fn finish(mut self) -> io::Result<()> {
        self.out.flush()?;
        self.out.get_ref().sync_all()?;
        tracing::debug!(path = %self.path.display(), bytes = self.bytes, "transcript closed");
        Ok(())
    }
}
