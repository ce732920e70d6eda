//! # Destination source: lazily read destination addresses, one per line.
//!
//! [`DestinationSource`] reads a plain-text list (one address per line, no
//! comments, no escaping) and yields each line with surrounding whitespace
//! trimmed. Blank lines are yielded as empty strings; skipping them is the
//! caller's decision.
//!
//! ## Read contract
//! ```text
//! open(path) ── Err ──► error, no lines
//!      │
//!      ▼
//! next_line():
//!   read up to '\n'
//!   ├─ Ok, ends with '\n'   → Some(Ok(line))
//!   ├─ Ok, no '\n' (EOF)    → Some(Ok(line)), then None
//!   └─ Err(e)               → Some(Ok(partial line)), then Some(Err(e)), then None
//! ```
//!
//! Whatever was read before end-of-file or an error is always delivered before
//! the sequence ends or the error is surfaced. The source is single-pass.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

/// Single-pass reader over a destination list.
#[derive(Debug)]
pub struct DestinationSource<R = BufReader<File>> {
    path: PathBuf,
    reader: R,
    /// Error to surface after the partial line read alongside it was delivered.
    pending: Option<io::Error>,
    done: bool,
}

impl DestinationSource {
    /// Opens the list. Failure to open is returned immediately.
    pub async fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).await?;
        Ok(Self::from_reader(path, BufReader::new(file)))
    }
}

impl<R: AsyncBufRead + Unpin> DestinationSource<R> {
    /// Reads the list from an already open `reader`; `path` names it in errors.
    pub fn from_reader(path: impl Into<PathBuf>, reader: R) -> Self {
        Self {
            path: path.into(),
            reader,
            pending: None,
            done: false,
        }
    }

    /// Path the source was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the next trimmed line, `None` once the list is exhausted.
    ///
    /// After `Some(Err(_))` every further call returns `None`.
    pub async fn next_line(&mut self) -> Option<io::Result<String>> {
        if let Some(err) = self.pending.take() {
            self.done = true;
            return Some(Err(err));
        }
        if self.done {
            return None;
        }

        let mut buf = Vec::new();
        let res = self.reader.read_until(b'\n', &mut buf).await;
        match res {
            Ok(_) if buf.ends_with(b"\n") => {}
            Ok(_) => self.done = true,
            Err(e) => self.pending = Some(e),
        }

        let line = String::from_utf8_lossy(&buf).trim().to_string();
        Some(Ok(line))
    }

    /// Drains the source, invoking `f` for every line (blank lines included).
    ///
    /// End-of-file ends the walk with `Ok(())`; any other read error is
    /// returned after the line read alongside it was passed to `f`.
    pub async fn for_each_line<F>(mut self, mut f: F) -> io::Result<()>
    where
        F: FnMut(&str),
    {
        while let Some(line) = self.next_line().await {
            f(&line?);
        }
        Ok(())
    }
}
