//! # Combined stdout/stderr capture.
//!
//! Both encoder pipes are drained into one [`OutputBuffer`] as chunks arrive,
//! so the buffer holds them roughly interleaved. A looping encoder prints
//! progress forever; the buffer keeps only the newest `limit` bytes.

use std::sync::{Mutex, PoisonError};

use tokio::io::{AsyncRead, AsyncReadExt};

const CHUNK: usize = 8 * 1024;

/// Bounded tail of an encoder's combined output.
#[derive(Debug)]
pub struct OutputBuffer {
    bytes: Mutex<Vec<u8>>,
    /// `0` = unbounded.
    limit: usize,
}

impl OutputBuffer {
    pub fn new(limit: usize) -> Self {
        Self {
            bytes: Mutex::new(Vec::new()),
            limit,
        }
    }

    /// Appends a chunk, discarding the oldest bytes beyond the limit.
    pub fn append(&self, chunk: &[u8]) {
        let mut bytes = self.bytes.lock().unwrap_or_else(PoisonError::into_inner);
        bytes.extend_from_slice(chunk);
        if self.limit > 0 && bytes.len() > self.limit {
            let excess = bytes.len() - self.limit;
            bytes.drain(..excess);
        }
    }

    /// Captured output, lossily decoded.
    pub fn contents(&self) -> String {
        let bytes = self.bytes.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

/// Drains `reader` into `buf` until end-of-stream or a read error.
pub async fn capture<R>(reader: Option<R>, buf: &OutputBuffer)
where
    R: AsyncRead + Unpin,
{
    let Some(mut reader) = reader else {
        return;
    };
    let mut chunk = vec![0u8; CHUNK];
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.append(&chunk[..n]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_newest_bytes_within_limit() {
        let buf = OutputBuffer::new(8);
        buf.append(b"frame=1 ");
        buf.append(b"frame=2 ");
        assert_eq!(buf.contents(), "frame=2 ");
    }

    #[test]
    fn zero_limit_is_unbounded() {
        let buf = OutputBuffer::new(0);
        for _ in 0..100 {
            buf.append(b"0123456789");
        }
        assert_eq!(buf.contents().len(), 1000);
    }

    #[tokio::test]
    async fn drains_reader_to_end() {
        let buf = OutputBuffer::new(0);
        capture(Some(&b"Input #0, mov,mp4\n"[..]), &buf).await;
        capture(None::<&[u8]>, &buf).await;
        assert_eq!(buf.contents(), "Input #0, mov,mp4\n");
    }
}
