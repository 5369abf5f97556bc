//! Incremental reader over an async byte source.

use std::collections::VecDeque;
use std::io;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

/// Default upper bound on a single read from the source.
const DEFAULT_CHUNK_SIZE: usize = 8 * 1024;

/// An incremental reader that buffers input as a queue of byte segments.
///
/// Each [`fill`](Self::fill) performs one read from the source and appends
/// the received bytes as a new segment. The caller parses what it can from
/// [`segments`](Self::segments) and releases fully parsed bytes with
/// [`consume`](Self::consume); unconsumed bytes stay buffered for the next
/// round. End of input is reported through
/// [`is_completed`](Self::is_completed).
#[derive(Debug)]
pub struct FrameReader<R> {
    source: R,
    /// Staging buffer the next read lands in; recycled between fills.
    staging: BytesMut,
    segments: VecDeque<Bytes>,
    buffered: usize,
    completed: bool,
    chunk_size: usize,
}

impl<R> FrameReader<R> {
    /// Creates a reader with the default read chunk size.
    pub fn new(source: R) -> Self {
        Self::with_chunk_size(source, DEFAULT_CHUNK_SIZE)
    }

    /// Creates a reader that receives at most `chunk_size` bytes per fill.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` is zero.
    pub fn with_chunk_size(source: R, chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "chunk size must be at least 1");
        Self {
            source,
            staging: BytesMut::new(),
            segments: VecDeque::new(),
            buffered: 0,
            completed: false,
            chunk_size,
        }
    }

    /// Returns the number of buffered, unconsumed bytes.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buffered
    }

    /// Returns `true` once the source has reported end of input.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Returns the buffered segments in arrival order.
    pub fn segments(&mut self) -> &[Bytes] {
        self.segments.make_contiguous()
    }

    /// Releases the first `n` buffered bytes.
    ///
    /// # Panics
    ///
    /// Panics if `n` exceeds the buffered byte count.
    pub fn consume(&mut self, mut n: usize) {
        assert!(n <= self.buffered, "consume past buffered input");
        self.buffered -= n;
        while n > 0 {
            let Some(mut front) = self.segments.pop_front() else {
                break;
            };
            if front.len() <= n {
                n -= front.len();
            } else {
                front.advance(n);
                n = 0;
                self.segments.push_front(front);
            }
        }
    }
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    /// Reads once from the source, appending a new segment.
    ///
    /// Suspends until the source yields data or reports end of input.
    /// Returns the number of bytes received; zero means the source is
    /// completed (every later call returns zero immediately).
    ///
    /// # Errors
    ///
    /// Propagates any I/O error from the source.
    pub async fn fill(&mut self) -> io::Result<usize> {
        if self.completed {
            return Ok(0);
        }
        self.staging.reserve(self.chunk_size);
        let mut target = (&mut self.staging).limit(self.chunk_size);
        let received = self.source.read_buf(&mut target).await?;
        if received == 0 {
            self.completed = true;
        } else {
            let segment = self.staging.split().freeze();
            self.buffered += segment.len();
            self.segments.push_back(segment);
        }
        Ok(received)
    }
}
