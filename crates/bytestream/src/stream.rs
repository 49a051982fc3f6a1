use alloc::vec::Vec;
use core::{fmt, slice};

use bstr::ByteSlice;

use crate::{
    error::{StreamError, StreamResult},
    options::StreamOptions,
    pending::Pending,
    source::{self, BytesSource, Source},
};

/// A lookahead buffer over a byte [`Source`].
///
/// Bytes are pulled from the source only when an operation needs more than is
/// already buffered. Operations come in three families:
///
/// - *peek* (`peek`, `peek_up_to`, `starts_with`, `peek_until`, ...) inspect
///   upcoming bytes and never consume them;
/// - *read* (`read`, `read_while`, `read_until`, ...) consume bytes and return
///   them;
/// - *skip* (`skip`, `skip_bytes`, `skip_while`) consume bytes and drop them.
///
/// Every returned `Vec<u8>` is an independent copy of the buffered bytes.
///
/// When a source fails or runs dry in the middle of a request, the bytes it
/// did deliver stay buffered, so a later call (or a different operation) still
/// sees them.
///
/// Streams over [`std::io::Error`] sources also implement
/// [`std::io::Read`] and [`std::io::BufRead`]. Inherent methods take precedence
/// in method-call syntax, so the trait versions of `read` and `read_until`
/// have to be called through the trait (`io::Read::read(&mut stream, buf)`).
pub struct Stream<S> {
    source: S,
    pending: Pending,
    options: StreamOptions,
}

impl<S> Stream<S> {
    /// Wrap `source` with default options.
    pub fn new(source: S) -> Self {
        Self::with_options(source, StreamOptions::default())
    }

    /// Wrap `source`.
    pub fn with_options(source: S, options: StreamOptions) -> Self {
        let options = options.normalized();
        Self {
            source,
            pending: Pending::with_capacity(options.initial_capacity),
            options,
        }
    }

    /// Bytes pulled from the source and not consumed yet.
    ///
    /// This is a borrowed view, unlike everything the peek family returns.
    pub fn buffer(&self) -> &[u8] {
        self.pending.as_slice()
    }

    /// Number of bytes pulled from the source and not consumed yet.
    pub fn buffered_len(&self) -> usize {
        self.pending.len()
    }

    /// The options this stream was created with, after normalization.
    pub fn options(&self) -> &StreamOptions {
        &self.options
    }

    /// The wrapped source.
    pub fn get_ref(&self) -> &S {
        &self.source
    }

    /// The wrapped source.
    ///
    /// Reading from it directly bypasses the bytes already buffered.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Give back the source together with the bytes buffered but not consumed.
    pub fn into_parts(self) -> (S, Vec<u8>) {
        (self.source, self.pending.into_vec())
    }

    #[cfg(feature = "std")]
    #[inline]
    pub(crate) fn consume(&mut self, n: usize) {
        self.pending.consume(n);
    }
}

impl Stream<BytesSource> {
    /// Stream over an in-memory byte sequence.
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        Self::new(BytesSource::new(data))
    }
}

impl<S: Source> Stream<S> {
    /// Whether no further bytes can be obtained.
    ///
    /// Only touches the source when nothing is buffered.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::Source`] if the source fails while probing.
    pub fn is_empty(&mut self) -> StreamResult<bool, S::Error> {
        if !self.pending.is_empty() {
            return Ok(false);
        }
        match self.fill(1) {
            Ok(()) => Ok(false),
            Err(StreamError::InsufficientData) => Ok(true),
            Err(err) => Err(err),
        }
    }

    /// Copy of the next `n` bytes, without consuming them.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::InsufficientData`] if the source runs out before
    /// `n` bytes are available, or [`StreamError::Source`] if it fails. In both
    /// cases the bytes obtained so far remain buffered.
    ///
    /// # Panics
    ///
    /// Panics if room for `n` bytes cannot be allocated (e.g. `usize::MAX`).
    pub fn peek(&mut self, n: usize) -> StreamResult<Vec<u8>, S::Error> {
        self.fill(n)?;
        Ok(self.pending.as_slice()[..n].to_vec())
    }

    /// Copy of up to `n` upcoming bytes; fewer (possibly none) if the source
    /// runs out first.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::Source`] if the source fails. Never returns
    /// [`StreamError::InsufficientData`].
    pub fn peek_up_to(&mut self, n: usize) -> StreamResult<Vec<u8>, S::Error> {
        let available = self.fill_up_to(n)?;
        Ok(self.pending.as_slice()[..available].to_vec())
    }

    /// Whether the upcoming bytes are `pattern`.
    ///
    /// # Errors
    ///
    /// Fails like [`peek`](Self::peek) with `n = pattern.len()`, so a stream
    /// shorter than `pattern` reports [`StreamError::InsufficientData`] rather
    /// than `false`.
    pub fn starts_with(&mut self, pattern: &[u8]) -> StreamResult<bool, S::Error> {
        self.fill(pattern.len())?;
        Ok(self.pending.as_slice().starts_with(pattern))
    }

    /// Whether the next byte is `byte`.
    ///
    /// # Errors
    ///
    /// Fails like [`peek`](Self::peek) with `n = 1`.
    pub fn starts_with_byte(&mut self, byte: u8) -> StreamResult<bool, S::Error> {
        self.starts_with(slice::from_ref(&byte))
    }

    /// Drop the next `n` bytes.
    ///
    /// # Errors
    ///
    /// Fails like [`peek`](Self::peek); nothing is consumed on failure.
    pub fn skip(&mut self, n: usize) -> StreamResult<(), S::Error> {
        self.fill(n)?;
        self.pending.consume(n);
        Ok(())
    }

    /// Drop `pattern` if the stream starts with it, and report whether it did.
    ///
    /// # Errors
    ///
    /// Fails like [`starts_with`](Self::starts_with).
    pub fn skip_bytes(&mut self, pattern: &[u8]) -> StreamResult<bool, S::Error> {
        if self.starts_with(pattern)? {
            self.pending.consume(pattern.len());
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Drop the next byte if it is `byte`, and report whether it was.
    ///
    /// # Errors
    ///
    /// Fails like [`starts_with_byte`](Self::starts_with_byte).
    pub fn skip_byte(&mut self, byte: u8) -> StreamResult<bool, S::Error> {
        self.skip_bytes(slice::from_ref(&byte))
    }

    /// Drop the longest prefix whose bytes all satisfy `predicate`.
    ///
    /// # Errors
    ///
    /// Fails like [`read_while`](Self::read_while).
    pub fn skip_while<F>(&mut self, predicate: F) -> StreamResult<(), S::Error>
    where
        F: FnMut(u8) -> bool,
    {
        let run = self.scan_while(predicate)?;
        self.pending.consume(run);
        Ok(())
    }

    /// Consume and return the next `n` bytes.
    ///
    /// # Errors
    ///
    /// Fails like [`peek`](Self::peek); nothing is consumed on failure.
    pub fn read(&mut self, n: usize) -> StreamResult<Vec<u8>, S::Error> {
        self.fill(n)?;
        Ok(self.pending.take(n))
    }

    /// Consume and return the longest prefix whose bytes all satisfy
    /// `predicate`. The first byte that fails it stays in the stream.
    ///
    /// Reaching the end of the source simply ends the run.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::Source`] if the source fails. Nothing is
    /// consumed then; the bytes scanned so far stay buffered.
    pub fn read_while<F>(&mut self, predicate: F) -> StreamResult<Vec<u8>, S::Error>
    where
        F: FnMut(u8) -> bool,
    {
        let run = self.scan_while(predicate)?;
        Ok(self.pending.take(run))
    }

    /// Consume and return everything left in the stream.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::Source`] if the source fails. Nothing is
    /// consumed then; the bytes read so far stay buffered.
    pub fn read_all(&mut self) -> StreamResult<Vec<u8>, S::Error> {
        loop {
            let buffered = self.pending.len();
            if self.fill_up_to(buffered + self.options.chunk_size)? == buffered {
                return Ok(self.pending.take(buffered));
            }
        }
    }

    /// Copy of the bytes before the first occurrence of `delim`, without
    /// consuming anything.
    ///
    /// Returns `Ok(None)` if the source runs out before `delim` shows up, and
    /// `Ok(Some(vec![]))` if the stream starts with `delim`. An empty `delim`
    /// matches immediately.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::Source`] if the source fails; bytes read while
    /// searching remain buffered.
    pub fn peek_until(&mut self, delim: &[u8]) -> StreamResult<Option<Vec<u8>>, S::Error> {
        Ok(self
            .find(delim)?
            .map(|at| self.pending.as_slice()[..at].to_vec()))
    }

    /// Single-byte form of [`peek_until`](Self::peek_until).
    ///
    /// # Errors
    ///
    /// Fails like [`peek_until`](Self::peek_until).
    pub fn peek_until_byte(&mut self, delim: u8) -> StreamResult<Option<Vec<u8>>, S::Error> {
        self.peek_until(slice::from_ref(&delim))
    }

    /// Consume and return the bytes before the first occurrence of `delim`,
    /// leaving `delim` itself in the stream.
    ///
    /// On `Ok(None)` (no `delim` before the end) nothing is consumed.
    ///
    /// # Errors
    ///
    /// Fails like [`peek_until`](Self::peek_until).
    pub fn read_until(&mut self, delim: &[u8]) -> StreamResult<Option<Vec<u8>>, S::Error> {
        Ok(self.find(delim)?.map(|at| self.pending.take(at)))
    }

    /// Like [`read_until`](Self::read_until), but `delim` is consumed too.
    ///
    /// # Errors
    ///
    /// Fails like [`peek_until`](Self::peek_until).
    pub fn read_until_and_skip(&mut self, delim: &[u8]) -> StreamResult<Option<Vec<u8>>, S::Error> {
        Ok(self.find(delim)?.map(|at| {
            let data = self.pending.take(at);
            self.pending.consume(delim.len());
            data
        }))
    }

    /// Single-byte form of [`read_until`](Self::read_until).
    ///
    /// # Errors
    ///
    /// Fails like [`peek_until`](Self::peek_until).
    pub fn read_until_byte(&mut self, delim: u8) -> StreamResult<Option<Vec<u8>>, S::Error> {
        self.read_until(slice::from_ref(&delim))
    }

    /// Single-byte form of [`read_until_and_skip`](Self::read_until_and_skip).
    ///
    /// # Errors
    ///
    /// Fails like [`peek_until`](Self::peek_until).
    pub fn read_until_byte_and_skip(
        &mut self,
        delim: u8,
    ) -> StreamResult<Option<Vec<u8>>, S::Error> {
        self.read_until_and_skip(slice::from_ref(&delim))
    }

    /// Make at least `n` bytes buffered.
    ///
    /// The deficit is read into storage appended to the buffer; whatever
    /// arrives before a failure is kept.
    fn fill(&mut self, n: usize) -> StreamResult<(), S::Error> {
        let buffered = self.pending.len();
        if buffered >= n {
            return Ok(());
        }
        let deficit = n - buffered;
        let spare = self.pending.spare(deficit);
        let (read, outcome) = source::read_at_least(&mut self.source, spare, deficit);
        self.pending.truncate(buffered + read);
        if outcome.is_err() {
            tracing::trace!(requested = n, buffered, read, "short fill");
        }
        outcome
    }

    /// Buffer up to `n` bytes, treating exhaustion as success. Returns how
    /// many of the requested bytes are available.
    fn fill_up_to(&mut self, n: usize) -> StreamResult<usize, S::Error> {
        match self.fill(n) {
            Ok(()) | Err(StreamError::InsufficientData) => Ok(n.min(self.pending.len())),
            Err(err) => Err(err),
        }
    }

    /// Append the result of a single source read of at most `max` bytes.
    /// Returns the number of bytes read; zero means the source is exhausted.
    pub(crate) fn pull(&mut self, max: usize) -> StreamResult<usize, S::Error> {
        let buffered = self.pending.len();
        let spare = self.pending.spare(max);
        match self.source.read(spare) {
            Ok(read) => {
                let read = read.min(max);
                self.pending.truncate(buffered + read);
                tracing::trace!(buffered, read, "pulled chunk");
                Ok(read)
            }
            Err(err) => {
                self.pending.truncate(buffered);
                tracing::debug!(buffered, "source failed during pull");
                Err(StreamError::Source(err))
            }
        }
    }

    /// Offset of the first occurrence of `delim` in the buffer, pulling
    /// chunks from the source until it shows up or the source runs out.
    fn find(&mut self, delim: &[u8]) -> StreamResult<Option<usize>, S::Error> {
        let mut from = 0;
        loop {
            if let Some(at) = self.pending.find(from, delim) {
                return Ok(Some(at));
            }
            // A match may straddle the old and the new bytes.
            from = self
                .pending
                .len()
                .saturating_sub(delim.len().saturating_sub(1));
            if self.pull(self.options.chunk_size)? == 0 {
                return Ok(None);
            }
        }
    }

    /// Length of the buffered prefix whose bytes all satisfy `predicate`,
    /// growing the buffer one scan block at a time. Consumes nothing.
    fn scan_while<F>(&mut self, mut predicate: F) -> StreamResult<usize, S::Error>
    where
        F: FnMut(u8) -> bool,
    {
        let block = self.options.scan_block_size;
        let mut run = 0;
        loop {
            let available = self.fill_up_to(run + block)?;
            let window = &self.pending.as_slice()[run..available];
            if window.is_empty() {
                return Ok(run);
            }
            match window.iter().position(|&b| !predicate(b)) {
                Some(stop) => return Ok(run + stop),
                None => run += window.len(),
            }
        }
    }
}

impl<S: fmt::Debug> fmt::Debug for Stream<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream")
            .field("source", &self.source)
            .field("pending", &self.pending.as_slice().as_bstr())
            .field("options", &self.options)
            .finish()
    }
}
