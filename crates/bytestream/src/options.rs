/// Default size of the reads issued while searching for a delimiter, and of
/// the blocks [`Stream::read_all`](crate::Stream::read_all) drains at a time.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Default number of bytes [`Stream::read_while`](crate::Stream::read_while)
/// asks for per step.
pub const DEFAULT_SCAN_BLOCK_SIZE: usize = 32;

/// Configuration options for a [`Stream`](crate::Stream).
///
/// These only tune how much the stream asks of its source at a time; they
/// never change what an operation returns.
///
/// # Examples
///
/// ```rust
/// use bytestream::{Stream, StreamOptions};
///
/// let options = StreamOptions {
///     chunk_size: 64 * 1024,
///     ..Default::default()
/// };
/// let stream = Stream::with_options(&b"abc"[..], options);
/// assert_eq!(stream.options().scan_block_size, 32);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamOptions {
    /// Size of a single source read while growing the buffer in search of a
    /// delimiter, and block size used by `read_all`.
    ///
    /// # Default
    ///
    /// [`DEFAULT_CHUNK_SIZE`]
    pub chunk_size: usize,

    /// Number of bytes requested per step by `read_while` and `skip_while`.
    ///
    /// Small blocks bound how far past the end of the matching run the stream
    /// reads from its source.
    ///
    /// # Default
    ///
    /// [`DEFAULT_SCAN_BLOCK_SIZE`]
    pub scan_block_size: usize,

    /// Capacity reserved for buffered bytes when the stream is created.
    ///
    /// # Default
    ///
    /// `0`
    pub initial_capacity: usize,
}

impl StreamOptions {
    /// Clamp block sizes to at least one byte so growth loops always make
    /// progress.
    pub(crate) fn normalized(self) -> Self {
        Self {
            chunk_size: self.chunk_size.max(1),
            scan_block_size: self.scan_block_size.max(1),
            ..self
        }
    }
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            scan_block_size: DEFAULT_SCAN_BLOCK_SIZE,
            initial_capacity: 0,
        }
    }
}
