use std::io::{self, BufRead, ErrorKind, Read};

use crate::{error::StreamError, source::Source, stream::Stream};

/// Adapts a [`std::io::Read`] into a [`Source`].
///
/// Reads interrupted by a signal are retried. A reader reporting
/// [`ErrorKind::UnexpectedEof`] is treated as exhausted, the same way as one
/// returning `Ok(0)`.
#[derive(Debug, Default)]
pub struct IoSource<R> {
    inner: R,
}

impl<R> IoSource<R> {
    /// Wrap `inner`.
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// The wrapped reader.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// The wrapped reader.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Unwrap the reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Source for IoSource<R> {
    type Error = io::Error;

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            match self.inner.read(buf) {
                Err(err) if err.kind() == ErrorKind::Interrupted => {}
                Err(err) if err.kind() == ErrorKind::UnexpectedEof => return Ok(0),
                other => return other,
            }
        }
    }
}

impl<R: Read> Stream<IoSource<R>> {
    /// Stream over a [`std::io::Read`].
    ///
    /// ```rust
    /// use std::io::Cursor;
    ///
    /// use bytestream::Stream;
    ///
    /// let mut stream = Stream::from_reader(Cursor::new("key=value\n"));
    /// let key = stream.read_until_byte_and_skip(b'=').unwrap();
    /// assert_eq!(key.as_deref(), Some(&b"key"[..]));
    /// ```
    pub fn from_reader(reader: R) -> Self {
        Self::new(IoSource::new(reader))
    }
}

impl From<StreamError<io::Error>> for io::Error {
    fn from(err: StreamError<io::Error>) -> Self {
        match err {
            StreamError::InsufficientData => {
                io::Error::new(ErrorKind::UnexpectedEof, "insufficient data")
            }
            StreamError::Source(err) => err,
        }
    }
}

/// Buffered bytes are served before the source is read again.
impl<S: Source<Error = io::Error>> Read for Stream<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let available = self.fill_buf()?;
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        BufRead::consume(self, n);
        Ok(n)
    }
}

impl<S: Source<Error = io::Error>> BufRead for Stream<S> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if self.buffered_len() == 0 {
            let chunk = self.options().chunk_size;
            self.pull(chunk)?;
        }
        Ok(self.buffer())
    }

    fn consume(&mut self, amt: usize) {
        let amt = amt.min(self.buffered_len());
        Stream::consume(self, amt);
    }
}
