use alloc::vec::Vec;
use core::convert::Infallible;

use crate::error::StreamError;

/// A synchronous producer of bytes.
///
/// `read` fills a prefix of `buf` and returns how many bytes it wrote. For a
/// non-empty `buf`, `Ok(0)` means the source is exhausted; any `Err` is a hard
/// failure that the stream hands back to its caller untouched. This is the
/// [`std::io::Read`] contract minus the `Interrupted` retry rule, which
/// belongs to the adapter ([`IoSource`](crate::IoSource)) rather than to every
/// implementation.
pub trait Source {
    /// Failure reported by the source.
    type Error;

    /// Pull up to `buf.len()` bytes into `buf`.
    ///
    /// # Errors
    ///
    /// Returns `Err` when the source fails; exhaustion is `Ok(0)`.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

impl<S: Source + ?Sized> Source for &mut S {
    type Error = S::Error;

    #[inline]
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        (**self).read(buf)
    }
}

impl Source for &[u8] {
    type Error = Infallible;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let n = buf.len().min(self.len());
        let (head, tail) = self.split_at(n);
        buf[..n].copy_from_slice(head);
        *self = tail;
        Ok(n)
    }
}

/// An owned in-memory source.
#[derive(Debug, Clone, Default)]
pub struct BytesSource {
    data: Vec<u8>,
    pos: usize,
}

impl BytesSource {
    /// Serve `data` from the start.
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            pos: 0,
        }
    }

    /// Bytes not yet handed out.
    pub fn remaining(&self) -> &[u8] {
        &self.data[self.pos..]
    }
}

impl From<Vec<u8>> for BytesSource {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl Source for BytesSource {
    type Error = Infallible;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut rest = self.remaining();
        let n = rest.read(buf)?;
        self.pos += n;
        Ok(n)
    }
}

/// Read into `buf` until at least `min` bytes have arrived.
///
/// Returns the number of bytes written together with the outcome, so the
/// caller can keep a short read even when the source ran dry or failed.
pub(crate) fn read_at_least<S: Source + ?Sized>(
    source: &mut S,
    buf: &mut [u8],
    min: usize,
) -> (usize, Result<(), StreamError<S::Error>>) {
    debug_assert!(min <= buf.len());
    let mut filled = 0;
    while filled < min {
        match source.read(&mut buf[filled..]) {
            Ok(0) => return (filled, Err(StreamError::InsufficientData)),
            // A source claiming more than it was given is held to `buf`.
            Ok(n) => filled += n.min(buf.len() - filled),
            Err(err) => {
                tracing::debug!(filled, min, "source failed during fill");
                return (filled, Err(StreamError::Source(err)));
            }
        }
    }
    (filled, Ok(()))
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::Stream;
    use crate::tests::sources::{ChunkedSource, FailingSource, SourceFault};

    #[test]
    fn slice_source_advances() {
        let mut src: &[u8] = &[1, 2, 3];
        let mut buf = [0; 2];
        assert_eq!(src.read(&mut buf), Ok(2));
        assert_eq!(buf, [1, 2]);
        assert_eq!(src.read(&mut buf), Ok(1));
        assert_eq!(buf[0], 3);
        assert_eq!(src.read(&mut buf), Ok(0));
    }

    #[test]
    fn bytes_source_tracks_remaining() {
        let mut src = BytesSource::new([1u8, 2, 3, 4]);
        let mut buf = [0; 3];
        assert_eq!(src.read(&mut buf), Ok(3));
        assert_eq!(src.remaining(), &[4]);
    }

    #[test]
    fn read_at_least_gathers_across_short_reads() {
        let mut src = ChunkedSource::new(&[1, 2, 3, 4, 5], 2);
        let mut buf = [0; 5];
        let (n, outcome) = read_at_least(&mut src, &mut buf, 5);
        assert_eq!(n, 5);
        assert_eq!(outcome, Ok(()));
        assert_eq!(buf, [1, 2, 3, 4, 5]);
    }

    #[test]
    fn read_at_least_reports_short_count_on_exhaustion() {
        let mut src: &[u8] = &[1, 2];
        let mut buf = [0; 4];
        let (n, outcome) = read_at_least(&mut src, &mut buf, 4);
        assert_eq!(n, 2);
        assert_eq!(outcome, Err(StreamError::InsufficientData));
    }

    /// Fills whatever it is given but claims to have written more.
    struct Overstating;

    impl Source for Overstating {
        type Error = Infallible;

        fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
            buf.fill(9);
            Ok(buf.len() * 2 + 1)
        }
    }

    #[test]
    fn read_at_least_clamps_overstated_counts() {
        let mut buf = [0; 3];
        let (n, outcome) = read_at_least(&mut Overstating, &mut buf, 3);
        assert_eq!(n, 3);
        assert_eq!(outcome, Ok(()));
        assert_eq!(buf, [9, 9, 9]);
    }

    #[test]
    fn stream_over_overstating_source_stays_in_bounds() {
        let mut s = Stream::new(Overstating);
        assert_eq!(s.peek(4), Ok(vec![9; 4]));
        assert_eq!(s.buffered_len(), 4);

        let mut s = Stream::new(Overstating);
        assert_eq!(s.peek_until_byte(9), Ok(Some(vec![])));
        assert_eq!(s.buffered_len(), s.options().chunk_size);
    }

    #[test]
    fn read_at_least_reports_short_count_on_failure() {
        let mut src = FailingSource::new(&[1, 2, 3], 1);
        let mut buf = [0; 4];
        let (n, outcome) = read_at_least(&mut src, &mut buf, 4);
        assert_eq!(n, 3);
        assert_eq!(outcome, Err(StreamError::Source(SourceFault)));
    }
}
