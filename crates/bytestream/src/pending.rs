use alloc::vec::Vec;

use bstr::ByteSlice;

/// Consumed prefix size past which storage is compacted, provided the prefix
/// also makes up at least half of the storage.
const COMPACT_THRESHOLD: usize = 4096;

/// Bytes pulled from a source and not yet consumed.
///
/// Storage is a `Vec<u8>` whose live region starts at `start`. Consuming only
/// bumps `start`; the dead prefix is dropped once it dominates the storage or
/// when growing would otherwise reallocate it along with the live bytes.
#[derive(Debug, Default)]
pub(crate) struct Pending {
    data: Vec<u8>,
    start: usize,
}

impl Pending {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            start: 0,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.data.len() - self.start
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub(crate) fn as_slice(&self) -> &[u8] {
        &self.data[self.start..]
    }

    /// Drop `n` bytes from the front.
    pub(crate) fn consume(&mut self, n: usize) {
        debug_assert!(n <= self.len(), "consumed past the buffered bytes");
        self.start += n.min(self.len());
        if self.start == self.data.len() {
            self.data.clear();
            self.start = 0;
        } else if self.start >= COMPACT_THRESHOLD && self.start * 2 >= self.data.len() {
            self.compact();
        }
    }

    /// Copy out and drop the first `n` bytes.
    pub(crate) fn take(&mut self, n: usize) -> Vec<u8> {
        let taken = self.as_slice()[..n].to_vec();
        self.consume(n);
        taken
    }

    /// Append `additional` zeroed bytes and hand them out for a source to
    /// fill. The caller must `truncate` to the bytes actually obtained.
    pub(crate) fn spare(&mut self, additional: usize) -> &mut [u8] {
        if self.start > 0 && self.data.capacity() - self.data.len() < additional {
            self.compact();
        }
        let end = self.data.len();
        self.data.resize(end + additional, 0);
        &mut self.data[end..]
    }

    /// Keep only the first `len` live bytes.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.data.truncate(self.start + len);
    }

    /// Position of the first occurrence of `needle` at or after `from`.
    pub(crate) fn find(&self, from: usize, needle: &[u8]) -> Option<usize> {
        let live = self.as_slice();
        let from = from.min(live.len());
        live[from..].find(needle).map(|at| from + at)
    }

    pub(crate) fn into_vec(mut self) -> Vec<u8> {
        self.compact();
        self.data
    }

    fn compact(&mut self) {
        self.data.drain(..self.start);
        self.start = 0;
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    fn filled(bytes: &[u8]) -> Pending {
        let mut pending = Pending::default();
        pending.spare(bytes.len()).copy_from_slice(bytes);
        pending
    }

    #[test]
    fn consume_keeps_order_of_the_rest() {
        let mut pending = filled(&[1, 2, 3, 4]);
        pending.consume(1);
        assert_eq!(pending.as_slice(), &[2, 3, 4]);
        assert_eq!(pending.take(2), vec![2, 3]);
        assert_eq!(pending.as_slice(), &[4]);
    }

    #[test]
    fn consuming_everything_resets_storage() {
        let mut pending = filled(&[1, 2, 3]);
        pending.consume(3);
        assert!(pending.is_empty());
        assert_eq!(pending.start, 0);
        assert!(pending.data.is_empty());
    }

    #[test]
    fn large_dead_prefix_is_compacted() {
        let mut pending = filled(&vec![7; COMPACT_THRESHOLD * 2]);
        pending.consume(COMPACT_THRESHOLD);
        assert_eq!(pending.start, 0);
        assert_eq!(pending.len(), COMPACT_THRESHOLD);
        assert!(pending.as_slice().iter().all(|&b| b == 7));
    }

    #[test]
    fn truncate_discards_unfilled_spare() {
        let mut pending = filled(&[1, 2]);
        pending.consume(1);
        let spare = pending.spare(4);
        spare[0] = 3;
        pending.truncate(2);
        assert_eq!(pending.as_slice(), &[2, 3]);
    }

    #[test]
    fn find_respects_offset_and_live_region() {
        let mut pending = filled(b"xabcab");
        pending.consume(1);
        assert_eq!(pending.find(0, b"ab"), Some(0));
        assert_eq!(pending.find(1, b"ab"), Some(3));
        assert_eq!(pending.find(0, b"x"), None);
        assert_eq!(pending.find(9, b""), Some(5));
    }

    #[test]
    fn into_vec_drops_consumed_prefix() {
        let mut pending = filled(&[1, 2, 3]);
        pending.consume(2);
        assert_eq!(pending.into_vec(), vec![3]);
    }
}
