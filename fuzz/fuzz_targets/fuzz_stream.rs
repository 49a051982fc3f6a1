#![no_main]
use std::convert::Infallible;

use arbitrary::Arbitrary;
use bytestream::{Source, Stream, StreamError, StreamOptions};
use libfuzzer_sys::fuzz_target;

/// Serves `data` in pieces whose sizes cycle through `splits`.
struct SplitSource<'a> {
    data: &'a [u8],
    splits: &'a [u8],
    reads: usize,
}

impl Source for SplitSource<'_> {
    type Error = Infallible;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Infallible> {
        let split = self
            .splits
            .get(self.reads % self.splits.len().max(1))
            .map_or(usize::MAX, |&s| usize::from(s) + 1);
        self.reads += 1;
        let n = buf.len().min(split).min(self.data.len());
        let (head, tail) = self.data.split_at(n);
        buf[..n].copy_from_slice(head);
        self.data = tail;
        Ok(n)
    }
}

#[derive(Debug, Arbitrary)]
enum Op {
    Peek(u8),
    PeekUpTo(u8),
    StartsWith(Vec<u8>),
    Skip(u8),
    SkipBytes(Vec<u8>),
    SkipWhileBelow(u8),
    Read(u8),
    ReadWhileBelow(u8),
    PeekUntil(Vec<u8>),
    ReadUntil(Vec<u8>),
    ReadUntilAndSkip(Vec<u8>),
    IsEmpty,
}

#[derive(Debug, Arbitrary)]
struct Input {
    data: Vec<u8>,
    splits: Vec<u8>,
    chunk_size: u8,
    scan_block_size: u8,
    ops: Vec<Op>,
}

/// Apply `op` to `stream`, appending consumed bytes to `out`, and return the
/// bytes the operation reported. Every operation is mirrored on `model`, the
/// unconsumed suffix of the input.
fn apply<S: Source<Error = Infallible>>(
    stream: &mut Stream<S>,
    model: &mut &[u8],
    op: &Op,
    out: &mut Vec<u8>,
) {
    let insufficient = |n: usize, model: &[u8]| n > model.len();
    match op {
        Op::Peek(n) => match stream.peek(usize::from(*n)) {
            Ok(bytes) => assert_eq!(bytes, model[..usize::from(*n)]),
            Err(StreamError::InsufficientData) => assert!(insufficient(usize::from(*n), model)),
            Err(StreamError::Source(never)) => match never {},
        },
        Op::PeekUpTo(n) => {
            let bytes = stream.peek_up_to(usize::from(*n)).unwrap();
            assert_eq!(bytes, model[..usize::from(*n).min(model.len())]);
        }
        Op::StartsWith(pattern) => match stream.starts_with(pattern) {
            Ok(yes) => assert_eq!(yes, model.starts_with(pattern)),
            Err(_) => assert!(insufficient(pattern.len(), model)),
        },
        Op::Skip(n) | Op::Read(n) => {
            let n = usize::from(*n);
            let result = if matches!(op, Op::Skip(_)) {
                stream.skip(n).map(|()| model[..n].to_vec())
            } else {
                stream.read(n)
            };
            match result {
                Ok(bytes) => {
                    assert_eq!(bytes, model[..n]);
                    out.extend_from_slice(&bytes);
                    advance(model, n);
                }
                Err(_) => assert!(insufficient(n, model)),
            }
        }
        Op::SkipBytes(pattern) => match stream.skip_bytes(pattern) {
            Ok(true) => {
                assert!(model.starts_with(pattern));
                out.extend_from_slice(pattern);
                advance(model, pattern.len());
            }
            Ok(false) => assert!(!model.starts_with(pattern)),
            Err(_) => assert!(insufficient(pattern.len(), model)),
        },
        Op::SkipWhileBelow(limit) | Op::ReadWhileBelow(limit) => {
            let run = model.iter().take_while(|&&b| b < *limit).count();
            if matches!(op, Op::SkipWhileBelow(_)) {
                stream.skip_while(|b| b < *limit).unwrap();
            } else {
                assert_eq!(stream.read_while(|b| b < *limit).unwrap(), model[..run]);
            }
            out.extend_from_slice(&model[..run]);
            advance(model, run);
        }
        Op::PeekUntil(delim) => {
            let expected = find(model, delim).map(|at| model[..at].to_vec());
            assert_eq!(stream.peek_until(delim).unwrap(), expected);
        }
        Op::ReadUntil(delim) | Op::ReadUntilAndSkip(delim) => {
            let skip = matches!(op, Op::ReadUntilAndSkip(_));
            let found = if skip {
                stream.read_until_and_skip(delim).unwrap()
            } else {
                stream.read_until(delim).unwrap()
            };
            assert_eq!(found.as_deref(), find(model, delim).map(|at| &model[..at]));
            if let Some(prefix) = found {
                let consumed = prefix.len() + if skip { delim.len() } else { 0 };
                out.extend_from_slice(&model[..consumed]);
                advance(model, consumed);
            }
        }
        Op::IsEmpty => assert_eq!(stream.is_empty().unwrap(), model.is_empty()),
    }
}

fn advance(model: &mut &[u8], n: usize) {
    let rest = *model;
    *model = &rest[n..];
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

fuzz_target!(|input: Input| {
    let source = SplitSource {
        data: &input.data,
        splits: &input.splits,
        reads: 0,
    };
    let mut stream = Stream::with_options(
        source,
        StreamOptions {
            chunk_size: usize::from(input.chunk_size),
            scan_block_size: usize::from(input.scan_block_size),
            ..Default::default()
        },
    );
    let mut model = input.data.as_slice();
    let mut out = Vec::new();
    for op in &input.ops {
        apply(&mut stream, &mut model, op, &mut out);
    }
    out.extend(stream.read_all().unwrap());
    assert_eq!(out, input.data);
});
