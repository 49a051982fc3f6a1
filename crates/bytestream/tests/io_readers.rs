#![allow(missing_docs)]
use std::io::{self, BufRead, Cursor, ErrorKind, Read};

use bytestream::{IoSource, Stream, StreamError};

/// Hands out at most one byte per read.
struct Trickle<R>(R);

impl<R: Read> Read for Trickle<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let len = buf.len().min(1);
        self.0.read(&mut buf[..len])
    }
}

/// Parse one netstring (`<len>:<payload>,`).
fn netstring<S>(stream: &mut Stream<S>) -> io::Result<Vec<u8>>
where
    S: bytestream::Source<Error = io::Error>,
{
    let digits = stream.read_while(|b| b.is_ascii_digit())?;
    let len: usize = std::str::from_utf8(&digits)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| io::Error::new(ErrorKind::InvalidData, "bad length"))?;
    if !stream.skip_byte(b':')? {
        return Err(io::Error::new(ErrorKind::InvalidData, "missing ':'"));
    }
    let payload = stream.read(len)?;
    if !stream.skip_byte(b',')? {
        return Err(io::Error::new(ErrorKind::InvalidData, "missing ','"));
    }
    Ok(payload)
}

#[test]
fn netstrings_over_a_trickling_reader() {
    let input = Cursor::new(b"5:hello,0:,11:hello world,".to_vec());
    let mut stream = Stream::from_reader(Trickle(input));

    let mut payloads = Vec::new();
    while !stream.is_empty().unwrap() {
        payloads.push(netstring(&mut stream).unwrap());
    }
    assert_eq!(payloads, [&b"hello"[..], b"", b"hello world"]);
}

#[test]
fn truncated_netstring_reports_unexpected_eof() {
    let mut stream = Stream::from_reader(Cursor::new(b"10:short".to_vec()));
    let err = netstring(&mut stream).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnexpectedEof);
    // The short payload is still there for diagnostics.
    assert_eq!(stream.buffer(), b"short");
}

#[test]
fn insufficient_data_is_distinct_from_source_errors() {
    let mut stream = Stream::from_reader(Cursor::new(b"ab".to_vec()));
    let err = stream.read(3).unwrap_err();
    assert!(err.is_insufficient_data());
    assert!(matches!(err, StreamError::InsufficientData));
    assert_eq!(stream.read(2).unwrap(), b"ab");
}

#[test]
fn lines_across_chained_readers() {
    let reader = Cursor::new(b"alpha\nbe".to_vec()).chain(Cursor::new(b"ta\ngamma".to_vec()));
    let mut stream = Stream::from_reader(reader);

    let mut lines = Vec::new();
    while let Some(line) = stream.read_until_byte_and_skip(b'\n').unwrap() {
        lines.push(line);
    }
    assert_eq!(lines, [&b"alpha"[..], b"beta"]);
    assert_eq!(stream.read_all().unwrap(), b"gamma");
}

#[test]
fn hand_off_to_buf_read_after_sniffing() {
    let reader = Trickle(Cursor::new(b"\xEF\xBB\xBFfirst\nsecond\n".to_vec()));
    let mut stream = Stream::from_reader(reader);
    stream.skip_bytes(b"\xEF\xBB\xBF").unwrap();

    let mut first = String::new();
    stream.read_line(&mut first).unwrap();
    assert_eq!(first, "first\n");

    let mut rest = String::new();
    stream.read_to_string(&mut rest).unwrap();
    assert_eq!(rest, "second\n");
}

#[test]
fn into_parts_gives_back_reader_and_leftovers() {
    let mut stream = Stream::from_reader(Cursor::new(b"header|payload".to_vec()));
    let header = stream.read_until_byte_and_skip(b'|').unwrap().unwrap();
    assert_eq!(header, b"header");

    let (source, leftover): (IoSource<Cursor<Vec<u8>>>, Vec<u8>) = stream.into_parts();
    let mut rest = leftover;
    source.into_inner().read_to_end(&mut rest).unwrap();
    assert_eq!(rest, b"payload");
}
