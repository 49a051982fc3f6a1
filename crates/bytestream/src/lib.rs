//! A byte-level lookahead buffer for hand-written parsers.
//!
//! [`Stream`] sits between a sequential byte [`Source`] and a parser. It pulls
//! bytes on demand, keeps whatever has been pulled but not yet consumed, and
//! lets the caller look ahead, match prefixes, scan with predicates and split
//! on delimiters without ever losing data the source already delivered.
//!
//! ```rust
//! use bytestream::Stream;
//!
//! let mut stream = Stream::from_bytes(b"GET /index.html HTTP/1.1\r\nHost: a\r\n".to_vec());
//!
//! assert!(stream.starts_with(b"GET ").unwrap());
//! let method = stream.read_until_byte_and_skip(b' ').unwrap();
//! assert_eq!(method.as_deref(), Some(&b"GET"[..]));
//!
//! let target = stream.read_while(|b| b != b' ').unwrap();
//! assert_eq!(target, b"/index.html");
//! assert!(stream.skip_byte(b' ').unwrap());
//!
//! let version = stream.read_until_and_skip(b"\r\n").unwrap();
//! assert_eq!(version.as_deref(), Some(&b"HTTP/1.1"[..]));
//! ```
//!
//! Exact-size requests ([`Stream::peek`], [`Stream::read`], [`Stream::skip`])
//! report [`StreamError::InsufficientData`] when the source runs dry, while
//! keeping the bytes that did arrive buffered. Delimiter searches report a
//! missing delimiter as `Ok(None)`, which is distinct from a delimiter found at
//! the current position (`Ok(Some(vec![]))`).
//!
//! # Features
//!
//! - `std` (default): [`IoSource`] adapts any [`std::io::Read`], and streams
//!   over such sources implement [`std::io::Read`] and [`std::io::BufRead`].
//!   Without it the crate is `no_std` and only needs `alloc`.

#![cfg_attr(not(feature = "std"), no_std)]
extern crate alloc;

#[cfg(all(test, not(feature = "std")))]
extern crate std;

mod error;
#[cfg(feature = "std")]
mod io;
mod options;
mod pending;
mod source;
mod stream;


pub use error::{StreamError, StreamResult};
#[cfg(feature = "std")]
pub use io::IoSource;
pub use options::{DEFAULT_CHUNK_SIZE, DEFAULT_SCAN_BLOCK_SIZE, StreamOptions};
pub use source::{BytesSource, Source};
pub use stream::Stream;
