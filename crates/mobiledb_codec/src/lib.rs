//! # MobileDB Codec
//!
//! Line-delimited JSON framing for MobileDB store files.
//!
//! A store file is **not** a JSON array. It is a sequence of independent
//! JSON values, one per physical line:
//!
//! ```text
//! {"identity":"u1","entity":{"name":"Ann"}, ...}
//! {"identity":"u2","entity":{"name":"Bob"}, ...}
//! ```
//!
//! ## Framing Rules
//!
//! - Each value is written in compact form followed by `\n`
//! - Compact JSON escapes control characters, so a value never spans lines
//! - On decode every line is parsed on its own; `\r\n` is accepted
//! - Blank lines are skipped
//! - Errors carry the 1-based line number
//!
//! ## Usage
//!
//! ```
//! use mobiledb_codec::{decode_lines, encode_lines};
//!
//! let values = vec![vec![1, 2], vec![3]];
//! let bytes = encode_lines(&values).unwrap();
//! assert_eq!(bytes, b"[1,2]\n[3]\n");
//!
//! let decoded: Vec<Vec<i32>> = decode_lines(&bytes).unwrap();
//! assert_eq!(decoded, values);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod decoder;
mod encoder;
mod error;

pub use decoder::{decode_each, decode_lines, DecodeEach};
pub use encoder::{encode_lines, LineEncoder};
pub use error::{CodecError, CodecResult};
