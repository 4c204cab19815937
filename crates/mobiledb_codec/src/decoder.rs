//! Line-delimited JSON decoder.

use crate::error::{CodecError, CodecResult};
use serde::de::DeserializeOwned;
use std::marker::PhantomData;

/// Iterator over the values of a line-delimited JSON buffer.
///
/// Yields `(line_number, value)` for every non-blank line. A malformed line
/// yields an error and iteration continues with the next line, so callers
/// that want to report every problem (e.g. a verifier) can keep going.
///
/// Created by [`decode_each`].
#[derive(Debug)]
pub struct DecodeEach<'a, T> {
    remaining: &'a [u8],
    line: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<'a, T: DeserializeOwned> Iterator for DecodeEach<'a, T> {
    type Item = CodecResult<(usize, T)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.remaining.is_empty() {
                return None;
            }

            let (raw, rest) = match self.remaining.iter().position(|&b| b == b'\n') {
                Some(idx) => (&self.remaining[..idx], &self.remaining[idx + 1..]),
                None => (self.remaining, &[][..]),
            };
            self.remaining = rest;
            self.line += 1;

            let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
            if raw.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            let line = self.line;
            return Some(
                serde_json::from_slice(raw)
                    .map(|value| (line, value))
                    .map_err(|e| CodecError::malformed(line, e.to_string())),
            );
        }
    }
}

/// Decodes each physical line of `bytes` independently.
///
/// # Example
///
/// ```
/// use mobiledb_codec::decode_each;
///
/// let results: Vec<_> = decode_each::<u32>(b"1\nnope\n3\n").collect();
/// assert_eq!(results.len(), 3);
/// assert!(results[1].is_err());
/// assert_eq!(results[2].as_ref().unwrap(), &(3, 3));
/// ```
#[must_use]
pub fn decode_each<T: DeserializeOwned>(bytes: &[u8]) -> DecodeEach<'_, T> {
    DecodeEach {
        remaining: bytes,
        line: 0,
        _marker: PhantomData,
    }
}

/// Decodes every line of `bytes`, failing on the first malformed line.
///
/// # Errors
///
/// Returns [`CodecError::Malformed`] with the 1-based line number of the
/// first line that is not a valid `T`.
pub fn decode_lines<T: DeserializeOwned>(bytes: &[u8]) -> CodecResult<Vec<T>> {
    decode_each(bytes)
        .map(|result| result.map(|(_, value)| value))
        .collect()
}
