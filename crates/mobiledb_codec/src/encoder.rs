//! Line-delimited JSON encoder.

use crate::error::{CodecError, CodecResult};
use serde::Serialize;
use std::io::Write;

const LINE_SEPARATOR: u8 = b'\n';

/// Streams values to a writer, one compact JSON value per line.
///
/// # Example
///
/// ```
/// use mobiledb_codec::LineEncoder;
///
/// let mut encoder = LineEncoder::new(Vec::new());
/// encoder.encode(&"first").unwrap();
/// encoder.encode(&"second").unwrap();
/// assert_eq!(encoder.lines_written(), 2);
/// assert_eq!(encoder.into_inner(), b"\"first\"\n\"second\"\n");
/// ```
#[derive(Debug)]
pub struct LineEncoder<W: Write> {
    writer: W,
    lines: usize,
}

impl<W: Write> LineEncoder<W> {
    /// Creates an encoder writing to `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer, lines: 0 }
    }

    /// Writes one value followed by a line separator.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Encode`] if the value cannot be serialized and
    /// [`CodecError::Write`] if the writer fails.
    pub fn encode<T: Serialize + ?Sized>(&mut self, value: &T) -> CodecResult<()> {
        // Serialize fully before touching the writer so a failing value
        // never leaves half a line behind.
        let bytes = serde_json::to_vec(value).map_err(|e| CodecError::encode(e.to_string()))?;
        debug_assert!(!bytes.contains(&LINE_SEPARATOR));

        self.writer
            .write_all(&bytes)
            .and_then(|()| self.writer.write_all(&[LINE_SEPARATOR]))
            .map_err(|e| CodecError::Write {
                message: e.to_string(),
            })?;
        self.lines += 1;
        Ok(())
    }

    /// Returns the number of lines written so far.
    #[must_use]
    pub fn lines_written(&self) -> usize {
        self.lines
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Encodes every value as one line of compact JSON.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] if any value cannot be serialized.
pub fn encode_lines<'a, T, I>(values: I) -> CodecResult<Vec<u8>>
where
    T: Serialize + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut encoder = LineEncoder::new(Vec::new());
    for value in values {
        encoder.encode(value)?;
    }
    Ok(encoder.into_inner())
}
