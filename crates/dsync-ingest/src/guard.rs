//! Checks that run before any parsing work.

use crate::error::{ParseError, Result};

/// Rejects inputs larger than `max_size` bytes.
pub fn check_size(size: u64, max_size: u64) -> Result<()> {
    if size > max_size {
        return Err(ParseError::FileTooLarge { size, max_size });
    }
    Ok(())
}

/// Rejects UTF-16 input, which the CSV reader does not decode.
///
/// A UTF-8 BOM is fine; the CSV parser strips it.
pub fn validate_encoding(bytes: &[u8]) -> Result<()> {
    match bytes {
        [0xFF, 0xFE, ..] => Err(ParseError::UnsupportedEncoding {
            encoding: "UTF-16 LE",
        }),
        [0xFE, 0xFF, ..] => Err(ParseError::UnsupportedEncoding {
            encoding: "UTF-16 BE",
        }),
        _ => Ok(()),
    }
}
