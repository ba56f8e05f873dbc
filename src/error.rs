//! Error types for thermal printer operations.
//!
//! Every failure is terminal for a print run. Errors are propagated up to
//! the caller, which reports them and stops; nothing here is retried.

use std::{collections::TryReserveError, io, path::PathBuf};
use thiserror::Error;

/// Main error type for loading images and printing them.
#[derive(Error, Debug)]
pub enum Error {
    /// The command line did not match `-i <image.png>`.
    #[error("{0}")]
    BadArguments(String),

    /// The image file could not be opened or read.
    #[error("File could not be opened for reading: {path}")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("File not recognized as a PNG file")]
    NotAPng,

    /// The PNG stream is corrupt past its signature.
    #[error("Error while decoding PNG image")]
    Decode(#[from] png::DecodingError),

    /// Only monochrome images can be printed.
    #[error("Only monochrome images (1-bit) are allowed! Provided image is {0} bits deep")]
    UnsupportedBitDepth(u8),

    /// An image is already held and was not released before loading another.
    #[error("Image already loaded, release it before loading another one")]
    AlreadyLoaded,

    #[error("Error allocating memory for image")]
    AllocationFailure(#[from] TryReserveError),

    #[error("Image has {actual} rows but its height is {expected}")]
    InvalidRowCount { expected: usize, actual: usize },

    /// A row buffer does not hold exactly `ceil(width / 8)` bytes.
    #[error("Row is {actual} bytes wide, expected {expected}")]
    InvalidRowWidth { expected: usize, actual: usize },

    #[error("Couldn't open device {path}")]
    DeviceOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Appending a job to the device stream failed.
    #[error("Couldn't write to device")]
    DeviceWrite(#[source] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_depth_message_names_depth() {
        let msg = Error::UnsupportedBitDepth(8).to_string();
        assert!(msg.ends_with("8 bits deep"), "{}", msg);
    }

    #[test]
    fn row_width_message() {
        let err = Error::InvalidRowWidth {
            expected: 2,
            actual: 3,
        };
        assert_eq!(err.to_string(), "Row is 3 bytes wide, expected 2");
    }
}
