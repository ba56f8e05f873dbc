//! Thermal Line Printer Driver
//!
//! This crate prints 1-bit PNG images on a 384 dot thermal line printer
//! exposed as a character device.
//!
//! # Example
//!
//! ```rust,no_run
//! use thermal_print::{Config, ImageStore, Printer};
//!
//! let mut store = ImageStore::new();
//! let bitmap = store.load("label.png").unwrap();
//! let mut printer = Printer::new(Config::default()).unwrap();
//! printer.print(bitmap).unwrap();
//! store.release();
//! ```

mod bitmap;
mod error;
mod job;
mod printer;

pub use crate::{
    bitmap::{Bitmap, ImageStore},
    error::Error,
    job::{Command, JobEncoder, JobRecord, ADVANCE_LINE_BYTE},
    printer::{
        sequence, Config, JobSink, Printer, DEFAULT_DEVICE, DEVICE_ENV, TRAILING_FEED_LINES,
    },
};

/// Type alias for 1-bit bitmap data.
///
/// Each inner `Vec<u8>` represents a single row of pixels, with 8 pixels
/// packed into each byte, most significant bit first. The outer Vec holds
/// the rows from top to bottom.
pub type Matrix = Vec<Vec<u8>>;

/// Number of dots on one line of the print head.
pub const PRINTER_DOTS_PER_LINE: u32 = 384;

/// Bytes needed for a full printer line (384 / 8 = 48).
pub const PRINTER_BYTES_PER_LINE: usize = (PRINTER_DOTS_PER_LINE / 8) as usize;

/// Bytes in one packed row of an image `width` dots wide.
pub fn bytes_per_row(width: u32) -> usize {
    (width as usize + 7) / 8
}
