//! Printer job records and the encoder that builds them.
//!
//! A print job is a series of job records. Each record carries the action to
//! take and the payload that goes with it. Only `PrintLine` uses its payload;
//! `AdvanceLine` is always sent as a single carriage return.

use crate::error::Error;

/// Carriage return, makes the printer feed one line.
pub const ADVANCE_LINE_BYTE: u8 = 0x0D;

/// Action carried by a [`JobRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Standby,
    PrintLine,
    AdvanceLine,
    CutPaper,
    HaltAll,
}

impl Command {
    pub fn code(self) -> u8 {
        match self {
            Self::Standby => 0x00,
            Self::PrintLine => 0x01,
            Self::AdvanceLine => 0x02,
            Self::CutPaper => 0x03,
            Self::HaltAll => 0xFF,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0x00 => Some(Self::Standby),
            0x01 => Some(Self::PrintLine),
            0x02 => Some(Self::AdvanceLine),
            0x03 => Some(Self::CutPaper),
            0xFF => Some(Self::HaltAll),
            _ => None,
        }
    }
}

/// A single instruction sent to the printer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRecord {
    command: Command,
    payload: Vec<u8>,
}

impl JobRecord {
    pub fn new(command: Command, payload: Vec<u8>) -> Self {
        JobRecord { command, payload }
    }

    pub fn command(&self) -> Command {
        self.command
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Bytes written to the device for this record.
    ///
    /// `AdvanceLine` ignores its payload and becomes a carriage return, every
    /// other command is sent as its raw payload.
    pub fn to_bytes(&self) -> &[u8] {
        match self.command {
            Command::AdvanceLine => &[ADVANCE_LINE_BYTE],
            _ => &self.payload,
        }
    }
}

/// Builds job records for an image of a given width.
#[derive(Debug, Clone, Copy)]
pub struct JobEncoder {
    bytes_per_line: usize,
}

impl JobEncoder {
    /// Encoder for rows of an image `width` dots wide.
    pub fn for_width(width: u32) -> Self {
        JobEncoder {
            bytes_per_line: crate::bytes_per_row(width),
        }
    }

    pub fn bytes_per_line(&self) -> usize {
        self.bytes_per_line
    }

    /// Frame one row of the image as a `PrintLine` record.
    ///
    /// The payload is a copy of `row`, the record never borrows image storage.
    pub fn encode_print_line(&self, row: &[u8]) -> Result<JobRecord, Error> {
        if row.len() != self.bytes_per_line {
            return Err(Error::InvalidRowWidth {
                expected: self.bytes_per_line,
                actual: row.len(),
            });
        }
        Ok(JobRecord::new(Command::PrintLine, row.to_vec()))
    }

    pub fn encode_advance_line(&self) -> JobRecord {
        JobRecord::new(Command::AdvanceLine, Vec::new())
    }

    pub fn encode_advance_batch(&self, count: usize) -> Vec<JobRecord> {
        (0..count).map(|_| self.encode_advance_line()).collect()
    }
}
