use log::{debug, info, trace, warn};
use std::{
    env,
    fs::{File, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use crate::{
    bitmap::Bitmap,
    error::Error,
    job::{JobEncoder, JobRecord},
};

/// Device node of the thermal printer.
pub const DEFAULT_DEVICE: &str = "/dev/ftp628";

/// Environment variable that overrides the device path in [`Config::from_env`].
pub const DEVICE_ENV: &str = "THERMAL_PRINT_DEVICE";

/// Lines fed after the image so the print clears the tear-off edge.
pub const TRAILING_FEED_LINES: usize = 100;

/// Consumer of job records, in the order they are produced.
pub trait JobSink {
    /// Hand over one record. Returns once the record was accepted.
    fn send(&mut self, job: JobRecord) -> Result<(), Error>;
}

/// Collects records in memory.
impl JobSink for Vec<JobRecord> {
    fn send(&mut self, job: JobRecord) -> Result<(), Error> {
        self.push(job);
        Ok(())
    }
}

/// Drive a whole print job for `bitmap` into `sink`.
///
/// Every row is printed twice with a line feed after each pass, which doubles
/// the vertical dot density. After the last row the paper is advanced by
/// [`TRAILING_FEED_LINES`]. Returns the number of records sent.
pub fn sequence<S: JobSink + ?Sized>(bitmap: &Bitmap, sink: &mut S) -> Result<usize, Error> {
    if !bitmap.fits_print_head() {
        warn!(
            "Image is {} dots wide, the print head only has {}",
            bitmap.width(),
            crate::PRINTER_DOTS_PER_LINE
        );
    }

    let encoder = JobEncoder::for_width(bitmap.width());
    let mut sent = 0;

    for (line, row) in bitmap.rows().iter().enumerate() {
        trace!("line {}", line);
        for _ in 0..2 {
            sink.send(encoder.encode_print_line(row)?)?;
            sink.send(encoder.encode_advance_line())?;
            sent += 2;
        }
    }

    info!("Advance paper");
    for job in encoder.encode_advance_batch(TRAILING_FEED_LINES) {
        sink.send(job)?;
        sent += 1;
    }

    debug!("sent {} jobs", sent);
    Ok(sent)
}

/// Printer settings.
#[derive(Debug, Clone)]
pub struct Config {
    device: PathBuf,
}

impl Config {
    /// Configuration for the printer behind `device`.
    ///
    /// # Example
    ///
    /// ```
    /// use thermal_print::Config;
    ///
    /// let config = Config::new("/dev/usb/lp0");
    /// assert_eq!(config.device().to_str(), Some("/dev/usb/lp0"));
    /// ```
    pub fn new<P: Into<PathBuf>>(device: P) -> Config {
        Config {
            device: device.into(),
        }
    }

    /// Default configuration, with the device path taken from
    /// `THERMAL_PRINT_DEVICE` when it is set.
    pub fn from_env() -> Config {
        match env::var_os(DEVICE_ENV) {
            Some(device) if !device.is_empty() => Config::new(device),
            _ => Config::default(),
        }
    }

    pub fn device(&self) -> &Path {
        &self.device
    }

    pub fn set_device<P: Into<PathBuf>>(self, device: P) -> Self {
        Config {
            device: device.into(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new(DEFAULT_DEVICE)
    }
}

/// A thermal line printer reached through a byte stream.
pub struct Printer<W: Write> {
    output: W,
}

impl Printer<File> {
    /// Open the printer device for writing.
    pub fn new(config: Config) -> Result<Self, Error> {
        debug!("{:?}", config);
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(config.device())
            .map_err(|source| Error::DeviceOpen {
                path: config.device().to_path_buf(),
                source,
            })?;
        Ok(Printer::from_writer(file))
    }
}

impl<W: Write> Printer<W> {
    /// Printer writing to any byte stream.
    pub fn from_writer(output: W) -> Self {
        Printer { output }
    }

    /// Print the image, returning the number of jobs sent.
    pub fn print(&mut self, bitmap: &Bitmap) -> Result<usize, Error> {
        info!(
            "start printing {}x{} image",
            bitmap.width(),
            bitmap.height()
        );
        sequence(bitmap, self)
    }

    pub fn into_inner(self) -> W {
        self.output
    }

    fn write(&mut self, buf: &[u8]) -> Result<(), Error> {
        self.output.write_all(buf).map_err(Error::DeviceWrite)?;
        self.output.flush().map_err(Error::DeviceWrite)
    }
}

impl<W: Write> JobSink for Printer<W> {
    fn send(&mut self, job: JobRecord) -> Result<(), Error> {
        trace!("{:?}", job.command());
        self.write(job.to_bytes())
    }
}
