use log::{debug, info};
use std::{
    fs::File,
    io::{BufReader, Cursor, Read},
    path::Path,
};

use crate::{bytes_per_row, error::Error, Matrix, PRINTER_DOTS_PER_LINE};

/// The 8 byte signature every PNG file starts with.
const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// A decoded 1-bit image.
///
/// Each row holds `ceil(width / 8)` bytes, 8 pixels per byte with the
/// leftmost pixel in the most significant bit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    rows: Matrix,
}

impl Bitmap {
    /// Build a bitmap from packed rows, checking they match the dimensions.
    pub fn new(width: u32, height: u32, rows: Matrix) -> Result<Self, Error> {
        if rows.len() != height as usize {
            return Err(Error::InvalidRowCount {
                expected: height as usize,
                actual: rows.len(),
            });
        }
        let expected = bytes_per_row(width);
        if let Some(row) = rows.iter().find(|row| row.len() != expected) {
            return Err(Error::InvalidRowWidth {
                expected,
                actual: row.len(),
            });
        }
        Ok(Bitmap {
            width,
            height,
            rows,
        })
    }

    /// Decode a PNG stream, accepting only images with a bit depth of 1.
    pub fn from_png<R: Read>(mut reader: R) -> Result<Self, Error> {
        let mut signature = [0u8; 8];
        if reader.read_exact(&mut signature).is_err() || signature != PNG_SIGNATURE {
            return Err(Error::NotAPng);
        }

        let mut decoder = png::Decoder::new(Cursor::new(signature).chain(reader));
        // keep the samples packed as stored
        decoder.set_transformations(png::Transformations::IDENTITY);
        let mut reader = decoder.read_info()?;

        let (width, height, bit_depth) = {
            let info = reader.info();
            (info.width, info.height, info.bit_depth as u8)
        };
        info!("Image width = {}", width);
        info!("Image height = {}", height);

        if bit_depth != 1 {
            return Err(Error::UnsupportedBitDepth(bit_depth));
        }

        let mut buf = Vec::new();
        buf.try_reserve_exact(reader.output_buffer_size())?;
        buf.resize(reader.output_buffer_size(), 0);
        let frame = reader.next_frame(&mut buf)?;
        debug!("{:?}", frame);

        let stride = frame.line_size;
        let row_bytes = bytes_per_row(width);
        let mut rows = Matrix::new();
        rows.try_reserve_exact(height as usize)?;
        for line in buf.chunks(stride).take(height as usize) {
            let mut row = Vec::new();
            row.try_reserve_exact(row_bytes)?;
            row.extend_from_slice(&line[..row_bytes]);
            rows.push(row);
        }

        Self::new(width, height, rows)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes in each row buffer.
    pub fn bytes_per_row(&self) -> usize {
        bytes_per_row(self.width)
    }

    pub fn rows(&self) -> &Matrix {
        &self.rows
    }

    /// Whether the image fits on one physical printer line.
    ///
    /// Nothing rejects images that don't, wider rows are sent as they are.
    pub fn fits_print_head(&self) -> bool {
        self.width <= PRINTER_DOTS_PER_LINE
    }
}

/// Holds at most one loaded image.
///
/// A new image can only be loaded once the previous one was released.
#[derive(Debug, Default)]
pub struct ImageStore {
    bitmap: Option<Bitmap>,
}

impl ImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a PNG file into the store.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<&Bitmap, Error> {
        let path = path.as_ref();
        if self.bitmap.is_some() {
            return Err(Error::AlreadyLoaded);
        }

        let file = File::open(path).map_err(|source| Error::FileOpen {
            path: path.to_path_buf(),
            source,
        })?;
        let bitmap = Bitmap::from_png(BufReader::new(file))?;
        info!("Image loaded successfully");

        self.insert(bitmap)
    }

    /// Store an already decoded bitmap.
    pub fn insert(&mut self, bitmap: Bitmap) -> Result<&Bitmap, Error> {
        if self.bitmap.is_some() {
            return Err(Error::AlreadyLoaded);
        }
        Ok(self.bitmap.get_or_insert(bitmap))
    }

    pub fn bitmap(&self) -> Option<&Bitmap> {
        self.bitmap.as_ref()
    }

    /// Number of rows currently held, 0 when nothing is loaded.
    pub fn row_count(&self) -> usize {
        self.bitmap.as_ref().map_or(0, |bitmap| bitmap.rows.len())
    }

    /// Drop the loaded image. Does nothing if the store is already empty.
    pub fn release(&mut self) {
        if let Some(bitmap) = self.bitmap.take() {
            debug!("released {}x{} image", bitmap.width, bitmap.height);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_png(width: u32, height: u32, depth: png::BitDepth, data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, width, height);
            encoder.set_color(png::ColorType::Grayscale);
            encoder.set_depth(depth);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(data).unwrap();
        }
        out
    }

    #[test]
    fn new_checks_rows() {
        assert!(Bitmap::new(16, 1, vec![vec![0xFF, 0x00]]).is_ok());
        assert!(matches!(
            Bitmap::new(16, 2, vec![vec![0xFF, 0x00]]),
            Err(Error::InvalidRowCount {
                expected: 2,
                actual: 1
            })
        ));
        assert!(matches!(
            Bitmap::new(12, 1, vec![vec![0xFF]]),
            Err(Error::InvalidRowWidth {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn decode_monochrome() {
        let png = encode_png(16, 2, png::BitDepth::One, &[0xFF, 0x00, 0x00, 0xFF]);
        let bitmap = Bitmap::from_png(&png[..]).unwrap();

        assert_eq!(bitmap.width(), 16);
        assert_eq!(bitmap.height(), 2);
        assert_eq!(bitmap.rows(), &vec![vec![0xFF, 0x00], vec![0x00, 0xFF]]);
    }

    #[test]
    fn decode_partial_byte_width() {
        // 10 dots wide, 2 bytes per row with 6 padding bits
        let png = encode_png(10, 1, png::BitDepth::One, &[0xAA, 0xC0]);
        let bitmap = Bitmap::from_png(&png[..]).unwrap();

        assert_eq!(bitmap.bytes_per_row(), 2);
        assert_eq!(bitmap.rows()[0], vec![0xAA, 0xC0]);
    }

    #[test]
    fn decode_rejects_eight_bit() {
        let png = encode_png(2, 1, png::BitDepth::Eight, &[0x00, 0xFF]);
        assert!(matches!(
            Bitmap::from_png(&png[..]),
            Err(Error::UnsupportedBitDepth(8))
        ));
    }

    #[test]
    fn decode_rejects_other_formats() {
        assert!(matches!(
            Bitmap::from_png(&b"GIF89a\x01\x00\x01\x00"[..]),
            Err(Error::NotAPng)
        ));
        assert!(matches!(Bitmap::from_png(&b"\x89PN"[..]), Err(Error::NotAPng)));
    }

    #[test]
    fn decode_truncated() {
        let png = encode_png(16, 2, png::BitDepth::One, &[0xFF, 0x00, 0x00, 0xFF]);
        assert!(matches!(Bitmap::from_png(&png[..20]), Err(Error::Decode(_))));
    }

    #[test]
    fn print_head_width() {
        let narrow = Bitmap::new(384, 0, Vec::new()).unwrap();
        let wide = Bitmap::new(392, 0, Vec::new()).unwrap();

        assert!(narrow.fits_print_head());
        assert!(!wide.fits_print_head());
    }

    #[test]
    fn store_guards_reload() {
        let mut store = ImageStore::new();
        assert!(store.bitmap().is_none());

        store
            .insert(Bitmap::new(8, 1, vec![vec![0x80]]).unwrap())
            .unwrap();
        assert_eq!(store.row_count(), 1);
        assert!(matches!(
            store.insert(Bitmap::new(8, 0, Vec::new()).unwrap()),
            Err(Error::AlreadyLoaded)
        ));

        store.release();
        assert_eq!(store.row_count(), 0);
        store.release();
        assert!(store.bitmap().is_none());

        assert!(store.insert(Bitmap::new(8, 0, Vec::new()).unwrap()).is_ok());
    }

    #[test]
    fn load_missing_file() {
        let mut store = ImageStore::new();
        assert!(matches!(
            store.load("/nonexistent/image.png"),
            Err(Error::FileOpen { .. })
        ));
        assert!(store.bitmap().is_none());
    }
}
