use std::{fmt, fs::File, io::BufWriter, path::Path};

use bitvec::{order::Msb0, vec::BitVec};

use crate::{
    data_types::{pixels_per_point, round_to_int},
    error::{VfError, VfResult},
    tfm::Metric,
};

/// Largest bitmap, in pixels, that is ever allocated
pub const MAX_PIXELS: usize = 1 << 28;

/// A one bit per pixel glyph image
///
/// Row 0 is the top row. `off_x` and `off_y` locate the top left corner of the
/// image relative to the glyph's reference point, with y increasing upward.
/// The bottom row of a glyph resting on the baseline has y = 0, so its
/// `off_y` is `height - 1`.
#[derive(Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: usize,
    height: usize,
    pub off_x: i32,
    pub off_y: i32,
    pub mv_x: i32,
    pub mv_y: i32,
    bits: BitVec<u8, Msb0>,
}

impl Bitmap {
    /// Fails with [VfError::NoMemory] when the bitmap would exceed
    /// [MAX_PIXELS] or its storage cannot be allocated
    pub fn new(width: usize, height: usize) -> VfResult<Self> {
        let len = width
            .checked_mul(height)
            .filter(|&len| len <= MAX_PIXELS)
            .ok_or(VfError::NoMemory)?;

        let mut storage = Vec::<u8>::new();
        storage
            .try_reserve_exact((len + 7) / 8)
            .map_err(|_| VfError::NoMemory)?;
        storage.resize((len + 7) / 8, 0);

        let mut bits = BitVec::from_vec(storage);
        bits.truncate(len);

        Ok(Self {
            width,
            height,
            off_x: 0,
            off_y: 0,
            mv_x: 0,
            mv_y: 0,
            bits,
        })
    }

    /// An unpainted bitmap the size of the metric's bounding box at the given
    /// resolution (pixels per inch, magnification already applied)
    pub fn with_metric(metric: &Metric, dpi_x: f64, dpi_y: f64) -> VfResult<Self> {
        let scale_x = pixels_per_point(dpi_x, 1.0);
        let scale_y = pixels_per_point(dpi_y, 1.0);

        let width = round_to_int(metric.bbx_width * scale_x).max(1) as usize;
        let height = round_to_int(metric.bbx_height * scale_y).max(1) as usize;

        let mut bitmap = Self::new(width, height)?;
        bitmap.off_x = round_to_int(metric.off_x * scale_x);
        bitmap.off_y = round_to_int(metric.off_y * scale_y);
        bitmap.mv_x = round_to_int(metric.mv_x * scale_x);
        bitmap.mv_y = round_to_int(metric.mv_y * scale_y);

        Ok(bitmap)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.bits[y * self.width + x]
    }

    pub fn set(&mut self, x: usize, y: usize) {
        if x < self.width && y < self.height {
            self.bits.set(y * self.width + x, true);
        }
    }

    pub fn fill(&mut self) {
        self.bits.fill(true);
    }

    pub fn painted_pixels(&self) -> usize {
        self.bits.count_ones()
    }

    pub fn is_blank(&self) -> bool {
        self.bits.not_any()
    }

    /// Writes the bitmap as an RGBA png, painted pixels black and the rest
    /// transparent
    pub fn write_png(&self, p: impl AsRef<Path>) -> anyhow::Result<()> {
        let file = File::create(p)?;
        let w = &mut BufWriter::new(file);
        let mut encoder = png::Encoder::new(w, self.width as u32, self.height as u32);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder.write_header()?;

        let data = self
            .bits
            .iter()
            .flat_map(|bit| if *bit { [0, 0, 0, 0xff] } else { [0xff, 0xff, 0xff, 0] })
            .collect::<Vec<u8>>();
        writer.write_image_data(&data)?;

        Ok(())
    }
}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("off_x", &self.off_x)
            .field("off_y", &self.off_y)
            .field("mv_x", &self.mv_x)
            .field("mv_y", &self.mv_y)
            .finish()
    }
}

/// Rows of `#` and `.`, largely to assist in debugging
impl fmt::Display for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height {
            for x in 0..self.width {
                write!(f, "{}", if self.get(x, y) { '#' } else { '.' })?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}
