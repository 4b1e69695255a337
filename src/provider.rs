//! Physical fonts seen from a virtual font
//!
//! A virtual font never rasterizes anything itself. It asks a
//! [PhysicalFontOpener] to open the fonts named in its definitions and a
//! [GlyphRasterizer] for the bitmaps and metrics of their characters.

use std::path::PathBuf;

use crate::{
    bitmap::Bitmap,
    data_types::{FontId, POINTS_PER_INCH},
    tfm::{Metric, MetricSource, TfmFile},
};

/// Which resolution a rasterizer renders at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Device resolution and magnification
    #[default]
    Dpi,

    /// One pixel per point, scaled only by the magnification
    PixelSize,
}

pub trait PhysicalFontOpener {
    /// Opens `name` at `design_size * scale` points. `design_size` is the
    /// virtual font's design size
    fn open(&mut self, name: &str, design_size: f64, scale: f64) -> Option<FontId>;
}

pub trait GlyphRasterizer {
    fn bitmap(
        &self,
        font: FontId,
        code_point: u32,
        mode: RenderMode,
        mag_x: f64,
        mag_y: f64,
    ) -> Option<Bitmap>;

    /// Character dimensions in points, magnified
    fn metric(&self, font: FontId, code_point: u32, mag_x: f64, mag_y: f64) -> Option<Metric>;
}

#[derive(Debug)]
struct OpenedFont {
    tfm: TfmFile,
    point_size: f64,
}

/// Opens subfonts by locating `<name>.tfm` in a list of directories and draws
/// each of their characters as a filled metric box
#[derive(Debug)]
pub struct TfmBoxProvider {
    search_path: Vec<PathBuf>,
    dpi_x: f64,
    dpi_y: f64,
    fonts: Vec<OpenedFont>,
}

impl TfmBoxProvider {
    pub fn new(search_path: Vec<PathBuf>, dpi_x: f64, dpi_y: f64) -> Self {
        Self {
            search_path,
            dpi_x,
            dpi_y,
            fonts: Vec::new(),
        }
    }

    /// Registers an already parsed metric file under the given point size
    pub fn add_font(&mut self, tfm: TfmFile, point_size: f64) -> FontId {
        self.fonts.push(OpenedFont { tfm, point_size });
        FontId(self.fonts.len() as u32 - 1)
    }

    fn locate(&self, name: &str) -> Option<PathBuf> {
        self.search_path
            .iter()
            .map(|dir| dir.join(format!("{}.tfm", name)))
            .find(|p| p.is_file())
    }

    fn font(&self, font: FontId) -> Option<&OpenedFont> {
        self.fonts.get(font.0 as usize)
    }
}

impl PhysicalFontOpener for TfmBoxProvider {
    fn open(&mut self, name: &str, design_size: f64, scale: f64) -> Option<FontId> {
        let path = self.locate(name)?;

        match TfmFile::open(&path) {
            Ok(tfm) => Some(self.add_font(tfm, design_size * scale)),
            Err(e) => {
                log::debug!("unable to read {}: {}", path.display(), e);
                None
            }
        }
    }
}

impl GlyphRasterizer for TfmBoxProvider {
    fn bitmap(
        &self,
        font: FontId,
        code_point: u32,
        mode: RenderMode,
        mag_x: f64,
        mag_y: f64,
    ) -> Option<Bitmap> {
        let metric = self.metric(font, code_point, 1.0, 1.0)?;

        let (dpi_x, dpi_y) = match mode {
            RenderMode::Dpi => (self.dpi_x, self.dpi_y),
            RenderMode::PixelSize => (POINTS_PER_INCH, POINTS_PER_INCH),
        };

        let mut bitmap = Bitmap::with_metric(&metric, dpi_x * mag_x, dpi_y * mag_y).ok()?;
        bitmap.fill();

        Some(bitmap)
    }

    fn metric(&self, font: FontId, code_point: u32, mag_x: f64, mag_y: f64) -> Option<Metric> {
        let font = self.font(font)?;
        let metric = font.tfm.metric(code_point)?;

        let scale = font.point_size / font.tfm.design_size_points();
        let (sx, sy) = (scale * mag_x, scale * mag_y);

        Some(Metric {
            bbx_width: metric.bbx_width * sx,
            bbx_height: metric.bbx_height * sy,
            off_x: metric.off_x * sx,
            off_y: metric.off_y * sy,
            mv_x: metric.mv_x * sx,
            mv_y: metric.mv_y * sy,
        })
    }
}
