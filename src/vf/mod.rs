/*!
 * TeX virtual fonts
 *
 * A virtual font describes each of its characters as a small DVI program that
 * places characters of other (physical) fonts and solid rules. Rendering a
 * character runs that program and composes the placed bitmaps.
 *
 * See also:
 *  - https://tug.org/docs/metafont/vftovp.pdf
 */

mod cache;
mod compose;
mod interpreter;
pub mod opcode;
mod packet;
mod parse;
mod subfont;

pub use cache::{load_packet_table, CharPacketSource, PacketCache, PacketCacheKey};
pub use compose::{BitmapList, Placement};
pub use interpreter::{DviFrame, DviInstruction, DviInterpreter, DviStack};
pub use packet::{CharPacket, PacketTable};
pub use parse::VfParser;
pub use subfont::{Subfont, SubfontRegistry};

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    bitmap::Bitmap,
    data_types::{fix_to_f64, pixels_per_point, round_to_int},
    error::{VfError, VfResult},
    provider::{GlyphRasterizer, PhysicalFontOpener, RenderMode},
    tfm::{Metric, MetricSource},
};

/// Whether subfonts are opened while loading a virtual font
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenStyle {
    /// Never open subfonts; characters render from metrics alone
    None,

    /// Open what can be opened
    #[default]
    Try,

    /// Every subfont must open or loading fails
    Require,
}

/// Content of bitmaps synthesized from metrics alone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GlyphStyle {
    #[default]
    Empty,
    Fill,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VfConfig {
    pub dpi_x: f64,
    pub dpi_y: f64,
    pub mag_x: f64,
    pub mag_y: f64,
    /// Size characters render at, in points. Defaults to the design size
    pub point_size: Option<f64>,
    pub open_style: OpenStyle,
    pub glyph_style: GlyphStyle,
}

impl Default for VfConfig {
    fn default() -> Self {
        Self {
            dpi_x: 300.0,
            dpi_y: 300.0,
            mag_x: 1.0,
            mag_y: 1.0,
            point_size: None,
            open_style: OpenStyle::Try,
            glyph_style: GlyphStyle::Empty,
        }
    }
}

/// A parsed virtual font. Immutable once loaded
#[derive(Debug)]
pub struct VfFont {
    vf_path: PathBuf,
    cs: u32,
    ds: u32,
    /// In points
    design_size: f64,
    point_size: f64,
    dpi_x: f64,
    dpi_y: f64,
    mag_x: f64,
    mag_y: f64,
    open_style: OpenStyle,
    glyph_style: GlyphStyle,
    metric: Arc<dyn MetricSource>,
    subfonts: SubfontRegistry,
    default_subfont: Option<usize>,
    offs_char_packet: u64,
}

impl VfFont {
    fn new(
        vf_path: PathBuf,
        cs: u32,
        ds: u32,
        config: &VfConfig,
        metric: Arc<dyn MetricSource>,
        subfonts: SubfontRegistry,
        offs_char_packet: u64,
    ) -> Self {
        let design_size = fix_to_f64(ds as i32);

        Self {
            vf_path,
            cs,
            ds,
            design_size,
            point_size: config.point_size.unwrap_or(design_size),
            dpi_x: config.dpi_x,
            dpi_y: config.dpi_y,
            mag_x: config.mag_x,
            mag_y: config.mag_y,
            open_style: config.open_style,
            glyph_style: config.glyph_style,
            metric,
            default_subfont: subfonts.default_subfont(),
            subfonts,
            offs_char_packet,
        }
    }

    pub fn open(
        path: impl AsRef<Path>,
        metric: Arc<dyn MetricSource>,
        config: &VfConfig,
        opener: &mut dyn PhysicalFontOpener,
    ) -> VfResult<Self> {
        let path = path.as_ref();
        let buffer = fs::read(path)?;

        VfParser::new(&buffer).parse(path.to_path_buf(), metric, config, opener)
    }

    pub fn path(&self) -> &Path {
        &self.vf_path
    }

    pub fn checksum(&self) -> u32 {
        self.cs
    }

    /// Design size as a raw fix_word
    pub fn design_size_fix(&self) -> u32 {
        self.ds
    }

    /// Design size in points
    pub fn design_size(&self) -> f64 {
        self.design_size
    }

    pub fn point_size(&self) -> f64 {
        self.point_size
    }

    /// Magnification that renders the design size at the point size
    pub fn size_scale(&self) -> f64 {
        if self.design_size > 0.0 {
            self.point_size / self.design_size
        } else {
            1.0
        }
    }

    pub fn dpi(&self) -> (f64, f64) {
        (self.dpi_x, self.dpi_y)
    }

    pub fn mag(&self) -> (f64, f64) {
        (self.mag_x, self.mag_y)
    }

    pub fn open_style(&self) -> OpenStyle {
        self.open_style
    }

    pub fn subfonts(&self) -> &SubfontRegistry {
        &self.subfonts
    }

    pub fn default_subfont(&self) -> Option<&Subfont> {
        self.subfonts.get(self.default_subfont?)
    }

    /// Byte offset of the first character packet
    pub fn packet_offset(&self) -> u64 {
        self.offs_char_packet
    }

    pub fn cache_key(&self) -> PacketCacheKey {
        PacketCacheKey {
            font_path: self.vf_path.clone(),
            metric: self.metric.identity(),
            offset: self.offs_char_packet,
        }
    }

    /// Dimensions of a character of this font, in points
    pub fn metric(&self, code_point: u32) -> VfResult<Metric> {
        self.metric
            .metric(code_point)
            .ok_or(VfError::IllegalCodePoint)
    }

    fn has_all_subfonts(&self) -> bool {
        self.subfonts.opened() == self.subfonts.len()
    }

    /// Bitmap sized from the character's metric, painted according to the
    /// glyph style
    pub fn metric_bitmap(&self, code_point: u32, mag_x: f64, mag_y: f64) -> VfResult<Bitmap> {
        let metric = self.metric(code_point)?;
        let mut bitmap = Bitmap::with_metric(&metric, self.dpi_x * mag_x, self.dpi_y * mag_y)?;

        if self.glyph_style == GlyphStyle::Fill {
            bitmap.fill();
        }

        Ok(bitmap)
    }

    /// Runs a character's program and composes what it placed. `None` when
    /// nothing was placed.
    ///
    /// `mag_x` and `mag_y` are taken as given; [VfFont::bitmap] folds the
    /// point size into them first
    pub fn interpret(
        &self,
        packet: &CharPacket,
        rasterizer: &dyn GlyphRasterizer,
        mode: RenderMode,
        mag_x: f64,
        mag_y: f64,
    ) -> VfResult<Option<Bitmap>> {
        let mut interpreter = DviInterpreter::new(self, rasterizer, mode, mag_x, mag_y);
        interpreter.execute(&packet.program)?;

        interpreter.into_bitmaps().compose()
    }

    /// Renders one character at the font's point size, further magnified by
    /// `mag_x` and `mag_y`
    pub fn bitmap(
        &self,
        code_point: u32,
        mode: RenderMode,
        mag_x: f64,
        mag_y: f64,
        cache: &dyn CharPacketSource,
        rasterizer: &dyn GlyphRasterizer,
    ) -> VfResult<Bitmap> {
        let mag_x = mag_x * self.size_scale();
        let mag_y = mag_y * self.size_scale();

        match self.open_style {
            OpenStyle::None => return self.metric_bitmap(code_point, mag_x, mag_y),
            OpenStyle::Try if self.subfonts.opened() == 0 => {
                return self.metric_bitmap(code_point, mag_x, mag_y)
            }
            OpenStyle::Require if !self.has_all_subfonts() => return Err(VfError::Unavailable),
            OpenStyle::Try | OpenStyle::Require => {}
        }

        let table = cache.get(&self.cache_key())?;
        let packet = table.get(code_point).ok_or(VfError::IllegalCodePoint)?;

        match self.interpret(packet, rasterizer, mode, mag_x, mag_y)? {
            Some(mut bitmap) => {
                let metric = self.metric(code_point)?;
                bitmap.mv_x = round_to_int(metric.mv_x * pixels_per_point(self.dpi_x, mag_x));
                bitmap.mv_y = round_to_int(metric.mv_y * pixels_per_point(self.dpi_y, mag_y));
                Ok(bitmap)
            }
            None => self.metric_bitmap(code_point, mag_x, mag_y),
        }
    }
}
