//! TeX font metric (.tfm) files
//!
//! A virtual font borrows its checksum, design size and per character
//! dimensions from the TFM file of the same name. Only the parts needed to
//! place glyphs are read here: the header and the width, height and depth
//! tables. Ligature/kern programs and font parameters are skipped.

use std::{fmt, fs, path::Path};

use crate::{
    data_types::fix_to_f64,
    error::{VfError, VfResult},
    parse_binary::{BinaryParser, ByteStream},
};

/// Dimensions of a single character, in points
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Metric {
    pub bbx_width: f64,
    pub bbx_height: f64,
    /// Horizontal offset from the reference point to the left edge
    pub off_x: f64,
    /// Vertical offset from the reference point to the top edge, positive up
    pub off_y: f64,
    /// Advance vector
    pub mv_x: f64,
    pub mv_y: f64,
}

/// Identifies the metric data a virtual font was validated against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MetricIdentity {
    pub checksum: u32,
    pub design_size: u32,
}

/// Source of font-wide and per character metrics for a virtual font
pub trait MetricSource: fmt::Debug + Send + Sync {
    fn checksum(&self) -> u32;

    /// Design size as a raw fix_word, in points
    fn design_size(&self) -> u32;

    /// Character dimensions in points, or `None` when the character does not
    /// exist
    fn metric(&self, code_point: u32) -> Option<Metric>;

    fn identity(&self) -> MetricIdentity {
        MetricIdentity {
            checksum: self.checksum(),
            design_size: self.design_size(),
        }
    }

    /// Design size in points
    fn design_size_points(&self) -> f64 {
        fix_to_f64(self.design_size() as i32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CharInfo {
    width_index: u8,
    height_index: u8,
    depth_index: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TfmFile {
    checksum: u32,
    design_size: u32,
    first_char: u32,
    char_infos: Vec<CharInfo>,
    widths: Vec<i32>,
    heights: Vec<i32>,
    depths: Vec<i32>,
}

impl TfmFile {
    pub fn open(path: impl AsRef<Path>) -> VfResult<Self> {
        let buffer = fs::read(path)?;
        Self::parse(&buffer)
    }

    pub fn parse(buffer: &[u8]) -> VfResult<Self> {
        let mut stream = ByteStream::new(buffer);

        let lf = stream.read_u16() as usize;
        let lh = stream.read_u16() as usize;
        let bc = stream.read_u16() as usize;
        let ec = stream.read_u16() as usize;
        let nw = stream.read_u16() as usize;
        let nh = stream.read_u16() as usize;
        let nd = stream.read_u16() as usize;
        let ni = stream.read_u16() as usize;
        let nl = stream.read_u16() as usize;
        let nk = stream.read_u16() as usize;
        let ne = stream.read_u16() as usize;
        let np = stream.read_u16() as usize;

        if stream.is_truncated() || lh < 2 || bc > ec + 1 || ec > 255 {
            return Err(VfError::IllegalFontFile);
        }

        let n_chars = ec + 1 - bc;

        if lf != 6 + lh + n_chars + nw + nh + nd + ni + nl + nk + ne + np
            || lf * 4 > buffer.len()
        {
            return Err(VfError::IllegalFontFile);
        }

        let checksum = stream.read_u32();
        let design_size = stream.read_u32();
        stream.skip((lh - 2) * 4);

        let char_infos = (0..n_chars)
            .map(|_| {
                let width_index = stream.read_u8();
                let height_depth = stream.read_u8();
                stream.skip(2);

                CharInfo {
                    width_index,
                    height_index: height_depth >> 4,
                    depth_index: height_depth & 0xf,
                }
            })
            .collect::<Vec<_>>();

        let mut read_table = |n: usize| (0..n).map(|_| stream.read_i32()).collect::<Vec<_>>();

        let widths = read_table(nw);
        let heights = read_table(nh);
        let depths = read_table(nd);

        if stream.is_truncated() {
            return Err(VfError::IllegalFontFile);
        }

        let in_bounds = |idx: u8, table: &[i32]| (idx as usize) < table.len().max(1);
        if char_infos.iter().any(|info| {
            !in_bounds(info.width_index, &widths)
                || !in_bounds(info.height_index, &heights)
                || !in_bounds(info.depth_index, &depths)
        }) {
            return Err(VfError::IllegalFontFile);
        }

        Ok(Self {
            checksum,
            design_size,
            first_char: bc as u32,
            char_infos,
            widths,
            heights,
            depths,
        })
    }

    fn char_info(&self, code_point: u32) -> Option<CharInfo> {
        let idx = code_point.checked_sub(self.first_char)?;
        let info = *self.char_infos.get(idx as usize)?;

        // a zero width index marks a character that does not exist
        if info.width_index == 0 {
            return None;
        }

        Some(info)
    }
}

fn lookup(table: &[i32], idx: u8) -> i32 {
    table.get(idx as usize).copied().unwrap_or(0)
}

impl MetricSource for TfmFile {
    fn checksum(&self) -> u32 {
        self.checksum
    }

    fn design_size(&self) -> u32 {
        self.design_size
    }

    fn metric(&self, code_point: u32) -> Option<Metric> {
        let info = self.char_info(code_point)?;
        let design_size = self.design_size_points();

        let width = fix_to_f64(lookup(&self.widths, info.width_index)) * design_size;
        let height = fix_to_f64(lookup(&self.heights, info.height_index)) * design_size;
        let depth = fix_to_f64(lookup(&self.depths, info.depth_index)) * design_size;

        Some(Metric {
            bbx_width: width,
            bbx_height: height + depth,
            off_x: 0.0,
            off_y: height,
            mv_x: width,
            mv_y: 0.0,
        })
    }
}
