pub mod bitmap;
pub mod data_types;
pub mod error;
pub mod parse_binary;
pub mod provider;
pub mod tfm;
pub mod vf;

pub use crate::{
    bitmap::Bitmap,
    data_types::FontId,
    error::{VfError, VfResult},
    provider::{GlyphRasterizer, PhysicalFontOpener, RenderMode, TfmBoxProvider},
    tfm::{Metric, MetricSource, TfmFile},
    vf::{GlyphStyle, OpenStyle, PacketCache, VfConfig, VfFont},
};
