//! Renders one character of a TeX virtual font to a png file
//!
//! Subfonts are opened from `<name>.tfm` files in the `--fonts` directories
//! (by default the directory holding the VF file) and drawn as filled boxes.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::Parser;

use vf::{
    GlyphStyle, OpenStyle, PacketCache, RenderMode, TfmBoxProvider, TfmFile, VfConfig, VfFont,
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The virtual font
    vf_path: PathBuf,

    /// Metric file of the virtual font
    tfm_path: PathBuf,

    /// Decimal, `0x` prefixed hex, or a single character
    #[arg(value_parser = parse_code_point)]
    code_point: u32,

    /// The output png file
    out_path: PathBuf,

    /// Device resolution, in pixels per inch
    #[arg(long, default_value_t = 300.0)]
    dpi: f64,

    /// Magnification applied when rendering
    #[arg(long, default_value_t = 1.0)]
    mag: f64,

    /// Directory searched for subfont metric files; may be repeated
    #[arg(long = "fonts")]
    font_dirs: Vec<PathBuf>,

    /// Paint bitmaps synthesized from metrics alone
    #[arg(long)]
    fill: bool,

    /// Fail unless every subfont opens
    #[arg(long)]
    require: bool,
}

impl Args {
    fn glyph_style(&self) -> GlyphStyle {
        if self.fill {
            GlyphStyle::Fill
        } else {
            GlyphStyle::Empty
        }
    }

    fn open_style(&self) -> OpenStyle {
        if self.require {
            OpenStyle::Require
        } else {
            OpenStyle::Try
        }
    }

    fn search_path(&self) -> Vec<PathBuf> {
        if !self.font_dirs.is_empty() {
            return self.font_dirs.clone();
        }

        let dir = self
            .vf_path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        vec![dir]
    }
}

fn parse_code_point(arg: &str) -> Result<u32, String> {
    if let Some(hex) = arg.strip_prefix("0x").or_else(|| arg.strip_prefix("0X")) {
        return u32::from_str_radix(hex, 16).map_err(|e| format!("{:?}: {}", arg, e));
    }

    if let Ok(n) = arg.parse::<u32>() {
        return Ok(n);
    }

    let mut chars = arg.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c as u32),
        _ => Err(format!("{:?} is not a code point", arg)),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();

    let tfm = TfmFile::open(&args.tfm_path)
        .with_context(|| format!("reading {}", args.tfm_path.display()))?;

    let config = VfConfig {
        dpi_x: args.dpi,
        dpi_y: args.dpi,
        open_style: args.open_style(),
        glyph_style: args.glyph_style(),
        ..VfConfig::default()
    };

    let mut provider = TfmBoxProvider::new(args.search_path(), args.dpi, args.dpi);
    let font = VfFont::open(&args.vf_path, Arc::new(tfm), &config, &mut provider)
        .with_context(|| format!("opening {}", args.vf_path.display()))?;

    log::info!(
        "{}: {} subfonts, {} opened",
        args.vf_path.display(),
        font.subfonts().len(),
        font.subfonts().opened()
    );

    let cache = PacketCache::new();
    let bitmap = font
        .bitmap(args.code_point, RenderMode::Dpi, args.mag, args.mag, &cache, &provider)
        .with_context(|| format!("rendering code point {:#x}", args.code_point))?;

    log::debug!("{:?}", bitmap);

    bitmap.write_png(&args.out_path)?;

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    fn args(list: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("vf").chain(list.iter().copied()))
    }

    #[test]
    fn code_point_forms() {
        assert_eq!(parse_code_point("65").unwrap(), 65);
        assert_eq!(parse_code_point("0x41").unwrap(), 0x41);
        assert_eq!(parse_code_point("A").unwrap(), 0x41);
        assert_eq!(parse_code_point("9").unwrap(), 9);
        assert!(parse_code_point("AB").is_err());
        assert!(parse_code_point("0xZZ").is_err());
    }

    #[test]
    fn options_and_defaults() {
        let parsed =
            args(&["fonts/a.vf", "a.tfm", "A", "out.png", "--dpi", "600", "--fill"]).unwrap();

        assert_eq!(parsed.code_point, 0x41);
        assert_eq!(parsed.dpi, 600.0);
        assert_eq!(parsed.mag, 1.0);
        assert_eq!(parsed.glyph_style(), GlyphStyle::Fill);
        assert_eq!(parsed.open_style(), OpenStyle::Try);
        assert_eq!(parsed.search_path(), [PathBuf::from("fonts")]);

        let parsed = args(&[
            "a.vf", "a.tfm", "0x10", "o.png", "--fonts", "x", "--fonts", "y", "--require",
        ])
        .unwrap();
        assert_eq!(parsed.code_point, 0x10);
        assert_eq!(parsed.search_path(), [PathBuf::from("x"), PathBuf::from("y")]);
        assert_eq!(parsed.open_style(), OpenStyle::Require);

        let parsed = args(&["a.vf", "a.tfm", "1", "o.png"]).unwrap();
        assert_eq!(parsed.search_path(), [PathBuf::from(".")]);
    }

    #[test]
    fn rejects_bad_invocations() {
        assert!(args(&["a.vf", "a.tfm", "A"]).is_err());
        assert!(args(&["a.vf", "a.tfm", "A", "o.png", "--dpi"]).is_err());
        assert!(args(&["a.vf", "a.tfm", "A", "o.png", "--bogus"]).is_err());
        assert!(args(&["a.vf", "a.tfm", "AB", "o.png"]).is_err());
    }
}
