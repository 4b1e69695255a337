use std::{path::PathBuf, sync::Arc};

use crate::{
    error::{VfError, VfResult},
    parse_binary::{BinaryParser, ByteStream},
    provider::PhysicalFontOpener,
    tfm::MetricSource,
};

use super::{opcode, OpenStyle, Subfont, SubfontRegistry, VfConfig, VfFont};

pub struct VfParser<'a> {
    stream: ByteStream<'a>,
}

impl<'a> VfParser<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            stream: ByteStream::new(buffer),
        }
    }

    /// Parses the preamble and font definitions, opening subfonts as the
    /// configured [OpenStyle] asks. Character packets are left for the
    /// [PacketCache](super::PacketCache)
    pub fn parse(
        mut self,
        path: PathBuf,
        metric: Arc<dyn MetricSource>,
        config: &VfConfig,
        opener: &mut dyn PhysicalFontOpener,
    ) -> VfResult<VfFont> {
        let (cs, ds) = self.parse_preamble()?;

        if cs != metric.checksum() || ds != metric.design_size() {
            log::debug!(
                "{}: checksum/design size {:#x}/{:#x} do not match metric file {:#x}/{:#x}",
                path.display(),
                cs,
                ds,
                metric.checksum(),
                metric.design_size()
            );
            return Err(VfError::IllegalFontFile);
        }

        let mut subfonts = SubfontRegistry::new();
        let mut all_opened = true;

        let offs_char_packet = loop {
            let op = self.stream.next().ok_or(VfError::IllegalFontFile)?;

            let mut subfont = match op {
                opcode::FNT_DEF1..=opcode::FNT_DEF4 => {
                    self.parse_font_def((op - opcode::FNT_DEF1 + 1) as usize)?
                }
                _ => break self.stream.cursor() - 1,
            };

            let scale = subfont.scale_factor();
            log::debug!(
                "subfont {}: {}, scaled {}",
                subfont.k,
                subfont.name(),
                scale
            );

            if config.open_style == OpenStyle::None {
                log::debug!("subfont {} is not requested to open", subfont.k);
            } else {
                subfont.font_id =
                    opener.open(&subfont.name(), metric.design_size_points(), scale);

                match subfont.font_id {
                    Some(id) => log::debug!("subfont {} is opened: font id {}", subfont.k, id.0),
                    None => {
                        all_opened = false;
                        log::debug!("subfont {} is not opened", subfont.k);
                    }
                }
            }

            subfonts.push(subfont);
        };

        if !all_opened {
            if config.open_style == OpenStyle::Require {
                log::debug!("all subfonts are required but some failed to open");
                return Err(VfError::Unavailable);
            }

            log::debug!("not all subfonts are opened; continuing");
        }

        Ok(VfFont::new(
            path,
            cs,
            ds,
            config,
            metric,
            subfonts,
            offs_char_packet as u64,
        ))
    }

    /// Returns the checksum and design size
    fn parse_preamble(&mut self) -> VfResult<(u32, u32)> {
        if self.stream.read_u8() != opcode::PRE {
            return Err(VfError::IllegalFontFile);
        }

        if self.stream.read_u8() != opcode::VF_ID {
            return Err(VfError::IllegalFontFile);
        }

        let comment_len = self.stream.read_u8() as usize;
        self.stream.skip(comment_len);

        let cs = self.stream.read_u32();
        let ds = self.stream.read_u32();

        if self.stream.is_truncated() {
            return Err(VfError::IllegalFontFile);
        }

        Ok((cs, ds))
    }

    /// `k_len` is the width of the local font number
    fn parse_font_def(&mut self, k_len: usize) -> VfResult<Subfont> {
        let k = self.stream.read_uint(k_len);
        let c = self.stream.read_u32();
        let s = self.stream.read_u32();
        let d = self.stream.read_u32();
        let a = self.stream.read_u8() as usize;
        let l = self.stream.read_u8() as usize;

        let path = self.stream.read_bytes(a + l).to_vec();

        if self.stream.is_truncated() {
            return Err(VfError::IllegalFontFile);
        }

        Ok(Subfont::new(k, c, s, d, path, a))
    }
}
