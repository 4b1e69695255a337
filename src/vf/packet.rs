use crate::{
    error::{VfError, VfResult},
    parse_binary::{BinaryParser, ByteStream},
};

use super::opcode;

/// One character's DVI program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharPacket {
    pub code_point: u32,
    /// Advance width copied from the TFM file, as a fix_word
    pub tfm_width: i32,
    pub program: Vec<u8>,
}

/// Character packets of a virtual font, in file order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PacketTable {
    packets: Vec<CharPacket>,
}

impl PacketTable {
    pub fn new(packets: Vec<CharPacket>) -> Self {
        Self { packets }
    }

    /// Parses packets up to and including the `post` opcode. `buffer` starts
    /// at the first packet
    pub fn parse(buffer: &[u8]) -> VfResult<Self> {
        let mut stream = ByteStream::new(buffer);
        let mut packets = Vec::new();

        loop {
            let op = stream.next().ok_or(VfError::IllegalFontFile)?;

            let (len, code_point, tfm_width) = match op {
                0..=opcode::SHORT_CHAR_MAX => {
                    let code_point = stream.read_uint(1);
                    let tfm_width = stream.read_uint(3) as i32;
                    (op as usize, code_point, tfm_width)
                }
                opcode::LONG_CHAR => {
                    let len = stream.read_u32() as usize;
                    let code_point = stream.read_u32();
                    let tfm_width = stream.read_i32();
                    (len, code_point, tfm_width)
                }
                opcode::POST => break,
                _ => return Err(VfError::IllegalFontFile),
            };

            let program = stream.read_bytes(len).to_vec();

            if stream.is_truncated() {
                return Err(VfError::IllegalFontFile);
            }

            packets.push(CharPacket {
                code_point,
                tfm_width,
                program,
            });
        }

        Ok(Self { packets })
    }

    pub fn get(&self, code_point: u32) -> Option<&CharPacket> {
        self.packets.iter().find(|p| p.code_point == code_point)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CharPacket> {
        self.packets.iter()
    }

    pub fn len(&self) -> usize {
        self.packets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }
}
