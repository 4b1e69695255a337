//! Opcode values shared by VF files and the DVI programs inside them

pub const SET_CHAR_0: u8 = 0;
pub const SET_CHAR_127: u8 = 127;
pub const SET1: u8 = 128;
pub const SET4: u8 = 131;
pub const SET_RULE: u8 = 132;
pub const PUT1: u8 = 133;
pub const PUT4: u8 = 136;
pub const PUT_RULE: u8 = 137;
pub const NOP: u8 = 138;
pub const PUSH: u8 = 141;
pub const POP: u8 = 142;
pub const RIGHT1: u8 = 143;
pub const RIGHT4: u8 = 146;
pub const W0: u8 = 147;
pub const W4: u8 = 151;
pub const X0: u8 = 152;
pub const X4: u8 = 156;
pub const DOWN1: u8 = 157;
pub const DOWN4: u8 = 160;
pub const Y0: u8 = 161;
pub const Y4: u8 = 165;
pub const Z0: u8 = 166;
pub const Z4: u8 = 170;
pub const FNT_NUM_0: u8 = 171;
pub const FNT_NUM_63: u8 = 234;
pub const FNT1: u8 = 235;
pub const FNT4: u8 = 238;
pub const XXX1: u8 = 239;
pub const XXX4: u8 = 242;
pub const FNT_DEF1: u8 = 243;
pub const FNT_DEF4: u8 = 246;
pub const PRE: u8 = 247;
pub const POST: u8 = 248;

/// Character packets whose program is longer than this use the long form
pub const SHORT_CHAR_MAX: u8 = 241;
pub const LONG_CHAR: u8 = 242;

/// The only VF format identifier in use
pub const VF_ID: u8 = 202;
