use crate::{
    bitmap::Bitmap,
    data_types::{pixels_per_point, round_to_int, FontId, FIX_UNITY},
    error::{VfError, VfResult},
    parse_binary::{get_int, get_uint},
    provider::{GlyphRasterizer, RenderMode},
};

use super::{compose::BitmapList, opcode, VfFont};

/// A decoded DVI instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DviInstruction {
    /// Typeset a character and advance by its width
    SetChar(u32),
    /// Typeset a character without moving
    PutChar(u32),
    SetRule { height: i32, width: i32 },
    PutRule { height: i32, width: i32 },
    Nop,
    Push,
    Pop,
    Right(i32),
    /// Move right by `w`, first setting it when an operand is present
    W(Option<i32>),
    X(Option<i32>),
    Down(i32),
    Y(Option<i32>),
    Z(Option<i32>),
    Font(u32),
    /// Special with a payload of the given length, ignored
    Xxx(usize),
}

struct InstructionStream<'a> {
    buffer: &'a [u8],
    cursor: usize,
}

impl<'a> InstructionStream<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, cursor: 0 }
    }

    fn uint(&mut self, n: usize) -> VfResult<u32> {
        let v = get_uint(&self.buffer[self.cursor..], n).ok_or(VfError::IllegalFontFile)?;
        self.cursor += n;
        Ok(v)
    }

    fn int(&mut self, n: usize) -> VfResult<i32> {
        let v = get_int(&self.buffer[self.cursor..], n).ok_or(VfError::IllegalFontFile)?;
        self.cursor += n;
        Ok(v)
    }

    /// Operand width of an instruction in a run of four, where `first` takes
    /// a one byte operand
    fn width(instr: u8, first: u8) -> usize {
        (instr - first + 1) as usize
    }

    fn next_instruction(&mut self) -> VfResult<Option<DviInstruction>> {
        let Some(&instr) = self.buffer.get(self.cursor) else {
            return Ok(None);
        };
        self.cursor += 1;

        Ok(Some(match instr {
            opcode::SET_CHAR_0..=opcode::SET_CHAR_127 => DviInstruction::SetChar(instr as u32),
            opcode::SET1..=opcode::SET4 => {
                DviInstruction::SetChar(self.uint(Self::width(instr, opcode::SET1))?)
            }
            opcode::SET_RULE => DviInstruction::SetRule {
                height: self.int(4)?,
                width: self.int(4)?,
            },
            opcode::PUT1..=opcode::PUT4 => {
                DviInstruction::PutChar(self.uint(Self::width(instr, opcode::PUT1))?)
            }
            opcode::PUT_RULE => DviInstruction::PutRule {
                height: self.int(4)?,
                width: self.int(4)?,
            },
            opcode::NOP => DviInstruction::Nop,
            opcode::PUSH => DviInstruction::Push,
            opcode::POP => DviInstruction::Pop,
            opcode::RIGHT1..=opcode::RIGHT4 => {
                DviInstruction::Right(self.int(Self::width(instr, opcode::RIGHT1))?)
            }
            opcode::W0 => DviInstruction::W(None),
            opcode::W0..=opcode::W4 => {
                DviInstruction::W(Some(self.int((instr - opcode::W0) as usize)?))
            }
            opcode::X0 => DviInstruction::X(None),
            opcode::X0..=opcode::X4 => {
                DviInstruction::X(Some(self.int((instr - opcode::X0) as usize)?))
            }
            opcode::DOWN1..=opcode::DOWN4 => {
                DviInstruction::Down(self.int(Self::width(instr, opcode::DOWN1))?)
            }
            opcode::Y0 => DviInstruction::Y(None),
            opcode::Y0..=opcode::Y4 => {
                DviInstruction::Y(Some(self.int((instr - opcode::Y0) as usize)?))
            }
            opcode::Z0 => DviInstruction::Z(None),
            opcode::Z0..=opcode::Z4 => {
                DviInstruction::Z(Some(self.int((instr - opcode::Z0) as usize)?))
            }
            opcode::FNT_NUM_0..=opcode::FNT_NUM_63 => {
                DviInstruction::Font((instr - opcode::FNT_NUM_0) as u32)
            }
            opcode::FNT1..=opcode::FNT4 => {
                DviInstruction::Font(self.uint(Self::width(instr, opcode::FNT1))?)
            }
            opcode::XXX1..=opcode::XXX4 => {
                let len = self.int(Self::width(instr, opcode::XXX1))?;
                let len = usize::try_from(len).map_err(|_| VfError::IllegalFontFile)?;
                if self.buffer.len() - self.cursor < len {
                    return Err(VfError::IllegalFontFile);
                }
                self.cursor += len;
                DviInstruction::Xxx(len)
            }
            _ => return Err(VfError::IllegalFontFile),
        }))
    }
}

/// Registers of one DVI stack level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DviFrame {
    pub h: i32,
    pub v: i32,
    pub w: i32,
    pub x: i32,
    pub y: i32,
    pub z: i32,
    /// Local number of the selected subfont
    pub f: u32,
    /// Physical font the selection resolved to
    pub font_id: Option<FontId>,
}

/// Save/restore stack of register frames. It always holds at least one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DviStack {
    frames: Vec<DviFrame>,
}

impl DviStack {
    pub fn new(initial: DviFrame) -> Self {
        Self {
            frames: vec![initial],
        }
    }

    pub fn top(&self) -> &DviFrame {
        // `pop` never removes the last frame
        &self.frames[self.frames.len() - 1]
    }

    pub fn top_mut(&mut self) -> &mut DviFrame {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    pub fn push(&mut self) {
        let top = *self.top();
        self.frames.push(top);
    }

    /// Discards the top frame. Returns `false`, leaving the stack untouched,
    /// when there is no frame beneath it
    pub fn pop(&mut self) -> bool {
        if self.frames.len() == 1 {
            return false;
        }

        self.frames.pop();
        true
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

/// Executes one character's DVI program, collecting the bitmaps it places
pub struct DviInterpreter<'a> {
    vf: &'a VfFont,
    rasterizer: &'a dyn GlyphRasterizer,
    mode: RenderMode,
    mag_x: f64,
    mag_y: f64,
    stack: DviStack,
    fmag: f64,
    bitmaps: BitmapList,
}

impl<'a> DviInterpreter<'a> {
    pub fn new(
        vf: &'a VfFont,
        rasterizer: &'a dyn GlyphRasterizer,
        mode: RenderMode,
        mag_x: f64,
        mag_y: f64,
    ) -> Self {
        let initial = match vf.default_subfont() {
            Some(sf) => DviFrame {
                f: sf.k,
                font_id: sf.font_id,
                ..DviFrame::default()
            },
            None => DviFrame::default(),
        };

        Self {
            vf,
            rasterizer,
            mode,
            mag_x,
            mag_y,
            stack: DviStack::new(initial),
            fmag: 1.0,
            bitmaps: BitmapList::new(),
        }
    }

    pub fn stack(&self) -> &DviStack {
        &self.stack
    }

    pub fn into_bitmaps(self) -> BitmapList {
        self.bitmaps
    }

    /// Runs `program` to its end. An illegal instruction, or a rule too large
    /// to allocate, stops execution; bitmaps placed before it are kept
    pub fn execute(&mut self, program: &[u8]) -> VfResult<()> {
        let mut stream = InstructionStream::new(program);

        loop {
            let pc = stream.cursor;
            let Some(instruction) = stream.next_instruction()? else {
                break;
            };

            log::trace!(
                "DVI CODE PC={:#06x}: {:?} H={:#010x} V={:#010x}",
                pc,
                instruction,
                self.stack.top().h,
                self.stack.top().v,
            );

            self.step(instruction)?;
        }

        Ok(())
    }

    fn step(&mut self, instruction: DviInstruction) -> VfResult<()> {
        match instruction {
            DviInstruction::SetChar(code_point) => self.set_char(code_point),
            DviInstruction::PutChar(code_point) => self.put_char(code_point),
            DviInstruction::SetRule { height, width } => {
                self.put_rule(width, height)?;
                let top = self.stack.top_mut();
                top.h = top.h.wrapping_add(width);
            }
            DviInstruction::PutRule { height, width } => self.put_rule(width, height)?,
            DviInstruction::Nop | DviInstruction::Xxx(..) => {}
            DviInstruction::Push => self.stack.push(),
            DviInstruction::Pop => {
                if !self.stack.pop() {
                    log::warn!("VF DVI stack underflow: {}", self.vf.path().display());
                }
            }
            DviInstruction::Right(n) => {
                let top = self.stack.top_mut();
                top.h = top.h.wrapping_add(n);
            }
            DviInstruction::W(n) => {
                let top = self.stack.top_mut();
                if let Some(n) = n {
                    top.w = n;
                }
                top.h = top.h.wrapping_add(top.w);
            }
            DviInstruction::X(n) => {
                let top = self.stack.top_mut();
                if let Some(n) = n {
                    top.x = n;
                }
                top.h = top.h.wrapping_add(top.x);
            }
            DviInstruction::Down(n) => {
                let top = self.stack.top_mut();
                top.v = top.v.wrapping_add(n);
            }
            DviInstruction::Y(n) => {
                let top = self.stack.top_mut();
                if let Some(n) = n {
                    top.y = n;
                }
                top.v = top.v.wrapping_add(top.y);
            }
            DviInstruction::Z(n) => {
                let top = self.stack.top_mut();
                if let Some(n) = n {
                    top.z = n;
                }
                top.v = top.v.wrapping_add(top.z);
            }
            DviInstruction::Font(f) => self.select_font(f),
        }

        Ok(())
    }

    /// Pixels per VF design unit, horizontally and vertically
    fn scale(&self) -> (f64, f64) {
        let ds = self.vf.design_size() / FIX_UNITY;
        let (dpi_x, dpi_y) = self.vf.dpi();
        let (vf_mag_x, vf_mag_y) = self.vf.mag();

        (
            pixels_per_point(dpi_x, vf_mag_x * self.mag_x) * ds,
            pixels_per_point(dpi_y, vf_mag_y * self.mag_y) * ds,
        )
    }

    /// Position of the cursor in pixels, y up
    fn cursor_offset(&self) -> (i32, i32) {
        let (rx, ry) = self.scale();
        let top = self.stack.top();

        ((rx * top.h as f64) as i32, (-ry * top.v as f64) as i32)
    }

    fn put_char(&mut self, code_point: u32) {
        let Some(font_id) = self.stack.top().font_id else {
            return;
        };

        let Some(bitmap) = self.rasterizer.bitmap(
            font_id,
            code_point,
            self.mode,
            self.fmag * self.mag_x,
            self.fmag * self.mag_y,
        ) else {
            return;
        };

        let (off_x, off_y) = self.cursor_offset();
        self.bitmaps.put(bitmap, off_x, off_y);
    }

    fn set_char(&mut self, code_point: u32) {
        self.put_char(code_point);

        let Some(font_id) = self.stack.top().font_id else {
            return;
        };

        let Some(metric) = self
            .rasterizer
            .metric(font_id, code_point, self.fmag, self.fmag)
        else {
            return;
        };

        let design_size = self.vf.design_size();
        let dh = round_to_int(metric.mv_x / design_size * FIX_UNITY);
        let dv = round_to_int(metric.mv_y / design_size * FIX_UNITY);

        let top = self.stack.top_mut();
        top.h = top.h.wrapping_add(dh);
        top.v = top.v.wrapping_add(dv);
    }

    fn put_rule(&mut self, width: i32, height: i32) -> VfResult<()> {
        let (rx, ry) = self.scale();

        // saturating casts; anything past the pixel budget is refused below
        let bm_w = (rx * width as f64).ceil().max(1.0) as usize;
        let bm_h = (ry * height as f64).ceil().max(1.0) as usize;

        let mut rule = Bitmap::new(bm_w, bm_h)?;
        rule.fill();
        rule.off_x = 0;
        rule.off_y = bm_h as i32 - 1;

        let (off_x, off_y) = self.cursor_offset();
        self.bitmaps.put(rule, off_x, off_y);

        Ok(())
    }

    fn select_font(&mut self, f: u32) {
        let subfont = self.vf.subfonts().find(f);

        let top = self.stack.top_mut();
        top.f = f;
        top.font_id = subfont.and_then(|sf| sf.font_id);

        if subfont.is_some() {
            self.fmag = 1.0;
        }
    }
}
