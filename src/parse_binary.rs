/// Generic trait for parsing big-endian binary formats
///
/// Reads past the end of the buffer yield `0` rather than an error and set a
/// sticky truncation flag, which callers inspect when truncation matters to
/// them.
pub trait BinaryParser {
    fn buffer(&self) -> &[u8];
    fn cursor(&self) -> usize;
    fn cursor_mut(&mut self) -> &mut usize;
    fn mark_truncated(&mut self);
    fn is_truncated(&self) -> bool;

    fn next(&mut self) -> Option<u8> {
        let b = self.buffer().get(self.cursor()).copied();
        match b {
            Some(..) => *self.cursor_mut() += 1,
            None => self.mark_truncated(),
        }
        b
    }

    fn peek(&self) -> Option<u8> {
        self.buffer().get(self.cursor()).copied()
    }

    /// Reads an unsigned `n` byte integer, `n` in `1..=4`
    fn read_uint(&mut self, n: usize) -> u32 {
        debug_assert!((1..=4).contains(&n));

        let mut v = 0u32;
        for _ in 0..n {
            let Some(b) = self.next() else {
                return 0;
            };
            v = (v << 8) | b as u32;
        }

        v
    }

    /// Reads a signed `n` byte integer, sign extended from the first byte
    fn read_int(&mut self, n: usize) -> i32 {
        debug_assert!((1..=4).contains(&n));

        let Some(first) = self.next() else {
            return 0;
        };

        let mut v = first as i8 as i32;
        for _ in 1..n {
            let Some(b) = self.next() else {
                return 0;
            };
            v = v.wrapping_shl(8) | b as i32;
        }

        v
    }

    fn read_u8(&mut self) -> u8 {
        self.read_uint(1) as u8
    }

    fn read_u16(&mut self) -> u16 {
        self.read_uint(2) as u16
    }

    fn read_u32(&mut self) -> u32 {
        self.read_uint(4)
    }

    fn read_i32(&mut self) -> i32 {
        self.read_int(4)
    }

    fn skip(&mut self, n: usize) {
        let end = self.cursor().saturating_add(n);
        if end > self.buffer().len() {
            self.mark_truncated();
        }
        *self.cursor_mut() = end.min(self.buffer().len());
    }

    fn read_bytes(&mut self, n: usize) -> &[u8] {
        let start = self.cursor();
        self.skip(n);
        let end = self.cursor();
        &self.buffer()[start..end]
    }
}

/// Decodes an unsigned `n` byte integer from the start of `buf` without
/// consuming anything
pub fn get_uint(buf: &[u8], n: usize) -> Option<u32> {
    debug_assert!((1..=4).contains(&n));

    let bytes = buf.get(..n)?;

    Some(bytes.iter().fold(0u32, |v, &b| (v << 8) | b as u32))
}

/// Decodes a signed `n` byte integer from the start of `buf`, sign extended
/// from the first byte
pub fn get_int(buf: &[u8], n: usize) -> Option<i32> {
    debug_assert!((1..=4).contains(&n));

    let (&first, rest) = buf.get(..n)?.split_first()?;

    Some(
        rest.iter()
            .fold(first as i8 as i32, |v, &b| v.wrapping_shl(8) | b as i32),
    )
}

/// Cursor over an in-memory byte buffer
#[derive(Debug)]
pub struct ByteStream<'a> {
    buffer: &'a [u8],
    cursor: usize,
    truncated: bool,
}

impl<'a> ByteStream<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            cursor: 0,
            truncated: false,
        }
    }

    pub fn at(buffer: &'a [u8], cursor: usize) -> Self {
        Self {
            buffer,
            cursor: cursor.min(buffer.len()),
            truncated: cursor > buffer.len(),
        }
    }
}

impl BinaryParser for ByteStream<'_> {
    fn buffer(&self) -> &[u8] {
        self.buffer
    }
    fn cursor(&self) -> usize {
        self.cursor
    }
    fn cursor_mut(&mut self) -> &mut usize {
        &mut self.cursor
    }
    fn mark_truncated(&mut self) {
        self.truncated = true;
    }
    fn is_truncated(&self) -> bool {
        self.truncated
    }
}
