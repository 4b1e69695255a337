use std::borrow::Cow;

use crate::data_types::{fix_to_f64, FontId};

/// A physical font referenced by a virtual font through a `fnt_def` record
#[derive(Debug, Clone, PartialEq)]
pub struct Subfont {
    /// Local font number used by `fnt` instructions
    pub k: u32,
    pub checksum: u32,
    /// Scale relative to the virtual font's design size, as a fix_word
    pub scale: u32,
    /// Design size of the subfont, as a fix_word
    pub design_size: u32,
    /// Area and name, stored back to back as read from the file
    path: Vec<u8>,
    area_len: usize,
    pub font_id: Option<FontId>,
}

impl Subfont {
    pub fn new(
        k: u32,
        checksum: u32,
        scale: u32,
        design_size: u32,
        path: Vec<u8>,
        area_len: usize,
    ) -> Self {
        Self {
            k,
            checksum,
            scale,
            design_size,
            area_len: area_len.min(path.len()),
            path,
            font_id: None,
        }
    }

    /// Directory hint for the font map, often empty
    pub fn area(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.path[..self.area_len])
    }

    pub fn name(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.path[self.area_len..])
    }

    pub fn scale_factor(&self) -> f64 {
        fix_to_f64(self.scale as i32)
    }

    pub fn is_open(&self) -> bool {
        self.font_id.is_some()
    }
}

/// Subfonts of a virtual font, in file order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubfontRegistry {
    subfonts: Vec<Subfont>,
}

impl SubfontRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, subfont: Subfont) {
        self.subfonts.push(subfont);
    }

    /// Duplicate local numbers are kept; the first in file order wins
    pub fn find(&self, k: u32) -> Option<&Subfont> {
        self.subfonts.iter().find(|sf| sf.k == k)
    }

    pub fn get(&self, idx: usize) -> Option<&Subfont> {
        self.subfonts.get(idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Subfont> {
        self.subfonts.iter()
    }

    pub fn len(&self) -> usize {
        self.subfonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subfonts.is_empty()
    }

    pub fn opened(&self) -> usize {
        self.subfonts.iter().filter(|sf| sf.is_open()).count()
    }

    /// Index of the first subfont that was opened
    pub fn default_subfont(&self) -> Option<usize> {
        self.subfonts.iter().position(Subfont::is_open)
    }
}
