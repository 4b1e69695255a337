use crate::{
    bitmap::Bitmap,
    error::{VfError, VfResult},
};

/// A bitmap placed relative to the character's reference point, in pixels
/// with y increasing upward
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub bitmap: Bitmap,
    pub off_x: i32,
    pub off_y: i32,
}

// Extents are i64; offsets and sizes near the i32 limits still add up
impl Placement {
    fn left(&self) -> i64 {
        self.off_x as i64 + self.bitmap.off_x as i64
    }

    fn top(&self) -> i64 {
        self.off_y as i64 + self.bitmap.off_y as i64
    }

    fn right(&self) -> i64 {
        self.left() + self.bitmap.width() as i64 - 1
    }

    fn bottom(&self) -> i64 {
        self.top() - self.bitmap.height() as i64 + 1
    }
}

/// Bitmaps emitted while interpreting one character, in program order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitmapList {
    placements: Vec<Placement>,
}

impl BitmapList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, bitmap: Bitmap, off_x: i32, off_y: i32) {
        self.placements.push(Placement {
            bitmap,
            off_x,
            off_y,
        });
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Paints every placement into a bitmap covering their union, or `None`
    /// when nothing was placed. Painting is a union, in program order.
    ///
    /// Fails with [VfError::NoMemory] when the union is too large to
    /// allocate or its corner does not fit the bitmap's offsets
    pub fn compose(&self) -> VfResult<Option<Bitmap>> {
        let Some(first) = self.placements.first() else {
            return Ok(None);
        };

        let (mut min_x, mut max_x) = (first.left(), first.right());
        let (mut min_y, mut max_y) = (first.bottom(), first.top());

        for p in &self.placements[1..] {
            min_x = min_x.min(p.left());
            max_x = max_x.max(p.right());
            min_y = min_y.min(p.bottom());
            max_y = max_y.max(p.top());
        }

        let width = usize::try_from(max_x - min_x + 1).map_err(|_| VfError::NoMemory)?;
        let height = usize::try_from(max_y - min_y + 1).map_err(|_| VfError::NoMemory)?;

        let mut composed = Bitmap::new(width, height)?;
        composed.off_x = i32::try_from(min_x).map_err(|_| VfError::NoMemory)?;
        composed.off_y = i32::try_from(max_y).map_err(|_| VfError::NoMemory)?;

        for p in &self.placements {
            // both lie inside the union, so they are within `width`/`height`
            let x0 = (p.left() - min_x) as usize;
            let y0 = (max_y - p.top()) as usize;

            for y in 0..p.bitmap.height() {
                for x in 0..p.bitmap.width() {
                    if p.bitmap.get(x, y) {
                        composed.set(x0 + x, y0 + y);
                    }
                }
            }
        }

        Ok(Some(composed))
    }
}
