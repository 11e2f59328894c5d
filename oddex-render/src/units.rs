/// Conversion between height units (origin at the screen center, +y up,
/// one unit = window height) and pixel coordinates (origin top-left,
/// +y down).
#[derive(Copy, Clone, Debug)]
pub struct Units {
    width: u32,
    height: u32,
}

impl Units {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Center point in pixels for a position in height units.
    pub fn to_px(&self, pos: (f32, f32)) -> (f32, f32) {
        let h = self.height as f32;
        (
            self.width as f32 * 0.5 + pos.0 * h,
            self.height as f32 * 0.5 - pos.1 * h,
        )
    }

    /// Length in pixels for a length in height units.
    pub fn len_px(&self, len: f32) -> f32 {
        len * self.height as f32
    }

    /// Inverse mapping, used for the mouse cursor.
    pub fn from_px(&self, px: (f32, f32)) -> (f32, f32) {
        let h = self.height as f32;
        (
            (px.0 - self.width as f32 * 0.5) / h,
            (self.height as f32 * 0.5 - px.1) / h,
        )
    }
}
