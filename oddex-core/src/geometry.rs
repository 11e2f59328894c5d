/// Axis-aligned box in normalized "height" units: origin at the screen
/// center, +y up, one unit equals the window height. A 16:9 display spans
/// roughly x in [-0.89, 0.89] and y in [-0.5, 0.5].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds {
    pub center: (f32, f32),
    pub size: (f32, f32),
}

impl Bounds {
    pub fn new(center: (f32, f32), size: (f32, f32)) -> Self {
        Self { center, size }
    }

    pub fn contains(&self, point: (f32, f32)) -> bool {
        let (hx, hy) = (self.size.0 * 0.5, self.size.1 * 0.5);
        (point.0 - self.center.0).abs() <= hx && (point.1 - self.center.1).abs() <= hy
    }
}
