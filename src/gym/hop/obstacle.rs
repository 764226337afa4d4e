use super::body::Body;

/// A scrolling pair of rectangles with a vertical gap between them
///
/// The top rectangle spans `[0, gap_top]`, the bottom one `[gap_top + gap, height]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub x: f32,
    pub width: f32,
    pub gap_top: f32,
    pub gap: f32,
    /// The pass reward was granted this cycle
    pub(crate) passed: bool,
    /// The gap-center proximity bonus was granted this cycle
    pub(crate) proximity_granted: bool,
    /// The collision penalty was applied this cycle
    pub(crate) collided: bool,
}

impl Obstacle {
    pub fn new(x: f32, width: f32, gap_top: f32, gap: f32) -> Self {
        Self {
            x,
            width,
            gap_top,
            gap,
            passed: false,
            proximity_granted: false,
            collided: false,
        }
    }

    pub fn gap_bottom(&self) -> f32 {
        self.gap_top + self.gap
    }

    pub fn gap_center(&self) -> f32 {
        self.gap_top + self.gap / 2.0
    }

    pub fn trailing_edge(&self) -> f32 {
        self.x + self.width
    }

    pub fn has_collided(&self) -> bool {
        self.collided
    }

    /// Fully scrolled past the left edge of the canvas
    pub fn is_off_screen(&self) -> bool {
        self.trailing_edge() < 0.0
    }

    /// The body has not yet fully cleared this obstacle
    pub fn is_ahead_of(&self, body: &Body) -> bool {
        self.trailing_edge() >= body.trailing_edge()
    }

    pub fn collides(&self, body: &Body, height: f32) -> bool {
        let x1 = self.trailing_edge();
        body.overlaps_rect(self.x, 0.0, x1, self.gap_top)
            || body.overlaps_rect(self.x, self.gap_bottom(), x1, height)
    }

    /// Start a new cycle at `x` with a new gap, clearing every latch
    pub(crate) fn respawn(&mut self, x: f32, gap_top: f32) {
        *self = Self::new(x, self.width, gap_top, self.gap);
    }
}
