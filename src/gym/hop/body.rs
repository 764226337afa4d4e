/// The agent-controlled circle. `x` stays fixed, only the vertical axis moves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub x: f32,
    pub y: f32,
    /// Vertical velocity in pixels per reference frame, positive is downward
    pub velocity: f32,
    pub radius: f32,
}

impl Body {
    pub fn new(x: f32, y: f32, radius: f32) -> Self {
        Self {
            x,
            y,
            velocity: 0.0,
            radius,
        }
    }

    pub fn is_rising(&self) -> bool {
        self.velocity < 0.0
    }

    /// Left edge, the last part of the body to clear an obstacle
    pub fn trailing_edge(&self) -> f32 {
        self.x - self.radius
    }

    /// Advance by `scale` reference frames: position first, then gravity
    pub(crate) fn integrate(&mut self, gravity: f32, scale: f32) {
        self.y += self.velocity * scale;
        self.velocity += gravity * scale;
    }

    /// Whether the circle overlaps the axis-aligned rectangle `[x0, x1] x [y0, y1]`
    pub fn overlaps_rect(&self, x0: f32, y0: f32, x1: f32, y1: f32) -> bool {
        if x1 <= x0 || y1 <= y0 {
            return false;
        }
        let closest_x = self.x.clamp(x0, x1);
        let closest_y = self.y.clamp(y0, y1);
        let (dx, dy) = (self.x - closest_x, self.y - closest_y);
        dx * dx + dy * dy < self.radius * self.radius
    }
}
