use ratatui::{
    prelude::*,
    widgets::{
        canvas::{Canvas, Circle, Line as CanvasLine, Rectangle},
        *,
    },
};

use crate::{
    driver::Scene,
    gym::hop::{Body, Obstacle},
};

/// Owned copy of a [`Scene`], kept between frames
pub struct Arena {
    width: f64,
    height: f64,
    center_line: f64,
    target: f64,
    body: Body,
    obstacles: Vec<Obstacle>,
    score: u32,
    high_score: u32,
}

impl Arena {
    pub fn capture(scene: &Scene<'_>) -> Self {
        Self {
            width: scene.config.width.into(),
            height: scene.config.height.into(),
            center_line: scene.config.center_line.into(),
            target: scene.target.into(),
            body: *scene.body,
            obstacles: scene.obstacles.to_vec(),
            score: scene.score,
            high_score: scene.high_score,
        }
    }

    /// Simulation y grows downward, canvas y grows upward
    fn flip(&self, y: impl Into<f64>) -> f64 {
        self.height - y.into()
    }
}

impl Widget for &Arena {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = format!(" Score {} | High {} ", self.score, self.high_score);
        Canvas::default()
            .block(
                Block::bordered()
                    .border_type(BorderType::Rounded)
                    .title("Arena")
                    .title_bottom(title.bold()),
            )
            .marker(Marker::Braille)
            .x_bounds([0.0, self.width])
            .y_bounds([0.0, self.height])
            .paint(|ctx| {
                ctx.draw(&CanvasLine {
                    x1: 0.0,
                    y1: self.flip(self.center_line),
                    x2: self.width,
                    y2: self.flip(self.center_line),
                    color: Color::DarkGray,
                });
                if self.target != self.center_line {
                    ctx.draw(&CanvasLine {
                        x1: 0.0,
                        y1: self.flip(self.target),
                        x2: self.width,
                        y2: self.flip(self.target),
                        color: Color::Green,
                    });
                }

                for obstacle in &self.obstacles {
                    let color = if obstacle.has_collided() {
                        Color::LightRed
                    } else {
                        Color::Cyan
                    };
                    let (x, width) = (obstacle.x.into(), obstacle.width.into());
                    ctx.draw(&Rectangle {
                        x,
                        y: self.flip(obstacle.gap_top),
                        width,
                        height: obstacle.gap_top.into(),
                        color,
                    });
                    ctx.draw(&Rectangle {
                        x,
                        y: 0.0,
                        width,
                        height: self.flip(obstacle.gap_bottom()),
                        color,
                    });
                }

                ctx.draw(&Circle {
                    x: self.body.x.into(),
                    y: self.flip(self.body.y),
                    radius: self.body.radius.into(),
                    color: if self.body.is_rising() {
                        Color::LightYellow
                    } else {
                        Color::Yellow
                    },
                });
            })
            .render(area, buf);
    }
}
