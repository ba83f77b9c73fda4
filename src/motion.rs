use crate::config::{MotionConfig, PulseConfig};
use glam::Vec2;
use std::time::Duration;

/// Scale for a point in the pulse cycle: a symmetric triangle from 1 up to
/// `max_scale` at half period and back down to 1.
pub fn pulse_scale(elapsed_ms: u64, period_ms: u64, max_scale: f32) -> f32 {
    if period_ms == 0 {
        return 1.0;
    }
    let phase = (elapsed_ms % period_ms) as f32 / period_ms as f32;
    let amplitude = max_scale - 1.0;
    if phase < 0.5 {
        1.0 + (phase / 0.5) * amplitude
    } else {
        max_scale - ((phase - 0.5) / 0.5) * amplitude
    }
}

/// Bounce physics plus the pulse accumulator.
#[derive(Debug, Clone)]
pub struct Motion {
    position: Vec2,
    velocity: Vec2,
    pulse_elapsed_ms: u64,
    scale: f32,
    size: f32,
    min_x: f32,
    max_x: f32,
    min_y: f32,
    bottom_margin: f32,
    fallback_viewport_height: f32,
    pulse: PulseConfig,
}

impl Motion {
    pub fn new(motion: &MotionConfig, pulse: &PulseConfig) -> Self {
        Self {
            position: motion.start_position(),
            velocity: motion.start_velocity(),
            pulse_elapsed_ms: 0,
            scale: 1.0,
            size: motion.size,
            min_x: motion.min_x,
            max_x: motion.max_x,
            min_y: motion.min_y,
            bottom_margin: motion.bottom_margin,
            fallback_viewport_height: motion.fallback_viewport_height,
            pulse: pulse.clone(),
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn pulse_elapsed_ms(&self) -> u64 {
        self.pulse_elapsed_ms
    }

    /// Faces left whenever horizontal speed is not positive.
    pub fn facing_left(&self) -> bool {
        self.velocity.x <= 0.0
    }

    /// Lower edge for `y`. A missing estimate uses the fallback height, and the
    /// estimate never shrinks the surface below it.
    pub fn max_y(&self, viewport_height: Option<f32>) -> f32 {
        let height = viewport_height.unwrap_or(self.fallback_viewport_height).max(self.fallback_viewport_height);
        (height - self.size - self.bottom_margin).max(self.min_y)
    }

    /// Called on entry into bounce mode.
    pub fn reset_pulse(&mut self) {
        self.pulse_elapsed_ms = 0;
        self.scale = 1.0;
    }

    /// Back to identity scale once bounce mode ends. Position and velocity are kept.
    pub fn settle(&mut self) {
        self.scale = 1.0;
    }

    /// One bounce tick: move, reflect off the bounds, advance the pulse.
    pub fn step(&mut self, dt: Duration, viewport_height: Option<f32>) {
        self.position += self.velocity;

        // Reflect only while still heading out of bounds so a bound that moves
        // past the cat cannot flip the sign back and forth.
        let Vec2 { x, y } = self.position;
        if (x > self.max_x && self.velocity.x > 0.0) || (x < self.min_x && self.velocity.x < 0.0) {
            self.velocity.x = -self.velocity.x;
        }
        let max_y = self.max_y(viewport_height);
        if (y > max_y && self.velocity.y > 0.0) || (y < self.min_y && self.velocity.y < 0.0) {
            self.velocity.y = -self.velocity.y;
        }

        self.pulse_elapsed_ms += dt.as_millis() as u64;
        self.scale = pulse_scale(self.pulse_elapsed_ms, self.pulse.period_ms, self.pulse.max_scale);
    }
}
