use crate::grid::CanvasSize;
use crate::scramble::rand_unit;

pub const CONFETTI_PARTICLES: usize = 140;
/// How long the last frame stays up after every particle has fallen out.
pub const CONFETTI_CLEAR_DELAY_MS: u32 = 500;
const FLOOR_SLACK_PX: f32 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConfettiParticle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub size: f32,
    /// HSL hue in degrees.
    pub hue: f32,
}

/// Falling celebration particles over the board.
#[derive(Clone, Debug)]
pub struct ConfettiBurst {
    canvas: CanvasSize,
    particles: Vec<ConfettiParticle>,
}

impl ConfettiBurst {
    /// Particles start spread across the width just above the top edge.
    pub fn new(canvas: CanvasSize, seed: u32) -> Self {
        let width = canvas.width as f32;
        let particles = (0..CONFETTI_PARTICLES as u32)
            .map(|i| {
                let salt = i.wrapping_mul(6);
                ConfettiParticle {
                    x: rand_unit(seed, salt) * width,
                    y: -10.0 - rand_unit(seed, salt + 1) * 100.0,
                    vx: (rand_unit(seed, salt + 2) - 0.5) * 2.0,
                    vy: 2.0 + rand_unit(seed, salt + 3) * 3.0,
                    size: 4.0 + rand_unit(seed, salt + 4) * 4.0,
                    hue: (rand_unit(seed, salt + 5) * 360.0).floor(),
                }
            })
            .collect();
        Self { canvas, particles }
    }

    pub fn particles(&self) -> &[ConfettiParticle] {
        &self.particles
    }

    /// Advances one frame. Returns false once every particle is below the board.
    pub fn step(&mut self) -> bool {
        for particle in &mut self.particles {
            particle.x += particle.vx;
            particle.y += particle.vy;
        }
        !self.finished()
    }

    pub fn finished(&self) -> bool {
        let floor = self.canvas.height as f32 + FLOOR_SLACK_PX;
        self.particles.iter().all(|particle| particle.y >= floor)
    }
}
