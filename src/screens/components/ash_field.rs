use crate::core::space::Viewport;
use crate::ui::actors::Actor;
use crate::ui::color;
use glam::DVec2;
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use std::f64::consts::TAU;
use std::ops::Range;

// ---- Constants ----
pub const MAX_COUNT: usize = 120;
const PALETTE_SIZE: usize = 15;
const PALETTE_ALPHA: Range<f64> = 0.1..0.45;

/// Nothing spawns or accelerates until the clock passes this point.
const WARMUP: f64 = 1.0;
const SPAWN_INTERVAL: f64 = 0.02;
const MAX_DT: f64 = 0.05;
const ACCELERATION: f64 = 300.0;
/// Particles live between `-EDGE_MARGIN` and `width + EDGE_MARGIN`.
const EDGE_MARGIN: f64 = 20.0;

const DIAMETER: Range<f64> = 1.2..3.8;
const TARGET_SPEED: Range<f64> = 350.0..750.0;
const DRIFT: Range<f64> = -5.0..10.0;
const WAVE_SPEED: Range<f64> = 1.0..3.0;
const WAVE_HEIGHT: Range<f64> = 10.0..30.0;

const ASH_Z: i16 = -50;

/// One speck of ash. `pos.y` is the base line the speck oscillates around;
/// the drawn height adds drift and the wave.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Ash {
    pub color: [f32; 4],
    pub radius: f64,
    pub pos: DVec2,
    pub speed: f64,
    pub target_speed: f64,
    pub drift: f64,
    pub phase_offset: f64,
    pub wave_speed: f64,
    pub wave_height: f64,
}

impl Ash {
    #[inline(always)]
    pub fn drawn_y(&self, elapsed: f64) -> f64 {
        let wave = elapsed.mul_add(self.wave_speed, self.phase_offset).sin() * self.wave_height;
        self.drift.mul_add(elapsed, self.pos.y) + wave
    }
}

/// A circle ready for the drawing surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    pub center: DVec2,
    pub radius: f64,
    pub color: [f32; 4],
}

/// Opacity masks applied on top of the field, in viewport-relative units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mask {
    /// Left-to-right reveal: fully visible left of `reveal[0]`, hidden right of `reveal[1]`.
    pub reveal: [f32; 2],
    /// Vertical band: fades in from the top edge to `band[0]`, out from `band[1]` to the bottom.
    pub band: [f32; 2],
}

impl Mask {
    pub fn alpha_at(&self, u: f64, v: f64) -> f32 {
        let [r0, r1] = self.reveal.map(f64::from);
        let horizontal = if u <= r0 {
            1.0
        } else if u >= r1 {
            0.0
        } else {
            (r1 - u) / (r1 - r0)
        };

        let [top, bottom] = self.band.map(f64::from);
        let vertical = if v < 0.0 || v > 1.0 {
            0.0
        } else if v < top {
            v / top
        } else if v > bottom {
            (1.0 - v) / (1.0 - bottom)
        } else {
            1.0
        };

        (horizontal * vertical).clamp(0.0, 1.0) as f32
    }
}

pub struct State {
    pool: [Ash; MAX_COUNT],
    active: usize,
    palette: [[f32; 4]; PALETTE_SIZE],
    rng: StdRng,
    running: bool,
    last_time: Option<f64>,
    last_spawn: f64,
    elapsed: f64,
}

impl State {
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut palette = [[0.0; 4]; PALETTE_SIZE];
        for slot in &mut palette {
            let alpha = rng.random_range(PALETTE_ALPHA) as f32;
            *slot = [color::ASH_RGB[0], color::ASH_RGB[1], color::ASH_RGB[2], alpha];
        }
        Self {
            pool: [Ash::default(); MAX_COUNT],
            active: 0,
            palette,
            rng,
            running: false,
            last_time: None,
            last_spawn: 0.0,
            elapsed: 0.0,
        }
    }

    /// Resumes ticking. `now` becomes the reference for the next measured delta.
    pub fn start(&mut self, now: f64) {
        if !self.running {
            self.running = true;
            self.last_time = Some(now);
        }
    }

    /// Freezes the field; the last frame keeps being drawn.
    pub fn stop(&mut self) {
        self.running = false;
    }

    #[inline(always)]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Forgets every speck. Slots are reused from index 0 on the next spawns.
    pub fn reset(&mut self) {
        self.active = 0;
    }

    #[inline(always)]
    pub const fn active_count(&self) -> usize {
        self.active
    }

    #[inline(always)]
    pub fn particles(&self) -> &[Ash] {
        &self.pool[..self.active]
    }

    /// Measures the delta since the previous call and ticks.
    pub fn advance(&mut self, now: f64, viewport: Viewport) {
        let dt = self.last_time.map_or(0.0, |last| now - last);
        self.last_time = Some(now);
        self.tick(now, dt, viewport);
    }

    pub fn tick(&mut self, elapsed: f64, delta: f64, viewport: Viewport) {
        if !self.running {
            return;
        }
        let dt = delta.clamp(0.0, MAX_DT);
        let Viewport { width, height } = viewport;
        let height = height.max(0.0);
        self.elapsed = elapsed;

        if elapsed > WARMUP
            && self.active < MAX_COUNT
            && elapsed - self.last_spawn > SPAWN_INTERVAL
        {
            self.spawn(height);
            self.last_spawn = elapsed;
        }

        let accelerating = elapsed > WARMUP;
        for i in 0..self.active {
            let ash = &mut self.pool[i];
            if accelerating && ash.speed < ash.target_speed {
                ash.speed = ACCELERATION.mul_add(dt, ash.speed).min(ash.target_speed);
            }
            ash.pos.x += ash.speed * dt;

            if ash.pos.x > width + EDGE_MARGIN {
                ash.pos.x = -EDGE_MARGIN;
                ash.pos.y = self.rng.random_range(0.0..=height);
            }
        }
    }

    fn spawn(&mut self, height: f64) {
        let rng = &mut self.rng;
        let color = self.palette[rng.random_range(0..PALETTE_SIZE)];
        let diameter = rng.random_range(DIAMETER);
        let y = rng.random_range(0.0..=height);
        let target_speed = rng.random_range(TARGET_SPEED);
        let drift = rng.random_range(DRIFT);
        let phase_offset = rng.random_range(0.0..TAU);
        let wave_speed = rng.random_range(WAVE_SPEED);
        let wave_height = rng.random_range(WAVE_HEIGHT);

        self.pool[self.active] = Ash {
            color,
            radius: diameter / 2.0,
            pos: DVec2::new(-EDGE_MARGIN, y),
            speed: target_speed * 0.5,
            target_speed,
            drift,
            phase_offset,
            wave_speed,
            wave_height,
        };
        self.active += 1;
    }

    /// Draw commands for every live speck at the last ticked time.
    pub fn circles(&self) -> impl Iterator<Item = Circle> + '_ {
        let elapsed = self.elapsed;
        self.particles().iter().map(move |ash| Circle {
            center: DVec2::new(ash.pos.x, ash.drawn_y(elapsed)),
            radius: ash.radius,
            color: ash.color,
        })
    }

    pub fn build(&self, viewport: Viewport, mask: Mask) -> Vec<Actor> {
        let mut actors = Vec::with_capacity(self.active);
        for c in self.circles() {
            let alpha = mask.alpha_at(c.center.x / viewport.width, c.center.y / viewport.height);
            if alpha <= 0.0 {
                continue;
            }
            actors.push(Actor::circle(
                [c.center.x as f32, c.center.y as f32],
                c.radius as f32,
                color::with_alpha(c.color, alpha),
                ASH_Z,
            ));
        }
        actors
    }
}
