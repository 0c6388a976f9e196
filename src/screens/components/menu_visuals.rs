use crate::screens::components::ash_field::Mask;
use crate::ui::storyboard::{Animate, Ease, Track, track};

/// Everything the menu animates between idle, intro and outro.
///
/// Reveal stops are fractions of the viewport width, band stops fractions of
/// its height.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Visuals {
    pub ash_reveal: [f32; 2],
    pub ash_band: [f32; 2],
    pub title_reveal: [f32; 2],
    pub cover: f32,
    pub menu_opacity: f32,
    pub out_cover: f32,
    pub title_y: f32,
    pub menu_x: f32,
    pub title_scale: f32,
}

impl Default for Visuals {
    fn default() -> Self {
        Self::IDLE
    }
}

impl Visuals {
    pub const IDLE: Self = Self {
        ash_reveal: [-0.3, 0.0],
        ash_band: [0.4, 0.6],
        title_reveal: [-0.3, 0.0],
        cover: 1.0,
        menu_opacity: 0.0,
        out_cover: 0.0,
        title_y: 0.0,
        menu_x: -60.0,
        title_scale: 1.1,
    };

    /// Back to the pre-intro look.
    pub fn reset(&mut self) {
        *self = Self::IDLE;
    }

    pub const fn ash_mask(&self) -> Mask {
        Mask {
            reveal: self.ash_reveal,
            band: self.ash_band,
        }
    }

    /// Visible fraction of a line spanning `[0, 1]` under a left-to-right
    /// reveal, treating the midpoint of the two stops as the cut.
    pub fn title_visible_fraction(&self) -> f32 {
        let [a, b] = self.title_reveal;
        (0.5 * (a + b)).clamp(0.0, 1.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Prop {
    AshRevealStart,
    AshRevealEnd,
    AshBandTop,
    AshBandBottom,
    TitleRevealStart,
    TitleRevealEnd,
    Cover,
    MenuOpacity,
    OutCover,
    TitleY,
    MenuX,
    TitleScale,
}

impl Animate<Prop> for Visuals {
    fn get(&self, prop: Prop) -> f32 {
        match prop {
            Prop::AshRevealStart => self.ash_reveal[0],
            Prop::AshRevealEnd => self.ash_reveal[1],
            Prop::AshBandTop => self.ash_band[0],
            Prop::AshBandBottom => self.ash_band[1],
            Prop::TitleRevealStart => self.title_reveal[0],
            Prop::TitleRevealEnd => self.title_reveal[1],
            Prop::Cover => self.cover,
            Prop::MenuOpacity => self.menu_opacity,
            Prop::OutCover => self.out_cover,
            Prop::TitleY => self.title_y,
            Prop::MenuX => self.menu_x,
            Prop::TitleScale => self.title_scale,
        }
    }

    fn set(&mut self, prop: Prop, value: f32) {
        let slot = match prop {
            Prop::AshRevealStart => &mut self.ash_reveal[0],
            Prop::AshRevealEnd => &mut self.ash_reveal[1],
            Prop::AshBandTop => &mut self.ash_band[0],
            Prop::AshBandBottom => &mut self.ash_band[1],
            Prop::TitleRevealStart => &mut self.title_reveal[0],
            Prop::TitleRevealEnd => &mut self.title_reveal[1],
            Prop::Cover => &mut self.cover,
            Prop::MenuOpacity => &mut self.menu_opacity,
            Prop::OutCover => &mut self.out_cover,
            Prop::TitleY => &mut self.title_y,
            Prop::MenuX => &mut self.menu_x,
            Prop::TitleScale => &mut self.title_scale,
        };
        *slot = value;
    }
}

/* ---------------------------- storyboards ---------------------------- */

pub static INTRO: [Track<Prop>; 11] = [
    track(Prop::Cover, 0.0, 0.0, 1.5, Ease::Linear),
    track(Prop::AshRevealStart, 1.0, 0.5, 2.5, Ease::Decelerate),
    track(Prop::AshRevealEnd, 1.3, 0.5, 2.5, Ease::Decelerate),
    track(Prop::AshBandTop, 0.0, 1.0, 2.0, Ease::Decelerate),
    track(Prop::AshBandBottom, 1.0, 1.0, 2.0, Ease::Decelerate),
    track(Prop::TitleRevealStart, 1.0, 1.0, 1.5, Ease::Linear),
    track(Prop::TitleRevealEnd, 1.3, 1.0, 1.5, Ease::Linear),
    track(Prop::TitleScale, 1.0, 1.0, 2.0, Ease::Decelerate),
    track(Prop::TitleY, -140.0, 2.5, 1.0, Ease::Decelerate),
    track(Prop::MenuX, 0.0, 3.5, 1.0, Ease::Decelerate),
    track(Prop::MenuOpacity, 1.0, 3.5, 1.0, Ease::Linear),
];

pub static OUTRO: [Track<Prop>; 4] = [
    track(Prop::MenuOpacity, 0.0, 0.0, 0.4, Ease::Linear),
    track(Prop::TitleRevealStart, -0.3, 0.2, 0.8, Ease::Accelerate),
    track(Prop::TitleRevealEnd, 0.0, 0.2, 0.8, Ease::Accelerate),
    track(Prop::OutCover, 1.0, 0.6, 1.0, Ease::Linear),
];
