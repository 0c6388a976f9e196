/* ------------------------------ easing ------------------------------ */

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Ease {
    #[default]
    Linear,
    /// Fast start, slow finish.
    Decelerate,
    /// Slow start, fast finish.
    Accelerate,
}

impl Ease {
    #[inline(always)]
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::Decelerate => 1.0 - (1.0 - t) * (1.0 - t),
            Self::Accelerate => t * t,
        }
    }
}

#[inline(always)]
fn lerp(a: f32, b: f32, t: f64) -> f32 {
    if t >= 1.0 {
        return b;
    }
    (b - a).mul_add(t as f32, a)
}

/* ------------------------------ tween ------------------------------ */

/// A single value animated from `from` to `to` over `duration` seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tween {
    from: f32,
    to: f32,
    duration: f64,
    elapsed: f64,
    ease: Ease,
}

impl Tween {
    pub fn new(from: f32, to: f32, duration: f64, ease: Ease) -> Self {
        Self {
            from,
            to,
            duration,
            elapsed: 0.0,
            ease,
        }
    }

    #[inline(always)]
    pub fn step(&mut self, dt: f64) {
        if dt > 0.0 {
            self.elapsed = (self.elapsed + dt).min(self.duration.max(0.0));
        }
    }

    #[inline(always)]
    pub fn progress(&self) -> f64 {
        if self.duration <= 0.0 {
            1.0
        } else {
            self.elapsed / self.duration
        }
    }

    #[inline(always)]
    pub fn value(&self) -> f32 {
        lerp(self.from, self.to, self.ease.apply(self.progress()))
    }

    #[inline(always)]
    pub fn finished(&self) -> bool {
        self.progress() >= 1.0
    }
}

/* ---------------------------- storyboard ---------------------------- */

/// Something a storyboard can drive, addressed by a property key.
pub trait Animate<P> {
    fn get(&self, prop: P) -> f32;
    fn set(&mut self, prop: P, value: f32);
}

#[derive(Clone, Copy, Debug)]
pub struct Track<P> {
    pub prop: P,
    pub to: f32,
    pub begin: f64,
    pub duration: f64,
    pub ease: Ease,
}

pub const fn track<P>(prop: P, to: f32, begin: f64, duration: f64, ease: Ease) -> Track<P> {
    Track {
        prop,
        to,
        begin,
        duration,
        ease,
    }
}

/// A fixed set of tracks played against a target. Each track animates from
/// whatever value its property holds when the track begins.
#[derive(Clone, Debug)]
pub struct Storyboard<P: 'static> {
    tracks: &'static [Track<P>],
    from: Vec<Option<f32>>,
    elapsed: f64,
}

impl<P: Copy> Storyboard<P> {
    pub fn new(tracks: &'static [Track<P>]) -> Self {
        Self {
            tracks,
            from: vec![None; tracks.len()],
            elapsed: 0.0,
        }
    }

    pub fn duration(&self) -> f64 {
        self.tracks
            .iter()
            .map(|t| t.begin + t.duration.max(0.0))
            .fold(0.0, f64::max)
    }

    /// Advances the storyboard and writes every started track into `target`.
    /// Returns `true` once the last track has completed.
    pub fn step<T: Animate<P>>(&mut self, target: &mut T, dt: f64) -> bool {
        if dt > 0.0 {
            self.elapsed += dt;
        }
        for (track, from) in self.tracks.iter().zip(self.from.iter_mut()) {
            if self.elapsed < track.begin {
                continue;
            }
            let start = *from.get_or_insert_with(|| target.get(track.prop));
            let t = if track.duration <= 0.0 {
                1.0
            } else {
                (self.elapsed - track.begin) / track.duration
            };
            target.set(track.prop, lerp(start, track.to, track.ease.apply(t)));
        }
        self.elapsed >= self.duration()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum Knob {
        A,
        B,
    }

    #[derive(Default)]
    struct Panel {
        a: f32,
        b: f32,
    }

    impl Animate<Knob> for Panel {
        fn get(&self, prop: Knob) -> f32 {
            match prop {
                Knob::A => self.a,
                Knob::B => self.b,
            }
        }
        fn set(&mut self, prop: Knob, value: f32) {
            match prop {
                Knob::A => self.a = value,
                Knob::B => self.b = value,
            }
        }
    }

    static TRACKS: [Track<Knob>; 2] = [
        track(Knob::A, 1.0, 0.0, 1.0, Ease::Linear),
        track(Knob::B, 10.0, 1.0, 2.0, Ease::Linear),
    ];

    #[test]
    fn tween_clamps_at_target() {
        let mut t = Tween::new(0.0, 1.0, 1.0, Ease::Linear);
        t.step(0.25);
        assert!((t.value() - 0.25).abs() < 1e-6);
        t.step(5.0);
        assert!(t.finished());
        assert_eq!(t.value(), 1.0);
    }

    #[test]
    fn zero_length_tween_is_already_done() {
        let t = Tween::new(0.0, 1.0, 0.0, Ease::Decelerate);
        assert!(t.finished());
        assert_eq!(t.value(), 1.0);
    }

    #[test]
    fn late_tracks_capture_their_start_value_when_they_begin() {
        let mut panel = Panel { a: 0.0, b: 4.0 };
        let mut sb = Storyboard::new(&TRACKS);
        assert_eq!(sb.duration(), 3.0);

        assert!(!sb.step(&mut panel, 0.5));
        assert!((panel.a - 0.5).abs() < 1e-6);
        assert_eq!(panel.b, 4.0);

        // Something else moves B before its track starts; the track picks that up.
        panel.b = 6.0;
        assert!(!sb.step(&mut panel, 1.5));
        assert_eq!(panel.a, 1.0);
        assert!((panel.b - 8.0).abs() < 1e-5);

        assert!(sb.step(&mut panel, 1.0));
        assert_eq!(panel.b, 10.0);
    }

    #[test]
    fn easing_endpoints_are_fixed() {
        for ease in [Ease::Linear, Ease::Decelerate, Ease::Accelerate] {
            assert_eq!(ease.apply(0.0), 0.0);
            assert_eq!(ease.apply(1.0), 1.0);
        }
        assert!(Ease::Decelerate.apply(0.5) > 0.5);
        assert!(Ease::Accelerate.apply(0.5) < 0.5);
    }
}
