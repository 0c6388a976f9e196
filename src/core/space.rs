/// Size of the drawable area in physical pixels.
///
/// Window systems report a zero size while minimized or before the first
/// configure; callers re-read the viewport every frame and fall back to the
/// configured display size when a dimension is not positive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    #[inline(always)]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    #[inline(always)]
    pub fn or_fallback(self, fallback: Self) -> Self {
        Self {
            width: if self.width > 0.0 { self.width } else { fallback.width },
            height: if self.height > 0.0 { self.height } else { fallback.height },
        }
    }

    #[inline(always)]
    pub fn center_x(&self) -> f64 {
        self.width * 0.5
    }

    #[inline(always)]
    pub fn center_y(&self) -> f64 {
        self.height * 0.5
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Metrics {
    pub viewport: Viewport,
    pub fallback: Viewport,
}

pub fn metrics_for_window(width: u32, height: u32, fallback: Viewport) -> Metrics {
    Metrics {
        viewport: Viewport::new(f64::from(width), f64::from(height)).or_fallback(fallback),
        fallback,
    }
}
