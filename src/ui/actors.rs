use crate::ui::font::Font;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAlign {
    #[default]
    Center,
    Right,
}

impl TextAlign {
    /// Fraction of the line width that sits left of the anchor.
    #[inline(always)]
    pub const fn pivot(self) -> f32 {
        match self {
            Self::Center => 0.5,
            Self::Right => 1.0,
        }
    }
}

#[derive(Clone, Debug)]
pub enum Actor {
    /// Solid axis-aligned rectangle, top-left at `offset`.
    Quad {
        offset: [f32; 2],
        size: [f32; 2],
        color: [f32; 4],
        z: i16,
    },

    /// Filled circle.
    Circle {
        center: [f32; 2],
        radius: f32,
        color: [f32; 4],
        z: i16,
    },

    /// Single line of bitmap text anchored at `offset`.
    Text {
        offset: [f32; 2],
        /// Vertical pivot inside the line box (0 = top, 1 = bottom).
        valign: f32,
        align_text: TextAlign,
        color: [f32; 4],
        font: Font,
        zoom: f32,
        content: &'static str,
        /// Clip rect in screen space: [x, y, w, h].
        clip: Option<[f32; 4]>,
        z: i16,
    },

    /// Group box: children are offset by `offset` and faded by `alpha`.
    Frame {
        offset: [f32; 2],
        alpha: f32,
        children: Vec<Self>,
        z: i16,
    },
}

impl Actor {
    #[inline(always)]
    pub fn quad(offset: [f32; 2], size: [f32; 2], color: [f32; 4], z: i16) -> Self {
        Self::Quad {
            offset,
            size,
            color,
            z,
        }
    }

    #[inline(always)]
    pub fn circle(center: [f32; 2], radius: f32, color: [f32; 4], z: i16) -> Self {
        Self::Circle {
            center,
            radius,
            color,
            z,
        }
    }

    pub fn text(
        content: &'static str,
        offset: [f32; 2],
        font: Font,
        zoom: f32,
        color: [f32; 4],
        z: i16,
    ) -> Self {
        Self::Text {
            offset,
            valign: 0.0,
            align_text: TextAlign::Center,
            color,
            font,
            zoom,
            content,
            clip: None,
            z,
        }
    }

    #[inline(always)]
    pub fn frame(offset: [f32; 2], alpha: f32, children: Vec<Self>, z: i16) -> Self {
        Self::Frame {
            offset,
            alpha,
            children,
            z,
        }
    }

    /// Restricts a text actor to `rect`; other actors are returned unchanged.
    #[must_use]
    pub fn clipped(mut self, rect: [f32; 4]) -> Self {
        if let Self::Text { clip, .. } = &mut self {
            *clip = Some(rect);
        }
        self
    }

    #[must_use]
    pub fn aligned(mut self, align: TextAlign, v: f32) -> Self {
        if let Self::Text {
            align_text, valign, ..
        } = &mut self
        {
            *align_text = align;
            *valign = v;
        }
        self
    }
}
