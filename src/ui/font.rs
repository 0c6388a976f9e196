use embedded_graphics::mono_font::MonoFont;
use embedded_graphics::mono_font::iso_8859_2::{FONT_6X13, FONT_10X20};

/// Bitmap faces available to text actors.
///
/// Both come from the ISO-8859-2 set so the Hungarian credits (ő, ű, á, ...)
/// render without substitution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Font {
    Small,
    #[default]
    Regular,
}

impl Font {
    #[inline(always)]
    pub fn mono(self) -> &'static MonoFont<'static> {
        match self {
            Self::Small => &FONT_6X13,
            Self::Regular => &FONT_10X20,
        }
    }

    /// Horizontal advance of one glyph at zoom 1.
    #[inline(always)]
    pub fn advance(self) -> f32 {
        let m = self.mono();
        (m.character_size.width + m.character_spacing) as f32
    }

    #[inline(always)]
    pub fn line_height(self) -> f32 {
        self.mono().character_size.height as f32
    }

    /// Width and height of a single line of text at `zoom`.
    pub fn measure(self, text: &str, zoom: f32) -> [f32; 2] {
        let glyphs = text.chars().count();
        if glyphs == 0 {
            return [0.0, self.line_height() * zoom];
        }
        let spacing = self.mono().character_spacing as f32;
        let w = self.advance().mul_add(glyphs as f32, -spacing);
        [w * zoom, self.line_height() * zoom]
    }
}
