use crate::core::gfx::{ObjectType, RenderList};
use crate::ui::font::Font;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use glam::Vec2;
use log::info;
use std::{
    error::Error,
    num::NonZeroU32,
    sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    },
    thread,
};
use winit::{dpi::PhysicalSize, window::Window};

pub struct State {
    _context: softbuffer::Context<Arc<Window>>,
    surface: softbuffer::Surface<Arc<Window>, Arc<Window>>,
    window_size: PhysicalSize<u32>,
}

pub fn init(window: Arc<Window>) -> Result<State, Box<dyn Error>> {
    info!("Initializing software renderer backend (softbuffer)...");

    let window_size = window.inner_size();
    let context = softbuffer::Context::new(window.clone())?;
    let surface = softbuffer::Surface::new(&context, window)?;

    Ok(State {
        _context: context,
        surface,
        window_size,
    })
}

/// Rasterizes the render list and presents it. Returns the number of
/// primitives that touched at least one pixel.
pub fn draw(state: &mut State, render_list: &RenderList<'_>) -> Result<u32, Box<dyn Error>> {
    let PhysicalSize { width, height } = state.window_size;
    let (Some(resize_w), Some(resize_h)) = (NonZeroU32::new(width), NonZeroU32::new(height))
    else {
        return Ok(0);
    };
    let w = width as usize;
    let h = height as usize;

    state.surface.resize(resize_w, resize_h)?;

    let mut buffer = state.surface.buffer_mut()?;
    let clear = pack_rgb(render_list.clear_color);
    buffer.fill(clear);

    let drawn = AtomicU32::new(0);
    let threads = thread::available_parallelism()
        .map(std::num::NonZero::get)
        .unwrap_or(1)
        .max(1);
    let use_parallel = threads > 1 && h >= 64 && render_list.objects.len() > 1;

    if use_parallel {
        let rows_per = h.div_ceil(threads);

        thread::scope(|scope| {
            let mut remainder: &mut [u32] = &mut buffer;

            for worker in 0..threads {
                let y_start = worker * rows_per;
                if y_start >= h {
                    break;
                }
                let y_end = ((worker + 1) * rows_per).min(h);
                let (stripe, rest) = remainder.split_at_mut((y_end - y_start) * w);
                remainder = rest;

                let counter = &drawn;
                scope.spawn(move || {
                    let mut stripe = Stripe {
                        pixels: stripe,
                        width: w,
                        y_start,
                        y_end,
                    };
                    let local = draw_objects(render_list, &mut stripe);
                    counter.fetch_add(local, Ordering::Relaxed);
                });
            }
        });
    } else {
        let mut stripe = Stripe {
            pixels: &mut buffer,
            width: w,
            y_start: 0,
            y_end: h,
        };
        drawn.fetch_add(draw_objects(render_list, &mut stripe), Ordering::Relaxed);
    }

    buffer.present()?;

    Ok(drawn.load(Ordering::Relaxed))
}

pub fn resize(state: &mut State, width: u32, height: u32) {
    if width == 0 || height == 0 {
        return;
    }
    state.window_size = PhysicalSize::new(width, height);
}

pub fn cleanup(_state: &mut State) {
    info!("Software renderer backend cleanup.");
}

/// A horizontal band of the framebuffer, rows `y_start..y_end`.
struct Stripe<'a> {
    pixels: &'a mut [u32],
    width: usize,
    y_start: usize,
    y_end: usize,
}

impl Stripe<'_> {
    #[inline(always)]
    fn blend(&mut self, x: usize, y: usize, color: [f32; 4], coverage: f32) {
        let idx = (y - self.y_start) * self.width + x;
        if let Some(px) = self.pixels.get_mut(idx) {
            *px = blend_over(*px, color, coverage);
        }
    }

    /// Pixel ranges whose centers fall inside `[min, max)`, limited to this stripe.
    #[inline(always)]
    fn span(&self, min: Vec2, max: Vec2) -> Option<(usize, usize, usize, usize)> {
        let x0 = (min.x - 0.5).ceil().max(0.0);
        let x1 = (max.x - 0.5).ceil().min(self.width as f32);
        let y0 = (min.y - 0.5).ceil().max(self.y_start as f32);
        let y1 = (max.y - 0.5).ceil().min(self.y_end as f32);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((x0 as usize, x1 as usize, y0 as usize, y1 as usize))
    }
}

fn draw_objects(render_list: &RenderList<'_>, stripe: &mut Stripe<'_>) -> u32 {
    let mut drawn = 0;
    for obj in &render_list.objects {
        let hit = match &obj.object_type {
            ObjectType::Rect { min, size, color } => rasterize_rect(*min, *size, *color, stripe),
            ObjectType::Circle {
                center,
                radius,
                color,
            } => rasterize_circle(*center, *radius, *color, stripe),
            ObjectType::Text {
                origin,
                text,
                font,
                zoom,
                color,
                clip,
            } => rasterize_text(text, *origin, *font, *zoom, *color, *clip, stripe),
        };
        if hit {
            drawn += 1;
        }
    }
    drawn
}

fn rasterize_rect(min: Vec2, size: Vec2, color: [f32; 4], stripe: &mut Stripe<'_>) -> bool {
    if color[3] <= 0.0 || size.x <= 0.0 || size.y <= 0.0 {
        return false;
    }
    let Some((x0, x1, y0, y1)) = stripe.span(min, min + size) else {
        return false;
    };
    for y in y0..y1 {
        for x in x0..x1 {
            stripe.blend(x, y, color, 1.0);
        }
    }
    true
}

/// Anti-aliased disc: coverage ramps over one pixel at the rim.
fn rasterize_circle(center: Vec2, radius: f32, color: [f32; 4], stripe: &mut Stripe<'_>) -> bool {
    if color[3] <= 0.0 || radius <= 0.0 {
        return false;
    }
    let reach = Vec2::splat(radius + 1.0);
    let Some((x0, x1, y0, y1)) = stripe.span(center - reach, center + reach) else {
        return false;
    };
    let mut hit = false;
    for y in y0..y1 {
        for x in x0..x1 {
            let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            let coverage = (radius + 0.5 - p.distance(center)).clamp(0.0, 1.0);
            if coverage > 0.0 {
                stripe.blend(x, y, color, coverage);
                hit = true;
            }
        }
    }
    hit
}

fn rasterize_text(
    text: &str,
    origin: Vec2,
    font: Font,
    zoom: f32,
    color: [f32; 4],
    clip: Option<[f32; 4]>,
    stripe: &mut Stripe<'_>,
) -> bool {
    if color[3] <= 0.0 || zoom <= 0.0 || text.is_empty() {
        return false;
    }
    let (clip_min, clip_max) = match clip {
        Some([x, y, w, h]) => (Vec2::new(x, y), Vec2::new(x + w, y + h)),
        None => (Vec2::splat(f32::MIN), Vec2::splat(f32::MAX)),
    };
    let [tw, th] = font.measure(text, zoom);
    let min = origin.max(clip_min);
    let max = (origin + Vec2::new(tw, th)).min(clip_max);
    if stripe.span(min, max).is_none() {
        return false;
    }

    let mut target = GlyphTarget {
        stripe,
        origin: origin.round(),
        zoom,
        color,
        clip_min,
        clip_max,
        hit: false,
    };
    let style = MonoTextStyle::new(font.mono(), BinaryColor::On);
    let Ok(_) = Text::with_baseline(text, Point::zero(), style, Baseline::Top).draw(&mut target);
    target.hit
}

/// Draw target in glyph space: each font pixel becomes a `zoom`-sized cell
/// on screen, offset by `origin`.
struct GlyphTarget<'s, 'a> {
    stripe: &'s mut Stripe<'a>,
    origin: Vec2,
    zoom: f32,
    color: [f32; 4],
    clip_min: Vec2,
    clip_max: Vec2,
    hit: bool,
}

impl GlyphTarget<'_, '_> {
    fn fill_cell(&mut self, gx: i32, gy: i32) {
        let min = self.origin + Vec2::new(gx as f32, gy as f32) * self.zoom;
        let max = min + Vec2::splat(self.zoom);
        let Some((x0, x1, y0, y1)) = self.stripe.span(min.max(self.clip_min), max.min(self.clip_max))
        else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                self.stripe.blend(x, y, self.color, 1.0);
            }
        }
        self.hit = true;
    }
}

impl OriginDimensions for GlyphTarget<'_, '_> {
    fn size(&self) -> Size {
        let w = (self.stripe.width as f32 / self.zoom).ceil() as u32;
        let h = (self.stripe.y_end as f32 / self.zoom).ceil() as u32;
        Size::new(w, h)
    }
}

impl DrawTarget for GlyphTarget<'_, '_> {
    type Color = BinaryColor;
    type Error = std::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if color.is_on() {
                self.fill_cell(point.x, point.y);
            }
        }
        Ok(())
    }
}

#[inline(always)]
fn clamp01(x: f32) -> f32 {
    if x <= 0.0 {
        0.0
    } else if x >= 1.0 {
        1.0
    } else {
        x
    }
}

/// softbuffer pixels are `0x00RRGGBB`.
#[inline(always)]
fn pack_rgb(c: [f32; 4]) -> u32 {
    let r = clamp01(c[0]).mul_add(255.0, 0.5) as u32;
    let g = clamp01(c[1]).mul_add(255.0, 0.5) as u32;
    let b = clamp01(c[2]).mul_add(255.0, 0.5) as u32;
    (r << 16) | (g << 8) | b
}

#[inline(always)]
fn unpack_rgb(px: u32) -> [f32; 3] {
    [
        ((px >> 16) & 0xFF) as f32 / 255.0,
        ((px >> 8) & 0xFF) as f32 / 255.0,
        (px & 0xFF) as f32 / 255.0,
    ]
}

#[inline(always)]
fn blend_over(dst: u32, src: [f32; 4], coverage: f32) -> u32 {
    let a = clamp01(src[3] * coverage);
    if a <= 0.0 {
        return dst;
    }
    let [dr, dg, db] = unpack_rgb(dst);
    pack_rgb([
        (src[0] - dr).mul_add(a, dr),
        (src[1] - dg).mul_add(a, dg),
        (src[2] - db).mul_add(a, db),
        1.0,
    ])
}
