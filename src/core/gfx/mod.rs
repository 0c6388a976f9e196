mod backends;

use crate::core::gfx::backends::software;
use crate::ui::font::Font;
use glam::Vec2;
use std::{borrow::Cow, error::Error, sync::Arc};
use winit::window::Window;

// --- Public Data Contract ---
#[derive(Clone, Debug)]
pub struct RenderList<'a> {
    pub clear_color: [f32; 4],
    pub objects: Vec<RenderObject<'a>>,
}

#[derive(Clone, Debug)]
pub struct RenderObject<'a> {
    pub object_type: ObjectType<'a>,
    pub z: i16,
    pub order: u32,
}

#[derive(Clone, Debug)]
pub enum ObjectType<'a> {
    Rect {
        min: Vec2,
        size: Vec2,
        color: [f32; 4],
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: [f32; 4],
    },
    Text {
        /// Top-left of the line box.
        origin: Vec2,
        text: Cow<'a, str>,
        font: Font,
        zoom: f32,
        color: [f32; 4],
        clip: Option<[f32; 4]>,
    },
}

// --- Public API Facade ---

/// A public, opaque wrapper around the rendering backend.
pub struct Backend(software::State);

impl Backend {
    pub fn draw(&mut self, render_list: &RenderList<'_>) -> Result<u32, Box<dyn Error>> {
        software::draw(&mut self.0, render_list)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        software::resize(&mut self.0, width, height);
    }

    pub fn cleanup(&mut self) {
        software::cleanup(&mut self.0);
    }
}

pub fn create_backend(window: Arc<Window>) -> Result<Backend, Box<dyn Error>> {
    Ok(Backend(software::init(window)?))
}
