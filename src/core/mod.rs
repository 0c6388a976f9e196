pub mod gfx;
pub mod input;
pub mod space;
