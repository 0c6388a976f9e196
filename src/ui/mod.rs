pub mod actors;
pub mod color;
pub mod compose;
pub mod font;
pub mod storyboard;
