pub mod components;
pub mod credits;
pub mod menu;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenAction {
    None,
    /// Leave the application once the current frame is done.
    Exit,
}
