pub mod ash_field;
pub mod menu_visuals;
