pub mod core;
pub mod fps_meter;
pub mod main;
pub mod render;
pub mod run_effect;
