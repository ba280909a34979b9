pub mod commands;
pub mod item;
pub mod model;
pub mod platform;
pub mod spec;
