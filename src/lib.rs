//! Menu-bar power toggles for smart-home devices, backed by an external
//! helper CLI that owns the actual HomeKit session.

pub mod bridge;
pub mod config;
pub mod device;
pub mod menu;
