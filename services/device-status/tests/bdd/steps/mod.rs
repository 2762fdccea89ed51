//! BDD step definitions for device status service

pub mod rendering_steps;
pub mod stream_steps;
