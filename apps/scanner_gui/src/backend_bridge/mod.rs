//! Bridge between the UI command queue and the backend worker.

pub mod commands;
pub mod runtime;
