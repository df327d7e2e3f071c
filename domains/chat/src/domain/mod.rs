//! Chat domain layer: entities, lifecycle, continuation policy, prompt assembly

pub mod entities;
pub mod prompt;
pub mod resolver;
pub mod state;
