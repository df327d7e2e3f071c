//! Users domain layer: entities and credentials

pub mod entities;
pub mod password;
