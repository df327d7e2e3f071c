//! API handlers for the chat domain

pub mod messages;
