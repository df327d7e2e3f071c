//! API handlers for the users domain

pub mod auth;
