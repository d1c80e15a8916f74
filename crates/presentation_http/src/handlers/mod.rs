//! HTTP request handlers

pub mod analysis;
pub mod diff;
pub mod health;
pub mod moderation;
