//! Command handlers

pub mod config;
pub mod gift;
pub mod status;
