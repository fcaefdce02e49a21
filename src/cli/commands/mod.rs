//! Command handlers

pub mod config;
pub mod control;
pub mod settings;
pub mod status;
