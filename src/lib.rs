//! Hepato Risk — hepatic cancer risk prediction over HTTP.

pub mod api;
pub mod assets;
pub mod config;
pub mod error;
pub mod features;
pub mod inference;
