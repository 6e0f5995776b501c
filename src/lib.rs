//! Video library backed by a managed blob store: a listing API that groups
//! videos by their numbered category folders, plus operator commands to
//! compress, upload, list and clear the library.

pub mod blob;
pub mod commands;
pub mod config;
pub mod error;
pub mod ffmpeg;
pub mod files;
pub mod handlers;
pub mod listing;
pub mod models;
pub mod server;
pub mod system_info;
