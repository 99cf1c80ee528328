pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod notice;
pub mod render;
pub mod services;
pub mod util;
