pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod layout;
pub mod net;
pub mod render;
