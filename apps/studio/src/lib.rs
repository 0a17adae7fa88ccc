pub mod config;
pub mod editor;
pub mod errors;
pub mod export;
pub mod layout;
pub mod models;
pub mod notify;
pub mod render;
pub mod state;
