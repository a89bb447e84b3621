pub mod artifact;
pub mod config;
pub mod error;
pub mod media_models;
pub mod notification;
pub mod state;
pub mod view;
