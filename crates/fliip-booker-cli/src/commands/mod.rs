pub mod config;
pub mod daemon;
pub mod plan;
pub mod progress;
pub mod register;
pub mod view;
