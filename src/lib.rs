pub mod app;
pub mod capture;
pub mod config;
pub mod geometry;
pub mod overlay;
pub mod platform;
pub mod writer;
