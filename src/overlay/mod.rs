/// Floating capture button injected into web pages
pub mod controller;
pub mod drag;
pub mod lifecycle;
pub mod status;

pub use controller::start;
