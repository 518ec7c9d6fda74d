// Library surface for the kiosk binary, headless autoplay and integration tests.
// Terminal drawing stays in main.rs.
pub mod autoplay;
pub mod challenge;
pub mod config;
pub mod error;
pub mod flow;
pub mod host;
pub mod runtime;
pub mod scene;
pub mod selection;
pub mod timers;
pub mod variant;
