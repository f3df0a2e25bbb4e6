pub mod callbacks;
pub mod config;
pub mod errors;
pub mod reveal;
pub mod sequencer;
pub mod stage;
pub mod substep;
pub mod transcript;
pub mod ui;
pub mod views;
