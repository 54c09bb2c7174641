//! Hafalan - a terminal quiz for children memorizing the Quran
//!
//! Learners see an ayah and pick the one that follows it. Sessions track
//! streaks and timing, raise the learner's level, and record which ayahs of
//! each surah have been memorized. A voice mode checks recited answers.

pub mod app;
pub mod config;
pub mod curriculum;
pub mod game;
pub mod profile;
pub mod progress;
pub mod quiz;
pub mod scoring;
pub mod theme;
pub mod ui;
pub mod verify;
pub mod voice;

pub use app::App;
pub use config::Config;
pub use game::GameEngine;
pub use theme::Theme;
