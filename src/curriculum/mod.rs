//! Curriculum data and loading

pub mod model;
pub mod storage;

pub use model::{Ayah, Curriculum, Juz, Surah};
pub use storage::{CurriculumError, load_curriculum, parse_curriculum};
