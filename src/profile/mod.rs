//! Learner profiles and their persistence
//!
//! `ProfileRepository` is the storage seam. `MemoryRepository` and
//! `JsonFileRepository` are the concrete stores; `ResilientRepository`
//! wraps either one so a failing store never blocks a session.

pub mod error;
pub mod file;
pub mod model;
pub mod repository;
pub mod resilient;

pub use error::RepositoryError;
pub use file::JsonFileRepository;
pub use model::{LearnerEdit, LearnerProfile, ScoreEntry};
pub use repository::{MemoryRepository, ProfileRepository, ProfileStore};
pub use resilient::ResilientRepository;
