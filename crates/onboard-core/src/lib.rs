pub mod checklist;
pub mod error;
pub mod generator;
pub mod preboard;
pub mod progress;
pub mod user;

pub use checklist::{ChecklistItem, OnboardingChecklist, Priority};
pub use error::{OnboardError, Result};
pub use preboard::{PreboardFlag, PreboardingFlags};
pub use user::User;
