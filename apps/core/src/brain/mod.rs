//! # Brain Module
//!
//! Fast, non-LLM handling of user input.
//!
//! ## Components
//! - `intent`: ordered keyword classification (course > job > timing > general)
//! - `answer`: bulleted replies built from the HR dataset

pub mod answer;
pub mod intent;

pub use answer::answer;
pub use intent::IntentClassifier;
