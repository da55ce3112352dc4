#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

mod classifier;
mod engine;

pub use classifier::GapClassifier;
pub use engine::{RecommendationEngine, group_thousands};
