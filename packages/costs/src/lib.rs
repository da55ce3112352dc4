#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

mod estimator;
mod model;

pub use estimator::CostBenefitEstimator;
pub use model::{BREAK_EVEN_NEVER, CostCategory, CostEstimate, CostModel, CostSummary};
