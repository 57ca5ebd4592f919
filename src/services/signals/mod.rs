//! Signal computation: indicator library, threshold classifier, and the
//! trade plan generator.

pub mod classifier;
pub mod indicators;
pub mod plan;
