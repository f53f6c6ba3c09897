//! Booking aggregation and fare outlier analysis.
//!
//! This module counts categorical values, ranks pickup locations for a given
//! cancellation reason, computes per-vehicle fare means over completed rides,
//! and removes fare outliers with interquartile-range fences before computing
//! those means a second time.

pub mod aggregate;
pub mod analyzer;
pub mod outlier;
pub mod profile;
pub mod types;
pub mod utility;
