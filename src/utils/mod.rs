//! Utility modules for the asset pipeline.

pub mod path;
