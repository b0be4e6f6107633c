// src/core/mod.rs

pub mod categories;
pub mod datasets;
pub mod engine;
pub mod fallback;
pub mod normalizer;
pub mod types;
