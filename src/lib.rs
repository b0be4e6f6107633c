// src/lib.rs

pub mod core;
pub mod learning;
pub mod persistence;
pub use crate::core::engine::ContentEngine;
