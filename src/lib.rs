//! Pallet loading calculator for corrugated board boxes.
//!
//! Given the length, width and height of a box and its flute type, the crate
//! evaluates a fixed table of eight orientation combos against a pallet
//! footprint, picks the layout with the most bundles and derives the total
//! number of pieces on the pallet.

pub mod api;
pub mod calculator;
pub mod config;
pub mod export;
pub mod layout;
pub mod model;
pub mod types;
