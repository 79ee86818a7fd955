//! Alchemy CLI library.
//!
//! This crate provides command-line interface utilities for the recipe path
//! finder, including terminal styling and output formatting.

pub mod output;
pub mod terminal;
