//! dcalc: dental parts compatibility calculator
//!
//! Narrows a catalog of dental components down to the parts consistent
//! with a set of quiz answers, and cross-references compatible parts of
//! other component types.

pub mod cli;
pub mod core;
pub mod engine;
