//! lingodrill-core: answer grading, session scoring, and the content model.
//!
//! This crate holds everything the lingodrill front ends share: the
//! vocabulary and grammar catalog, the answer normalizer, the session scorer
//! and its timed engine, grades, and persistence over an abstract key-value
//! store.

pub mod bookmarks;
pub mod builder;
pub mod config;
pub mod engine;
pub mod error;
pub mod grade;
pub mod model;
pub mod normalize;
pub mod parser;
pub mod persistence;
pub mod report;
pub mod search;
pub mod session;
pub mod statistics;
pub mod supplier;
pub mod timer;
pub mod traits;

#[cfg(test)]
mod testing;
