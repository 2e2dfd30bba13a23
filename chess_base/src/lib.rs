//! # Base types for tapchess
//!
//! This is an auxiliary crate for `tapchess`, which contains some core stuff. It was split from the main crate,
//! so everything declared here can be used in the build script for `tapchess`.
//!
//! Normally you don't want to use this crate directly. Use `tapchess` instead.

pub mod bitboard;
pub mod geometry;
pub mod types;
