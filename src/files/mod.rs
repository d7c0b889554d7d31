//! File handling: document tree construction, recursive directory walking
//! and the upload pipeline.

pub mod tree;
pub mod upload;
pub mod walker;
