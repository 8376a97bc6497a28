//! Catalyst Core Types
//!
//! This crate provides the types shared between the Catalyst layout pipeline
//! and the collaborators around it (diagram parsers and output serializers):
//!
//! - **Model**: the architecture element tree and its relations ([`model`] module)
//! - **Geometry**: points, sizes, bounding boxes and insets ([`geometry`] module)

pub mod geometry;
pub mod model;
