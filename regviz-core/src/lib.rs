//! Core data structures for regviz
//!
//! This crate provides the fundamental types shared by the viewer and the
//! frame producer: 3D points, point cloud containers, rigid poses, and the
//! `LocalMap` seam through which a registration pipeline hands its
//! accumulated map to the viewer.

pub mod point;
pub mod point_cloud;
pub mod pose;
pub mod traits;
pub mod error;

pub use point::*;
pub use point_cloud::*;
pub use pose::*;
pub use traits::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Matrix3, Matrix4, Point3, Vector3};

/// Common result type for regviz operations
pub type Result<T> = std::result::Result<T, Error>;
