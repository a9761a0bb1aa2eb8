//! Attributed adjacency graph construction and feature recognition over a
//! B-rep solid: build a per-face, per-edge graph from a shape, then run a
//! fixed sequence of recognizers over it to emit manufacturing features.

pub mod adapter;
pub mod builder;
pub mod error;
pub mod export;
pub mod graph;
pub mod recognizers;

pub use adapter::{GeometryAdapter, KernelAdapter};
pub use builder::{build, signed_dihedral_deg, BuildOutput};
pub use error::{AagError, Result};
pub use graph::{Fid, Graph};
pub use recognizers::{recognize_all, Feature, FeatureType, RecognitionConfig};
