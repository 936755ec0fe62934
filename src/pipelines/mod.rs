//! Render pipelines: the textured pipeline every scene draws with, the cache
//! that builds it per fixed-function state, and the alpha fill pass.

pub mod alpha_fill;
pub mod basic;
pub mod cache;
pub mod uniforms;
