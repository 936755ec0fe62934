//! Data types shared by every scene.
//!
//! - `handle` issues unique ids for GPU resources and stores them in pools
//! - `texture` wraps GPU textures and their upload from images or float data
//! - `mesh` holds vertex layouts, procedural geometry and GPU buffers
//! - `draw_item` describes one thing to draw and where
//! - `blend` holds the user-facing blend settings and their validation

pub mod blend;
pub mod draw_item;
pub mod handle;
pub mod mesh;
pub mod texture;
