pub mod board;
pub mod color;
pub mod config;
pub mod error;
pub mod footprint;
pub mod geometry;
pub mod level;
pub mod piece;
pub mod rubric;
pub mod scene;
// cmd and reports belong to the binary (see main.rs).
