//! Terrain grids and map sources for tilewar matches.
//!
//! [`TerrainGrid`] is the immutable terrain layer a match is created
//! from. This crate also holds the map-source collaborators: the text
//! map format, `.map` files on disk, and random map generation.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod grid;
pub mod mapfile;
pub mod mapgen;

pub use grid::TerrainGrid;
pub use mapfile::{choose_map_file, list_map_files, load_map_file, next_map_path, save_map_file};
pub use mapgen::MapGenerator;
