//! Map files on disk: `<n>.map` text files in a maps directory.

use std::fs;
use std::path::{Path, PathBuf};

use rand::seq::IndexedRandom;
use rand::Rng;
use tilewar_core::MapLoadError;

use crate::grid::TerrainGrid;

const MAP_EXTENSION: &str = "map";

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> MapLoadError + '_ {
    move |source| MapLoadError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Read and parse one map file.
pub fn load_map_file(path: impl AsRef<Path>) -> Result<TerrainGrid, MapLoadError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(io_error(path))?;
    let grid = TerrainGrid::parse(&text)?;
    log::debug!(
        "loaded map {} ({}x{})",
        path.display(),
        grid.width(),
        grid.height()
    );
    Ok(grid)
}

/// All `.map` files in `dir`, sorted by path.
pub fn list_map_files(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, MapLoadError> {
    let dir = dir.as_ref();
    let mut out = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error(dir))? {
        let path = entry.map_err(io_error(dir))?.path();
        if path.is_file() && path.extension().is_some_and(|e| e == MAP_EXTENSION) {
            out.push(path);
        }
    }
    out.sort();
    Ok(out)
}

/// Pick one `.map` file from `dir` uniformly at random.
pub fn choose_map_file<R: Rng + ?Sized>(
    dir: impl AsRef<Path>,
    rng: &mut R,
) -> Result<PathBuf, MapLoadError> {
    let dir = dir.as_ref();
    let files = list_map_files(dir)?;
    files
        .choose(rng)
        .cloned()
        .ok_or_else(|| MapLoadError::NoMapFiles {
            dir: dir.to_path_buf(),
        })
}

/// Path for the next numbered map in `dir`: one past the highest
/// `<n>.map`, or `1.map` if there is none. Non-numeric names are ignored.
pub fn next_map_path(dir: impl AsRef<Path>) -> Result<PathBuf, MapLoadError> {
    let dir = dir.as_ref();
    let highest = list_map_files(dir)?
        .iter()
        .filter_map(|p| p.file_stem()?.to_str()?.parse::<u64>().ok())
        .max();
    let next = highest.map_or(1, |n| n + 1);
    Ok(dir.join(format!("{next}.{MAP_EXTENSION}")))
}

/// Write `grid` as the next numbered map in `dir`, creating the
/// directory if needed. Returns the path written.
pub fn save_map_file(dir: impl AsRef<Path>, grid: &TerrainGrid) -> Result<PathBuf, MapLoadError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).map_err(io_error(dir))?;
    let path = next_map_path(dir)?;
    fs::write(&path, grid.to_map_text()).map_err(io_error(&path))?;
    log::info!("wrote map {}", path.display());
    Ok(path)
}
