pub mod api;

pub use api::*;

use std::path::{Path, PathBuf};

use directories::UserDirs;

/// Where downloads land: the XDG download directory, falling back to the
/// home directory when the platform reports none.
pub fn default_download_dir() -> Option<PathBuf> {
    let dirs = UserDirs::new()?;
    dirs.download_dir()
        .map(Path::to_path_buf)
        .or_else(|| Some(dirs.home_dir().to_path_buf()))
}
