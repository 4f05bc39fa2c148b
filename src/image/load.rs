//! Image loading utilities.

use std::path::Path;

use image::DynamicImage;

use crate::error::{Error, Result};

/// Load an image from disk.
///
/// The format is inferred from the file contents; the decoded image keeps
/// its original dimensions and color type. Resizing and normalization happen
/// in [`preprocess`](super::preprocess).
///
/// # Errors
///
/// Returns an error if the file cannot be read or decoded.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
    let path = path.as_ref();

    image::open(path).map_err(|source| Error::ImageLoad {
        path: path.to_path_buf(),
        source,
    })
}
