//! Filesystem helpers shared by storage and batch output.

use crate::error::Result;
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Reserve a path that no other writer holds, returning the first of
/// `base.ext`, `base_1.ext`, `base_2.ext`, ... that could be created.
///
/// The file is created (empty) as part of resolution, so two concurrent
/// callers can never be handed the same path. Errors other than
/// `AlreadyExists` propagate.
pub fn resolve_unique_path(desired: &Path) -> Result<PathBuf> {
    let stem = desired
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = desired.extension().map(|s| s.to_string_lossy().into_owned());
    let parent = desired.parent().map(Path::to_path_buf).unwrap_or_default();

    let mut counter = 0u32;
    loop {
        let candidate = if counter == 0 {
            desired.to_path_buf()
        } else {
            let name = match &extension {
                Some(ext) => format!("{stem}_{counter}.{ext}"),
                None => format!("{stem}_{counter}"),
            };
            parent.join(name)
        };

        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(_) => return Ok(candidate),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => counter += 1,
            Err(e) => return Err(e.into()),
        }
    }
}
