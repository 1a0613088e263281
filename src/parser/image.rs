//! Image reference resolution.

use super::options::ParseOptions;
use crate::model::Resource;
use std::fs;
use std::path::{Path, PathBuf};

/// An image reference that points at an existing file.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedImage {
    /// Verified path on disk
    pub path: PathBuf,
    /// Target display width in inches
    pub width: f32,
}

impl ResolvedImage {
    /// Load the file as an embeddable resource.
    ///
    /// Returns `None` (and logs a warning) when the file cannot be read or
    /// is not a recognized image format.
    pub fn load(&self) -> Option<Resource> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) => {
                log::warn!("Could not read image {}: {}", self.path.display(), e);
                return None;
            }
        };
        let resource = Resource::from_image_bytes(data);
        if resource.is_none() {
            log::warn!("Unrecognized image format: {}", self.path.display());
        }
        let filename = self.path.file_name().map(|n| n.to_string_lossy().into_owned());
        resource.map(|r| match filename {
            Some(name) => r.with_filename(name),
            None => r,
        })
    }
}

/// Maps image references to files using a base directory and fallback
/// search directories.
#[derive(Debug, Clone, Default)]
pub struct ImageResolver {
    base_dir: Option<PathBuf>,
    search_paths: Vec<PathBuf>,
    width: f32,
}

impl ImageResolver {
    /// Create a resolver.
    pub fn new(base_dir: Option<PathBuf>, search_paths: Vec<PathBuf>, width: f32) -> Self {
        Self {
            base_dir,
            search_paths,
            width,
        }
    }

    /// Create a resolver from parse options.
    pub fn from_options(options: &ParseOptions) -> Self {
        Self::new(
            options.base_dir.clone(),
            options.image_search_paths.clone(),
            options.image_width,
        )
    }

    /// Find the file an image reference points at.
    ///
    /// Absolute paths are checked as-is; relative paths are joined to the
    /// base directory. On a miss, each search directory is probed for the
    /// same file name. The first existing file wins.
    pub fn resolve(&self, reference: &str) -> Option<ResolvedImage> {
        if reference.is_empty() {
            return None;
        }

        let direct = Path::new(reference);
        let candidate = match &self.base_dir {
            Some(base) if direct.is_relative() => base.join(direct),
            _ => direct.to_path_buf(),
        };
        if candidate.is_file() {
            return Some(self.resolved(candidate));
        }

        let name = file_name(reference)?;
        for dir in &self.search_paths {
            let candidate = dir.join(name);
            if candidate.is_file() {
                log::debug!("Resolved {} via search path {}", reference, dir.display());
                return Some(self.resolved(candidate));
            }
        }

        None
    }

    fn resolved(&self, path: PathBuf) -> ResolvedImage {
        ResolvedImage {
            path,
            width: self.width,
        }
    }
}

/// Last path component, accepting both `/` and `\` separators.
fn file_name(reference: &str) -> Option<&str> {
    reference
        .rsplit(['/', '\\'])
        .next()
        .filter(|name| !name.is_empty())
}
