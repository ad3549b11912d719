use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelResolveError {
    #[error("failed to create cache directory: {0}")]
    CacheDir(#[source] io::Error),
    #[error("download failed for {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to write model to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not determine cache directory")]
    NoCacheDir,
}

/// Where a model file was ultimately found, for status reporting
/// ("Ready" vs "Ready (using fallback models)").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelOrigin {
    Bundled,
    Cached,
    Downloaded,
}

/// Resolve a detection model file by name.
///
/// Resolution order mirrors the load path of the app: the local models
/// directory first, then the user cache, and as the single documented
/// fallback a download from `fallback_url` into the cache. The download
/// is atomic (`.part` then rename), so a failed fetch never leaves a
/// truncated model behind.
pub fn resolve(
    name: &str,
    models_dir: Option<&Path>,
    fallback_url: &str,
) -> Result<(PathBuf, ModelOrigin), ModelResolveError> {
    if let Some(dir) = models_dir {
        let local = dir.join(name);
        if local.exists() {
            return Ok((local, ModelOrigin::Bundled));
        }
    }

    let cache_dir = model_cache_dir()?;
    let cached = cache_dir.join(name);
    if cached.exists() {
        return Ok((cached, ModelOrigin::Cached));
    }

    log::warn!("model {name} not found locally, fetching from fallback source");
    fs::create_dir_all(&cache_dir).map_err(ModelResolveError::CacheDir)?;
    download(fallback_url, &cached)?;
    Ok((cached, ModelOrigin::Downloaded))
}

/// Platform-specific model cache directory, e.g.
/// `~/.cache/Presence/models/` on Linux.
pub fn model_cache_dir() -> Result<PathBuf, ModelResolveError> {
    dirs::cache_dir()
        .map(|d| d.join("Presence").join("models"))
        .ok_or(ModelResolveError::NoCacheDir)
}

fn download(url: &str, dest: &Path) -> Result<(), ModelResolveError> {
    let temp_path = dest.with_extension("part");
    let result = download_inner(url, dest, &temp_path);
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn download_inner(url: &str, dest: &Path, temp_path: &Path) -> Result<(), ModelResolveError> {
    let mut response = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .map_err(|e| ModelResolveError::Download {
            url: url.to_string(),
            source: e,
        })?;

    let mut file = fs::File::create(temp_path).map_err(|e| ModelResolveError::Write {
        path: temp_path.to_path_buf(),
        source: e,
    })?;
    io::copy(&mut response, &mut file).map_err(|e| ModelResolveError::Write {
        path: temp_path.to_path_buf(),
        source: e,
    })?;
    drop(file);

    fs::rename(temp_path, dest).map_err(|e| ModelResolveError::Write {
        path: dest.to_path_buf(),
        source: e,
    })
}
