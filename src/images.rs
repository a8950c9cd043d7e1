//! Image resolution: random pool picks, draft-referenced images and storage
//! of generated bytes. All paths handed back are site-relative (leading `/`)
//! so they are valid in front matter before any deploy step runs.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rand::prelude::*;
use tracing::{debug, warn};

use crate::llm::GeneratedImage;

const POOL_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "webp", "gif"];

/// Picks a uniformly random image file from the pool directory.
///
/// A missing directory or empty pool yields `None`.
pub fn pick_pool_image(pool_dir: &Path) -> Result<Option<PathBuf>> {
    if !pool_dir.is_dir() {
        return Ok(None);
    }
    let mut candidates: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(pool_dir)
        .with_context(|| format!("Failed to list image pool {}", pool_dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();
        let ext_ok = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| POOL_EXTENSIONS.contains(&e.to_lowercase().as_str()))
            .unwrap_or(false);
        if path.is_file() && ext_ok {
            candidates.push(path);
        }
    }
    let mut rng = rand::rng();
    Ok(candidates.into_iter().choose(&mut rng))
}

/// Copies `source` into the images directory as `<date>-<slug>.<ext>`.
pub fn archive_copy(source: &Path, images_dir: &Path, date_slug: &str) -> Result<PathBuf> {
    fs::create_dir_all(images_dir)
        .with_context(|| format!("Failed to create images directory {}", images_dir.display()))?;
    let ext = source
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("png")
        .to_lowercase();
    let target = images_dir.join(format!("{date_slug}.{ext}"));
    fs::copy(source, &target).with_context(|| {
        format!(
            "Failed to copy image {} to {}",
            source.display(),
            target.display()
        )
    })?;
    debug!(from = %source.display(), to = %target.display(), "Copied image");
    Ok(target)
}

/// Writes model-generated bytes as `<date>-<slug>.<ext>` under the images
/// directory.
pub fn store_generated(
    images_dir: &Path,
    date_slug: &str,
    image: &GeneratedImage,
) -> Result<PathBuf> {
    fs::create_dir_all(images_dir)
        .with_context(|| format!("Failed to create images directory {}", images_dir.display()))?;
    let target = images_dir.join(format!("{date_slug}.{}", image.extension));
    fs::write(&target, &image.bytes)
        .with_context(|| format!("Failed to write generated image {}", target.display()))?;
    debug!(path = %target.display(), size = image.bytes.len(), "Stored generated image");
    Ok(target)
}

/// Rewrites `path` as a site-relative path with a leading slash.
pub fn site_relative(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let joined = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/");
    Some(format!("/{joined}"))
}

/// Pool strategy: reference the pool file directly (its path is already
/// deployable) and archive a copy under the images directory.
pub fn resolve_from_pool(
    root: &Path,
    pool_dir: &Path,
    images_dir: &Path,
    date_slug: &str,
) -> Result<Option<String>> {
    let Some(source) = pick_pool_image(pool_dir)? else {
        warn!(pool = %pool_dir.display(), "Image pool empty or missing, skipping image");
        return Ok(None);
    };
    archive_copy(&source, images_dir, date_slug)?;
    Ok(site_relative(root, &source))
}

/// Draft strategy: honor the draft's `image:` field.
///
/// URLs pass through verbatim, `random`/`auto` trigger a pool pick, and a
/// relative path is copied into the images directory when it exists under
/// the root. A missing file skips the image silently.
pub fn resolve_from_draft(
    root: &Path,
    pool_dir: &Path,
    images_dir: &Path,
    date_slug: &str,
    image_field: &str,
) -> Result<Option<String>> {
    let field = image_field.trim();
    if field.starts_with("http://") || field.starts_with("https://") {
        return Ok(Some(field.to_string()));
    }
    if field.eq_ignore_ascii_case("random") || field.eq_ignore_ascii_case("auto") {
        return resolve_from_pool(root, pool_dir, images_dir, date_slug);
    }
    let source = root.join(field);
    if !source.is_file() {
        warn!(path = %source.display(), "Draft image not found, skipping image");
        return Ok(None);
    }
    let target = archive_copy(&source, images_dir, date_slug)?;
    Ok(site_relative(root, &target))
}
