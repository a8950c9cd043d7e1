//! Post files: slugs, front matter, the daily gate and filename allocation.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use regex::Regex;
use tracing::{debug, info};

/// Slug used when a title reduces to nothing.
pub const FALLBACK_SLUG: &str = "daily-post";

/// Derives a URL-safe slug from a title.
///
/// Lower-cases, collapses runs of non-alphanumeric characters into single
/// hyphens and trims leading/trailing hyphens. Never returns an empty string.
pub fn slugify(title: &str) -> String {
    static SEPARATORS: OnceLock<Regex> = OnceLock::new();
    let separators = SEPARATORS.get_or_init(|| Regex::new("[^a-z0-9]+").expect("valid pattern"));
    let lowered = title.trim().to_lowercase();
    let hyphenated = separators.replace_all(&lowered, "-");
    let trimmed = hyphenated.trim_matches('-');
    if trimmed.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        trimmed.to_string()
    }
}

/// YAML front matter block, serialized in fixed key order.
#[derive(Debug, Clone)]
pub struct FrontMatter {
    /// Title with embedded double quotes stripped.
    pub title: String,
    pub date: NaiveDate,
    pub image: Option<String>,
    pub layout: String,
}

impl FrontMatter {
    pub fn new(title: &str, date: NaiveDate, image: Option<String>) -> Self {
        Self {
            title: title.replace('"', ""),
            date,
            image,
            layout: "post".to_string(),
        }
    }

    /// Renders the block: `---`, title, date, optional image, layout, `---`,
    /// then a blank line separating it from the body.
    pub fn render(&self) -> String {
        let mut lines = vec![
            "---".to_string(),
            format!("title: \"{}\"", self.title),
            format!("date: {}", self.date.format("%Y-%m-%d")),
        ];
        if let Some(image) = &self.image {
            lines.push(format!("image: {image}"));
        }
        lines.push(format!("layout: {}", self.layout));
        lines.push("---".to_string());
        lines.push(String::new());
        lines.join("\n") + "\n"
    }
}

/// Writes front matter and body to `path`, creating parent directories.
pub fn write_post(path: &Path, front_matter: &FrontMatter, body: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create posts directory {}", parent.display()))?;
    }
    let contents = format!("{}{}\n", front_matter.render(), body);
    fs::write(path, contents)
        .with_context(|| format!("Failed to write post file {}", path.display()))?;
    info!(path = %path.display(), "Wrote post file");
    Ok(())
}

/// Counts posts already written for `date`: entries named
/// `<date>-*.md` in the posts directory. A missing directory counts as zero.
pub fn todays_post_count(posts_dir: &Path, date: NaiveDate) -> Result<usize> {
    if !posts_dir.is_dir() {
        return Ok(0);
    }
    let prefix = format!("{}-", date.format("%Y-%m-%d"));
    let mut count = 0;
    for entry in fs::read_dir(posts_dir)
        .with_context(|| format!("Failed to list posts directory {}", posts_dir.display()))?
    {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with(&prefix) && name.ends_with(".md") {
            count += 1;
        }
    }
    debug!(count, prefix = %prefix, "Counted today's posts");
    Ok(count)
}

/// Picks the output path `<date>-<slug>.md`.
///
/// When forcing and that name is taken, probes `<date>-<slug>-2.md`, `-3`, …
/// for the first free name.
pub fn allocate_post_path(posts_dir: &Path, date: NaiveDate, slug: &str, force: bool) -> PathBuf {
    let date_prefix = date.format("%Y-%m-%d");
    let first = posts_dir.join(format!("{date_prefix}-{slug}.md"));
    if !(force && first.exists()) {
        return first;
    }
    let mut counter: u32 = 2;
    loop {
        let candidate = posts_dir.join(format!("{date_prefix}-{slug}-{counter}.md"));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}
