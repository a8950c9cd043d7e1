//! Pending-draft queue: `drafts/*.md` consumed front-to-back by filename,
//! archived into `drafts/used/` once the derived post is fully published.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{info, warn};

/// A pending draft, front matter already split off.
#[derive(Debug)]
pub struct Draft {
    pub path: PathBuf,
    pub title: Option<String>,
    /// Raw `image:` field: a URL, `random`/`auto`, or a relative path.
    pub image: Option<String>,
    pub body: String,
}

#[derive(Debug, Deserialize, Default)]
struct DraftFrontMatter {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    image: Option<String>,
}

/// Returns the next pending draft, or `None` when the queue is empty.
///
/// Drafts are ordered by filename; the `used/` subdirectory and non-`.md`
/// entries are ignored.
pub fn next_draft(drafts_dir: &Path) -> Result<Option<Draft>> {
    if !drafts_dir.is_dir() {
        return Ok(None);
    }
    let mut pending: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(drafts_dir)
        .with_context(|| format!("Failed to list drafts directory {}", drafts_dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();
        let is_markdown = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("md"))
            .unwrap_or(false);
        if path.is_file() && is_markdown {
            pending.push(path);
        }
    }
    pending.sort();

    let Some(path) = pending.into_iter().next() else {
        return Ok(None);
    };
    let contents = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read draft {}", path.display()))?;
    let (front, body) = split_front_matter(&contents);
    let meta = match front {
        Some(block) => serde_yaml::from_str::<DraftFrontMatter>(block).unwrap_or_else(|e| {
            warn!(error = %e, path = %path.display(), "Ignoring unparsable draft front matter");
            DraftFrontMatter::default()
        }),
        None => DraftFrontMatter::default(),
    };
    info!(path = %path.display(), has_title = meta.title.is_some(), "Selected next draft");
    Ok(Some(Draft {
        path,
        title: meta.title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()),
        image: meta.image.map(|i| i.trim().to_string()).filter(|i| !i.is_empty()),
        body: body.to_string(),
    }))
}

/// Splits an optional leading `---` front matter block from the body.
///
/// The block is closed only by a line that is exactly `---`, so metadata
/// lines that merely start with dashes do not terminate it early.
fn split_front_matter(contents: &str) -> (Option<&str>, &str) {
    let Some(rest) = contents.strip_prefix("---") else {
        return (None, contents);
    };
    let Some(rest) = rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n')) else {
        return (None, contents);
    };
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == "---" {
            let block = &rest[..offset];
            let after = &rest[offset + line.len()..];
            return (Some(block), after.trim_start_matches(['\r', '\n']));
        }
        offset += line.len();
    }
    (None, contents)
}

/// Moves a consumed draft into the `used/` archive.
///
/// Called only after the derived post has been written and published, so a
/// failed run leaves the draft pending for the next one.
pub fn archive_draft(draft_path: &Path, used_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(used_dir)
        .with_context(|| format!("Failed to create archive directory {}", used_dir.display()))?;
    let file_name = draft_path
        .file_name()
        .with_context(|| format!("Draft path has no file name: {}", draft_path.display()))?;
    let target = used_dir.join(file_name);
    fs::rename(draft_path, &target).with_context(|| {
        format!(
            "Failed to move draft {} to {}",
            draft_path.display(),
            target.display()
        )
    })?;
    info!(from = %draft_path.display(), to = %target.display(), "Archived draft");
    Ok(target)
}
