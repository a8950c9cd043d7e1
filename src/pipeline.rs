//! Coordinating module for the gate-produce-image-write-publish pipeline.
//!
//! Control flow is strictly linear with early-return gates; the only state
//! between steps is the filesystem. Step order for drafts: write the post,
//! publish everywhere, then archive the draft, so a failed publish leaves
//! the draft pending for the next run.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use chrono::{NaiveDate, Utc};
use tracing::{info, warn};

use crate::config::{Config, ImageStrategy};
use crate::drafts;
use crate::images;
use crate::llm::{self, GeminiClient, OpenAiClient, TextModel};
use crate::parse;
use crate::post::{self, FrontMatter};
use crate::publish::{self, BloggerClient, Publisher, WordpressClient};

/// What a single run did.
#[derive(Debug)]
pub enum RunOutcome {
    Posted { path: PathBuf },
    DailyLimitReached,
    NoDrafts,
}

/// Generates a post with the configured text model and publishes it.
pub async fn run_generate(config: &Config) -> Result<RunOutcome> {
    let today = Utc::now().date_naive();
    if gate_closed(config, today)? {
        return Ok(RunOutcome::DailyLimitReached);
    }
    let model = text_model(config)?;
    let publishers = configured_publishers(config)?;
    generate_with(config, model.as_ref(), &publishers).await
}

/// Generation steps after the daily gate, with the text model and publishers
/// injected so they can be driven without network credentials.
pub async fn generate_with(
    config: &Config,
    model: &dyn TextModel,
    publishers: &[Box<dyn Publisher>],
) -> Result<RunOutcome> {
    let today = Utc::now().date_naive();
    let prompt = llm::post_prompt(&config.site_title, &config.topic, config.word_target);
    let raw = model.generate(&prompt).await?;

    let date_label = today.format("%Y-%m-%d").to_string();
    let parse::TitleBody { title, body } = parse::resolve_title_body(&raw, &date_label);

    let slug = post::slugify(&title);
    let path = post::allocate_post_path(&config.posts_dir(), today, &slug, config.force);
    let date_slug = format!("{date_label}-{slug}");

    let image_relpath = match config.image_strategy {
        ImageStrategy::Generate => Some(generate_image(config, &title, &date_slug).await?),
        ImageStrategy::Pool => images::resolve_from_pool(
            &config.root,
            &config.pool_dir(),
            &config.images_dir(),
            &date_slug,
        )?,
        ImageStrategy::Off => None,
    };

    write_and_publish(config, publishers, &path, &title, &body, image_relpath, today).await?;
    Ok(RunOutcome::Posted { path })
}

/// Converts the next pending draft into a post and publishes it.
pub async fn run_draft(config: &Config) -> Result<RunOutcome> {
    let today = Utc::now().date_naive();
    if gate_closed(config, today)? {
        return Ok(RunOutcome::DailyLimitReached);
    }
    let publishers = configured_publishers(config)?;
    draft_with(config, &publishers).await
}

/// Draft steps after the daily gate, with the publishers injected.
pub async fn draft_with(config: &Config, publishers: &[Box<dyn Publisher>]) -> Result<RunOutcome> {
    let today = Utc::now().date_naive();
    let Some(draft) = drafts::next_draft(&config.drafts_dir())? else {
        info!("No pending drafts");
        return Ok(RunOutcome::NoDrafts);
    };

    let date_label = today.format("%Y-%m-%d").to_string();
    let mut body = draft.body.trim().to_string();
    let mut title = draft.title.clone().unwrap_or_default();
    if title.is_empty() {
        let (derived, rest) = parse::split_leading_heading(&body);
        title = derived;
        body = rest;
    }
    if body.trim_start().starts_with('#') {
        let (_, rest) = parse::split_leading_heading(&body);
        body = rest;
    }
    if title.is_empty() {
        title = format!("Daily Post {date_label}");
    }

    let slug = post::slugify(&title);
    let path = post::allocate_post_path(&config.posts_dir(), today, &slug, config.force);
    let date_slug = format!("{date_label}-{slug}");

    let image_relpath = match &draft.image {
        Some(field) => images::resolve_from_draft(
            &config.root,
            &config.pool_dir(),
            &config.images_dir(),
            &date_slug,
            field,
        )?,
        None => None,
    };

    write_and_publish(config, publishers, &path, &title, &body, image_relpath, today).await?;
    drafts::archive_draft(&draft.path, &config.used_drafts_dir())?;
    Ok(RunOutcome::Posted { path })
}

/// The daily gate. Runs before any network client is constructed.
fn gate_closed(config: &Config, today: NaiveDate) -> Result<bool> {
    if config.force {
        return Ok(false);
    }
    let count = post::todays_post_count(&config.posts_dir(), today)?;
    if count >= config.posts_per_day {
        info!(
            count,
            limit = config.posts_per_day,
            "Daily post limit reached, skipping run"
        );
        return Ok(true);
    }
    Ok(false)
}

/// Picks the configured text provider, Gemini first.
fn text_model(config: &Config) -> Result<Box<dyn TextModel>> {
    if let Some(gemini) = &config.gemini {
        return Ok(Box::new(GeminiClient::new(gemini.clone())?));
    }
    if let Some(openai) = &config.openai {
        return Ok(Box::new(OpenAiClient::new(openai.clone())?));
    }
    bail!("GEMINI_API_KEY or OPENAI_API_KEY is required to generate a post")
}

/// Image strategy `generate`: model bytes stored under `assets/images`.
/// Failure here is fatal, unlike the pool strategy.
async fn generate_image(config: &Config, title: &str, date_slug: &str) -> Result<String> {
    let Some(gemini) = &config.gemini else {
        bail!("GEMINI_API_KEY is required for IMAGE_STRATEGY=generate");
    };
    let client = GeminiClient::new(gemini.clone())?;
    let prompt = llm::image_prompt(title, &config.topic);
    let image = client.generate_image(&prompt).await?;
    let stored = images::store_generated(&config.images_dir(), date_slug, &image)?;
    images::site_relative(&config.root, &stored)
        .ok_or_else(|| anyhow::anyhow!("Generated image landed outside the site root"))
}

/// Writes the post file, then pushes HTML to every configured publisher.
async fn write_and_publish(
    config: &Config,
    publishers: &[Box<dyn Publisher>],
    path: &Path,
    title: &str,
    body: &str,
    image_relpath: Option<String>,
    today: NaiveDate,
) -> Result<()> {
    let front_matter = FrontMatter::new(title, today, image_relpath.clone());
    post::write_post(path, &front_matter, body)?;

    if publishers.is_empty() {
        info!("No publishers configured, post written locally only");
        return Ok(());
    }

    let mut html_body = publish::markdown_to_html(body);
    match (&config.github_repository, &image_relpath) {
        (Some(repository), Some(rel)) if rel.starts_with('/') => {
            let url = publish::raw_image_url(repository, rel);
            html_body = publish::prepend_image(&html_body, &url, &front_matter.title);
        }
        (_, Some(url)) if url.starts_with("http") => {
            html_body = publish::prepend_image(&html_body, url, &front_matter.title);
        }
        (None, Some(_)) => {
            warn!("GITHUB_REPOSITORY not set, publishing without the image");
        }
        _ => {}
    }

    for publisher in publishers {
        info!(publisher = publisher.name(), "Publishing post");
        publisher.publish(&front_matter.title, &html_body).await?;
    }
    Ok(())
}

fn configured_publishers(config: &Config) -> Result<Vec<Box<dyn Publisher>>> {
    let mut publishers: Vec<Box<dyn Publisher>> = Vec::new();
    if let Some(blogger) = &config.blogger {
        publishers.push(Box::new(BloggerClient::new(blogger.clone())?));
    }
    if let Some(wordpress) = &config.wordpress {
        publishers.push(Box::new(WordpressClient::new(wordpress.clone())?));
    }
    Ok(publishers)
}
