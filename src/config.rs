//! Env-driven configuration for a single pipeline run.
//!
//! All ambient environment state is read here, once, into a typed [`Config`];
//! the rest of the crate only sees the struct. `.env` loading happens in the
//! binary via `dotenv`.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use tracing::{debug, info};

/// Fully resolved run configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Site directory anchoring all relative paths.
    pub root: PathBuf,
    pub site_title: String,
    pub topic: String,
    pub word_target: u32,
    pub posts_per_day: usize,
    /// Post even when the daily limit is already reached.
    pub force: bool,
    pub image_strategy: ImageStrategy,
    /// Pool directory, relative to `root`.
    pub image_pool_dir: PathBuf,
    /// `owner/repo`, used to build absolute image URLs for publishing.
    pub github_repository: Option<String>,
    pub gemini: Option<GeminiConfig>,
    pub openai: Option<OpenAiConfig>,
    pub blogger: Option<BloggerConfig>,
    pub wordpress: Option<WordpressConfig>,
}

/// How the accompanying image is obtained in `generate` mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageStrategy {
    /// Ask the image model for inline bytes; failure is fatal.
    Generate,
    /// Pick a random file from the pool; an empty pool skips the image.
    Pool,
    /// No image.
    Off,
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub text_model: String,
    pub image_model: String,
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct BloggerConfig {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    pub blog_id: String,
}

#[derive(Debug, Clone)]
pub struct WordpressConfig {
    pub site: String,
    pub username: String,
    pub app_password: String,
}

/// Reads an env var, trimming whitespace and treating empty values as unset.
fn env_trimmed(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_truthy(key: &str) -> bool {
    matches!(
        env_trimmed(key).map(|v| v.to_lowercase()).as_deref(),
        Some("1") | Some("true") | Some("yes")
    )
}

impl Config {
    /// Loads the configuration from the process environment.
    ///
    /// Credential groups are all-or-nothing: a partially set Blogger or
    /// WordPress group is an error, a fully absent group disables that
    /// publisher.
    pub fn load(root: impl Into<PathBuf>, force_flag: bool) -> Result<Self> {
        let root = root.into();

        let site_title = env_trimmed("SITE_TITLE").unwrap_or_else(|| "Daily Blog".to_string());
        let topic =
            env_trimmed("BLOG_TOPIC").unwrap_or_else(|| "ideas worth sharing today".to_string());
        let word_target = env_trimmed("POST_WORDS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(700);
        let posts_per_day = env_trimmed("POSTS_PER_DAY")
            .and_then(|v| v.parse().ok())
            .unwrap_or(5);
        let force = force_flag || env_truthy("FORCE_POST");

        let image_strategy = match env_trimmed("IMAGE_STRATEGY").as_deref() {
            None | Some("pool") => ImageStrategy::Pool,
            Some("generate") => ImageStrategy::Generate,
            Some("none") | Some("off") => ImageStrategy::Off,
            Some(other) => bail!("Unsupported IMAGE_STRATEGY: {other}"),
        };
        let image_pool_dir = PathBuf::from(
            env_trimmed("IMAGE_POOL_DIR").unwrap_or_else(|| "assets/random-images".to_string()),
        );

        let gemini = env_trimmed("GEMINI_API_KEY").map(|api_key| GeminiConfig {
            api_key,
            text_model: env_trimmed("GEMINI_TEXT_MODEL")
                .unwrap_or_else(|| "gemini-2.5-flash".to_string()),
            image_model: env_trimmed("GEMINI_IMAGE_MODEL")
                .unwrap_or_else(|| "gemini-2.5-flash-image".to_string()),
        });
        let openai = env_trimmed("OPENAI_API_KEY").map(|api_key| OpenAiConfig {
            api_key,
            model: env_trimmed("OPENAI_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string()),
        });

        let blogger = match (
            env_trimmed("BLOGGER_CLIENT_ID"),
            env_trimmed("BLOGGER_CLIENT_SECRET"),
            env_trimmed("BLOGGER_REFRESH_TOKEN"),
            env_trimmed("BLOGGER_BLOG_ID"),
        ) {
            (Some(client_id), Some(client_secret), Some(refresh_token), Some(blog_id)) => {
                Some(BloggerConfig {
                    client_id,
                    client_secret,
                    refresh_token,
                    blog_id,
                })
            }
            (None, None, None, None) => None,
            _ => bail!(
                "Blogger configuration is incomplete: set all of BLOGGER_CLIENT_ID, \
                 BLOGGER_CLIENT_SECRET, BLOGGER_REFRESH_TOKEN and BLOGGER_BLOG_ID, or none"
            ),
        };

        let wordpress = match (
            env_trimmed("WP_SITE"),
            env_trimmed("WP_USERNAME"),
            env_trimmed("WP_APP_PASSWORD"),
        ) {
            (Some(site), Some(username), Some(app_password)) => Some(WordpressConfig {
                site,
                username,
                app_password,
            }),
            (None, None, None) => None,
            _ => bail!(
                "WordPress configuration is incomplete: set all of WP_SITE, WP_USERNAME \
                 and WP_APP_PASSWORD, or none"
            ),
        };

        let config = Config {
            root,
            site_title,
            topic,
            word_target,
            posts_per_day,
            force,
            image_strategy,
            image_pool_dir,
            github_repository: env_trimmed("GITHUB_REPOSITORY"),
            gemini,
            openai,
            blogger,
            wordpress,
        };
        config.trace_loaded();
        Ok(config)
    }

    pub fn posts_dir(&self) -> PathBuf {
        self.root.join("_posts")
    }

    pub fn images_dir(&self) -> PathBuf {
        self.root.join("assets").join("images")
    }

    pub fn pool_dir(&self) -> PathBuf {
        self.root.join(&self.image_pool_dir)
    }

    pub fn drafts_dir(&self) -> PathBuf {
        self.root.join("drafts")
    }

    pub fn used_drafts_dir(&self) -> PathBuf {
        self.drafts_dir().join("used")
    }

    pub fn site_root(&self) -> &Path {
        &self.root
    }

    fn trace_loaded(&self) {
        info!(
            root = %self.root.display(),
            site_title = %self.site_title,
            posts_per_day = self.posts_per_day,
            force = self.force,
            image_strategy = ?self.image_strategy,
            gemini = self.gemini.is_some(),
            openai = self.openai.is_some(),
            blogger = self.blogger.is_some(),
            wordpress = self.wordpress.is_some(),
            "Loaded configuration"
        );
        debug!(topic = %self.topic, word_target = self.word_target, "Generation parameters");
    }
}
