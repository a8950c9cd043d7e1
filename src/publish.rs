//! Markdown-to-HTML conversion and the Blogger/WordPress publishers.
//!
//! Each publisher is a stateless one-call client: authenticate, POST the
//! rendered post, fail the whole run on any non-success status. No retries.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use pulldown_cmark::{html, Parser};
use serde_json::{json, Value};
use tracing::{error, info};

use crate::config::{BloggerConfig, WordpressConfig};

const PUBLISH_TIMEOUT: Duration = Duration::from_secs(30);

/// Renders the Markdown body to HTML.
pub fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new(markdown);
    let mut html_out = String::new();
    html::push_html(&mut html_out, parser);
    html_out
}

/// Builds the raw.githubusercontent.com URL for a site-relative image path.
pub fn raw_image_url(repository: &str, image_relpath: &str) -> String {
    format!("https://raw.githubusercontent.com/{repository}/main{image_relpath}")
}

/// Prepends an image paragraph to the rendered HTML body.
pub fn prepend_image(html_body: &str, image_url: &str, alt: &str) -> String {
    format!("<p><img src=\"{image_url}\" alt=\"{alt}\"/></p>\n{html_body}")
}

/// Seam for publishing a rendered post to one platform.
#[async_trait]
pub trait Publisher {
    fn name(&self) -> &'static str;
    async fn publish(&self, title: &str, html_body: &str) -> Result<()>;
}

pub struct BloggerClient {
    client: reqwest::Client,
    config: BloggerConfig,
}

impl BloggerClient {
    pub fn new(config: BloggerConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(PUBLISH_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, config })
    }

    /// Exchanges the stored refresh token for a bearer token.
    async fn fetch_access_token(&self) -> Result<String> {
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("refresh_token", self.config.refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];
        let response = self
            .client
            .post("https://oauth2.googleapis.com/token")
            .form(&params)
            .send()
            .await
            .context("Blogger token request failed")?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            error!(%status, "Blogger auth returned error");
            bail!("Blogger auth error {status}: {body}");
        }
        let payload: Value = response
            .json()
            .await
            .context("Failed to decode Blogger token response")?;
        let token = payload
            .get("access_token")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .unwrap_or_default();
        if token.is_empty() {
            bail!("Missing access_token in Blogger auth response");
        }
        Ok(token.to_string())
    }
}

#[async_trait]
impl Publisher for BloggerClient {
    fn name(&self) -> &'static str {
        "blogger"
    }

    async fn publish(&self, title: &str, html_body: &str) -> Result<()> {
        let access_token = self.fetch_access_token().await?;
        let url = format!(
            "https://www.googleapis.com/blogger/v3/blogs/{}/posts/",
            self.config.blog_id
        );
        info!(blog_id = %self.config.blog_id, "Publishing post to Blogger");
        let response = self
            .client
            .post(&url)
            .bearer_auth(&access_token)
            .json(&json!({
                "kind": "blogger#post",
                "title": title,
                "content": html_body,
            }))
            .send()
            .await
            .context("Blogger post request failed")?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            error!(%status, "Blogger API returned error");
            bail!("Blogger post error {status}: {body}");
        }
        info!("Published post to Blogger");
        Ok(())
    }
}

pub struct WordpressClient {
    client: reqwest::Client,
    config: WordpressConfig,
}

impl WordpressClient {
    pub fn new(config: WordpressConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(PUBLISH_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl Publisher for WordpressClient {
    fn name(&self) -> &'static str {
        "wordpress"
    }

    async fn publish(&self, title: &str, html_body: &str) -> Result<()> {
        let url = format!(
            "https://public-api.wordpress.com/wp/v2/sites/{}/posts",
            self.config.site
        );
        info!(site = %self.config.site, "Publishing post to WordPress");
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.username, Some(&self.config.app_password))
            .json(&json!({
                "title": title,
                "content": html_body,
                "status": "publish",
            }))
            .send()
            .await
            .context("WordPress post request failed")?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            error!(%status, "WordPress API returned error");
            bail!("WordPress post error {status}: {body}");
        }
        info!("Published post to WordPress");
        Ok(())
    }
}
