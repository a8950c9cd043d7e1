//! autopost: one-shot blog automation.
//!
//! Each invocation runs a single linear pipeline: load env configuration,
//! check the daily gate, produce a title/body pair (text model or pending
//! draft), resolve an optional image, write a dated Markdown post with YAML
//! front matter, and push HTML to the configured publishers.

pub mod cli;
pub mod config;
pub mod drafts;
pub mod images;
pub mod llm;
pub mod parse;
pub mod pipeline;
pub mod post;
pub mod publish;
