use std::env;
use std::path::PathBuf;

use autopost::config::{Config, ImageStrategy};
use serial_test::serial;

const ALL_VARS: [&str; 20] = [
    "SITE_TITLE",
    "BLOG_TOPIC",
    "POST_WORDS",
    "POSTS_PER_DAY",
    "FORCE_POST",
    "IMAGE_STRATEGY",
    "IMAGE_POOL_DIR",
    "GITHUB_REPOSITORY",
    "GEMINI_API_KEY",
    "GEMINI_TEXT_MODEL",
    "GEMINI_IMAGE_MODEL",
    "OPENAI_API_KEY",
    "OPENAI_MODEL",
    "BLOGGER_CLIENT_ID",
    "BLOGGER_CLIENT_SECRET",
    "BLOGGER_REFRESH_TOKEN",
    "BLOGGER_BLOG_ID",
    "WP_SITE",
    "WP_USERNAME",
    "WP_APP_PASSWORD",
];

fn clear_env() {
    for key in ALL_VARS {
        env::remove_var(key);
    }
}

#[test]
#[serial]
fn defaults_apply_with_an_empty_environment() {
    clear_env();
    let config = Config::load("/tmp/site", false).expect("config should load");

    assert_eq!(config.root, PathBuf::from("/tmp/site"));
    assert_eq!(config.site_title, "Daily Blog");
    assert_eq!(config.word_target, 700);
    assert_eq!(config.posts_per_day, 5);
    assert!(!config.force);
    assert_eq!(config.image_strategy, ImageStrategy::Pool);
    assert_eq!(config.image_pool_dir, PathBuf::from("assets/random-images"));
    assert!(config.gemini.is_none());
    assert!(config.openai.is_none());
    assert!(config.blogger.is_none());
    assert!(config.wordpress.is_none());
    assert_eq!(config.posts_dir(), PathBuf::from("/tmp/site/_posts"));
    assert_eq!(config.drafts_dir(), PathBuf::from("/tmp/site/drafts"));
}

#[test]
#[serial]
fn env_values_override_defaults() {
    clear_env();
    env::set_var("SITE_TITLE", "My Site");
    env::set_var("POST_WORDS", "450");
    env::set_var("POSTS_PER_DAY", "2");
    env::set_var("FORCE_POST", "yes");
    env::set_var("IMAGE_STRATEGY", "none");
    env::set_var("GEMINI_API_KEY", "k");
    env::set_var("GEMINI_TEXT_MODEL", "gemini-test");

    let config = Config::load(".", false).expect("config should load");
    assert_eq!(config.site_title, "My Site");
    assert_eq!(config.word_target, 450);
    assert_eq!(config.posts_per_day, 2);
    assert!(config.force);
    assert_eq!(config.image_strategy, ImageStrategy::Off);
    let gemini = config.gemini.expect("gemini configured");
    assert_eq!(gemini.api_key, "k");
    assert_eq!(gemini.text_model, "gemini-test");
    clear_env();
}

#[test]
#[serial]
fn non_numeric_word_target_falls_back_to_default() {
    clear_env();
    env::set_var("POST_WORDS", "lots");
    let config = Config::load(".", false).expect("config should load");
    assert_eq!(config.word_target, 700);
    clear_env();
}

#[test]
#[serial]
fn force_flag_wins_over_unset_env() {
    clear_env();
    let config = Config::load(".", true).expect("config should load");
    assert!(config.force);
}

#[test]
#[serial]
fn partial_blogger_group_is_an_error() {
    clear_env();
    env::set_var("BLOGGER_CLIENT_ID", "id");
    env::set_var("BLOGGER_CLIENT_SECRET", "secret");
    // Refresh token and blog id missing.
    let err = Config::load(".", false).expect_err("must reject partial group");
    assert!(
        err.to_string().contains("BLOGGER"),
        "unexpected message: {err}"
    );
    clear_env();
}

#[test]
#[serial]
fn complete_wordpress_group_is_accepted() {
    clear_env();
    env::set_var("WP_SITE", "example.wordpress.com");
    env::set_var("WP_USERNAME", "author");
    env::set_var("WP_APP_PASSWORD", "app-pass");
    let config = Config::load(".", false).expect("config should load");
    let wordpress = config.wordpress.expect("wordpress configured");
    assert_eq!(wordpress.site, "example.wordpress.com");
    assert_eq!(wordpress.username, "author");
    clear_env();
}

#[test]
#[serial]
fn blank_values_count_as_unset() {
    clear_env();
    env::set_var("GEMINI_API_KEY", "   ");
    env::set_var("SITE_TITLE", "");
    let config = Config::load(".", false).expect("config should load");
    assert!(config.gemini.is_none());
    assert_eq!(config.site_title, "Daily Blog");
    clear_env();
}

#[test]
#[serial]
fn unknown_image_strategy_is_rejected() {
    clear_env();
    env::set_var("IMAGE_STRATEGY", "collage");
    let err = Config::load(".", false).expect_err("must reject unknown strategy");
    assert!(
        err.to_string().contains("IMAGE_STRATEGY"),
        "unexpected message: {err}"
    );
    clear_env();
}
