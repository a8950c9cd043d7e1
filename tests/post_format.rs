use std::fs;

use autopost::post::{
    allocate_post_path, slugify, todays_post_count, write_post, FrontMatter, FALLBACK_SLUG,
};
use chrono::NaiveDate;
use tempfile::tempdir;

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 29).expect("valid date")
}

#[test]
fn slugify_lowercases_and_hyphenates() {
    assert_eq!(slugify("Hello, World!"), "hello-world");
    assert_eq!(slugify("  Ten Tips for 2026  "), "ten-tips-for-2026");
}

#[test]
fn slugify_is_idempotent_on_its_own_output() {
    let once = slugify("Ten Marketing Tips (2026 Edition)");
    assert_eq!(slugify(&once), once);
}

#[test]
fn slugify_falls_back_for_symbol_only_titles() {
    assert_eq!(slugify("!!! ???"), FALLBACK_SLUG);
    assert_eq!(slugify(""), FALLBACK_SLUG);
    assert_eq!(slugify("---"), FALLBACK_SLUG);
}

#[test]
fn front_matter_renders_in_fixed_order() {
    let front = FrontMatter::new(
        "A \"quoted\" title",
        date(),
        Some("/assets/images/x.png".to_string()),
    );
    let expected = "---\ntitle: \"A quoted title\"\ndate: 2026-08-29\nimage: /assets/images/x.png\nlayout: post\n---\n\n";
    assert_eq!(front.render(), expected);
}

#[test]
fn front_matter_omits_missing_image() {
    let front = FrontMatter::new("Plain", date(), None);
    let rendered = front.render();
    assert!(!rendered.contains("image:"), "got: {rendered}");
    assert!(rendered.contains("layout: post"));
}

#[test]
fn allocate_post_path_suffixes_only_when_forcing() {
    let dir = tempdir().expect("temp dir");
    let first = allocate_post_path(dir.path(), date(), "tips", false);
    assert_eq!(first.file_name().expect("name"), "2026-08-29-tips.md");

    fs::write(&first, "x").expect("write");
    // Without force the original name comes back even though it exists.
    assert_eq!(allocate_post_path(dir.path(), date(), "tips", false), first);

    let second = allocate_post_path(dir.path(), date(), "tips", true);
    assert_eq!(second.file_name().expect("name"), "2026-08-29-tips-2.md");
    fs::write(&second, "x").expect("write");
    let third = allocate_post_path(dir.path(), date(), "tips", true);
    assert_eq!(third.file_name().expect("name"), "2026-08-29-tips-3.md");
}

#[test]
fn todays_post_count_filters_by_date_prefix_and_extension() {
    let dir = tempdir().expect("temp dir");
    fs::write(dir.path().join("2026-08-29-one.md"), "x").expect("write");
    fs::write(dir.path().join("2026-08-29-two.md"), "x").expect("write");
    fs::write(dir.path().join("2026-08-28-old.md"), "x").expect("write");
    fs::write(dir.path().join("2026-08-29-notes.txt"), "x").expect("write");

    assert_eq!(todays_post_count(dir.path(), date()).expect("count"), 2);
    let missing = dir.path().join("missing");
    assert_eq!(todays_post_count(&missing, date()).expect("count"), 0);
}

#[test]
fn write_post_creates_parents_and_terminates_with_newline() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("_posts").join("2026-08-29-x.md");
    let front = FrontMatter::new("X", date(), None);

    write_post(&path, &front, "Body text").expect("write post");

    let contents = fs::read_to_string(&path).expect("read back");
    assert!(contents.starts_with("---\n"));
    assert!(contents.contains("---\n\nBody text"));
    assert!(contents.ends_with("Body text\n"));
}
