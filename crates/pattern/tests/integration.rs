//! Integration tests for patterns and ignore files

use bubz2_pattern::{CaseInsensitive, ExactMatch, IgnoreRules, Pattern, PathMatch, U8Pieces};
use proptest::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn parse(pattern: &[u8]) -> Pattern<U8Pieces, u8> {
    Pattern::parse(pattern, &b'*')
}

#[tokio::test]
async fn test_load_ignore_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join(".bubz2ignore");
    tokio::fs::write(&path, "*.nav\n!maps/keep.nav\n").await.unwrap();

    let rules = IgnoreRules::load(&path).await.unwrap();
    assert_eq!(rules.len(), 2);
    assert!(rules.is_path_ignored(Path::new("maps/dm_flood.nav")));
    assert!(!rules.is_path_ignored(Path::new("maps/keep.nav")));
}

#[tokio::test]
async fn test_missing_ignore_file_is_empty() {
    let temp_dir = TempDir::new().unwrap();
    let rules = IgnoreRules::load(&temp_dir.path().join("absent"))
        .await
        .unwrap();
    assert!(rules.is_empty());
}

#[tokio::test]
async fn test_non_utf8_ignore_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("ignore");
    tokio::fs::write(&path, [b'*', 0xff, 0xfe, b'\n']).await.unwrap();

    let err = IgnoreRules::load(&path).await.unwrap_err();
    assert!(err.to_string().contains("failed to read ignore file"));
}

proptest! {
    #[test]
    fn literal_matches_itself(s in "[a-z0-9_./]{0,24}") {
        let pattern = parse(s.as_bytes());
        prop_assert!(pattern.is_match(ExactMatch, s.as_bytes()));
    }

    #[test]
    fn surrounded_literal_matches_any_container(
        prefix in "[a-z]{0,8}",
        needle in "[a-z]{1,8}",
        suffix in "[a-z]{0,8}",
    ) {
        let pattern = parse(format!("*{needle}*").as_bytes());
        let haystack = format!("{prefix}{needle}{suffix}");
        prop_assert!(pattern.is_match(ExactMatch, haystack.as_bytes()));
    }

    #[test]
    fn suffix_pattern_agrees_with_ends_with(name in "[a-zA-Z.]{0,16}", ext in "[a-z]{1,4}") {
        let pattern = parse(format!("*.{ext}").as_bytes());
        let expected = name.to_ascii_lowercase().ends_with(&format!(".{ext}"));
        prop_assert_eq!(pattern.is_match(CaseInsensitive, name.as_bytes()), expected);
    }

    #[test]
    fn path_match_ignores_separator_style(dir in "[a-z]{1,8}", file in "[a-z]{1,8}") {
        let pattern = parse(format!("{dir}/*").as_bytes());
        let windows_path = format!("{dir}\\{file}");
        prop_assert!(pattern.is_match(PathMatch, windows_path.as_bytes()));
    }
}
