//! Unit tests for `TagList` parsing and encoding.

use linkmark::types::tags::TagList;

#[test]
fn test_parse_trims_and_drops_blank_entries() {
    let tags = TagList::parse(" news, tech ,, ,rust ");
    assert_eq!(tags.as_slice(), &["news", "tech", "rust"]);
    assert_eq!(tags.len(), 3);
}

#[test]
fn test_empty_string_parses_to_empty_list() {
    assert!(TagList::parse("").is_empty());
    assert!(TagList::parse(" , ,").is_empty());
}

#[test]
fn test_storage_string_is_unpadded() {
    assert_eq!(TagList::parse("news, tech").to_storage_string(), "news,tech");
}

#[test]
fn test_from_vec_normalizes_entries() {
    let tags = TagList::from(vec![" a ".to_string(), String::new(), "b".to_string()]);
    assert_eq!(tags.as_slice(), &["a", "b"]);
}

#[test]
fn test_serializes_as_plain_array() {
    let json = serde_json::to_value(TagList::parse("a,b")).unwrap();
    assert_eq!(json, serde_json::json!(["a", "b"]));
}
