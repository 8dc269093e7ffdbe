//! Property tests for the label sanitizer invariants.

use proptest::prelude::*;

use spritesort::organize::label::sanitize;

fn expected_letter() -> impl Strategy<Value = Option<char>> {
    prop_oneof![Just(None), proptest::char::range('a', 'z').prop_map(Some)]
}

proptest! {
    #[test]
    fn sanitize_is_idempotent(raw in ".*", letter in expected_letter()) {
        let once = sanitize(&raw, letter);
        prop_assert_eq!(sanitize(&once, letter), once);
    }

    #[test]
    fn sanitize_never_returns_empty(raw in ".*", letter in expected_letter()) {
        prop_assert!(!sanitize(&raw, letter).is_empty());
    }

    #[test]
    fn sanitize_starts_with_the_expected_letter(raw in ".*", letter in proptest::char::range('a', 'z')) {
        let label = sanitize(&raw, Some(letter));
        prop_assert_eq!(label.chars().next(), Some(letter));
    }

    #[test]
    fn sanitize_output_is_a_valid_identifier(raw in ".*", letter in expected_letter()) {
        let label = sanitize(&raw, letter);

        prop_assert!(label
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'));
        prop_assert!(!label.starts_with('_'));
        prop_assert!(!label.ends_with('_'));
        prop_assert!(!label.contains("__"));
        prop_assert!(label
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic()));
    }
}
