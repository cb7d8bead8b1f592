//! Small utility helpers used across modules.

use std::cmp::Ordering;

/// Case-insensitive substring test. `needle_lower` must already be lowercased so callers
/// matching one query against many fields only lowercase it once.
pub fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
  haystack.to_lowercase().contains(needle_lower)
}

/// Lexicographic comparison on the lowercased characters, without allocating.
pub fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
  a.chars().flat_map(char::to_lowercase).cmp(b.chars().flat_map(char::to_lowercase))
}

/// Log-safe truncation for user-supplied strings.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  match s.char_indices().nth(max) {
    None => s.to_string(),
    Some((cut, _)) => format!("{}… ({} bytes total)", &s[..cut], s.len()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn case_insensitive_helpers() {
    assert!(contains_ignore_case("Morning RUN", "run"));
    assert!(!contains_ignore_case("Swim", "run"));
    assert_eq!(cmp_ignore_case("apple", "Banana"), Ordering::Less);
    assert_eq!(cmp_ignore_case("Same", "sAME"), Ordering::Equal);
  }

  #[test]
  fn truncation_respects_char_boundaries() {
    assert_eq!(trunc_for_log("short", 10), "short");
    assert_eq!(trunc_for_log("ééééé", 2), "éé… (10 bytes total)");
  }
}
