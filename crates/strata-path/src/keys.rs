#![forbid(unsafe_code)]

//! Key and pattern derivation.
//!
//! All keys are container-relative. A file's blobs live under
//! `<seg1>/<seg2>/.../<name><BLOB_SEPARATOR><number>`; directory markers end
//! with [`SEPARATOR`]. The derived patterns are full-match: a file whose
//! name is a textual prefix of another file's name never matches the other
//! file's blobs.

use regex::Regex;

use crate::path::StorePath;

/// Separator between path segments in derived keys.
pub const SEPARATOR: char = '/';

/// Separator between a file's key prefix and the blob number suffix.
pub const BLOB_SEPARATOR: char = '.';

/// Prefix shared by all blobs of `file`: segments joined by [`SEPARATOR`]
/// with [`BLOB_SEPARATOR`] appended.
#[must_use]
pub fn blob_key_prefix(file: &StorePath) -> String {
    let mut prefix = join_segments(file);
    prefix.push(BLOB_SEPARATOR);
    prefix
}

/// The literal key of blob `number` of `file`.
#[must_use]
pub fn blob_key(file: &StorePath, number: u64) -> String {
    let mut key = blob_key_prefix(file);
    key.push_str(&number.to_string());
    key
}

/// Full-match pattern for the blobs of the file with the given
/// [`blob_key_prefix`]: the prefix followed by a purely numeric suffix and
/// nothing else.
#[must_use]
pub fn blob_key_regex(prefix: &str) -> Regex {
    Regex::new(&format!("^{}\\d+$", regex::escape(prefix)))
        .expect("escaped prefix always forms a valid pattern")
}

/// Prefix under which the immediate children of `directory` live.
///
/// The container root yields the empty prefix, so root listings work the
/// same way as nested ones.
#[must_use]
pub fn child_keys_prefix(directory: &StorePath) -> String {
    if directory.is_root() {
        return String::new();
    }
    let mut prefix = join_segments(directory);
    prefix.push(SEPARATOR);
    prefix
}

/// Full-match pattern for the immediate children of `directory`: blob keys
/// and directory markers exactly one level down, deeper descendants
/// excluded.
#[must_use]
pub fn child_keys_regex(directory: &StorePath) -> Regex {
    let prefix = child_keys_prefix(directory);
    Regex::new(&format!("^{}[^{SEPARATOR}]+{SEPARATOR}?$", regex::escape(&prefix)))
        .expect("escaped prefix always forms a valid pattern")
}

/// The directory marker key for `directory`: segments joined by
/// [`SEPARATOR`] with a trailing [`SEPARATOR`]. The container root has no
/// marker and yields the empty string.
#[must_use]
pub fn container_key(directory: &StorePath) -> String {
    child_keys_prefix(directory)
}

/// Whether `key` names a directory marker (trailing [`SEPARATOR`]).
#[must_use]
pub fn is_directory_key(key: &str) -> bool {
    key.ends_with(SEPARATOR)
}

/// Whether `key` names a blob.
#[must_use]
pub fn is_blob_key(key: &str) -> bool {
    !is_directory_key(key)
}

/// The file name encoded in a blob key: the part between the last
/// [`SEPARATOR`] and the number suffix.
///
/// Returns `None` if `key` carries no [`BLOB_SEPARATOR`].
#[must_use]
pub fn file_name_of_key(key: &str) -> Option<&str> {
    let start = key.rfind(SEPARATOR).map_or(0, |i| i + 1);
    let end = key.rfind(BLOB_SEPARATOR)?;
    (end >= start).then(|| &key[start..end])
}

/// The directory name encoded in a marker key: the last segment before the
/// trailing [`SEPARATOR`].
#[must_use]
pub fn directory_name_of_key(key: &str) -> Option<&str> {
    let trimmed = key.strip_suffix(SEPARATOR)?;
    let start = trimmed.rfind(SEPARATOR).map_or(0, |i| i + 1);
    Some(&trimmed[start..])
}

/// The blob number suffix of `key`, if present and a canonical decimal.
#[must_use]
pub fn blob_number_from_key(key: &str) -> Option<u64> {
    let suffix = &key[key.rfind(BLOB_SEPARATOR)? + 1..];
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    suffix.parse().ok()
}

fn join_segments(path: &StorePath) -> String {
    path.segments().join(&SEPARATOR.to_string())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn file(segments: &[&str]) -> StorePath {
        StorePath::new("store", segments.iter().copied()).unwrap()
    }

    #[test]
    fn blob_keys_are_prefix_plus_number() {
        let path = file(&["data", "channel", "file.bin"]);
        assert_eq!(blob_key_prefix(&path), "data/channel/file.bin.");
        assert_eq!(blob_key(&path, 0), "data/channel/file.bin.0");
        assert_eq!(blob_key(&path, 17), "data/channel/file.bin.17");
    }

    #[test]
    fn blob_regex_requires_numeric_suffix_to_the_end() {
        let path = file(&["report"]);
        let pattern = blob_key_regex(&blob_key_prefix(&path));

        assert!(pattern.is_match("report.0"));
        assert!(pattern.is_match("report.42"));
        assert!(!pattern.is_match("report."));
        assert!(!pattern.is_match("report.0x"));
        assert!(!pattern.is_match("report.0/extra"));
    }

    #[test]
    fn prefix_named_files_never_cross_match() {
        let short = file(&["report"]);
        let long = file(&["report-2024"]);

        let short_pattern = blob_key_regex(&blob_key_prefix(&short));
        let long_pattern = blob_key_regex(&blob_key_prefix(&long));

        // "report-2024"'s blobs must not look like blobs of "report".
        assert!(!short_pattern.is_match(&blob_key(&long, 0)));
        assert!(!long_pattern.is_match(&blob_key(&short, 0)));
    }

    #[test]
    fn dots_inside_segments_do_not_confuse_the_pattern() {
        let path = file(&["archive.2024"]);
        let pattern = blob_key_regex(&blob_key_prefix(&path));

        assert!(pattern.is_match("archive.2024.3"));
        // The bare name is not a blob of itself.
        assert!(!pattern.is_match("archive.2024"));
    }

    #[rstest]
    #[case(&["data", "channel"], "data/channel/")]
    #[case(&["data"], "data/")]
    #[case(&[], "")]
    fn child_prefixes(#[case] segments: &[&str], #[case] expected: &str) {
        assert_eq!(child_keys_prefix(&file(segments)), expected);
    }

    #[test]
    fn child_regex_matches_immediate_children_only() {
        let dir = file(&["data"]);
        let pattern = child_keys_regex(&dir);

        assert!(pattern.is_match("data/file.bin.0"));
        assert!(pattern.is_match("data/subdir/"));
        assert!(!pattern.is_match("data/subdir/file.bin.0"));
        assert!(!pattern.is_match("other/file.bin.0"));
        assert!(!pattern.is_match("data/"));
    }

    #[test]
    fn root_children_match_top_level_keys() {
        let root = StorePath::root("store").unwrap();
        let pattern = child_keys_regex(&root);

        assert!(pattern.is_match("file.bin.0"));
        assert!(pattern.is_match("dir/"));
        assert!(!pattern.is_match("dir/file.bin.0"));
    }

    #[rstest]
    #[case("data/file.bin.0", Some("file.bin"))]
    #[case("file.7", Some("file"))]
    #[case("data/plain", None)]
    fn file_names(#[case] key: &str, #[case] expected: Option<&str>) {
        assert_eq!(file_name_of_key(key), expected);
    }

    #[rstest]
    #[case("data/subdir/", Some("subdir"))]
    #[case("top/", Some("top"))]
    #[case("data/file.bin.0", None)]
    fn directory_names(#[case] key: &str, #[case] expected: Option<&str>) {
        assert_eq!(directory_name_of_key(key), expected);
    }

    #[rstest]
    #[case("data/file.bin.12", Some(12))]
    #[case("file.0", Some(0))]
    #[case("file.", None)]
    #[case("file.1x", None)]
    #[case("plain", None)]
    fn blob_numbers(#[case] key: &str, #[case] expected: Option<u64>) {
        assert_eq!(blob_number_from_key(key), expected);
    }

    #[test]
    fn directory_markers() {
        assert!(is_directory_key("data/subdir/"));
        assert!(!is_directory_key("data/file.bin.0"));
        assert!(is_blob_key("data/file.bin.0"));
        assert_eq!(container_key(&file(&["data", "sub"])), "data/sub/");
    }
}
