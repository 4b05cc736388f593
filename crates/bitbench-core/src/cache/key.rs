use std::path::{Path, PathBuf};

use crate::fingerprint::sha256_hex;

/// Lookup address of one cached result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub suite_id: String,
    pub version: String,
    pub model: String,
    pub run_number: u32,
    pub test_index: usize,
}

impl CacheKey {
    pub fn new(
        suite_id: impl Into<String>,
        version: impl Into<String>,
        model: impl Into<String>,
        run_number: u32,
        test_index: usize,
    ) -> Self {
        Self {
            suite_id: suite_id.into(),
            version: version.into(),
            model: model.into(),
            run_number,
            test_index,
        }
    }

    pub fn file_name(&self) -> String {
        format!(
            "{}__run{}__test{}.json",
            sanitize(&self.model),
            self.run_number,
            self.test_index
        )
    }
}

pub(crate) fn version_dir(root: &Path, suite_id: &str, version: &str) -> PathBuf {
    root.join(sanitize(suite_id)).join(sanitize(version))
}

pub(crate) fn result_path(root: &Path, key: &CacheKey) -> PathBuf {
    version_dir(root, &key.suite_id, &key.version).join(key.file_name())
}

/// Maps a name onto a single safe path segment.
///
/// Names that needed rewriting get a short hash of the original appended, so
/// `openai/gpt-4o` and `openai_gpt-4o` land in different files.
pub fn sanitize(name: &str) -> String {
    let mut s: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    // "." and ".." would escape the directory.
    if s.chars().all(|c| c == '.') {
        s = s.replace('.', "_");
    }
    if s == name {
        return s;
    }
    let digest = sha256_hex(name);
    format!("{}-{}", s, &digest[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_is_stable() {
        let key = CacheKey::new("bsv-basics", "2026-01-01", "gpt-5.1-high", 2, 14);
        assert_eq!(key.file_name(), "gpt-5.1-high__run2__test14.json");
    }

    #[test]
    fn sanitize_keeps_safe_names() {
        assert_eq!(sanitize("gpt-5.1-high"), "gpt-5.1-high");
        assert_eq!(sanitize("openai_gpt-4o"), "openai_gpt-4o");
        assert_eq!(sanitize("2026-01-01"), "2026-01-01");
    }

    #[test]
    fn sanitize_rewrites_and_disambiguates() {
        let slash = sanitize("openai/gpt-4o");
        assert!(slash.starts_with("openai_gpt-4o-"), "{}", slash);
        assert_eq!(slash.len(), "openai_gpt-4o-".len() + 8);
        assert_ne!(slash, sanitize("openai_gpt-4o"));
        assert_ne!(sanitize("a b"), sanitize("a:b"));
        assert!(sanitize("..").starts_with("__-"));
        assert!(!sanitize("a/b").contains('/'));
    }

    #[test]
    fn colliding_model_names_get_distinct_files() {
        let a = CacheKey::new("s", "v", "openai/gpt-4o", 1, 0);
        let b = CacheKey::new("s", "v", "openai_gpt-4o", 1, 0);
        assert_ne!(a.file_name(), b.file_name());
        assert_eq!(b.file_name(), "openai_gpt-4o__run1__test0.json");
    }

    #[test]
    fn result_path_layout() {
        let key = CacheKey::new("suite", "1.0.0", "m", 1, 0);
        let p = result_path(Path::new("/tmp/cache"), &key);
        assert_eq!(p, PathBuf::from("/tmp/cache/suite/1.0.0/m__run1__test0.json"));
    }
}
