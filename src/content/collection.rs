//! Collection builder: file names in, `identity → Document` mapping out.
//!
//! Parses are independent of one another, so the builder fans out over
//! rayon. A file that fails to fetch or parse is excluded with a warning;
//! one bad document never blocks the rest of the collection.

use super::{Document, parser};
use crate::log;
use crate::source::{CommitInfo, SourceError};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Fetch capability: one file's bytes plus optional sibling metadata bytes.
pub type Fetch<'a> = dyn Fn(&Path) -> Result<(Vec<u8>, Option<Vec<u8>>), SourceError> + Sync + 'a;

/// Commit-info capability for one file.
pub type Stamps<'a> = dyn Fn(&Path) -> Option<CommitInfo> + Sync + 'a;

/// Build a document mapping from a list of candidate file names.
///
/// Files without the recognized `extension` are ignored (not an error).
pub fn build(
    file_names: &[PathBuf],
    extension: &str,
    fetch: &Fetch,
    stamps: &Stamps,
) -> BTreeMap<String, Arc<Document>> {
    let items: Vec<(String, Arc<Document>)> = file_names
        .par_iter()
        .filter(|path| has_extension(path, extension))
        .filter_map(|path| {
            let (raw, meta) = match fetch(path) {
                Ok(fetched) => fetched,
                Err(err) => {
                    log!("warn"; "skipping {}: {err}", path.display());
                    return None;
                }
            };

            match parser::parse(path, &raw, meta.as_deref(), stamps(path)) {
                Ok(doc) => Some((doc.slug.clone(), Arc::new(doc))),
                Err(err) => {
                    log!("warn"; "skipping {}: {err}", path.display());
                    None
                }
            }
        })
        .collect();

    items.into_iter().collect()
}

/// Case-insensitive extension match.
fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn fetch_from(files: &[(&str, &[u8])]) -> impl Fn(&Path) -> Result<(Vec<u8>, Option<Vec<u8>>), SourceError> + Sync {
        let files: Vec<(PathBuf, Vec<u8>)> = files
            .iter()
            .map(|(p, b)| (PathBuf::from(p), b.to_vec()))
            .collect();
        move |path: &Path| {
            files
                .iter()
                .find(|(p, _)| p == path)
                .map(|(_, b)| (b.clone(), None))
                .ok_or_else(|| SourceError::NotFound(path.to_path_buf()))
        }
    }

    fn no_stamps(_: &Path) -> Option<CommitInfo> {
        None
    }

    #[test]
    fn test_build_parses_all_content_files() {
        let fetch = fetch_from(&[
            ("content/en/a.md", b"# A\nbody\n"),
            ("content/en/b.md", b"# B\nbody\n"),
        ]);
        let names = vec![
            PathBuf::from("content/en/a.md"),
            PathBuf::from("content/en/b.md"),
        ];

        let docs = build(&names, "md", &fetch, &no_stamps);

        assert_eq!(docs.len(), 2);
        assert_eq!(docs["a"].meta.title, "A");
        assert_eq!(docs["b"].meta.title, "B");
    }

    #[test]
    fn test_build_ignores_foreign_extensions() {
        let fetch = fetch_from(&[
            ("content/en/a.md", b"# A\n"),
            ("content/en/cover.png", b"\xff\xd8"),
            ("content/en/a.yml", b"title: x"),
        ]);
        let names = vec![
            PathBuf::from("content/en/a.md"),
            PathBuf::from("content/en/cover.png"),
            PathBuf::from("content/en/a.yml"),
        ];

        let docs = build(&names, "md", &fetch, &no_stamps);

        assert_eq!(docs.len(), 1);
        assert!(docs.contains_key("a"));
    }

    #[test]
    fn test_build_excludes_failing_file() {
        // b.md is not valid UTF-8; a.md must still make it through
        let fetch = fetch_from(&[
            ("content/en/a.md", b"# A\n"),
            ("content/en/b.md", &[0xff, 0xfe]),
        ]);
        let names = vec![
            PathBuf::from("content/en/a.md"),
            PathBuf::from("content/en/b.md"),
        ];

        let docs = build(&names, "md", &fetch, &no_stamps);

        assert_eq!(docs.len(), 1);
        assert!(docs.contains_key("a"));
    }

    #[test]
    fn test_build_excludes_unfetchable_file() {
        let fetch = fetch_from(&[("content/en/a.md", b"# A\n")]);
        let names = vec![
            PathBuf::from("content/en/a.md"),
            PathBuf::from("content/en/ghost.md"),
        ];

        let docs = build(&names, "md", &fetch, &no_stamps);

        assert_eq!(docs.len(), 1);
    }

    #[test]
    fn test_build_empty_input() {
        let fetch = fetch_from(&[]);
        let docs = build(&[], "md", &fetch, &no_stamps);
        assert!(docs.is_empty());
    }
}
