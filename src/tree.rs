use crate::contract::{EntryKind, FileTreeEntry};

/// Immediate children of `parent` in a flat tree, directories first, then by
/// path ignoring case.
///
/// `parent` is a directory path without trailing slash; the empty string is the root.
pub fn children<'a>(entries: &'a [FileTreeEntry], parent: &str) -> Vec<&'a FileTreeEntry> {
    let parent = parent.trim_matches('/');
    let prefix = if parent.is_empty() {
        String::new()
    } else {
        format!("{parent}/")
    };

    let mut found: Vec<&FileTreeEntry> = entries
        .iter()
        .filter(|entry| {
            entry
                .path
                .strip_prefix(prefix.as_str())
                .is_some_and(|rest| !rest.is_empty() && !rest.contains('/'))
        })
        .collect();
    found.sort_by(|a, b| {
        let a_dir = a.kind == EntryKind::Directory;
        let b_dir = b.kind == EntryKind::Directory;
        b_dir
            .cmp(&a_dir)
            .then_with(|| a.path.to_lowercase().cmp(&b.path.to_lowercase()))
            .then_with(|| a.path.cmp(&b.path))
    });
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str, kind: EntryKind) -> FileTreeEntry {
        FileTreeEntry {
            path: path.to_string(),
            kind,
            content_hash: String::new(),
            size_bytes: None,
        }
    }

    fn sample() -> Vec<FileTreeEntry> {
        vec![
            entry("src", EntryKind::Directory),
            entry("src/main.rs", EntryKind::File),
            entry("src/bin", EntryKind::Directory),
            entry("src/bin/tool.rs", EntryKind::File),
            entry("README.md", EntryKind::File),
            entry("Cargo.toml", EntryKind::File),
            entry("docs", EntryKind::Directory),
            entry("srcx.txt", EntryKind::File),
        ]
    }

    fn paths(found: Vec<&FileTreeEntry>) -> Vec<&str> {
        found.into_iter().map(|e| e.path.as_str()).collect()
    }

    #[test]
    fn root_lists_top_level_with_directories_first() {
        let tree = sample();
        assert_eq!(
            paths(children(&tree, "")),
            ["docs", "src", "Cargo.toml", "README.md", "srcx.txt"]
        );
    }

    #[test]
    fn nested_directory_matches_on_full_segment() {
        let tree = sample();
        assert_eq!(paths(children(&tree, "src")), ["src/bin", "src/main.rs"]);
        assert_eq!(paths(children(&tree, "src/bin/")), ["src/bin/tool.rs"]);
        assert!(children(&tree, "docs").is_empty());
    }

    #[test]
    fn names_sort_without_regard_to_case() {
        let tree = vec![
            entry("B.txt", EntryKind::File),
            entry("a.txt", EntryKind::File),
            entry("Zeta", EntryKind::Directory),
            entry("alpha", EntryKind::Directory),
            entry("c.txt", EntryKind::File),
        ];
        assert_eq!(
            paths(children(&tree, "")),
            ["alpha", "Zeta", "a.txt", "B.txt", "c.txt"]
        );
    }
}
