//! Collision-free destination naming.
//!
//! The first collision inserts `(2)` before the extension, later collisions
//! bump that number: `a.txt`, `a(2).txt`, `a(3).txt`. Compressed tarball
//! style names keep their double extension together (`a(2).tar.gz`).
//!
//! Nothing here reserves the returned path, so a concurrent writer can
//! still take it between the check and its use.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use log::debug;
use regex::Regex;

/// `.tar.gz`, `.tgz.bz2`, `.cpio.Z`, ...
static DOUBLE_EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.[^.]{1,3}\.(?:gz|bz2|z)$").expect("valid regex"));

/// Last `(<n>)` in the name.
static COLLISION_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*\()(\d+)\)").expect("valid regex"));

/// Return `candidate`, or the first numbered variant of it that does not
/// exist yet.
pub fn unique_path(candidate: &Path) -> PathBuf {
    let mut path = candidate.to_path_buf();
    let mut first = true;

    while is_taken(&path) {
        let Some(leaf) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            return path;
        };
        let next = if first {
            insert_marker(&leaf)
        } else {
            bump_marker(&leaf)
        };
        first = false;
        path.set_file_name(next);
    }

    if path != candidate {
        debug!("{} exists, using {}", candidate.display(), path.display());
    }
    path
}

/// Dangling symlinks count as taken.
fn is_taken(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

fn insert_marker(leaf: &str) -> String {
    let split = match DOUBLE_EXTENSION.find(leaf) {
        Some(m) => m.start(),
        // a leading dot starts a hidden name, not an extension
        None => match leaf.rfind('.') {
            Some(dot) if dot > 0 => dot,
            _ => leaf.len(),
        },
    };
    format!("{}(2){}", &leaf[..split], &leaf[split..])
}

fn bump_marker(leaf: &str) -> String {
    let Some(caps) = COLLISION_MARKER.captures(leaf) else {
        return insert_marker(leaf);
    };
    let whole = caps.get(0).map_or(0..leaf.len(), |m| m.range());
    let n: u64 = caps[2].parse().unwrap_or(1);
    format!("{}{}){}", &caps[1], n.saturating_add(1), &leaf[whole.end..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn free_candidate_is_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let candidate = dir.path().join("a.txt");
        assert_eq!(unique_path(&candidate), candidate);
    }

    #[test]
    fn collisions_count_up() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("a.txt")).unwrap();
        assert_eq!(unique_path(&dir.path().join("a.txt")), dir.path().join("a(2).txt"));

        File::create(dir.path().join("a(2).txt")).unwrap();
        assert_eq!(unique_path(&dir.path().join("a.txt")), dir.path().join("a(3).txt"));
        assert_eq!(unique_path(&dir.path().join("a(2).txt")), dir.path().join("a(3).txt"));
    }

    #[test]
    fn double_extension_stays_together() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("a.tar.gz")).unwrap();
        assert_eq!(
            unique_path(&dir.path().join("a.tar.gz")),
            dir.path().join("a(2).tar.gz")
        );
    }

    #[test]
    fn directories_collide_too() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("addon")).unwrap();
        fs::create_dir(dir.path().join("addon(2)")).unwrap();
        assert_eq!(unique_path(&dir.path().join("addon")), dir.path().join("addon(3)"));
    }

    #[test]
    fn marker_placement() {
        assert_eq!(insert_marker("a.txt"), "a(2).txt");
        assert_eq!(insert_marker("a.b.c"), "a.b(2).c");
        assert_eq!(insert_marker("a.TAR.GZ"), "a(2).TAR.GZ");
        assert_eq!(insert_marker("a.cpio.Z"), "a(2).cpio.Z");
        assert_eq!(insert_marker("a.long.gz"), "a.long(2).gz");
        assert_eq!(insert_marker("noext"), "noext(2)");
        assert_eq!(insert_marker(".bashrc"), ".bashrc(2)");
        assert_eq!(insert_marker(".config.json"), ".config(2).json");
    }

    #[test]
    fn bump_uses_last_marker() {
        assert_eq!(bump_marker("a(2).txt"), "a(3).txt");
        assert_eq!(bump_marker("a(9).tar.gz"), "a(10).tar.gz");
        // an unrelated parenthesised number is treated as a marker as well
        assert_eq!(bump_marker("report(7)(2).txt"), "report(7)(3).txt");
        assert_eq!(bump_marker("plain"), "plain(2)");
    }
}
