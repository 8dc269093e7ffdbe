//! Deterministic enumeration of source sprites with expected letters.

use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// One input file paired with the letter inferred from its parent
/// directory, when that directory is named with a single letter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceImage {
    pub path: PathBuf,
    pub expected_letter: Option<char>,
}

/// Lazy walk over a source tree.
///
/// Yields the PNG files of each single-letter subdirectory (directories
/// sorted by name, files sorted by name within each), then the loose PNG
/// files directly under the root. Each directory's listing is read when
/// the walk reaches it.
pub struct SourceWalk {
    pending: VecDeque<(PathBuf, Option<char>)>,
    current: std::vec::IntoIter<SourceImage>,
}

/// Start a walk over `root`. Fails only when the root itself cannot be read.
pub fn walk_source(root: &Path) -> io::Result<SourceWalk> {
    let mut letter_dirs = Vec::new();
    for entry in root.read_dir()? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        if let Some(letter) = infer_expected_letter(&entry.file_name().to_string_lossy()) {
            letter_dirs.push((entry.path(), Some(letter)));
        }
    }
    letter_dirs.sort_by(|a, b| a.0.cmp(&b.0));

    let mut pending: VecDeque<_> = letter_dirs.into();
    pending.push_back((root.to_path_buf(), None));

    Ok(SourceWalk {
        pending,
        current: Vec::new().into_iter(),
    })
}

impl Iterator for SourceWalk {
    type Item = SourceImage;

    fn next(&mut self) -> Option<SourceImage> {
        loop {
            if let Some(item) = self.current.next() {
                return Some(item);
            }
            let (dir, letter) = self.pending.pop_front()?;
            self.current = png_files_sorted(&dir)
                .into_iter()
                .map(|path| SourceImage {
                    path,
                    expected_letter: letter,
                })
                .collect::<Vec<_>>()
                .into_iter();
        }
    }
}

/// A directory named with exactly one alphabetic character marks its
/// contents with that letter, lowercased.
fn infer_expected_letter(dir_name: &str) -> Option<char> {
    let mut chars = dir_name.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => Some(c.to_ascii_lowercase()),
        _ => None,
    }
}

fn png_files_sorted(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file() && is_png(entry.path()))
        .map(|entry| entry.into_path())
        .collect()
}

fn is_png(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("png"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("mkdir");
        }
        fs::write(path, b"png").expect("write");
    }

    fn collect(root: &Path) -> Vec<(String, Option<char>)> {
        walk_source(root)
            .expect("walk")
            .map(|item| {
                (
                    item.path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                    item.expected_letter,
                )
            })
            .collect()
    }

    #[test]
    fn letter_dirs_come_first_then_loose_files() {
        let temp = tempfile::tempdir().expect("tempdir");
        touch(&temp.path().join("b").join("bee.png"));
        touch(&temp.path().join("a").join("sheet2.png"));
        touch(&temp.path().join("a").join("sheet1.png"));
        touch(&temp.path().join("toy.png"));
        touch(&temp.path().join("notes.txt"));
        touch(&temp.path().join("misc_stuff").join("thing.png"));

        assert_eq!(
            collect(temp.path()),
            vec![
                ("sheet1.png".to_string(), Some('a')),
                ("sheet2.png".to_string(), Some('a')),
                ("bee.png".to_string(), Some('b')),
                ("toy.png".to_string(), None),
            ]
        );
    }

    #[test]
    fn uppercase_single_letter_dirs_are_lowercased() {
        let temp = tempfile::tempdir().expect("tempdir");
        touch(&temp.path().join("Q").join("quilt.png"));

        assert_eq!(collect(temp.path()), vec![("quilt.png".to_string(), Some('q'))]);
    }

    #[test]
    fn enumeration_order_is_stable_across_walks() {
        let temp = tempfile::tempdir().expect("tempdir");
        for name in ["c/cat.png", "a/ant.png", "a/axe.png", "zebra.png"] {
            touch(&temp.path().join(name));
        }

        let first = collect(temp.path());
        let second = collect(temp.path());
        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
    }

    #[test]
    fn missing_root_is_an_error() {
        assert!(walk_source(Path::new("/nonexistent/spritesort-walk")).is_err());
    }
}
