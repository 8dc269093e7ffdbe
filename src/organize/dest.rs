//! Bucket selection and collision-free destination paths.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SpritesortError;

/// Output bucket used when the label's first character is not a letter.
pub const MISC_BUCKET: &str = "misc";

const MAX_NUMBERED_ALTERNATIVES: u32 = 99;

/// A resolved output location: the bucket key and a path that did not
/// exist at assignment time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DestinationAssignment {
    pub bucket: String,
    pub path: PathBuf,
}

/// The bucket a label files under: the expected letter when present, else
/// the label's first character when alphabetic, else `misc`.
pub fn bucket_for(label: &str, expected_letter: Option<char>) -> String {
    if let Some(letter) = expected_letter {
        return letter.to_string();
    }
    match label.chars().next() {
        Some(first) if first.is_ascii_alphabetic() => first.to_ascii_lowercase().to_string(),
        _ => MISC_BUCKET.to_string(),
    }
}

/// Resolve a label to a free path under the bucket directory, creating the
/// directory if needed.
///
/// Probes `<label>.png`, then `<label>_2.png` .. `<label>_99.png`, and
/// returns the first path that does not exist. Existence checks hit the
/// live filesystem, so numbering carries across runs.
pub fn resolve(
    dest_root: &Path,
    label: &str,
    expected_letter: Option<char>,
) -> Result<DestinationAssignment, SpritesortError> {
    let bucket = bucket_for(label, expected_letter);
    let bucket_dir = dest_root.join(&bucket);
    fs::create_dir_all(&bucket_dir)?;

    let candidate = bucket_dir.join(format!("{label}.png"));
    if !candidate.exists() {
        return Ok(DestinationAssignment {
            bucket,
            path: candidate,
        });
    }

    for n in 2..=MAX_NUMBERED_ALTERNATIVES {
        let alternative = bucket_dir.join(format!("{label}_{n}.png"));
        if !alternative.exists() {
            return Ok(DestinationAssignment {
                bucket,
                path: alternative,
            });
        }
    }

    Err(SpritesortError::NameSpaceExhausted {
        stem: label.to_string(),
        dir: bucket_dir,
    })
}
