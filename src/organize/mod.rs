//! The batch pipeline: walk, classify, sanitize, place.
//!
//! Per-item failures are downgraded to the fallback label (or skipped for
//! placement failures) so one bad sprite never aborts the run.

pub mod dest;
pub mod label;
pub mod walk;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::api::limit::{Clock, RateLimiter};
use crate::api::retry::RetryPolicy;
use crate::api::Classifier;
use crate::error::SpritesortError;

/// Options for one organize run.
#[derive(Clone, Debug)]
pub struct OrganizeOptions {
    pub source_root: PathBuf,
    pub dest_root: PathBuf,
    /// Skip every item whose output bucket sorts before this letter.
    pub start_at: Option<char>,
}

/// Counters reported at the end of a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OrganizeReport {
    pub processed: usize,
    pub copied: usize,
    pub fallbacks: usize,
    pub skipped: usize,
}

/// Drive the full pipeline over every source image.
///
/// Classification goes through the retry policy and rate limiter; on
/// permanent failure the item is filed under the fallback label instead.
/// Placement failures (no free name, copy error) skip the item only.
pub fn run<K, C>(
    classifier: &K,
    policy: &RetryPolicy,
    limiter: &mut RateLimiter<C>,
    options: &OrganizeOptions,
) -> Result<OrganizeReport, SpritesortError>
where
    K: Classifier,
    C: Clock,
{
    if !options.source_root.is_dir() {
        return Err(SpritesortError::SourceNotFound {
            path: options.source_root.clone(),
        });
    }
    fs::create_dir_all(&options.dest_root)?;

    let mut report = OrganizeReport::default();

    for item in walk::walk_source(&options.source_root)? {
        report.processed += 1;

        // When the bucket is already known from the expected letter, skip
        // before spending an API call on it.
        if let (Some(start), Some(letter)) = (options.start_at, item.expected_letter) {
            if letter < start {
                println!(
                    "Skipping {} (bucket '{letter}' before start letter)",
                    item.path.display()
                );
                report.skipped += 1;
                continue;
            }
        }

        let outcome = fs::read(&item.path)
            .map_err(SpritesortError::from)
            .and_then(|bytes| {
                policy.attempt(limiter, || classifier.classify(&bytes, item.expected_letter))
            });

        let sprite_label = match outcome {
            Ok(raw) => label::sanitize(&raw, item.expected_letter),
            Err(err) => {
                let fallback = label::fallback_label(item.expected_letter);
                println!(
                    "Failed to name {}: {err}; using fallback '{fallback}'",
                    item.path.display()
                );
                report.fallbacks += 1;
                fallback
            }
        };

        let bucket = dest::bucket_for(&sprite_label, item.expected_letter);
        if let Some(start) = options.start_at {
            if bucket.as_str() < start.to_string().as_str() {
                println!(
                    "Skipping {} (bucket '{bucket}' before start letter)",
                    item.path.display()
                );
                report.skipped += 1;
                continue;
            }
        }

        let assignment = match dest::resolve(&options.dest_root, &sprite_label, item.expected_letter)
        {
            Ok(assignment) => assignment,
            Err(err) => {
                println!("Failed to place {}: {err}", item.path.display());
                report.skipped += 1;
                continue;
            }
        };

        if let Err(err) = copy_preserving_mtime(&item.path, &assignment.path) {
            println!("Failed to copy {}: {err}", item.path.display());
            report.skipped += 1;
            continue;
        }

        println!("Wrote {}", assignment.path.display());
        report.copied += 1;
    }

    Ok(report)
}

/// Copy contents and permissions, then carry the source's modification
/// time over to the destination.
fn copy_preserving_mtime(source: &Path, dest: &Path) -> io::Result<()> {
    fs::copy(source, dest)?;
    let modified = fs::metadata(source)?.modified()?;
    fs::File::options()
        .append(true)
        .open(dest)?
        .set_modified(modified)
}
