//! Classification service plumbing.
//!
//! This module owns the network-facing concerns: the chat completion
//! client, client-side rate limiting, and bounded retry with backoff.
//! Everything filesystem-shaped stays in `crate::organize`.

pub mod client;
pub mod limit;
pub mod retry;

use crate::error::SpritesortError;

/// A thing that can turn one image into a raw text label.
///
/// Implemented by [`client::ClassifierClient`] for real runs and by stubs
/// in the pipeline tests.
pub trait Classifier {
    fn classify(
        &self,
        image: &[u8],
        expected_letter: Option<char>,
    ) -> Result<String, SpritesortError>;
}
