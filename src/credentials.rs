//! Ordered API key resolution.
//!
//! Sources are tried in a fixed order, each a pure present-or-absent
//! lookup: provider-specific environment variable, generic fallback
//! environment variable, then two keys in a local untracked secrets file.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::SpritesortError;

/// One place an API key may come from.
#[derive(Clone, Debug)]
pub enum CredentialSource {
    EnvVar(&'static str),
    SecretsKey { path: PathBuf, key: &'static str },
}

impl CredentialSource {
    fn lookup(&self) -> Option<String> {
        match self {
            CredentialSource::EnvVar(name) => {
                std::env::var(name).ok().filter(|value| !value.is_empty())
            }
            CredentialSource::SecretsKey { path, key } => {
                let text = fs::read_to_string(path).ok()?;
                let parsed: Value = serde_json::from_str(&text).ok()?;
                parsed
                    .get(*key)
                    .and_then(Value::as_str)
                    .filter(|value| !value.is_empty())
                    .map(str::to_string)
            }
        }
    }
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::EnvVar(name) => write!(f, "${name}"),
            CredentialSource::SecretsKey { path, key } => {
                write!(f, "'{key}' in {}", path.display())
            }
        }
    }
}

/// The default resolution order: OpenRouter env key, generic OpenAI env
/// key, then the OpenRouter and Gemini entries of the secrets file.
pub fn default_sources(secrets_path: &Path) -> Vec<CredentialSource> {
    vec![
        CredentialSource::EnvVar("OPENROUTER_API_KEY"),
        CredentialSource::EnvVar("OPENAI_API_KEY"),
        CredentialSource::SecretsKey {
            path: secrets_path.to_path_buf(),
            key: "openrouter_api_key",
        },
        CredentialSource::SecretsKey {
            path: secrets_path.to_path_buf(),
            key: "gemini_api_key",
        },
    ]
}

/// Return the first key the sources yield, or `MissingCredential` naming
/// everything that was tried.
pub fn resolve_api_key(sources: &[CredentialSource]) -> Result<String, SpritesortError> {
    for source in sources {
        if let Some(key) = source.lookup() {
            return Ok(key);
        }
    }

    let tried = sources
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    Err(SpritesortError::MissingCredential { tried })
}
