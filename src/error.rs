use std::path::PathBuf;
use thiserror::Error;

/// Fatal conditions. Per-sample read/copy failures are not represented here;
/// the converter counts those and moves on.
#[derive(Debug, Error)]
pub enum PrepError {
    #[error("{what} not found: {}", path.display())]
    NotFound { what: &'static str, path: PathBuf },

    #[error(
        "Duplicate prompt text found in {} and {}: {prompt}",
        first.display(),
        second.display()
    )]
    DuplicatePrompt {
        prompt: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Ambiguous mapping for {sample}: prompt matches {} keys {keys:?}", keys.len())]
    AmbiguousMatch { sample: String, keys: Vec<String> },
}

impl PrepError {
    pub fn not_found(what: &'static str, path: impl Into<PathBuf>) -> Self {
        PrepError::NotFound {
            what,
            path: path.into(),
        }
    }
}
