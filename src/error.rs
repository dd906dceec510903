use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading and indexing the content set. All of these are
/// fatal at startup: the server never starts over a partially indexed site.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no metadata delimiter found in {}", .path.display())]
    MalformedContentFile { path: PathBuf },

    #[error("invalid metadata in {}: {}", .path.display(), .source)]
    MalformedMetadata {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("post {} declares no url", .path.display())]
    MissingUrl { path: PathBuf },

    #[error("duplicate content identity {}.{} in {}", .id, .locale, .path.display())]
    DuplicateIdentity {
        id: String,
        locale: String,
        path: PathBuf,
    },

    #[error("url {url} is already taken by another post in locale {locale}")]
    DuplicateUrl { url: String, locale: String },

    #[error("{} uses locale {}, which is not configured", .path.display(), .locale)]
    UnknownLocale { locale: String, path: PathBuf },

    #[error("locale {locale} has no 404 page")]
    MissingNotFoundPage { locale: String },

    #[error("markdown rendering failed for {id}.{locale}: {reason}")]
    Render {
        id: String,
        locale: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Errors raised while running a middleware chain over a request. These abort
/// the hook invocation for that request only; the indexes are untouched.
#[derive(Debug, Error)]
pub enum HookError {
    #[error("proceed() called more than once in a middleware")]
    ReentrantProceed,

    #[error("middleware chain did not finish in time")]
    Timeout,

    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}
