//! Typed failures at the pipeline's network and data boundaries.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    /// No device position: denied, timed out or no source configured.
    /// Callers may fall back to an IP lookup or continue without a location.
    #[error("Device location unavailable: {0}")]
    Unavailable(String),

    /// The IP geolocation provider failed or answered with something unusable.
    #[error("Location provider error: {0}")]
    Provider(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Weather provider error: {0}")]
    Provider(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("Forecast payload contains no daily entries")]
    EmptyDaily,

    #[error("Daily series '{series}' has {found} values for {expected} days")]
    MisalignedSeries {
        series: &'static str,
        expected: usize,
        found: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Location(#[from] LocationError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

/// Cut provider bodies down before quoting them in an error.
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }

    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
