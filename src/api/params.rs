//! Query-string parsing that reports failures through the crate error type.
//!
//! Coordinates and radii arrive as raw text so that a malformed value yields
//! the JSON `invalid_coordinates`/`validation_error` body instead of axum's
//! plain-text query rejection.

use crate::errors::{Error, Result};

/// Reads a coordinate parameter.
///
/// Text that is not a number becomes `NaN`, which point validation rejects
/// as [`Error::InvalidCoordinates`].
pub fn coordinate(raw: Option<&str>) -> Option<f64> {
    raw.map(|text| text.trim().parse().unwrap_or(f64::NAN))
}

/// Reads an optional radius in kilometers.
///
/// # Errors
/// Returns [`Error::Validation`] when the value is not a number.
pub fn radius(raw: Option<&str>) -> Result<Option<f64>> {
    raw.map(|text| {
        text.trim()
            .parse()
            .map_err(|_| Error::validation("radius", "must be a number of kilometers"))
    })
    .transpose()
}
