/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

/// Convenient type alias of Result type for table layout.
pub type Result<T> = std::result::Result<T, LayoutError>;

/// Errors returned by table layout. Everything else (bad spans, empty grids, tables narrower
/// than their content) is absorbed and only shows up in the computed sizes.
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum LayoutError {
    /// The document changed structure while a layout pass was querying it. The partial
    /// results of the pass were discarded.
    #[error("document changed during table layout (generation {expected} became {found})")]
    StaleGrid { expected: u64, found: u64 },
    /// Every attempt of a layout pass raced with a document mutation.
    #[error("table layout did not settle after {0} attempts")]
    RetriesExhausted(u32),
    /// The layout options could not be parsed.
    #[error(transparent)]
    InvalidOptions(#[from] serde_json::Error),
}
