// Copyright 2022 Colin Finck <colin@reactos.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use thiserror::Error;

/// Errors returned by the mutating and validating operations of a [`ListArena`].
///
/// Every operation that returns one of these leaves the arena exactly as it was before the call.
///
/// [`ListArena`]: crate::list::ListArena
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum ListError {
    #[error("payload must not be empty")]
    EmptyPayload,
    #[error("position {pos} is out of range for a list of length {len}")]
    PositionOutOfRange { pos: usize, len: usize },
    #[error("node handle does not refer to a live node")]
    StaleHandle,
    #[error("failed to allocate {size} bytes")]
    AllocFailed { size: usize },
    /// Returned by `delete` when no node from the given root onward holds the payload.
    #[error("no node holds the given payload")]
    NotFound,
    /// The formatter passed to `print` gave up on the node at `position`, counted from the
    /// node printing started at.
    #[error("formatter failed on the node at position {position}")]
    FormatFailed { position: usize },
}
