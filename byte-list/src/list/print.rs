// Copyright 2022 Colin Finck <colin@reactos.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use alloc::vec::Vec;

use log::{debug, warn};

use super::base::{ListArena, NodeRef};
use crate::error::ListError;

/// Default number of bytes the print buffer starts with.
pub const PRINT_INITIAL_CAPACITY: usize = 16;

/// Default number of bytes the formatter may write for every node.
pub const PRINT_GROWTH_THRESHOLD: usize = 8;

/// Buffer settings for [`ListArena::print_with`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PrintOptions {
    /// Number of bytes the buffer starts with.
    pub initial_capacity: usize,
    /// Minimum number of writable bytes the formatter gets for every node.
    /// The buffer doubles whenever fewer bytes are left.
    pub growth_threshold: usize,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            initial_capacity: PRINT_INITIAL_CAPACITY,
            growth_threshold: PRINT_GROWTH_THRESHOLD,
        }
    }
}

/// Zero-filled output buffer with a write cursor.
struct PrintBuffer {
    bytes: Vec<u8>,
    cursor: usize,
}

impl PrintBuffer {
    fn with_capacity(capacity: usize) -> Result<Self, ListError> {
        let mut buffer = Self {
            bytes: Vec::new(),
            cursor: 0,
        };
        buffer.resize(capacity)?;

        Ok(buffer)
    }

    fn advance(&mut self, written: usize) {
        self.cursor += written;
    }

    fn headroom(&self) -> usize {
        self.bytes.len() - self.cursor
    }

    fn into_bytes(mut self) -> Vec<u8> {
        self.bytes.truncate(self.cursor);
        self.bytes
    }

    /// Doubles the buffer until at least `threshold` bytes are left after the cursor.
    fn reserve_headroom(&mut self, threshold: usize) -> Result<(), ListError> {
        while self.headroom() < threshold {
            let new_len = self.bytes.len().saturating_mul(2).max(threshold);
            debug!(
                "growing print buffer from {} to {} bytes",
                self.bytes.len(),
                new_len
            );
            self.resize(new_len)?;
        }

        Ok(())
    }

    fn resize(&mut self, new_len: usize) -> Result<(), ListError> {
        self.bytes
            .try_reserve_exact(new_len - self.bytes.len())
            .map_err(|_| {
                warn!("failed to allocate {} bytes for the print buffer", new_len);
                ListError::AllocFailed { size: new_len }
            })?;
        self.bytes.resize(new_len, 0);

        Ok(())
    }

    fn window(&mut self) -> &mut [u8] {
        &mut self.bytes[self.cursor..]
    }
}

impl ListArena {
    /// Prints the list starting at `node` using the default [`PrintOptions`].
    ///
    /// See [`ListArena::print_with`].
    pub fn print<N, F>(&self, node: N, formatter: F) -> Result<Vec<u8>, ListError>
    where
        N: Into<Option<NodeRef>>,
        F: FnMut(&[u8], &mut [u8]) -> Option<usize>,
    {
        self.print_with(node, PrintOptions::default(), formatter)
    }

    /// Prints the list starting at `node` by calling `formatter` for every payload in order.
    ///
    /// `formatter` gets the payload and the zero-filled, writable part of the output buffer.
    /// That part is at least `options.growth_threshold` bytes long.
    /// It returns the number of bytes it has written, or `None` to abort printing.
    /// Returning a number larger than the given part also aborts printing.
    ///
    /// On success, the written bytes are returned.
    /// `None` for `node` prints nothing and returns an empty buffer.
    pub fn print_with<N, F>(
        &self,
        node: N,
        options: PrintOptions,
        mut formatter: F,
    ) -> Result<Vec<u8>, ListError>
    where
        N: Into<Option<NodeRef>>,
        F: FnMut(&[u8], &mut [u8]) -> Option<usize>,
    {
        let start = match node.into() {
            Some(node) => self.resolve(node)?,
            None => return Ok(Vec::new()),
        };

        let mut buffer = PrintBuffer::with_capacity(options.initial_capacity)?;

        for (position, index) in self.walk(start).enumerate() {
            buffer.reserve_headroom(options.growth_threshold)?;

            let window = buffer.window();
            let available = window.len();
            let written = formatter(self.node(index).data.bytes(), window)
                .filter(|&written| written <= available)
                .ok_or(ListError::FormatFailed { position })?;

            buffer.advance(written);
        }

        Ok(buffer.into_bytes())
    }
}
