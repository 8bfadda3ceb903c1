// Copyright 2022 Colin Finck <colin@reactos.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use alloc::vec::Vec;

use super::base::{ListArena, NodeRef};
use crate::error::ListError;
use crate::traits::Payload;

/// Typed variants of the list functions for [`Payload`] values.
///
/// These only convert between values and their bytes.
/// A list may mix payloads of different types, in which case `get_value` returns `None` for
/// every payload whose size differs from the requested type.
impl ListArena {
    /// Deletes the first node from `root` onward whose payload starts with the bytes of `value`.
    ///
    /// See [`ListArena::delete`].
    pub fn delete_value<P: Payload>(
        &mut self,
        root: NodeRef,
        value: &P,
    ) -> Result<Option<NodeRef>, ListError> {
        self.delete(root, value.as_bytes())
    }

    /// Returns a copy of the value at position `pos`, counted from `node`.
    ///
    /// See [`ListArena::get`].
    pub fn get_value<P: Payload>(&self, node: NodeRef, pos: usize) -> Option<P> {
        self.get(node, pos).and_then(P::from_bytes)
    }

    /// Creates a new list holding a copy of `value`.
    ///
    /// See [`ListArena::init`].
    pub fn init_value<P: Payload>(&mut self, value: &P) -> Result<NodeRef, ListError> {
        self.init(value.as_bytes())
    }

    /// Inserts a copy of `value` at position `pos` of the list starting at `root`.
    ///
    /// See [`ListArena::insert`].
    pub fn insert_value<P: Payload>(
        &mut self,
        root: NodeRef,
        value: &P,
        pos: usize,
    ) -> Result<NodeRef, ListError> {
        self.insert(root, value.as_bytes(), pos)
    }

    /// Prints the list starting at `node`, handing every payload to `formatter` as a `P`.
    ///
    /// Payloads that are not a `P` abort printing with [`ListError::FormatFailed`].
    ///
    /// See [`ListArena::print`].
    pub fn print_values<P, N, F>(&self, node: N, mut formatter: F) -> Result<Vec<u8>, ListError>
    where
        P: Payload,
        N: Into<Option<NodeRef>>,
        F: FnMut(&P, &mut [u8]) -> Option<usize>,
    {
        self.print(node, |payload, out| {
            let value = P::from_bytes(payload)?;
            formatter(&value, out)
        })
    }

    /// Returns the first node from `node` onward whose payload starts with the bytes of `value`.
    ///
    /// See [`ListArena::search`].
    pub fn search_value<P: Payload>(&self, node: NodeRef, value: &P) -> Option<NodeRef> {
        self.search(node, value.as_bytes())
    }
}
