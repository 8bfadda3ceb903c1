// Copyright 2022 Colin Finck <colin@reactos.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use alloc::vec::Vec;
use core::iter::FusedIterator;
use core::mem;

use log::{debug, warn};

use crate::error::ListError;

/// A handle to a node inside a [`ListArena`].
///
/// Handles are cheap to copy and do not borrow the arena.
/// A handle stays valid until its node is released by [`ListArena::delete`],
/// [`ListArena::destroy`] or [`ListArena::clear`].
/// From then on it is stale: lookups return `None` and mutations return
/// [`ListError::StaleHandle`], even after the arena has reused the node's slot.
/// A slot whose generation counter is exhausted is never reused.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct NodeRef {
    index: usize,
    generation: u32,
}

/// The owned copy of a payload.
///
/// The length of the buffer is fixed at creation, only its bytes may be changed afterwards.
#[derive(Debug)]
pub(crate) struct PayloadHolder {
    bytes: Vec<u8>,
}

impl PayloadHolder {
    /// Copies `payload` into a newly allocated buffer.
    pub(crate) fn copy_from(payload: &[u8]) -> Result<Self, ListError> {
        if payload.is_empty() {
            return Err(ListError::EmptyPayload);
        }

        let mut bytes = Vec::new();
        bytes.try_reserve_exact(payload.len()).map_err(|_| {
            warn!("failed to allocate {} bytes for a payload", payload.len());
            ListError::AllocFailed {
                size: payload.len(),
            }
        })?;
        bytes.extend_from_slice(payload);
        debug_assert_eq!(bytes.as_slice(), payload);

        Ok(Self { bytes })
    }

    pub(crate) fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub(crate) fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Compares the first `payload.len()` stored bytes with `payload`.
    fn matches(&self, payload: &[u8]) -> bool {
        self.bytes.get(..payload.len()) == Some(payload)
    }
}

#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) data: PayloadHolder,
    pub(crate) prev: Option<usize>,
    pub(crate) next: Option<usize>,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// An arena owning the nodes of any number of doubly linked lists.
///
/// See the [module-level documentation](crate::list) for more details.
#[derive(Debug, Default)]
pub struct ListArena {
    slots: Vec<Slot>,
    /// Indexes of vacant slots.
    /// Its capacity always covers every slot, so releasing a node never allocates.
    free: Vec<usize>,
    /// Number of vacant slots taken out of service after exhausting their generations.
    retired: usize,
}

impl ListArena {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty arena with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::with_capacity(capacity),
            retired: 0,
        }
    }

    /// Releases every node of every list in the arena.
    ///
    /// All handles handed out so far become stale.
    ///
    /// This operation computes in *O*(*n*) time.
    pub fn clear(&mut self) {
        for index in 0..self.slots.len() {
            if self.slots[index].node.is_some() {
                self.release(index);
            }
        }
    }

    /// Returns `true` if `node` refers to a live node of this arena.
    pub fn contains(&self, node: NodeRef) -> bool {
        self.resolve(node).is_ok()
    }

    /// Deletes the first node from `root` onward whose payload starts with the bytes of `payload`.
    ///
    /// Exactly `payload.len()` bytes of every payload are compared, payloads shorter than that
    /// never match.
    ///
    /// Returns the handle to continue the list with: the successor of the deleted node if it was
    /// `root` (`None` if that was the last node), or `root` otherwise.
    /// If no node matches, [`ListError::NotFound`] is returned and the list is left unchanged.
    ///
    /// This operation computes in *O*(*n*) time.
    pub fn delete(
        &mut self,
        root: NodeRef,
        payload: &[u8],
    ) -> Result<Option<NodeRef>, ListError> {
        let root_index = self.resolve(root)?;
        if payload.is_empty() {
            return Err(ListError::EmptyPayload);
        }

        let index = self
            .walk(root_index)
            .find(|&index| self.node(index).data.matches(payload))
            .ok_or(ListError::NotFound)?;

        let Node { prev, next, .. } = self.release(index);
        if let Some(prev) = prev {
            self.node_mut(prev).next = next;
        }
        if let Some(next) = next {
            self.node_mut(next).prev = prev;
        }

        debug!(
            "deleted node {} (prev: {:?}, next: {:?})",
            index, prev, next
        );

        let new_root = if index == root_index {
            next
        } else {
            Some(root_index)
        };

        Ok(new_root.map(|index| self.handle(index)))
    }

    /// Releases `node` and all nodes following it.
    ///
    /// `node` does not need to be the root of its list.
    /// If it has a predecessor, that one becomes the new tail and the nodes before `node`
    /// remain a valid list.
    ///
    /// Returns the number of released nodes.
    ///
    /// This operation computes in *O*(*n*) time.
    pub fn destroy(&mut self, node: NodeRef) -> Result<usize, ListError> {
        let index = self.resolve(node)?;

        if let Some(prev) = self.node_mut(index).prev.take() {
            self.node_mut(prev).next = None;
        }

        let mut released = 0;
        let mut current = Some(index);

        while let Some(index) = current {
            current = self.release(index).next;
            released += 1;
        }

        debug!("destroyed {} nodes starting at node {}", released, index);
        Ok(released)
    }

    /// Returns the payload of the node at position `pos`, counted from `node`,
    /// or `None` if the list starting at `node` is not long enough.
    ///
    /// This operation computes in *O*(*n*) time.
    pub fn get(&self, node: NodeRef, pos: usize) -> Option<&[u8]> {
        let index = self.resolve(node).ok()?;
        let target = self.walk(index).nth(pos)?;

        Some(self.node(target).data.bytes())
    }

    /// Returns a mutable reference to the payload of the node at position `pos`, counted from
    /// `node`, or `None` if the list starting at `node` is not long enough.
    ///
    /// The bytes of the payload may be changed, its length may not.
    ///
    /// This operation computes in *O*(*n*) time.
    pub fn get_mut(&mut self, node: NodeRef, pos: usize) -> Option<&mut [u8]> {
        let index = self.resolve(node).ok()?;
        let target = self.walk(index).nth(pos)?;

        Some(self.node_mut(target).data.bytes_mut())
    }

    /// Creates a new list consisting of a single node holding a copy of `payload`.
    ///
    /// Returns the root of the new list.
    ///
    /// This operation computes in *O*(*1*) time.
    pub fn init(&mut self, payload: &[u8]) -> Result<NodeRef, ListError> {
        let data = PayloadHolder::copy_from(payload)?;
        let index = self.allocate(Node {
            data,
            prev: None,
            next: None,
        })?;

        debug!("initialized list at node {}", index);
        Ok(self.handle(index))
    }

    /// Inserts a copy of `payload` at position `pos` of the list starting at `root`.
    ///
    /// `pos` may be anything from 0 up to and including the length of the list, the latter
    /// appending the payload.
    /// On success, the handle to continue the list with is returned.
    /// This is the new node when inserting at position 0, and `root` otherwise.
    /// On failure, the list is left unchanged.
    ///
    /// This operation computes in *O*(*n*) time.
    pub fn insert(
        &mut self,
        root: NodeRef,
        payload: &[u8],
        pos: usize,
    ) -> Result<NodeRef, ListError> {
        let root_index = self.resolve(root)?;
        if payload.is_empty() {
            return Err(ListError::EmptyPayload);
        }

        let len = self.walk(root_index).count();
        if pos > len {
            return Err(ListError::PositionOutOfRange { pos, len });
        }

        // Find the node currently at `pos` (none when appending) and its predecessor.
        let (prev, next) = if pos == 0 {
            (self.node(root_index).prev, Some(root_index))
        } else {
            let prev = self
                .walk(root_index)
                .nth(pos - 1)
                .ok_or(ListError::PositionOutOfRange { pos, len })?;
            (Some(prev), self.node(prev).next)
        };

        // No link is touched before all allocations have succeeded.
        let data = PayloadHolder::copy_from(payload)?;
        let new = self.allocate(Node { data, prev, next })?;

        match (prev, next) {
            (Some(prev), None) => {
                // Appending at the end.
                self.node_mut(prev).next = Some(new);
            }
            (None, Some(next)) => {
                // Beginning of the list.
                self.node_mut(next).prev = Some(new);
            }
            (Some(prev), Some(next)) => {
                self.node_mut(prev).next = Some(new);
                self.node_mut(next).prev = Some(new);
            }
            (None, None) => unreachable!("a list always contains its root"),
        }

        debug!(
            "inserted node {} at position {} of a list of length {}",
            new, pos, len
        );

        Ok(if pos == 0 { self.handle(new) } else { root })
    }

    /// Returns `true` if the arena holds no nodes at all.
    pub fn is_empty(&self) -> bool {
        self.node_count() == 0
    }

    /// Returns `true` if `node` is live and has no predecessor.
    pub fn is_root(&self, node: NodeRef) -> bool {
        self.resolve(node)
            .is_ok_and(|index| self.node(index).prev.is_none())
    }

    /// Counts the nodes from `node` up to and including the tail of its list.
    ///
    /// `node` does not need to be the root of its list.
    /// Returns 0 for `None` and for stale handles.
    ///
    /// This operation computes in *O*(*n*) time.
    pub fn len<N: Into<Option<NodeRef>>>(&self, node: N) -> usize {
        node.into()
            .and_then(|node| self.resolve(node).ok())
            .map_or(0, |index| self.walk(index).count())
    }

    /// Returns the successor of `node`, or `None` if `node` is the tail or stale.
    pub fn next(&self, node: NodeRef) -> Option<NodeRef> {
        let index = self.resolve(node).ok()?;
        self.node(index).next.map(|next| self.handle(next))
    }

    /// Returns the number of live nodes across all lists of the arena.
    pub fn node_count(&self) -> usize {
        self.slots.len() - self.free.len() - self.retired
    }

    /// Returns the payload of `node`, or `None` if `node` is stale.
    pub fn payload(&self, node: NodeRef) -> Option<&[u8]> {
        let index = self.resolve(node).ok()?;
        Some(self.node(index).data.bytes())
    }

    /// Returns the payload of `node` for modification, or `None` if `node` is stale.
    pub fn payload_mut(&mut self, node: NodeRef) -> Option<&mut [u8]> {
        let index = self.resolve(node).ok()?;
        Some(self.node_mut(index).data.bytes_mut())
    }

    /// Returns the predecessor of `node`, or `None` if `node` is a root or stale.
    pub fn prev(&self, node: NodeRef) -> Option<NodeRef> {
        let index = self.resolve(node).ok()?;
        self.node(index).prev.map(|prev| self.handle(prev))
    }

    /// Returns the first node from `node` onward whose payload starts with the bytes of `payload`.
    ///
    /// The comparison works like in [`ListArena::delete`].
    ///
    /// This operation computes in *O*(*n*) time.
    pub fn search(&self, node: NodeRef, payload: &[u8]) -> Option<NodeRef> {
        let index = self.resolve(node).ok()?;

        self.walk(index)
            .find(|&index| self.node(index).data.matches(payload))
            .map(|index| self.handle(index))
    }

    /// Moves `node` into a vacant slot and returns the slot index.
    fn allocate(&mut self, node: Node) -> Result<usize, ListError> {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                let slot_count = self.slots.len() + 1;

                if self.slots.try_reserve(1).is_err() || self.free.try_reserve(slot_count).is_err()
                {
                    let size = mem::size_of::<Slot>();
                    warn!("failed to allocate {} bytes for a list node", size);
                    return Err(ListError::AllocFailed { size });
                }

                self.slots.push(Slot {
                    generation: 0,
                    node: None,
                });
                self.slots.len() - 1
            }
        };

        self.slots[index].node = Some(node);
        Ok(index)
    }

    fn handle(&self, index: usize) -> NodeRef {
        NodeRef {
            index,
            generation: self.slots[index].generation,
        }
    }

    pub(crate) fn node(&self, index: usize) -> &Node {
        match &self.slots[index].node {
            Some(node) => node,
            None => unreachable!("link to vacant slot {}", index),
        }
    }

    fn node_mut(&mut self, index: usize) -> &mut Node {
        match &mut self.slots[index].node {
            Some(node) => node,
            None => unreachable!("link to vacant slot {}", index),
        }
    }

    /// Takes the node out of its slot and invalidates all handles to it.
    ///
    /// The caller is responsible for unlinking the node.
    fn release(&mut self, index: usize) -> Node {
        let slot = &mut self.slots[index];
        let node = match slot.node.take() {
            Some(node) => node,
            None => unreachable!("released vacant slot {}", index),
        };

        match slot.generation.checked_add(1) {
            Some(generation) => {
                slot.generation = generation;
                self.free.push(index);
            }
            None => {
                debug!("retiring slot {} with exhausted generations", index);
                self.retired += 1;
            }
        }

        node
    }

    /// Returns the slot index of `node` if it is live.
    pub(crate) fn resolve(&self, node: NodeRef) -> Result<usize, ListError> {
        match self.slots.get(node.index) {
            Some(slot) if slot.generation == node.generation && slot.node.is_some() => {
                Ok(node.index)
            }
            _ => Err(ListError::StaleHandle),
        }
    }

    /// Returns an iterator over the slot indexes from `index` up to the tail.
    pub(crate) fn walk(&self, index: usize) -> Walk<'_> {
        Walk {
            arena: self,
            current: Some(index),
        }
    }
}

/// Follows the forward links of a list, yielding slot indexes.
pub(crate) struct Walk<'a> {
    arena: &'a ListArena,
    current: Option<usize>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let index = self.current?;
        self.current = self.arena.node(index).next;
        Some(index)
    }
}

impl<'a> FusedIterator for Walk<'a> {}
