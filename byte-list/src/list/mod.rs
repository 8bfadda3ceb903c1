// Copyright 2022 Colin Finck <colin@reactos.org>
// SPDX-License-Identifier: MIT OR Apache-2.0
//
//! Doubly linked lists of copied-in byte payloads.
//!
//! All nodes live in a [`ListArena`], which owns them and their payloads.
//! A list is not an object of its own: it is the chain of nodes reachable by following the
//! forward links from some node.
//! Every operation therefore takes a [`NodeRef`] handle, and the chain starting at that handle
//! is "the list" for that call.
//! A single arena can hold any number of independent chains.
//!
//! ```ignore
//! let mut arena = ListArena::new();
//!
//! let root = arena.init(&[10])?;
//! let root = arena.insert(root, &[20], 1)?;
//! let root = arena.insert(root, &[5], 0)?;
//! assert_eq!(arena.len(root), 3);
//!
//! let root = arena.delete(root, &[10])?.unwrap();
//! assert_eq!(arena.get(root, 1), Some(&[20][..]));
//! ```
//!
//! Payloads are copied into the arena on insertion, so the caller's buffer can be reused or
//! changed right away.
//! For plain-old-data types, the [`Payload`] trait provides typed variants of all functions
//! (e.g. [`ListArena::insert_value`]).
//!
//! Mutating functions return the handle the caller has to use from then on, because inserting
//! at position 0 or deleting the first node changes the root of a chain.
//! Handles of released nodes become stale and are rejected with [`ListError::StaleHandle`], even
//! if their arena slot has been reused in the meantime.
//!
//! An arena is meant to be used by a single owner.
//! It has no internal synchronization.
//!
//! [`ListError::StaleHandle`]: crate::ListError::StaleHandle
//! [`Payload`]: crate::Payload

mod base;
mod print;
mod typed;

pub use base::*;
pub use print::*;
