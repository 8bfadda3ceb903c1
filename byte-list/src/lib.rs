// Copyright 2022 Colin Finck <colin@reactos.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

#![no_std]

extern crate alloc;

// Required for deriving our traits when testing.
#[cfg(test)]
extern crate self as byte_list;

mod error;
pub mod list;
mod traits;

pub use error::*;
pub use traits::*;
