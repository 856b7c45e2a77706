//! Core drive logic for a four-wheel mecanum vehicle on no-std embedded platforms.
//!
//! For a runnable host build, see the `mock-mcu` application.
#![no_std]

extern crate alloc;

pub mod utils;

#[doc(hidden)]
pub use static_cell;
