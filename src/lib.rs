#![no_std]

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std as alloc;

pub mod constants;
pub mod core;
pub mod engine;
pub mod ledger;
pub mod models;
