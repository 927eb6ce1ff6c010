//! Bundle scheduler runner -- greedy cycle-stepping packer.
//!
//! Split into focused submodules:
//! - `core`: BundleScheduler struct, constructor, input seeding, and accessors
//! - `packing`: per-cycle bundle admission, stall handling, and the run loop

mod core;
mod packing;
#[cfg(test)]
mod tests;

pub use self::core::BundleScheduler;
pub use self::packing::Step;
