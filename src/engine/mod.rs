//! Filter-state and selection engine.
//!
//! - [`filter`]: the active combo set and its three toggle operations.
//! - [`selector`]: eligible subset and uniform random draw.
//! - [`controller`]: maps actions to mutations and redraws; owns the current
//!   selection.

pub mod controller;
pub mod filter;
pub mod selector;

#[cfg(test)]
mod test_properties;
