//! Domain types shared across the tally workspace.
//!
//! Pure data and invariants only -- no I/O. The provider client, stores,
//! and HTTP layer all build on the types defined here.

pub mod account;
pub mod error;
pub mod merchant;
pub mod mode;
pub mod session;
pub mod transaction;
pub mod types;
