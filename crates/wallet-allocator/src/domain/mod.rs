//! # Domain Layer
//!
//! Pure domain logic for the wallet allocator.
//! Nothing in this layer touches the filesystem.
//!
//! ## Modules
//!
//! - `entities` - Wallet and assignment records, admin views
//! - `codec` - Pipe-delimited line codec with strict field counts
//! - `config` - Allocator configuration and lock wait policy
//! - `errors` - Domain error types
//! - `reconcile` - Pool/assignment overlap detection after a crash

pub mod codec;
pub mod config;
pub mod entities;
pub mod errors;
pub mod reconcile;
