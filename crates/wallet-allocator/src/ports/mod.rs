//! # Ports Layer
//!
//! Defines the port traits for the wallet allocator.
//!
//! ## Hexagonal Architecture
//!
//! - `inbound.rs` - Driving port (API exposed to the request gateway)
//! - `outbound.rs` - Driven port (durable record storage + exclusive lock)

pub mod inbound;
pub mod outbound;
