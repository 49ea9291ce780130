//! Allocator-aware containers.
//!
//! - [`alloc`]: the [`Allocator`](alloc::Allocator) strategy trait, the system allocator and decorating allocators.
//! - [`collections`]: [`DynArr`](collections::DynArr), a growable contiguous array, and [`BitDynArr`](collections::BitDynArr), its bit-packed boolean variant.

mod bytes;

pub mod alloc;
pub mod collections;

pub use bytes::*;
pub mod prelude;
