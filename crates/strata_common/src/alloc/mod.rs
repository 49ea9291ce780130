mod alloc;

pub mod primitives;
pub mod composable;

pub use alloc::*;
pub use primitives::Mallocator;
pub use composable::{TracingAllocator, AllocTrace, AllocEvent, AllocEventKind, CappedAllocator};
