pub use crate::bytes::*;

pub use crate::alloc::{Allocator, AllocId, Mallocator};
pub use crate::collections::{DynArr, BitDynArr, TryReserveError, OutOfRangeError};
pub use crate::{dynarr, bitdynarr};
