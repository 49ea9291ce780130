mod tracing_allocator;
mod capped_allocator;

pub use tracing_allocator::*;
pub use capped_allocator::*;
