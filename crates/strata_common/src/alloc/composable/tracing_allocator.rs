use std::{
    alloc::Layout,
    ptr::NonNull,
    sync::Arc,
};
use parking_lot::Mutex;
use strata_logging::LogCategory;

use crate::alloc::*;

const LOG_CAT : LogCategory = LogCategory::new_with_sub("Alloc", "Tracing");

/// What happened to a request going through a [`TracingAllocator`]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AllocEventKind {
    /// Memory was handed out
    Alloc,
    /// Memory was released
    Dealloc,
    /// The inner allocator could not provide the memory
    Failed,
}

/// A single recorded allocator call
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct AllocEvent {
    pub kind    : AllocEventKind,
    pub size    : usize,
    pub align   : usize,
    /// Address of the block, 0 for failed allocations
    pub address : usize,
}

#[derive(Default)]
struct TraceState {
    events       : Vec<AllocEvent>,
    bytes_in_use : usize,
    peak_bytes   : usize,
}

/// Shared record of every call made to one or more [`TracingAllocator`]s.
///
/// Cloning the trace (or an allocator holding it) shares the same record.
#[derive(Clone, Default)]
pub struct AllocTrace {
    state: Arc<Mutex<TraceState>>,
}

impl AllocTrace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a copy of all recorded events, in order
    pub fn events(&self) -> Vec<AllocEvent> {
        self.state.lock().events.clone()
    }

    /// Number of successful allocations
    pub fn alloc_count(&self) -> usize {
        self.count(AllocEventKind::Alloc)
    }

    /// Number of deallocations
    pub fn dealloc_count(&self) -> usize {
        self.count(AllocEventKind::Dealloc)
    }

    /// Number of allocations the inner allocator refused
    pub fn failed_count(&self) -> usize {
        self.count(AllocEventKind::Failed)
    }

    /// Bytes currently allocated and not yet released
    pub fn bytes_in_use(&self) -> usize {
        self.state.lock().bytes_in_use
    }

    /// Highest value `bytes_in_use` has reached
    pub fn peak_bytes(&self) -> usize {
        self.state.lock().peak_bytes
    }

    /// Forget all recorded events, the byte counters are kept
    pub fn clear(&self) {
        self.state.lock().events.clear();
    }

    fn count(&self, kind: AllocEventKind) -> usize {
        self.state.lock().events.iter().filter(|event| event.kind == kind).count()
    }

    fn record(&self, event: AllocEvent) {
        let mut state = self.state.lock();
        match event.kind {
            AllocEventKind::Alloc => {
                state.bytes_in_use += event.size;
                state.peak_bytes = state.peak_bytes.max(state.bytes_in_use);
            },
            AllocEventKind::Dealloc => state.bytes_in_use = state.bytes_in_use.saturating_sub(event.size),
            AllocEventKind::Failed => {},
        }
        state.events.push(event);
    }
}

impl core::fmt::Debug for AllocTrace {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("AllocTrace")
            .field("events", &state.events.len())
            .field("bytes_in_use", &state.bytes_in_use)
            .field("peak_bytes", &state.peak_bytes)
        .finish()
    }
}

//------------------------------------------------------------------------------------------------------------------------------

/// Tracing allocator
///
/// Forwards every request to its inner allocator and records it in an [`AllocTrace`].
/// When the `log_allocations` feature is enabled, each call is also written to the logger at `Verbose` level.
#[derive(Clone, Debug)]
pub struct TracingAllocator<A: Allocator = Mallocator> {
    inner : A,
    trace : AllocTrace,
}

impl TracingAllocator<Mallocator> {
    /// Create a tracing allocator on top of the system allocator, with its own trace
    pub fn new() -> Self {
        Self::with_inner(Mallocator)
    }
}

impl Default for TracingAllocator<Mallocator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Allocator> TracingAllocator<A> {
    /// Create a tracing allocator on top of `inner`, with its own trace
    pub fn with_inner(inner: A) -> Self {
        Self { inner, trace: AllocTrace::new() }
    }

    /// Create a tracing allocator on top of `inner` that records into an existing trace
    pub fn with_trace(inner: A, trace: AllocTrace) -> Self {
        Self { inner, trace }
    }

    /// Get the trace this allocator records into
    pub fn trace(&self) -> &AllocTrace {
        &self.trace
    }

    /// Get the allocator requests are forwarded to
    pub fn inner(&self) -> &A {
        &self.inner
    }

    fn report(&self, event: AllocEvent) {
        cfg_if::cfg_if! {
            if #[cfg(feature = "log_allocations")] {
                match event.kind {
                    AllocEventKind::Alloc => strata_logging::log_verbose!(LOG_CAT,
                        "Alloc: {} bytes (align {}) at {:#x}", event.size, event.align, event.address),
                    AllocEventKind::Dealloc => strata_logging::log_verbose!(LOG_CAT,
                        "Dealloc: {} bytes (align {}) at {:#x}", event.size, event.align, event.address),
                    AllocEventKind::Failed => strata_logging::log_warning!(LOG_CAT,
                        "Failed to allocate {} bytes (align {}) from {}", event.size, event.align, self.inner.alloc_id()),
                }
            } else {
                let _ = LOG_CAT;
            }
        }
        self.trace.record(event);
    }
}

impl<A: Allocator> Allocator for TracingAllocator<A> {
    unsafe fn alloc(&mut self, layout: Layout) -> Option<NonNull<u8>> {
        let ptr = self.inner.alloc(layout);
        let (kind, address) = match ptr {
            Some(ptr) => (AllocEventKind::Alloc, ptr.as_ptr() as usize),
            None => (AllocEventKind::Failed, 0),
        };
        self.report(AllocEvent { kind, size: layout.size(), align: layout.align(), address });
        ptr
    }

    unsafe fn dealloc(&mut self, ptr: NonNull<u8>, layout: Layout) {
        self.report(AllocEvent { kind: AllocEventKind::Dealloc, size: layout.size(), align: layout.align(), address: ptr.as_ptr() as usize });
        self.inner.dealloc(ptr, layout);
    }

    fn owns(&self, ptr: NonNull<u8>, layout: Layout) -> bool {
        self.inner.owns(ptr, layout)
    }

    fn alloc_id(&self) -> AllocId {
        AllocId::Tracing
    }
}
