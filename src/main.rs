use std::collections::HashSet;

use strata_common::{
    prelude::*,
    alloc::{AllocEventKind, CappedAllocator, TracingAllocator},
};
use strata_logging::{get_logger, log_error, log_info, log_warning, LogCategory, LogLevel};

pub const LOG_CAT : LogCategory = LogCategory::new("Main");

/// Environment variable used to override the log level
const LOG_LEVEL_VAR : &str = "STRATA_LOG_LEVEL";

fn setup_logger() {
    let logger = get_logger();
    logger.set_log_to_console(true);
    logger.set_always_flush(true);

    if let Ok(val) = std::env::var(LOG_LEVEL_VAR) {
        match LogLevel::parse(&val) {
            Some(level) => logger.set_max_level(level),
            None => log_warning!(LOG_CAT, "Unknown log level '{val}' in {LOG_LEVEL_VAR}, using {}", logger.max_level()),
        }
    }
}

fn main() {
    setup_logger();

    dynarr_basics();
    dynarr_with_custom_allocator();
    dynarr_access();
    dynarr_capacity();
    dynarr_modifiers();
    dynarr_swap();
    dynarr_comparisons();
    dynarr_erase();
    dynarr_allocation_failure();

    bitdynarr_basics();
    bitdynarr_with_custom_allocator();
    bitdynarr_hashing();

    get_logger().flush();
}

fn dynarr_basics() {
    let mut arr = DynArr::new();
    for i in 0..5 {
        arr.push(i * 10);
    }
    log_info!(LOG_CAT, "Constructed and pushed: {arr} (len {}, capacity {})", arr.len(), arr.capacity());

    let copies = dynarr![7u8; 4];
    log_info!(LOG_CAT, "Constructed 4 copies: {copies}");

    let from_range = DynArr::<_>::from(&arr[1..4]);
    log_info!(LOG_CAT, "Constructed from a range: {from_range}");
}

fn dynarr_with_custom_allocator() {
    let alloc = TracingAllocator::new();
    {
        let mut arr = DynArr::<u64, _>::new_in(alloc.clone());
        for i in 0..20 {
            arr.push(i);
        }
        log_info!(LOG_CAT, "Tracing array holds {arr}");
    }

    let trace = alloc.trace();
    log_info!(LOG_CAT, "Tracing allocator saw {} allocations and {} deallocations, peak usage {} bytes", trace.alloc_count(), trace.dealloc_count(), trace.peak_bytes());
    for event in trace.events() {
        let kind = match event.kind {
            AllocEventKind::Alloc => "alloc",
            AllocEventKind::Dealloc => "dealloc",
            AllocEventKind::Failed => "failed",
        };
        log_info!(LOG_CAT, "    {kind:<7} {} bytes (align {}) at {:#x}", event.size, event.align, event.address);
    }
}

fn dynarr_access() {
    let mut arr = dynarr![1, 2, 3, 4, 5];

    match arr.at(6) {
        Ok(val) => log_info!(LOG_CAT, "at(6) = {val}"),
        Err(err) => log_info!(LOG_CAT, "at(6) failed: {err}"),
    }

    arr[0] = 5;
    log_info!(LOG_CAT, "After arr[0] = 5: {arr}");

    if let (Some(front), Some(back)) = (arr.front(), arr.back()) {
        log_info!(LOG_CAT, "front = {front}, back = {back}");
    }
    log_info!(LOG_CAT, "data = {:p}", arr.as_ptr());

    let forward: Vec<String> = arr.iter().map(|val| val.to_string()).collect();
    let reverse: Vec<String> = arr.iter().rev().map(|val| val.to_string()).collect();
    log_info!(LOG_CAT, "Forward: {}", forward.join(" "));
    log_info!(LOG_CAT, "Reverse: {}", reverse.join(" "));
}

fn dynarr_capacity() {
    let mut arr = DynArr::<u32>::new();
    log_info!(LOG_CAT, "empty: {}, max_size: {}", arr.is_empty(), arr.max_size());

    arr.reserve(100);
    log_info!(LOG_CAT, "After reserve(100): capacity {}", arr.capacity());

    arr.extend(0..10);
    arr.shrink_to_fit();
    log_info!(LOG_CAT, "After shrink_to_fit with 10 elements: capacity {}", arr.capacity());

    arr.clear();
    log_info!(LOG_CAT, "After clear: len {}, capacity {}", arr.len(), arr.capacity());
}

fn dynarr_modifiers() {
    let mut arr = dynarr![1, 2, 3];

    arr.insert(1, 10);
    arr.insert_n(0, 2, 0);
    arr.insert_slice(arr.len(), &[8, 9]);
    log_info!(LOG_CAT, "After inserts: {arr}");

    arr.push(42);
    let popped = arr.pop();
    log_info!(LOG_CAT, "Pushed and popped {popped:?}: {arr}");

    arr.resize(10, 7);
    log_info!(LOG_CAT, "Resized to 10: {arr}");
    arr.resize(3, 0);
    log_info!(LOG_CAT, "Resized to 3: {arr}");
}

fn dynarr_swap() {
    let mut a = dynarr![1, 2, 3];
    let mut b = dynarr![4, 5];
    let (ptr_a, ptr_b) = (a.as_ptr(), b.as_ptr());

    a.swap_with(&mut b);
    log_info!(LOG_CAT, "After swap: a = {a}, b = {b}");
    log_info!(LOG_CAT, "Buffers moved with their contents: {}", a.as_ptr() == ptr_b && b.as_ptr() == ptr_a);
}

fn dynarr_comparisons() {
    let a = dynarr![1, 2, 3];
    let b = dynarr![1, 2, 4];
    let c = DynArr::<i32, _>::from_slice_in(&[1, 2, 3], TracingAllocator::new());

    log_info!(LOG_CAT, "{a} == {c}: {}", a == c);
    log_info!(LOG_CAT, "{a} != {b}: {}", a != b);
    log_info!(LOG_CAT, "{a} <  {b}: {}", a < b);
    log_info!(LOG_CAT, "{b} >= {a}: {}", b >= a);
}

fn dynarr_erase() {
    let mut arr: DynArr<i32> = (0..10).collect();

    arr.remove(0);
    arr.erase(2..4);
    log_info!(LOG_CAT, "After erasing the first element and [2, 4): {arr}");

    arr.retain(|val| val % 2 == 1);
    log_info!(LOG_CAT, "After erasing all even elements: {arr}");
}

fn dynarr_allocation_failure() {
    let mut arr = DynArr::<u64, _>::new_in(CappedAllocator::new(64));
    arr.extend_from_slice(&[1, 2, 3, 4]);

    match arr.try_reserve(100) {
        Ok(()) => log_info!(LOG_CAT, "Unexpectedly reserved 100 more elements"),
        Err(err) => log_error!(LOG_CAT, dynarr_allocation_failure, "{err}, the array is unchanged: {arr}"),
    }
}

fn bitdynarr_basics() {
    let mut bits = bitdynarr![false, true, false, true];
    log_info!(LOG_CAT, "Bits: {bits}");

    bits.flip();
    log_info!(LOG_CAT, "Flipped: {bits}");

    if let Ok(mut bit) = bits.at(1) {
        bit.flip();
    }
    log_info!(LOG_CAT, "Flipped bit 1: {bits}, {} set", bits.count_ones());

    let mut other = bitdynarr![true; 6];
    bits.swap_with(&mut other);
    log_info!(LOG_CAT, "After swap: {bits} and {other}");
}

fn bitdynarr_with_custom_allocator() {
    let alloc = TracingAllocator::new();
    let mut bits = BitDynArr::new_in(alloc.clone());
    bits.resize(300, true);
    bits.insert(0, false);
    log_info!(LOG_CAT, "Tracing bit array holds {} bits, {} set, using {} bytes", bits.len(), bits.count_ones(), alloc.trace().bytes_in_use());
}

fn bitdynarr_hashing() {
    let mut set = HashSet::new();
    set.insert(bitdynarr![true, false, true]);
    set.insert(bitdynarr![true, true]);
    set.insert(bitdynarr![true, false, true]);

    let probe: BitDynArr = [true, false, true].into_iter().collect();
    log_info!(LOG_CAT, "Set holds {} unique bit arrays, contains {probe}: {}", set.len(), set.contains(&probe));
}
