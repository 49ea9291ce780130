#![allow(unused)]

use std::vec::Vec;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use strata_common::{
    alloc::TracingAllocator,
    bitdynarr,
    collections::*,
    dynarr,
};

fn dynarr_new(c: &mut Criterion) {
    c.bench_function("DynArr::new", |b| b.iter(|| {
        DynArr::<u32>::new()
    }));
    c.bench_function("Vec::new", |b| b.iter(|| {
        Vec::<u32>::new()
    }));
    c.bench_function("DynArr::with_capacity(64)", |b| b.iter(|| {
        DynArr::<u32>::with_capacity(64)
    }));
    c.bench_function("Vec::with_capacity(64)", |b| b.iter(|| {
        Vec::<u32>::with_capacity(64)
    }));
}

fn dynarr_push(c: &mut Criterion) {
    c.bench_function("DynArr::push(100) no reserve", |b| b.iter(|| {
        let mut arr = DynArr::<u32>::new();
        for i in 0..100 {
            arr.push(i);
        }
        arr
    }));
    c.bench_function("DynArr::push(100) reserve", |b| b.iter(|| {
        let mut arr = DynArr::<u32>::new();
        arr.reserve(100);
        for i in 0..100 {
            arr.push(i);
        }
        arr
    }));
    c.bench_function("DynArr::push(100) three halves", |b| b.iter(|| {
        let mut arr = DynArr::<u32, _, ThreeHalvesReserveStrategy>::new_in(Default::default());
        for i in 0..100 {
            arr.push(i);
        }
        arr
    }));

    c.bench_function("Vec::push(100) no reserve", |b| b.iter(|| {
        let mut arr = Vec::<u32>::new();
        for i in 0..100 {
            arr.push(i);
        }
        arr
    }));
    c.bench_function("Vec::push(100) reserve", |b| b.iter(|| {
        let mut arr = Vec::<u32>::new();
        arr.reserve(100);
        for i in 0..100 {
            arr.push(i);
        }
        arr
    }));
}

fn dynarr_insert(c: &mut Criterion) {
    c.bench_function("DynArr::insert(0) 100", |b| b.iter(|| {
        let mut arr = DynArr::<u32>::with_capacity(100);
        for i in 0..100 {
            arr.insert(0, i);
        }
        arr
    }));
    c.bench_function("Vec::insert(0) 100", |b| b.iter(|| {
        let mut arr = Vec::<u32>::with_capacity(100);
        for i in 0..100 {
            arr.insert(0, i);
        }
        arr
    }));
    c.bench_function("DynArr::insert_n(50, 100)", |b| b.iter(|| {
        let mut arr = dynarr![1u32; 100];
        arr.insert_n(50, 100, 7);
        arr
    }));
}

fn dynarr_index(c: &mut Criterion) {
    let arr = dynarr![5u32; 100];
    c.bench_function("DynArr::index(100)", |b| b.iter(|| {
        for i in 0..100 {
            black_box(arr[i]);
        }
    }));
    c.bench_function("DynArr::at(100)", |b| b.iter(|| {
        for i in 0..100 {
            black_box(arr.at(i).ok());
        }
    }));

    let vec = vec![5u32; 100];
    c.bench_function("Vec::index(100)", |b| b.iter(|| {
        for i in 0..100 {
            black_box(vec[i]);
        }
    }));
}

fn dynarr_iter(c: &mut Criterion) {
    let arr: DynArr<u32> = (0..1000).collect();
    c.bench_function("DynArr::iter sum(1000)", |b| b.iter(|| {
        black_box(arr.iter().sum::<u32>())
    }));

    let vec: Vec<u32> = (0..1000).collect();
    c.bench_function("Vec::iter sum(1000)", |b| b.iter(|| {
        black_box(vec.iter().sum::<u32>())
    }));
}

fn dynarr_tracing(c: &mut Criterion) {
    c.bench_function("DynArr::push(100) tracing", |b| b.iter(|| {
        let mut arr = DynArr::<u32, _>::new_in(TracingAllocator::new());
        for i in 0..100 {
            arr.push(i);
        }
        arr
    }));
}

fn bitdynarr_ops(c: &mut Criterion) {
    c.bench_function("BitDynArr::push(1000)", |b| b.iter(|| {
        let mut bits = BitDynArr::new();
        for i in 0..1000 {
            bits.push(i & 1 == 0);
        }
        bits
    }));
    c.bench_function("Vec<bool>::push(1000)", |b| b.iter(|| {
        let mut bits = Vec::new();
        for i in 0..1000 {
            bits.push(i & 1 == 0);
        }
        bits
    }));

    let mut bits = BitDynArr::from_elem(true, 1000);
    c.bench_function("BitDynArr::flip(1000)", |b| b.iter(|| {
        bits.flip();
        black_box(bits.count_ones())
    }));

    let small = bitdynarr![true, false, true, true];
    c.bench_function("BitDynArr::insert(0) 100", |b| b.iter(|| {
        let mut bits = small.clone();
        for i in 0..100 {
            bits.insert(0, i & 1 == 0);
        }
        bits
    }));
}

criterion_group!(benches, dynarr_new, dynarr_push, dynarr_insert, dynarr_index, dynarr_iter, dynarr_tracing, bitdynarr_ops);
criterion_main!(benches);
