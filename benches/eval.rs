//! Benchmarks tokenizer and evaluator performance.

#[macro_use] extern crate criterion;
extern crate sdb;

use criterion::{Criterion, Throughput};
use sdb::cpu::State;
use sdb::expr::{self, Context};
use sdb::memory::{ArrayMemory, VirtualMemory};
use sdb::symbols::SymbolMap;

/// Expressions as typed into a monitor session.
static EXPRESSIONS: &[&str] = &[
    "0x100000",
    "$eax + 4 * $ecx",
    "*($esp + 4) == main",
    "(($eip - 0x100000) / 2) != 0 && !$ebx || -1",
    "*(*$ebp + 4) - (stack_top - $esp)",
];

fn eval(c: &mut Criterion) {
    expr::init();

    let mut state = State::new(0x100000, 0x7000);
    state.set_eax(0x10);
    state.set_ecx(3);
    state.set_ebp(0x7010);

    let mut mem = ArrayMemory::new(Vec::new());
    mem.add_mapping(0x7000..=0x7FFF, &[0x10, 0x70, 0, 0, 0x20, 0, 0x10, 0], "stack").unwrap();

    let mut syms = SymbolMap::new();
    syms.insert("main", 0x100020);
    syms.insert("stack_top", 0x8000);

    let ctx = Context::new(&state, &mem, &syms);
    let bytes: usize = EXPRESSIONS.iter().map(|e| e.len()).sum();

    let mut group = c.benchmark_group("expr");
    group.throughput(Throughput::Bytes(bytes as u64));
    group.bench_function("tokenize", |b| {
        b.iter(|| {
            for e in EXPRESSIONS {
                criterion::black_box(&expr::tokenize(e).unwrap());
            }
        })
    });
    group.bench_function("evaluate", |b| {
        b.iter(|| {
            for e in EXPRESSIONS {
                criterion::black_box(ctx.evaluate(e).unwrap());
            }
        })
    });
    group.finish();
}

criterion_group!(benches, eval);
criterion_main!(benches);
