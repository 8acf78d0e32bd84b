use asm16::{assembler, isa::Schema};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn program(repeats: usize) -> String {
    let body = "LOADI R1, 10      # R1 = 10\n\
                LOADI R2, 0x14\n\
                ADD R3, R1, R2    // sum\n\
                SHL R4 R3 1 0b011\n\
                STORE R4 R1 2\n\
                CMP R3 R4\n\
                BRNZ 4093\n";
    body.repeat(repeats)
}

fn bench_assemble(c: &mut Criterion) {
    let src = program(1000);

    c.bench_function("assemble 7000 lines", |b| {
        b.iter(|| assembler::assemble(Schema::builtin(), black_box(&src)).unwrap())
    });
}

fn bench_reject(c: &mut Criterion) {
    let mut src = program(1000);
    src.push_str("ADDI R1 300\n");

    c.bench_function("reject 7001 lines", |b| {
        b.iter(|| assembler::assemble(Schema::builtin(), black_box(&src)).unwrap_err())
    });
}

criterion_group!(benches, bench_assemble, bench_reject);
criterion_main!(benches);
