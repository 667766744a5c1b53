use criterion::{black_box, criterion_group, criterion_main, Criterion};
use so_lang::{CompileOptions, Compiler, DomainFramework, Parser, Scanner, Target};

const PLAIN: &str = r#"
fn square() {
    return n * n
}
let n = 12
let total = n + 30
if total > 40 {
    print("large")
} else if total == 40 {
    print(total)
} else {
    print(square())
}
"#;

const DOMAIN: &str = r#"
program counter {
    state Counter {
        count: u64
        authority: pubkey
    }

    account payer(signer, writable)

    instruction initialize() {
        account counter(init, writable, seeds("counter", payer), bump): Counter
    }

    instruction increment(amount) {
        account counter(writable): Counter
        require(amount > 0, "amount must be positive")
        emit Incremented(amount)
    }

    instruction withdraw(amount) {
        account vault(writable)
        transfer(vault, payer, amount)
    }
}
"#;

fn lexer_benchmark(c: &mut Criterion) {
    c.bench_function("tokenize domain program", |b| {
        b.iter(|| Scanner::new(black_box(DOMAIN)).scan_tokens().unwrap())
    });
}

fn parser_benchmark(c: &mut Criterion) {
    let tokens = Scanner::new(DOMAIN).scan_tokens().unwrap();
    c.bench_function("parse domain program", |b| {
        b.iter(|| Parser::new(black_box(tokens.clone())).parse().unwrap())
    });
}

fn compile_benchmark(c: &mut Criterion) {
    let c_compiler = Compiler::new(CompileOptions::default());
    let rust_compiler = Compiler::new(CompileOptions::default().with_target(Target::Rust));
    let anchor = Compiler::new(CompileOptions::default().with_framework(DomainFramework::Anchor));
    let native = Compiler::new(CompileOptions::default().with_framework(DomainFramework::Native));

    c.bench_function("compile plain to C", |b| {
        b.iter(|| c_compiler.compile(black_box(PLAIN)).unwrap())
    });
    c.bench_function("compile plain to Rust", |b| {
        b.iter(|| rust_compiler.compile(black_box(PLAIN)).unwrap())
    });
    c.bench_function("compile domain to Anchor", |b| {
        b.iter(|| anchor.compile(black_box(DOMAIN)).unwrap())
    });
    c.bench_function("compile domain to native", |b| {
        b.iter(|| native.compile(black_box(DOMAIN)).unwrap())
    });
}

criterion_group!(benches, lexer_benchmark, parser_benchmark, compile_benchmark);
criterion_main!(benches);
