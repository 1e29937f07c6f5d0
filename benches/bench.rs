use criterion::{criterion_group, criterion_main, Criterion};
use yaml_core::{Document, Emitter, Parser};

/// A moderately large synthetic document: a block sequence of flow
/// mappings, repeated enough times to give the parser and emitter
/// something non-trivial to chew on.
fn very_large_yaml() -> Vec<u8> {
    let mut out = String::from("---\n");
    for i in 0..2000 {
        out.push_str(&format!(
            "- {{id: {i}, name: item-{i}, tags: [a, b, c], active: true}}\n"
        ));
    }
    out.into_bytes()
}

pub fn parser(c: &mut Criterion) {
    let very_large_yaml = very_large_yaml();

    c.bench_function("yaml-core parse large", |b| {
        b.iter(|| {
            let mut input = very_large_yaml.as_slice();
            let mut parser = Parser::new();
            parser.set_input(&mut input);
            Document::load(&mut parser)
        })
    });

    c.bench_function("yaml-core emit large", |b| {
        let mut buffer = Vec::with_capacity(very_large_yaml.len());

        let doc = {
            let mut parser = Parser::new();
            let mut input = very_large_yaml.as_slice();
            parser.set_input(&mut input);
            Document::load(&mut parser).unwrap()
        };

        b.iter_custom(|iters| {
            let mut measurement = std::time::Duration::ZERO;
            for _ in 0..iters {
                buffer.clear();
                let start_time = std::time::Instant::now();
                let mut emitter = Emitter::new();
                emitter.set_output(&mut buffer);
                doc.dump(&mut emitter).unwrap();
                measurement += start_time.elapsed();
            }
            measurement
        });
    });
}

criterion_group!(benches, parser);
criterion_main!(benches);
