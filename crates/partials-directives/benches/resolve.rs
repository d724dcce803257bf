//! Benchmarks for directive resolution.

#![allow(clippy::format_push_string)] // Benchmark setup code, performance not critical

use std::fs;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use partials_directives::{Registry, Resolver, ResolverConfig, discover_documents, resolve_all};

/// Generate markdown with `sections` sections, each including a shared partial.
fn generate_markdown(sections: usize, paragraphs_per_section: usize) -> String {
    let mut md = String::with_capacity(sections * (80 + paragraphs_per_section * 100));
    md.push_str("# Document Title\n\n");

    for i in 0..sections {
        md.push_str(&format!("## Section {i}\n\n"));
        for j in 0..paragraphs_per_section {
            md.push_str(&format!(
                "Paragraph {j} in section {i} with **bold** and *italic* text.\n\n"
            ));
        }
        md.push_str("::include{file=/partials/note.md}\n\n");
    }
    md
}

fn content_root() -> tempfile::TempDir {
    let temp_dir = tempfile::tempdir().unwrap();
    let partials = temp_dir.path().join("partials");
    fs::create_dir(&partials).unwrap();
    fs::write(
        partials.join("note.md"),
        ":::note\nShared note.\n\n::include{file=/partials/footer.md}\n:::",
    )
    .unwrap();
    fs::write(partials.join("footer.md"), "- one\n- two\n- three").unwrap();
    temp_dir
}

fn bench_resolve_plain(c: &mut Criterion) {
    let registry = Registry::builtin();
    let resolver = Resolver::new(&registry);
    let markdown = "# Hello\n\nSimple content without directives.";

    c.bench_function("resolve_plain_markdown", |b| {
        b.iter(|| resolver.resolve_str(markdown));
    });
}

fn bench_resolve_by_size(c: &mut Criterion) {
    let temp_dir = content_root();
    let registry = Registry::builtin();
    let resolver = Resolver::with_config(
        &registry,
        ResolverConfig::new().with_content_root(temp_dir.path()),
    );

    let mut group = c.benchmark_group("resolve_by_size");

    for (sections, paragraphs) in [(5, 2), (20, 3), (50, 5)] {
        let markdown = generate_markdown(sections, paragraphs);
        group.throughput(Throughput::Bytes(markdown.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("includes", format!("{sections}s_{paragraphs}p")),
            &markdown,
            |b, markdown| b.iter(|| resolver.resolve_str(markdown)),
        );
    }

    group.finish();
}

fn bench_resolve_all(c: &mut Criterion) {
    let temp_dir = content_root();
    for i in 0..32 {
        fs::write(
            temp_dir.path().join(format!("doc{i}.md")),
            generate_markdown(10, 3),
        )
        .unwrap();
    }
    let registry = Registry::builtin();
    let resolver = Resolver::with_config(
        &registry,
        ResolverConfig::new().with_content_root(temp_dir.path()),
    );
    let paths = discover_documents(temp_dir.path()).unwrap();

    c.bench_function("resolve_all_32_documents", |b| {
        b.iter(|| resolve_all(&resolver, &paths));
    });
}

criterion_group!(
    benches,
    bench_resolve_plain,
    bench_resolve_by_size,
    bench_resolve_all
);
criterion_main!(benches);
