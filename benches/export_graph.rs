use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use movie_graph_explorer::db::MemoryGraph;
use movie_graph_explorer::explorer::Explorer;
use movie_graph_explorer::graph::{ExportSource, MovieProps, RelatedPerson, RelationKind};
use movie_graph_explorer::visualization::{DotGenerator, GraphExporter};

fn source(cast: usize) -> ExportSource {
    ExportSource {
        movie: MovieProps { title: "Bench Movie".into(), released: Some(2000), tagline: None },
        directors: (0..3)
            .map(|i| RelatedPerson::new(&format!("Director {i}"), RelationKind::Directed))
            .collect(),
        actors: (0..cast)
            .map(|i| RelatedPerson::new(&format!("Actor {i}"), RelationKind::ActedIn))
            .collect(),
    }
}

fn bench_exporter(c: &mut Criterion) {
    let mut group = c.benchmark_group("export_graph");
    for cast in [10usize, 100, 1000] {
        let src = source(cast);
        group.bench_with_input(BenchmarkId::new("build", cast), &src, |b, src| {
            b.iter(|| {
                let g = GraphExporter::new().build(black_box(src));
                black_box(g.links.len())
            })
        });
        let graph = GraphExporter::new().build(&src);
        group.bench_with_input(BenchmarkId::new("to_json_pretty", cast), &graph, |b, g| {
            b.iter(|| black_box(g.to_json_pretty().map(|s| s.len())))
        });
        group.bench_with_input(BenchmarkId::new("dot", cast), &graph, |b, g| {
            b.iter(|| black_box(DotGenerator::new().generate_dot(g).len()))
        });
    }
    group.finish();
}

fn bench_memory_queries(c: &mut Criterion) {
    let conn = (0..500).fold(MemoryGraph::default(), |g, i| {
        let title = format!("Movie {i}");
        g.with_movie(&title, Some(1950 + i64::from(i % 70)), None)
            .with_relation(&format!("Person {}", i % 50), RelationKind::ActedIn, &title)
    });
    let explorer = Explorer::new(&conn);

    let mut group = c.benchmark_group("memory_queries");
    group.bench_function("search", |b| {
        b.iter(|| black_box(explorer.search_movies(black_box("Movie 1")).map(|v| v.len())))
    });
    group.bench_function("export", |b| {
        b.iter(|| black_box(explorer.export_graph(black_box("Movie 42")).map(|g| g.is_some())))
    });
    group.finish();
}

criterion_group!(benches, bench_exporter, bench_memory_queries);
criterion_main!(benches);
