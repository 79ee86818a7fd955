use alchemy_lib::{load_graph, search, RecipeGraph, SearchRequest};
use criterion::{criterion_group, criterion_main, Criterion};
use once_cell::sync::Lazy;
use std::hint::black_box;
use std::path::PathBuf;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures/recipes.json")
}

static GRAPH: Lazy<RecipeGraph> = Lazy::new(|| load_graph(&fixture_path()).expect("fixture loads"));
static BFS_REQUEST: Lazy<SearchRequest> = Lazy::new(|| SearchRequest::bfs("house"));
static DFS_REQUEST: Lazy<SearchRequest> = Lazy::new(|| SearchRequest::dfs("house"));
static BIDIRECTIONAL_REQUEST: Lazy<SearchRequest> =
    Lazy::new(|| SearchRequest::bfs("house").with_bidirectional(true));
static MULTI_BFS_REQUEST: Lazy<SearchRequest> =
    Lazy::new(|| SearchRequest::bfs("farmer").with_max_paths(10));
static MULTI_DFS_REQUEST: Lazy<SearchRequest> =
    Lazy::new(|| SearchRequest::dfs("farmer").with_max_paths(10));

fn benchmark_search(c: &mut Criterion) {
    let graph = &*GRAPH;

    c.bench_function("bfs_house", |b| {
        let request = &*BFS_REQUEST;
        b.iter(|| {
            let outcome = search(graph, request).expect("search runs");
            black_box(outcome.found)
        });
    });

    c.bench_function("dfs_house", |b| {
        let request = &*DFS_REQUEST;
        b.iter(|| {
            let outcome = search(graph, request).expect("search runs");
            black_box(outcome.found)
        });
    });

    c.bench_function("bidirectional_bfs_house", |b| {
        let request = &*BIDIRECTIONAL_REQUEST;
        b.iter(|| {
            let outcome = search(graph, request).expect("search runs");
            black_box(outcome.stats.nodes_visited)
        });
    });

    c.bench_function("multi_bfs_farmer", |b| {
        let request = &*MULTI_BFS_REQUEST;
        b.iter(|| {
            let outcome = search(graph, request).expect("search runs");
            black_box(outcome.paths.len())
        });
    });

    c.bench_function("multi_dfs_farmer", |b| {
        let request = &*MULTI_DFS_REQUEST;
        b.iter(|| {
            let outcome = search(graph, request).expect("search runs");
            black_box(outcome.paths.len())
        });
    });
}

criterion_group!(benches, benchmark_search);
criterion_main!(benches);
