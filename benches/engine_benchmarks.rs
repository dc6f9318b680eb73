use criterion::{black_box, criterion_group, criterion_main, Criterion};

use nocturne::board::Position;
use nocturne::search::{Search, SearchLimits, StatusFlag};

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

fn searcher(fen: &str) -> Search {
    let mut search = Search::new(64, StatusFlag::new());
    search.silent = true;
    let position: Position = fen.parse().unwrap();
    search.set_position(position, vec![position.key]);
    search
}

fn bench_perft(c: &mut Criterion) {
    let mut group = c.benchmark_group("perft");
    group.sample_size(10);

    group.bench_function("startpos_4", |b| {
        let mut search = searcher("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
        b.iter(|| black_box(search.perft(4)));
    });

    group.bench_function("kiwipete_3", |b| {
        let mut search = searcher(KIWIPETE);
        b.iter(|| black_box(search.perft(3)));
    });

    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    group.sample_size(10);

    group.bench_function("startpos_depth_7", |b| {
        b.iter(|| {
            let mut search = searcher("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
            black_box(search.start_search(SearchLimits::depth(7)))
        });
    });

    group.bench_function("kiwipete_depth_6", |b| {
        b.iter(|| {
            let mut search = searcher(KIWIPETE);
            black_box(search.start_search(SearchLimits::depth(6)))
        });
    });

    group.finish();
}

criterion_group!(benches, bench_perft, bench_search);
criterion_main!(benches);
