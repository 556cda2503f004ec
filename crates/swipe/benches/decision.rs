//! Benchmarks for the release -> decision -> deck path
//!
//! Run with: cargo bench --package swipe

use catalog::Book;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::time::Duration;
use swipe::{
    Decision, DecisionClassifier, DeckController, GestureTracker, MatchRecorder, PointerPosition,
};

fn load_test_books(n: usize) -> Vec<Book> {
    (0..n)
        .map(|i| Book::new(format!("book-{}", i), format!("Title {}", i)))
        .collect()
}

fn bench_classify(c: &mut Criterion) {
    let classifier = DecisionClassifier::from_viewport(400.0, 0.25).unwrap();

    c.bench_function("classify", |b| {
        b.iter(|| {
            for dx in [-250.0f32, -100.0, 0.0, 100.0, 250.0] {
                black_box(classifier.classify(black_box(dx)));
            }
        })
    });
}

fn bench_gesture(c: &mut Criterion) {
    c.bench_function("gesture_press_drag_release", |b| {
        b.iter(|| {
            let mut tracker = GestureTracker::new();
            tracker.press(PointerPosition::new(0.0, 0.0, Duration::ZERO));
            for ms in 1..=30u64 {
                let x = ms as f32 * 6.0;
                black_box(tracker.drag(PointerPosition::new(x, 0.0, Duration::from_millis(ms))));
            }
            black_box(tracker.release(PointerPosition::new(180.0, 0.0, Duration::from_millis(31))))
        })
    });
}

fn bench_deck(c: &mut Criterion) {
    let books = load_test_books(100);

    c.bench_function("deck_decide_100", |b| {
        b.iter(|| {
            let matches = MatchRecorder::new();
            let mut deck = DeckController::new().with_listener(matches.clone());
            deck.load_items(books.clone());
            let mut like = true;
            while !deck.is_exhausted() {
                let decision = if like { Decision::Like } else { Decision::Pass };
                black_box(deck.record_decision(decision).unwrap());
                like = !like;
            }
            black_box(matches.len())
        })
    });
}

criterion_group!(benches, bench_classify, bench_gesture, bench_deck);
criterion_main!(benches);
