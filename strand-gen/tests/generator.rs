use std::collections::VecDeque;
use std::sync::Arc;

use strand_core::test_utils::CountingAlloc;
use strand_core::{FrameState, SystemAlloc};
use strand_gen::{
    Co, CustomAllocatorGenerator, Generator, GeneratorError, generator_invoke,
    try_generator_invoke,
};

/// Error raised by producers in these tests.
#[derive(Debug, thiserror::Error)]
#[error("producer gave up at {0}")]
struct GaveUp(i32);

fn collect_values<T: 'static>(mut g: Generator<T>) -> Vec<T> {
    let mut out = Vec::new();
    while g.advance().unwrap() {
        out.push(g.take_current().unwrap());
    }
    out
}

// --- Early return ---

#[test]
fn early_return_ends_the_sequence() {
    let g = Generator::new(|co| async move {
        co.yield_(1).await;
        co.yield_(2).await;
        if co_return_now() {
            return;
        }
        co.yield_(4).await;
    });
    assert_eq!(collect_values(g), vec![1, 2]);
}

fn co_return_now() -> bool {
    true
}

#[test]
fn exhaustion_is_stable() {
    let mut g = Generator::new(|co| async move {
        co.yield_("only").await;
    });
    assert!(g.advance().unwrap());
    assert_eq!(g.current(), Some(&"only"));
    for _ in 0..3 {
        assert!(!g.advance().unwrap());
        assert_eq!(g.state(), FrameState::Completed);
    }
}

#[test]
fn body_without_yields_is_empty() {
    let mut g = Generator::new(|_co: Co<i32>| async {});
    assert!(!g.has_next());
    assert!(!g.advance().unwrap());
}

// --- Lazy mapping ---

#[test]
fn invoke_squares_a_list() {
    let input: VecDeque<i32> = (0..5).collect();
    let g = generator_invoke(|x| x * x, input);
    assert_eq!(collect_values(g), vec![0, 1, 4, 9, 16]);
}

#[test]
fn invoke_squares_zero_through_five() {
    let g = generator_invoke(|x: i32| x * x, vec![0, 1, 2, 3, 4, 5]);
    assert_eq!(collect_values(g), vec![0, 1, 4, 9, 16, 25]);
}

#[test]
fn invoke_runs_the_function_lazily() {
    let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let c = Arc::clone(&calls);
    let mut g = generator_invoke(
        move |x: i32| {
            c.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            x
        },
        vec![1, 2, 3],
    );
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    assert!(g.advance().unwrap());
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
}

// --- Failures ---

#[test]
fn error_after_three_values() {
    let mut g = Generator::new(|co| async move {
        for i in 0..10 {
            if i >= 3 {
                return Err(GaveUp(i));
            }
            co.yield_(i).await;
        }
        Ok(())
    });

    let mut values = Vec::new();
    let failure = loop {
        match g.advance() {
            Ok(true) => values.push(*g.current().unwrap()),
            Ok(false) => break None,
            Err(err) => break Some(err),
        }
    };

    assert_eq!(values, vec![0, 1, 2]);
    let err = failure.expect("producer error should surface");
    assert_eq!(err.to_string(), "production failed: producer gave up at 3");
    assert_eq!(g.state(), FrameState::Failed);
    assert!(!g.advance().unwrap());
    assert!(g.is_finished());
}

#[test]
fn panic_in_body_is_reported_once() {
    let mut g = Generator::new(|co| async move {
        co.yield_(1_u64).await;
        let empty: Vec<u64> = Vec::new();
        co.yield_(empty[0]).await;
    });
    assert!(g.advance().unwrap());
    assert!(matches!(g.advance(), Err(GeneratorError::Panicked(_))));
    assert!(!g.advance().unwrap());
}

#[test]
fn try_invoke_stops_at_first_error() {
    let g = try_generator_invoke(
        |x: i32| if x == 2 { Err(GaveUp(x)) } else { Ok(x) },
        vec![0, 1, 2, 3],
    );
    let items: Vec<_> = g.collect();
    assert_eq!(items.len(), 3);
    assert!(matches!(items[0], Ok(0)));
    assert!(matches!(items[1], Ok(1)));
    assert!(matches!(items[2], Err(GeneratorError::Production(_))));
}

// --- Allocation policy ---

#[test]
fn custom_allocator_produces_identical_values() {
    fn body(co: Co<i32>) -> impl std::future::Future<Output = ()> + 'static {
        async move {
            for i in [5, 3, 8] {
                co.yield_(i).await;
            }
        }
    }

    let default: Vec<i32> = Generator::new(body).map(Result::unwrap).collect();
    let custom: Vec<i32> = CustomAllocatorGenerator::new_in(body, SystemAlloc)
        .map(Result::unwrap)
        .collect();
    assert_eq!(default, custom);
    assert_eq!(custom, vec![5, 3, 8]);
}

#[test]
fn abandoned_generator_returns_its_storage() {
    let alloc = Arc::new(CountingAlloc::new());
    let mut g = Generator::new_in(
        |co| async move {
            let guard = vec![0_u8; 16];
            co.yield_(guard.len()).await;
            co.yield_(guard.len() * 2).await;
        },
        Arc::clone(&alloc),
    );
    assert!(g.advance().unwrap());
    assert_eq!(alloc.allocations(), 1);
    drop(g);
    assert_eq!(alloc.deallocations(), 1);
    assert_eq!(alloc.live_bytes(), 0);
}

#[test]
fn finished_generator_releases_storage_immediately() {
    let alloc = Arc::new(CountingAlloc::new());
    let mut g = Generator::new_in(
        |co| async move {
            co.yield_(1).await;
        },
        Arc::clone(&alloc),
    );
    assert!(g.advance().unwrap());
    assert!(!g.advance().unwrap());
    assert_eq!(alloc.live_bytes(), 0);
}
