//! Composition across the strand crates through the umbrella surface.
//!
//! 1. **Generator + task**: a producer awaits tasks; a task drains a generator
//! 2. **Generator + reflection**: lazy mapping over reflected records
//! 3. **Visitation**: heterogeneous generator output dispatched by type
//! 4. **Allocation policy**: one counting allocator shared by both frame kinds
//! 5. **Configuration**: settings handed into a task body

use std::any::Any;
use std::sync::Arc;

use strand::prelude::*;
use strand_core::test_utils::CountingAlloc;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// 1. Generator + task
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test]
fn producer_awaits_completed_tasks() {
    init_tracing();
    let g = Generator::new(|co| async move {
        for n in 1..=3 {
            let doubled = Task::new(async move { Ok::<_, TaskError>(n * 2) }).await?;
            co.yield_(doubled).await;
        }
        Ok::<_, TaskError>(())
    });
    let values: Vec<i32> = g.map(Result::unwrap).collect();
    assert_eq!(values, vec![2, 4, 6]);
}

#[test]
fn failing_inner_task_stops_the_producer() {
    init_tracing();
    let mut g = Generator::new(|co| async move {
        co.yield_(1_u32).await;
        Task::new(async { Err::<(), _>("upstream unavailable") }).await?;
        co.yield_(2_u32).await;
        Ok::<_, TaskError>(())
    });
    assert!(g.advance().unwrap());
    let err = g.advance().unwrap_err();
    assert_eq!(
        err.to_string(),
        "production failed: task failed: upstream unavailable"
    );
    assert!(!g.advance().unwrap());
}

#[test]
fn task_drains_a_generator() {
    init_tracing();
    let task = Task::new(async {
        let squares = generator_invoke(|x: u64| x * x, 1..=4_u64);
        let mut total = 0;
        for sq in squares {
            total += sq.map_err(TaskError::failed)?;
        }
        Ok::<_, TaskError>(total)
    });
    assert_eq!(task.get_result().unwrap(), 30);
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// 2. Generator + reflection
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Reflect)]
struct Player {
    health: i32,
    speed: f32,
}

#[reflect_methods]
impl Player {
    #[reflect(rename = "TakeDamage")]
    fn take_damage(&mut self, amount: i32) {
        self.health -= amount;
    }
}

#[test]
fn lazily_damage_a_roster() {
    let roster = vec![
        Player {
            health: 100,
            speed: 0.1,
        },
        Player {
            health: 40,
            speed: 0.3,
        },
    ];
    let survivors = generator_invoke_with(
        |hit: &i32, mut p: Player| {
            Reflector::<Player>::invoke_member_function::<name!("TakeDamage")>(&mut p, (*hit,));
            *Reflector::<Player>::get_field_by_name::<name!("health")>(&p)
        },
        50,
        roster,
    );
    let health: Vec<i32> = survivors.map(Result::unwrap).collect();
    assert_eq!(health, vec![50, -10]);
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// 3. Visitation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Sums numeric values of several widths.
struct Sum(f64);

impl VisitCase<i32> for Sum {
    type Output = ();
    fn visit(&mut self, v: &i32) {
        self.0 += f64::from(*v);
    }
}

impl VisitCase<f32> for Sum {
    type Output = ();
    fn visit(&mut self, v: &f32) {
        self.0 += f64::from(*v);
    }
}

#[test]
fn heterogeneous_stream_is_visited_by_type() {
    let g: Generator<Box<dyn Any>> = Generator::new(|co| async move {
        co.yield_(Box::new(2_i32) as Box<dyn Any>).await;
        co.yield_(Box::new(0.5_f32) as Box<dyn Any>).await;
        co.yield_(Box::new("skip me") as Box<dyn Any>).await;
    });
    let mut sum = Sum(0.0);
    let mut misses = 0;
    for value in g {
        let value = value.unwrap();
        if visit::<(i32, f32), _>(&mut sum, value.as_ref()).is_err() {
            misses += 1;
        }
    }
    assert_eq!(sum.0, 2.5);
    assert_eq!(misses, 1);
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// 4. Allocation policy
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test]
fn one_allocator_backs_both_frame_kinds() {
    let alloc = Arc::new(CountingAlloc::new());
    {
        let g = Generator::new_in(
            |co| async move {
                co.yield_('x').await;
            },
            Arc::clone(&alloc),
        );
        let task = Task::new_in(async { Ok::<_, TaskError>(1) }, Arc::clone(&alloc));
        assert_eq!(alloc.allocations(), 2);
        assert_eq!(task.get_result().unwrap(), 1);
        drop(g);
    }
    assert_eq!(alloc.deallocations(), 2);
    assert_eq!(alloc.live_bytes(), 0);
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// 5. Configuration
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn task_reads_shared_config() {
    let shared = SharedConfig::new(AppConfig::new("/opt/7zip/7zz"));
    let handle = shared.clone();
    let task = Task::new(async move {
        tokio::task::yield_now().await;
        Ok::<_, TaskError>(handle.seven_zip_path())
    });
    shared.replace(AppConfig::new("/usr/bin/7z"));
    let path = task.await.unwrap();
    assert_eq!(path.to_str(), Some("/usr/bin/7z"));
}
