//! Deep sequential procedures under both strategies
//!
//! A native stack overflow aborts the whole process, so the overflowing run
//! happens in a re-executed copy of this test binary.

use std::process::Command;
use std::thread;

use lawful::structures::{identity, list};
use lawful::{
    run_generator_with, Generator, Operation, RunConfig, Step, StrategyPreference, Structure,
    Value,
};

const CHILD_ENV: &str = "LAWFUL_STACK_CHILD";
const DEPTH: i64 = 200_000;
const SMALL_STACK: usize = 256 * 1024;

/// Suspends `n` times on `1` and returns the sum of its inputs
fn counter(n: i64) -> Generator {
    Generator::new(move || {
        let mut remaining = n;
        let mut total = 0i64;
        move |input: Value| -> lawful::Result<Step> {
            if let Value::Int(x) = input {
                total += x;
            }
            if remaining == 0 {
                return Ok(Step::Return(Value::Int(total)));
            }
            remaining -= 1;
            Ok(Step::Yield(Value::Int(1)))
        }
    })
}

fn run(strategy: StrategyPreference, table: &Structure, n: i64) -> i64 {
    let config = RunConfig::new().with_strategy(strategy);
    run_generator_with(&config, table, &counter(n))
        .unwrap()
        .as_int()
        .unwrap()
}

fn on_small_stack<T: Send + 'static>(f: impl FnOnce() -> T + Send + 'static) -> T {
    thread::Builder::new()
        .name("small-stack".to_string())
        .stack_size(SMALL_STACK)
        .spawn(f)
        .unwrap()
        .join()
        .unwrap()
}

#[test]
fn unsafe_strategy_exhausts_the_stack() {
    if std::env::var_os(CHILD_ENV).is_some() {
        on_small_stack(|| {
            let chain_only = identity().without(Operation::ChainRec);
            run(StrategyPreference::Auto, &chain_only, DEPTH)
        });
        return;
    }

    let output = Command::new(std::env::current_exe().unwrap())
        .args([
            "unsafe_strategy_exhausts_the_stack",
            "--exact",
            "--nocapture",
            "--test-threads=1",
        ])
        .env(CHILD_ENV, "1")
        .output()
        .unwrap();

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success(), "child finished: {stderr}");
    assert!(stderr.contains("overflowed its stack"), "unexpected child output: {stderr}");
}

#[test]
fn stack_safe_strategy_completes_on_the_same_stack() {
    let identity_total = on_small_stack(|| run(StrategyPreference::StackSafe, &identity(), DEPTH));
    assert_eq!(identity_total, DEPTH);

    let list_total = on_small_stack(|| {
        let config = RunConfig::new().with_strategy(StrategyPreference::StackSafe);
        let result = run_generator_with(&config, &list(), &counter_in_list(DEPTH)).unwrap();
        result == Value::list([DEPTH])
    });
    assert!(list_total);
}

#[test]
fn strategies_agree_where_both_finish() {
    let chain_only = identity().without(Operation::ChainRec);
    assert_eq!(
        run(StrategyPreference::Unsafe, &chain_only, 100),
        run(StrategyPreference::StackSafe, &identity(), 100)
    );
}

/// Like [`counter`], but every emitted value is a singleton list
fn counter_in_list(n: i64) -> Generator {
    Generator::new(move || {
        let mut remaining = n;
        let mut total = 0i64;
        move |input: Value| -> lawful::Result<Step> {
            if let Value::Int(x) = input {
                total += x;
            }
            if remaining == 0 {
                return Ok(Step::Return(Value::list([total])));
            }
            remaining -= 1;
            Ok(Step::Yield(Value::list([1i64])))
        }
    })
}
