//! Global subscriber installation
//!
//! Kept in its own test binary with a single test: the global default can
//! only be set once per process.

use lawful::logging::init_tracing;
use lawful::structures::list;
use lawful::{run_generator, Script, Value};

#[test]
fn json_tracing_installs_once_and_runs_procedures() {
    init_tracing(Some("lawful=trace"), Some(true)).unwrap();

    let gen = Script::new(|| ())
        .then(|_, _| Ok(Value::list([1i64, 2])))
        .finish(|_, x| Ok(Value::list([x])));
    assert_eq!(run_generator(&list(), &gen).unwrap(), Value::list([1i64, 2]));

    assert!(init_tracing(None, None).is_err());
}
