//! Effect interpreter
//!
//! Runs a [`Generator`]'s procedure as a sequence of binds over a structure.
//! Every value the procedure yields is bound with the structure's `chain` (or
//! looped through `chain_rec`), and each bound input resumes the procedure
//! from the matching [`Cursor`]. Structures that bind more than once per value,
//! such as lists, resume the same cursor repeatedly; the cursor forks by
//! replaying the procedure's history.
//!
//! Two strategies exist:
//!
//! * [`Strategy::Unsafe`] recurses through `chain`, one native stack segment
//!   per suspension point. A long enough procedure overflows the thread stack,
//!   which aborts the process.
//! * [`Strategy::StackSafe`] hands a single step function to `chain_rec` and
//!   lets the structure's own loop drive it.

use std::rc::Rc;

use lawful_error::{type_mismatch, unsupported_structure, Result};
use tracing::{debug, trace};

use crate::config::{RunConfig, StrategyPreference};
use crate::cursor::{Advance, Cursor};
use crate::procedure::Generator;
use crate::structure::{Operation, Structure};
use crate::value::{Func, Native, Value};

/// How the interpreter binds suspension points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// `chain_rec` plus `map`
    StackSafe,
    /// Recursive `chain`
    Unsafe,
}

/// Pick the strategy `config` allows for `table`.
pub fn select_strategy(config: &RunConfig, table: &Structure) -> Result<Strategy> {
    let stack_safe = table.has(Operation::ChainRec) && table.has(Operation::Map);
    let chain = table.has(Operation::Chain);

    match config.strategy {
        StrategyPreference::Auto if stack_safe => Ok(Strategy::StackSafe),
        StrategyPreference::Auto if chain => Ok(Strategy::Unsafe),
        StrategyPreference::Auto => Err(unsupported_structure(
            table.name(),
            "needs `chain`, or `chain_rec` together with `map`",
        )),
        StrategyPreference::StackSafe if stack_safe => Ok(Strategy::StackSafe),
        StrategyPreference::StackSafe => Err(unsupported_structure(
            table.name(),
            "stack-safe run needs `chain_rec` and `map`",
        )),
        StrategyPreference::Unsafe if chain => Ok(Strategy::Unsafe),
        StrategyPreference::Unsafe => Err(unsupported_structure(table.name(), "needs `chain`")),
    }
}

/// Run `generator` over `table` with the default configuration.
///
/// Returns the structure value the whole computation produces. Errors raised
/// by the procedure come back unchanged.
pub fn run_generator(table: &Structure, generator: &Generator) -> Result<Value> {
    run_generator_with(&RunConfig::default(), table, generator)
}

/// Run `generator` over `table` using `config`.
pub fn run_generator_with(
    config: &RunConfig,
    table: &Structure,
    generator: &Generator,
) -> Result<Value> {
    let strategy = select_strategy(config, table)?;
    debug!(structure = table.name(), ?strategy, "running procedure");

    let driver = Rc::new(Driver {
        table: table.clone(),
        trace_suspensions: config.trace_suspensions,
    });
    let root = Cursor::start(generator);

    match strategy {
        Strategy::Unsafe => driver.step(root, Value::Unit),
        Strategy::StackSafe => driver.run_stack_safe(root),
    }
}

struct Driver {
    table: Structure,
    trace_suspensions: bool,
}

impl Driver {
    fn suspended(&self, cursor: &Cursor) {
        if self.trace_suspensions {
            trace!(structure = self.table.name(), depth = cursor.depth(), "suspended");
        }
    }

    /// Resume `cursor` with `input` and bind whatever it yields.
    fn step(self: &Rc<Self>, cursor: Rc<Cursor>, input: Value) -> Result<Value> {
        let Advance { value, next } = cursor.advance(input)?;
        let Some(next) = next else {
            return Ok(value);
        };
        self.suspended(&next);

        let driver = Rc::clone(self);
        let continuation = Func::new(move |x| driver.step(next.clone(), x));
        self.table.chain(&continuation, value)
    }

    fn run_stack_safe(self: &Rc<Self>, root: Rc<Cursor>) -> Result<Value> {
        let driver = Rc::clone(self);
        let body = Func::new(move |state| {
            let (input, cursor) = split_state(state)?;
            let Advance { value, next } = cursor.advance(input)?;
            match next {
                None => driver.table.map(&Func::new(|x| Ok(Value::done(x))), value),
                Some(next) => {
                    driver.suspended(&next);
                    let resume = Func::new(move |x| Ok(Value::next(state_value(x, next.clone()))));
                    driver.table.map(&resume, value)
                }
            }
        });
        self.table.chain_rec(&body, state_value(Value::Unit, root))
    }
}

const CURSOR: &str = "Cursor";

/// Loop state handed through `chain_rec`: `{input, cursor}`
fn state_value(input: Value, cursor: Rc<Cursor>) -> Value {
    Value::record([
        ("input", input),
        ("cursor", Value::Native(Native::from_rc(CURSOR, cursor))),
    ])
}

fn split_state(state: Value) -> Result<(Value, Rc<Cursor>)> {
    let found = state.type_name();
    let mut fields = state.into_record()?;
    let cursor = fields
        .remove("cursor")
        .and_then(|c| c.as_native().ok().and_then(|n| n.downcast::<Cursor>()))
        .ok_or_else(|| type_mismatch("interpreter state", found))?;
    let input = fields.remove("input").unwrap_or_default();
    Ok((input, cursor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::procedure::Script;
    use lawful_error::AlgebraError;

    fn plain() -> Structure {
        Structure::new("Plain")
            .with_map(|f, t| f.call(t))
            .with_chain(|f, t| f.call(t))
            .with_chain_rec(|step, seed| {
                let mut state = seed;
                loop {
                    match step.call(state)?.into_recur()? {
                        crate::value::Recur::Next(next) => state = *next,
                        crate::value::Recur::Done(result) => return Ok(*result),
                    }
                }
            })
    }

    #[test]
    fn test_auto_prefers_stack_safe() {
        let config = RunConfig::default();
        assert_eq!(select_strategy(&config, &plain()).unwrap(), Strategy::StackSafe);
        let no_rec = plain().without(Operation::ChainRec);
        assert_eq!(select_strategy(&config, &no_rec).unwrap(), Strategy::Unsafe);
    }

    #[test]
    fn test_chain_rec_without_map_falls_back_to_chain() {
        let table = plain().without(Operation::Map);
        let config = RunConfig::default();
        assert_eq!(select_strategy(&config, &table).unwrap(), Strategy::Unsafe);

        let strict = config.with_strategy(StrategyPreference::StackSafe);
        assert!(matches!(
            select_strategy(&strict, &table),
            Err(AlgebraError::UnsupportedStructure { .. })
        ));
    }

    #[test]
    fn test_forced_unsafe_needs_chain() {
        let config = RunConfig::new().with_strategy(StrategyPreference::Unsafe);
        assert_eq!(select_strategy(&config, &plain()).unwrap(), Strategy::Unsafe);
        assert!(select_strategy(&config, &plain().without(Operation::Chain)).is_err());
    }

    #[test]
    fn test_both_strategies_agree() {
        let gen = Script::new(|| ())
            .then(|_, _| Ok(Value::Int(2)))
            .then(|_, x| Ok(Value::Int(x.as_int()? * 10)))
            .finish(|_, y| Ok(Value::Int(y.as_int()? + 1)));

        let safe = run_generator(&plain(), &gen).unwrap();
        let unsafe_run = run_generator_with(
            &RunConfig::new().with_strategy(StrategyPreference::Unsafe),
            &plain(),
            &gen,
        )
        .unwrap();
        assert_eq!(safe, Value::Int(21));
        assert_eq!(unsafe_run, Value::Int(21));
    }

    #[test]
    fn test_state_round_trip() {
        let root = Cursor::start(&Generator::returning(Value::Unit));
        let (input, cursor) = split_state(state_value(Value::Int(4), root.clone())).unwrap();
        assert_eq!(input, Value::Int(4));
        assert!(Rc::ptr_eq(&cursor, &root));
        assert!(split_state(Value::Int(1)).is_err());
    }
}
