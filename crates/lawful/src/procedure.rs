//! Step-once procedures
//!
//! A [`Procedure`] is an explicit state machine: every call to
//! [`Procedure::resume`] feeds it the value the interpreter bound at the last
//! suspension point and returns either the next effect to suspend on or the
//! final result. A procedure instance can only move forward, so the
//! interpreter keeps a [`Generator`] around to build fresh instances when a
//! checkpoint has to be resumed a second time.
//!
//! Forking re-executes the procedure from its start, so any side effect it
//! performs before a branch point runs once per branch.

use std::fmt;
use std::rc::Rc;

use lawful_error::{ensure, AlgebraError, Result};

use crate::value::Value;

/// What a procedure produced when resumed
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Suspend on this structure value
    Yield(Value),
    /// Finish with this structure value
    Return(Value),
}

/// A cooperative routine driven one resume at a time.
///
/// The first `resume` receives `Value::Unit`.
pub trait Procedure {
    fn resume(&mut self, input: Value) -> Result<Step>;
}

impl<F> Procedure for F
where
    F: FnMut(Value) -> Result<Step>,
{
    fn resume(&mut self, input: Value) -> Result<Step> {
        self(input)
    }
}

/// Factory of fresh procedure instances
#[derive(Clone)]
pub struct Generator {
    spawn: Rc<dyn Fn() -> Box<dyn Procedure>>,
}

impl fmt::Debug for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Generator")
    }
}

impl Generator {
    /// Each call of `spawn` must produce an independent procedure that
    /// behaves identically when fed identical inputs.
    pub fn new<P, F>(spawn: F) -> Self
    where
        P: Procedure + 'static,
        F: Fn() -> P + 'static,
    {
        Self {
            spawn: Rc::new(move || Box::new(spawn()) as Box<dyn Procedure>),
        }
    }

    /// A procedure with no suspension points
    pub fn returning(result: Value) -> Self {
        Script::new(|| ()).finish(move |_, _| Ok(result.clone()))
    }

    /// Instantiate a fresh procedure
    pub fn spawn(&self) -> Box<dyn Procedure> {
        (self.spawn)()
    }
}

type StageFn<S> = Box<dyn Fn(&mut S, Value) -> Result<Value>>;
type DelegateFn<S> = Box<dyn Fn(&mut S, Value) -> Result<Generator>>;

enum Stage<S> {
    /// Suspend on the returned value
    Suspend(StageFn<S>),
    /// Run a child procedure to completion, forwarding its suspensions
    Delegate(DelegateFn<S>),
}

/// Builder for straight-line procedures.
///
/// Each `then` stage receives the input bound at the previous suspension
/// point (or `Unit` for the first stage) and returns the next value to
/// suspend on; `finish` receives the last bound input and returns the final
/// value. State shared between stages lives in `S`.
///
/// A `then_delegate` stage builds a child [`Generator`] instead. The child
/// suspends in place of the script until it returns, and its final value is
/// the input of the stage after it.
///
/// ```ignore
/// let gen = Script::new(Vec::new)
///     .then(|_, _| Ok(Value::list([10i64, 20])))
///     .then(|seen, x| { seen.push(x); Ok(Value::list([3i64, 4])) })
///     .finish(|seen, y| Ok(Value::list([Value::Int(seen[0].as_int()? + y.as_int()?)])));
/// ```
pub struct Script<S> {
    init: Rc<dyn Fn() -> S>,
    stages: Vec<Stage<S>>,
}

impl<S: 'static> Script<S> {
    pub fn new(init: impl Fn() -> S + 'static) -> Self {
        Self {
            init: Rc::new(init),
            stages: Vec::new(),
        }
    }

    /// Add a suspension point
    pub fn then(mut self, stage: impl Fn(&mut S, Value) -> Result<Value> + 'static) -> Self {
        self.stages.push(Stage::Suspend(Box::new(stage)));
        self
    }

    /// Hand control to the procedure built by `child` until it returns.
    ///
    /// The child is spawned fresh each time the stage is reached and its
    /// first resume receives `Unit`.
    pub fn then_delegate(
        mut self,
        child: impl Fn(&mut S, Value) -> Result<Generator> + 'static,
    ) -> Self {
        self.stages.push(Stage::Delegate(Box::new(child)));
        self
    }

    /// Close the script with its final value
    pub fn finish(self, last: impl Fn(&mut S, Value) -> Result<Value> + 'static) -> Generator {
        let init = self.init;
        let stages: Rc<[Stage<S>]> = self.stages.into();
        let last: Rc<dyn Fn(&mut S, Value) -> Result<Value>> = Rc::new(last);
        Generator::new(move || ScriptProcedure {
            state: init(),
            stages: stages.clone(),
            last: last.clone(),
            position: 0,
            resumed: 0,
            child: None,
        })
    }
}

struct ScriptProcedure<S> {
    state: S,
    stages: Rc<[Stage<S>]>,
    last: Rc<dyn Fn(&mut S, Value) -> Result<Value>>,
    /// Next stage to enter
    position: usize,
    resumed: usize,
    /// Delegated procedure currently suspended
    child: Option<Box<dyn Procedure>>,
}

impl<S> Procedure for ScriptProcedure<S> {
    fn resume(&mut self, input: Value) -> Result<Step> {
        let steps = self.resumed;
        self.resumed += 1;
        let mut input = input;
        loop {
            if let Some(child) = self.child.as_mut() {
                match child.resume(input)? {
                    Step::Yield(value) => return Ok(Step::Yield(value)),
                    Step::Return(value) => {
                        self.child = None;
                        input = value;
                    }
                }
            }

            let position = self.position;
            ensure!(
                position <= self.stages.len(),
                AlgebraError::CursorExhausted { steps }
            );
            self.position += 1;
            let Some(stage) = self.stages.get(position) else {
                return Ok(Step::Return((self.last)(&mut self.state, input)?));
            };
            match stage {
                Stage::Suspend(stage) => return Ok(Step::Yield(stage(&mut self.state, input)?)),
                Stage::Delegate(build) => {
                    self.child = Some(build(&mut self.state, input)?.spawn());
                    input = Value::Unit;
                }
            }
        }
    }
}
