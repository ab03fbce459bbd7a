//! Replay cursors
//!
//! A [`Cursor`] marks one suspension point of a procedure. It owns the live
//! procedure instance that reached this point (until it is advanced once) and
//! the inputs that were fed to get here. Advancing a cursor a second time
//! rebuilds the procedure from its [`Generator`] and replays those inputs
//! first, which lets a multi-valued structure resume the same point once per
//! bound value without the branches seeing each other.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use lawful_error::{bail, AlgebraError, Result};
use tracing::{debug, trace};

use crate::procedure::{Generator, Procedure, Step};
use crate::value::Value;

/// Inputs fed so far, as a shared cons list so that sibling cursors share
/// their common prefix.
#[derive(Clone, Default)]
struct History {
    head: Option<Rc<Entry>>,
    len: usize,
}

struct Entry {
    input: Value,
    prev: Option<Rc<Entry>>,
}

impl Drop for Entry {
    // Unlink iteratively; long histories would otherwise recurse once per entry.
    fn drop(&mut self) {
        let mut prev = self.prev.take();
        while let Some(entry) = prev {
            match Rc::try_unwrap(entry) {
                Ok(mut entry) => prev = entry.prev.take(),
                Err(_) => break,
            }
        }
    }
}

impl History {
    fn push(&self, input: Value) -> History {
        History {
            head: Some(Rc::new(Entry {
                input,
                prev: self.head.clone(),
            })),
            len: self.len + 1,
        }
    }

    /// Inputs in the order they were fed
    fn to_vec(&self) -> Vec<Value> {
        let mut inputs = Vec::with_capacity(self.len);
        let mut cursor = self.head.as_deref();
        while let Some(entry) = cursor {
            inputs.push(entry.input.clone());
            cursor = entry.prev.as_deref();
        }
        inputs.reverse();
        inputs
    }
}

enum Handle {
    /// No procedure instance yet
    Unstarted,
    /// The instance that reached this point, not yet resumed from here
    Live(Box<dyn Procedure>),
    /// The instance was consumed by an earlier advance
    Advanced,
}

/// Observable lifecycle of a cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    Unstarted,
    Live,
    Advanced,
}

/// Outcome of advancing a cursor
#[derive(Debug)]
pub struct Advance {
    /// Structure value the procedure emitted
    pub value: Value,
    /// Checkpoint after the emission; `None` once the procedure returned
    pub next: Option<Rc<Cursor>>,
}

impl Advance {
    pub fn is_done(&self) -> bool {
        self.next.is_none()
    }
}

/// Immutable checkpoint of a suspended procedure
pub struct Cursor {
    generator: Generator,
    handle: RefCell<Handle>,
    history: History,
}

impl fmt::Debug for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("state", &self.state())
            .field("depth", &self.depth())
            .finish()
    }
}

impl Cursor {
    /// The checkpoint before the procedure's first step
    pub fn start(generator: &Generator) -> Rc<Cursor> {
        Rc::new(Cursor {
            generator: generator.clone(),
            handle: RefCell::new(Handle::Unstarted),
            history: History::default(),
        })
    }

    pub fn state(&self) -> CursorState {
        match &*self.handle.borrow() {
            Handle::Unstarted => CursorState::Unstarted,
            Handle::Live(_) => CursorState::Live,
            Handle::Advanced => CursorState::Advanced,
        }
    }

    /// Number of inputs fed to reach this checkpoint
    pub fn depth(&self) -> usize {
        self.history.len
    }

    /// Inputs fed to reach this checkpoint, oldest first
    pub fn history(&self) -> Vec<Value> {
        self.history.to_vec()
    }

    /// Resume the procedure from this checkpoint with `input`.
    ///
    /// The first advance reuses the live instance. Later advances rebuild
    /// the procedure and replay the history before applying `input`.
    pub fn advance(&self, input: Value) -> Result<Advance> {
        let handle = self.handle.replace(Handle::Advanced);
        let mut procedure = match handle {
            Handle::Live(procedure) => procedure,
            Handle::Unstarted => self.replay()?,
            Handle::Advanced => {
                debug!(depth = self.depth(), "forking checkpoint by replay");
                self.replay()?
            }
        };

        match procedure.resume(input.clone())? {
            Step::Return(value) => {
                trace!(depth = self.depth(), "procedure returned");
                Ok(Advance { value, next: None })
            }
            Step::Yield(value) => Ok(Advance {
                value,
                next: Some(Rc::new(Cursor {
                    generator: self.generator.clone(),
                    handle: RefCell::new(Handle::Live(procedure)),
                    history: self.history.push(input),
                })),
            }),
        }
    }

    /// A fresh instance driven through this checkpoint's history
    fn replay(&self) -> Result<Box<dyn Procedure>> {
        let mut procedure = self.generator.spawn();
        let inputs = self.history.to_vec();
        let history = inputs.len();
        for (step, input) in inputs.into_iter().enumerate() {
            if let Step::Return(_) = procedure.resume(input)? {
                bail!(AlgebraError::ReplayDiverged { step, history });
            }
        }
        Ok(procedure)
    }
}
