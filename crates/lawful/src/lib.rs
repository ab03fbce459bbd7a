// Lawful Library
//
// Completes partially specified algebraic structures from their laws and runs
// suspend/resume procedures as binds over them.

// Re-export the error framework
pub use lawful_error as error;
pub use lawful_error::{AlgebraError, ErrorCode, ErrorDomain, ErrorMessage, LawfulError, Result};

// Value Model
// Dynamic values, function values, chain_rec markers and opaque payloads
pub mod value;

// Capability Tables
// Optional operation slots, capability descriptors and builders
pub mod structure;

// Derivation Engine
// Ordered single-pass rules and fixpoint completion
pub mod derive;

// Procedures
// Step-once state machines and the generators that instantiate them
pub mod procedure;

// Replay Cursors
pub mod cursor;

// Effect Interpreter
// Stack-unsafe chain recursion and stack-safe chain_rec driving
pub mod interpreter;

// Concrete Structures
pub mod structures;

// Configuration and Logging
pub mod config;
pub mod logging;

pub use config::{RunConfig, StrategyPreference};
pub use cursor::{Advance, Cursor, CursorState};
pub use derive::{derive, derive_closure};
pub use interpreter::{run_generator, run_generator_with, select_strategy, Strategy};
pub use procedure::{Generator, Procedure, Script, Step};
pub use structure::{CapabilitySet, Operation, Structure};
pub use value::{binary, ternary, BinaryFn, Func, Native, Recur, TernaryFn, Value};
