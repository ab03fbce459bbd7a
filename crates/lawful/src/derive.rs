//! Derivation engine
//!
//! Completes a partial [`Structure`] from well-known laws. The rules below are
//! evaluated exactly once, in order, and each one looks only at the slots of
//! the *input* table. A rule that would fill a slot already present (either
//! supplied by the caller or filled by an earlier rule of the same pass) is
//! skipped, so caller-supplied operations always win.
//!
//! Derived operations close over the input table. An operation derived in this
//! pass is never used to derive another one in the same pass; running
//! `derive` a second time picks those up.
//!
//! | # | slot       | requires          | law                                                  |
//! |---|------------|-------------------|------------------------------------------------------|
//! | 1 | `join`     | `chain`           | `join(tt) = chain(id, tt)`                           |
//! | 2 | `chain`    | `join`, `map`     | `chain(f, t) = join(map(f, t))`                      |
//! | 3 | `map`      | `of`, `chain`     | `map(f, t) = chain(x => of(f(x)), t)`                |
//! | 4 | `ap`       | `map`, `chain`    | `ap(tf, tx) = chain(f => map(f, tx), tf)`            |
//! | 5 | `map2`     | `ap`, `map`       | `map2(f, a, b) = ap(map(curry(f), a), b)`            |
//! | 6 | `map3`     | `ap`, `map`       | `map3(f, a, b, c) = ap(ap(map(curry(f), a), b), c)`  |
//! | 7 | `map`      | `of`, `ap`        | `map(f, t) = ap(of(f), t)`                           |
//! | 8 | `traverse` | `map`, `sequence` | `traverse(I, f, t) = sequence(I, map(f, t))`         |
//! | 9 | `reduce`   | `map`, `sequence` | sequence through the constant applicative            |

use std::rc::Rc;

use lawful_error::{type_mismatch, Result};
use tracing::{debug, trace};

use crate::structure::{
    ApFn, ChainFn, JoinFn, Map2Fn, Map3Fn, MapFn, Operation, ReduceFn, Structure, TraverseFn,
};
use crate::value::{BinaryFn, Func, Native, TernaryFn, Value};

/// An operation produced by one rule
enum Derived {
    Join(JoinFn),
    Chain(ChainFn),
    Map(MapFn),
    Ap(ApFn),
    Map2(Map2Fn),
    Map3(Map3Fn),
    Traverse(TraverseFn),
    Reduce(ReduceFn),
}

/// One entry of the ordered rule list
struct Rule {
    target: Operation,
    requires: &'static [Operation],
    law: &'static str,
    build: fn(Rc<Structure>) -> Derived,
}

const RULES: [Rule; 9] = [
    Rule {
        target: Operation::Join,
        requires: &[Operation::Chain],
        law: "join(tt) = chain(id, tt)",
        build: join_via_chain,
    },
    Rule {
        target: Operation::Chain,
        requires: &[Operation::Join, Operation::Map],
        law: "chain(f, t) = join(map(f, t))",
        build: chain_via_join,
    },
    Rule {
        target: Operation::Map,
        requires: &[Operation::Of, Operation::Chain],
        law: "map(f, t) = chain(x => of(f(x)), t)",
        build: map_via_monad,
    },
    Rule {
        target: Operation::Ap,
        requires: &[Operation::Map, Operation::Chain],
        law: "ap(tf, tx) = chain(f => map(f, tx), tf)",
        build: ap_via_chain,
    },
    Rule {
        target: Operation::Map2,
        requires: &[Operation::Ap, Operation::Map],
        law: "map2(f, t1, t2) = ap(map(x1 => x2 => f(x1, x2), t1), t2)",
        build: map2_via_ap,
    },
    Rule {
        target: Operation::Map3,
        requires: &[Operation::Ap, Operation::Map],
        law: "map3(f, t1, t2, t3) = ap(ap(map(x1 => x2 => x3 => f(x1, x2, x3), t1), t2), t3)",
        build: map3_via_ap,
    },
    Rule {
        target: Operation::Map,
        requires: &[Operation::Of, Operation::Ap],
        law: "map(f, t) = ap(of(f), t)",
        build: map_via_applicative,
    },
    Rule {
        target: Operation::Traverse,
        requires: &[Operation::Map, Operation::Sequence],
        law: "traverse(I, f, t) = sequence(I, map(f, t))",
        build: traverse_via_sequence,
    },
    Rule {
        target: Operation::Reduce,
        requires: &[Operation::Map, Operation::Sequence],
        // a native to_array does not block this rule, only a native reduce
        law: "reduce(f, seed, t) = sequence(Const(f, seed), map(wrap, t))",
        build: reduce_via_sequence,
    },
];

/// Return `table` completed with every operation derivable in one pass.
///
/// Never fails: an operation with no derivation path stays absent and
/// calling it later yields `MissingCapability`.
pub fn derive(table: &Structure) -> Structure {
    let original = Rc::new(table.clone());
    let supplied = table.capabilities();
    let mut completed = table.clone();

    for (index, rule) in RULES.iter().enumerate() {
        if completed.has(rule.target) || !supplied.contains_all(rule.requires) {
            continue;
        }
        debug!(
            structure = table.name(),
            rule = index + 1,
            operation = rule.target.as_str(),
            law = rule.law,
            "derived operation"
        );
        completed.install((rule.build)(original.clone()));
    }

    trace!(
        structure = table.name(),
        supplied = ?supplied,
        derived = ?completed.capabilities().difference(&supplied),
        "derivation finished"
    );
    completed
}

/// Repeat [`derive`] until a pass adds nothing.
///
/// Each pass only sees the slots present when it starts, so operations that
/// depend on freshly derived ones need another pass. The rule list is finite,
/// so this stops after a handful of passes.
pub fn derive_closure(table: &Structure) -> Structure {
    let mut current = derive(table);
    let mut passes = 1;
    loop {
        let next = derive(&current);
        if next.capabilities() == current.capabilities() {
            trace!(structure = table.name(), passes, "derivation closed");
            return current;
        }
        current = next;
        passes += 1;
    }
}

impl Structure {
    fn install(&mut self, derived: Derived) {
        match derived {
            Derived::Join(f) => self.join = Some(f),
            Derived::Chain(f) => self.chain = Some(f),
            Derived::Map(f) => self.map = Some(f),
            Derived::Ap(f) => self.ap = Some(f),
            Derived::Map2(f) => self.map2 = Some(f),
            Derived::Map3(f) => self.map3 = Some(f),
            Derived::Traverse(f) => self.traverse = Some(f),
            Derived::Reduce(f) => self.reduce = Some(f),
        }
    }
}

fn join_via_chain(t: Rc<Structure>) -> Derived {
    Derived::Join(Rc::new(move |tt: Value| t.chain(&Func::identity(), tt)))
}

fn chain_via_join(t: Rc<Structure>) -> Derived {
    Derived::Chain(Rc::new(move |f: &Func, tx: Value| t.join(t.map(f, tx)?)))
}

fn map_via_monad(t: Rc<Structure>) -> Derived {
    Derived::Map(Rc::new(move |f: &Func, tx: Value| {
        let of = t.clone();
        let f = f.clone();
        t.chain(&Func::new(move |x| of.of(f.call(x)?)), tx)
    }))
}

fn ap_via_chain(t: Rc<Structure>) -> Derived {
    Derived::Ap(Rc::new(move |tf: Value, tx: Value| {
        let inner = t.clone();
        t.chain(
            &Func::new(move |f| inner.map(f.as_func()?, tx.clone())),
            tf,
        )
    }))
}

fn map2_via_ap(t: Rc<Structure>) -> Derived {
    Derived::Map2(Rc::new(move |f: &BinaryFn, t1: Value, t2: Value| {
        t.ap(t.map(&Func::curry2(f), t1)?, t2)
    }))
}

fn map3_via_ap(t: Rc<Structure>) -> Derived {
    Derived::Map3(Rc::new(move |f: &TernaryFn, t1: Value, t2: Value, t3: Value| {
        t.ap(t.ap(t.map(&Func::curry3(f), t1)?, t2)?, t3)
    }))
}

fn map_via_applicative(t: Rc<Structure>) -> Derived {
    Derived::Map(Rc::new(move |f: &Func, tx: Value| t.ap(t.of(Value::Func(f.clone()))?, tx)))
}

fn traverse_via_sequence(t: Rc<Structure>) -> Derived {
    Derived::Traverse(Rc::new(move |inner: &Structure, f: &Func, tx: Value| {
        t.sequence(inner, t.map(f, tx)?)
    }))
}

fn reduce_via_sequence(t: Rc<Structure>) -> Derived {
    Derived::Reduce(Rc::new(move |f: &BinaryFn, seed: Value, tx: Value| {
        let wrapped = t.map(&Func::new(|x| Ok(wrap(x))), tx)?;
        unwrap(t.sequence(&constant(f, seed), wrapped)?)
    }))
}

const CONST: &str = "Const";

fn wrap(x: Value) -> Value {
    Value::Native(Native::new(CONST, x))
}

fn unwrap(c: Value) -> Result<Value> {
    c.as_native()
        .ok()
        .and_then(|native| native.downcast_ref::<Value>())
        .cloned()
        .ok_or_else(|| type_mismatch(CONST, c.type_name()))
}

/// The constant applicative used to fold through `sequence`.
///
/// `of` ignores its argument and yields the seed, `map` leaves the wrapper
/// untouched, `ap` combines the two wrapped accumulators with `f`. Any
/// `sequence` that threads its effects left to right therefore computes a left
/// fold.
pub(crate) fn constant(f: &BinaryFn, seed: Value) -> Structure {
    let f = f.clone();
    Structure::new(CONST)
        .with_of(move |_| Ok(wrap(seed.clone())))
        .with_map(|_, c| Ok(c))
        .with_ap(move |c1, c2| Ok(wrap(f(unwrap(c1)?, unwrap(c2)?)?)))
        .derive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::binary;

    fn boxed() -> Structure {
        // A one-slot box: values are plain, `chain` applies directly.
        Structure::new("Box")
            .with_of(Ok)
            .with_chain(|f, t| f.call(t))
    }

    fn add() -> BinaryFn {
        binary(|a, b| Ok(Value::Int(a.as_int()? + b.as_int()?)))
    }

    #[test]
    fn test_monad_gains_join_map_ap_in_one_pass() {
        let derived = derive(&boxed());
        assert!(derived.has(Operation::Join));
        assert!(derived.has(Operation::Map));
        // `ap` needs a supplied `map`, which the box lacks.
        assert!(!derived.has(Operation::Ap));

        let again = derive(&derived);
        assert!(again.has(Operation::Ap));
        assert!(!again.has(Operation::Map2));
        assert!(derive(&again).has(Operation::Map2));
    }

    #[test]
    fn test_closure_reaches_fixpoint() {
        let closed = derive_closure(&boxed());
        assert!(closed.has(Operation::Map2));
        assert!(closed.has(Operation::Map3));
        assert_eq!(derive(&closed).capabilities(), closed.capabilities());
    }

    #[test]
    fn test_map_via_monad() {
        let derived = derive(&boxed());
        let double = Func::new(|x| Ok(Value::Int(x.as_int()? * 2)));
        assert_eq!(derived.map(&double, Value::Int(21)).unwrap(), Value::Int(42));
    }

    #[test]
    fn test_map_via_applicative_only_when_monad_rule_missed() {
        let applicative = Structure::new("Ap")
            .with_of(Ok)
            .with_ap(|tf, tx| tf.as_func()?.call(tx));
        let derived = derive(&applicative);
        let inc = Func::new(|x| Ok(Value::Int(x.as_int()? + 1)));
        assert_eq!(derived.map(&inc, Value::Int(1)).unwrap(), Value::Int(2));
    }

    #[test]
    fn test_chain_via_join() {
        let nested = Structure::new("Nested")
            .with_map(|f, t| f.call(t))
            .with_join(Ok);
        let derived = derive(&nested);
        let f = Func::new(|x| Ok(Value::Int(x.as_int()? + 10)));
        assert_eq!(derived.chain(&f, Value::Int(1)).unwrap(), Value::Int(11));
        // rule 4 reads the input table, which had no chain
        assert!(!derived.has(Operation::Ap));
    }

    #[test]
    fn test_supplied_slots_win() {
        let table = boxed().with_join(|_| Ok(Value::from("native")));
        let derived = derive(&table);
        assert_eq!(derived.join(Value::Int(1)).unwrap(), Value::from("native"));
    }

    #[test]
    fn test_constant_applicative_folds_left() {
        let konst = constant(&add(), Value::Int(100));
        let seed = konst.of(Value::Unit).unwrap();
        let step = konst.map2(&add(), seed, wrap(Value::Int(5))).unwrap();
        assert_eq!(unwrap(step).unwrap(), Value::Int(105));
    }

    #[test]
    fn test_native_to_array_does_not_block_reduce() {
        let foldable = crate::structures::list().without(Operation::Reduce);
        assert!(foldable.has(Operation::ToArray));

        let derived = derive(&foldable);
        let total = derived.reduce(&add(), Value::Int(0), Value::list([1i64, 2, 3]));
        assert_eq!(total.unwrap(), Value::Int(6));
    }

    #[test]
    fn test_unwrap_rejects_foreign_values() {
        assert_eq!(unwrap(Value::Int(3)), Err(type_mismatch(CONST, "Int")));
    }
}
