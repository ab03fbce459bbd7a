//! Lists as a non-deterministic monad
//!
//! `chain` is flat-map, so binding a procedure's suspension point over a list
//! resumes it once per element.

use std::collections::VecDeque;

use lawful_error::Result;

use crate::structure::Structure;
use crate::value::{binary, Func, Recur, Value};

pub const NAME: &str = "List";

/// The list structure
pub fn list() -> Structure {
    Structure::new(NAME)
        .with_equals(|a, b| Ok(a.as_list()? == b.as_list()?))
        .with_of(|x| Ok(Value::List(vec![x])))
        .with_empty(|| Ok(Value::List(Vec::new())))
        .with_concat(|a, b| {
            let mut items = a.into_list()?;
            items.extend(b.into_list()?);
            Ok(Value::List(items))
        })
        .with_map(map_items)
        .with_sequence(|inner, t| {
            let push = binary(|acc, x| {
                let mut items = acc.into_list()?;
                items.push(x);
                Ok(Value::List(items))
            });
            t.into_list()?
                .into_iter()
                .try_fold(inner.of(Value::List(Vec::new()))?, |acc, tx| {
                    inner.map2(&push, acc, tx)
                })
        })
        .with_to_array(|t| t.into_list())
        .with_chain(|f, t| {
            let mut out = Vec::new();
            for x in t.into_list()? {
                out.extend(f.call(x)?.into_list()?);
            }
            Ok(Value::List(out))
        })
        .with_chain_rec(chain_rec)
        .derive_closure()
}

fn map_items(f: &Func, t: Value) -> Result<Value> {
    t.into_list()?
        .into_iter()
        .map(|x| f.call(x))
        .collect::<Result<Vec<_>>>()
        .map(Value::List)
}

/// Depth-first over a work list, so results come out in the order nested
/// `chain` calls would produce them.
fn chain_rec(step: &Func, seed: Value) -> Result<Value> {
    let mut pending = VecDeque::from([Value::next(seed)]);
    let mut out = Vec::new();
    while let Some(marker) = pending.pop_front() {
        match marker.into_recur()? {
            Recur::Done(result) => out.push(*result),
            Recur::Next(state) => {
                for produced in step.call(*state)?.into_list()?.into_iter().rev() {
                    pending.push_front(produced);
                }
            }
        }
    }
    Ok(Value::List(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::Operation;
    use pretty_assertions::assert_eq;

    fn ints(xs: &[i64]) -> Value {
        Value::list(xs.iter().copied())
    }

    #[test]
    fn test_flat_map() {
        let dup = Func::new(|x| Ok(Value::List(vec![x.clone(), x])));
        assert_eq!(list().chain(&dup, ints(&[1, 2])).unwrap(), ints(&[1, 1, 2, 2]));
    }

    #[test]
    fn test_derived_slots() {
        let l = list();
        for op in [
            Operation::Join,
            Operation::Ap,
            Operation::Map2,
            Operation::Map3,
            Operation::Traverse,
            Operation::Reduce,
        ] {
            assert!(l.has(op), "list should have {op}");
        }
        assert!(!l.has(Operation::Extract));
    }

    #[test]
    fn test_reduce_folds_left() {
        let minus = binary(|a, b| Ok(Value::Int(a.as_int()? - b.as_int()?)));
        let folded = list().reduce(&minus, Value::Int(10), ints(&[1, 2, 3])).unwrap();
        assert_eq!(folded, Value::Int(4));
    }

    #[test]
    fn test_sequence_is_cartesian() {
        let l = list();
        let nested = Value::list([ints(&[1, 2]), ints(&[3])]);
        assert_eq!(
            l.sequence(&l, nested).unwrap(),
            Value::list([ints(&[1, 3]), ints(&[2, 3])])
        );
    }

    #[test]
    fn test_chain_rec_matches_chain_order() {
        let step = Func::new(|state| {
            let n = state.as_int()?;
            if n >= 10 {
                return Ok(Value::list([Value::done(Value::Int(n))]));
            }
            Ok(Value::list([
                Value::next(Value::Int(n * 10 + 1)),
                Value::next(Value::Int(n * 10 + 2)),
            ]))
        });
        assert_eq!(
            list().chain_rec(&step, Value::Int(0)).unwrap(),
            ints(&[11, 12, 21, 22])
        );
    }

    #[test]
    fn test_chain_rec_rejects_non_markers() {
        let step = Func::new(|_| Ok(ints(&[1])));
        assert!(list().chain_rec(&step, Value::Unit).is_err());
    }
}
