//! The identity structure: a value is its own wrapper

use lawful_error::Result;

use crate::structure::Structure;
use crate::value::{Func, Recur, Value};

pub const NAME: &str = "Identity";

/// The identity structure
pub fn identity() -> Structure {
    Structure::new(NAME)
        .with_equals(|a, b| Ok(a == b))
        .with_of(Ok)
        .with_map(|f, x| f.call(x))
        .with_reduce(|f, seed, x| f(seed, x))
        .with_chain(|f, x| f.call(x))
        .with_chain_rec(chain_rec)
        .with_sequence(|_, x| Ok(x))
        .with_extract(Ok)
        .with_extend(|f, x| f.call(x))
        .derive_closure()
}

fn chain_rec(step: &Func, seed: Value) -> Result<Value> {
    let mut state = seed;
    loop {
        match step.call(state)?.into_recur()? {
            Recur::Next(next) => state = *next,
            Recur::Done(result) => return Ok(*result),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::Operation;
    use crate::structures::list;
    use crate::value::binary;

    #[test]
    fn test_derived_slots() {
        let id = identity();
        assert!(id.has(Operation::Join));
        assert!(id.has(Operation::Ap));
        assert!(id.has(Operation::Map2));
        assert!(id.has(Operation::Traverse));
        assert!(!id.has(Operation::Concat));
    }

    #[test]
    fn test_native_reduce_is_kept() {
        let pair_up = binary(|a, b| Ok(Value::pair(a, b)));
        assert_eq!(
            identity().reduce(&pair_up, Value::Int(0), Value::Int(1)).unwrap(),
            Value::pair(0i64, 1i64)
        );
    }

    #[test]
    fn test_chain_rec_loops_flat() {
        let countdown = Func::new(|n| {
            let n = n.as_int()?;
            Ok(if n == 0 {
                Value::done(Value::from("done"))
            } else {
                Value::next(Value::Int(n - 1))
            })
        });
        assert_eq!(
            identity().chain_rec(&countdown, Value::Int(100_000)).unwrap(),
            Value::from("done")
        );
    }

    #[test]
    fn test_traverse_into_list() {
        let spread = Func::new(|x| Ok(Value::list([x.clone(), x])));
        assert_eq!(
            identity().traverse(&list(), &spread, Value::Int(7)).unwrap(),
            Value::list([7i64, 7])
        );
    }
}
