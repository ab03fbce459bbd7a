//! Records keyed by string, traversed in key order

use std::collections::BTreeMap;

use lawful_error::{invalid_argument, Result};

use crate::structure::Structure;
use crate::structures::{list, pair};
use crate::value::{Func, Value};

pub const NAME: &str = "Record";

/// The record structure
pub fn record() -> Structure {
    let pairs = pair::pair();
    let lists = list::list();

    Structure::new(NAME)
        .with_map(|f, t| {
            t.into_record()?
                .into_iter()
                .map(|(key, x)| -> Result<(String, Value)> { Ok((key, f.call(x)?)) })
                .collect::<Result<BTreeMap<_, _>>>()
                .map(Value::Record)
        })
        .with_equals(|a, b| Ok(a.as_record()? == b.as_record()?))
        .with_empty(|| Ok(Value::Record(BTreeMap::new())))
        .with_concat(|a, b| {
            let mut merged = a.into_record()?;
            merged.extend(b.into_record()?);
            Ok(Value::Record(merged))
        })
        .with_to_array(|t| Ok(t.into_record()?.into_values().collect()))
        .with_sequence(move |inner, t| {
            let sequenced = to_pairs(t)?
                .into_iter()
                .map(|p| pairs.sequence(inner, p))
                .collect::<Result<Vec<_>>>()?;
            let gathered = lists.sequence(inner, Value::List(sequenced))?;
            inner.map(&Func::new(from_pairs), gathered)
        })
        .with_ap(|tf, tx| {
            let args = tx.into_record()?;
            tf.into_record()?
                .into_iter()
                .map(|(key, f)| -> Result<(String, Value)> {
                    let x = args
                        .get(&key)
                        .cloned()
                        .ok_or_else(|| invalid_argument(format!("no argument for key `{key}`")))?;
                    Ok((key, f.as_func()?.call(x)?))
                })
                .collect::<Result<BTreeMap<_, _>>>()
                .map(Value::Record)
        })
        .derive_closure()
}

/// `{k: v}` as a list of `(v, k)` pairs in key order
pub fn to_pairs(t: Value) -> Result<Vec<Value>> {
    Ok(t.into_record()?
        .into_iter()
        .map(|(key, x)| pair::create(x, key))
        .collect())
}

/// Inverse of [`to_pairs`], accepting a list value
pub fn from_pairs(pairs: Value) -> Result<Value> {
    let mut fields = BTreeMap::new();
    for p in pairs.into_list()? {
        let (x, key) = p.into_pair()?;
        fields.insert(key.as_str()?.to_string(), x);
    }
    Ok(Value::Record(fields))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::Operation;
    use crate::value::binary;
    use pretty_assertions::assert_eq;

    fn abc() -> Value {
        Value::record([("a", Value::Int(1)), ("b", Value::Int(2)), ("c", Value::Int(3))])
    }

    #[test]
    fn test_concat_is_right_biased() {
        let left = Value::record([("a", Value::Int(1)), ("b", Value::Int(1))]);
        let right = Value::record([("b", Value::Int(2))]);
        assert_eq!(
            record().concat(left, right).unwrap(),
            Value::record([("a", Value::Int(1)), ("b", Value::Int(2))])
        );
    }

    #[test]
    fn test_key_wise_ap() {
        let fs = Value::record([
            ("a", Value::func(|x| Ok(Value::Int(x.as_int()? * 10)))),
            ("b", Value::func(|x| Ok(Value::Int(-x.as_int()?)))),
        ]);
        assert_eq!(
            record().ap(fs, abc()).unwrap(),
            Value::record([("a", Value::Int(10)), ("b", Value::Int(-2))])
        );
    }

    #[test]
    fn test_ap_with_missing_argument() {
        let fs = Value::record([("z", Value::func(Ok))]);
        assert!(matches!(
            record().ap(fs, abc()),
            Err(lawful_error::AlgebraError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_sequence_through_list() {
        let t = Value::record([
            ("x", Value::list([1i64, 2])),
            ("y", Value::list([3i64])),
        ]);
        assert_eq!(
            record().sequence(&list::list(), t).unwrap(),
            Value::list([
                Value::record([("x", Value::Int(1)), ("y", Value::Int(3))]),
                Value::record([("x", Value::Int(2)), ("y", Value::Int(3))]),
            ])
        );
    }

    #[test]
    fn test_reduce_in_key_order() {
        let r = record();
        assert!(r.has(Operation::Reduce));
        let concat = binary(|a, b| Ok(Value::Str(format!("{}{}", a.as_str()?, b.as_str()?))));
        let t = Value::record([("b", Value::from("2")), ("a", Value::from("1"))]);
        assert_eq!(r.reduce(&concat, Value::from(">"), t).unwrap(), Value::from(">12"));
    }

    #[test]
    fn test_pairs_round_trip() {
        let pairs = to_pairs(abc()).unwrap();
        assert_eq!(pairs[0], pair::create(1i64, "a"));
        assert_eq!(from_pairs(Value::List(pairs)).unwrap(), abc());
    }
}
