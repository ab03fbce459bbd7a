//! Pairs, mapped and traversed over their first component

use lawful_error::Result;

use crate::structure::Structure;
use crate::value::{Func, Value};

pub const NAME: &str = "Pair";

/// The pair structure. The second component rides along unchanged.
pub fn pair() -> Structure {
    Structure::new(NAME)
        .with_map(|f, p| {
            let (first, second) = p.into_pair()?;
            Ok(create(f.call(first)?, second))
        })
        .with_sequence(|inner, p| {
            let (first, second) = p.into_pair()?;
            inner.map(&Func::new(move |x| Ok(create(x, second.clone()))), first)
        })
        .with_reduce(|f, seed, p| f(seed, first(&p)?))
        .derive_closure()
}

pub fn create(first: impl Into<Value>, second: impl Into<Value>) -> Value {
    Value::pair(first, second)
}

pub fn first(p: &Value) -> Result<Value> {
    p.clone().into_pair().map(|(first, _)| first)
}

pub fn second(p: &Value) -> Result<Value> {
    p.clone().into_pair().map(|(_, second)| second)
}
