//! Runtime values carried by algebraic structures
//!
//! Structures in this crate are dynamically shaped: a list structure holds
//! `Value::List`, an identity structure holds any value, a record structure
//! holds `Value::Record`. Functions are first-class (`Value::Func`) so that
//! curried functions can be mapped into a structure and applied with `ap`.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use lawful_error::{invalid_argument, type_mismatch, AlgebraError, Result};

/// Unary function stored inside a value or passed to `map`/`chain`.
#[derive(Clone)]
pub struct Func(Rc<dyn Fn(Value) -> Result<Value>>);

/// Two-argument function used by `map2` and `reduce`.
pub type BinaryFn = Rc<dyn Fn(Value, Value) -> Result<Value>>;

/// Three-argument function used by `map3`.
pub type TernaryFn = Rc<dyn Fn(Value, Value, Value) -> Result<Value>>;

impl Func {
    /// Wrap a closure as a function value
    pub fn new(f: impl Fn(Value) -> Result<Value> + 'static) -> Self {
        Func(Rc::new(f))
    }

    /// The identity function
    pub fn identity() -> Self {
        Func::new(Ok)
    }

    /// Apply this function to a value
    pub fn call(&self, input: Value) -> Result<Value> {
        (self.0)(input)
    }

    /// `x1 => x2 => f(x1, x2)`
    pub fn curry2(f: &BinaryFn) -> Self {
        let f = f.clone();
        Func::new(move |x1| {
            let f = f.clone();
            Ok(Value::Func(Func::new(move |x2| f(x1.clone(), x2))))
        })
    }

    /// `x1 => x2 => x3 => f(x1, x2, x3)`
    pub fn curry3(f: &TernaryFn) -> Self {
        let f = f.clone();
        Func::new(move |x1| {
            let f = f.clone();
            Ok(Value::Func(Func::new(move |x2| {
                let f = f.clone();
                let x1 = x1.clone();
                Ok(Value::Func(Func::new(move |x3| f(x1.clone(), x2.clone(), x3))))
            })))
        })
    }

    /// Pointer identity
    pub fn ptr_eq(&self, other: &Func) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Func {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<func>")
    }
}

/// Wrap a closure as a [`BinaryFn`]
pub fn binary(f: impl Fn(Value, Value) -> Result<Value> + 'static) -> BinaryFn {
    Rc::new(f)
}

/// Wrap a closure as a [`TernaryFn`]
pub fn ternary(f: impl Fn(Value, Value, Value) -> Result<Value> + 'static) -> TernaryFn {
    Rc::new(f)
}

/// Loop/stop marker produced by a `chain_rec` step function.
#[derive(Debug, Clone, PartialEq)]
pub enum Recur {
    /// Continue with a new state
    Next(Box<Value>),
    /// Stop with a result
    Done(Box<Value>),
}

/// Opaque host payload, compared by pointer.
#[derive(Clone)]
pub struct Native {
    type_name: &'static str,
    payload: Rc<dyn Any>,
}

impl Native {
    /// Wrap an owned payload
    pub fn new<T: Any>(type_name: &'static str, payload: T) -> Self {
        Self::from_rc(type_name, Rc::new(payload))
    }

    /// Wrap an already shared payload
    pub fn from_rc<T: Any>(type_name: &'static str, payload: Rc<T>) -> Self {
        Self { type_name, payload }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Borrow the payload as `T`
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }

    /// Share the payload as `Rc<T>`
    pub fn downcast<T: Any>(&self) -> Option<Rc<T>> {
        self.payload.clone().downcast::<T>().ok()
    }
}

impl fmt::Debug for Native {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native {}>", self.type_name)
    }
}

impl PartialEq for Native {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.payload, &other.payload)
    }
}

/// Dynamically shaped value
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Unit,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    /// Keyed values, iterated in key order
    Record(BTreeMap<String, Value>),
    Pair(Box<Value>, Box<Value>),
    Func(Func),
    Recur(Recur),
    Native(Native),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Unit, Value::Unit) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => a == b,
            (Value::Pair(a1, a2), Value::Pair(b1, b2)) => a1 == b1 && a2 == b2,
            (Value::Func(a), Value::Func(b)) => a.ptr_eq(b),
            (Value::Recur(a), Value::Recur(b)) => a == b,
            (Value::Native(a), Value::Native(b)) => a == b,
            _ => false,
        }
    }
}

impl Value {
    /// Build a list value
    pub fn list(items: impl IntoIterator<Item = impl Into<Value>>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    /// Build a record value
    pub fn record<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Record(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Build a pair value
    pub fn pair(first: impl Into<Value>, second: impl Into<Value>) -> Self {
        Value::Pair(Box::new(first.into()), Box::new(second.into()))
    }

    /// Wrap a closure as a function value
    pub fn func(f: impl Fn(Value) -> Result<Value> + 'static) -> Self {
        Value::Func(Func::new(f))
    }

    /// `chain_rec` marker: keep looping with `state`
    pub fn next(state: Value) -> Self {
        Value::Recur(Recur::Next(Box::new(state)))
    }

    /// `chain_rec` marker: stop with `result`
    pub fn done(result: Value) -> Self {
        Value::Recur(Recur::Done(Box::new(result)))
    }

    /// Short shape name used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Unit => "Unit",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Float(_) => "Float",
            Value::Str(_) => "Str",
            Value::List(_) => "List",
            Value::Record(_) => "Record",
            Value::Pair(..) => "Pair",
            Value::Func(_) => "Func",
            Value::Recur(_) => "Recur",
            Value::Native(n) => n.type_name(),
        }
    }

    fn mismatch(&self, expected: &str) -> AlgebraError {
        type_mismatch(expected, self.type_name())
    }

    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Value::Bool(b) => Ok(*b),
            other => Err(other.mismatch("Bool")),
        }
    }

    pub fn as_int(&self) -> Result<i64> {
        match self {
            Value::Int(i) => Ok(*i),
            other => Err(other.mismatch("Int")),
        }
    }

    pub fn as_str(&self) -> Result<&str> {
        match self {
            Value::Str(s) => Ok(s),
            other => Err(other.mismatch("Str")),
        }
    }

    pub fn as_list(&self) -> Result<&[Value]> {
        match self {
            Value::List(xs) => Ok(xs),
            other => Err(other.mismatch("List")),
        }
    }

    pub fn into_list(self) -> Result<Vec<Value>> {
        match self {
            Value::List(xs) => Ok(xs),
            other => Err(other.mismatch("List")),
        }
    }

    pub fn as_record(&self) -> Result<&BTreeMap<String, Value>> {
        match self {
            Value::Record(entries) => Ok(entries),
            other => Err(other.mismatch("Record")),
        }
    }

    pub fn into_record(self) -> Result<BTreeMap<String, Value>> {
        match self {
            Value::Record(entries) => Ok(entries),
            other => Err(other.mismatch("Record")),
        }
    }

    pub fn into_pair(self) -> Result<(Value, Value)> {
        match self {
            Value::Pair(first, second) => Ok((*first, *second)),
            other => Err(other.mismatch("Pair")),
        }
    }

    pub fn as_func(&self) -> Result<&Func> {
        match self {
            Value::Func(f) => Ok(f),
            other => Err(other.mismatch("Func")),
        }
    }

    pub fn into_recur(self) -> Result<Recur> {
        match self {
            Value::Recur(r) => Ok(r),
            other => Err(other.mismatch("Recur")),
        }
    }

    pub fn as_native(&self) -> Result<&Native> {
        match self {
            Value::Native(n) => Ok(n),
            other => Err(other.mismatch("Native")),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(xs: Vec<Value>) -> Self {
        Value::List(xs)
    }
}

impl From<Func> for Value {
    fn from(f: Func) -> Self {
        Value::Func(f)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match json {
            Json::Null => Value::Unit,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => Value::Str(s),
            Json::Array(xs) => Value::List(xs.into_iter().map(Value::from).collect()),
            Json::Object(entries) => {
                Value::Record(entries.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl TryFrom<Value> for serde_json::Value {
    type Error = AlgebraError;

    fn try_from(value: Value) -> Result<Self> {
        use serde_json::Value as Json;
        Ok(match value {
            Value::Unit => Json::Null,
            Value::Bool(b) => Json::Bool(b),
            Value::Int(i) => Json::from(i),
            Value::Float(x) => serde_json::Number::from_f64(x)
                .map(Json::Number)
                .ok_or_else(|| invalid_argument(format!("{x} has no JSON representation")))?,
            Value::Str(s) => Json::String(s),
            Value::List(xs) => Json::Array(
                xs.into_iter()
                    .map(Json::try_from)
                    .collect::<Result<Vec<_>>>()?,
            ),
            Value::Record(entries) => Json::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| -> Result<(String, Json)> { Ok((k, Json::try_from(v)?)) })
                    .collect::<Result<serde_json::Map<_, _>>>()?,
            ),
            Value::Pair(first, second) => {
                serde_json::json!({
                    "first": Json::try_from(*first)?,
                    "second": Json::try_from(*second)?,
                })
            }
            other => return Err(type_mismatch("JSON-compatible value", other.type_name())),
        })
    }
}
