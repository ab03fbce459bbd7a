//! Capability tables
//!
//! A [`Structure`] is a record of optional operations describing one algebraic
//! structure (a list, an identity wrapper, a keyed record, ...). Slots the
//! caller fills are axioms; empty slots may later be filled by
//! [`derive`](crate::derive::derive). Calling an empty slot fails with
//! `MissingCapability` at call time.

use std::fmt;
use std::rc::Rc;

use lawful_error::{missing_capability, Result};
use serde::{Deserialize, Serialize};

use crate::value::{BinaryFn, Func, TernaryFn, Value};

pub type OfFn = Rc<dyn Fn(Value) -> Result<Value>>;
pub type EmptyFn = Rc<dyn Fn() -> Result<Value>>;
pub type MapFn = Rc<dyn Fn(&Func, Value) -> Result<Value>>;
pub type ConcatFn = Rc<dyn Fn(Value, Value) -> Result<Value>>;
pub type EqualsFn = Rc<dyn Fn(&Value, &Value) -> Result<bool>>;
pub type ChainFn = Rc<dyn Fn(&Func, Value) -> Result<Value>>;
pub type JoinFn = Rc<dyn Fn(Value) -> Result<Value>>;
pub type ApFn = Rc<dyn Fn(Value, Value) -> Result<Value>>;
pub type Map2Fn = Rc<dyn Fn(&BinaryFn, Value, Value) -> Result<Value>>;
pub type Map3Fn = Rc<dyn Fn(&TernaryFn, Value, Value, Value) -> Result<Value>>;
pub type ReduceFn = Rc<dyn Fn(&BinaryFn, Value, Value) -> Result<Value>>;
pub type ToArrayFn = Rc<dyn Fn(Value) -> Result<Vec<Value>>>;
pub type SequenceFn = Rc<dyn Fn(&Structure, Value) -> Result<Value>>;
pub type TraverseFn = Rc<dyn Fn(&Structure, &Func, Value) -> Result<Value>>;
pub type ExtractFn = Rc<dyn Fn(Value) -> Result<Value>>;
pub type ExtendFn = Rc<dyn Fn(&Func, Value) -> Result<Value>>;
/// `chain_rec(step, seed)`: `step` maps a state to a structure of
/// [`Value::next`] / [`Value::done`] markers.
pub type ChainRecFn = Rc<dyn Fn(&Func, Value) -> Result<Value>>;

/// Names of the slots of a capability table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Of,
    Empty,
    Map,
    Concat,
    Equals,
    Chain,
    Join,
    Ap,
    Map2,
    Map3,
    Reduce,
    ToArray,
    Sequence,
    Traverse,
    Extract,
    Extend,
    ChainRec,
}

impl Operation {
    pub const ALL: [Operation; 17] = [
        Operation::Of,
        Operation::Empty,
        Operation::Map,
        Operation::Concat,
        Operation::Equals,
        Operation::Chain,
        Operation::Join,
        Operation::Ap,
        Operation::Map2,
        Operation::Map3,
        Operation::Reduce,
        Operation::ToArray,
        Operation::Sequence,
        Operation::Traverse,
        Operation::Extract,
        Operation::Extend,
        Operation::ChainRec,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Of => "of",
            Operation::Empty => "empty",
            Operation::Map => "map",
            Operation::Concat => "concat",
            Operation::Equals => "equals",
            Operation::Chain => "chain",
            Operation::Join => "join",
            Operation::Ap => "ap",
            Operation::Map2 => "map2",
            Operation::Map3 => "map3",
            Operation::Reduce => "reduce",
            Operation::ToArray => "to_array",
            Operation::Sequence => "sequence",
            Operation::Traverse => "traverse",
            Operation::Extract => "extract",
            Operation::Extend => "extend",
            Operation::ChainRec => "chain_rec",
        }
    }

    fn bit(self) -> u32 {
        1 << (self as u32)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The set of operations a structure exposes
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CapabilitySet(u32);

impl CapabilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, op: Operation) -> bool {
        self.0 & op.bit() != 0
    }

    pub fn contains_all(&self, ops: &[Operation]) -> bool {
        ops.iter().all(|op| self.contains(*op))
    }

    pub fn insert(&mut self, op: Operation) {
        self.0 |= op.bit();
    }

    pub fn remove(&mut self, op: Operation) {
        self.0 &= !op.bit();
    }

    /// Operations in `self` but not in `other`
    pub fn difference(&self, other: &CapabilitySet) -> CapabilitySet {
        CapabilitySet(self.0 & !other.0)
    }

    pub fn is_subset(&self, other: &CapabilitySet) -> bool {
        self.0 & !other.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Operation> + '_ {
        Operation::ALL.into_iter().filter(move |op| self.contains(*op))
    }
}

impl FromIterator<Operation> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Operation>>(iter: I) -> Self {
        let mut set = CapabilitySet::new();
        for op in iter {
            set.insert(op);
        }
        set
    }
}

impl fmt::Debug for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(Operation::as_str)).finish()
    }
}

/// A possibly incomplete implementation of an algebraic structure
#[derive(Clone)]
pub struct Structure {
    name: Rc<str>,
    pub(crate) of: Option<OfFn>,
    pub(crate) empty: Option<EmptyFn>,
    pub(crate) map: Option<MapFn>,
    pub(crate) concat: Option<ConcatFn>,
    pub(crate) equals: Option<EqualsFn>,
    pub(crate) chain: Option<ChainFn>,
    pub(crate) join: Option<JoinFn>,
    pub(crate) ap: Option<ApFn>,
    pub(crate) map2: Option<Map2Fn>,
    pub(crate) map3: Option<Map3Fn>,
    pub(crate) reduce: Option<ReduceFn>,
    pub(crate) to_array: Option<ToArrayFn>,
    pub(crate) sequence: Option<SequenceFn>,
    pub(crate) traverse: Option<TraverseFn>,
    pub(crate) extract: Option<ExtractFn>,
    pub(crate) extend: Option<ExtendFn>,
    pub(crate) chain_rec: Option<ChainRecFn>,
}

impl fmt::Debug for Structure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Structure")
            .field("name", &self.name)
            .field("capabilities", &self.capabilities())
            .finish()
    }
}

fn slot<'a, F: ?Sized>(
    structure: &Structure,
    slot: &'a Option<Rc<F>>,
    op: Operation,
) -> Result<&'a Rc<F>> {
    slot.as_ref()
        .ok_or_else(|| missing_capability(structure.name(), op.as_str()))
}

impl Structure {
    /// An empty table with no capabilities
    pub fn new(name: &str) -> Self {
        Self {
            name: Rc::from(name),
            of: None,
            empty: None,
            map: None,
            concat: None,
            equals: None,
            chain: None,
            join: None,
            ap: None,
            map2: None,
            map3: None,
            reduce: None,
            to_array: None,
            sequence: None,
            traverse: None,
            extract: None,
            extend: None,
            chain_rec: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the slot for `op` is filled
    pub fn has(&self, op: Operation) -> bool {
        match op {
            Operation::Of => self.of.is_some(),
            Operation::Empty => self.empty.is_some(),
            Operation::Map => self.map.is_some(),
            Operation::Concat => self.concat.is_some(),
            Operation::Equals => self.equals.is_some(),
            Operation::Chain => self.chain.is_some(),
            Operation::Join => self.join.is_some(),
            Operation::Ap => self.ap.is_some(),
            Operation::Map2 => self.map2.is_some(),
            Operation::Map3 => self.map3.is_some(),
            Operation::Reduce => self.reduce.is_some(),
            Operation::ToArray => self.to_array.is_some(),
            Operation::Sequence => self.sequence.is_some(),
            Operation::Traverse => self.traverse.is_some(),
            Operation::Extract => self.extract.is_some(),
            Operation::Extend => self.extend.is_some(),
            Operation::ChainRec => self.chain_rec.is_some(),
        }
    }

    /// Descriptor of every filled slot
    pub fn capabilities(&self) -> CapabilitySet {
        Operation::ALL.into_iter().filter(|op| self.has(*op)).collect()
    }

    /// A copy of this table with the slot for `op` emptied
    pub fn without(&self, op: Operation) -> Self {
        let mut copy = self.clone();
        match op {
            Operation::Of => copy.of = None,
            Operation::Empty => copy.empty = None,
            Operation::Map => copy.map = None,
            Operation::Concat => copy.concat = None,
            Operation::Equals => copy.equals = None,
            Operation::Chain => copy.chain = None,
            Operation::Join => copy.join = None,
            Operation::Ap => copy.ap = None,
            Operation::Map2 => copy.map2 = None,
            Operation::Map3 => copy.map3 = None,
            Operation::Reduce => copy.reduce = None,
            Operation::ToArray => copy.to_array = None,
            Operation::Sequence => copy.sequence = None,
            Operation::Traverse => copy.traverse = None,
            Operation::Extract => copy.extract = None,
            Operation::Extend => copy.extend = None,
            Operation::ChainRec => copy.chain_rec = None,
        }
        copy
    }

    /// A copy of this table under another name
    pub fn renamed(&self, name: &str) -> Self {
        let mut copy = self.clone();
        copy.name = Rc::from(name);
        copy
    }

    // Builders

    pub fn with_of(mut self, f: impl Fn(Value) -> Result<Value> + 'static) -> Self {
        self.of = Some(Rc::new(f));
        self
    }

    pub fn with_empty(mut self, f: impl Fn() -> Result<Value> + 'static) -> Self {
        self.empty = Some(Rc::new(f));
        self
    }

    pub fn with_map(mut self, f: impl Fn(&Func, Value) -> Result<Value> + 'static) -> Self {
        self.map = Some(Rc::new(f));
        self
    }

    pub fn with_concat(mut self, f: impl Fn(Value, Value) -> Result<Value> + 'static) -> Self {
        self.concat = Some(Rc::new(f));
        self
    }

    pub fn with_equals(mut self, f: impl Fn(&Value, &Value) -> Result<bool> + 'static) -> Self {
        self.equals = Some(Rc::new(f));
        self
    }

    pub fn with_chain(mut self, f: impl Fn(&Func, Value) -> Result<Value> + 'static) -> Self {
        self.chain = Some(Rc::new(f));
        self
    }

    pub fn with_join(mut self, f: impl Fn(Value) -> Result<Value> + 'static) -> Self {
        self.join = Some(Rc::new(f));
        self
    }

    pub fn with_ap(mut self, f: impl Fn(Value, Value) -> Result<Value> + 'static) -> Self {
        self.ap = Some(Rc::new(f));
        self
    }

    pub fn with_map2(
        mut self,
        f: impl Fn(&BinaryFn, Value, Value) -> Result<Value> + 'static,
    ) -> Self {
        self.map2 = Some(Rc::new(f));
        self
    }

    pub fn with_map3(
        mut self,
        f: impl Fn(&TernaryFn, Value, Value, Value) -> Result<Value> + 'static,
    ) -> Self {
        self.map3 = Some(Rc::new(f));
        self
    }

    pub fn with_reduce(
        mut self,
        f: impl Fn(&BinaryFn, Value, Value) -> Result<Value> + 'static,
    ) -> Self {
        self.reduce = Some(Rc::new(f));
        self
    }

    pub fn with_to_array(mut self, f: impl Fn(Value) -> Result<Vec<Value>> + 'static) -> Self {
        self.to_array = Some(Rc::new(f));
        self
    }

    pub fn with_sequence(
        mut self,
        f: impl Fn(&Structure, Value) -> Result<Value> + 'static,
    ) -> Self {
        self.sequence = Some(Rc::new(f));
        self
    }

    pub fn with_traverse(
        mut self,
        f: impl Fn(&Structure, &Func, Value) -> Result<Value> + 'static,
    ) -> Self {
        self.traverse = Some(Rc::new(f));
        self
    }

    pub fn with_extract(mut self, f: impl Fn(Value) -> Result<Value> + 'static) -> Self {
        self.extract = Some(Rc::new(f));
        self
    }

    pub fn with_extend(mut self, f: impl Fn(&Func, Value) -> Result<Value> + 'static) -> Self {
        self.extend = Some(Rc::new(f));
        self
    }

    pub fn with_chain_rec(mut self, f: impl Fn(&Func, Value) -> Result<Value> + 'static) -> Self {
        self.chain_rec = Some(Rc::new(f));
        self
    }

    /// Complete this table with one derivation pass
    pub fn derive(&self) -> Structure {
        crate::derive::derive(self)
    }

    /// Derive repeatedly until no pass adds an operation
    pub fn derive_closure(&self) -> Structure {
        crate::derive::derive_closure(self)
    }

    // Call-time operations

    pub fn of(&self, x: Value) -> Result<Value> {
        slot(self, &self.of, Operation::Of)?(x)
    }

    pub fn empty(&self) -> Result<Value> {
        slot(self, &self.empty, Operation::Empty)?()
    }

    pub fn map(&self, f: &Func, t: Value) -> Result<Value> {
        slot(self, &self.map, Operation::Map)?(f, t)
    }

    pub fn concat(&self, a: Value, b: Value) -> Result<Value> {
        slot(self, &self.concat, Operation::Concat)?(a, b)
    }

    pub fn equals(&self, a: &Value, b: &Value) -> Result<bool> {
        slot(self, &self.equals, Operation::Equals)?(a, b)
    }

    pub fn chain(&self, f: &Func, t: Value) -> Result<Value> {
        slot(self, &self.chain, Operation::Chain)?(f, t)
    }

    pub fn join(&self, tt: Value) -> Result<Value> {
        slot(self, &self.join, Operation::Join)?(tt)
    }

    pub fn ap(&self, tf: Value, tx: Value) -> Result<Value> {
        slot(self, &self.ap, Operation::Ap)?(tf, tx)
    }

    pub fn map2(&self, f: &BinaryFn, t1: Value, t2: Value) -> Result<Value> {
        slot(self, &self.map2, Operation::Map2)?(f, t1, t2)
    }

    pub fn map3(&self, f: &TernaryFn, t1: Value, t2: Value, t3: Value) -> Result<Value> {
        slot(self, &self.map3, Operation::Map3)?(f, t1, t2, t3)
    }

    pub fn reduce(&self, f: &BinaryFn, seed: Value, t: Value) -> Result<Value> {
        slot(self, &self.reduce, Operation::Reduce)?(f, seed, t)
    }

    pub fn to_array(&self, t: Value) -> Result<Vec<Value>> {
        slot(self, &self.to_array, Operation::ToArray)?(t)
    }

    pub fn sequence(&self, inner: &Structure, t: Value) -> Result<Value> {
        slot(self, &self.sequence, Operation::Sequence)?(inner, t)
    }

    pub fn traverse(&self, inner: &Structure, f: &Func, t: Value) -> Result<Value> {
        slot(self, &self.traverse, Operation::Traverse)?(inner, f, t)
    }

    pub fn extract(&self, t: Value) -> Result<Value> {
        slot(self, &self.extract, Operation::Extract)?(t)
    }

    pub fn extend(&self, f: &Func, t: Value) -> Result<Value> {
        slot(self, &self.extend, Operation::Extend)?(f, t)
    }

    pub fn chain_rec(&self, step: &Func, seed: Value) -> Result<Value> {
        slot(self, &self.chain_rec, Operation::ChainRec)?(step, seed)
    }
}
