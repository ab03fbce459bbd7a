//! Ready-made structures over [`Value`](crate::Value)
//!
//! Each constructor supplies the operations that are natural for its shape and
//! leaves the rest to [`derive_closure`](crate::derive::derive_closure).

pub mod identity;
pub mod list;
pub mod pair;
pub mod record;

pub use identity::identity;
pub use list::list;
pub use pair::pair;
pub use record::record;
