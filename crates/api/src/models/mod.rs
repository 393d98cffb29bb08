pub mod key;
pub mod scope;
pub mod value;

pub use key::{Key, keys};
pub use scope::{Scope, ScopeRef, ScopeSearchResult, same_scope};
pub use value::{Callable, Value};
