//! Scope implementations backing the context chain.

pub mod arguments;
pub mod base;

pub use arguments::{Arguments, ArgumentsScope};
pub use base::BaseScope;
