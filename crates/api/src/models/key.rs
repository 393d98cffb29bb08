use lasso::{Spur, ThreadedRodeo};
use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Process-wide interner for every key name and its case-folded form.
static INTERNER: Lazy<ThreadedRodeo> = Lazy::new(ThreadedRodeo::new);

/// Case-insensitive identifier used as a scope key.
///
/// A key carries two interned symbols: the display spelling it was created
/// with and the lower-cased spelling used for equality and hashing. Two keys
/// compare equal when their folded symbols match, which is a single integer
/// comparison once both are interned.
#[derive(Clone, Copy)]
pub struct Key {
    display: Spur,
    folded: Spur,
}

impl Key {
    pub fn of(name: &str) -> Self {
        let display = INTERNER.get_or_intern(name);
        // Titlecase letters are not uppercase but still fold.
        let lower = name.to_lowercase();
        let folded = if lower == name {
            display
        } else {
            INTERNER.get_or_intern(lower)
        };
        Self { display, folded }
    }

    /// Positional key for the `index`-th (1-based) un-named argument.
    pub fn from_index(index: usize) -> Self {
        Self::of(&index.to_string())
    }

    /// Display name, as spelled when this key was created.
    pub fn name(&self) -> &'static str {
        INTERNER.resolve(&self.display)
    }

    /// Lower-cased name used for comparisons.
    pub fn folded(&self) -> &'static str {
        INTERNER.resolve(&self.folded)
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.folded == other.folded
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.folded.hash(state);
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({})", self.name())
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::of(value)
    }
}

impl From<&String> for Key {
    fn from(value: &String) -> Self {
        Key::of(value)
    }
}

impl Serialize for Key {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Key {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(Key::of(&name))
    }
}

/// Names of the scopes the context chain owns.
pub mod keys {
    use super::Key;
    use once_cell::sync::Lazy;

    pub static LOCAL: Lazy<Key> = Lazy::new(|| Key::of("local"));
    pub static ARGUMENTS: Lazy<Key> = Lazy::new(|| Key::of("arguments"));
    pub static VARIABLES: Lazy<Key> = Lazy::new(|| Key::of("variables"));
    pub static SERVER: Lazy<Key> = Lazy::new(|| Key::of("server"));
}
