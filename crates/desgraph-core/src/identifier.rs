//! Identifier management using string interning for efficient string storage and comparison
//!
//! Every name in a netlist (module, port, wire, instance, pin, and the
//! hierarchical vertex names produced by flattening) is stored as an [`Id`].
//! The interner acts as the name→integer table; strings are only resolved for
//! display and diagnostics.

use std::{
    fmt,
    sync::{Mutex, OnceLock},
};

use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Separator placed between an instance name and an internal name when a
/// nested graph is flattened into its parent.
pub const HIERARCHY_SEPARATOR: &str = "/";

/// Global string interner for efficient identifier storage.
///
/// # Thread Safety
///
/// This uses `Mutex` for thread-safe access to the string interner.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn with_interner<R>(f: impl FnOnce(&mut DefaultStringInterner) -> R) -> R {
    let mut interner = INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .expect("Failed to acquire interner lock");
    f(&mut interner)
}

/// Returns `true` if `name` is a legal netlist identifier.
///
/// A legal identifier is non-empty, starts with an ASCII letter or underscore
/// and continues with ASCII letters, digits or underscores.
///
/// # Examples
///
/// ```
/// use desgraph_core::identifier::is_valid_identifier;
///
/// assert!(is_valid_identifier("_clk0"));
/// assert!(!is_valid_identifier("0clk"));
/// assert!(!is_valid_identifier(""));
/// ```
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Efficient identifier type using string interning
///
/// # Examples
///
/// ```
/// use desgraph_core::identifier::Id;
///
/// let inst = Id::new("u1");
/// let vertex = Id::new("i1");
///
/// let nested = inst.create_nested(vertex);
/// assert_eq!(nested, "u1/i1");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Creates an `Id` from &str.
    pub fn new(name: &str) -> Self {
        Self(with_interner(|interner| interner.get_or_intern(name)))
    }

    /// Creates a hierarchical ID by joining this ID and `child_id` with
    /// [`HIERARCHY_SEPARATOR`].
    ///
    /// # Examples
    ///
    /// ```
    /// use desgraph_core::identifier::Id;
    ///
    /// let top = Id::new("u1");
    /// let deep = top.create_nested(Id::new("u2")).create_nested(Id::new("i1"));
    /// assert_eq!(deep, "u1/u2/i1");
    /// ```
    pub fn create_nested(&self, child_id: Id) -> Self {
        with_interner(|interner| {
            let parent_str = interner
                .resolve(self.0)
                .expect("Parent ID should exist in interner");
            let child_str = interner
                .resolve(child_id.0)
                .expect("Child ID should exist in interner");
            let nested_name = format!("{parent_str}{HIERARCHY_SEPARATOR}{child_str}");
            Self(interner.get_or_intern(&nested_name))
        })
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = with_interner(|interner| {
            interner
                .resolve(self.0)
                .expect("Symbol should exist in interner")
                .to_owned()
        });
        f.write_str(&name)
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({self})")
    }
}

impl From<&str> for Id {
    /// Creates an `Id` from a string slice
    ///
    /// # Examples
    ///
    /// ```
    /// use desgraph_core::identifier::Id;
    ///
    /// let id: Id = "w0".into();
    /// assert_eq!(id, "w0");
    /// ```
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    /// Allows direct comparison with string slices: `id == "string"`
    fn eq(&self, other: &str) -> bool {
        with_interner(|interner| {
            interner
                .resolve(self.0)
                .expect("Symbol should exist in interner")
                == other
        })
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}
