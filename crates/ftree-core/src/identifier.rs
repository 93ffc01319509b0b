//! Cross-reference identifiers backed by a global string interner.
//!
//! Every record id in a loaded file (`@I1@`, `@F23@`, ...) becomes an [`Xref`].
//! The `@` markers are stripped; an `Xref` holds the bare id text.

use std::{
    cmp::Ordering,
    fmt,
    sync::{Mutex, MutexGuard, OnceLock},
};

use serde::{Serialize, Serializer};
use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner for record ids.
///
/// # Thread Safety
///
/// This uses `Mutex` for thread-safe access to the string interner.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn interner() -> MutexGuard<'static, DefaultStringInterner> {
    INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A cross-reference id, cheap to copy, hash and compare for equality.
///
/// Ordering compares the underlying id text so that sorted output is stable
/// across runs regardless of interning order.
///
/// # Examples
///
/// ```
/// use ftree_core::identifier::Xref;
///
/// let a = Xref::new("I1");
/// let b: Xref = "I1".into();
/// assert_eq!(a, b);
/// assert_eq!(a, "I1");
/// assert_eq!(a.pointer(), "@I1@");
/// ```
///
/// # Concurrency
///
/// Equality, hashing and copying never touch the interner. Creating an id,
/// ordering two ids, formatting one and comparing one against text all lock
/// the global interner, so threads doing those concurrently take turns on a
/// single mutex. Hot loops over many ids should compare and hash them rather
/// than sort or format them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Xref(DefaultSymbol);

impl Xref {
    /// Creates an `Xref` from the bare id text (without `@` markers).
    pub fn new(name: &str) -> Self {
        Self(interner().get_or_intern(name))
    }

    /// Creates an `Xref` from a pointer token such as `@I1@`.
    ///
    /// Returns `None` when the token is not delimited by `@` on both sides or
    /// the id between the markers is empty.
    ///
    /// ```
    /// use ftree_core::identifier::Xref;
    ///
    /// assert_eq!(Xref::from_pointer("@F2@"), Some(Xref::new("F2")));
    /// assert_eq!(Xref::from_pointer("F2"), None);
    /// assert_eq!(Xref::from_pointer("@@"), None);
    /// ```
    pub fn from_pointer(token: &str) -> Option<Self> {
        let inner = token.strip_prefix('@')?.strip_suffix('@')?;
        if inner.is_empty() || inner.contains('@') {
            return None;
        }
        Some(Self::new(inner))
    }

    /// Returns the id formatted as a pointer token, `@id@`.
    pub fn pointer(&self) -> String {
        format!("@{self}@")
    }
}

impl fmt::Display for Xref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let interner = interner();
        let name = interner.resolve(self.0).unwrap_or_default();
        f.write_str(name)
    }
}

impl Ord for Xref {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.0 == other.0 {
            return Ordering::Equal;
        }
        let interner = interner();
        let lhs = interner.resolve(self.0).unwrap_or_default();
        let rhs = interner.resolve(other.0).unwrap_or_default();
        lhs.cmp(rhs)
    }
}

impl PartialOrd for Xref {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::str::FromStr for Xref {
    type Err = std::convert::Infallible;

    /// Accepts either a bare id (`I1`) or a pointer token (`@I1@`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_pointer(s).unwrap_or_else(|| Self::new(s)))
    }
}

impl From<&str> for Xref {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Xref {
    fn eq(&self, other: &str) -> bool {
        let interner = interner();
        interner.resolve(self.0) == Some(other)
    }
}

impl PartialEq<&str> for Xref {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl Serialize for Xref {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
