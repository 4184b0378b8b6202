//! Atoms and tuples.
//!
//! Atoms are the opaque values relations range over. Relata only needs
//! equality and hashing; the ordering is derived so hosts can print sorted
//! output, never used by the algebra itself.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

// ============================================================================
// Atom
// ============================================================================

/// An atomic value of the untyped universe.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Atom {
    Bool(bool),
    Int(i64),
    Text(Arc<str>),
}

impl Atom {
    pub fn text(s: &str) -> Self {
        Atom::Text(Arc::from(s))
    }

    /// Parse a command-line style token: integers and booleans are recognised,
    /// everything else is text.
    pub fn parse_token(token: &str) -> Self {
        if let Ok(i) = token.parse::<i64>() {
            return Atom::Int(i);
        }
        match token {
            "true" => Atom::Bool(true),
            "false" => Atom::Bool(false),
            _ => Atom::text(token),
        }
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atom::Bool(b) => write!(f, "{b}"),
            Atom::Int(i) => write!(f, "{i}"),
            Atom::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Atom {
    fn from(value: &str) -> Self {
        Atom::text(value)
    }
}

impl From<String> for Atom {
    fn from(value: String) -> Self {
        Atom::Text(Arc::from(value))
    }
}

impl From<&String> for Atom {
    fn from(value: &String) -> Self {
        Atom::text(value)
    }
}

impl From<&Atom> for Atom {
    fn from(value: &Atom) -> Self {
        value.clone()
    }
}

impl From<i64> for Atom {
    fn from(value: i64) -> Self {
        Atom::Int(value)
    }
}

impl From<i32> for Atom {
    fn from(value: i32) -> Self {
        Atom::Int(i64::from(value))
    }
}

impl From<u32> for Atom {
    fn from(value: u32) -> Self {
        Atom::Int(i64::from(value))
    }
}

impl From<bool> for Atom {
    fn from(value: bool) -> Self {
        Atom::Bool(value)
    }
}

// ============================================================================
// Tuple
// ============================================================================

/// A fixed-length ordered sequence of atoms.
///
/// `Tuple` borrows as `[Atom]`, so extensions can be queried with a plain
/// slice without allocating.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tuple(Vec<Atom>);

impl Tuple {
    pub fn new(atoms: Vec<Atom>) -> Self {
        Self(atoms)
    }
}

impl Deref for Tuple {
    type Target = [Atom];

    fn deref(&self) -> &[Atom] {
        &self.0
    }
}

impl std::borrow::Borrow<[Atom]> for Tuple {
    fn borrow(&self) -> &[Atom] {
        &self.0
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, atom) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{atom}")?;
        }
        f.write_str(")")
    }
}

impl From<Atom> for Tuple {
    fn from(value: Atom) -> Self {
        Tuple(vec![value])
    }
}

impl From<&Atom> for Tuple {
    fn from(value: &Atom) -> Self {
        Tuple(vec![value.clone()])
    }
}

impl From<&str> for Tuple {
    fn from(value: &str) -> Self {
        Tuple(vec![Atom::from(value)])
    }
}

impl From<String> for Tuple {
    fn from(value: String) -> Self {
        Tuple(vec![Atom::from(value)])
    }
}

impl From<i64> for Tuple {
    fn from(value: i64) -> Self {
        Tuple(vec![Atom::Int(value)])
    }
}

impl From<&Tuple> for Tuple {
    fn from(value: &Tuple) -> Self {
        value.clone()
    }
}

impl From<&[Atom]> for Tuple {
    fn from(value: &[Atom]) -> Self {
        Tuple(value.to_vec())
    }
}

impl<T: Into<Atom>> From<Vec<T>> for Tuple {
    fn from(value: Vec<T>) -> Self {
        Tuple(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Atom>, const N: usize> From<[T; N]> for Tuple {
    fn from(value: [T; N]) -> Self {
        Tuple(value.into_iter().map(Into::into).collect())
    }
}

impl<A: Into<Atom>, B: Into<Atom>> From<(A, B)> for Tuple {
    fn from((a, b): (A, B)) -> Self {
        Tuple(vec![a.into(), b.into()])
    }
}

impl<A: Into<Atom>, B: Into<Atom>, C: Into<Atom>> From<(A, B, C)> for Tuple {
    fn from((a, b, c): (A, B, C)) -> Self {
        Tuple(vec![a.into(), b.into(), c.into()])
    }
}

impl FromIterator<Atom> for Tuple {
    fn from_iter<I: IntoIterator<Item = Atom>>(iter: I) -> Self {
        Tuple(iter.into_iter().collect())
    }
}
