//! Constructor and call argument values.

use crate::Address;
use std::collections::BTreeSet;
use std::fmt;

/// A concrete ABI argument value.
///
/// `Display` renders the textual form the toolchain accepts on its command
/// line: `0x…` for addresses, decimal for integers, `true`/`false`, and
/// parenthesised comma-separated tuples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    Address(Address),
    Uint(u128),
    Bool(bool),
    Tuple(Vec<ArgValue>),
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Address(addr) => write!(f, "{}", addr),
            ArgValue::Uint(n) => write!(f, "{}", n),
            ArgValue::Bool(b) => write!(f, "{}", b),
            ArgValue::Tuple(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl From<Address> for ArgValue {
    fn from(addr: Address) -> Self {
        ArgValue::Address(addr)
    }
}

impl From<bool> for ArgValue {
    fn from(b: bool) -> Self {
        ArgValue::Bool(b)
    }
}

impl From<u64> for ArgValue {
    fn from(n: u64) -> Self {
        ArgValue::Uint(n.into())
    }
}

/// A constructor argument as declared in a resource graph.
///
/// Arguments may refer to the address of another resource in the same graph;
/// those references become dependency edges and are resolved only once the
/// referenced resource has a handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgSpec {
    /// A literal value known when the graph is built.
    Value(ArgValue),
    /// The address of the named resource.
    AddressOf(String),
    /// A tuple of nested argument specs.
    Tuple(Vec<ArgSpec>),
}

impl ArgSpec {
    /// Reference another resource's address.
    pub fn address_of(name: impl Into<String>) -> Self {
        ArgSpec::AddressOf(name.into())
    }

    /// Tuple of address references, in order.
    pub fn addresses_of<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ArgSpec::Tuple(names.into_iter().map(Self::address_of).collect())
    }

    /// Names of every resource this argument refers to.
    pub fn references(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references(&self, out: &mut BTreeSet<String>) {
        match self {
            ArgSpec::Value(_) => {}
            ArgSpec::AddressOf(name) => {
                out.insert(name.clone());
            }
            ArgSpec::Tuple(items) => items.iter().for_each(|a| a.collect_references(out)),
        }
    }

    /// Resolve into a concrete value using `lookup` for resource addresses.
    pub fn resolve<F>(&self, lookup: &F) -> Result<ArgValue, UnresolvedReference>
    where
        F: Fn(&str) -> Option<Address>,
    {
        match self {
            ArgSpec::Value(v) => Ok(v.clone()),
            ArgSpec::AddressOf(name) => lookup(name)
                .map(ArgValue::Address)
                .ok_or_else(|| UnresolvedReference(name.clone())),
            ArgSpec::Tuple(items) => items
                .iter()
                .map(|a| a.resolve(lookup))
                .collect::<Result<Vec<_>, _>>()
                .map(ArgValue::Tuple),
        }
    }
}

impl From<ArgValue> for ArgSpec {
    fn from(v: ArgValue) -> Self {
        ArgSpec::Value(v)
    }
}

impl From<Address> for ArgSpec {
    fn from(addr: Address) -> Self {
        ArgSpec::Value(ArgValue::Address(addr))
    }
}

impl From<bool> for ArgSpec {
    fn from(b: bool) -> Self {
        ArgSpec::Value(ArgValue::Bool(b))
    }
}

impl From<u64> for ArgSpec {
    fn from(n: u64) -> Self {
        ArgSpec::Value(ArgValue::Uint(n.into()))
    }
}

/// A constructor argument referred to a resource that has no handle yet.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Argument refers to resource {0} which has not been created")]
pub struct UnresolvedReference(pub String);
