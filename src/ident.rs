use std::cmp::Ordering;
use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::hash::Hash;
use std::hash::Hasher;
use std::marker::PhantomData;
use std::sync::atomic::AtomicU64;

/// Unique identifier trait for domain entities.
pub trait Unique<T = Self> {
    fn id(&self) -> ID<T>;
}

/// Numeric identifier carrying the entity it names as a marker type,
/// so a game id can never be passed where a prompt id is expected.
pub struct ID<T> {
    inner: u64,
    marker: PhantomData<fn() -> T>,
}

impl<T> ID<T> {
    pub const fn new(inner: u64) -> Self {
        Self {
            inner,
            marker: PhantomData,
        }
    }
    pub fn inner(&self) -> u64 {
        self.inner
    }
}

impl<T> From<u64> for ID<T> {
    fn from(inner: u64) -> Self {
        Self::new(inner)
    }
}
impl<T> From<ID<T>> for u64 {
    fn from(id: ID<T>) -> Self {
        id.inner
    }
}

/// The zero id names nothing; storage assigns a real one on insert.
impl<T> Default for ID<T> {
    fn default() -> Self {
        Self::new(0)
    }
}

impl<T> Copy for ID<T> {}
impl<T> Clone for ID<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Eq for ID<T> {}
impl<T> PartialEq for ID<T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T> Ord for ID<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp(&other.inner)
    }
}
impl<T> PartialOrd for ID<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Hash for ID<T> {
    fn hash<H>(&self, state: &mut H)
    where
        H: Hasher,
    {
        self.inner.hash(state);
    }
}

impl<T> Debug for ID<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ID").field(&self.inner).finish()
    }
}
impl<T> Display for ID<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.inner, f)
    }
}

impl<T> serde::Serialize for ID<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u64(self.inner)
    }
}
impl<'de, T> serde::Deserialize<'de> for ID<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Self::new)
    }
}

/// Monotonic allocator of identifiers for one entity type. Starts at 1.
pub struct Sequence<T> {
    next: AtomicU64,
    marker: PhantomData<fn() -> T>,
}

impl<T> Default for Sequence<T> {
    fn default() -> Self {
        Self {
            next: AtomicU64::new(1),
            marker: PhantomData,
        }
    }
}

impl<T> Sequence<T> {
    pub fn next(&self) -> ID<T> {
        ID::new(self.next.fetch_add(1, std::sync::atomic::Ordering::Relaxed))
    }
}
