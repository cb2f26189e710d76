//! Result collections
//!
//! The parser fills a builder and freezes it into the requested collection
//! once the buffer is done. Growable collections are their own builder;
//! immutable ones (`Box<[T]>`, `Arc<[T]>`, `Arc<HashSet<T>>`) are frozen from
//! a growable builder.

use indexmap::IndexSet;
use std::collections::{BTreeSet, HashSet, VecDeque};
use std::hash::{BuildHasher, Hash};
use std::sync::Arc;

/// Collection the parser can produce
pub trait Collect: Sized {
    /// Record type
    type Item;
    /// Mutable form filled during parsing
    type Builder;

    /// Create an empty builder, pre-sized when a hint is given
    fn builder(capacity: Option<usize>) -> Self::Builder;

    /// Add one record in input order
    fn push(builder: &mut Self::Builder, item: Self::Item);

    /// Turn the builder into the final collection
    fn freeze(builder: Self::Builder) -> Self;
}

impl<T> Collect for Vec<T> {
    type Item = T;
    type Builder = Vec<T>;

    fn builder(capacity: Option<usize>) -> Self::Builder {
        Vec::with_capacity(capacity.unwrap_or(0))
    }

    fn push(builder: &mut Self::Builder, item: T) {
        builder.push(item);
    }

    fn freeze(builder: Self::Builder) -> Self {
        builder
    }
}

impl<T> Collect for VecDeque<T> {
    type Item = T;
    type Builder = VecDeque<T>;

    fn builder(capacity: Option<usize>) -> Self::Builder {
        VecDeque::with_capacity(capacity.unwrap_or(0))
    }

    fn push(builder: &mut Self::Builder, item: T) {
        builder.push_back(item);
    }

    fn freeze(builder: Self::Builder) -> Self {
        builder
    }
}

impl<T, S> Collect for HashSet<T, S>
where
    T: Eq + Hash,
    S: BuildHasher + Default,
{
    type Item = T;
    type Builder = HashSet<T, S>;

    fn builder(capacity: Option<usize>) -> Self::Builder {
        HashSet::with_capacity_and_hasher(capacity.unwrap_or(0), S::default())
    }

    fn push(builder: &mut Self::Builder, item: T) {
        builder.insert(item);
    }

    fn freeze(builder: Self::Builder) -> Self {
        builder
    }
}

impl<T: Ord> Collect for BTreeSet<T> {
    type Item = T;
    type Builder = BTreeSet<T>;

    fn builder(_capacity: Option<usize>) -> Self::Builder {
        BTreeSet::new()
    }

    fn push(builder: &mut Self::Builder, item: T) {
        builder.insert(item);
    }

    fn freeze(builder: Self::Builder) -> Self {
        builder
    }
}

/// Deduplicating set that keeps first-seen order
impl<T, S> Collect for IndexSet<T, S>
where
    T: Eq + Hash,
    S: BuildHasher + Default,
{
    type Item = T;
    type Builder = IndexSet<T, S>;

    fn builder(capacity: Option<usize>) -> Self::Builder {
        IndexSet::with_capacity_and_hasher(capacity.unwrap_or(0), S::default())
    }

    fn push(builder: &mut Self::Builder, item: T) {
        builder.insert(item);
    }

    fn freeze(builder: Self::Builder) -> Self {
        builder
    }
}

impl<T> Collect for Box<[T]> {
    type Item = T;
    type Builder = Vec<T>;

    fn builder(capacity: Option<usize>) -> Self::Builder {
        Vec::with_capacity(capacity.unwrap_or(0))
    }

    fn push(builder: &mut Self::Builder, item: T) {
        builder.push(item);
    }

    fn freeze(builder: Self::Builder) -> Self {
        builder.into_boxed_slice()
    }
}

impl<T> Collect for Arc<[T]> {
    type Item = T;
    type Builder = Vec<T>;

    fn builder(capacity: Option<usize>) -> Self::Builder {
        Vec::with_capacity(capacity.unwrap_or(0))
    }

    fn push(builder: &mut Self::Builder, item: T) {
        builder.push(item);
    }

    fn freeze(builder: Self::Builder) -> Self {
        Arc::from(builder)
    }
}

/// Immutable shared set
impl<T, S> Collect for Arc<HashSet<T, S>>
where
    T: Eq + Hash,
    S: BuildHasher + Default,
{
    type Item = T;
    type Builder = HashSet<T, S>;

    fn builder(capacity: Option<usize>) -> Self::Builder {
        <HashSet<T, S> as Collect>::builder(capacity)
    }

    fn push(builder: &mut Self::Builder, item: T) {
        builder.insert(item);
    }

    fn freeze(builder: Self::Builder) -> Self {
        Arc::new(builder)
    }
}
