use crate::Expr;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_INDEX_ID: AtomicUsize = AtomicUsize::new(0);

/// A free index ranging over `0 .. extent`.
///
/// Every call to [`Index::new`] or [`Index::named`] creates a distinct index, even if the
/// extents coincide. Clones refer to the same index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Index {
    id: usize,
    extent: usize,
    name: Option<String>,
}

impl Index {
    pub fn new(extent: usize) -> Self {
        Self {
            id: NEXT_INDEX_ID.fetch_add(1, Ordering::Relaxed),
            extent,
            name: None,
        }
    }

    pub fn named(name: impl Into<String>, extent: usize) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new(extent)
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn extent(&self) -> usize {
        self.extent
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "i_{}", self.id),
        }
    }
}

/// One entry of a multi-index.
#[derive(Debug, Clone)]
pub enum IndexItem<T> {
    /// A constant known when the expression is built.
    Fixed(usize),
    /// A free index, bound by whatever loop nest the expression ends up in.
    Free(Index),
    /// An index whose value is only known when the generated code runs,
    /// e.g. a facet number read from a kernel argument.
    Variable(Expr<T>),
}

impl<T> From<usize> for IndexItem<T> {
    fn from(value: usize) -> Self {
        IndexItem::Fixed(value)
    }
}

impl<T> From<Index> for IndexItem<T> {
    fn from(index: Index) -> Self {
        IndexItem::Free(index)
    }
}

impl<T> From<&Index> for IndexItem<T> {
    fn from(index: &Index) -> Self {
        IndexItem::Free(index.clone())
    }
}

impl<T> IndexItem<T> {
    /// The number of values the item can take, if known statically.
    pub fn extent(&self) -> Option<usize> {
        match self {
            IndexItem::Fixed(_) => None,
            IndexItem::Free(index) => Some(index.extent()),
            IndexItem::Variable(_) => None,
        }
    }

    pub fn as_fixed(&self) -> Option<usize> {
        match self {
            IndexItem::Fixed(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_free(&self) -> Option<&Index> {
        match self {
            IndexItem::Free(index) => Some(index),
            _ => None,
        }
    }
}
