use crate::{Index, IndexItem};
use std::fmt;
use std::sync::Arc;

/// The extent of a single buffer dimension. `None` means the extent is not known when the
/// expression is built, as for buffers holding a runtime-sized list of constants.
pub type Extent = Option<usize>;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ComparisonOp {
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl ComparisonOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
        }
    }

    pub fn compare<T: PartialOrd>(&self, a: &T, b: &T) -> bool {
        match self {
            Self::Equal => a == b,
            Self::NotEqual => a != b,
            Self::Less => a < b,
            Self::LessEqual => a <= b,
            Self::Greater => a > b,
            Self::GreaterEqual => a >= b,
        }
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Index mapping for one dimension of a flexibly indexed buffer.
///
/// The position along the dimension is `offset` plus the row-major flattening of the
/// terms, where each term is an index together with the extent it runs over. The first term
/// varies slowest.
#[derive(Debug, Clone)]
pub struct FlexibleDim<T> {
    pub offset: usize,
    pub terms: Vec<(IndexItem<T>, usize)>,
}

impl<T> FlexibleDim<T> {
    pub fn new(offset: usize, terms: Vec<(IndexItem<T>, usize)>) -> Self {
        Self { offset, terms }
    }

    /// Number of consecutive positions addressed by the terms.
    pub fn span(&self) -> usize {
        self.terms.iter().map(|(_, extent)| extent).product()
    }
}

#[derive(Debug)]
pub enum Node<T> {
    Variable {
        name: String,
        shape: Vec<Extent>,
    },
    Literal(T),
    Zero,
    /// Indexes every dimension of the child, producing a scalar.
    Indexed {
        child: Expr<T>,
        multiindex: Vec<IndexItem<T>>,
    },
    /// Indexes every dimension of the child with a [`FlexibleDim`] each, producing a scalar.
    FlexiblyIndexed {
        child: Expr<T>,
        dim2idxs: Vec<FlexibleDim<T>>,
    },
    /// Splits dimension `k` of the child into the dimensions `shapes[k]`.
    Reshape {
        child: Expr<T>,
        shapes: Vec<Vec<usize>>,
    },
    /// Fixes the leading dimensions of the child, leaving a view of the remaining ones.
    PartialIndexed {
        child: Expr<T>,
        indices: Vec<IndexItem<T>>,
    },
    Comparison {
        op: ComparisonOp,
        left: Expr<T>,
        right: Expr<T>,
    },
    Conditional {
        condition: Expr<T>,
        then: Expr<T>,
        otherwise: Expr<T>,
    },
    Sum(Expr<T>, Expr<T>),
    Product(Expr<T>, Expr<T>),
}

/// A shared handle to a node in an expression graph.
///
/// Cloning is cheap and yields a handle to the *same* node. Node identity, not structural
/// equality, is what [`Expr::ptr_eq`] and [`Expr::node_id`] report.
pub struct Expr<T>(Arc<Node<T>>);

impl<T> Clone for Expr<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for Expr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<T> Expr<T> {
    fn from_node(node: Node<T>) -> Self {
        Self(Arc::new(node))
    }

    pub fn node(&self) -> &Node<T> {
        &self.0
    }

    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    /// An identifier that is unique among all live nodes.
    pub fn node_id(&self) -> usize {
        Arc::as_ptr(&self.0) as *const u8 as usize
    }

    /// A buffer with statically known extents.
    pub fn variable(name: impl Into<String>, shape: &[usize]) -> Self {
        Self::variable_with_extents(name, shape.iter().copied().map(Some).collect())
    }

    pub fn variable_with_extents(name: impl Into<String>, shape: Vec<Extent>) -> Self {
        Self::from_node(Node::Variable {
            name: name.into(),
            shape,
        })
    }

    pub fn literal(value: T) -> Self {
        Self::from_node(Node::Literal(value))
    }

    pub fn zero() -> Self {
        Self::from_node(Node::Zero)
    }

    /// Indexes every dimension of `child`.
    ///
    /// # Panics
    ///
    /// Panics if the number of indices differs from the rank of `child`.
    pub fn indexed(child: &Self, multiindex: Vec<IndexItem<T>>) -> Self {
        assert_eq!(
            child.rank(),
            multiindex.len(),
            "Multi-index must address every dimension of the indexed expression"
        );
        Self::from_node(Node::Indexed {
            child: child.clone(),
            multiindex,
        })
    }

    /// # Panics
    ///
    /// Panics if the number of dimension mappings differs from the rank of `child`, or if a
    /// mapping addresses positions beyond a statically known extent.
    pub fn flexibly_indexed(child: &Self, dim2idxs: Vec<FlexibleDim<T>>) -> Self {
        let shape = child.shape();
        assert_eq!(
            shape.len(),
            dim2idxs.len(),
            "Flexible indexing must map every dimension of the indexed expression"
        );
        for (extent, dim) in shape.iter().zip(&dim2idxs) {
            if let Some(extent) = extent {
                assert!(
                    dim.offset + dim.span() <= *extent,
                    "Flexible index mapping exceeds dimension extent {}",
                    extent
                );
            }
        }
        Self::from_node(Node::FlexiblyIndexed {
            child: child.clone(),
            dim2idxs,
        })
    }

    /// Reshapes each dimension of `child` into the corresponding entry of `shapes`.
    ///
    /// # Panics
    ///
    /// Panics if `shapes` does not have one entry per dimension of `child`, or if a known
    /// extent does not match the size of its new shape.
    pub fn reshape(child: &Self, shapes: Vec<Vec<usize>>) -> Self {
        let shape = child.shape();
        assert_eq!(shape.len(), shapes.len(), "Reshape needs one shape per dimension");
        for (extent, new_shape) in shape.iter().zip(&shapes) {
            if let Some(extent) = extent {
                assert_eq!(
                    *extent,
                    new_shape.iter().product::<usize>(),
                    "Reshape must preserve the extent of each dimension"
                );
            }
        }
        Self::from_node(Node::Reshape {
            child: child.clone(),
            shapes,
        })
    }

    /// Fixes the leading `indices.len()` dimensions of `child`.
    ///
    /// With no indices this returns `child` itself.
    pub fn partial_indexed(child: &Self, indices: Vec<IndexItem<T>>) -> Self {
        assert!(indices.len() <= child.rank(), "Too many indices for partial indexing");
        if indices.is_empty() {
            return child.clone();
        }
        Self::from_node(Node::PartialIndexed {
            child: child.clone(),
            indices,
        })
    }

    pub fn comparison(op: ComparisonOp, left: &Self, right: &Self) -> Self {
        Self::from_node(Node::Comparison {
            op,
            left: left.clone(),
            right: right.clone(),
        })
    }

    pub fn conditional(condition: &Self, then: &Self, otherwise: &Self) -> Self {
        Self::from_node(Node::Conditional {
            condition: condition.clone(),
            then: then.clone(),
            otherwise: otherwise.clone(),
        })
    }

    pub fn sum(a: &Self, b: &Self) -> Self {
        Self::from_node(Node::Sum(a.clone(), b.clone()))
    }

    pub fn product(a: &Self, b: &Self) -> Self {
        Self::from_node(Node::Product(a.clone(), b.clone()))
    }

    pub fn shape(&self) -> Vec<Extent> {
        match self.node() {
            Node::Variable { shape, .. } => shape.clone(),
            Node::Reshape { shapes, .. } => shapes.iter().flatten().copied().map(Some).collect(),
            Node::PartialIndexed { child, indices } => child.shape()[indices.len()..].to_vec(),
            Node::Conditional { then, .. } => then.shape(),
            Node::Sum(a, _) | Node::Product(a, _) => a.shape(),
            Node::Literal(_)
            | Node::Zero
            | Node::Indexed { .. }
            | Node::FlexiblyIndexed { .. }
            | Node::Comparison { .. } => Vec::new(),
        }
    }

    pub fn rank(&self) -> usize {
        self.shape().len()
    }

    /// Name of the buffer, if this is a variable node.
    pub fn variable_name(&self) -> Option<&str> {
        match self.node() {
            Node::Variable { name, .. } => Some(name),
            _ => None,
        }
    }

    /// The direct operands of this node, including expressions nested in runtime indices.
    pub fn children(&self) -> Vec<Expr<T>> {
        fn index_exprs<T>(items: &[IndexItem<T>]) -> impl Iterator<Item = &Expr<T>> {
            items.iter().filter_map(|item| match item {
                IndexItem::Variable(expr) => Some(expr),
                _ => None,
            })
        }

        match self.node() {
            Node::Variable { .. } | Node::Literal(_) | Node::Zero => Vec::new(),
            Node::Indexed { child, multiindex } => std::iter::once(child)
                .chain(index_exprs(multiindex))
                .cloned()
                .collect(),
            Node::FlexiblyIndexed { child, dim2idxs } => {
                let mut children = vec![child.clone()];
                for dim in dim2idxs {
                    for (item, _) in &dim.terms {
                        if let IndexItem::Variable(expr) = item {
                            children.push(expr.clone());
                        }
                    }
                }
                children
            }
            Node::Reshape { child, .. } => vec![child.clone()],
            Node::PartialIndexed { child, indices } => std::iter::once(child)
                .chain(index_exprs(indices))
                .cloned()
                .collect(),
            Node::Comparison { left, right, .. } => vec![left.clone(), right.clone()],
            Node::Conditional {
                condition,
                then,
                otherwise,
            } => vec![condition.clone(), then.clone(), otherwise.clone()],
            Node::Sum(a, b) | Node::Product(a, b) => vec![a.clone(), b.clone()],
        }
    }

    /// Free indices of an indexed expression, in order of first appearance.
    pub fn free_indices(&self) -> Vec<Index> {
        let mut free = Vec::new();
        let mut push = |item: &IndexItem<T>| {
            if let IndexItem::Free(index) = item {
                if !free.contains(index) {
                    free.push(index.clone());
                }
            }
        };
        match self.node() {
            Node::Indexed { multiindex, .. } => multiindex.iter().for_each(&mut push),
            Node::FlexiblyIndexed { dim2idxs, .. } => dim2idxs
                .iter()
                .flat_map(|dim| dim.terms.iter().map(|(item, _)| item))
                .for_each(&mut push),
            _ => {}
        }
        free
    }
}

/// A runtime index reading the scalar `expr`, typically a single entry of an integer buffer.
pub fn variable_index<T>(expr: Expr<T>) -> IndexItem<T> {
    IndexItem::Variable(expr)
}
