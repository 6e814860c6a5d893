//! Finite element descriptions and the shapes of their local degree-of-freedom index spaces.
//!
//! A [`FiniteElement`] is a purely symbolic description (family, cell, degree and how elements
//! are combined). Kernels never need basis functions, only the *index shape* of an element:
//! the extents of the multi-index that enumerates its local degrees of freedom. Turning a
//! description into an [`ElementShape`] is the job of an [`IndexShapeResolver`].
use eyre::eyre;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cell {
    Interval,
    Triangle,
    Quadrilateral,
    Tetrahedron,
    Hexahedron,
}

impl Cell {
    pub fn topological_dimension(&self) -> usize {
        match self {
            Cell::Interval => 1,
            Cell::Triangle | Cell::Quadrilateral => 2,
            Cell::Tetrahedron | Cell::Hexahedron => 3,
        }
    }

    pub fn is_simplex(&self) -> bool {
        matches!(self, Cell::Interval | Cell::Triangle | Cell::Tetrahedron)
    }

    /// Whether the cell is a tensor product of intervals.
    pub fn is_tensor_product(&self) -> bool {
        matches!(self, Cell::Interval | Cell::Quadrilateral | Cell::Hexahedron)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Cell::Interval => "interval",
            Cell::Triangle => "triangle",
            Cell::Quadrilateral => "quadrilateral",
            Cell::Tetrahedron => "tetrahedron",
            Cell::Hexahedron => "hexahedron",
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Family {
    /// Continuous Lagrange on simplices.
    #[serde(rename = "P")]
    Lagrange,
    /// Discontinuous Lagrange on simplices.
    #[serde(rename = "DP")]
    DiscontinuousLagrange,
    /// Continuous tensor-product Lagrange.
    Q,
    /// Discontinuous tensor-product Lagrange.
    DQ,
    /// Global constants, one value per component on the whole domain.
    Real,
}

impl Family {
    pub fn as_str(&self) -> &'static str {
        match self {
            Family::Lagrange => "P",
            Family::DiscontinuousLagrange => "DP",
            Family::Q => "Q",
            Family::DQ => "DQ",
            Family::Real => "Real",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Symbolic description of a finite element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FiniteElement {
    Scalar {
        family: Family,
        cell: Cell,
        degree: usize,
    },
    /// `dim` copies of `sub_element`, one per vector component.
    Vector {
        sub_element: Box<FiniteElement>,
        dim: usize,
    },
    /// One copy of `sub_element` per entry of a tensor of the given shape.
    Tensor {
        sub_element: Box<FiniteElement>,
        shape: Vec<usize>,
    },
    /// A concatenation of unrelated elements, e.g. a velocity-pressure pair.
    Mixed(Vec<FiniteElement>),
    /// A tensor product of elements, e.g. on the cells of an extruded mesh.
    TensorProduct(Vec<FiniteElement>),
}

impl FiniteElement {
    pub fn scalar(family: Family, cell: Cell, degree: usize) -> Self {
        FiniteElement::Scalar { family, cell, degree }
    }

    pub fn vector(sub_element: FiniteElement, dim: usize) -> Self {
        FiniteElement::Vector {
            sub_element: Box::new(sub_element),
            dim,
        }
    }

    pub fn tensor(sub_element: FiniteElement, shape: Vec<usize>) -> Self {
        FiniteElement::Tensor {
            sub_element: Box::new(sub_element),
            shape,
        }
    }

    pub fn mixed(sub_elements: Vec<FiniteElement>) -> Self {
        FiniteElement::Mixed(sub_elements)
    }

    pub fn tensor_product(factors: Vec<FiniteElement>) -> Self {
        FiniteElement::TensorProduct(factors)
    }

    /// The family shared by all components, if there is a single one.
    ///
    /// Vector and tensor elements report the family of their sub-element. Mixed and
    /// tensor-product elements have no family.
    pub fn family(&self) -> Option<Family> {
        match self {
            FiniteElement::Scalar { family, .. } => Some(*family),
            FiniteElement::Vector { sub_element, .. } | FiniteElement::Tensor { sub_element, .. } => {
                sub_element.family()
            }
            FiniteElement::Mixed(_) | FiniteElement::TensorProduct(_) => None,
        }
    }

    pub fn is_real(&self) -> bool {
        self.family() == Some(Family::Real)
    }

    pub fn is_mixed(&self) -> bool {
        matches!(self, FiniteElement::Mixed(_))
    }

    /// Sub-elements of a mixed element. Empty for any other element.
    pub fn sub_elements(&self) -> &[FiniteElement] {
        match self {
            FiniteElement::Mixed(sub_elements) => sub_elements,
            _ => &[],
        }
    }

    /// Shape of the values of a function in the space spanned by this element.
    pub fn value_shape(&self) -> Vec<usize> {
        match self {
            FiniteElement::Scalar { .. } => Vec::new(),
            FiniteElement::Vector { sub_element, dim } => {
                let mut shape = vec![*dim];
                shape.extend(sub_element.value_shape());
                shape
            }
            FiniteElement::Tensor { sub_element, shape } => {
                let mut shape = shape.clone();
                shape.extend(sub_element.value_shape());
                shape
            }
            FiniteElement::Mixed(sub_elements) => {
                vec![sub_elements.iter().map(|e| e.value_size()).sum()]
            }
            FiniteElement::TensorProduct(factors) => factors.iter().flat_map(|e| e.value_shape()).collect(),
        }
    }

    pub fn value_size(&self) -> usize {
        self.value_shape().iter().product()
    }
}

/// Extents of a multi-index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexShape(pub Vec<usize>);

impl IndexShape {
    pub fn scalar() -> Self {
        Self(Vec::new())
    }

    pub fn rank(&self) -> usize {
        self.0.len()
    }

    /// The number of multi-indices, i.e. the product of the extents.
    pub fn size(&self) -> usize {
        self.0.iter().product()
    }

    pub fn concat(&self, other: &IndexShape) -> IndexShape {
        IndexShape(self.0.iter().chain(&other.0).copied().collect())
    }
}

impl Deref for IndexShape {
    type Target = [usize];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<usize>> for IndexShape {
    fn from(shape: Vec<usize>) -> Self {
        Self(shape)
    }
}

impl<const N: usize> From<[usize; N]> for IndexShape {
    fn from(shape: [usize; N]) -> Self {
        Self(shape.to_vec())
    }
}

impl fmt::Display for IndexShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (k, extent) in self.0.iter().enumerate() {
            if k > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", extent)?;
        }
        write!(f, ")")
    }
}

/// The index shape of an element, optionally split into a scalar part and a tensor part.
///
/// Vector and tensor elements are products of a scalar base element with a component space.
/// Their index shape is the base element's shape followed by the component shape, and the
/// split is recorded so that coefficient buffers can be laid out as
/// `(scalar dofs) x (components)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementShape {
    index_shape: IndexShape,
    base_shape: Option<IndexShape>,
}

impl ElementShape {
    pub fn new(index_shape: impl Into<IndexShape>) -> Self {
        Self {
            index_shape: index_shape.into(),
            base_shape: None,
        }
    }

    /// # Panics
    ///
    /// Panics if `base_shape` is not a prefix of `index_shape`.
    pub fn with_base_shape(index_shape: impl Into<IndexShape>, base_shape: impl Into<IndexShape>) -> Self {
        let index_shape = index_shape.into();
        let base_shape = base_shape.into();
        assert!(
            index_shape.starts_with(&base_shape),
            "Base shape {} must be a prefix of index shape {}",
            base_shape,
            index_shape
        );
        Self {
            index_shape,
            base_shape: Some(base_shape),
        }
    }

    pub fn index_shape(&self) -> &IndexShape {
        &self.index_shape
    }

    pub fn base_shape(&self) -> Option<&IndexShape> {
        self.base_shape.as_ref()
    }

    /// Splits the index shape into its scalar and tensor parts.
    ///
    /// Elements without a base element are entirely scalar, with an empty tensor shape.
    pub fn scalar_and_tensor_shape(&self) -> (IndexShape, IndexShape) {
        match &self.base_shape {
            Some(base) => (base.clone(), IndexShape(self.index_shape[base.rank()..].to_vec())),
            None => (self.index_shape.clone(), IndexShape::scalar()),
        }
    }

    /// Total number of local degrees of freedom.
    pub fn local_size(&self) -> usize {
        self.index_shape.size()
    }
}

/// Determines the index shape of a finite element.
pub trait IndexShapeResolver {
    fn create_element(&self, element: &FiniteElement) -> eyre::Result<ElementShape>;
}

impl<R> IndexShapeResolver for &R
where
    R: IndexShapeResolver + ?Sized,
{
    fn create_element(&self, element: &FiniteElement) -> eyre::Result<ElementShape> {
        (**self).create_element(element)
    }
}

/// Index shapes of the Lagrange-type element families.
///
/// Simplex Lagrange elements of degree $k$ on a $d$-dimensional cell have
/// $\binom{k + d}{d}$ degrees of freedom (3 for a linear triangle, 20 for a cubic tetrahedron),
/// tensor-product elements have $(k + 1)^d$ (4 for a bilinear quadrilateral, 27 for a
/// triquadratic hexahedron). `Real` elements have a single degree of freedom.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct StandardElementResolver;

impl StandardElementResolver {
    fn scalar_dof_count(family: Family, cell: Cell, degree: usize) -> eyre::Result<usize> {
        let d = cell.topological_dimension();
        match family {
            Family::Real => Ok(1),
            Family::Lagrange | Family::DiscontinuousLagrange if !cell.is_simplex() => {
                Err(eyre!("{} elements are not defined on {} cells", family, cell))
            }
            Family::Q | Family::DQ if !cell.is_tensor_product() => {
                Err(eyre!("{} elements are not defined on {} cells", family, cell))
            }
            Family::Lagrange | Family::Q if degree == 0 => {
                Err(eyre!("continuous {} elements require degree at least 1", family))
            }
            Family::Lagrange | Family::DiscontinuousLagrange => Ok(binomial(degree + d, d)),
            Family::Q | Family::DQ => Ok((degree + 1).pow(d as u32)),
        }
    }

    fn component_element(&self, sub_element: &FiniteElement, component_shape: &[usize]) -> eyre::Result<ElementShape> {
        let sub = self.create_element(sub_element)?;
        let (scalar_shape, tensor_shape) = sub.scalar_and_tensor_shape();
        // Components vary slower than the components of the sub-element, as in the value shape
        let index_shape = scalar_shape
            .concat(&IndexShape(component_shape.to_vec()))
            .concat(&tensor_shape);
        Ok(ElementShape::with_base_shape(index_shape, scalar_shape))
    }
}

impl IndexShapeResolver for StandardElementResolver {
    fn create_element(&self, element: &FiniteElement) -> eyre::Result<ElementShape> {
        match element {
            FiniteElement::Scalar { family, cell, degree } => {
                Ok(ElementShape::new([Self::scalar_dof_count(*family, *cell, *degree)?]))
            }
            FiniteElement::Vector { sub_element, dim } => self.component_element(sub_element, &[*dim]),
            FiniteElement::Tensor { sub_element, shape } => self.component_element(sub_element, shape),
            FiniteElement::Mixed(sub_elements) => {
                if sub_elements.is_empty() {
                    return Err(eyre!("mixed element has no sub-elements"));
                }
                let mut size = 0;
                for sub_element in sub_elements {
                    size += self.create_element(sub_element)?.local_size();
                }
                Ok(ElementShape::new([size]))
            }
            FiniteElement::TensorProduct(factors) => {
                if factors.is_empty() {
                    return Err(eyre!("tensor product element has no factors"));
                }
                let mut index_shape = IndexShape::scalar();
                for factor in factors {
                    index_shape = index_shape.concat(self.create_element(factor)?.index_shape());
                }
                Ok(ElementShape::new(index_shape))
            }
        }
    }
}

fn binomial(n: usize, k: usize) -> usize {
    // Each partial product is itself a binomial coefficient, so the division is exact
    (0..k).fold(1, |acc, i| acc * (n - i) / (i + 1))
}
