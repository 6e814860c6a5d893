//! Symbolic inputs handed to the kernel builder by form processing.
//!
//! Form processing itself (simplification, differentiation, splitting a form into
//! integrals) happens elsewhere. What arrives here is the bare minimum a kernel interface
//! needs: which coefficients and arguments appear, which elements they live in, and how each
//! integral is classified.
use crate::element::FiniteElement;
use eyre::eyre;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

static NEXT_COEFFICIENT_ID: AtomicUsize = AtomicUsize::new(0);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoefficientId(usize);

/// A known function (or constant) appearing in a form.
///
/// Coefficients are compared by identity: two coefficients created separately are different
/// even if they live in the same element. Clones are the same coefficient.
#[derive(Debug, Clone)]
pub struct Coefficient {
    id: CoefficientId,
    element: Arc<FiniteElement>,
}

impl PartialEq for Coefficient {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Coefficient {}

impl Hash for Coefficient {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state)
    }
}

impl Coefficient {
    pub fn new(element: FiniteElement) -> Self {
        Self {
            id: CoefficientId(NEXT_COEFFICIENT_ID.fetch_add(1, Ordering::Relaxed)),
            element: Arc::new(element),
        }
    }

    pub fn id(&self) -> CoefficientId {
        self.id
    }

    pub fn element(&self) -> &FiniteElement {
        &self.element
    }

    pub fn value_shape(&self) -> Vec<usize> {
        self.element.value_shape()
    }

    /// Whether the coefficient is a global constant rather than a field.
    pub fn is_real(&self) -> bool {
        self.element.is_real()
    }
}

/// A trial or test function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    number: usize,
    element: FiniteElement,
}

impl Argument {
    pub fn new(number: usize, element: FiniteElement) -> Self {
        Self { number, element }
    }

    /// Position of the argument in the form: 0 for the test function, 1 for the trial function.
    pub fn number(&self) -> usize {
        self.number
    }

    pub fn element(&self) -> &FiniteElement {
        &self.element
    }
}

/// The side of an interior facet a quantity is evaluated on.
///
/// Quantities on cells and exterior facets are unrestricted, which is expressed as
/// `Option::<Restriction>::None` throughout.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Restriction {
    #[serde(rename = "+")]
    Plus,
    #[serde(rename = "-")]
    Minus,
}

impl Restriction {
    pub const BOTH: [Restriction; 2] = [Restriction::Plus, Restriction::Minus];

    /// Slot of this side in buffers that store both sides, `Plus` first.
    pub fn side(&self) -> usize {
        match self {
            Restriction::Plus => 0,
            Restriction::Minus => 1,
        }
    }
}

impl fmt::Display for Restriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Restriction::Plus => write!(f, "+"),
            Restriction::Minus => write!(f, "-"),
        }
    }
}

/// Where an integral is evaluated.
///
/// The `_vert`, `_top`, `_bottom` and `_horiz` variants arise on extruded (layered) meshes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegralType {
    Cell,
    ExteriorFacet,
    ExteriorFacetVert,
    ExteriorFacetTop,
    ExteriorFacetBottom,
    InteriorFacet,
    InteriorFacetVert,
    InteriorFacetHoriz,
    Vertex,
}

impl IntegralType {
    pub const ALL: [IntegralType; 9] = [
        IntegralType::Cell,
        IntegralType::ExteriorFacet,
        IntegralType::ExteriorFacetVert,
        IntegralType::ExteriorFacetTop,
        IntegralType::ExteriorFacetBottom,
        IntegralType::InteriorFacet,
        IntegralType::InteriorFacetVert,
        IntegralType::InteriorFacetHoriz,
        IntegralType::Vertex,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IntegralType::Cell => "cell",
            IntegralType::ExteriorFacet => "exterior_facet",
            IntegralType::ExteriorFacetVert => "exterior_facet_vert",
            IntegralType::ExteriorFacetTop => "exterior_facet_top",
            IntegralType::ExteriorFacetBottom => "exterior_facet_bottom",
            IntegralType::InteriorFacet => "interior_facet",
            IntegralType::InteriorFacetVert => "interior_facet_vert",
            IntegralType::InteriorFacetHoriz => "interior_facet_horiz",
            IntegralType::Vertex => "vertex",
        }
    }

    /// Whether the integral couples the two cells sharing a facet.
    pub fn is_interior_facet(&self) -> bool {
        self.as_str().starts_with("interior_facet")
    }
}

impl fmt::Display for IntegralType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntegralType {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|integral_type| integral_type.as_str() == s)
            .copied()
            .ok_or_else(|| eyre!("unknown integral type \"{}\"", s))
    }
}

/// The part of the domain an integral is restricted to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubdomainId {
    /// The whole domain.
    Everywhere,
    /// Everywhere not covered by a numbered subdomain.
    Otherwise,
    Id(usize),
}

impl fmt::Display for SubdomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubdomainId::Everywhere => write!(f, "everywhere"),
            SubdomainId::Otherwise => write!(f, "otherwise"),
            SubdomainId::Id(id) => write!(f, "{}", id),
        }
    }
}

/// Per-integral information from form processing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegralData {
    pub integral_type: IntegralType,
    pub subdomain_id: SubdomainId,
    /// Index into the domains of the form the integral came from.
    pub domain_number: usize,
    /// For each entry of [`FormData::reduced_coefficients`], whether this integral needs it.
    pub enabled_coefficients: Vec<bool>,
}

/// Per-form information from form processing.
#[derive(Debug, Clone)]
pub struct FormData {
    /// The distinct coefficients of the form, in a fixed order.
    pub reduced_coefficients: Vec<Coefficient>,
    /// For each reduced coefficient, its position among the coefficients of the original form.
    pub original_coefficient_positions: Vec<usize>,
}

impl FormData {
    /// Form data for a form whose reduced coefficients are exactly its original coefficients.
    pub fn from_coefficients(coefficients: Vec<Coefficient>) -> Self {
        let original_coefficient_positions = (0..coefficients.len()).collect();
        Self {
            reduced_coefficients: coefficients,
            original_coefficient_positions,
        }
    }
}
