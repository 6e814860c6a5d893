use crate::element::{Cell, Family, FiniteElement, IndexShape};
use ::proptest::collection::vec;
use ::proptest::prelude::*;

pub fn cell() -> impl Strategy<Value = Cell> {
    prop_oneof![
        Just(Cell::Interval),
        Just(Cell::Triangle),
        Just(Cell::Quadrilateral),
        Just(Cell::Tetrahedron),
        Just(Cell::Hexahedron),
    ]
}

/// Scalar elements that the standard resolver accepts.
pub fn scalar_element() -> impl Strategy<Value = FiniteElement> {
    (cell(), any::<bool>(), 0..=3usize).prop_map(|(cell, continuous, degree)| {
        let family = match (cell.is_simplex(), continuous) {
            (true, true) => Family::Lagrange,
            (true, false) => Family::DiscontinuousLagrange,
            (false, true) => Family::Q,
            (false, false) => Family::DQ,
        };
        // Continuous elements start at degree 1
        let degree = if continuous { degree.max(1) } else { degree };
        FiniteElement::scalar(family, cell, degree)
    })
}

/// Scalar, vector and tensor field elements, i.e. everything a single field coefficient can live in.
pub fn field_element() -> impl Strategy<Value = FiniteElement> {
    prop_oneof![
        scalar_element(),
        (scalar_element(), 1..=3usize).prop_map(|(element, dim)| FiniteElement::vector(element, dim)),
        (scalar_element(), vec(1..=3usize, 1..=2))
            .prop_map(|(element, shape)| FiniteElement::tensor(element, shape)),
    ]
}

/// Field elements as well as mixed elements of up to three of them.
pub fn finite_element() -> impl Strategy<Value = FiniteElement> {
    prop_oneof![
        3 => field_element(),
        1 => vec(field_element(), 1..=3).prop_map(FiniteElement::mixed),
    ]
}

pub fn index_shape(max_rank: usize, max_extent: usize) -> impl Strategy<Value = IndexShape> {
    vec(1..=max_extent, 0..=max_rank).prop_map(IndexShape::from)
}
