use crate::element::{IndexShape, IndexShapeResolver};
use crate::form::{Argument, Restriction};
use crate::kernel::{ArgDecl, ACCUMULATOR_NAME};
use fenris_tensor::{Expr, FlexibleDim, Index, IndexItem};
use fenris_traits::ScalarType;
use itertools::{izip, Itertools};
use log::trace;

/// Declaration of the accumulator: `double A[n_0]...[n_k]`.
pub fn accumulator_arg<T: ScalarType>(rank: Vec<usize>) -> ArgDecl {
    ArgDecl::new(T::C_TYPE, ACCUMULATOR_NAME).with_rank(rank)
}

/// All combinations of restrictions for `n` arguments.
///
/// The restriction of the first argument varies slowest, i.e. for two arguments the order is
/// `(+, +), (+, -), (-, +), (-, -)`.
pub fn restriction_combinations(n: usize) -> Vec<Vec<Restriction>> {
    if n == 0 {
        return vec![Vec::new()];
    }
    std::iter::repeat(Restriction::BOTH)
        .take(n)
        .multi_cartesian_product()
        .collect()
}

/// Prepares the accumulator argument and the expressions through which the kernel writes
/// into it.
///
/// `indices[k]` is the multi-index of argument `k` and must match the index shape of its
/// element. The accumulator has one dimension per argument, of extent equal to the number of
/// local degrees of freedom of that argument.
///
/// On interior facets each dimension is doubled to hold the degrees of freedom of both
/// cells, and one expression is returned per combination of restrictions (see
/// [`restriction_combinations`] for the order). All expressions alias the same buffer: the
/// side of argument `k` selects the first or second half of dimension `k`.
///
/// With no arguments the kernel computes a single number, and the accumulator has a single
/// entry.
///
/// # Panics
///
/// Panics if the number of multi-indices differs from the number of arguments.
pub fn prepare_arguments<T, R>(
    arguments: &[Argument],
    indices: &[Vec<Index>],
    interior_facet: bool,
    resolver: &R,
) -> eyre::Result<(ArgDecl, Vec<Expr<T>>)>
where
    T: ScalarType,
    R: IndexShapeResolver + ?Sized,
{
    assert_eq!(
        arguments.len(),
        indices.len(),
        "Need exactly one multi-index per argument"
    );

    if arguments.is_empty() {
        let buffer = Expr::variable(ACCUMULATOR_NAME, &[1]);
        let expression = Expr::indexed(&buffer, vec![IndexItem::Fixed(0)]);
        return Ok((accumulator_arg::<T>(vec![1]), vec![expression]));
    }

    let shapes: Vec<IndexShape> = arguments
        .iter()
        .map(|argument| {
            resolver
                .create_element(argument.element())
                .map(|element| element.index_shape().clone())
        })
        .collect::<eyre::Result<_>>()?;

    let sides = if interior_facet { 2 } else { 1 };
    let accumulator_shape: Vec<usize> = shapes.iter().map(|shape| sides * shape.size()).collect();
    trace!("Accumulator {} has shape {:?}", ACCUMULATOR_NAME, accumulator_shape);
    let buffer = Expr::variable(ACCUMULATOR_NAME, &accumulator_shape);

    let argument_terms = |alpha: &[Index], shape: &IndexShape| -> Vec<(IndexItem<T>, usize)> {
        alpha
            .iter()
            .zip(shape.iter())
            .map(|(index, extent)| (IndexItem::Free(index.clone()), *extent))
            .collect()
    };

    let expressions: Vec<Expr<T>> = if interior_facet {
        restriction_combinations(arguments.len())
            .into_iter()
            .map(|restrictions| {
                let dim2idxs = izip!(&restrictions, &shapes, indices)
                    .map(|(restriction, shape, alpha)| {
                        let mut terms = vec![(IndexItem::Fixed(restriction.side()), 2)];
                        terms.extend(argument_terms(alpha.as_slice(), shape));
                        FlexibleDim::new(0, terms)
                    })
                    .collect();
                Expr::flexibly_indexed(&buffer, dim2idxs)
            })
            .collect()
    } else {
        let dim2idxs = shapes
            .iter()
            .zip(indices)
            .map(|(shape, alpha)| FlexibleDim::new(0, argument_terms(alpha.as_slice(), shape)))
            .collect();
        vec![Expr::flexibly_indexed(&buffer, dim2idxs)]
    };

    Ok((accumulator_arg::<T>(accumulator_shape), expressions))
}
