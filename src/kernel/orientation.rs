use crate::form::Restriction;
use crate::kernel::{ArgDecl, Qualifier, CELL_ORIENTATIONS_NAME};
use fenris_tensor::traversal::{traversal, CycleError};
use fenris_tensor::{ComparisonOp, Expr, IndexItem};
use fenris_traits::ScalarType;
use numeric_literals::replace_float_literals;

/// Declaration of the cell orientations argument: `const int *restrict *restrict cell_orientations`.
pub fn cell_orientations_arg() -> ArgDecl {
    ArgDecl::new("int", CELL_ORIENTATIONS_NAME)
        .with_pointer(vec![Qualifier::Restrict])
        .with_pointer(vec![Qualifier::Restrict])
        .with_qualifier(Qualifier::Const)
}

/// The cell orientations buffer, holding one orientation code per cell.
pub fn cell_orientations_variable<T>(interior_facet: bool) -> Expr<T> {
    let cells = if interior_facet { 2 } else { 1 };
    Expr::variable(CELL_ORIENTATIONS_NAME, &[cells, 1])
}

/// The orientation sign of a cell, read from `cell_orientations`.
///
/// Code 1 maps to -1 and code 0 maps to 1. Any other code means the buffer is corrupt, and the
/// expression evaluates to NaN so that the corruption propagates into the kernel output
/// instead of producing a plausible but wrong result.
#[replace_float_literals(T::from_literal(literal))]
pub fn cell_orientation_expression<T: ScalarType>(
    cell_orientations: &Expr<T>,
    restriction: Option<Restriction>,
) -> Expr<T> {
    let slot = restriction.map(|r| r.side()).unwrap_or(0);
    let code = Expr::indexed(cell_orientations, vec![IndexItem::Fixed(slot), IndexItem::Fixed(0)]);
    let is_one = Expr::comparison(ComparisonOp::Equal, &code, &Expr::literal(1.0));
    let is_zero = Expr::comparison(ComparisonOp::Equal, &code, &Expr::zero());
    let nan = Expr::literal(T::from_literal(f64::NAN));
    let zero_or_invalid = Expr::conditional(&is_zero, &Expr::literal(1.0), &nan);
    Expr::conditional(&is_one, &Expr::literal(-1.0), &zero_or_invalid)
}

/// Whether any of the expressions reads the cell orientations buffer.
///
/// Every distinct node is inspected once, however often it is shared.
pub fn needs_cell_orientations<'a, T: 'a>(
    roots: impl IntoIterator<Item = &'a Expr<T>>,
) -> Result<bool, CycleError<usize>> {
    let nodes = traversal(roots.into_iter().cloned())?;
    Ok(nodes
        .iter()
        .any(|node| node.variable_name() == Some(CELL_ORIENTATIONS_NAME)))
}
