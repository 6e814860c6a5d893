use fenris_kernel::element::{Cell, Family, FiniteElement, StandardElementResolver};
use fenris_kernel::form::{Argument, Restriction};
use fenris_kernel::kernel::{prepare_arguments, restriction_combinations};
use fenris_kernel::tensor::{Evaluator, Expr, Index};
use proptest::prelude::*;
use util::assert_panics;

fn p1_triangle() -> FiniteElement {
    FiniteElement::scalar(Family::Lagrange, Cell::Triangle, 1)
}

fn iota(n: usize) -> Vec<f64> {
    (0..n).map(|i| i as f64).collect()
}

#[test]
fn functional_has_single_entry_accumulator() {
    let (arg, expressions) = prepare_arguments::<f64, _>(&[], &[], false, &StandardElementResolver).unwrap();
    assert_eq!(arg.to_string(), "double A[1]");
    assert_eq!(expressions.len(), 1);

    let data = [42.0];
    let evaluator = Evaluator::new().with_buffer("A", &data);
    assert_eq!(evaluator.evaluate(&expressions[0]).unwrap(), 42.0);

    // Functionals on interior facets still produce a single number
    let (arg, expressions) = prepare_arguments::<f64, _>(&[], &[], true, &StandardElementResolver).unwrap();
    assert_eq!(arg.rank(), &[1]);
    assert_eq!(expressions.len(), 1);
}

#[test]
fn linear_form_indexes_accumulator_directly() {
    let arguments = [Argument::new(0, p1_triangle())];
    let i = Index::new(3);
    let (arg, expressions) =
        prepare_arguments::<f64, _>(&arguments, &[vec![i.clone()]], false, &StandardElementResolver).unwrap();

    assert_eq!(arg.to_string(), "double A[3]");
    assert_eq!(expressions.len(), 1);
    assert_eq!(expressions[0].free_indices(), vec![i.clone()]);

    let data = iota(3);
    for value in 0..3 {
        let evaluator = Evaluator::new().with_buffer("A", &data).with_index(&i, value);
        assert_eq!(evaluator.evaluate(&expressions[0]).unwrap(), value as f64);
    }
}

#[test]
fn bilinear_form_flattens_vector_argument() {
    let vector = FiniteElement::vector(p1_triangle(), 2);
    let arguments = [Argument::new(0, p1_triangle()), Argument::new(1, vector)];
    let (i, j, k) = (Index::new(3), Index::new(3), Index::new(2));
    let indices = [vec![i.clone()], vec![j.clone(), k.clone()]];
    let (arg, expressions) = prepare_arguments::<f64, _>(&arguments, &indices, false, &StandardElementResolver).unwrap();

    assert_eq!(arg.to_string(), "double A[3][6]");
    assert_eq!(expressions.len(), 1);

    let data = iota(18);
    for (a, b, c) in itertools::iproduct!(0..3, 0..3, 0..2) {
        let evaluator = Evaluator::new()
            .with_buffer("A", &data)
            .with_index(&i, a)
            .with_index(&j, b)
            .with_index(&k, c);
        let expected = (a * 6 + b * 2 + c) as f64;
        assert_eq!(evaluator.evaluate(&expressions[0]).unwrap(), expected);
    }
}

#[test]
fn interior_facet_bilinear_form_produces_four_blocks_in_order() {
    let arguments = [Argument::new(0, p1_triangle()), Argument::new(1, p1_triangle())];
    let (i, j) = (Index::new(3), Index::new(3));
    let indices = [vec![i.clone()], vec![j.clone()]];
    let (arg, expressions) = prepare_arguments::<f64, _>(&arguments, &indices, true, &StandardElementResolver).unwrap();

    assert_eq!(arg.to_string(), "double A[6][6]");
    assert_eq!(expressions.len(), 4);

    let data = iota(36);
    let blocks = restriction_combinations(2);
    for (expression, restrictions) in expressions.iter().zip(&blocks) {
        let (r0, r1) = (restrictions[0].side(), restrictions[1].side());
        for (a, b) in itertools::iproduct!(0..3, 0..3) {
            let evaluator = Evaluator::new()
                .with_buffer("A", &data)
                .with_index(&i, a)
                .with_index(&j, b);
            let expected = ((r0 * 3 + a) * 6 + r1 * 3 + b) as f64;
            assert_eq!(evaluator.evaluate(expression).unwrap(), expected);
        }
    }
    assert_eq!(blocks[1], vec![Restriction::Plus, Restriction::Minus]);
}

#[test]
fn interior_facet_blocks_share_one_buffer() {
    let arguments = [Argument::new(0, p1_triangle())];
    let i = Index::new(3);
    let (_, expressions) =
        prepare_arguments::<f64, _>(&arguments, &[vec![i]], true, &StandardElementResolver).unwrap();
    assert_eq!(expressions.len(), 2);

    let buffer = |expression: &Expr<f64>| expression.children()[0].clone();
    assert!(Expr::ptr_eq(&buffer(&expressions[0]), &buffer(&expressions[1])));
}

#[test]
fn mismatched_multi_indices_panic() {
    let arguments = [Argument::new(0, p1_triangle())];
    assert_panics!(prepare_arguments::<f64, _>(&arguments, &[], false, &StandardElementResolver));
}

#[test]
fn unsupported_argument_element_is_an_error() {
    let arguments = [Argument::new(0, FiniteElement::scalar(Family::Q, Cell::Triangle, 1))];
    let result = prepare_arguments::<f64, _>(&arguments, &[vec![Index::new(1)]], false, &StandardElementResolver);
    assert!(result.is_err());
}

proptest! {
    #[test]
    fn restriction_combinations_are_lexicographic(n in 0..=4usize) {
        let combinations = restriction_combinations(n);
        prop_assert_eq!(combinations.len(), 1 << n);
        for (position, combination) in combinations.iter().enumerate() {
            prop_assert_eq!(combination.len(), n);
            // Reading the sides as binary digits, first argument most significant, recovers the position
            let encoded = combination.iter().fold(0, |acc, r| 2 * acc + r.side());
            prop_assert_eq!(encoded, position);
        }
    }
}
