use fenris_tensor::{ComparisonOp, Evaluator, Expr, FlexibleDim, Index, IndexItem};
use proptest::prelude::*;

#[test]
fn indexed_variable_reads_row_major_entry() {
    let data: Vec<f64> = (0..12).map(|x| x as f64).collect();
    let a = Expr::variable("A", &[3, 4]);
    let entry = Expr::indexed(&a, vec![IndexItem::Fixed(2), IndexItem::Fixed(1)]);
    let value = Evaluator::new().with_buffer("A", &data).evaluate(&entry).unwrap();
    assert_eq!(value, 9.0);
}

#[test]
fn free_indices_must_be_bound() {
    let data = [1.0, 2.0];
    let a = Expr::variable("A", &[2]);
    let i = Index::new(2);
    let entry = Expr::indexed(&a, vec![i.clone().into()]);

    let evaluator = Evaluator::new().with_buffer("A", &data);
    assert!(evaluator.evaluate(&entry).is_err());
    assert_eq!(evaluator.with_index(&i, 1).evaluate(&entry).unwrap(), 2.0);
}

#[test]
fn reshape_then_index_addresses_flat_buffer() {
    // A (2 x 3) buffer viewed as (2, 1) x (3)
    let data: Vec<f64> = (0..6).map(|x| x as f64).collect();
    let w = Expr::variable("w", &[2, 3]);
    let view = Expr::reshape(&w, vec![vec![2, 1], vec![3]]);
    let entry = Expr::indexed(
        &view,
        vec![IndexItem::Fixed(1), IndexItem::Fixed(0), IndexItem::Fixed(2)],
    );
    let value = Evaluator::new().with_buffer("w", &data).evaluate(&entry).unwrap();
    assert_eq!(value, 5.0);
}

#[test]
fn partial_indexing_prepends_leading_indices() {
    let data: Vec<f64> = (0..6).map(|x| x as f64).collect();
    let w = Expr::variable("w", &[6, 1]);
    let view = Expr::reshape(&w, vec![vec![2, 3], vec![1]]);
    let minus_side = Expr::partial_indexed(&view, vec![IndexItem::Fixed(1)]);
    let entry = Expr::indexed(&minus_side, vec![IndexItem::Fixed(0), IndexItem::Fixed(0)]);
    let value = Evaluator::new().with_buffer("w", &data).evaluate(&entry).unwrap();
    assert_eq!(value, 3.0);
}

#[test]
fn runtime_index_reads_buffer() {
    let facet = [2.0];
    let table = [10.0, 20.0, 30.0];
    let facet_entry = Expr::indexed(&Expr::variable("facet", &[1]), vec![IndexItem::Fixed(0)]);
    let lookup = Expr::indexed(&Expr::variable("table", &[3]), vec![IndexItem::Variable(facet_entry)]);
    let value = Evaluator::new()
        .with_buffer("facet", &facet)
        .with_buffer("table", &table)
        .evaluate(&lookup)
        .unwrap();
    assert_eq!(value, 30.0);
}

#[test]
fn runtime_index_must_be_integral() {
    let facet = [0.5];
    let table = [10.0, 20.0];
    let facet_entry = Expr::indexed(&Expr::variable("facet", &[1]), vec![IndexItem::Fixed(0)]);
    let lookup = Expr::indexed(&Expr::variable("table", &[2]), vec![IndexItem::Variable(facet_entry)]);
    let evaluator = Evaluator::new()
        .with_buffer("facet", &facet)
        .with_buffer("table", &table);
    assert!(evaluator.evaluate(&lookup).is_err());
}

#[test]
fn conditional_selects_branch() {
    let code = [1.0];
    let c = Expr::indexed(&Expr::variable("c", &[1]), vec![IndexItem::Fixed(0)]);
    let is_one = Expr::comparison(ComparisonOp::Equal, &c, &Expr::literal(1.0));
    let expr = Expr::conditional(&is_one, &Expr::literal(-1.0), &Expr::literal(1.0));
    let evaluator = Evaluator::new().with_buffer("c", &code);
    assert_eq!(evaluator.evaluate(&expr).unwrap(), -1.0);
    assert!(evaluator.evaluate(&is_one).is_err());
    assert!(evaluator.evaluate_condition(&is_one).unwrap());
}

#[test]
fn unbound_buffer_is_an_error() {
    let entry = Expr::indexed(&Expr::<f64>::variable("A", &[1]), vec![IndexItem::Fixed(0)]);
    assert!(Evaluator::new().evaluate(&entry).is_err());
}

proptest! {
    #[test]
    fn flexible_indexing_matches_mixed_radix_position(
        extents in prop::collection::vec(1usize..4, 1..4),
        seed in any::<u64>(),
    ) {
        let total: usize = extents.iter().product();
        let data: Vec<f64> = (0..total).map(|x| x as f64).collect();
        let indices: Vec<Index> = extents.iter().map(|&n| Index::new(n)).collect();
        let a = Expr::variable("A", &[total]);
        let terms: Vec<(IndexItem<f64>, usize)> = indices.iter().zip(&extents).map(|(i, &n)| (i.into(), n)).collect();
        let expr = Expr::flexibly_indexed(&a, vec![FlexibleDim::new(0, terms)]);

        // Derive index values from the seed, last index fastest
        let mut remaining = seed as usize % total;
        let mut values = vec![0; extents.len()];
        for k in (0..extents.len()).rev() {
            values[k] = remaining % extents[k];
            remaining /= extents[k];
        }
        let mut evaluator = Evaluator::new().with_buffer("A", &data);
        for (index, value) in indices.iter().zip(&values) {
            evaluator.bind_index(index, *value);
        }
        let expected = values.iter().zip(&extents).fold(0, |acc, (v, n)| acc * n + v);
        prop_assert_eq!(evaluator.evaluate(&expr).unwrap(), expected as f64);
    }
}
