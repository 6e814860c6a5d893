use fenris_tensor::traversal::{traversal, DagNode};
use fenris_tensor::Expr;
use std::collections::HashMap;
use std::rc::Rc;

/// A graph given as adjacency lists, so that cycles can actually be expressed.
#[derive(Clone)]
struct GraphNode {
    id: usize,
    edges: Rc<HashMap<usize, Vec<usize>>>,
}

impl DagNode for GraphNode {
    type Key = usize;

    fn key(&self) -> usize {
        self.id
    }

    fn children(&self) -> Vec<Self> {
        self.edges
            .get(&self.id)
            .into_iter()
            .flatten()
            .map(|&id| GraphNode {
                id,
                edges: self.edges.clone(),
            })
            .collect()
    }
}

fn graph(edges: Vec<(usize, Vec<usize>)>) -> Rc<HashMap<usize, Vec<usize>>> {
    Rc::new(edges.into_iter().collect())
}

fn node(id: usize, edges: &Rc<HashMap<usize, Vec<usize>>>) -> GraphNode {
    GraphNode {
        id,
        edges: edges.clone(),
    }
}

#[test]
fn shared_nodes_are_visited_once() {
    let x = Expr::<f64>::variable("x", &[]);
    let xx = Expr::product(&x, &x);
    let root = Expr::sum(&xx, &xx);

    let nodes = traversal([root.clone()]).unwrap();
    assert_eq!(nodes.len(), 3);
    // Children come before their parents
    assert!(Expr::ptr_eq(&nodes[0], &x));
    assert!(Expr::ptr_eq(&nodes[1], &xx));
    assert!(Expr::ptr_eq(&nodes[2], &root));
}

#[test]
fn multiple_roots_share_visited_set() {
    let x = Expr::<f64>::variable("x", &[]);
    let a = Expr::sum(&x, &x);
    let b = Expr::product(&x, &a);
    let nodes = traversal([a.clone(), b.clone(), a]).unwrap();
    assert_eq!(nodes.len(), 3);
}

#[test]
fn diamond_is_not_a_cycle() {
    let edges = graph(vec![(0, vec![1, 2]), (1, vec![3]), (2, vec![3]), (3, vec![])]);
    let order: Vec<usize> = traversal([node(0, &edges)])
        .unwrap()
        .iter()
        .map(|n| n.id)
        .collect();
    assert_eq!(order.len(), 4);
    assert_eq!(order.last(), Some(&0));
    let position = |id| order.iter().position(|&n| n == id).unwrap();
    assert!(position(3) < position(1));
    assert!(position(3) < position(2));
}

#[test]
fn cycle_is_reported() {
    let edges = graph(vec![(0, vec![1]), (1, vec![2]), (2, vec![0])]);
    let err = traversal([node(0, &edges)]).err().expect("cycle must be detected");
    assert!([0, 1, 2].contains(err.node()));
    assert!(err.to_string().contains("cycle"));
}

#[test]
fn self_loop_is_reported() {
    let edges = graph(vec![(0, vec![1]), (1, vec![1])]);
    let err = traversal([node(0, &edges)]).err().unwrap();
    assert_eq!(*err.node(), 1);
}

#[test]
fn deep_chains_do_not_overflow_the_stack() {
    let mut expr = Expr::<f64>::literal(1.0);
    for _ in 0..100_000 {
        expr = Expr::sum(&expr, &Expr::zero());
    }
    let mut nodes = traversal([expr]).unwrap();
    assert_eq!(nodes.len(), 1 + 2 * 100_000);
    // Release parents before children, otherwise dropping the chain itself recurses
    while nodes.pop().is_some() {}
}
