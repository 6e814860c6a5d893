use crate::{Expr, Extent, Index, IndexItem, Node};
use eyre::{eyre, WrapErr};
use fenris_traits::Real;
use rustc_hash::FxHashMap;

/// Reference evaluator for scalar-valued expressions.
///
/// Buffers are bound by name to flat, row-major data and free indices are bound to concrete
/// values. This is not meant to be fast: it exists so that the meaning of an expression, and in
/// particular the buffer position it addresses, can be checked without generating code.
#[derive(Debug, Clone)]
pub struct Evaluator<'a, T> {
    buffers: FxHashMap<String, &'a [T]>,
    indices: FxHashMap<Index, usize>,
}

impl<'a, T> Default for Evaluator<'a, T> {
    fn default() -> Self {
        Self {
            buffers: FxHashMap::default(),
            indices: FxHashMap::default(),
        }
    }
}

impl<'a, T: Real> Evaluator<'a, T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_buffer(mut self, name: impl Into<String>, data: &'a [T]) -> Self {
        self.bind_buffer(name, data);
        self
    }

    pub fn with_index(mut self, index: &Index, value: usize) -> Self {
        self.bind_index(index, value);
        self
    }

    pub fn bind_buffer(&mut self, name: impl Into<String>, data: &'a [T]) {
        self.buffers.insert(name.into(), data);
    }

    pub fn bind_index(&mut self, index: &Index, value: usize) {
        self.indices.insert(index.clone(), value);
    }

    /// Evaluates a scalar-valued expression.
    pub fn evaluate(&self, expr: &Expr<T>) -> eyre::Result<T> {
        match expr.node() {
            Node::Literal(value) => Ok(*value),
            Node::Zero => Ok(T::zero()),
            Node::Sum(a, b) => Ok(self.evaluate(a)? + self.evaluate(b)?),
            Node::Product(a, b) => Ok(self.evaluate(a)? * self.evaluate(b)?),
            Node::Conditional {
                condition,
                then,
                otherwise,
            } => {
                if self.evaluate_condition(condition)? {
                    self.evaluate(then)
                } else {
                    self.evaluate(otherwise)
                }
            }
            Node::Indexed { child, multiindex } => {
                let multiindex = multiindex
                    .iter()
                    .map(|item| self.resolve_index(item))
                    .collect::<eyre::Result<Vec<_>>>()?;
                self.element(child, &multiindex)
            }
            Node::FlexiblyIndexed { child, dim2idxs } => {
                let mut multiindex = Vec::with_capacity(dim2idxs.len());
                for dim in dim2idxs {
                    let mut position = 0;
                    for (item, extent) in &dim.terms {
                        let value = self.resolve_index(item)?;
                        if value >= *extent {
                            return Err(eyre!("index value {} out of bounds for extent {}", value, extent));
                        }
                        position = position * extent + value;
                    }
                    multiindex.push(dim.offset + position);
                }
                self.element(child, &multiindex)
            }
            Node::Comparison { .. } => Err(eyre!("comparisons do not evaluate to a scalar value")),
            Node::Variable { .. } | Node::Reshape { .. } | Node::PartialIndexed { .. } => {
                if expr.rank() == 0 {
                    self.element(expr, &[])
                } else {
                    Err(eyre!("cannot evaluate expression of rank {} to a scalar", expr.rank()))
                }
            }
        }
    }

    /// Evaluates a comparison.
    pub fn evaluate_condition(&self, expr: &Expr<T>) -> eyre::Result<bool> {
        match expr.node() {
            Node::Comparison { op, left, right } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                Ok(op.compare(&left, &right))
            }
            _ => Err(eyre!("expected a comparison as condition")),
        }
    }

    /// Evaluates an index item to a concrete value.
    pub fn resolve_index(&self, item: &IndexItem<T>) -> eyre::Result<usize> {
        match item {
            IndexItem::Fixed(value) => Ok(*value),
            IndexItem::Free(index) => {
                let value = *self
                    .indices
                    .get(index)
                    .ok_or_else(|| eyre!("free index {} is not bound", index))?;
                if value >= index.extent() {
                    return Err(eyre!("value {} out of bounds for index {}", value, index));
                }
                Ok(value)
            }
            IndexItem::Variable(expr) => {
                let value: f64 = self
                    .evaluate(expr)
                    .wrap_err("failed to evaluate runtime index")?
                    .to_subset()
                    .ok_or_else(|| eyre!("runtime index is not representable as f64"))?;
                if value < 0.0 || value.fract() != 0.0 {
                    return Err(eyre!("runtime index {} is not a non-negative integer", value));
                }
                Ok(value as usize)
            }
        }
    }

    /// Looks up the entry at `multiindex` of a (possibly reshaped or partially indexed) buffer.
    fn element(&self, expr: &Expr<T>, multiindex: &[usize]) -> eyre::Result<T> {
        match expr.node() {
            Node::Variable { name, shape } => {
                let data = self
                    .buffers
                    .get(name)
                    .ok_or_else(|| eyre!("buffer {} is not bound", name))?;
                let position = flatten_index(shape, multiindex).wrap_err_with(|| format!("in buffer {}", name))?;
                data.get(position)
                    .copied()
                    .ok_or_else(|| eyre!("position {} out of bounds for buffer {}", position, name))
            }
            Node::Reshape { child, shapes } => {
                let total_rank: usize = shapes.iter().map(Vec::len).sum();
                if total_rank != multiindex.len() {
                    return Err(eyre!("multi-index does not match rank of reshaped expression"));
                }
                let mut remaining = multiindex;
                let mut child_index = Vec::with_capacity(shapes.len());
                for shape in shapes {
                    let (group, rest) = remaining.split_at(shape.len());
                    let extents: Vec<Extent> = shape.iter().copied().map(Some).collect();
                    child_index.push(flatten_index(&extents, group)?);
                    remaining = rest;
                }
                self.element(child, &child_index)
            }
            Node::PartialIndexed { child, indices } => {
                let mut child_index = indices
                    .iter()
                    .map(|item| self.resolve_index(item))
                    .collect::<eyre::Result<Vec<_>>>()?;
                child_index.extend_from_slice(multiindex);
                self.element(child, &child_index)
            }
            _ if multiindex.is_empty() => self.evaluate(expr),
            _ => Err(eyre!("expression cannot be indexed")),
        }
    }
}

/// Row-major position of `multiindex` in a buffer of the given shape.
///
/// Only the leading extent may be unknown.
fn flatten_index(shape: &[Extent], multiindex: &[usize]) -> eyre::Result<usize> {
    if shape.len() != multiindex.len() {
        return Err(eyre!(
            "multi-index of length {} does not match rank {}",
            multiindex.len(),
            shape.len()
        ));
    }
    let mut position = 0;
    for (k, (extent, value)) in shape.iter().zip(multiindex).enumerate() {
        match extent {
            Some(extent) if value >= extent => {
                return Err(eyre!("index {} out of bounds for extent {}", value, extent));
            }
            Some(extent) => position = position * extent + value,
            None if k == 0 => position = *value,
            None => return Err(eyre!("only the leading extent of a buffer may be unknown")),
        }
    }
    Ok(position)
}
