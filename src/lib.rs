//! Construction of kernel interfaces for compiled finite element forms.
//!
//! A form compiler lowers each integral of a variational form into a kernel: a function that
//! computes the local contribution of one cell or facet. This crate decides what such a kernel
//! looks like from the outside (its arguments, their C declarations and the layout of the data
//! behind them) and hands the lowering stage tensor expressions for reading and writing that
//! data. See [`kernel::KernelBuilder`] for the entry point.

pub mod element;
pub mod form;
pub mod kernel;
pub mod settings;

#[cfg(feature = "proptest-support")]
pub mod proptest;

pub extern crate fenris_tensor as tensor;
pub extern crate fenris_traits as traits;
