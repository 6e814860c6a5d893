//! Kernel interfaces.
//!
//! A kernel evaluates the local contribution of one integral on one cell (or facet). Its
//! positional arguments are, in this order:
//!
//! 1. the accumulator `A` the contribution is added to,
//! 2. the coordinate field of the cell(s),
//! 3. `cell_orientations`, only if the kernel needs them,
//! 4. the coefficients `w_0`, `w_1`, ... in binding order,
//! 5. `facet`, only for integral types whose facet numbers are read at runtime.
//!
//! The assembly loop calling a kernel relies on this order and on the argument names, so
//! neither may change. [`KernelBuilder`] produces the argument declarations together with
//! the tensor expressions through which the kernel body reads and writes them.

mod arguments;
mod body;
mod builder;
mod coefficients;
mod declaration;
mod descriptor;
mod orientation;

pub use arguments::*;
pub use body::*;
pub use builder::*;
pub use coefficients::*;
pub use declaration::*;
pub use descriptor::*;
pub use orientation::*;

/// Name of the accumulator argument.
pub const ACCUMULATOR_NAME: &str = "A";

/// Name of the cell orientations argument.
pub const CELL_ORIENTATIONS_NAME: &str = "cell_orientations";

/// Name of the facet number argument.
pub const FACET_NAME: &str = "facet";

/// Name of the `i`-th coefficient argument.
pub fn coefficient_name(i: usize) -> String {
    format!("w_{}", i)
}
