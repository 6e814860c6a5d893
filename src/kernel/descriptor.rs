use crate::form::{IntegralType, SubdomainId};
use crate::kernel::{needs_cell_orientations, FunctionDecl};
use fenris_tensor::traversal::CycleError;

/// A compiled kernel together with what the assembly loop needs to know to call it.
#[derive(Debug, Clone)]
pub struct Kernel<T> {
    pub(crate) ast: FunctionDecl<T>,
    pub(crate) integral_type: IntegralType,
    pub(crate) oriented: bool,
    pub(crate) subdomain_id: SubdomainId,
    pub(crate) domain_number: usize,
    pub(crate) coefficient_numbers: Vec<usize>,
    pub(crate) coefficient_arity: Vec<usize>,
}

impl<T> Kernel<T> {
    /// The kernel function: signature and body.
    pub fn ast(&self) -> &FunctionDecl<T> {
        &self.ast
    }

    pub fn name(&self) -> &str {
        self.ast.name()
    }

    pub fn integral_type(&self) -> IntegralType {
        self.integral_type
    }

    /// Whether the kernel takes a cell orientations argument.
    pub fn oriented(&self) -> bool {
        self.oriented
    }

    pub fn subdomain_id(&self) -> SubdomainId {
        self.subdomain_id
    }

    /// Index into the domains of the original form.
    pub fn domain_number(&self) -> usize {
        self.domain_number
    }

    /// Positions of the coefficients the kernel takes among the coefficients of the original
    /// form, in argument order.
    ///
    /// A form may have more coefficients than any single integral uses, so these are not
    /// simply `0..n`. There is one position per form coefficient, while a split mixed
    /// coefficient takes several `w_i` arguments, so this is shorter than the coefficient
    /// arguments whenever a mixed coefficient is split. Use [`Kernel::coefficient_arity`] to
    /// align the two.
    pub fn coefficient_numbers(&self) -> &[usize] {
        &self.coefficient_numbers
    }

    /// For each entry of [`coefficient_numbers`](Self::coefficient_numbers), the number of
    /// consecutive coefficient arguments it is passed as.
    ///
    /// This is 1 except for mixed coefficients, which are passed one argument per
    /// sub-element.
    pub fn coefficient_arity(&self) -> &[usize] {
        &self.coefficient_arity
    }

    /// Whether the body of the kernel actually reads the cell orientations.
    pub fn references_cell_orientations(&self) -> Result<bool, CycleError<usize>> {
        needs_cell_orientations(self.ast.body().expressions())
    }
}
