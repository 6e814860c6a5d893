use crate::element::IndexShapeResolver;
use crate::form::Coefficient;
use crate::kernel::{ArgDecl, Qualifier};
use fenris_tensor::Expr;
use fenris_traits::ScalarType;
use log::trace;

/// Declaration of a buffer of global constants: `const double *restrict name`.
pub fn constant_coefficient_arg<T: ScalarType>(name: &str) -> ArgDecl {
    ArgDecl::new(T::C_TYPE, name)
        .with_pointer(vec![Qualifier::Restrict])
        .with_qualifier(Qualifier::Const)
}

/// Declaration of a field buffer: `const double *const restrict *restrict name`.
pub fn field_coefficient_arg<T: ScalarType>(name: &str) -> ArgDecl {
    ArgDecl::new(T::C_TYPE, name)
        .with_pointer(vec![Qualifier::Const, Qualifier::Restrict])
        .with_pointer(vec![Qualifier::Restrict])
        .with_qualifier(Qualifier::Const)
}

/// Prepares the kernel argument for a coefficient and the expression reading it.
///
/// Constants (`Real` coefficients) are passed as a flat buffer of unknown length which the
/// expression views in the value shape of the coefficient.
///
/// Fields are passed as a `(scalar dofs) x (components)` buffer. The returned expression
/// views it in the element's scalar shape followed by its tensor shape. On interior facets
/// the degrees of freedom of both cells are stored back to back, which shows up as a leading
/// dimension of extent 2 in the scalar shape.
pub fn prepare_coefficient<T, R>(
    coefficient: &Coefficient,
    name: &str,
    interior_facet: bool,
    resolver: &R,
) -> eyre::Result<(ArgDecl, Expr<T>)>
where
    T: ScalarType,
    R: IndexShapeResolver + ?Sized,
{
    if coefficient.is_real() {
        let buffer = Expr::variable_with_extents(name, vec![None]);
        let expression = Expr::reshape(&buffer, vec![coefficient.value_shape()]);
        trace!("Coefficient {} is constant with value shape {:?}", name, coefficient.value_shape());
        return Ok((constant_coefficient_arg::<T>(name), expression));
    }

    let element = resolver.create_element(coefficient.element())?;
    let (mut scalar_shape, tensor_shape) = element.scalar_and_tensor_shape();
    if interior_facet {
        scalar_shape.0.insert(0, 2);
    }

    let buffer = Expr::variable(name, &[scalar_shape.size(), tensor_shape.size()]);
    let expression = Expr::reshape(&buffer, vec![scalar_shape.0.clone(), tensor_shape.0.clone()]);
    trace!(
        "Coefficient {} has scalar shape {} and tensor shape {}",
        name,
        scalar_shape,
        tensor_shape
    );
    Ok((field_coefficient_arg::<T>(name), expression))
}
