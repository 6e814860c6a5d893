use nalgebra::RealField;

pub use nalgebra;

pub trait Real: RealField + Copy {}

impl<T: RealField + Copy> Real for T {}

/// A floating point type that generated kernels can be declared with.
///
/// The C type name is what ends up in argument declarations, so the
/// numeric width of a kernel is decided entirely by the choice of `Self`.
pub trait ScalarType: Real {
    /// Name of the corresponding C type, e.g. `double`.
    const C_TYPE: &'static str;

    /// Converts a literal to `Self`.
    ///
    /// Unlike `FromPrimitive::from_f64` this cannot fail, and NaN is preserved.
    fn from_literal(value: f64) -> Self;
}

impl ScalarType for f64 {
    const C_TYPE: &'static str = "double";

    fn from_literal(value: f64) -> Self {
        value
    }
}

impl ScalarType for f32 {
    const C_TYPE: &'static str = "float";

    fn from_literal(value: f64) -> Self {
        value as f32
    }
}
