//! The seam between the AST walker and whatever actually generates code.
//!
//! The compiler only ever threads [Backend::Value] handles between the
//! operations below; it never inspects them. Emitting a primitive is
//! infallible by design: failures belong to parsing, compilation, and
//! backend finalization, not to instruction selection.

/// The primitive operations a code-generation target must expose.
///
/// Values are opaque handles produced in strict creation-then-consumption
/// order: every handle is produced by one operation and consumed only by the
/// parent compile step.
pub trait Backend {
    /// An opaque handle to a backend-computed result
    type Value: Copy;

    /// A signed 32-bit integer constant
    fn constant_int(&mut self, value: i32) -> Self::Value;

    /// Integer addition
    fn add(&mut self, a: Self::Value, b: Self::Value) -> Self::Value;

    /// Integer subtraction
    fn sub(&mut self, a: Self::Value, b: Self::Value) -> Self::Value;

    /// Integer multiplication
    fn mul(&mut self, a: Self::Value, b: Self::Value) -> Self::Value;

    /// Signed integer division. Division by zero is whatever the target
    /// defines; the compiler does not special-case it.
    fn sdiv(&mut self, a: Self::Value, b: Self::Value) -> Self::Value;

    /// Converts a signed integer value to the target's float type
    fn int_to_float(&mut self, a: Self::Value) -> Self::Value;

    /// Converts a float value back to the signed integer type, truncating
    /// per the target's float-to-int rule
    fn float_to_int(&mut self, a: Self::Value) -> Self::Value;

    /// Raises a float base to a signed integer exponent, producing a float
    fn power(&mut self, base: Self::Value, exponent: Self::Value) -> Self::Value;
}
