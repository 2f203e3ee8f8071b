use crate::f;

/// Extends primitives with more specific formatting options
pub trait ValueExt {
    /// Better scientific number formatting
    ///
    /// The default is not very consistent for scientific in particular, so this
    /// allows easy definition.
    ///
    /// Works for anything that can be represented as scientific using the
    /// `LowerExp` trait, which is pretty much every numerical primitive.
    ///
    /// ```rust
    /// # use fluxnorm_utils::ValueExt;
    /// let number = -1.0_f64;
    /// assert_eq!(number.sci(5, 2), "-1.00000e+00".to_string());
    /// assert_eq!((0.0625_f64).sci(3, 2), "6.250e-02".to_string());
    /// ```
    fn sci(&self, precision: usize, exp_pad: usize) -> String;
}

impl<T: std::fmt::LowerExp> ValueExt for T {
    fn sci(&self, precision: usize, exp_pad: usize) -> String {
        let num = f!("{:.precision$e}", &self, precision = precision);
        // `LowerExp` always writes an 'e', but no point panicking over it
        let Some((mantissa, exp)) = num.split_once('e') else {
            return num;
        };
        // Make sure the exponent is signed
        let (sign, exp) = match exp.strip_prefix('-') {
            Some(exp) => ('-', exp),
            None => ('+', exp),
        };
        f!("{mantissa}e{sign}{exp:0>exp_pad$}")
    }
}

/// Extends floats with tolerant comparisons
///
/// Geometry on the reciprocal space grid regularly produces values that sit
/// exactly on a boundary in theory, but are a few ulp either side of it in
/// practice.
pub trait FloatExt {
    /// Check `lower - tol <= self <= upper + tol`
    ///
    /// ```rust
    /// # use fluxnorm_utils::FloatExt;
    /// assert!(1.0_f64.is_within(0.0, 1.0, 0.0));
    /// assert!((1.0_f64 + 1e-12).is_within(0.0, 1.0, 1e-9));
    /// assert!(!(1.1_f64).is_within(0.0, 1.0, 1e-9));
    /// assert!(!f64::NAN.is_within(0.0, 1.0, 1e-9));
    /// ```
    fn is_within(&self, lower: f64, upper: f64, tol: f64) -> bool;

    /// Check that two values differ by no more than `tol`
    ///
    /// ```rust
    /// # use fluxnorm_utils::FloatExt;
    /// assert!(0.3_f64.approx_eq(0.1 + 0.2, 1e-12));
    /// assert!(!0.3_f64.approx_eq(0.31, 1e-12));
    /// ```
    fn approx_eq(&self, other: f64, tol: f64) -> bool;
}

impl FloatExt for f64 {
    #[inline]
    fn is_within(&self, lower: f64, upper: f64, tol: f64) -> bool {
        *self >= lower - tol && *self <= upper + tol
    }

    #[inline]
    fn approx_eq(&self, other: f64, tol: f64) -> bool {
        (self - other).abs() <= tol
    }
}
