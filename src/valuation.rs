//! P/E-based valuation proxy. Not a valuation model, just a sense of direction.

/// Implied upside (in percent) from re-rating `trailing_pe` to `reference_pe`.
///
/// Returns `None` when either multiple is missing, the trailing multiple is
/// zero, or the reference is not a positive number.
pub fn estimate_upside(trailing_pe: Option<f64>, reference_pe: Option<f64>) -> Option<f64> {
    let trailing = trailing_pe.filter(|t| t.is_finite() && *t != 0.0)?;
    let reference = reference_pe.filter(|r| r.is_finite() && *r > 0.0)?;
    let upside = (reference / trailing - 1.0) * 100.0;
    upside.is_finite().then_some(upside)
}
