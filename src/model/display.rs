//! display — canonical text rendering of uncertain and mixed expressions.
//!
//! Rendering is a diagnostic surface, not a behavioral one, but its output
//! is canonical: terms are consolidated through the shared
//! [`TermAccumulator`] and ordered by parameter index, so the same
//! expression always renders the same string.
//!
//! Conventions
//! -----------
//! - Coefficients of exactly +1/-1 print without a numeral; any other active
//!   coefficient prints as `"<magnitude> <name>"`.
//! - Terms are joined with `" + "` or `" - "` according to sign; a leading
//!   negative term prints a bare `-` prefix.
//! - The additive constant is appended only when requested and only when its
//!   magnitude exceeds [`DISPLAY_EPSILON`].
//! - An expression with nothing to print renders as `"0"`.
use crate::{
    model::{
        expr::{MixedExpr, UncertainExpr, VarId},
        robust_model::RobustModel,
    },
    resolution::accumulator::{TERM_EPSILON, TermAccumulator},
};

/// Constants with magnitude at or below this threshold are not rendered.
pub const DISPLAY_EPSILON: f64 = 1e-6;

/// Render an uncertain expression against its model's parameter names.
///
/// Parameters outside the model's table render with a positional fallback
/// name; this keeps rendering total for diagnostics on malformed input.
pub fn render_uncertain(model: &RobustModel, expr: &UncertainExpr, show_constant: bool) -> String {
    let mut acc = TermAccumulator::new();
    for (param, coeff) in expr.terms() {
        acc.add(param, coeff);
    }
    let mut out = String::new();
    for (param, coeff) in acc.active_sorted() {
        let name = match model.param(param) {
            Some(p) => p.name.clone(),
            None => format!("u{param}"),
        };
        push_term(&mut out, coeff, &name);
    }
    if show_constant && expr.constant().abs() > DISPLAY_EPSILON {
        push_scalar(&mut out, expr.constant());
    }
    if out.is_empty() {
        out.push('0');
    }
    out
}

/// Render a mixed expression, parenthesizing uncertain coefficients.
///
/// `names` maps decision-variable ids to display names; variable terms are
/// ordered by variable id and each uncertain coefficient expression is
/// rendered with its own constant shown.
pub fn render_mixed(
    model: &RobustModel, expr: &MixedExpr, names: &dyn Fn(VarId) -> String, show_constant: bool,
) -> String {
    let mut out = String::new();
    for (var, coeff) in expr.sorted_terms() {
        let name = names(var);
        if coeff.is_certain() {
            let value = coeff.constant();
            if value.abs() >= TERM_EPSILON {
                push_term(&mut out, value, &name);
            }
        } else {
            if !out.is_empty() {
                out.push_str(" + ");
            }
            out.push('(');
            out.push_str(&render_uncertain(model, coeff, true));
            out.push_str(") ");
            out.push_str(&name);
        }
    }
    let constant = render_uncertain(model, expr.constant(), show_constant);
    if constant != "0" {
        if !out.is_empty() {
            out.push_str(" + ");
        }
        out.push_str(&constant);
    }
    if out.is_empty() {
        out.push('0');
    }
    out
}

// ---- Helper methods ----

fn push_term(out: &mut String, coeff: f64, name: &str) {
    push_sign(out, coeff);
    let magnitude = coeff.abs();
    if magnitude != 1.0 {
        out.push_str(&format!("{magnitude} "));
    }
    out.push_str(name);
}

fn push_scalar(out: &mut String, value: f64) {
    push_sign(out, value);
    out.push_str(&format!("{}", value.abs()));
}

fn push_sign(out: &mut String, value: f64) {
    if out.is_empty() {
        if value < 0.0 {
            out.push('-');
        }
    } else if value < 0.0 {
        out.push_str(" - ");
    } else {
        out.push_str(" + ");
    }
}
