//! Operator run parameters and the cooperative weight constraint.
//!
//! The two transition weights must sum to at most 1. Deployments
//! disagree on how the inputs keep each other honest, so the coupling
//! is a pluggable rule rather than one hard-coded formula: editing one
//! weight hands the whole parameter set to the rule, which may adjust
//! the other weight in response.

/// Parameters for one `start` request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunParams {
    pub n: u32,
    pub p: f64,
    pub q: f64,
}

/// Which weight the operator just edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightField {
    P,
    Q,
}

/// A coupling rule over the weight pair.
pub trait WeightRule {
    /// Re-establish the rule's invariant after `changed` was edited.
    fn adjust(&self, params: &mut RunParams, changed: WeightField);

    /// Config-facing name.
    fn name(&self) -> &'static str;
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

// ── ClampSum ─────────────────────────────────────────────────────

/// Keep `p + q <= 1` by pulling the *other* weight down whenever the
/// edited one pushes the sum over. Default rule.
pub struct ClampSum;

impl WeightRule for ClampSum {
    fn adjust(&self, params: &mut RunParams, changed: WeightField) {
        match changed {
            WeightField::P => params.p = params.p.clamp(0.0, 1.0),
            WeightField::Q => params.q = params.q.clamp(0.0, 1.0),
        }
        if params.p + params.q > 1.0 {
            match changed {
                WeightField::P => params.q = round3((1.0 - params.p).max(0.0)),
                WeightField::Q => params.p = round3((1.0 - params.q).max(0.0)),
            }
        }
    }

    fn name(&self) -> &'static str {
        "clamp_sum"
    }
}

// ── ClampHalf ────────────────────────────────────────────────────

/// The legacy variant: only intervene when *both* weights exceed 0.5,
/// setting the other to the edited weight's complement.
pub struct ClampHalf;

impl WeightRule for ClampHalf {
    fn adjust(&self, params: &mut RunParams, changed: WeightField) {
        if params.p > 0.5 && params.q > 0.5 {
            match changed {
                WeightField::P => params.q = round3(1.0 - params.p),
                WeightField::Q => params.p = round3(1.0 - params.q),
            }
        }
    }

    fn name(&self) -> &'static str {
        "clamp_half"
    }
}

/// Look a rule up by its config name; unknown names get the default.
pub fn rule_from_name(name: &str) -> Box<dyn WeightRule + Send + Sync> {
    match name {
        "clamp_half" => Box::new(ClampHalf),
        "clamp_sum" => Box::new(ClampSum),
        other => {
            tracing::warn!(rule = other, "unknown weight rule; using clamp_sum");
            Box::new(ClampSum)
        }
    }
}
