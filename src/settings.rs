/// Entering/leaving variable selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PivotRule {
    /// Most negative reduced cost enters; lowest column and row indices break ties.
    #[default]
    Dantzig,
    /// Lowest-index improving column enters; among rows tied in the ratio
    /// test, the one whose basic variable has the lowest index leaves.
    /// Never cycles.
    Bland,
}

/// Solver settings.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    /// Magnitudes at or below this are treated as zero.
    pub tolerance: f64,
    /// Pivot cap per phase.
    pub max_iterations: usize,
    pub pivot_rule: PivotRule,
    /// Consecutive degenerate pivots after which a `Dantzig` phase falls back
    /// to `Bland` until it finishes.
    pub degenerate_pivot_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tolerance: 1e-9,
            max_iterations: 10_000,
            pivot_rule: PivotRule::Dantzig,
            degenerate_pivot_limit: 50,
        }
    }
}

impl Settings {
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_pivot_rule(mut self, rule: PivotRule) -> Self {
        self.pivot_rule = rule;
        self
    }

    pub fn with_degenerate_pivot_limit(mut self, limit: usize) -> Self {
        self.degenerate_pivot_limit = limit;
        self
    }
}
