use crate::optimizer::CaseResult;

/// Optimization results of a wind rose sweep, one row per ambient condition.
///
/// Row `i` belongs to input case `i`; the index is always `0..len()`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable {
    rows: Vec<CaseResult>,
    has_ti: bool,
}

impl ResultTable {
    pub fn new(rows: Vec<CaseResult>, has_ti: bool) -> Self {
        Self { rows, has_ti }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_turbulence_intensity(&self) -> bool {
        self.has_ti
    }

    pub fn columns(&self) -> Vec<&'static str> {
        let mut columns = vec!["ws", "wd"];
        if self.has_ti {
            columns.push("ti");
        }
        columns.extend([
            "power_baseline",
            "power_baseline_weighted",
            "turbine_power_baseline",
            "power_opt",
            "power_opt_weighted",
            "turbine_power_opt",
            "yaw_angles",
        ]);
        columns
    }

    pub fn row(&self, index: usize) -> Option<&CaseResult> {
        self.rows.get(index)
    }

    pub fn rows(&self) -> &[CaseResult] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &CaseResult)> {
        self.rows.iter().enumerate()
    }

    pub fn into_rows(self) -> Vec<CaseResult> {
        self.rows
    }

    /// Sum of baseline farm power over all cases, `None` if any row lacks it.
    pub fn total_power_baseline(&self) -> Option<f64> {
        self.rows.iter().map(|row| row.power_baseline).sum()
    }

    pub fn total_power_opt(&self) -> f64 {
        self.rows.iter().map(|row| row.power_opt).sum()
    }

    /// Relative gain of the optimized sweep over baseline, in percent.
    pub fn uplift_percent(&self) -> Option<f64> {
        let baseline = self.total_power_baseline()?;
        if baseline == 0.0 {
            return None;
        }
        Some(100.0 * (self.total_power_opt() - baseline) / baseline)
    }
}

impl<'a> IntoIterator for &'a ResultTable {
    type Item = &'a CaseResult;
    type IntoIter = std::slice::Iter<'a, CaseResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
