use crate::error::{OptimizeError, Result};

/// One (wind direction, wind speed, turbulence intensity) case of a sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientCondition {
    /// Degrees
    pub wind_direction: f64,
    /// m/s
    pub wind_speed: f64,
    pub turbulence_intensity: Option<f64>,
}

/// The ambient-condition arrays of a wind rose sweep.
///
/// Arrays are coordinate-wise: entry `i` of each array belongs to case `i`.
/// The lengths are checked once here, so every other part of the crate can
/// index them freely.
#[derive(Debug, Clone, PartialEq)]
pub struct WindRose {
    wd: Vec<f64>,
    ws: Vec<f64>,
    ti: Option<Vec<f64>>,
}

impl WindRose {
    pub fn new(wd: Vec<f64>, ws: Vec<f64>, ti: Option<Vec<f64>>) -> Result<Self> {
        check_len("ws_array", wd.len(), ws.len())?;
        if let Some(ref ti) = ti {
            check_len("ti_array", wd.len(), ti.len())?;
        }

        check_finite("wd_array", &wd)?;
        check_finite("ws_array", &ws)?;
        if let Some(ref ti) = ti {
            check_finite("ti_array", ti)?;
        }

        Ok(Self { wd, ws, ti })
    }

    pub fn len(&self) -> usize {
        self.wd.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wd.is_empty()
    }

    pub fn has_turbulence_intensity(&self) -> bool {
        self.ti.is_some()
    }

    pub fn wind_directions(&self) -> &[f64] {
        &self.wd
    }

    pub fn wind_speeds(&self) -> &[f64] {
        &self.ws
    }

    pub fn turbulence_intensities(&self) -> Option<&[f64]> {
        self.ti.as_deref()
    }

    pub fn condition(&self, index: usize) -> Option<AmbientCondition> {
        if index >= self.len() {
            return None;
        }

        Some(AmbientCondition {
            wind_direction: self.wd[index],
            wind_speed: self.ws[index],
            turbulence_intensity: self.ti.as_ref().map(|ti| ti[index]),
        })
    }

    /// Cases in input order, paired with their position.
    pub fn iter(&self) -> impl Iterator<Item = (usize, AmbientCondition)> + '_ {
        (0..self.len()).filter_map(move |i| self.condition(i).map(|c| (i, c)))
    }
}

fn check_len(name: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(OptimizeError::ShapeMismatch {
            name,
            expected,
            actual,
        });
    }
    Ok(())
}

fn check_finite(name: &'static str, values: &[f64]) -> Result<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(OptimizeError::InvalidInput {
            name,
            index,
            value: values[index],
        }),
        None => Ok(()),
    }
}
