use crate::error::{GeometryError, GraphError, Result};
use crate::graph::CandidateMode;
use crate::grid::GridConfig;

/// Everything one generation run needs besides the rooms and the
/// obstruction backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationConfig {
    pub grid: GridConfig,
    /// Corridor width in world units.
    pub corridor_width: f64,
    /// Flips the winding of every emitted triangle.
    pub invert_triangles: bool,
    /// Emits a ceiling and walls in addition to the floor.
    pub extrude_walls: bool,
    /// Ceiling height above the floor when walls are extruded.
    pub wall_height: f64,
    /// Share of rejected candidates kept as extra loops, in `[0, 1]`.
    pub extra_loop_fraction: f64,
    /// Shuffles the rejected candidates before loops are drawn.
    pub shuffle_seed: Option<u64>,
    pub candidate_mode: CandidateMode,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            corridor_width: 2.0,
            invert_triangles: false,
            extrude_walls: true,
            wall_height: 3.0,
            extra_loop_fraction: 0.15,
            shuffle_seed: None,
            candidate_mode: CandidateMode::Complete,
        }
    }
}

impl GenerationConfig {
    /// Checks the run parameters. Grid dimensions are checked when the grid
    /// is built.
    ///
    /// # Errors
    ///
    /// Returns an error if the corridor width or wall height is not positive,
    /// or the loop fraction is outside `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        positive("corridor width", self.corridor_width)?;
        if self.extrude_walls {
            positive("wall height", self.wall_height)?;
        }
        if !(0.0..=1.0).contains(&self.extra_loop_fraction) {
            return Err(GraphError::InvalidLoopFraction(self.extra_loop_fraction).into());
        }
        Ok(())
    }
}

fn positive(parameter: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(GeometryError::ParameterOutOfRange {
            parameter,
            value,
            min: 0.0,
            max: f64::INFINITY,
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(GenerationConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_bad_values() {
        let narrow = GenerationConfig {
            corridor_width: 0.0,
            ..GenerationConfig::default()
        };
        assert!(narrow.validate().is_err());

        let flat = GenerationConfig {
            wall_height: -1.0,
            ..GenerationConfig::default()
        };
        assert!(flat.validate().is_err());

        let loopy = GenerationConfig {
            extra_loop_fraction: 1.5,
            ..GenerationConfig::default()
        };
        assert!(loopy.validate().is_err());
    }

    #[test]
    fn wall_height_ignored_without_walls() {
        let floor_only = GenerationConfig {
            extrude_walls: false,
            wall_height: 0.0,
            ..GenerationConfig::default()
        };
        assert!(floor_only.validate().is_ok());
    }
}
