//! Turn-indexed depth and catalog schedule.
//!
//! The search core takes whatever budget it is given. This schedule is the
//! caller-side tuning: shallow while placing, deeper once removals start,
//! and catalog strata filled in from the full board on the first removals.
//! Loaded from JSON; every field is optional.

use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::board::{HAND_SIZE, MAX_PLIES};
use crate::eval::catalog::MAX_DEPTH;
use crate::search::{SearchError, SearchParams};

/// Placements in a game; turn `PLACEMENTS + 1` is the first removal.
const PLACEMENTS: usize = 2 * HAND_SIZE;

/// Errors loading or validating a schedule.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse schedule JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Depth(#[from] SearchError),

    #[error("catalog depths {from}..{to} outside 1..={max}")]
    CatalogRange { from: usize, to: usize, max: usize },
}

/// Search budgets and catalog updates by turn number (1-based, counting
/// both sides' plies).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Schedule {
    /// Adding-phase depth up to `late_adding_turn`.
    pub opening_depth: usize,
    /// Adding-phase depth after `late_adding_turn`.
    pub late_adding_depth: usize,
    pub late_adding_turn: usize,
    /// Removing-phase depth for the first two removals.
    pub transition_depth: usize,
    /// Removing-phase depth from the third removal on.
    pub endgame_depth: usize,
    /// Strata computed on the first two removals, once every weight is
    /// on the board.
    pub removing_catalog: Range<usize>,
}

impl Default for Schedule {
    fn default() -> Self {
        Schedule {
            opening_depth: 2,
            late_adding_depth: 3,
            late_adding_turn: 16,
            transition_depth: 4,
            endgame_depth: 8,
            removing_catalog: 1..7,
        }
    }
}

impl Schedule {
    /// Reads a schedule from a JSON file and validates it.
    pub fn load(path: &Path) -> Result<Schedule, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Schedule::from_json(&data)
    }

    /// Parses and validates a schedule from JSON text.
    pub fn from_json(json: &str) -> Result<Schedule, ConfigError> {
        let schedule: Schedule = serde_json::from_str(json)?;
        schedule.validate()?;
        Ok(schedule)
    }

    /// Checks every depth the schedule can hand to the search.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (adding, removing) in [
            (self.opening_depth, self.transition_depth),
            (self.late_adding_depth, self.endgame_depth),
        ] {
            SearchParams {
                max_depth_adding: adding,
                max_depth_removing: removing,
            }
            .validate()?;
        }
        let range = &self.removing_catalog;
        if range.start < 1 || range.end > MAX_DEPTH + 1 {
            return Err(ConfigError::CatalogRange {
                from: range.start,
                to: range.end,
                max: MAX_DEPTH,
            });
        }
        Ok(())
    }

    /// Search budgets for the 1-based game turn `turn`.
    pub fn params_for(&self, turn: usize) -> SearchParams {
        let adding = if turn > self.late_adding_turn {
            self.late_adding_depth
        } else {
            self.opening_depth
        };
        let removing = if turn > PLACEMENTS + 2 {
            self.endgame_depth
        } else {
            self.transition_depth
        };
        SearchParams {
            max_depth_adding: adding.min(MAX_PLIES),
            max_depth_removing: removing.min(MAX_PLIES),
        }
    }

    /// Catalog strata to compute before searching turn `turn`, if any.
    ///
    /// Nothing while placing: a stratum is filled once, so filling it from a
    /// half-built board would miss subsets of later weights.
    pub fn catalog_for(&self, turn: usize) -> Option<Range<usize>> {
        if turn <= PLACEMENTS {
            None
        } else if turn <= PLACEMENTS + 2 {
            Some(self.removing_catalog.clone())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schedule_is_valid() {
        assert!(Schedule::default().validate().is_ok());
    }

    #[test]
    fn depth_escalates_through_the_game() {
        let schedule = Schedule::default();
        assert_eq!(schedule.params_for(1).max_depth_adding, 2);
        assert_eq!(schedule.params_for(16).max_depth_adding, 2);
        assert_eq!(schedule.params_for(17).max_depth_adding, 3);
        assert_eq!(schedule.params_for(21).max_depth_removing, 4);
        assert_eq!(schedule.params_for(22).max_depth_removing, 4);
        assert_eq!(schedule.params_for(23).max_depth_removing, 8);
    }

    #[test]
    fn catalog_updates_only_on_first_removals() {
        let schedule = Schedule::default();
        assert_eq!(schedule.catalog_for(1), None);
        assert_eq!(schedule.catalog_for(20), None);
        assert_eq!(schedule.catalog_for(21), Some(1..7));
        assert_eq!(schedule.catalog_for(22), Some(1..7));
        assert_eq!(schedule.catalog_for(23), None);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let schedule =
            Schedule::from_json(r#"{"endgame_depth": 12, "removing_catalog": {"start": 3, "end": 5}}"#)
                .unwrap();
        assert_eq!(schedule.endgame_depth, 12);
        assert_eq!(schedule.removing_catalog, 3..5);
        assert_eq!(schedule.opening_depth, Schedule::default().opening_depth);
    }

    #[test]
    fn rejects_bad_values() {
        let err = Schedule::from_json(r#"{"opening_depth": 0}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Depth(SearchError::DepthOutOfRange { depth: 0, .. })
        ));
        let err = Schedule::from_json(r#"{"removing_catalog": {"start": 0, "end": 3}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::CatalogRange { from: 0, .. }));
        assert!(Schedule::from_json(r#"{"removing_catalog": {"start": 1, "end": 22}}"#).is_ok());
        let err = Schedule::from_json(r#"{"removing_catalog": {"start": 1, "end": 23}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::CatalogRange { to: 23, max: 21, .. }));
        assert!(matches!(
            Schedule::from_json("{not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Schedule::load(Path::new("/nonexistent/schedule.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/schedule.json"));
    }
}
