//! Plain snapshots of match state for the network layer
//!
//! Only counts and cursor positions travel; the wire format around them
//! belongs to whoever sends them. JSON helpers are provided for tools.

use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::core::types::{CellCoord, FactionId, Tick};
use crate::simulation::tick::Match;

/// One faction's cursor as seen from outside
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorState {
    pub faction: FactionId,
    pub position: CellCoord,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub tick: Tick,
    pub counts: Vec<usize>,
    pub cursors: Vec<CursorState>,
}

impl MatchSnapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Match {
    /// Current tick, counts and cursors
    pub fn snapshot(&self) -> Result<MatchSnapshot> {
        let mut cursors = Vec::with_capacity(self.faction_count());
        for faction in 0..self.faction_count() {
            let faction = FactionId(faction as u8);
            let cursor = self.cursor(faction)?;
            cursors.push(CursorState {
                faction,
                position: cursor.position,
                active: cursor.active,
            });
        }
        Ok(MatchSnapshot {
            tick: self.tick(),
            counts: self.counts(),
            cursors,
        })
    }

    /// Apply the cursor half of a snapshot received from a peer
    ///
    /// Counts and tick are informational and are not applied.
    pub fn apply_cursor_snapshot(&mut self, snapshot: &MatchSnapshot) -> Result<()> {
        for state in &snapshot.cursors {
            self.set_cursor(state.faction, state.position, state.active)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::army::spawn::SpawnPlan;
    use crate::core::config::MatchConfig;
    use crate::core::error::TidewarError;
    use crate::map::obstacle_map::ObstacleMap;

    fn small_match() -> Match {
        let map = ObstacleMap::open(6, 6).unwrap();
        let plans = [
            SpawnPlan::cluster(FactionId(0), 2, CellCoord::new(0, 0)),
            SpawnPlan::cluster(FactionId(1), 2, CellCoord::new(5, 5)),
        ];
        Match::new(map, 2, &plans, MatchConfig::default()).unwrap()
    }

    #[test]
    fn test_snapshot_reports_cursors_and_counts() {
        let mut m = small_match();
        m.set_cursor(FactionId(1), CellCoord::new(2, 3), true).unwrap();
        let snap = m.snapshot().unwrap();
        assert_eq!(snap.tick, 0);
        assert_eq!(snap.counts, vec![2, 2]);
        assert!(!snap.cursors[0].active);
        assert_eq!(snap.cursors[1].position, CellCoord::new(2, 3));
        assert!(snap.cursors[1].active);
    }

    #[test]
    fn test_apply_cursor_snapshot_from_json() {
        let mut source = small_match();
        source.set_cursor(FactionId(0), CellCoord::new(4, 1), true).unwrap();
        let json = source.snapshot().unwrap().to_json().unwrap();

        let mut target = small_match();
        target
            .apply_cursor_snapshot(&MatchSnapshot::from_json(&json).unwrap())
            .unwrap();
        let cursor = target.cursor(FactionId(0)).unwrap();
        assert_eq!(cursor.position, CellCoord::new(4, 1));
        assert!(cursor.active);
        assert_eq!(cursor.freshness, target.config().cursor_max_freshness);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(matches!(
            MatchSnapshot::from_json("{\"tick\":"),
            Err(TidewarError::Serde(_))
        ));
    }
}
