//! Equipment status simulation.
//!
//! Every placed item carries a status light. Two periodic rolls degrade
//! healthy equipment: a warning roll (Good → Warning) and an error roll
//! (Good/Warning → Error). The user acknowledges a fault to reset it.
//! Time is driven by the host calling [`StatusTicker::advance`].

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::occupancy::{Placement, PlacementId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipmentStatus {
    #[default]
    Good,
    Warning,
    Error,
}

impl EquipmentStatus {
    pub fn is_fault(self) -> bool {
        self != Self::Good
    }
}

/// Roll intervals and transition chances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusPolicy {
    pub warning_interval_secs: f32,
    pub error_interval_secs: f32,
    /// Good → Warning per warning roll.
    pub warning_chance: f32,
    /// Good → Error per error roll.
    pub error_chance_from_good: f32,
    /// Warning → Error per error roll.
    pub error_chance_from_warning: f32,
}

impl Default for StatusPolicy {
    fn default() -> Self {
        Self {
            warning_interval_secs: 10.0,
            error_interval_secs: 15.0,
            warning_chance: 0.2,
            error_chance_from_good: 0.05,
            error_chance_from_warning: 0.3,
        }
    }
}

/// One status transition produced by a roll or an acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub id: PlacementId,
    pub from: EquipmentStatus,
    pub to: EquipmentStatus,
}

/// Current status of every tracked placement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusBoard {
    statuses: BTreeMap<PlacementId, EquipmentStatus>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track new placements as Good and forget removed ones.
    pub fn sync(&mut self, placements: &[Placement]) {
        self.statuses
            .retain(|id, _| placements.iter().any(|p| p.id == *id));
        for p in placements {
            self.statuses.entry(p.id).or_default();
        }
    }

    pub fn get(&self, id: PlacementId) -> Option<EquipmentStatus> {
        self.statuses.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    pub fn count(&self, status: EquipmentStatus) -> usize {
        self.statuses.values().filter(|s| **s == status).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PlacementId, EquipmentStatus)> + '_ {
        self.statuses.iter().map(|(id, s)| (*id, *s))
    }

    pub fn clear(&mut self) {
        self.statuses.clear();
    }

    /// Reset a Warning or Error back to Good.
    pub fn acknowledge(&mut self, id: PlacementId) -> Option<StatusChange> {
        let status = self.statuses.get_mut(&id)?;
        if !status.is_fault() {
            return None;
        }
        let change = StatusChange {
            id,
            from: *status,
            to: EquipmentStatus::Good,
        };
        *status = EquipmentStatus::Good;
        log::info!("Acknowledged {:?} on {}", change.from, id);
        Some(change)
    }

    pub fn roll_warning<R: Rng + ?Sized>(&mut self, policy: &StatusPolicy, rng: &mut R) -> Vec<StatusChange> {
        self.roll(rng, |status| match status {
            EquipmentStatus::Good => Some((policy.warning_chance, EquipmentStatus::Warning)),
            _ => None,
        })
    }

    pub fn roll_error<R: Rng + ?Sized>(&mut self, policy: &StatusPolicy, rng: &mut R) -> Vec<StatusChange> {
        self.roll(rng, |status| match status {
            EquipmentStatus::Good => Some((policy.error_chance_from_good, EquipmentStatus::Error)),
            EquipmentStatus::Warning => {
                Some((policy.error_chance_from_warning, EquipmentStatus::Error))
            }
            EquipmentStatus::Error => None,
        })
    }

    fn roll<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        rule: impl Fn(EquipmentStatus) -> Option<(f32, EquipmentStatus)>,
    ) -> Vec<StatusChange> {
        let mut changes = Vec::new();
        for (id, status) in self.statuses.iter_mut() {
            let Some((chance, to)) = rule(*status) else {
                continue;
            };
            if rng.gen::<f32>() < chance {
                changes.push(StatusChange {
                    id: *id,
                    from: *status,
                    to,
                });
                *status = to;
            }
        }
        for c in &changes {
            log::debug!("{} went {:?} -> {:?}", c.id, c.from, c.to);
        }
        changes
    }
}

/// Most rolls of one kind fired by a single `advance`. Older missed rolls
/// are skipped after a long stall.
pub const MAX_CATCH_UP_ROLLS: u64 = 64;

/// Host-driven clock for the two periodic rolls.
///
/// Roll `k` of an interval `i` is due at `k * i` seconds. The ticker counts
/// fired rolls and derives the due count from the clock, so long uptimes
/// keep their precision.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusTicker {
    policy: StatusPolicy,
    clock: f64,
    warning_rolls: u64,
    error_rolls: u64,
    cancelled: bool,
}

fn rolls_due(clock: f64, interval: f32) -> u64 {
    if interval > 0.0 {
        (clock / f64::from(interval)).floor() as u64
    } else {
        0
    }
}

fn roll_time(roll: u64, interval: f32) -> f64 {
    roll as f64 * f64::from(interval)
}

fn skip_missed(fired: u64, due: u64, kind: &str) -> u64 {
    let missed = due.saturating_sub(fired);
    if missed > MAX_CATCH_UP_ROLLS {
        log::warn!(
            "Skipping {} missed {} rolls",
            missed - MAX_CATCH_UP_ROLLS,
            kind
        );
        due - MAX_CATCH_UP_ROLLS
    } else {
        fired
    }
}

impl StatusTicker {
    pub fn new(policy: StatusPolicy) -> Self {
        Self {
            policy,
            clock: 0.0,
            warning_rolls: 0,
            error_rolls: 0,
            cancelled: false,
        }
    }

    pub fn policy(&self) -> &StatusPolicy {
        &self.policy
    }

    /// Seconds since the ticker started.
    pub fn elapsed(&self) -> f64 {
        self.clock
    }

    /// Advance by `dt` seconds and fire every roll that came due, in time
    /// order. A warning roll fires before an error roll due at the same time.
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        board: &mut StatusBoard,
        rng: &mut R,
    ) -> Vec<StatusChange> {
        let mut changes = Vec::new();
        if self.cancelled || !(dt > 0.0) || !dt.is_finite() {
            return changes;
        }
        self.clock += f64::from(dt);
        let warning_interval = self.policy.warning_interval_secs;
        let error_interval = self.policy.error_interval_secs;
        let warning_due = rolls_due(self.clock, warning_interval);
        let error_due = rolls_due(self.clock, error_interval);
        self.warning_rolls = skip_missed(self.warning_rolls, warning_due, "warning");
        self.error_rolls = skip_missed(self.error_rolls, error_due, "error");

        while self.warning_rolls < warning_due || self.error_rolls < error_due {
            let next_warning = if self.warning_rolls < warning_due {
                roll_time(self.warning_rolls + 1, warning_interval)
            } else {
                f64::INFINITY
            };
            let next_error = if self.error_rolls < error_due {
                roll_time(self.error_rolls + 1, error_interval)
            } else {
                f64::INFINITY
            };
            if next_warning <= next_error {
                changes.extend(board.roll_warning(&self.policy, rng));
                self.warning_rolls += 1;
            } else {
                changes.extend(board.roll_error(&self.policy, rng));
                self.error_rolls += 1;
            }
        }
        changes
    }

    /// Stop all further rolls.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Rotation;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn placements(n: u32) -> Vec<Placement> {
        (1..=n)
            .map(|i| Placement {
                id: PlacementId(i),
                item: "Router".into(),
                x: i as i32,
                y: 0,
                width: 1,
                height: 1,
                rotation: Rotation::Deg0,
                support: false,
                only_on_support: false,
            })
            .collect()
    }

    fn certain() -> StatusPolicy {
        StatusPolicy {
            warning_chance: 1.0,
            error_chance_from_good: 0.0,
            error_chance_from_warning: 1.0,
            ..StatusPolicy::default()
        }
    }

    #[test]
    fn test_sync_tracks_and_forgets() {
        let mut board = StatusBoard::new();
        let mut ps = placements(3);
        board.sync(&ps);
        assert_eq!(board.count(EquipmentStatus::Good), 3);
        ps.remove(1);
        board.sync(&ps);
        assert_eq!(board.len(), 2);
        assert_eq!(board.get(PlacementId(2)), None);
    }

    #[test]
    fn test_certain_rolls() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut board = StatusBoard::new();
        board.sync(&placements(4));
        let policy = certain();
        assert!(board.roll_error(&policy, &mut rng).is_empty());
        assert_eq!(board.roll_warning(&policy, &mut rng).len(), 4);
        assert_eq!(board.count(EquipmentStatus::Warning), 4);
        assert_eq!(board.roll_error(&policy, &mut rng).len(), 4);
        assert_eq!(board.count(EquipmentStatus::Error), 4);
        // Errors do not roll again.
        assert!(board.roll_warning(&policy, &mut rng).is_empty());
    }

    #[test]
    fn test_zero_chance_never_changes() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut board = StatusBoard::new();
        board.sync(&placements(10));
        let policy = StatusPolicy {
            warning_chance: 0.0,
            error_chance_from_good: 0.0,
            ..StatusPolicy::default()
        };
        for _ in 0..50 {
            board.roll_warning(&policy, &mut rng);
            board.roll_error(&policy, &mut rng);
        }
        assert_eq!(board.count(EquipmentStatus::Good), 10);
    }

    #[test]
    fn test_acknowledge_resets_faults() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut board = StatusBoard::new();
        board.sync(&placements(1));
        assert_eq!(board.acknowledge(PlacementId(1)), None);
        board.roll_warning(&certain(), &mut rng);
        let change = board.acknowledge(PlacementId(1)).unwrap();
        assert_eq!(change.from, EquipmentStatus::Warning);
        assert_eq!(board.get(PlacementId(1)), Some(EquipmentStatus::Good));
        assert_eq!(board.acknowledge(PlacementId(9)), None);
    }

    #[test]
    fn test_ticker_fires_on_schedule() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut board = StatusBoard::new();
        board.sync(&placements(2));
        let mut ticker = StatusTicker::new(certain());

        assert!(ticker.advance(9.5, &mut board, &mut rng).is_empty());
        // Warning roll at t = 10.
        assert_eq!(ticker.advance(1.0, &mut board, &mut rng).len(), 2);
        assert_eq!(board.count(EquipmentStatus::Warning), 2);
        // Error roll at t = 15.
        assert_eq!(ticker.advance(5.0, &mut board, &mut rng).len(), 2);
        assert_eq!(board.count(EquipmentStatus::Error), 2);
    }

    #[test]
    fn test_ticker_catches_up_in_time_order() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut board = StatusBoard::new();
        board.sync(&placements(1));
        let mut ticker = StatusTicker::new(certain());
        // One large step covers the warning at 10 and the error at 15.
        let changes = ticker.advance(16.0, &mut board, &mut rng);
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].to, EquipmentStatus::Warning);
        assert_eq!(changes[1].to, EquipmentStatus::Error);
    }

    #[test]
    fn test_huge_step_is_bounded() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut board = StatusBoard::new();
        board.sync(&placements(1));
        let mut ticker = StatusTicker::new(certain());
        let changes = ticker.advance(4.0e8, &mut board, &mut rng);
        assert_eq!(changes.len(), 2);
        assert_eq!(board.get(PlacementId(1)), Some(EquipmentStatus::Error));
        assert_eq!(ticker.elapsed(), 4.0e8);
        assert_eq!(ticker.warning_rolls, 4.0e7 as u64);
    }

    #[test]
    fn test_frame_steps_after_long_uptime() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut board = StatusBoard::new();
        board.sync(&placements(1));
        let mut ticker = StatusTicker::new(certain());
        ticker.advance(600_000.0, &mut board, &mut rng);
        board.acknowledge(PlacementId(1));

        let mut changes = Vec::new();
        for _ in 0..660 {
            changes.extend(ticker.advance(1.0 / 60.0, &mut board, &mut rng));
        }
        assert!(ticker.elapsed() > 600_010.0);
        // Warning at 600010 fires, error at 600015 is still ahead.
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].to, EquipmentStatus::Warning);
    }

    #[test]
    fn test_zero_interval_never_rolls() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut board = StatusBoard::new();
        board.sync(&placements(2));
        let mut ticker = StatusTicker::new(StatusPolicy {
            warning_interval_secs: 0.0,
            error_interval_secs: 0.0,
            ..certain()
        });
        assert!(ticker.advance(50.0, &mut board, &mut rng).is_empty());
    }

    #[test]
    fn test_cancel_stops_rolls() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut board = StatusBoard::new();
        board.sync(&placements(3));
        let mut ticker = StatusTicker::new(certain());
        ticker.cancel();
        assert!(ticker.advance(100.0, &mut board, &mut rng).is_empty());
        assert_eq!(board.count(EquipmentStatus::Good), 3);
        assert!(ticker.is_cancelled());
    }

    #[test]
    fn test_seeded_rolls_are_reproducible() {
        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut board = StatusBoard::new();
            board.sync(&placements(20));
            let mut ticker = StatusTicker::new(StatusPolicy::default());
            for _ in 0..12 {
                ticker.advance(5.0, &mut board, &mut rng);
            }
            board
        };
        assert_eq!(run(42), run(42));
    }
}
