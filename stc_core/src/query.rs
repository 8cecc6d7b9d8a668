//! Read-only queries over a recorded [`MatchLog`].
//!
//! Every operation is a pure function of the log and its arguments: no
//! side effects, no I/O, no mutation. Results are plain data, projected
//! into [`PathPoint`]s whose `step` doubles as the time axis of the
//! space-time cube.
//!
//! Step ranges are closed (`from..=to`) and valid only when `from <= to`
//! and `to` is inside the log; [`MatchLog::bomb_density`] is the one
//! half-open exception. Invalid ranges and player ids come back as
//! [`QueryError`]s rather than being clamped to a default window.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::QueryError;
use crate::match_log::{Board, MatchLog};

/// Number of players in every recorded match.
pub const PLAYER_COUNT: usize = 4;

/// How many steps before a query window the item snapshot is taken, so
/// items collected right at the window start are still attributed.
const ITEM_LOOKBEHIND: usize = 5;

/// A board coordinate stamped with the step it was observed at.
///
/// `x` and `z` are cell coordinates; `step` is the vertical time axis.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PathPoint {
    pub x: u32,
    pub step: usize,
    pub z: u32,
}

impl PathPoint {
    pub fn new(x: u32, step: usize, z: u32) -> Self {
        Self { x, step, z }
    }
}

/// The first step inside a query window at which a player is dead, with
/// their last live position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeathEvent {
    pub player: usize,
    /// First step the player is recorded dead
    pub step: usize,
    /// Where the player stood one step earlier
    pub last_position: PathPoint,
}

impl MatchLog {
    /// Whether `player` is alive at `step`.
    pub fn is_alive(&self, player: usize, step: usize) -> Result<bool, QueryError> {
        check_player(player)?;
        if step >= self.len() {
            return Err(QueryError::StepOutOfRange {
                step,
                len: self.len(),
            });
        }
        Ok(self.state[step].agents[player].is_alive)
    }

    /// The player's board position at `step`, or `None` when the player is
    /// dead at that step or the step lies past the end of the log.
    pub fn position_at(
        &self,
        player: usize,
        step: usize,
    ) -> Result<Option<PathPoint>, QueryError> {
        check_player(player)?;
        if step >= self.len() {
            return Ok(None);
        }
        let agent = &self.state[step].agents[player];
        if !agent.is_alive {
            return Ok(None);
        }
        Ok(Some(PathPoint::new(agent.position[0], step, agent.position[1])))
    }

    /// The player's positions over `from..=to`, one point per live step in
    /// increasing step order.
    ///
    /// Agents never revive, so the walk stops at the first dead step; a
    /// player already dead at `from` yields an empty path.
    pub fn trajectory(
        &self,
        player: usize,
        from: usize,
        to: usize,
    ) -> Result<Vec<PathPoint>, QueryError> {
        check_player(player)?;
        self.check_range(from, to)?;

        let mut points = Vec::with_capacity(to - from + 1);
        for step in from..=to {
            let agent = &self.state[step].agents[player];
            if !agent.is_alive {
                break;
            }
            points.push(PathPoint::new(agent.position[0], step, agent.position[1]));
        }
        Ok(points)
    }

    /// The raw board grids for every step in `from..=to`, in step order.
    /// The result always has exactly `to - from + 1` entries.
    pub fn board_slice(&self, from: usize, to: usize) -> Result<Vec<&Board>, QueryError> {
        self.check_range(from, to)?;
        Ok(self.state[from..=to].iter().map(|s| &s.board).collect())
    }

    /// Every bomb sighting in `from..=to` laid by `player`, grouped by
    /// bomb id and ordered by step.
    ///
    /// A bomb that persists across several steps contributes one point per
    /// sighting, producing a trajectory-like record usable for connecting
    /// lines between the repeated sightings.
    pub fn bombs_by_bomber(
        &self,
        player: usize,
        from: usize,
        to: usize,
    ) -> Result<BTreeMap<u32, Vec<PathPoint>>, QueryError> {
        check_player(player)?;
        self.check_range(from, to)?;

        let mut bombs: BTreeMap<u32, Vec<PathPoint>> = BTreeMap::new();
        for step in from..=to {
            for bomb in &self.state[step].bombs {
                if bomb.bomber_id as usize != player {
                    continue;
                }
                bombs
                    .entry(bomb.bomb_id)
                    .or_default()
                    .push(PathPoint::new(bomb.position[0], step, bomb.position[1]));
            }
        }
        Ok(bombs)
    }

    /// Every flame sighting in `from..=to`, grouped by remaining life and
    /// ordered by step. The grouping drives life-scaled flame rendering.
    pub fn flames_by_life(
        &self,
        from: usize,
        to: usize,
    ) -> Result<BTreeMap<u32, Vec<PathPoint>>, QueryError> {
        self.check_range(from, to)?;

        let mut flames: BTreeMap<u32, Vec<PathPoint>> = BTreeMap::new();
        for step in from..=to {
            for flame in &self.state[step].flames {
                flames
                    .entry(flame.life)
                    .or_default()
                    .push(PathPoint::new(flame.position[0], step, flame.position[1]));
            }
        }
        Ok(flames)
    }

    /// For each item on the board shortly before the window, the earliest
    /// step in `from..=to` at which any player stands on its tile.
    ///
    /// Items are snapshotted at step `from - 5` (floored at 0). Ties
    /// between players collapse to the lowest player id. Contacts at or
    /// after `to` count as not yet collected and are excluded. Keys are
    /// `(x, contact step, z)`; when two items map to the same key only the
    /// first is kept. Values are raw item-type codes, see
    /// [`PowerUp::from_code`](crate::match_log::PowerUp::from_code).
    pub fn first_pickup_contacts(
        &self,
        from: usize,
        to: usize,
    ) -> Result<BTreeMap<PathPoint, u32>, QueryError> {
        self.check_range(from, to)?;

        let snapshot_step = from.saturating_sub(ITEM_LOOKBEHIND);
        let mut contacts: BTreeMap<PathPoint, u32> = BTreeMap::new();

        for item in &self.state[snapshot_step].items {
            let mut first_contact: Option<usize> = None;
            for player in 0..PLAYER_COUNT {
                for step in from..=to {
                    let agent = &self.state[step].agents[player];
                    if !agent.is_alive {
                        break;
                    }
                    if agent.position == item.position {
                        if first_contact.is_none_or(|c| step < c) {
                            first_contact = Some(step);
                        }
                        break;
                    }
                }
            }

            let Some(contact) = first_contact else {
                continue;
            };
            if contact >= to {
                continue;
            }

            let key = PathPoint::new(item.position[0], contact, item.position[1]);
            contacts.entry(key).or_insert(item.kind);
        }
        Ok(contacts)
    }

    /// Per-cell bomb sighting counts over the half-open range `from..to`,
    /// as a `board_size` x `board_size` grid indexed `[x][z]`. Feeds the
    /// heatmap overlay.
    pub fn bomb_density(&self, from: usize, to: usize) -> Result<Vec<Vec<u32>>, QueryError> {
        // Half-open range: `to == len` is the widest valid window.
        if self.is_empty() || from > to || to > self.len() {
            return Err(QueryError::InvalidRange {
                from,
                to,
                len: self.len(),
            });
        }

        let size = self.board_size();
        let mut counts = vec![vec![0u32; size]; size];
        for step in from..to {
            for bomb in &self.state[step].bombs {
                counts[bomb.position[0] as usize][bomb.position[1] as usize] += 1;
            }
        }
        Ok(counts)
    }

    /// Deaths occurring inside `from..=to`: for each player the first step
    /// they are recorded dead, with their position one step earlier.
    ///
    /// Players already dead when the window opens are omitted; their death
    /// belongs to an earlier window. Events are ordered by step, then
    /// player id.
    pub fn death_events(&self, from: usize, to: usize) -> Result<Vec<DeathEvent>, QueryError> {
        self.check_range(from, to)?;

        let mut events = Vec::new();
        let mut dead = [false; PLAYER_COUNT];
        for step in from..=to {
            for (player, seen) in dead.iter_mut().enumerate() {
                if *seen || self.state[step].agents[player].is_alive {
                    continue;
                }
                *seen = true;
                if step == from {
                    continue;
                }
                // First dead step inside the window, so the player was
                // alive at step - 1.
                let agent = &self.state[step - 1].agents[player];
                events.push(DeathEvent {
                    player,
                    step,
                    last_position: PathPoint::new(
                        agent.position[0],
                        step - 1,
                        agent.position[1],
                    ),
                });
            }
        }
        Ok(events)
    }

    fn check_range(&self, from: usize, to: usize) -> Result<(), QueryError> {
        if from > to || to >= self.len() {
            return Err(QueryError::InvalidRange {
                from,
                to,
                len: self.len(),
            });
        }
        Ok(())
    }
}

fn check_player(player: usize) -> Result<(), QueryError> {
    if player >= PLAYER_COUNT {
        return Err(QueryError::PlayerOutOfRange { player });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::match_log::{
        AgentState, BombState, FlameState, ItemState, MatchResult, StepState,
    };
    use proptest::prelude::*;

    /// A step where the four agents sit at the given positions; `None`
    /// marks a dead agent (parked at the origin, as the recorder does).
    fn step(positions: [Option<[u32; 2]>; 4]) -> StepState {
        let agents = positions
            .into_iter()
            .enumerate()
            .map(|(id, pos)| AgentState {
                agent_id: id as u32,
                is_alive: pos.is_some(),
                position: pos.unwrap_or([0, 0]),
                ammo: 1,
                blast_strength: 2,
                can_kick: false,
            })
            .collect();
        StepState {
            agents,
            board: vec![vec![0; 11]; 11],
            board_size: 11,
            step_count: 0,
            bombs: Vec::new(),
            flames: Vec::new(),
            items: Vec::new(),
        }
    }

    fn log_of(steps: Vec<StepState>) -> MatchLog {
        MatchLog {
            result: MatchResult {
                id: 0,
                name: "Win".to_string(),
            },
            game_id: 1,
            state: steps,
        }
    }

    #[test]
    fn test_is_alive_and_bounds() {
        let log = log_of(vec![
            step([Some([1, 1]), Some([2, 2]), Some([3, 3]), Some([4, 4])]),
            step([Some([1, 2]), None, Some([3, 3]), Some([4, 4])]),
        ]);

        assert!(log.is_alive(0, 0).unwrap());
        assert!(!log.is_alive(1, 1).unwrap());
        assert_eq!(
            log.is_alive(4, 0),
            Err(QueryError::PlayerOutOfRange { player: 4 })
        );
        assert_eq!(
            log.is_alive(0, 2),
            Err(QueryError::StepOutOfRange { step: 2, len: 2 })
        );
    }

    #[test]
    fn test_position_at_dead_and_past_end() {
        let log = log_of(vec![
            step([Some([1, 1]), Some([2, 2]), Some([3, 3]), Some([4, 4])]),
            step([Some([2, 1]), None, Some([3, 3]), Some([4, 4])]),
        ]);

        assert_eq!(log.position_at(0, 0).unwrap(), Some(PathPoint::new(1, 0, 1)));
        assert_eq!(log.position_at(1, 1).unwrap(), None);
        assert_eq!(log.position_at(0, 9).unwrap(), None);
    }

    #[test]
    fn test_trajectory_two_live_steps() {
        let log = log_of(vec![
            step([Some([1, 1]), Some([9, 9]), Some([1, 9]), Some([9, 1])]),
            step([Some([2, 1]), Some([9, 9]), Some([1, 9]), Some([9, 1])]),
        ]);

        let path = log.trajectory(0, 0, 1).unwrap();
        assert_eq!(path, vec![PathPoint::new(1, 0, 1), PathPoint::new(2, 1, 1)]);
    }

    #[test]
    fn test_trajectory_stops_at_death() {
        let log = log_of(vec![
            step([Some([1, 1]), Some([9, 9]), Some([1, 9]), Some([9, 1])]),
            step([None, Some([9, 9]), Some([1, 9]), Some([9, 1])]),
            step([None, Some([9, 9]), Some([1, 9]), Some([9, 1])]),
        ]);

        let path = log.trajectory(0, 0, 2).unwrap();
        assert_eq!(path, vec![PathPoint::new(1, 0, 1)]);
    }

    #[test]
    fn test_trajectory_rejects_bad_ranges() {
        let log = log_of(vec![step([
            Some([1, 1]),
            Some([2, 2]),
            Some([3, 3]),
            Some([4, 4]),
        ])]);

        assert_eq!(
            log.trajectory(0, 1, 0),
            Err(QueryError::InvalidRange { from: 1, to: 0, len: 1 })
        );
        assert_eq!(
            log.trajectory(0, 0, 1),
            Err(QueryError::InvalidRange { from: 0, to: 1, len: 1 })
        );
        assert_eq!(
            log.trajectory(7, 0, 0),
            Err(QueryError::PlayerOutOfRange { player: 7 })
        );
    }

    #[test]
    fn test_board_slice_length() {
        let log = log_of(vec![
            step([Some([0, 0]), Some([1, 1]), Some([2, 2]), Some([3, 3])]),
            step([Some([0, 0]), Some([1, 1]), Some([2, 2]), Some([3, 3])]),
            step([Some([0, 0]), Some([1, 1]), Some([2, 2]), Some([3, 3])]),
        ]);

        assert_eq!(log.board_slice(0, 2).unwrap().len(), 3);
        assert_eq!(log.board_slice(1, 1).unwrap().len(), 1);
        assert!(log.board_slice(2, 1).is_err());
        assert!(log.board_slice(0, 3).is_err());
    }

    #[test]
    fn test_bombs_grouped_by_id_across_steps() {
        let mut steps: Vec<StepState> = (0..11)
            .map(|_| step([Some([1, 1]), Some([9, 9]), Some([5, 5]), Some([9, 1])]))
            .collect();
        let bomb = BombState {
            position: [4, 6],
            bomber_id: 2,
            life: 9,
            blast_strength: 2,
            bomb_id: 5,
        };
        steps[3].bombs.push(bomb.clone());
        steps[4].bombs.push(bomb);
        // A different player's bomb must not show up.
        steps[4].bombs.push(BombState {
            position: [2, 2],
            bomber_id: 0,
            life: 5,
            blast_strength: 2,
            bomb_id: 6,
        });

        let log = log_of(steps);
        let bombs = log.bombs_by_bomber(2, 0, 10).unwrap();

        assert_eq!(bombs.len(), 1);
        assert_eq!(
            bombs[&5],
            vec![PathPoint::new(4, 3, 6), PathPoint::new(4, 4, 6)]
        );
        for points in bombs.values() {
            for p in points {
                let state = &log.state[p.step];
                assert!(state
                    .bombs
                    .iter()
                    .any(|b| b.bomber_id == 2 && b.position == [p.x, p.z]));
            }
        }
    }

    #[test]
    fn test_flames_grouped_by_life() {
        let mut steps: Vec<StepState> = (0..3)
            .map(|_| step([Some([1, 1]), Some([9, 9]), Some([5, 5]), Some([9, 1])]))
            .collect();
        steps[0].flames.push(FlameState { position: [3, 3], life: 2 });
        steps[1].flames.push(FlameState { position: [3, 3], life: 1 });
        steps[1].flames.push(FlameState { position: [6, 2], life: 2 });

        let log = log_of(steps);
        let flames = log.flames_by_life(0, 2).unwrap();

        assert_eq!(
            flames[&2],
            vec![PathPoint::new(3, 0, 3), PathPoint::new(6, 1, 2)]
        );
        assert_eq!(flames[&1], vec![PathPoint::new(3, 1, 3)]);
    }

    #[test]
    fn test_pickup_contact_earliest_player_wins() {
        // Item at (4, 4); players 0 and 1 both stand on it at step 2, so
        // the tie collapses to player 0.
        let mut steps = vec![
            step([Some([0, 0]), Some([4, 2]), Some([9, 9]), Some([9, 1])]),
            step([Some([0, 0]), Some([4, 3]), Some([9, 9]), Some([9, 1])]),
            step([Some([4, 4]), Some([4, 4]), Some([9, 9]), Some([9, 1])]),
            step([Some([4, 4]), Some([5, 4]), Some([9, 9]), Some([9, 1])]),
            step([Some([4, 4]), Some([5, 4]), Some([9, 9]), Some([9, 1])]),
        ];
        steps[0].items.push(ItemState { position: [4, 4], kind: 7 });

        let log = log_of(steps);
        let contacts = log.first_pickup_contacts(0, 4).unwrap();

        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[&PathPoint::new(4, 2, 4)], 7);
    }

    #[test]
    fn test_pickup_contact_at_window_end_excluded() {
        let mut steps = vec![
            step([Some([0, 0]), Some([9, 9]), Some([1, 9]), Some([9, 1])]),
            step([Some([0, 0]), Some([9, 9]), Some([1, 9]), Some([9, 1])]),
            step([Some([4, 4]), Some([9, 9]), Some([1, 9]), Some([9, 1])]),
        ];
        steps[0].items.push(ItemState { position: [4, 4], kind: 6 });

        let log = log_of(steps);
        // Contact happens exactly at `to`, so the item is still uncollected.
        let contacts = log.first_pickup_contacts(0, 2).unwrap();
        assert!(contacts.is_empty());
    }

    #[test]
    fn test_pickup_snapshot_looks_behind() {
        // Ten steps; the item only exists in the early states, before the
        // window opens at step 7. The snapshot at 7 - 5 = 2 still sees it.
        let mut steps: Vec<StepState> = (0..10)
            .map(|i| {
                let pos = if i < 8 { [0, 0] } else { [4, 4] };
                step([Some(pos), Some([9, 9]), Some([1, 9]), Some([9, 1])])
            })
            .collect();
        steps[2].items.push(ItemState { position: [4, 4], kind: 8 });

        let log = log_of(steps);
        let contacts = log.first_pickup_contacts(7, 9).unwrap();
        assert_eq!(contacts[&PathPoint::new(4, 8, 4)], 8);
    }

    #[test]
    fn test_bomb_density_excludes_end_step() {
        let mut steps: Vec<StepState> = (0..4)
            .map(|_| step([Some([1, 1]), Some([9, 9]), Some([5, 5]), Some([9, 1])]))
            .collect();
        let bomb = |x, z| BombState {
            position: [x, z],
            bomber_id: 0,
            life: 9,
            blast_strength: 2,
            bomb_id: 1,
        };
        steps[0].bombs.push(bomb(2, 3));
        steps[1].bombs.push(bomb(2, 3));
        steps[3].bombs.push(bomb(2, 3)); // outside [0, 3)

        let log = log_of(steps);
        let counts = log.bomb_density(0, 3).unwrap();

        assert_eq!(counts[2][3], 2);
        assert_eq!(counts[3][2], 0);
        // The widest window may end exactly at the log length.
        assert!(log.bomb_density(0, 4).is_ok());
        assert!(log.bomb_density(0, 5).is_err());
    }

    #[test]
    fn test_death_events_report_last_live_position() {
        let log = log_of(vec![
            step([Some([1, 1]), Some([9, 9]), Some([5, 5]), Some([9, 1])]),
            step([Some([2, 1]), Some([9, 9]), Some([5, 5]), Some([9, 1])]),
            step([None, Some([9, 9]), Some([5, 5]), Some([9, 1])]),
            step([None, Some([9, 9]), None, Some([9, 1])]),
        ]);

        let events = log.death_events(0, 3).unwrap();
        assert_eq!(
            events,
            vec![
                DeathEvent {
                    player: 0,
                    step: 2,
                    last_position: PathPoint::new(2, 1, 1),
                },
                DeathEvent {
                    player: 2,
                    step: 3,
                    last_position: PathPoint::new(5, 2, 5),
                },
            ]
        );
    }

    #[test]
    fn test_death_before_window_omitted() {
        let log = log_of(vec![
            step([Some([1, 1]), Some([9, 9]), Some([5, 5]), Some([9, 1])]),
            step([None, Some([9, 9]), Some([5, 5]), Some([9, 1])]),
            step([None, Some([9, 9]), Some([5, 5]), Some([9, 1])]),
        ]);

        // Player 0 is already dead when the window opens at step 1.
        let events = log.death_events(1, 2).unwrap();
        assert!(events.is_empty());
    }

    proptest! {
        /// A trajectory never contains a point at or after the first dead
        /// step, regardless of where the death falls.
        #[test]
        fn trajectory_never_outlives_agent(death_step in 0usize..20, len in 1usize..20) {
            let steps: Vec<StepState> = (0..len)
                .map(|i| {
                    let p0 = if i < death_step { Some([1, i as u32]) } else { None };
                    step([p0, Some([9, 9]), Some([1, 9]), Some([9, 1])])
                })
                .collect();
            let log = log_of(steps);

            let path = log.trajectory(0, 0, len - 1).unwrap();
            prop_assert_eq!(path.len(), death_step.min(len));
            for (i, p) in path.iter().enumerate() {
                prop_assert!(log.is_alive(0, p.step).unwrap());
                prop_assert_eq!(p.step, i);
            }
        }
    }
}
