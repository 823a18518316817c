//! Position assignment for lists within a board and tasks within a list.
//!
//! Positions are plain `i64` ordering keys; ascending order is display order.
//! The store asks a [`Positioner`] where a new item goes and which rows a move
//! has to rewrite, then applies the resulting [`MovePlan`] in one transaction.
//!
//! Two strategies are provided:
//!
//! - [`CoarseAppendShift`]: append at `max + 1`, take the caller's index
//!   verbatim on a move, and close the gap in the source container only. The
//!   destination container is never shifted, so positions there may collide.
//! - [`FractionalIndex`]: sparse keys spaced by [`FractionalIndex::GAP`]. A
//!   move lands between its new neighbours and the destination is renumbered
//!   only when no integer key is left between them. Positions stay strictly
//!   increasing in every container the strategy touches.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use uuid::Uuid;

/// An item and its current position inside a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub id: Uuid,
    pub position: i64,
}

impl Slot {
    pub fn new(id: Uuid, position: i64) -> Self {
        Self { id, position }
    }
}

/// One row write produced by a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionUpdate {
    pub id: Uuid,
    pub container_id: Uuid,
    pub position: i64,
}

/// Every write needed to carry out a move. The moved item is always first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovePlan {
    pub updates: Vec<PositionUpdate>,
}

impl MovePlan {
    /// The new position of `id`, if the plan writes it.
    pub fn position_of(&self, id: Uuid) -> Option<i64> {
        self.updates
            .iter()
            .find(|u| u.id == id)
            .map(|u| u.position)
    }
}

/// A request to relocate `item`.
///
/// `source` and `target` hold the containers' current contents in display
/// order. Either may include `item` itself; implementations skip it.
#[derive(Debug, Clone)]
pub struct MoveRequest<'a> {
    pub item: Slot,
    pub source_id: Uuid,
    pub target_id: Uuid,
    /// Caller-supplied index, usually the drop index from the client.
    pub target_position: i64,
    pub source: &'a [Slot],
    pub target: &'a [Slot],
}

impl MoveRequest<'_> {
    pub fn crosses_containers(&self) -> bool {
        self.source_id != self.target_id
    }
}

/// Strategy for assigning positions.
pub trait Positioner: Send + Sync + fmt::Debug {
    /// Position for a new item appended to a container whose current maximum
    /// position is `max` (`None` when the container is empty).
    fn append(&self, max: Option<i64>) -> i64;

    /// Compute the writes needed to carry out `request`.
    fn plan_move(&self, request: &MoveRequest<'_>) -> MovePlan;

    fn kind(&self) -> PositionerKind;
}

/// Append at `max + 1`; on a move, write the target position as given and
/// decrement every source item above the moved item's original position.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoarseAppendShift;

impl Positioner for CoarseAppendShift {
    fn append(&self, max: Option<i64>) -> i64 {
        max.map_or(0, |m| m.saturating_add(1))
    }

    fn plan_move(&self, request: &MoveRequest<'_>) -> MovePlan {
        let item = request.item;
        let mut updates = vec![PositionUpdate {
            id: item.id,
            container_id: request.target_id,
            position: request.target_position,
        }];

        if request.crosses_containers() {
            updates.extend(
                request
                    .source
                    .iter()
                    .filter(|s| s.id != item.id && s.position > item.position)
                    .map(|s| PositionUpdate {
                        id: s.id,
                        container_id: request.source_id,
                        position: s.position.saturating_sub(1),
                    }),
            );
        }

        MovePlan { updates }
    }

    fn kind(&self) -> PositionerKind {
        PositionerKind::Coarse
    }
}

/// Sparse integer keys. `target_position` is read as an index into the
/// destination's display order with the moved item left out.
#[derive(Debug, Clone, Copy, Default)]
pub struct FractionalIndex;

impl FractionalIndex {
    /// Distance between neighbouring keys after an append or a renumber.
    pub const GAP: i64 = 1024;

    fn key_between(before: Option<i64>, after: Option<i64>) -> Option<i64> {
        match (before, after) {
            (None, None) => Some(0),
            (Some(b), None) => b.checked_add(Self::GAP),
            (None, Some(a)) => a.checked_sub(Self::GAP),
            (Some(b), Some(a)) if a > b && a - b >= 2 => Some(b + (a - b) / 2),
            _ => None,
        }
    }
}

impl Positioner for FractionalIndex {
    fn append(&self, max: Option<i64>) -> i64 {
        max.map_or(0, |m| m.saturating_add(Self::GAP))
    }

    fn plan_move(&self, request: &MoveRequest<'_>) -> MovePlan {
        let item = request.item;
        let others: Vec<Slot> = request
            .target
            .iter()
            .copied()
            .filter(|s| s.id != item.id)
            .collect();

        let index = request.target_position.clamp(0, others.len() as i64) as usize;
        let strictly_ordered = others.windows(2).all(|w| w[0].position < w[1].position);

        if strictly_ordered {
            let before = index.checked_sub(1).map(|i| others[i].position);
            let after = others.get(index).map(|s| s.position);
            if let Some(position) = Self::key_between(before, after) {
                return MovePlan {
                    updates: vec![PositionUpdate {
                        id: item.id,
                        container_id: request.target_id,
                        position,
                    }],
                };
            }
        }

        // No room left: renumber the destination with fresh gaps.
        let mut order = others;
        order.insert(index, item);

        let mut updates = Vec::with_capacity(order.len());
        let mut moved = None;
        for (i, slot) in order.iter().enumerate() {
            let position = i as i64 * Self::GAP;
            let update = PositionUpdate {
                id: slot.id,
                container_id: request.target_id,
                position,
            };
            if slot.id == item.id {
                moved = Some(update);
            } else if slot.position != position {
                updates.push(update);
            }
        }
        if let Some(moved) = moved {
            updates.insert(0, moved);
        }

        MovePlan { updates }
    }

    fn kind(&self) -> PositionerKind {
        PositionerKind::Fractional
    }
}

/// Which [`Positioner`] the server runs with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PositionerKind {
    #[default]
    Coarse,
    Fractional,
}

impl PositionerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Coarse => "coarse",
            Self::Fractional => "fractional",
        }
    }

    pub fn build(self) -> Arc<dyn Positioner> {
        match self {
            Self::Coarse => Arc::new(CoarseAppendShift),
            Self::Fractional => Arc::new(FractionalIndex),
        }
    }
}

impl FromStr for PositionerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "coarse" | "coarse-append-shift" => Ok(Self::Coarse),
            "fractional" | "fractional-index" => Ok(Self::Fractional),
            other => Err(format!("unknown positioner '{other}'")),
        }
    }
}

impl fmt::Display for PositionerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slots(positions: &[i64]) -> Vec<Slot> {
        positions
            .iter()
            .map(|&p| Slot::new(Uuid::new_v4(), p))
            .collect()
    }

    /// Apply a plan to a container's contents and return positions in display order.
    fn apply(
        container: &[Slot],
        container_id: Uuid,
        plan: &MovePlan,
        moved: Slot,
    ) -> Vec<(Uuid, i64)> {
        let mut rows: Vec<(Uuid, i64)> = container
            .iter()
            .filter(|s| s.id != moved.id)
            .map(|s| (s.id, plan.position_of(s.id).unwrap_or(s.position)))
            .collect();
        if let Some(u) = plan.updates.iter().find(|u| u.id == moved.id) {
            if u.container_id == container_id {
                rows.push((moved.id, u.position));
            }
        }
        rows.sort_by_key(|(_, p)| *p);
        rows
    }

    mod coarse {
        use super::*;

        #[test]
        fn append_starts_at_zero() {
            assert_eq!(CoarseAppendShift.append(None), 0);
        }

        #[test]
        fn append_goes_after_max() {
            assert_eq!(CoarseAppendShift.append(Some(4)), 5);
        }

        #[test]
        fn append_after_the_largest_key_does_not_overflow() {
            assert_eq!(CoarseAppendShift.append(Some(i64::MAX)), i64::MAX);
        }

        #[test]
        fn same_container_move_only_writes_the_item() {
            let list = Uuid::new_v4();
            let tasks = slots(&[0, 1, 2, 3]);
            let req = MoveRequest {
                item: tasks[0],
                source_id: list,
                target_id: list,
                target_position: 3,
                source: &tasks,
                target: &tasks,
            };

            let plan = CoarseAppendShift.plan_move(&req);

            assert_eq!(plan.updates.len(), 1);
            assert_eq!(plan.updates[0].id, tasks[0].id);
            assert_eq!(plan.updates[0].position, 3);
        }

        #[test]
        fn cross_container_move_compacts_source_only() {
            let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
            let source = slots(&[0, 1, 2, 3]);
            let target = slots(&[0, 1]);
            let req = MoveRequest {
                item: source[1],
                source_id: a,
                target_id: b,
                target_position: 0,
                source: &source,
                target: &target,
            };

            let plan = CoarseAppendShift.plan_move(&req);

            assert_eq!(plan.position_of(source[1].id), Some(0));
            assert_eq!(plan.updates[0].container_id, b);
            assert_eq!(plan.position_of(source[0].id), None);
            assert_eq!(plan.position_of(source[2].id), Some(1));
            assert_eq!(plan.position_of(source[3].id), Some(2));
            assert!(target.iter().all(|t| plan.position_of(t.id).is_none()));
        }

        #[test]
        fn compaction_uses_original_position_not_target() {
            let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
            let source = slots(&[0, 1, 2]);
            let req = MoveRequest {
                item: source[0],
                source_id: a,
                target_id: b,
                target_position: 5,
                source: &source,
                target: &[],
            };

            let plan = CoarseAppendShift.plan_move(&req);

            assert_eq!(plan.position_of(source[1].id), Some(0));
            assert_eq!(plan.position_of(source[2].id), Some(1));
        }
    }

    mod fractional {
        use super::*;

        #[test]
        fn append_leaves_a_gap() {
            assert_eq!(FractionalIndex.append(None), 0);
            assert_eq!(FractionalIndex.append(Some(0)), FractionalIndex::GAP);
        }

        #[test]
        fn move_lands_between_neighbours() {
            let list = Uuid::new_v4();
            let tasks = slots(&[0, 1024, 2048]);
            let req = MoveRequest {
                item: tasks[2],
                source_id: list,
                target_id: list,
                target_position: 1,
                source: &tasks,
                target: &tasks,
            };

            let plan = FractionalIndex.plan_move(&req);

            assert_eq!(plan.updates.len(), 1);
            assert_eq!(plan.position_of(tasks[2].id), Some(512));
        }

        #[test]
        fn move_to_front_and_back_of_target() {
            let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
            let source = slots(&[0]);
            let target = slots(&[0, 1024]);

            let front = FractionalIndex.plan_move(&MoveRequest {
                item: source[0],
                source_id: a,
                target_id: b,
                target_position: 0,
                source: &source,
                target: &target,
            });
            assert_eq!(front.position_of(source[0].id), Some(-1024));

            let back = FractionalIndex.plan_move(&MoveRequest {
                item: source[0],
                source_id: a,
                target_id: b,
                target_position: 99,
                source: &source,
                target: &target,
            });
            assert_eq!(back.position_of(source[0].id), Some(2048));
        }

        #[test]
        fn renumbers_when_neighbours_are_adjacent() {
            let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
            let source = slots(&[0]);
            let target = slots(&[0, 1, 2]);
            let req = MoveRequest {
                item: source[0],
                source_id: a,
                target_id: b,
                target_position: 1,
                source: &source,
                target: &target,
            };

            let plan = FractionalIndex.plan_move(&req);
            let result = apply(&target, b, &plan, source[0]);

            let ids: Vec<Uuid> = result.iter().map(|(id, _)| *id).collect();
            assert_eq!(ids, vec![target[0].id, source[0].id, target[1].id, target[2].id]);
            assert!(result.windows(2).all(|w| w[0].1 < w[1].1));
        }

        #[test]
        fn renumbers_when_target_has_ties() {
            let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
            let source = slots(&[0]);
            let target = slots(&[0, 0, 5000]);
            let req = MoveRequest {
                item: source[0],
                source_id: a,
                target_id: b,
                target_position: 3,
                source: &source,
                target: &target,
            };

            let plan = FractionalIndex.plan_move(&req);
            let result = apply(&target, b, &plan, source[0]);

            assert_eq!(result.last().map(|(id, _)| *id), Some(source[0].id));
            assert!(result.windows(2).all(|w| w[0].1 < w[1].1));
        }

        #[test]
        fn never_touches_the_source_container() {
            let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
            let source = slots(&[0, 1, 2]);
            let target = slots(&[0, 1]);
            let req = MoveRequest {
                item: source[0],
                source_id: a,
                target_id: b,
                target_position: 1,
                source: &source,
                target: &target,
            };

            let plan = FractionalIndex.plan_move(&req);

            assert!(plan.updates.iter().all(|u| u.container_id == b));
        }
    }

    #[test]
    fn kind_parses_from_config_strings() {
        assert_eq!("coarse".parse::<PositionerKind>(), Ok(PositionerKind::Coarse));
        assert_eq!(" Fractional ".parse::<PositionerKind>(), Ok(PositionerKind::Fractional));
        assert!("linked-list".parse::<PositionerKind>().is_err());
        assert_eq!(PositionerKind::Fractional.build().kind(), PositionerKind::Fractional);
    }
}
