//! Melee combat resolution.
//!
//! After moving, a unit attacks one orthogonally adjacent enemy:
//! - the weakest one (lowest current health)
//! - ties broken by reading order of the target's position
//!
//! Damage is the attacker's full attack power. A target brought to zero
//! health is taken off the battlefield at once, so later turns in the same
//! round never see it.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::battlefield::Battlefield;
use crate::components::{Position, Unit, UnitId};
use crate::error::{Result, SimError};
use crate::pathfinding::adjacent_enemies;

/// Record of one attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackEvent {
    /// Unit that attacked.
    pub attacker: UnitId,
    /// Unit that was hit.
    pub target: UnitId,
    /// Health actually removed.
    pub damage: u32,
    /// Target health after the hit.
    pub remaining: u32,
    /// Target cell at the time of the hit.
    pub position: Position,
    /// Whether the hit killed the target.
    pub killed: bool,
}

/// Weakest first, then earliest in reading order.
fn compare_victims(a: &Unit, b: &Unit) -> Ordering {
    match a.health.current.cmp(&b.health.current) {
        Ordering::Equal => a.position.cmp(&b.position),
        ord => ord,
    }
}

/// Pick the enemy `attacker` would hit right now, if any.
#[must_use]
pub fn select_target(battlefield: &Battlefield, units: &[Unit], attacker: &Unit) -> Option<UnitId> {
    adjacent_enemies(battlefield, units, attacker)
        .min_by(|a, b| compare_victims(a, b))
        .map(|u| u.id)
}

/// Let `attacker_id` strike its chosen target.
///
/// Returns `Ok(None)` when no enemy is adjacent. A killed target is removed
/// from the occupancy index before this returns.
pub fn resolve_attack(
    battlefield: &mut Battlefield,
    units: &mut [Unit],
    attacker_id: UnitId,
) -> Result<Option<AttackEvent>> {
    let attacker = &units[attacker_id.index()];
    let Some(target_id) = select_target(battlefield, units, attacker) else {
        return Ok(None);
    };
    if target_id == attacker_id {
        return Err(SimError::InvariantViolation(format!(
            "unit {attacker_id} tried to attack itself"
        )));
    }
    let power = attacker.attack_power;
    let attacker_faction = attacker.faction;

    let target = &mut units[target_id.index()];
    if target.faction == attacker_faction {
        return Err(SimError::InvariantViolation(format!(
            "unit {attacker_id} tried to attack friendly unit {target_id}"
        )));
    }

    let damage = target.health.apply_damage(power);
    let event = AttackEvent {
        attacker: attacker_id,
        target: target_id,
        damage,
        remaining: target.health.current,
        position: target.position,
        killed: !target.is_alive(),
    };

    if event.killed {
        battlefield.remove(target_id, event.position)?;
        debug!(
            attacker = %attacker_id,
            target = %target_id,
            position = %event.position,
            "unit killed"
        );
    } else {
        debug!(
            attacker = %attacker_id,
            target = %target_id,
            damage,
            remaining = event.remaining,
            "attack"
        );
    }

    Ok(Some(event))
}
