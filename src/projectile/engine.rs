//! Active projectile set
//!
//! Projectiles are kept in spawn order. Each phase of a tick removes what it
//! retires and reports why, so the session can apply damage and emit events.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::core::config::CombatConfig;
use crate::core::error::{CombatError, Result};
use crate::core::types::{CharacterId, ProjectileId, Rect, Vec2};
use crate::projectile::launch::{Launch, Projectile};

/// Why a projectile left play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetireReason {
    OutOfBounds,
    HitCharacter { target: CharacterId },
    BlockedByShield { target: CharacterId },
    /// Lost to a strictly larger projectile
    Destroyed { by: ProjectileId },
    /// Equal sizes cancel out
    MutualDestruction { with: ProjectileId },
    /// Removed at a round boundary
    Cleared,
}

/// Read-only projectile snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectileView {
    pub id: ProjectileId,
    pub position: Vec2,
    pub size: f32,
    pub owner: CharacterId,
}

/// What a character looks like to the collision pass
#[derive(Debug, Clone, Copy)]
pub struct HitTarget {
    pub id: CharacterId,
    pub hit_box: Rect,
    pub shield_active: bool,
    /// Defeated characters are not hit
    pub disabled: bool,
}

/// A projectile that reached a character this tick
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterHit {
    pub projectile: Projectile,
    pub target: CharacterId,
    pub blocked: bool,
}

impl CharacterHit {
    pub fn reason(&self) -> RetireReason {
        if self.blocked {
            RetireReason::BlockedByShield {
                target: self.target,
            }
        } else {
            RetireReason::HitCharacter {
                target: self.target,
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct ProjectileEngine {
    active: Vec<Projectile>,
    next_id: u64,
}

impl ProjectileEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire a projectile, enforcing the per-owner cap
    pub fn spawn(&mut self, launch: &Launch, config: &CombatConfig) -> Result<ProjectileId> {
        let owner = launch.owner.ok_or(CombatError::InvalidOwner)?;
        let cap = config.max_projectiles_per_owner;
        if self.count_owned_by(owner) >= cap {
            return Err(CombatError::ProjectileCapReached { owner, cap });
        }

        let id = ProjectileId(self.next_id);
        let projectile = Projectile::launch(id, launch, config)?;
        self.next_id += 1;

        tracing::debug!(
            id = id.0,
            size = projectile.size(),
            speed = projectile.speed(),
            power = projectile.power(),
            "projectile spawned"
        );
        self.active.push(projectile);
        Ok(id)
    }

    pub fn get(&self, id: ProjectileId) -> Option<&Projectile> {
        self.active.iter().find(|p| p.id() == id)
    }

    pub fn active(&self) -> &[Projectile] {
        &self.active
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn count_owned_by(&self, owner: CharacterId) -> usize {
        self.active.iter().filter(|p| p.owner() == owner).count()
    }

    /// Integrate every projectile over `dt` seconds
    pub fn advance(&mut self, dt: f32) {
        for projectile in &mut self.active {
            projectile.advance(dt);
        }
    }

    /// Remove projectiles whose centre has left the arena
    pub fn retire_out_of_bounds(&mut self, arena: Rect) -> Vec<(Projectile, RetireReason)> {
        let (inside, outside): (Vec<_>, Vec<_>) = self
            .active
            .drain(..)
            .partition(|p| arena.contains(p.position()));
        self.active = inside;

        outside
            .into_iter()
            .map(|p| (p, RetireReason::OutOfBounds))
            .collect()
    }

    /// Pairwise collisions between different owners, in spawn order
    ///
    /// The strictly larger projectile survives; equal sizes both retire.
    /// A retired projectile takes no part in later pairs.
    pub fn resolve_projectile_collisions(&mut self) -> Vec<(Projectile, RetireReason)> {
        let mut retired: Vec<(usize, RetireReason)> = Vec::new();
        let mut gone: AHashSet<usize> = AHashSet::new();

        for i in 0..self.active.len() {
            for j in (i + 1)..self.active.len() {
                if gone.contains(&i) {
                    break;
                }
                if gone.contains(&j) {
                    continue;
                }

                let (a, b) = (&self.active[i], &self.active[j]);
                if a.owner() == b.owner() || !a.overlaps(b) {
                    continue;
                }

                if a.size() > b.size() {
                    retired.push((j, RetireReason::Destroyed { by: a.id() }));
                    gone.insert(j);
                } else if b.size() > a.size() {
                    retired.push((i, RetireReason::Destroyed { by: b.id() }));
                    gone.insert(i);
                } else {
                    retired.push((i, RetireReason::MutualDestruction { with: b.id() }));
                    retired.push((j, RetireReason::MutualDestruction { with: a.id() }));
                    gone.insert(i);
                    gone.insert(j);
                }
            }
        }

        self.extract(retired)
    }

    /// Projectiles reaching a non-owner character this tick
    ///
    /// An active shield blocks at its bubble radius before the hit box is
    /// tested. Each projectile hits at most one character.
    pub fn collect_character_hits(
        &mut self,
        targets: &[HitTarget],
        config: &CombatConfig,
    ) -> Vec<CharacterHit> {
        let mut hits = Vec::new();
        let mut remaining = Vec::with_capacity(self.active.len());

        for projectile in self.active.drain(..) {
            let struck = targets
                .iter()
                .filter(|t| t.id != projectile.owner() && !t.disabled)
                .find_map(|t| {
                    let shield_reach = config.shield_radius + projectile.radius();
                    if t.shield_active
                        && t.hit_box.center().distance(&projectile.position()) <= shield_reach
                    {
                        Some((t.id, true))
                    } else if t
                        .hit_box
                        .intersects_circle(projectile.position(), projectile.radius())
                    {
                        Some((t.id, false))
                    } else {
                        None
                    }
                });

            match struck {
                Some((target, blocked)) => hits.push(CharacterHit {
                    projectile,
                    target,
                    blocked,
                }),
                None => remaining.push(projectile),
            }
        }

        self.active = remaining;
        hits
    }

    /// Drop every projectile, returning their ids
    pub fn clear(&mut self) -> Vec<ProjectileId> {
        self.active.drain(..).map(|p| p.id()).collect()
    }

    pub fn views(&self) -> Vec<ProjectileView> {
        self.active
            .iter()
            .map(|p| ProjectileView {
                id: p.id(),
                position: p.position(),
                size: p.size(),
                owner: p.owner(),
            })
            .collect()
    }

    /// Remove indexed projectiles, preserving spawn order of the rest
    fn extract(
        &mut self,
        mut retired: Vec<(usize, RetireReason)>,
    ) -> Vec<(Projectile, RetireReason)> {
        if retired.is_empty() {
            return Vec::new();
        }
        retired.sort_by_key(|(index, _)| *index);

        let mut out = Vec::with_capacity(retired.len());
        let mut reasons = retired.into_iter().peekable();
        let mut kept = Vec::with_capacity(self.active.len());
        for (index, projectile) in self.active.drain(..).enumerate() {
            match reasons.peek() {
                Some((at, reason)) if *at == index => {
                    out.push((projectile, *reason));
                    reasons.next();
                }
                _ => kept.push(projectile),
            }
        }
        self.active = kept;
        out
    }
}
