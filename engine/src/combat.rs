//! Player attacks, damage rolls and kill rewards.

use glam::IVec2;
use rand::Rng;
use util::RngExt;
use world::{
    dungeon, scaling, Data, Entity, EntityId, EntityKind, ItemStack,
    LootItem, Objective, StatBundle, WeaponStats,
};

use crate::{
    loot::{self, LootSource},
    msg, Anim, Msg, Perk, Runtime,
};

/// Extra loot bias of the lucky perk.
pub const LUCKY_BIAS: f64 = 0.05;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Hit {
    pub damage: i32,
    pub crit: bool,
}

/// Roll weapon damage.
///
/// `floor(min + uniform(0, max - min) + stat)` where the stat is the one the
/// weapon class scales with, a critical hit multiplies the result and floors
/// again. Never negative.
pub fn roll_damage(
    rng: &mut impl Rng,
    weapon: &WeaponStats,
    stats: &StatBundle,
) -> Hit {
    let spread = (weapon.max_dmg - weapon.min_dmg).max(0) as f64;
    let stat = stats.get(weapon.class.scaling_stat()) as f64;
    let mut damage =
        (weapon.min_dmg as f64 + rng.gen_range(0.0..=spread) + stat).floor();

    let crit = rng.chance(weapon.crit_chance);
    if crit {
        damage = (damage * weapon.crit_mult).floor();
    }

    Hit {
        damage: (damage as i32).max(0),
        crit,
    }
}

#[derive(Clone, PartialEq, Debug)]
pub enum AttackOutcome {
    /// Target took damage and survived.
    Hit {
        target: EntityId,
        damage: i32,
        crit: bool,
        hp_left: i32,
    },
    Killed {
        target: EntityId,
        damage: i32,
        xp: i64,
        gold: i64,
    },
}

impl Runtime {
    /// Strike an enemy or spawner on the active map with the equipped
    /// weapon.
    ///
    /// Returns `None` if the target isn't there or can't be hurt.
    pub(crate) fn player_attack(
        &mut self,
        target: EntityId,
    ) -> Option<AttackOutcome> {
        let weapon = self.state.weapon();
        let stats = self.state.effective_stats();

        let map = self.registry.get_mut(self.state.map)?;
        let e = map.entity_mut(target)?;
        let hp = e.hp_mut()?;

        let mut hit = roll_damage(&mut self.rng, &weapon, &stats);
        if self.rng.chance(weapon.multi_hit) {
            let extra = roll_damage(&mut self.rng, &weapon, &stats);
            hit.damage += extra.damage;
            hit.crit |= extra.crit;
        }

        *hp = (*hp - hit.damage).max(0);
        let hp_left = *hp;
        let name = e.name.clone();

        self.state.anims.insert(EntityId::PLAYER, Anim::Attack);
        self.state.anims.insert(target, Anim::Hurt);
        self.events.push(Msg::Hurt {
            target,
            damage: hit.damage,
            crit: hit.crit,
        });
        log::debug!("player hits {name} {target} for {}", hit.damage);

        if hp_left > 0 {
            if hit.crit {
                msg!(
                    self.events,
                    "You critically hit the {name} for {}.",
                    hit.damage
                );
            } else {
                msg!(self.events, "You hit the {name} for {}.", hit.damage);
            }
            return Some(AttackOutcome::Hit {
                target,
                damage: hit.damage,
                crit: hit.crit,
                hp_left,
            });
        }

        // Removal returns the entity only once, so rewards can't be paid
        // twice for the same kill.
        let dead = map.remove(target)?;
        let (xp, gold) = self.reward_kill(dead);
        Some(AttackOutcome::Killed {
            target,
            damage: hit.damage,
            xp,
            gold,
        })
    }

    /// Pay out experience, gold, loot and bookkeeping for a removed entity.
    fn reward_kill(&mut self, dead: Entity) -> (i64, i64) {
        let pos = dead.pos;
        let map_id = self.state.map;
        self.state.anims.shift_remove(&dead.id);

        let (xp, gold, drops) = match &dead.kind {
            EntityKind::Enemy(mob) => {
                self.state.bump("kills", 1);
                self.state.bump(format!("kills:{}", mob.template), 1);
                if self.state.bestiary.insert(mob.template.clone()) {
                    log::info!("new bestiary entry {}", mob.template);
                }
                self.advance_kill_quest(&dead.name);

                let spawned = mob.spawned_by.is_some();
                let mut xp = scaling::xp(mob.xp_mod, mob.level);
                let mut gold = scaling::gold(mob.xp_mod, mob.level);
                if spawned {
                    xp /= 2;
                    gold /= 2;
                }

                let mut bias = 0.0;
                if map_id.is_dungeon() {
                    bias += loot::DUNGEON_BIAS;
                }
                if mob.is_boss {
                    bias += loot::BOSS_BIAS;
                }
                if self.state.has_perk(Perk::Lucky) {
                    bias += LUCKY_BIAS;
                }
                let source = if mob.is_boss {
                    LootSource::Boss
                } else {
                    LootSource::Enemy
                };

                let mut drops = Vec::new();
                // Spawned mobs only get half the usual chance at loot.
                if !spawned || self.rng.gen_bool(0.5) {
                    let level = mob.level;
                    let rng = &mut self.rng;
                    drops.extend(loot::roll(rng, level, source, bias));
                }

                if mob.is_boss {
                    let kind = self
                        .registry
                        .get(map_id)
                        .map(|m| m.biome.dungeon_kind())
                        .unwrap_or(world::DungeonKind::Crypt);
                    drops.push(dungeon::dungeon_key(kind, map_id));
                    self.state.world_tier += 1;
                    log::info!("world tier is now {}", self.state.world_tier);
                    self.events.push(Msg::WorldTier(self.state.world_tier));
                }

                (xp, gold, drops)
            }
            EntityKind::Spawner(s) => {
                self.state.bump("spawners-destroyed", 1);
                let xp = scaling::xp(2.0, s.level);
                let gold = scaling::gold(1.0, s.level);
                let drops: Vec<LootItem> =
                    loot::roll(&mut self.rng, s.level, LootSource::Enemy, 0.0)
                        .into_iter()
                        .collect();
                (xp, gold, drops)
            }
            _ => (0, 0, Vec::new()),
        };

        self.drop_items(pos, drops);
        self.state.stats.gold += gold;
        self.grant_xp(xp);

        msg!(self.events, "The {} dies.", dead.name);
        self.events.push(Msg::Death {
            name: dead.name.clone(),
            xp,
            gold,
        });
        (xp, gold)
    }

    /// Leave items on the ground of the active map.
    fn drop_items(&mut self, pos: IVec2, items: Vec<LootItem>) {
        let Some(map) = self.registry.get_mut(self.state.map) else {
            return;
        };
        for item in items {
            log::debug!("dropped {} at {pos}", item.name);
            map.spawn(
                item.name.clone(),
                pos,
                EntityKind::ItemDrop(ItemStack::one(item)),
            );
        }
    }

    fn advance_kill_quest(&mut self, victim: &str) {
        let Some(q) = self.state.quest.as_mut() else { return };
        let Some(quest) = Data::get().quest(&q.id) else { return };
        if let Objective::Kill { target, count } = &quest.objective {
            if victim.contains(target.as_str()) && q.progress < *count {
                q.progress += 1;
                log::debug!("quest {} at {}/{count}", quest.id, q.progress);
            }
        }
    }

    /// Add player experience and announce level-ups.
    pub(crate) fn grant_xp(&mut self, xp: i64) {
        for level in self.state.gain_xp(xp) {
            log::info!("player reached level {level}");
            msg!(self.events, "You are now level {level}.");
            self.events.push(Msg::LevelUp(level));
        }
    }
}

#[cfg(test)]
mod tests {
    use quickcheck_macros::quickcheck;
    use util::srng;
    use world::WeaponClass;

    use super::*;

    fn blade(min_dmg: i32, max_dmg: i32, crit_chance: f64) -> WeaponStats {
        WeaponStats {
            class: WeaponClass::Blade,
            min_dmg,
            max_dmg,
            crit_chance,
            crit_mult: 2.0,
            multi_hit: 0.0,
        }
    }

    #[test]
    fn damage_range() {
        let mut rng = srng(&"dmg");
        let stats = StatBundle {
            str: 5,
            dex: 100,
            ..Default::default()
        };
        let w = blade(3, 6, 0.0);
        let mut seen = std::collections::BTreeSet::new();
        for _ in 0..2000 {
            let hit = roll_damage(&mut rng, &w, &stats);
            assert!(!hit.crit);
            assert!((8..=11).contains(&hit.damage), "{}", hit.damage);
            seen.insert(hit.damage);
        }
        // The top of the range needs an exact maximum roll.
        assert!(seen.len() >= 3);
    }

    #[test]
    fn crits_multiply() {
        let mut rng = srng(&"crit");
        let stats = StatBundle::default();
        let hit = roll_damage(&mut rng, &blade(4, 4, 1.0), &stats);
        assert_eq!(hit, Hit { damage: 8, crit: true });
    }

    #[test]
    fn stat_follows_class() {
        let mut rng = srng(&"class");
        let stats = StatBundle {
            int: 10,
            ..Default::default()
        };
        let staff = WeaponStats {
            class: WeaponClass::Staff,
            ..blade(1, 1, 0.0)
        };
        assert_eq!(roll_damage(&mut rng, &staff, &stats).damage, 11);
        assert_eq!(roll_damage(&mut rng, &blade(1, 1, 0.0), &stats).damage, 1);
    }

    #[quickcheck]
    fn damage_is_never_negative(
        min: i8,
        spread: u8,
        stat: i8,
        seed: u32,
    ) -> bool {
        let mut rng = srng(&seed);
        let w = blade(min as i32, min as i32 + spread as i32, 0.5);
        let stats = StatBundle {
            str: stat as i32,
            ..Default::default()
        };
        roll_damage(&mut rng, &w, &stats).damage >= 0
    }
}
