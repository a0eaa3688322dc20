//! Enemy and spawner turns.

use glam::{ivec2, IVec2};
use util::{bresenham_line, s8, HashSet, RngExt, VecExt};
use world::{
    scaling::HpMods, Behavior, Data, EntityId, EntityKind, Map, Mob, Tile,
};

use crate::{msg, Anim, Msg, Runtime};

/// Hit chance of a level zero enemy.
pub const BASE_HIT_CHANCE: f64 = 0.55;

/// Hit chance gained per enemy level.
pub const HIT_CHANCE_PER_LEVEL: f64 = 0.01;

pub const MAX_HIT_CHANCE: f64 = 0.9;

pub fn hit_chance(level: u32) -> f64 {
    (BASE_HIT_CHANCE + HIT_CHANCE_PER_LEVEL * level as f64).min(MAX_HIT_CHANCE)
}

/// Nothing on the line between the two points blocks sight.
///
/// The endpoints themselves are not checked.
pub fn has_line_of_sight(map: &Map, from: IVec2, to: IVec2) -> bool {
    bresenham_line(from, to)
        .skip(1)
        .all(|p| map.tile(p).is_some_and(|t| !t.blocks_sight()))
}

/// Single cardinal step from `from` towards `to`.
///
/// Tries the axis with the larger distance first, then the other one.
/// Returns `None` if both are blocked or the points coincide.
pub fn greedy_step(
    from: IVec2,
    to: IVec2,
    is_free: impl Fn(IVec2) -> bool,
) -> Option<IVec2> {
    let primary = from.dir4_towards(&to);
    let d = to - from;
    let secondary = if primary.x != 0 {
        ivec2(0, d.y.signum())
    } else {
        ivec2(d.x.signum(), 0)
    };

    [primary, secondary]
        .into_iter()
        .filter(|&step| step != IVec2::ZERO)
        .map(|step| from + step)
        .find(|&p| is_free(p))
}

impl Runtime {
    /// Let everything hostile on the active map act once.
    pub(crate) fn enemy_turn(&mut self) {
        let Runtime {
            registry,
            state,
            rng,
            events,
            ..
        } = self;
        let Some(map) = registry.get_mut(state.map) else {
            return;
        };
        map.tick += 1;

        let player = state.pos;
        let mut occupied: HashSet<IVec2> = map
            .entities
            .iter()
            .filter(|e| e.blocks_movement())
            .map(|e| e.pos)
            .collect();
        occupied.insert(player);

        let actors: Vec<EntityId> = map.hostiles().map(|e| e.id).collect();
        for id in actors {
            if !state.is_alive() {
                break;
            }
            let Some(e) = map.entity(id) else { continue };
            let (pos, name, kind) = (e.pos, e.name.clone(), e.kind.clone());

            match kind {
                EntityKind::Enemy(mob) => {
                    let delta = player - pos;
                    let dist = delta.chebyshev_len();

                    let can_strike = dist <= 1
                        || (mob.behavior == Behavior::Ranged
                            && dist <= mob.attack_range
                            && has_line_of_sight(map, pos, player));

                    if can_strike {
                        if let Some(e) = map.entity_mut(id) {
                            e.facing = delta.signum();
                        }
                        if rng.chance(hit_chance(mob.level)) {
                            let damage = mob.dmg();
                            state.set_hp(state.stats.hp - damage);
                            state.anims.insert(EntityId::PLAYER, Anim::Hurt);
                            events.push(Msg::Hurt {
                                target: EntityId::PLAYER,
                                damage,
                                crit: false,
                            });
                            msg!(events, "The {name} hits you for {damage}.");
                            log::debug!("{name} {id} hits player for {damage}");
                        } else {
                            state.anims.insert(EntityId::PLAYER, Anim::Dodge);
                            events.push(Msg::Miss(EntityId::PLAYER));
                            msg!(events, "The {name} misses.");
                        }
                    } else if dist <= mob.aggro_radius {
                        let step = greedy_step(pos, player, |p| {
                            map.tile(p).is_some_and(Tile::is_walkable)
                                && !occupied.contains(&p)
                        });
                        if let Some(next) = step {
                            occupied.remove(&pos);
                            occupied.insert(next);
                            if let Some(e) = map.entity_mut(id) {
                                e.facing = next - pos;
                                e.pos = next;
                            }
                        }
                    }
                }
                EntityKind::Spawner(s) => {
                    if map.tick < s.ready_at {
                        continue;
                    }
                    let alive = map
                        .entities
                        .iter()
                        .filter_map(|e| e.mob())
                        .filter(|m| m.spawned_by == Some(id))
                        .count();
                    if alive >= s.max_alive {
                        continue;
                    }
                    let Some(spot) = s8::ns(pos).find(|p| {
                        map.tile(*p).is_some_and(Tile::is_walkable)
                            && !occupied.contains(p)
                    }) else {
                        continue;
                    };
                    let Some(monster) = Data::get().bestiary.get(&s.template)
                    else {
                        log::warn!(
                            "{name} {id} has unknown template {:?}",
                            s.template
                        );
                        continue;
                    };

                    let mods = HpMods::default();
                    let mut mob = Mob::new(&s.template, monster, s.level, mods);
                    mob.spawned_by = Some(id);
                    let child = map.spawn(
                        s.template.clone(),
                        spot,
                        EntityKind::Enemy(mob),
                    );
                    occupied.insert(spot);
                    log::debug!("spawner {id} released {child} at {spot}");

                    let tick = map.tick;
                    if let Some(s) =
                        map.entity_mut(id).and_then(|e| match &mut e.kind {
                            EntityKind::Spawner(s) => Some(s),
                            _ => None,
                        })
                    {
                        s.ready_at = tick + s.cooldown;
                    }
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use world::{Biome, MapId, Spawner, TileGrid};

    use super::*;
    use crate::Moved;

    fn open_map() -> Map {
        Map::new(
            MapId::zone(0, 0),
            "Field",
            TileGrid::new(20, 20, Tile::Grass),
            Biome::Grass,
            1,
        )
    }

    fn slime(level: u32) -> Mob {
        let monster = &Data::get().bestiary["Slime"];
        Mob::new("Slime", monster, level, HpMods::default())
    }

    /// Hits and misses against the player since the last call.
    fn strikes(rt: &mut Runtime) -> (usize, usize) {
        let events = rt.drain_events();
        let hits = events
            .iter()
            .filter(|e| matches!(e, Msg::Hurt { target: EntityId::PLAYER, .. }))
            .count();
        let misses = events
            .iter()
            .filter(|e| **e == Msg::Miss(EntityId::PLAYER))
            .count();
        (hits, misses)
    }

    fn heal(rt: &mut Runtime) {
        rt.state.stats.hp = rt.state.max_hp();
    }

    #[test]
    fn hit_chance_caps() {
        assert_eq!(hit_chance(0), 0.55);
        assert!((hit_chance(10) - 0.65).abs() < 1e-9);
        assert_eq!(hit_chance(1000), MAX_HIT_CHANCE);
    }

    #[test]
    fn sight_lines() {
        let mut map = open_map();
        assert!(has_line_of_sight(&map, ivec2(2, 2), ivec2(6, 2)));
        map.terrain.set(ivec2(4, 2), Tile::Wall);
        assert!(!has_line_of_sight(&map, ivec2(2, 2), ivec2(6, 2)));
        // Water doesn't block arrows.
        map.terrain.set(ivec2(4, 2), Tile::Water);
        assert!(has_line_of_sight(&map, ivec2(2, 2), ivec2(6, 2)));
    }

    #[test]
    fn greedy_steps() {
        let open = |_| true;
        let origin = ivec2(0, 0);
        assert_eq!(greedy_step(origin, ivec2(5, 2), open), Some(ivec2(1, 0)));
        assert_eq!(greedy_step(origin, ivec2(1, 4), open), Some(ivec2(0, 1)));
        // Primary axis blocked, fall back to the other one.
        assert_eq!(
            greedy_step(ivec2(0, 0), ivec2(5, 2), |p| p != ivec2(1, 0)),
            Some(ivec2(0, 1))
        );
        // Straight line with the way blocked has no fallback.
        assert_eq!(
            greedy_step(ivec2(0, 0), ivec2(5, 0), |p| p != ivec2(1, 0)),
            None
        );
        assert_eq!(greedy_step(ivec2(3, 3), ivec2(3, 3), open), None);
    }

    #[test]
    fn spawner_respects_cooldown_and_cap() {
        let mut map = open_map();
        let id = map.spawn(
            "Slime Nest",
            ivec2(10, 10),
            EntityKind::Spawner(Spawner::new("Slime", 1)),
        );
        let cooldown = map.entity(id).unwrap().spawner().unwrap().cooldown;

        let mut rt = Runtime::for_map(map, ivec2(1, 1));
        let children = |rt: &Runtime| {
            rt.active_map()
                .unwrap()
                .entities
                .iter()
                .filter(|e| e.mob().is_some_and(|m| m.spawned_by == Some(id)))
                .count()
        };

        for _ in 1..cooldown {
            rt.enemy_turn();
        }
        assert_eq!(children(&rt), 0);
        rt.enemy_turn();
        assert_eq!(children(&rt), 1);

        for _ in 0..(cooldown * 10) {
            rt.enemy_turn();
            rt.state.set_hp(100);
        }
        assert_eq!(children(&rt), 3);
    }

    #[test]
    fn adjacent_enemies_strike() {
        let mut map = open_map();
        let id = map.spawn("Slime", ivec2(6, 5), EntityKind::Enemy(slime(1)));
        let mut rt = Runtime::for_map(map, ivec2(5, 5));

        let (mut hurt, mut dodged) = (0, 0);
        for _ in 0..40 {
            rt.enemy_turn();
            match rt.state.anims.get(&EntityId::PLAYER) {
                Some(Anim::Hurt) => hurt += 1,
                Some(Anim::Dodge) => dodged += 1,
                other => panic!("player didn't react to a strike: {other:?}"),
            }
            rt.state.anims.clear();
            heal(&mut rt);
        }
        assert!(hurt > 0 && dodged > 0, "{hurt} hits, {dodged} misses");
        assert_eq!(strikes(&mut rt), (hurt, dodged));

        // Striking happens in place.
        let e = rt.active_map().unwrap().entity(id).unwrap();
        assert_eq!(e.pos, ivec2(6, 5));
        assert_eq!(e.facing, ivec2(-1, 0));
    }

    #[test]
    fn ranged_strikes_need_line_of_sight() {
        let mut map = open_map();
        let mut archer = slime(1);
        archer.behavior = Behavior::Ranged;
        archer.attack_range = 5;
        archer.aggro_radius = 0;
        let id = map.spawn("Archer", ivec2(5, 1), EntityKind::Enemy(archer));
        map.terrain.set(ivec2(5, 3), Tile::Wall);
        let mut rt = Runtime::for_map(map, ivec2(5, 5));

        for _ in 0..10 {
            rt.enemy_turn();
        }
        assert_eq!(strikes(&mut rt), (0, 0));

        let map_id = rt.state.map;
        rt.registry
            .get_mut(map_id)
            .unwrap()
            .terrain
            .set(ivec2(5, 3), Tile::Grass);
        for _ in 0..10 {
            rt.enemy_turn();
            heal(&mut rt);
        }
        let (hits, misses) = strikes(&mut rt);
        assert_eq!(hits + misses, 10);
        assert_eq!(
            rt.active_map().unwrap().entity(id).unwrap().pos,
            ivec2(5, 1)
        );
    }

    #[test]
    fn enemies_close_in_without_overlapping() {
        let mut map = open_map();
        for p in [ivec2(10, 5), ivec2(11, 5), ivec2(10, 6)] {
            map.spawn("Slime", p, EntityKind::Enemy(slime(1)));
        }
        let mut rt = Runtime::for_map(map, ivec2(5, 5));

        for _ in 0..10 {
            rt.enemy_turn();
            heal(&mut rt);

            let map = rt.active_map().unwrap();
            let mut cells: Vec<IVec2> = map.hostiles().map(|e| e.pos).collect();
            cells.push(rt.state.pos);
            let n = cells.len();
            cells.sort_by_key(|p| (p.x, p.y));
            cells.dedup();
            assert_eq!(cells.len(), n, "overlap in {cells:?}");
        }

        // The one stuck in the back can't get around the one in front.
        let map = rt.active_map().unwrap();
        let close = map
            .hostiles()
            .filter(|e| (e.pos - rt.state.pos).chebyshev_len() <= 1)
            .count();
        assert_eq!(close, 2);
    }

    #[test]
    fn distant_enemies_stay_put() {
        let mut map = open_map();
        let id = map.spawn("Slime", ivec2(15, 15), EntityKind::Enemy(slime(1)));
        let mut rt = Runtime::for_map(map, ivec2(1, 1));
        for _ in 0..10 {
            rt.enemy_turn();
        }
        assert_eq!(
            rt.active_map().unwrap().entity(id).unwrap().pos,
            ivec2(15, 15)
        );
        assert_eq!(strikes(&mut rt), (0, 0));
    }

    #[test]
    fn only_some_moves_give_enemies_a_turn() {
        let mut map = open_map();
        map.terrain.set(ivec2(1, 5), Tile::Tree);
        let mut rt = Runtime::for_map(map, ivec2(0, 5));
        let tick = |rt: &Runtime| rt.active_map().unwrap().tick;

        assert_eq!(rt.move_player(ivec2(-1, 0)), Moved::Blocked);
        assert!(matches!(
            rt.move_player(ivec2(1, 0)),
            Moved::Harvested { .. }
        ));
        assert_eq!(tick(&rt), 0);

        assert_eq!(rt.move_player(ivec2(0, 1)), Moved::Walked);
        assert_eq!(tick(&rt), 1);
    }
}
