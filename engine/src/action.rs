//! Player commands and how a turn resolves.

use glam::{ivec2, IVec2};
use serde::{Deserialize, Serialize};
use world::{
    dungeon::{self, DungeonSpec},
    Collectible, Data, EntityId, EntityKind, Link, LootItem, Map, MapId,
    Object, Resource, Station, Tile,
};

use crate::{
    loot::{self, LootSource},
    msg, AttackOutcome, Msg, Runtime,
};

/// Player input, one per turn.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    /// Step or bump in a direction.
    Move(IVec2),
    /// Attack whatever is in the facing direction.
    Attack,
    /// Use whatever is in the facing direction.
    Interact,
    /// Let a turn pass.
    Wait,
}

/// What happened on a move command.
#[derive(Clone, PartialEq, Debug)]
pub enum Moved {
    /// Stepped onto a plain cell.
    Walked,
    /// Walked off the map edge into a neighboring zone.
    Transition { to: MapId },
    EnteredDungeon(MapId),
    /// Chopped or mined an adjacent resource tile.
    Harvested { resource: Resource, item: String },
    /// Terrain is in the way.
    Blocked,
    /// Walked onto items and took them.
    PickedUp(Vec<String>),
    /// Went through a door or portal.
    Teleported { to: MapId },
    Attacked(AttackOutcome),
    /// Broke a pot or crate, maybe finding something.
    Smashed { loot: Option<String> },
    /// Something that doesn't move out of the way.
    Rejected,
}

/// What happened on an interact command.
#[derive(Clone, PartialEq, Debug)]
pub enum Interaction {
    /// Nothing to interact with.
    Nothing,
    Looted { items: Vec<String>, gold: i64 },
    /// Chest needs a key the player doesn't have.
    Locked,
    /// Chest was opened before.
    Empty,
    Talked { name: String, greeting: String },
    QuestOffered(String),
    QuestInProgress { id: String, progress: u32, needed: u32 },
    QuestCompleted(String),
    /// Shrine restored health.
    Healed,
    Fished(String),
    /// Crafting happens in the UI layer.
    Station(Station),
    Traveled(Moved),
}

/// Arrival cell on the `dir` side edge of a map, for a player coming in
/// from the opposite direction.
///
/// Prefers road tiles, then any free tile, taking the middle one of the
/// candidates. Falls back to the edge center.
pub fn edge_entry(map: &Map, dir: IVec2) -> IVec2 {
    let dim = map.dim();
    let edge: Vec<IVec2> = if dir.x != 0 {
        let x = if dir.x > 0 { 0 } else { dim.x - 1 };
        (0..dim.y).map(|y| ivec2(x, y)).collect()
    } else {
        let y = if dir.y > 0 { 0 } else { dim.y - 1 };
        (0..dim.x).map(|x| ivec2(x, y)).collect()
    };

    let roads: Vec<IVec2> = edge
        .iter()
        .copied()
        .filter(|&p| map.is_free(p) && map.tile(p).is_some_and(Tile::is_path))
        .collect();
    let candidates = if roads.is_empty() {
        edge.iter().copied().filter(|&p| map.is_free(p)).collect()
    } else {
        roads
    };

    if let Some(&p) = candidates.get(candidates.len() / 2) {
        return p;
    }
    let center = edge[edge.len() / 2];
    map.nearest_free(center).unwrap_or(center)
}

impl Runtime {
    pub fn execute(&mut self, action: Action) {
        match action {
            Action::Move(dir) => {
                self.move_player(dir);
            }
            Action::Attack => {
                self.attack();
            }
            Action::Interact => {
                self.interact();
            }
            Action::Wait => {
                self.state.anims.clear();
                self.enemy_turn();
                self.end_action();
            }
        }
    }

    /// Try to move the player one step.
    ///
    /// Bumping into things does things to them, see `Moved` for the
    /// possible results. `dir` components are clamped to unit length.
    pub fn move_player(&mut self, dir: IVec2) -> Moved {
        let dir = dir.clamp(IVec2::NEG_ONE, IVec2::ONE);
        self.state.anims.clear();
        if dir == IVec2::ZERO {
            return Moved::Rejected;
        }
        self.state.facing = dir;

        let ret = self.resolve_move(dir);
        log::debug!("move {dir} -> {ret:?}");
        self.end_action();
        ret
    }

    /// Attack the cell the player is facing.
    pub fn attack(&mut self) -> Option<AttackOutcome> {
        self.state.anims.clear();
        let target = self.state.pos + self.state.facing;
        let id = self
            .active_map()?
            .entities_at(target)
            .find(|e| e.is_hostile())
            .map(|e| e.id)?;

        let ret = self.player_attack(id);
        if ret.is_some() {
            self.enemy_turn();
        }
        self.end_action();
        ret
    }

    /// Use the thing in the cell the player is facing.
    pub fn interact(&mut self) -> Interaction {
        self.state.anims.clear();
        let ret = self.resolve_interaction();
        log::debug!("interact -> {ret:?}");
        self.end_action();
        ret
    }

    fn end_action(&mut self) {
        self.check_defeat();
        self.check_secrets();
    }

    fn resolve_move(&mut self, dir: IVec2) -> Moved {
        let Some(map) = self.active_map() else {
            log::warn!("player is on missing map {}", self.state.map);
            return Moved::Rejected;
        };
        let dest = self.state.pos + dir;

        let Some(tile) = map.tile(dest) else {
            return self.cross_edge(dest);
        };

        if tile == Tile::DungeonEntrance {
            return self.enter_dungeon(dest);
        }

        if let Some(resource) = Resource::from_tile(tile) {
            return self.harvest(dest, resource);
        }

        if tile.blocks_movement() {
            return Moved::Blocked;
        }

        let blocker = map.entities_at(dest).find(|e| e.blocks_movement()).map(
            |e| {
                let decor = match &e.kind {
                    EntityKind::Object(Object::Decor(d)) => Some(*d),
                    _ => None,
                };
                (e.id, e.is_hostile(), decor)
            },
        );

        if let Some((id, hostile, decor)) = blocker {
            if hostile {
                let Some(outcome) = self.player_attack(id) else {
                    return Moved::Rejected;
                };
                self.enemy_turn();
                return Moved::Attacked(outcome);
            }
            if decor.is_some_and(|d| d.is_destructible()) {
                return self.smash(id, dest);
            }
            return Moved::Rejected;
        }

        let link = map.entities_at(dest).find_map(|e| match e.kind {
            EntityKind::Object(Object::Link(link)) => Some(link),
            _ => None,
        });
        if let Some(link) = link {
            return self.follow_link(link);
        }

        let picked = self.pick_up_at(dest);
        self.state.pos = dest;
        self.reveal_around_player();
        if !picked.is_empty() {
            return Moved::PickedUp(picked);
        }

        self.state.bump("steps", 1);
        self.enemy_turn();
        Moved::Walked
    }

    fn cross_edge(&mut self, dest: IVec2) -> Moved {
        let Some(map) = self.active_map() else {
            return Moved::Rejected;
        };
        let dim = map.dim();
        // Horizontal movement wins on corners.
        let dir = if dest.x < 0 {
            ivec2(-1, 0)
        } else if dest.x >= dim.x {
            ivec2(1, 0)
        } else if dest.y < 0 {
            ivec2(0, -1)
        } else {
            ivec2(0, 1)
        };

        let Some(to) = map.neighbors.get(dir) else {
            return Moved::Blocked;
        };
        let Some(next) = self.registry.get_or_generate(to) else {
            log::warn!("neighbor {to} of {} does not exist", self.state.map);
            return Moved::Rejected;
        };
        let pos = edge_entry(next, dir);

        log::info!("zone transition {} -> {to}", self.state.map);
        self.arrive(to, pos);
        Moved::Transition { to }
    }

    fn enter_dungeon(&mut self, entrance: IVec2) -> Moved {
        let zone = self.state.map;
        let Some(map) = self.active_map() else {
            return Moved::Rejected;
        };
        let id = MapId::Dungeon {
            zone: zone.zone_pos(),
            entry: entrance,
        };
        let spec = DungeonSpec {
            id,
            zone_name: map.name.clone(),
            zone_difficulty: map.difficulty,
            kind: map.biome.dungeon_kind(),
            parent: zone,
            entry: entrance,
            player_level: self.state.stats.level,
            world_tier: self.state.world_tier,
        };

        let target = self.registry.get_or_insert_with(id, |rng| {
            dungeon::generate_dungeon(rng, &spec)
        });
        let Some(stairs) = target.find_tile(Tile::StairsUp) else {
            log::warn!("dungeon {id} has no stairs");
            return Moved::Rejected;
        };
        msg!(self.events, "You descend into the {}.", target.name);

        self.state.flags.insert("entered-dungeon".into());
        self.arrive(id, stairs);
        Moved::EnteredDungeon(id)
    }

    /// Gather from a tree or rock without moving.
    fn harvest(&mut self, p: IVec2, resource: Resource) -> Moved {
        let skill = self.state.skills.get(resource).level;
        let Some(item) = loot::material(&mut self.rng, resource, skill) else {
            log::warn!("no {} materials defined", resource.name());
            return Moved::Blocked;
        };
        let Some(map) = self.registry.get_mut(self.state.map) else {
            return Moved::Rejected;
        };
        if map.terrain.deplete(p).is_none() {
            return Moved::Blocked;
        }

        let name = item.name.clone();
        self.gather(resource, item);
        Moved::Harvested {
            resource,
            item: name,
        }
    }

    /// Put a gathered material in the inventory and train the skill.
    pub(crate) fn gather(&mut self, resource: Resource, item: LootItem) {
        let xp = Data::get()
            .materials
            .iter()
            .find(|m| m.name == item.name)
            .map_or(1, |m| m.xp);

        msg!(self.events, "You gather {}.", item.name);
        self.events.push(Msg::Loot(item.name.clone()));
        self.state.inventory.add(item);
        self.state.bump(format!("harvest:{}", resource.name()), 1);

        if let Some(level) = self.state.skills.train(resource, xp) {
            log::info!("{} reached level {level}", resource.skill_name());
            let skill = resource.skill_name();
            msg!(self.events, "Your {skill} is now level {level}.");
            self.events.push(Msg::SkillUp(resource, level));
        }
    }

    /// Take every item and pickup on a cell, returns what was taken.
    fn pick_up_at(&mut self, p: IVec2) -> Vec<String> {
        let Some(map) = self.registry.get_mut(self.state.map) else {
            return Vec::new();
        };
        let ids: Vec<EntityId> = map
            .entities_at(p)
            .filter(|e| {
                matches!(
                    e.kind,
                    EntityKind::ItemDrop(_) | EntityKind::Collectible(_)
                )
            })
            .map(|e| e.id)
            .collect();

        let mut ret = Vec::new();
        for id in ids {
            let Some(e) = map.remove(id) else { continue };
            match e.kind {
                EntityKind::ItemDrop(stack) => {
                    msg!(self.events, "You pick up the {}.", stack.item.name);
                    self.events.push(Msg::Loot(stack.item.name.clone()));
                    ret.push(stack.item.name.clone());
                    self.state.inventory.add(stack);
                }
                EntityKind::Collectible(Collectible::Gold(n)) => {
                    msg!(self.events, "You find {n} gold.");
                    self.state.stats.gold += n;
                    ret.push(format!("{n} gold"));
                }
                EntityKind::Collectible(Collectible::Token(t)) => {
                    self.state.bump(format!("token:{t}"), 1);
                    ret.push(t);
                }
                _ => {}
            }
        }
        ret
    }

    pub(crate) fn follow_link(&mut self, link: Link) -> Moved {
        let Some(map) = self.registry.get_or_generate(link.target) else {
            log::warn!("link to unknown map {}", link.target);
            return Moved::Rejected;
        };
        let pos = map.nearest_free(link.pos).unwrap_or(link.pos);
        self.arrive(link.target, pos);
        Moved::Teleported { to: link.target }
    }

    fn smash(&mut self, id: EntityId, p: IVec2) -> Moved {
        let Some(map) = self.registry.get_mut(self.state.map) else {
            return Moved::Rejected;
        };
        let level = map.difficulty.max(1) as u32;
        let Some(e) = map.remove(id) else {
            return Moved::Rejected;
        };
        msg!(self.events, "You smash the {}.", e.name);

        let loot = loot::roll(&mut self.rng, level, LootSource::Decor, 0.0);
        let name = loot.as_ref().map(|a| a.name.clone());
        if let Some(item) = loot {
            msg!(self.events, "You find {}.", item.name);
            self.events.push(Msg::Loot(item.name.clone()));
            self.state.inventory.add(item);
        }

        self.state.pos = p;
        self.reveal_around_player();
        Moved::Smashed { loot: name }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use world::{Biome, DecorKind, ItemStack, TileGrid};

    use super::*;

    fn field() -> Map {
        Map::new(
            MapId::zone(0, 0),
            "Field",
            TileGrid::new(10, 10, Tile::Grass),
            Biome::Grass,
            1,
        )
    }

    #[test]
    fn edge_entry_prefers_roads() {
        let mut map = field();
        assert_eq!(edge_entry(&map, ivec2(1, 0)), ivec2(0, 5));
        map.terrain.set(ivec2(0, 2), Tile::Path);
        assert_eq!(edge_entry(&map, ivec2(1, 0)), ivec2(0, 2));
        assert_eq!(edge_entry(&map, ivec2(0, -1)), ivec2(5, 9));
    }

    #[test]
    fn walls_and_npcs_stop_movement() {
        let mut map = field();
        map.terrain.set(ivec2(3, 2), Tile::Wall);
        map.spawn(
            "Villager",
            ivec2(1, 2),
            EntityKind::Npc(Default::default()),
        );
        let mut rt = Runtime::for_map(map, ivec2(2, 2));

        assert_eq!(rt.move_player(ivec2(1, 0)), Moved::Blocked);
        assert_eq!(rt.state.facing, ivec2(1, 0));
        assert_eq!(rt.move_player(ivec2(-1, 0)), Moved::Rejected);
        assert_eq!(rt.state.pos, ivec2(2, 2));
        assert_eq!(rt.move_player(ivec2(0, 1)), Moved::Walked);
        assert_eq!(rt.state.pos, ivec2(2, 3));
        assert_eq!(rt.state.counter("steps"), 1);
    }

    #[test]
    fn pickups() {
        let mut map = field();
        map.spawn(
            "Log",
            ivec2(3, 3),
            EntityKind::ItemDrop(ItemStack::one(LootItem::material(
                "Log", 1, 2,
            ))),
        );
        map.spawn(
            "gold",
            ivec2(3, 3),
            EntityKind::Collectible(Collectible::Gold(7)),
        );
        let mut rt = Runtime::for_map(map, ivec2(2, 3));

        let Moved::PickedUp(items) = rt.move_player(ivec2(1, 0)) else {
            panic!("nothing picked up");
        };
        assert_eq!(items.len(), 2);
        assert_eq!(rt.state.pos, ivec2(3, 3));
        assert_eq!(rt.state.inventory.count("Log"), 1);
        assert_eq!(rt.state.stats.gold, 7);
        assert!(rt.active_map().unwrap().entities.is_empty());
    }

    #[test]
    fn decor_smashing() {
        let mut map = field();
        map.spawn(
            "urn",
            ivec2(5, 5),
            EntityKind::Object(Object::Decor(DecorKind::Urn)),
        );
        map.spawn(
            "statue",
            ivec2(5, 6),
            EntityKind::Object(Object::Decor(DecorKind::Statue)),
        );
        let mut rt = Runtime::for_map(map, ivec2(4, 5));

        assert!(matches!(rt.move_player(ivec2(1, 0)), Moved::Smashed { .. }));
        assert_eq!(rt.state.pos, ivec2(5, 5));
        assert_eq!(rt.move_player(ivec2(0, 1)), Moved::Rejected);
        assert_eq!(rt.active_map().unwrap().entities.len(), 1);
    }

    #[test]
    fn world_edge_is_closed() {
        let mut rt = Runtime::for_map(field(), ivec2(0, 0));
        // Hand-built map has no neighbors.
        assert_eq!(rt.move_player(ivec2(-1, 0)), Moved::Blocked);
        assert_eq!(rt.state.pos, ivec2(0, 0));
    }

    #[test]
    fn waiting_passes_a_turn() {
        let mut rt = Runtime::for_map(field(), ivec2(5, 5));
        rt.state.stats.hp = 10;
        rt.execute(Action::Wait);
        rt.execute(Action::Wait);
        assert_eq!(rt.active_map().unwrap().tick, 2);
        assert_eq!(rt.state.pos, ivec2(5, 5));
        // Healing is the passive timer's job.
        assert_eq!(rt.state.stats.hp, 10);
    }
}
