use anyhow::bail;
use glam::{ivec2, IVec2};
use serde::{Deserialize, Serialize};
use util::{srng, GameRng, Logos};
use world::{
    EntityKind, EquipSlot, Map, MapId, Object, Overworld, WorldRegistry,
    OVERWORLD_SIZE, ZONE_HEIGHT, ZONE_WIDTH,
};

use crate::{
    msg, Exploration, Msg, Perk, WorldState, DEFEAT_GOLD_DIVISOR,
    REVEAL_RADIUS, VISION_PERK_BONUS,
};

/// Parameters for starting a new game.
#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct WorldSpec {
    /// Seed for all world generation.
    pub seed: Logos,
    /// Width and height of the overworld in zones.
    pub overworld_size: i32,
}

impl Default for WorldSpec {
    fn default() -> Self {
        WorldSpec {
            seed: Logos::new("WILDMARK"),
            overworld_size: OVERWORLD_SIZE,
        }
    }
}

/// Main data container for game engine runtime.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Runtime {
    pub registry: WorldRegistry,
    pub state: WorldState,
    pub(crate) rng: GameRng,
    #[serde(skip)]
    pub(crate) events: Vec<Msg>,
}

/// Where the player shows up in town.
pub fn town_center() -> IVec2 {
    ivec2(ZONE_WIDTH / 2, ZONE_HEIGHT / 2)
}

impl Runtime {
    pub fn new(spec: &WorldSpec) -> anyhow::Result<Self> {
        if spec.overworld_size < 1 {
            bail!("Bad overworld size {}", spec.overworld_size);
        }

        let overworld = Overworld::generate(
            &mut srng(&spec.seed),
            spec.overworld_size,
            spec.overworld_size,
        );
        let town = overworld.town;
        let mut registry = WorldRegistry::new(spec.seed.clone(), overworld);

        let Some(map) = registry.get_or_generate(town) else {
            bail!("Overworld has no town zone {town}");
        };
        let Some(pos) = map.nearest_free(town_center()) else {
            bail!("No room for the player in {}", map.name);
        };
        log::info!("new world {:?}, starting at {town} {pos}", spec.seed);

        let mut ret = Runtime {
            registry,
            state: WorldState::new(town, pos),
            rng: srng(&(&spec.seed, "runtime")),
            events: Vec::new(),
        };
        ret.arrive(town, pos);
        Ok(ret)
    }

    /// Take the events produced since the last call.
    pub fn drain_events(&mut self) -> Vec<Msg> {
        std::mem::take(&mut self.events)
    }

    /// The map the player is on.
    pub fn active_map(&self) -> Option<&Map> {
        self.registry.get(self.state.map)
    }

    pub fn exploration(&self) -> &Exploration {
        &self.state.exploration
    }

    pub fn vision_radius(&self) -> i32 {
        if self.state.has_perk(Perk::EagleEye) {
            REVEAL_RADIUS + VISION_PERK_BONUS
        } else {
            REVEAL_RADIUS
        }
    }

    /// Reveal the surroundings of the player, interiors are revealed all at
    /// once.
    pub(crate) fn reveal_around_player(&mut self) -> bool {
        let id = self.state.map;
        let Some(dim) = self.registry.get(id).map(|m| m.dim()) else {
            return false;
        };
        if id.is_interior() {
            self.state.exploration.reveal_all(id, dim);
            true
        } else {
            let r = self.vision_radius();
            self.state
                .exploration
                .reveal_area(id, dim, self.state.pos, r)
        }
    }

    /// Put the player on a map that is already in the registry.
    pub(crate) fn arrive(&mut self, map: MapId, pos: IVec2) {
        self.state.map = map;
        self.state.pos = pos;
        if self.state.visited.insert(map) {
            log::info!("first visit to {map}");
        }
        if map.is_zone() {
            self.state.waypoints.insert(map);
        }
        self.reveal_around_player();
        self.events.push(Msg::Entered(map));
    }

    /// Knock-out handling, the player wakes up in town.
    pub(crate) fn check_defeat(&mut self) -> bool {
        if self.state.is_alive() {
            return false;
        }

        let town = self.registry.overworld.town;
        let Some(pos) = self
            .registry
            .get_or_generate(town)
            .and_then(|m| m.nearest_free(town_center()))
        else {
            log::warn!("no room in town for the defeated player");
            return false;
        };

        let lost = self.state.stats.gold / DEFEAT_GOLD_DIVISOR;
        self.state.stats.gold -= lost;
        self.state.stats.hp = self.state.max_hp();
        log::info!("player defeated, lost {lost} gold");

        msg!(self.events, "You black out and wake up in town.");
        self.events.push(Msg::Defeated);
        self.arrive(town, pos);
        true
    }

    /// Passive healing tick.
    pub fn regenerate(&mut self) {
        if !self.state.is_alive() {
            return;
        }
        let amount = 1 + self.state.effective_stats().regen.max(0);
        self.state.set_hp(self.state.stats.hp + amount);
    }

    /// Move the time of day forward.
    pub fn advance_clock(&mut self, minutes: u32) {
        self.state.clock = (self.state.clock + minutes % 1440) % 1440;
    }

    /// Fast travel to a known waypoint zone.
    pub fn travel(&mut self, to: MapId) -> bool {
        if !self.state.waypoints.contains(&to) {
            log::warn!("travel to unknown waypoint {to}");
            return false;
        }
        let Some(pos) = self
            .registry
            .get_or_generate(to)
            .and_then(|m| m.nearest_free(town_center()))
        else {
            log::warn!("no room at waypoint {to}");
            return false;
        };
        self.state.anims.clear();
        self.arrive(to, pos);
        true
    }

    /// Equip an item from the inventory, the displaced item goes back into
    /// the inventory.
    pub fn equip(&mut self, index: usize) -> bool {
        let Some(slot) = self
            .state
            .inventory
            .iter()
            .nth(index)
            .filter(|s| s.item.is_equipment())
            .and_then(|s| s.item.slot)
        else {
            return false;
        };
        let Some(item) = self.state.inventory.take(index) else {
            return false;
        };

        msg!(self.events, "You equip the {}.", item.name);
        if let Some(old) = self.state.equipment.insert(slot, item) {
            self.state.inventory.add(old);
        }
        self.state.set_hp(self.state.stats.hp);
        true
    }

    pub fn unequip(&mut self, slot: EquipSlot) -> bool {
        let Some(item) = self.state.equipment.shift_remove(&slot) else {
            return false;
        };
        msg!(self.events, "You take off the {}.", item.name);
        self.state.inventory.add(item);
        self.state.set_hp(self.state.stats.hp);
        true
    }

    /// Text picture of the active map as the player knows it.
    ///
    /// Unexplored cells are blank.
    pub fn render_ascii(&self) -> String {
        let Some(map) = self.active_map() else {
            return String::new();
        };
        render_map(
            map,
            |p| self.state.exploration.is_revealed(map.id, p),
            Some(self.state.pos),
        )
    }
}

/// Draw a map as text with entities on top of terrain.
///
/// Cells for which `is_visible` is false are left blank.
pub fn render_map(
    map: &Map,
    is_visible: impl Fn(IVec2) -> bool,
    player: Option<IVec2>,
) -> String {
    let dim = map.dim();
    let mut ret = String::with_capacity(((dim.x + 1) * dim.y) as usize);
    for y in 0..dim.y {
        for x in 0..dim.x {
            let p = ivec2(x, y);
            let c = if !is_visible(p) {
                ' '
            } else if Some(p) == player {
                '@'
            } else if let Some(c) = map.entities_at(p).find_map(glyph) {
                c
            } else {
                map.tile(p).map_or(' ', char::from)
            };
            ret.push(c);
        }
        ret.push('\n');
    }
    ret
}

/// Map symbol for an entity, `None` shows the terrain instead.
fn glyph(e: &world::Entity) -> Option<char> {
    match &e.kind {
        EntityKind::Enemy(m) => {
            let c = m.template.chars().next()?;
            Some(if m.is_boss {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            })
        }
        EntityKind::Spawner(_) => Some('Q'),
        EntityKind::Npc(_) => Some('h'),
        EntityKind::ItemDrop(_) => Some('['),
        EntityKind::Collectible(_) => Some('$'),
        EntityKind::Object(o) => match o {
            Object::Chest(_) => Some('C'),
            Object::Link(l) if l.kind == world::LinkKind::Portal => Some('O'),
            Object::Link(_) => None,
            Object::Decor(_) => Some('"'),
            Object::Station(_) => Some('_'),
            Object::Shrine => Some('^'),
            Object::FishingSpot => Some('!'),
        },
    }
}

#[cfg(test)]
impl Runtime {
    /// Session that starts on a hand-built map.
    pub(crate) fn for_map(map: Map, pos: IVec2) -> Self {
        let seed = Logos::new("TEST");
        let overworld = Overworld::generate(&mut srng(&seed), 3, 3);
        let id = map.id;
        let mut registry = WorldRegistry::new(seed.clone(), overworld);
        registry.get_or_insert_with(id, |_| map);
        Runtime {
            registry,
            state: WorldState::new(id, pos),
            rng: srng(&seed),
            events: Vec::new(),
        }
    }
}
