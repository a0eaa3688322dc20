//! Interactions with things in the world, quests and secrets.

use world::{
    scaling, Chest, Condition, Data, EntityId, EntityKind, NpcRole, Object,
    Objective, Quest, Resource,
};

use crate::{
    loot::{self, LootSource},
    msg, Interaction, Msg, QuestProgress, Runtime, WorldState,
};

/// Whether a condition currently holds for the world state.
pub fn condition_holds(state: &WorldState, c: &Condition) -> bool {
    match c {
        Condition::Flag(f) => state.flags.contains(f),
        Condition::Counter(name, n) => state.counter(name) >= *n,
        Condition::Bestiary(n) => state.bestiary.len() >= *n,
        Condition::WorldTier(t) => state.world_tier >= *t,
        Condition::MapsVisited(n) => state.visited.len() >= *n,
    }
}

/// Progress towards the quest objective, `(have, need)`.
pub fn quest_progress(
    state: &WorldState,
    quest: &Quest,
    progress: &QuestProgress,
) -> (u32, u32) {
    match &quest.objective {
        Objective::Kill { count, .. } => {
            (progress.progress.min(*count), *count)
        }
        Objective::Collect { item, count } => {
            (state.inventory.count(item).min(*count), *count)
        }
    }
}

impl Runtime {
    /// Record newly satisfied secrets.
    pub(crate) fn check_secrets(&mut self) {
        for secret in &Data::get().secrets {
            if self.state.secrets.contains(&secret.id)
                || !condition_holds(&self.state, &secret.condition)
            {
                continue;
            }
            self.state.secrets.insert(secret.id.clone());
            self.state.stats.gold += secret.reward_gold;
            log::info!("secret found: {}", secret.id);
            msg!(self.events, "Secret found: {}!", secret.name);
            self.events.push(Msg::SecretFound(secret.name.clone()));
        }
    }

    pub(crate) fn resolve_interaction(&mut self) -> Interaction {
        let target = self.state.pos + self.state.facing;
        let usable = |e: &&world::Entity| {
            e.blocks_movement()
                || matches!(e.kind, EntityKind::Object(Object::Link(_)))
        };
        let Some(e) = self
            .active_map()
            .and_then(|m| m.entities_at(target).find(usable))
        else {
            return Interaction::Nothing;
        };
        let (id, name, kind) = (e.id, e.name.clone(), e.kind.clone());

        match kind {
            EntityKind::Object(Object::Chest(chest)) => {
                self.open_chest(id, chest)
            }
            EntityKind::Object(Object::Link(link)) => {
                Interaction::Traveled(self.follow_link(link))
            }
            EntityKind::Object(Object::Shrine) => {
                self.state.stats.hp = self.state.max_hp();
                if self.state.map.is_zone() {
                    self.state.waypoints.insert(self.state.map);
                }
                msg!(self.events, "The shrine restores you.");
                Interaction::Healed
            }
            EntityKind::Object(Object::FishingSpot) => self.fish(),
            EntityKind::Object(Object::Station(s)) => Interaction::Station(s),
            EntityKind::Npc(npc) if npc.role == NpcRole::Elder => {
                self.talk_to_elder(name, npc.greeting)
            }
            EntityKind::Npc(npc) => {
                msg!(self.events, "{name}: \"{}\"", npc.greeting);
                Interaction::Talked {
                    name,
                    greeting: npc.greeting,
                }
            }
            _ => Interaction::Nothing,
        }
    }

    fn open_chest(&mut self, id: EntityId, chest: Chest) -> Interaction {
        if chest.looted {
            return Interaction::Empty;
        }
        if let Some(lock) = chest.lock {
            if !self.state.inventory.has_key_for(lock) {
                msg!(self.events, "The chest is locked.");
                return Interaction::Locked;
            }
        }

        let level = chest.level.max(1);
        let mut items = Vec::new();
        let locked = chest.lock.is_some();
        if let Some(item) = loot::generate(&mut self.rng, level, locked, 0.0) {
            items.push(item);
        }
        if let Some(item) =
            loot::roll(&mut self.rng, level, LootSource::Chest, 0.0)
        {
            items.push(item);
        }
        let gold = scaling::gold(2.0, level);

        if let Some(Object::Chest(c)) = self
            .registry
            .get_mut(self.state.map)
            .and_then(|m| m.entity_mut(id))
            .and_then(|e| match &mut e.kind {
                EntityKind::Object(o) => Some(o),
                _ => None,
            })
        {
            c.looted = true;
        }

        let names: Vec<String> = items.iter().map(|a| a.name.clone()).collect();
        for item in items {
            self.events.push(Msg::Loot(item.name.clone()));
            self.state.inventory.add(item);
        }
        self.state.stats.gold += gold;
        self.state.bump("chests", 1);
        msg!(self.events, "You open the chest and find {gold} gold.");
        log::info!("opened chest {id}: {names:?}");

        Interaction::Looted { items: names, gold }
    }

    fn fish(&mut self) -> Interaction {
        let skill = self.state.skills.fishing.level;
        let Some(item) = loot::material(&mut self.rng, Resource::Fish, skill)
        else {
            log::warn!("no fish materials defined");
            return Interaction::Nothing;
        };
        let name = item.name.clone();
        self.gather(Resource::Fish, item);
        Interaction::Fished(name)
    }

    /// Hand out quests in order and take in finished ones.
    fn talk_to_elder(&mut self, name: String, greeting: String) -> Interaction {
        let data = Data::get();

        if let Some(progress) = self.state.quest.clone() {
            let Some(quest) = data.quest(&progress.id) else {
                log::warn!("active quest {:?} is not in the data", progress.id);
                self.state.quest = None;
                return Interaction::Nothing;
            };

            let (have, need) = quest_progress(&self.state, quest, &progress);
            if have < need {
                msg!(self.events, "{name}: \"{}: {have}/{need}.\"", quest.name);
                return Interaction::QuestInProgress {
                    id: quest.id.clone(),
                    progress: have,
                    needed: need,
                };
            }

            if let Objective::Collect { item, count } = &quest.objective {
                self.state.inventory.remove(item, *count);
            }
            self.state.quest = None;
            self.state.completed_quests.insert(quest.id.clone());
            self.state.stats.gold += quest.reward_gold;
            self.grant_xp(quest.reward_xp);

            log::info!("quest {} completed", quest.id);
            msg!(self.events, "Quest complete: {}.", quest.name);
            self.events.push(Msg::QuestCompleted(quest.name.clone()));
            return Interaction::QuestCompleted(quest.id.clone());
        }

        let Some(quest) = data
            .quests
            .iter()
            .find(|q| !self.state.completed_quests.contains(&q.id))
        else {
            msg!(self.events, "{name}: \"{greeting}\"");
            return Interaction::Talked { name, greeting };
        };

        self.state.quest = Some(QuestProgress {
            id: quest.id.clone(),
            progress: 0,
        });
        log::info!("quest {} accepted", quest.id);
        msg!(self.events, "New quest: {}.", quest.name);
        self.events.push(Msg::QuestAccepted(quest.name.clone()));
        Interaction::QuestOffered(quest.id.clone())
    }
}

#[cfg(test)]
mod tests {
    use glam::ivec2;
    use world::{Biome, LootItem, Map, MapId, Npc, Station, TileGrid, Tile};

    use super::*;

    fn runtime_with(kind: EntityKind) -> Runtime {
        let mut map = Map::new(
            MapId::zone(0, 0),
            "Square",
            TileGrid::new(8, 8, Tile::Cobble),
            Biome::Grass,
            0,
        );
        map.spawn("thing", ivec2(3, 2), kind);
        let mut rt = Runtime::for_map(map, ivec2(2, 2));
        rt.state.facing = ivec2(1, 0);
        rt
    }

    #[test]
    fn conditions() {
        let mut s = WorldState::new(MapId::zone(0, 0), ivec2(0, 0));
        assert!(!condition_holds(&s, &Condition::Flag("x".into())));
        s.flags.insert("x".into());
        assert!(condition_holds(&s, &Condition::Flag("x".into())));

        s.bump("kills", 9);
        assert!(!condition_holds(&s, &Condition::Counter("kills".into(), 10)));
        s.bump("kills", 1);
        assert!(condition_holds(&s, &Condition::Counter("kills".into(), 10)));

        assert!(condition_holds(&s, &Condition::WorldTier(0)));
        assert!(!condition_holds(&s, &Condition::WorldTier(1)));
    }

    #[test]
    fn secrets_are_found_once() {
        let mut rt = runtime_with(EntityKind::Object(Object::Shrine));
        rt.state.bump("kills", 1);
        rt.check_secrets();
        let gold = rt.state.stats.gold;
        assert!(rt.state.secrets.contains("first-blood"));
        rt.check_secrets();
        assert_eq!(rt.state.stats.gold, gold);
        let found = rt
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, Msg::SecretFound(_)))
            .count();
        assert_eq!(found, 1);
    }

    #[test]
    fn shrine_heals() {
        let mut rt = runtime_with(EntityKind::Object(Object::Shrine));
        rt.state.stats.hp = 3;
        assert_eq!(rt.interact(), Interaction::Healed);
        assert_eq!(rt.state.stats.hp, rt.state.max_hp());
        assert!(rt.state.waypoints.contains(&MapId::zone(0, 0)));
    }

    #[test]
    fn stations_and_nothing() {
        let mut rt =
            runtime_with(EntityKind::Object(Object::Station(Station::Anvil)));
        assert_eq!(rt.interact(), Interaction::Station(Station::Anvil));
        rt.state.facing = ivec2(-1, 0);
        assert_eq!(rt.interact(), Interaction::Nothing);
    }

    #[test]
    fn unlocked_chest_opens_once() {
        let mut rt = runtime_with(EntityKind::Object(Object::Chest(Chest {
            lock: None,
            looted: false,
            level: 3,
        })));
        let Interaction::Looted { items, gold } = rt.interact() else {
            panic!("chest didn't open");
        };
        assert!(!items.is_empty());
        assert!(gold > 0);
        assert_eq!(rt.interact(), Interaction::Empty);
    }

    #[test]
    fn fishing_trains_skill() {
        let mut rt = runtime_with(EntityKind::Object(Object::FishingSpot));
        for _ in 0..30 {
            assert!(matches!(rt.interact(), Interaction::Fished(_)));
        }
        assert!(rt.state.skills.fishing.level > 0);
        assert_eq!(rt.state.counter("harvest:fish"), 30);
    }

    #[test]
    fn elder_quest_cycle() {
        let mut rt = runtime_with(EntityKind::Npc(Npc {
            role: NpcRole::Elder,
            greeting: "Hello.".into(),
        }));
        let first = Data::get().quests[0].clone();

        assert_eq!(rt.interact(), Interaction::QuestOffered(first.id.clone()));
        assert!(matches!(
            rt.interact(),
            Interaction::QuestInProgress { progress: 0, .. }
        ));

        // Finish the objective by hand.
        match &first.objective {
            Objective::Kill { count, .. } => {
                rt.state.quest.as_mut().unwrap().progress = *count;
            }
            Objective::Collect { item, count } => {
                for _ in 0..*count {
                    rt.state.inventory.add(LootItem::material(item, 1, 1));
                }
            }
        }
        let gold = rt.state.stats.gold;
        assert_eq!(
            rt.interact(),
            Interaction::QuestCompleted(first.id.clone())
        );
        assert_eq!(rt.state.stats.gold, gold + first.reward_gold);
        assert!(rt.state.completed_quests.contains(&first.id));
        assert!(rt.state.quest.is_none());

        // Next one comes up.
        assert_eq!(
            rt.interact(),
            Interaction::QuestOffered(Data::get().quests[1].id.clone())
        );
    }
}
