use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use engine::{prelude::*, render_map};
use rand::{seq::SliceRandom, Rng};
use tracing_subscriber::EnvFilter;
use util::{srng, Logos};
use world::{dungeon, Data, DungeonSpec, OVERWORLD_SIZE};

pub const GAME_NAME: &str = "wildmark";

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    #[arg(long, value_parser = |e: &str| Ok::<Logos, &str>(Logos::new(e)), help = "Game world seed")]
    seed: Option<Logos>,

    #[arg(long, help = "Overworld width and height in zones", default_value_t = OVERWORLD_SIZE)]
    size: i32,

    #[arg(long, help = "Content tables IDM file to use instead of the built-in ones")]
    data: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Print the overworld zone layout.
    Overworld,
    /// Print a generated zone map.
    Zone { x: i32, y: i32 },
    /// Print the dungeon under a zone.
    Dungeon {
        x: i32,
        y: i32,
        #[arg(long, default_value_t = 1)]
        level: u32,
        #[arg(long, default_value_t = 0)]
        tier: u32,
    },
    /// Print the built-in content tables as IDM.
    Data,
    /// Run a session with random player input.
    Walk {
        #[arg(long, default_value_t = 200)]
        turns: usize,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Some(path) = &args.data {
        world::register_data_from(path)?;
    }

    let seed = args
        .seed
        .clone()
        .unwrap_or_else(|| Logos::sample(&mut rand::thread_rng(), 10));
    log::info!("seed: {seed}");

    let spec = WorldSpec {
        seed: seed.clone(),
        overworld_size: args.size,
    };
    let mut rt = Runtime::new(&spec)?;

    match args.cmd {
        Cmd::Overworld => {
            println!("{}", rt.registry.overworld);
        }
        Cmd::Zone { x, y } => {
            let id = MapId::zone(x, y);
            let map = rt
                .registry
                .get_or_generate(id)
                .with_context(|| format!("No zone at {x},{y}"))?;
            println!("{} ({id}, difficulty {})", map.name, map.difficulty);
            print!("{}", render_map(map, |_| true, None));
        }
        Cmd::Dungeon { x, y, level, tier } => {
            let zone = MapId::zone(x, y);
            let map = rt
                .registry
                .get_or_generate(zone)
                .with_context(|| format!("No zone at {x},{y}"))?;
            let entry = map
                .find_tile(Tile::DungeonEntrance)
                .unwrap_or(engine::town_center());
            let spec = DungeonSpec {
                id: MapId::Dungeon {
                    zone: zone.zone_pos(),
                    entry,
                },
                zone_name: map.name.clone(),
                zone_difficulty: map.difficulty,
                kind: map.biome.dungeon_kind(),
                parent: zone,
                entry,
                player_level: level,
                world_tier: tier,
            };
            let map = rt.registry.get_or_insert_with(spec.id, |rng| {
                dungeon::generate_dungeon(rng, &spec)
            });
            println!("{} (floor level {})", map.name, spec.floor_level());
            print!("{}", render_map(map, |_| true, None));
        }
        Cmd::Data => {
            print!("{}", idm::to_string(Data::get())?);
        }
        Cmd::Walk { turns } => walk(&mut rt, &seed, turns),
    }

    Ok(())
}

/// Drive the runtime with random commands and print what happens.
fn walk(rt: &mut Runtime, seed: &Logos, turns: usize) {
    let mut rng = srng(&(seed, "walk"));

    for turn in 0..turns {
        let action = match rng.gen_range(0..10) {
            0 => Action::Attack,
            1 => Action::Interact,
            _ => Action::Move(*DIR_8.choose(&mut rng).unwrap_or(&DIR_8[0])),
        };
        rt.execute(action);

        if turn % 10 == 9 {
            rt.regenerate();
            rt.advance_clock(10);
        }

        for msg in rt.drain_events() {
            match msg {
                Msg::Message(text) => println!("{text}"),
                Msg::Entered(id) => {
                    let name = rt
                        .active_map()
                        .map_or("somewhere", |m| m.name.as_str());
                    println!("-- {name} ({id})");
                }
                _ => {}
            }
        }
    }

    let s = &rt.state;
    println!();
    print!("{}", rt.render_ascii());
    println!(
        "level {}  hp {}/{}  gold {}  tier {}  maps {}  kills {}",
        s.stats.level,
        s.stats.hp,
        s.max_hp(),
        s.stats.gold,
        s.world_tier,
        s.visited.len(),
        s.counter("kills"),
    );
}
