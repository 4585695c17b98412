//! Ship Preview
//!
//! Assembles a ship from a scene, then reports what it would look like
//! turned to a new heading: mass, float height, seats, cannons, and what is
//! in the way at the landing spot.
//!
//! Run with: cargo run --bin ship_preview -- --yaw 90
//! A scene file is a JSON list of `{ "pos": [x, y, z], "state": "minecraft:..." }`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use glam::{IVec3, Vec3};
use serde::Deserialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use block_ships_engine::game::block::{BlockConfig, BlockFace, BlockState};
use block_ships_engine::game::config::ShipConfig;
use block_ships_engine::game::ship::{FloodFillDetector, ShipYard};
use block_ships_engine::physics::FloatRegime;
use block_ships_engine::world::{VoxelWorld, WorldAccess};

#[derive(Parser, Debug)]
#[command(name = "ship_preview", about = "Preview assembling and turning a block ship")]
struct Args {
    /// Scene to assemble from; a small demo boat when omitted
    #[arg(long)]
    scene: Option<PathBuf>,

    /// Block property table; the bundled one when omitted
    #[arg(long)]
    blocks: Option<PathBuf>,

    /// Ship configuration overrides
    #[arg(long)]
    config: Option<PathBuf>,

    /// Origin cell of the ship
    #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], default_values_t = [0, 1, 0], allow_hyphen_values = true)]
    origin: Vec<i32>,

    /// Direction the origin block faces
    #[arg(long, default_value = "north")]
    facing: String,

    /// Heading to preview, in degrees
    #[arg(long, default_value_t = 90.0, allow_hyphen_values = true)]
    yaw: f32,

    /// Where to land the ship, relative to the origin
    #[arg(long, num_args = 3, value_names = ["DX", "DY", "DZ"], default_values_t = [0, 0, 0], allow_hyphen_values = true)]
    shift: Vec<i32>,

    /// Height of the water surface
    #[arg(long, default_value_t = 62.0)]
    water_y: f32,

    /// Print the assembled model as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Deserialize)]
struct SceneBlock {
    pos: IVec3,
    state: BlockState,
}

fn demo_scene() -> Vec<SceneBlock> {
    let mut blocks = Vec::new();
    for x in -2..=2 {
        for z in -1..=2 {
            blocks.push(SceneBlock {
                pos: IVec3::new(x, 0, z),
                state: BlockState::new("oak_planks"),
            });
        }
    }
    let mut put = |pos: IVec3, state: BlockState| blocks.push(SceneBlock { pos, state });
    put(IVec3::new(0, 1, 0), BlockState::new("crafting_table"));
    put(IVec3::new(0, 1, 1), BlockState::new("oak_stairs").with_facing(BlockFace::North).with_property("half", "bottom"));
    put(IVec3::new(-2, 1, 2), BlockState::new("chest").with_facing(BlockFace::North));
    put(IVec3::new(1, 1, -1), BlockState::new("obsidian"));
    put(IVec3::new(2, 1, -1), BlockState::new("dispenser").with_facing(BlockFace::East));
    put(IVec3::new(-1, 1, -1), BlockState::new("torch"));
    blocks
}

fn vec3_arg(values: &[i32]) -> IVec3 {
    match values {
        [x, y, z] => IVec3::new(*x, *y, *z),
        _ => IVec3::ZERO,
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => ShipConfig::load(path)?,
        None => ShipConfig::default(),
    };
    let lookup = match &args.blocks {
        Some(path) => BlockConfig::load(path)?,
        None => BlockConfig::builtin()?,
    };
    let scene = match &args.scene {
        Some(path) => serde_json::from_str::<Vec<SceneBlock>>(&std::fs::read_to_string(path)?)?,
        None => demo_scene(),
    };
    let facing: BlockFace = args
        .facing
        .parse()
        .map_err(|_| format!("unknown facing `{}`", args.facing))?;
    let origin = vec3_arg(&args.origin);

    let mut world = VoxelWorld::new();
    for block in scene {
        world.set_block(block.pos, block.state);
    }
    info!(blocks = world.len(), "scene loaded");

    let detector = FloodFillDetector::new(&lookup, config.max_ship_size);
    let mut yard = ShipYard::new(config);
    let id = yard.assemble(&mut world, &detector, &lookup, origin, facing)?;
    let landing = origin + vec3_arg(&args.shift);
    yard.move_ship(id, landing, args.yaw)?;

    let float_y = yard.float_height(id, args.water_y)?;
    let conflicts = yard.preview_disassembly(&world, id)?;
    let Some(ship) = yard.ship(id) else {
        return Err("assembled ship vanished from the yard".into());
    };
    let model = &ship.model;
    let buoyancy = model.buoyancy(yard.config());

    println!("=== Ship {id} ===");
    println!("cells:            {}", model.len());
    println!("total mass:       {} over {} cells", model.total_mass(), model.massed_cell_count());
    println!("center of volume: {:?}", model.center_of_volume());
    println!("height:           {}..={}", model.min_y(), model.max_y());
    println!("max health:       {} (+{}/s)", model.max_health(), model.health_regen_per_second());
    let regime = match buoyancy.regime() {
        FloatRegime::Airship => "airship",
        FloatRegime::Floating => "floating",
        FloatRegime::Sinking => "sits low",
        FloatRegime::Unweighted => "unweighted",
    };
    println!("buoyancy:         offset {:.3}, {regime}", model.buoyancy_offset());
    println!("float origin y:   {float_y:.3} on water at {}", args.water_y);
    println!("heading:          {} ({} deg)", ship.facing(), ship.yaw);
    for seat in model.seats() {
        let role = if seat.is_driver { "driver" } else { "passenger" };
        println!("seat:             {role} at {:?} (cell {})", seat.offset, seat.cell_index);
    }
    for cannon in model.cannons() {
        println!(
            "cannon:           facing {} muzzle {:?} (cells {} <- {})",
            cannon.facing, cannon.muzzle_offset, cannon.firing_cell_index, cannon.anchor_cell_index
        );
    }
    if let Some(bounds) = model.colliders(ship.yaw).bounds() {
        println!("collider bounds:  {:?}..{:?}", bounds.min, bounds.max);
        // look straight down onto the origin from above the hull
        let eye = landing.as_vec3() + Vec3::new(0.0, bounds.max.y + 8.0, 0.0);
        match yard.pick_cell(id, eye, Vec3::NEG_Y, bounds.max.y - bounds.min.y + 16.0)? {
            Some(hit) => println!(
                "top above origin: cell {} ({}) at {:?}",
                hit.cell_index,
                model.cell(hit.cell_index).map_or("?", |cell| cell.state.material()),
                hit.position
            ),
            None => println!("top above origin: nothing solid"),
        }
    }
    println!(
        "landing at {landing}: {} fragile, {} hard conflicts{}",
        conflicts.fragile,
        conflicts.hard,
        if conflicts.is_clear() { " (clear)" } else { "" }
    );

    if args.json {
        println!("{}", model.to_json()?);
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .without_time()
        .compact()
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "ship preview failed");
            ExitCode::FAILURE
        }
    }
}
