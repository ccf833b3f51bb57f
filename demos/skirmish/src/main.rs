//! skirmish: a handful of agents diving for cover on a small voxel map.
//!
//! Half the squad runs the area search (`move_to_cover`), the other half
//! the path-projected search (`take_cover`), all against one shooter at the
//! east edge.  Pillars are scattered from a fixed seed so runs repeat.
//!
//! ```text
//! cargo run -p skirmish -- [config.json]
//! RUST_LOG=tc_task=debug cargo run -p skirmish
//! ```

use std::fs;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tc_core::{AgentId, CoverConfig, SimRng, Tick, Vec3};
use tc_sim::{SimBuilder, SimObserver};
use tc_task::{Task, TaskStatus, Threat};
use tc_world::{GridPathfinder, VoxelGrid};

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:          u64 = 7;
const WALL_HEIGHT:   i32 = 3;
const PILLARS:       usize = 12;
const PATH_LATENCY:  u64 = 2;
const MAX_TICKS:     u64 = 600;

/// 32 × 12 yard: a broken wall line, a few low walls, and open ground to
/// the east where the shooter stands.
const MAP: &str = "\
................................
.........#......................
.........#.........=............
.........#.........=............
................................
.....==.........................
................................
.........#..........#...........
.........#..........#...........
.........#......................
.....................===........
................................";

const SHOOTER: Vec3 = Vec3 { x: 30.5, y: 0.0, z: 5.5 };

// ── Observer ──────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Scoreboard {
    in_cover: usize,
    failed:   usize,
    purges:   usize,
}

impl SimObserver for Scoreboard {
    fn on_task_finished(&mut self, tick: Tick, agent: AgentId, task: &str, status: TaskStatus) {
        match status {
            TaskStatus::Done => self.in_cover += 1,
            _ => self.failed += 1,
        }
        println!("  {tick}  {agent}  {task:<14} {status}");
    }

    fn on_purge(&mut self, _tick: Tick, removed: usize) {
        self.purges += removed;
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn load_config() -> Result<CoverConfig> {
    let Some(path) = std::env::args().nth(1) else {
        return Ok(CoverConfig::default());
    };
    let text = fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    let config: CoverConfig = serde_json::from_str(&text).with_context(|| format!("parsing {path}"))?;
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = load_config()?;
    config.validate()?;

    // 1. World.
    let mut grid = VoxelGrid::from_ascii(MAP, WALL_HEIGHT)?;
    let mut rng = SimRng::new(SEED);
    grid.scatter_pillars(&mut rng, (12, 1), (24, 10), PILLARS, 2);
    let grid = Arc::new(grid);
    info!(voxels = grid.len(), "world built");

    // 2. Squad on the west side, spread over the rows.
    let spawns = [
        Vec3::new(2.5, 0.0, 1.5),
        Vec3::new(3.5, 0.0, 4.5),
        Vec3::new(2.5, 0.0, 6.5),
        Vec3::new(3.5, 0.0, 9.5),
    ];
    let mut builder = SimBuilder::new(config.clone(), grid.clone(), GridPathfinder::new(grid, PATH_LATENCY));
    for (i, &pos) in spawns.iter().enumerate() {
        builder = builder.spawn(pos).threat(AgentId(i as u32), Threat::new(SHOOTER));
    }
    let mut sim = builder.build()?;

    // 3. Tasks.
    for i in 0..spawns.len() {
        let agent = AgentId(i as u32);
        let task = if i % 2 == 0 {
            Task::from_name("move_to_cover", &config, [("self_distance", "0,12"), ("target_distance", "6,40")])?
        } else {
            Task::from_name("take_cover", &config, std::iter::empty::<(&str, &str)>())?
        };
        let task = task.context("unknown task name")?;
        println!("{agent}: {}", task.name());
        sim.assign_task(agent, task)?;
    }

    // 4. Run.
    println!();
    println!("=== skirmish: {} agents, shooter at {SHOOTER} ===", spawns.len());
    let mut board = Scoreboard::default();
    let t0 = Instant::now();
    let ticks = sim.run_until_idle(MAX_TICKS, &mut board);

    println!();
    println!("ran {ticks} ticks ({}) in {:.2?}", sim.clock, t0.elapsed());
    println!("in cover: {}  failed: {}  still running: {}", board.in_cover, board.failed, sim.active_tasks());
    println!("cover table: {} entries, {} held, {} purged", sim.table.len(), sim.table.holder_count(), board.purges);
    for agent in &sim.agents {
        let cover = sim.table.cover_for(agent.id).map(|c| c.position.to_string());
        println!("  {:<12} at {}  cover {}", agent.id.to_string(), agent.position, cover.as_deref().unwrap_or("-"));
    }
    Ok(())
}
