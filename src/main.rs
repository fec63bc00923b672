//! Arena Sim headless runner
//!
//! Builds a skirmish from the config, runs it for the configured number of
//! frames and logs what happened.

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use std::path::PathBuf;

    use arena_sim::SimConfig;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => SimConfig::load(&path)?,
        None => {
            log::info!("No config given, using defaults");
            SimConfig::default()
        }
    };
    runner::run(&config);
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // the simulation is driven by the embedding host on the web
}

#[cfg(not(target_arch = "wasm32"))]
mod runner {
    use std::f64::consts::{PI, TAU};

    use arena_sim::sim::{BodyTag, TeamId, TickInput, World, WorldEvent, tick};
    use arena_sim::{SimConfig, unit_vector};
    use glam::DVec2;

    const PALETTE: [(&str, [f32; 4]); 4] = [
        ("Red", [0.89, 0.0, 0.01, 1.0]),
        ("Blue", [0.1, 0.4, 1.0, 1.0]),
        ("Green", [0.0, 0.58, 0.07, 1.0]),
        ("Gold", [1.0, 0.8, 0.2, 1.0]),
    ];

    /// Teams start evenly spaced on a ring around the map centre, facing in
    fn build_skirmish(config: &SimConfig) -> (World, Vec<TeamId>) {
        let mut world = World::from_config(config);
        let layout = &config.skirmish;
        let center = config.map_size * 0.5;
        let ring = config.map_size.min_element() * 0.4;
        let team_count = layout.teams.max(1);

        let mut teams = Vec::with_capacity(team_count as usize);
        for t in 0..team_count {
            let (name, color) = PALETTE[t as usize % PALETTE.len()];
            let team = world.add_team(name, color);
            teams.push(team);

            let angle = TAU * f64::from(t) / f64::from(team_count);
            let home = center + unit_vector(angle) * ring;
            let facing = angle + PI;
            let side = unit_vector(angle + PI / 2.0);
            for s in 0..layout.ships_per_team {
                let offset = (f64::from(s) - f64::from(layout.ships_per_team.saturating_sub(1)) * 0.5) * 60.0;
                world.spawn_ship(team, home + side * offset, facing);
            }
        }

        if layout.portal {
            world.spawn_portal(center, false, false);
        }
        (world, teams)
    }

    pub fn run(config: &SimConfig) {
        let (mut world, teams) = build_skirmish(config);
        log::info!(
            "Starting skirmish: {} teams, {} ships, {} frames at dt={:.4}",
            teams.len(),
            world.count_tag(BodyTag::Ship),
            config.frames,
            config.dt
        );

        let input = TickInput::default();
        let dx = config.dx();
        let mut explosions = 0usize;
        let mut destroyed = 0usize;
        let mut bounty = 0u32;
        let mut announcements = 0usize;
        for _ in 0..config.frames {
            tick(&mut world, &input, config.dt, dx);
            for event in world.drain_events() {
                match event {
                    WorldEvent::Explosion { .. } => explosions += 1,
                    WorldEvent::ShipDestroyed { bounty: b, .. } => {
                        destroyed += 1;
                        bounty += b;
                    }
                    WorldEvent::Announcement(msg) => {
                        announcements += 1;
                        log::info!("{}", msg);
                    }
                    WorldEvent::ShipEnteredPortal { .. } | WorldEvent::LevelFinished { .. } => {}
                }
            }
            world.drain_notifications();
        }

        for team in &teams {
            let alive = world.ships().filter(|b| b.team == Some(*team)).count();
            let name = world.teams.get(*team).map_or("?", |t| t.name.as_str());
            log::info!("{}: {} ships alive", name, alive);
        }
        log::info!(
            "Frame {}: {} bullets in flight, {} ships destroyed ({} bounty), {} explosions, {} announcements",
            world.frame,
            world.count_tag(BodyTag::Bullet),
            destroyed,
            bounty,
            explosions,
            announcements
        );
    }
}
