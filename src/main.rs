//! Space Rocks headless runner
//!
//! Plays one autopiloted match with logging collaborators and prints the
//! final standings as JSON.
//!
//! ```text
//! space-rocks [--players N] [--seconds S] [--config FILE] [--seed N] [--unpaced]
//! ```

use std::error::Error;
use std::time::Instant;

use space_rocks::Settings;
use space_rocks::audio::{LogAudio, play_events};
use space_rocks::platform::{FrameClock, InputSource, Renderer};
use space_rocks::sim::{Arcade, ArcadeStatus, FrameInput, Snapshot};

/// Command line options
#[derive(Debug, Default)]
struct Options {
    players: Option<u32>,
    seconds: Option<u64>,
    config: Option<String>,
    seed: Option<u64>,
    unpaced: bool,
}

impl Options {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, String> {
        let mut options = Options::default();
        while let Some(arg) = args.next() {
            let mut value = |name: &str| args.next().ok_or(format!("{name} needs a value"));
            match arg.as_str() {
                "--players" => {
                    let n = value("--players")?;
                    options.players = Some(n.parse().map_err(|_| format!("bad player count: {n}"))?)
                }
                "--seconds" => {
                    let s = value("--seconds")?;
                    options.seconds = Some(s.parse().map_err(|_| format!("bad seconds: {s}"))?)
                }
                "--config" => options.config = Some(value("--config")?),
                "--seed" => {
                    let s = value("--seed")?;
                    options.seed = Some(s.parse().map_err(|_| format!("bad seed: {s}"))?)
                }
                "--unpaced" => options.unpaced = true,
                other => return Err(format!("unknown argument: {other}")),
            }
        }
        Ok(options)
    }
}

/// Player 1 spins clockwise, player 2 anticlockwise, both fire constantly
struct Autopilot {
    players: u32,
    started: bool,
}

impl InputSource for Autopilot {
    fn poll(&mut self) -> FrameInput {
        let mut input = FrameInput::default();
        if !self.started {
            self.started = true;
            input.start_one_player = self.players == 1;
            input.start_two_player = self.players == 2;
            return input;
        }
        input.ships[0].rotate_right = true;
        input.ships[0].fire = true;
        input.ships[1].rotate_left = true;
        input.ships[1].fire = true;
        input
    }
}

/// Logs a summary line once a second of game time
struct LogRenderer {
    every: u64,
}

impl Renderer for LogRenderer {
    fn present(&mut self, snapshot: &Snapshot) {
        if snapshot.tick % self.every != 0 {
            return;
        }
        let scores: Vec<String> = snapshot
            .scores
            .iter()
            .map(|s| format!("{} {}", s.name, s.score))
            .collect();
        log::info!(
            "tick {} | {} rocks | {} bullets | {:?}s left | {}",
            snapshot.tick,
            snapshot.rocks.len(),
            snapshot.bullets.len(),
            snapshot.time_remaining_secs,
            scores.join(", ")
        );
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let options = Options::parse(std::env::args().skip(1))?;

    let mut settings = match &options.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(seconds) = options.seconds {
        settings.match_seconds = seconds;
    }
    settings.validate()?;

    let players = options.players.unwrap_or(1);
    if !(1..=2).contains(&players) {
        return Err(format!("players must be 1 or 2, got {players}").into());
    }

    let start = Instant::now();
    let mut arcade = match options.seed {
        Some(seed) => Arcade::with_seed(settings.clone(), seed, start),
        None => Arcade::new(settings.clone(), start),
    };
    log::info!(
        "Space Rocks: {} player(s), {}s match",
        players,
        settings.match_seconds
    );

    let mut clock = FrameClock::new(settings.target_fps, start);
    let mut input = Autopilot {
        players,
        started: false,
    };
    let mut renderer = LogRenderer {
        every: settings.target_fps.max(1) as u64,
    };
    let mut audio = LogAudio::default();

    // Game time advances one period per tick, whether or not we sleep
    let mut frames: u32 = 0;
    loop {
        let now = start + clock.period() * frames;
        let frame = arcade.update(&input.poll(), now);
        if frame.status == ArcadeStatus::Quit {
            break;
        }
        play_events(&mut audio, &frame.events);
        renderer.present(&arcade.snapshot(now));

        if arcade.last_results().is_some() {
            break;
        }
        frames += 1;
        if !options.unpaced {
            clock.wait();
        }
    }

    log::info!(
        "Sounds played: {} explosions, {} lasers, {} ship explosions",
        audio.played[0],
        audio.played[1],
        audio.played[2]
    );
    log::debug!("Wall time {:?}", Instant::now().duration_since(start));

    let results = arcade.last_results().unwrap_or_default();
    println!("{}", serde_json::to_string_pretty(results)?);
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        log::error!("{e}");
        eprintln!("space-rocks: {e}");
        std::process::exit(1);
    }
}
