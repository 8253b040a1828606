//! Lemming Engine - headless runner
//!
//! Loads a level, optionally plays back a replay or lets the demo player
//! loose, runs the simulation to the end and prints the debriefing.

use std::path::PathBuf;
use std::process::ExitCode;

use lemming_engine::audio::{AudioBus, LogSink};
use lemming_engine::demo::DemoPlayer;
use lemming_engine::flow::{GameState, Session};
use lemming_engine::level::LevelDef;
use lemming_engine::persistence::ReplayFile;
use lemming_engine::{Settings, Tuning};

const USAGE: &str = "usage: lemming-engine <level.json> [--replay FILE] [--record FILE] \
                     [--demo SEED] [--max-ticks N] [--settings FILE] [--tuning FILE]";

#[derive(Debug, Default)]
struct Args {
    level: PathBuf,
    replay: Option<PathBuf>,
    record: Option<PathBuf>,
    demo: Option<u64>,
    max_ticks: Option<u64>,
    settings: Option<PathBuf>,
    tuning: Option<PathBuf>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args::default();
    let mut level = None;
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        let mut value = |name: &str| it.next().ok_or_else(|| format!("{name} needs a value"));
        match arg.as_str() {
            "--replay" => args.replay = Some(value("--replay")?.into()),
            "--record" => args.record = Some(value("--record")?.into()),
            "--settings" => args.settings = Some(value("--settings")?.into()),
            "--tuning" => args.tuning = Some(value("--tuning")?.into()),
            "--demo" => {
                let seed = value("--demo")?;
                args.demo = Some(seed.parse().map_err(|e| format!("bad seed `{seed}`: {e}"))?);
            }
            "--max-ticks" => {
                let n = value("--max-ticks")?;
                args.max_ticks = Some(n.parse().map_err(|e| format!("bad tick count `{n}`: {e}"))?);
            }
            "-h" | "--help" => return Err(USAGE.to_string()),
            flag if flag.starts_with("--") => return Err(format!("unknown option {flag}")),
            path => level = Some(PathBuf::from(path)),
        }
    }
    args.level = level.ok_or_else(|| USAGE.to_string())?;
    if args.replay.is_some() && args.demo.is_some() {
        return Err("--replay and --demo are mutually exclusive".into());
    }
    Ok(args)
}

fn load_tuning(path: Option<&PathBuf>) -> Result<Tuning, String> {
    let Some(path) = path else {
        return Ok(Tuning::default());
    };
    let json = std::fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;
    Tuning::from_json(&json).map_err(|e| format!("{}: {e}", path.display()))
}

fn run(args: Args) -> Result<(), String> {
    let settings = args.settings.as_ref().map(Settings::load).unwrap_or_default();
    let tuning = load_tuning(args.tuning.as_ref())?;
    let def = LevelDef::load(&args.level).map_err(|e| e.to_string())?;
    let replay = match &args.replay {
        Some(path) => Some(ReplayFile::load(path).map_err(|e| e.to_string())?),
        None => None,
    };

    let mut audio = AudioBus::new(LogSink, &settings);
    let mut demo = args.demo.map(DemoPlayer::new);
    let mut session = Session::new(tuning, settings);
    session.select_level(&def).map_err(|e| e.to_string())?;
    session.start(replay).map_err(|e| e.to_string())?;

    let max_ticks = args.max_ticks.unwrap_or(u64::MAX);
    let mut ticks = 0;
    while session.state() == GameState::Level {
        if ticks >= max_ticks {
            log::warn!("Stopped after {ticks} ticks");
            break;
        }
        if let (Some(demo), Some(sim)) = (demo.as_mut(), session.simulation()) {
            if let Some(command) = demo.think(sim) {
                session.submit(command);
            }
        }
        let Some(report) = session.tick() else { break };
        audio.play_events(&report.events);
        ticks += 1;
    }

    let Some(sim) = session.simulation() else {
        return Err("no simulation ran".into());
    };
    let counters = sim.counters();
    let record_to = args.record.clone();
    let replay = sim.replay_file();

    if session.state() != GameState::LevelEnd {
        println!(
            "{}: unfinished after {} ticks, saved {}, out {}, dead {}",
            def.id, ticks, counters.exited, counters.out, counters.dead
        );
    } else {
        let result = session.finish().map_err(|e| e.to_string())?;
        println!(
            "{}: {:?} ({:?}) after {} ticks, saved {}/{} ({}%, needed {}%)",
            result.level_id,
            result.outcome,
            result.reason,
            result.frames,
            result.saved,
            result.total,
            result.saved_percent,
            result.needed_percent
        );
    }

    if let Some(path) = record_to {
        replay.save(&path).map_err(|e| e.to_string())?;
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Lemming Engine (headless) starting...");

    let args = match parse_args() {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::from(2);
        }
    };
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            log::error!("{msg}");
            eprintln!("error: {msg}");
            ExitCode::FAILURE
        }
    }
}
