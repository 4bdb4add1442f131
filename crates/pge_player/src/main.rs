//! Headless game player.
//!
//! Loads a game file, drives a `Screen` one fixed tick at a time and logs the
//! state transitions. Input comes from a recorded replay, or nothing at all
//! when no replay is given.
//!
//!   pge_player <game.json> [replay.json] [--realtime]
//!
//! Without `--realtime` ticks run back to back, which is what deterministic
//! checks want. With it, a fixed-step accumulator paces ticks against the wall
//! clock the way an interactive frontend would.

mod replay;

use std::path::{Path, PathBuf};
use std::time::Duration;

use pge_core::{InputSnapshot, TickSource};
use pge_engine::{load_game_from_path, Screen};

/// Idle run length when no replay is given: one minute at 60 Hz.
const IDLE_TICKS: usize = 3600;

struct Args {
    game: PathBuf,
    replay: Option<PathBuf>,
    realtime: bool,
}

fn parse_args(raw: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut positional = Vec::new();
    let mut realtime = false;
    for arg in raw {
        match arg.as_str() {
            "--realtime" => realtime = true,
            flag if flag.starts_with("--") => return Err(format!("Unknown flag '{flag}'")),
            _ => positional.push(PathBuf::from(arg)),
        }
    }
    let mut positional = positional.into_iter();
    let game = positional
        .next()
        .ok_or_else(|| "Usage: pge_player <game.json> [replay.json] [--realtime]".to_string())?;
    let replay = positional.next();
    if let Some(extra) = positional.next() {
        return Err(format!("Unexpected argument '{}'", extra.display()));
    }
    Ok(Args {
        game,
        replay,
        realtime,
    })
}

fn load_inputs(replay: Option<&Path>) -> Result<Vec<InputSnapshot>, String> {
    match replay {
        Some(path) => {
            let inputs = replay::load_replay_from_path(path)?.expanded_inputs();
            log::info!("Replay {}: {} ticks", path.display(), inputs.len());
            Ok(inputs)
        }
        None => {
            log::info!("No replay given, running {IDLE_TICKS} idle ticks");
            Ok(vec![InputSnapshot::default(); IDLE_TICKS])
        }
    }
}

fn run(args: Args) -> Result<(), String> {
    let game = load_game_from_path(&args.game).map_err(|e| e.to_string())?;
    let inputs = load_inputs(args.replay.as_deref())?;
    let config = game.config.clone();

    let mut screen = Screen::new(game.config, game.levels).map_err(|e| e.to_string())?;
    screen.start();
    log::info!("Playing '{}': {}", game.title, screen.state());

    let mut pending = inputs.iter();
    if args.realtime {
        let mut clock = TickSource::new(config.frame_us, config.max_steps_per_frame);
        'frames: loop {
            clock.begin_frame();
            while clock.should_step() {
                let Some(input) = pending.next() else {
                    break 'frames;
                };
                screen.step(input).map_err(|e| e.to_string())?;
                if screen.state().is_terminal() {
                    break 'frames;
                }
            }
            std::thread::sleep(Duration::from_millis(1));
        }
    } else {
        for input in pending {
            screen.step(input).map_err(|e| e.to_string())?;
            if screen.state().is_terminal() {
                break;
            }
        }
    }

    let scorebar = screen.scorebar();
    log::info!(
        "Finished after {} ticks ({} on the current level): {} | score {} | lives {} | level {} | time {}",
        screen.tick_count(),
        screen.level_ticks(),
        screen.state(),
        scorebar.formatted_score(),
        scorebar.lives(),
        scorebar.level(),
        scorebar.formatted_time()
    );
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Platformer game engine player starting...");

    let result = parse_args(std::env::args().skip(1)).and_then(run);
    if let Err(err) = result {
        log::error!("{err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args, String> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn parses_game_replay_and_flag_in_any_order() {
        let parsed = args(&["--realtime", "game.json", "replay.json"]).expect("args");
        assert_eq!(parsed.game, PathBuf::from("game.json"));
        assert_eq!(parsed.replay, Some(PathBuf::from("replay.json")));
        assert!(parsed.realtime);

        let parsed = args(&["game.json"]).expect("args");
        assert!(parsed.replay.is_none());
        assert!(!parsed.realtime);
    }

    #[test]
    fn rejects_missing_game_and_extra_arguments() {
        assert!(args(&[]).is_err());
        assert!(args(&["a.json", "b.json", "c.json"]).is_err());
        assert!(args(&["a.json", "--fast"]).is_err());
    }

    #[test]
    fn idle_inputs_without_replay() {
        let inputs = load_inputs(None).expect("inputs");
        assert_eq!(inputs.len(), IDLE_TICKS);
        assert!(inputs[0].held.is_empty());
    }
}
