use pge_core::{InputSnapshot, InputState, Key, MouseClick};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct ReplaySequence {
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplayFrame {
    /// Keys down for every tick of this frame. A key going down counts as a
    /// press on the frame's first tick.
    #[serde(default)]
    pub held: Vec<Key>,
    /// Keys pressed afresh on the first tick, even if already down. They count
    /// as held too.
    #[serde(default)]
    pub pressed: Vec<Key>,
    /// Delivered on the first tick only.
    #[serde(default)]
    pub click: Option<MouseClick>,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

impl ReplaySequence {
    /// One snapshot per tick, produced by replaying the frames into an
    /// `InputState` the way a keyboard and mouse would feed it.
    pub fn expanded_inputs(&self) -> Vec<InputSnapshot> {
        let mut state = InputState::new();
        let mut out = Vec::new();
        for frame in &self.frames {
            let down: BTreeSet<Key> = frame.held.iter().chain(&frame.pressed).copied().collect();
            for key in Key::ALL.iter().filter(|k| !down.contains(*k)) {
                state.key_up(*key);
            }
            for key in frame.held.iter().filter(|k| !frame.pressed.contains(k)) {
                state.key_down(*key);
            }
            for key in &frame.pressed {
                state.key_up(*key);
                state.key_down(*key);
            }
            if let Some(click) = frame.click {
                state.mouse_position = (click.x, click.y);
                state.mouse_down(click.button);
            }
            for _ in 0..frame.repeat.max(1) {
                out.push(state.snapshot());
                state.end_frame();
            }
        }
        out
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplaySequence, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let replay: ReplaySequence = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    validate_replay(&replay)?;
    Ok(replay)
}

fn validate_replay(replay: &ReplaySequence) -> Result<(), String> {
    if replay.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    if replay
        .frames
        .iter()
        .any(|f| f.held.contains(&Key::Unbound) || f.pressed.contains(&Key::Unbound))
    {
        return Err("Replay validation failed: 'Unbound' is not a playable key".to_string());
    }
    Ok(())
}

const fn default_repeat() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use pge_core::MouseBtn;
    use pge_engine::{load_game_from_str, Screen};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "pge_replay_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn replay_file_parses_and_expands() {
        let path = temp_file_path("parse");
        fs::write(
            &path,
            r#"{
              "frames": [
                { "held": ["Right"], "repeat": 3 },
                { "pressed": ["Space"], "click": { "x": 4.0, "y": 5.0, "button": "Left" }, "repeat": 2 }
              ]
            }"#,
        )
        .expect("write replay file");

        let replay = load_replay_from_path(&path).expect("replay should load");
        let expanded = replay.expanded_inputs();
        assert_eq!(expanded.len(), 5);
        assert!(expanded[0].is_just_pressed(Key::Right));
        assert!(expanded[1].is_held(Key::Right));
        assert!(!expanded[1].is_just_pressed(Key::Right));
        assert!(!expanded[3].is_held(Key::Right));
        assert!(expanded[3].is_just_pressed(Key::Space));
        assert_eq!(expanded[3].last_pressed, Some(Key::Space));
        assert_eq!(expanded[3].click.map(|c| c.button), Some(MouseBtn::Left));
        assert!(expanded[4].is_held(Key::Space));
        assert!(!expanded[4].is_just_pressed(Key::Space));
        assert!(expanded[4].click.is_none());

        let _ = fs::remove_file(path);
    }

    #[test]
    fn empty_replay_is_rejected() {
        let path = temp_file_path("empty");
        fs::write(&path, r#"{ "frames": [] }"#).expect("write replay file");
        let err = load_replay_from_path(&path).expect_err("empty replay");
        assert!(err.contains("frames list is empty"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn bundled_replay_finishes_the_demo_game_deterministically() {
        let replay: ReplaySequence =
            serde_json::from_str(include_str!("../../../assets/replays/demo_replay.json"))
                .expect("bundled replay parses");
        let inputs = replay.expanded_inputs();

        let run = || {
            let game = load_game_from_str(include_str!("../../../assets/games/demo_game.json"))
                .expect("bundled game loads");
            let mut screen = Screen::new(game.config, game.levels).expect("screen");
            screen.start();
            for input in &inputs {
                screen.step(input).expect("tick");
            }
            (screen.state(), screen.scorebar().score(), screen.scorebar().lives())
        };

        let first = run();
        assert_eq!(first, run());
        assert!(first.0.is_terminal());
        assert_eq!(first.1, 100);
    }
}
