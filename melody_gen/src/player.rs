// Playback through an external MIDI player.
//
// There is no synthesizer in-process: the exported file is handed to a
// player program (timidity by default) as its last argument. Waiting blocks
// until the player exits; otherwise the caller gets the running child back
// and may stop it later.

use std::path::Path;
use std::process::{Child, Command};
use std::str::FromStr;

use crate::error::{MelodyError, Result};

/// Program plus leading arguments used to play a MIDI file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for PlayerCommand {
    fn default() -> Self {
        PlayerCommand {
            program: "timidity".to_string(),
            args: Vec::new(),
        }
    }
}

impl FromStr for PlayerCommand {
    type Err = MelodyError;

    /// Split on whitespace: "fluidsynth -i sf.sf2" → program + two args.
    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| MelodyError::InvalidPlayer("empty player command".to_string()))?;
        Ok(PlayerCommand {
            program,
            args: parts.collect(),
        })
    }
}

#[derive(Debug)]
pub enum Playback {
    /// The player ran to completion.
    Finished,
    /// The player is still running in the background.
    Running(Child),
}

/// Play `path` with `player`. Fails with `FileNotFound` before spawning
/// anything if the file is missing.
pub fn play_midi(path: &Path, wait: bool, player: &PlayerCommand) -> Result<Playback> {
    if !path.exists() {
        return Err(MelodyError::FileNotFound(path.to_path_buf()));
    }

    log::debug!("starting {} {:?} {}", player.program, player.args, path.display());
    let mut child = Command::new(&player.program)
        .args(&player.args)
        .arg(path)
        .spawn()?;

    if !wait {
        return Ok(Playback::Running(child));
    }

    let status = child.wait()?;
    if !status.success() {
        return Err(MelodyError::Io(std::io::Error::other(format!(
            "{} exited with {status}",
            player.program
        ))));
    }
    Ok(Playback::Finished)
}

/// Stop a background playback. No-op if it already finished.
pub fn stop_playback(playback: &mut Playback) -> Result<()> {
    if let Playback::Running(child) = playback {
        if child.try_wait()?.is_none() {
            child.kill()?;
            child.wait()?;
        }
        *playback = Playback::Finished;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_reported() {
        let dir = crate::test_util::scratch_dir("player_missing");
        let missing = dir.join("nope.mid");
        let err = play_midi(&missing, true, &PlayerCommand::default()).unwrap_err();
        match err {
            MelodyError::FileNotFound(p) => assert_eq!(p, missing),
            other => panic!("expected FileNotFound, got {other:?}"),
        }
    }

    #[test]
    fn command_parsing() {
        let cmd: PlayerCommand = "fluidsynth -a alsa  font.sf2".parse().unwrap();
        assert_eq!(cmd.program, "fluidsynth");
        assert_eq!(cmd.args, vec!["-a", "alsa", "font.sf2"]);
        assert!("   ".parse::<PlayerCommand>().is_err());
        assert_eq!(PlayerCommand::default().program, "timidity");
    }

    #[cfg(unix)]
    #[test]
    fn waits_for_player_exit_status() {
        let dir = crate::test_util::scratch_dir("player_wait");
        let file = dir.join("a.mid");
        std::fs::write(&file, b"MThd").unwrap();

        let ok: PlayerCommand = "true".parse().unwrap();
        assert!(matches!(
            play_midi(&file, true, &ok).unwrap(),
            Playback::Finished
        ));

        let failing: PlayerCommand = "false".parse().unwrap();
        assert!(matches!(
            play_midi(&file, true, &failing),
            Err(MelodyError::Io(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn background_playback_can_be_stopped() {
        let dir = crate::test_util::scratch_dir("player_background");
        let file = dir.join("a.mid");
        std::fs::write(&file, b"MThd").unwrap();

        // `tail -f` never exits on its own, so stopping has to kill it.
        let player: PlayerCommand = "tail -f".parse().unwrap();
        let mut playback = play_midi(&file, false, &player).unwrap();
        match &mut playback {
            Playback::Running(child) => assert!(child.try_wait().unwrap().is_none()),
            Playback::Finished => panic!("expected a running player"),
        }
        stop_playback(&mut playback).unwrap();
        assert!(matches!(playback, Playback::Finished));
        stop_playback(&mut playback).unwrap();
    }
}
