use clap::Parser;
use std::path::PathBuf;

// Build version with backend info
const VERSION_INFO: &str = const_format::concatcp!(
    env!("CARGO_PKG_VERSION"), "\n",
    "Audio:   rodio 0.17\n",
    "Gamepad: gilrs 0.11\n",
    "Target:  ", std::env::consts::ARCH, "-", std::env::consts::OS
);

/// Interactive boot-sequence screen
#[derive(Parser, Debug)]
#[command(author, version = VERSION_INFO, about, long_about = None)]
pub struct Args {
    /// Directory with image.png, video.gif, final-frame.jpg and audio.mp3
    #[arg(value_name = "ASSET_DIR")]
    pub asset_dir: Option<PathBuf>,

    /// Start in fullscreen mode
    #[arg(short = 'F', long = "fullscreen")]
    pub fullscreen: bool,

    /// Do not play the audio cue
    #[arg(long = "mute")]
    pub mute: bool,

    /// Audio cue volume (0.0 - 1.0)
    #[arg(long = "volume", value_name = "VOLUME")]
    pub volume: Option<f32>,

    /// Disable game controller polling
    #[arg(long = "no-gamepad")]
    pub no_gamepad: bool,

    /// Enable logging to file (default: bootseq.log in the data directory)
    #[arg(short = 'l', long = "log", value_name = "LOG_FILE")]
    pub log_file: Option<Option<PathBuf>>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,

    /// Custom configuration directory (overrides default platform paths)
    #[arg(short = 'c', long = "config-dir", value_name = "DIR")]
    pub config_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["bootseq"]);
        assert!(args.asset_dir.is_none());
        assert!(!args.fullscreen && !args.mute && !args.no_gamepad);
        assert_eq!(args.verbosity, 0);
        assert!(args.log_file.is_none());
    }

    #[test]
    fn test_log_flag_with_and_without_value() {
        let args = Args::parse_from(["bootseq", "-l", "-vv"]);
        assert_eq!(args.log_file, Some(None));
        assert_eq!(args.verbosity, 2);

        let args = Args::parse_from(["bootseq", "--log", "/tmp/boot.log"]);
        assert_eq!(args.log_file, Some(Some(PathBuf::from("/tmp/boot.log"))));
    }
}
