//! Command-line arguments

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};

use tartil::Config;

#[derive(Parser, Debug)]
#[command(
    name = "tartil",
    version,
    about = "Verse-by-verse Quran reader and recitation player",
    long_about = "Read chapters with translation and listen to verse recitations.\n\n\
                  Supports continuous play, verse and chapter looping, bookmarks and\n\
                  commentary lookups. Type `help` at the prompt for commands."
)]
pub struct Cli {
    /// Base address of the text and translation service.
    #[arg(long = "api-base", value_name = "URL")]
    pub api_base: Option<String>,

    /// Host serving per-verse recitation audio.
    #[arg(long = "audio-host", value_name = "URL")]
    pub audio_host: Option<String>,

    /// Timeout applied to every request.
    #[arg(long = "timeout-secs", value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Directory for saved preferences and bookmarks.
    #[arg(long = "data-dir", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Do not open a sound device; each verse "plays" silently.
    #[arg(long = "no-audio")]
    pub no_audio: bool,

    /// Increase log verbosity (-v for debug, -vv for trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn config(&self) -> Config {
        let mut config = Config::default();
        if let Some(api_base) = &self.api_base {
            config.api_base = api_base.clone();
        }
        if let Some(audio_host) = &self.audio_host {
            config.audio_host = audio_host.clone();
        }
        if let Some(secs) = self.timeout_secs {
            config.request_timeout = Duration::from_secs(secs);
        }
        config.data_dir = self.data_dir.clone();
        config
    }

    /// Default `EnvFilter` directive when `RUST_LOG` is unset
    pub fn log_directive(&self) -> &'static str {
        match self.verbose {
            0 => "tartil=info",
            1 => "tartil=debug",
            _ => "tartil=trace",
        }
    }
}
