mod create;
mod list;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use snafu::Whatever;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::create::Input;

#[derive(Parser)]
#[command(
  name = "datpack",
  version,
  about = "Packs bitmaps, palettes, sprites and fonts into a legacy .dat archive"
)]
struct Cli {
  /// Log level, overridden by RUST_LOG when set
  #[arg(short, long, value_enum, global = true, default_value = "warn")]
  log_level: LogLevel,

  #[command(subcommand)]
  command: Command,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum LogLevel {
  Trace,
  Debug,
  Info,
  Warn,
  Error,
}

impl From<LogLevel> for Level {
  fn from(level: LogLevel) -> Self {
    match level {
      LogLevel::Trace => Level::TRACE,
      LogLevel::Debug => Level::DEBUG,
      LogLevel::Info => Level::INFO,
      LogLevel::Warn => Level::WARN,
      LogLevel::Error => Level::ERROR,
    }
  }
}

#[derive(Subcommand)]
enum Command {
  /// Build an archive, one object per input in the order given
  Create {
    output: PathBuf,

    /// Inputs as KIND=PATH, where KIND is bmp, pal, rle, font8 or font16
    #[arg(required = true, value_name = "KIND=PATH")]
    inputs: Vec<Input>,

    /// Glyph sheet pixels at least this bright become set font bits
    #[arg(short, long, default_value_t = 128)]
    threshold: u8,
  },
  /// Print every object, property and warning in an archive
  List {
    archive: PathBuf,

    /// Most properties a single object may carry before the archive is rejected
    #[arg(long, default_value_t = 100)]
    max_properties: usize,
  },
}

#[snafu::report]
fn main() -> Result<(), Whatever> {
  let cli = Cli::parse();

  let filter = EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| EnvFilter::new(Level::from(cli.log_level).as_str()));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_target(false)
    .with_writer(std::io::stderr)
    .init();

  match cli.command {
    Command::Create {
      output,
      inputs,
      threshold,
    } => create::run(&output, &inputs, threshold),
    Command::List {
      archive,
      max_properties,
    } => list::run(&archive, max_properties),
  }
}
