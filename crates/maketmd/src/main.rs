use std::{
  backtrace::Backtrace,
  fmt,
  fs::File,
  io::{self, Write},
  path::{Path, PathBuf},
  process::ExitCode,
};

use clap::{Parser, error::ErrorKind};
use log::{debug, info};
use snafu::{ErrorCompat, ResultExt, Snafu};
use tmd_library::tmd::{self, CreateError, TitleMetadata};
use zerocopy::IntoBytes;

pub struct Banner {
  pub name: &'static str,
  pub version: &'static str,
  pub date: &'static str,
  pub author: &'static str,
}

impl fmt::Display for Banner {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "{} {} - {}", self.name, self.version, self.date)?;
    write!(f, "by {}", self.author)
  }
}

static BANNER: Banner = Banner {
  name: "TMD Creator for DSiWare Homebrew",
  version: env!("CARGO_PKG_VERSION"),
  date: "2026-10-18",
  author: "Przemyslaw Skryjomski (Tuxality)",
};

/// Creates an unsigned title metadata descriptor for a DSiWare application.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
  /// Application image (.app) to describe
  source: PathBuf,
  /// Where to write the descriptor
  #[arg(default_value = "title.tmd")]
  destination: PathBuf,
}

#[derive(Snafu, Debug)]
enum Error {
  #[snafu(display("Error at opening {} for reading.", path.display()))]
  OpenSource {
    path: PathBuf,
    source: io::Error,
    backtrace: Backtrace,
  },
  #[snafu(display("Error while describing {}: {source}", path.display()))]
  Create {
    path: PathBuf,
    #[snafu(backtrace)]
    source: CreateError,
  },
  #[snafu(display("Error at opening {} for writing.", path.display()))]
  OpenDestination {
    path: PathBuf,
    source: io::Error,
    backtrace: Backtrace,
  },
  #[snafu(display("Error while writing {}: {source}", path.display()))]
  WriteDestination {
    path: PathBuf,
    source: io::Error,
    backtrace: Backtrace,
  },
}

fn run(args: &Args) -> Result<(), Error> {
  let mut source = File::open(&args.source).context(OpenSourceSnafu { path: &args.source })?;
  let tmd = tmd::create(&mut source).context(CreateSnafu { path: &args.source })?;
  drop(source);

  info!(
    "title id {:016X}, game code {}, maker code {}",
    tmd.title_id(),
    String::from_utf8_lossy(&tmd.game_code()),
    String::from_utf8_lossy(&tmd.maker_code())
  );
  info!(
    "content is 0x{:X} bytes, sha1 {}",
    tmd.content_size(),
    hex::encode(tmd.content_digest())
  );

  write_descriptor(&args.destination, &tmd)?;
  info!("wrote {}", args.destination.display());
  Ok(())
}

fn write_descriptor(path: &Path, tmd: &TitleMetadata) -> Result<(), Error> {
  let mut file = File::create(path).context(OpenDestinationSnafu { path })?;
  file
    .write_all(tmd.as_bytes())
    .and_then(|()| file.flush())
    .context(WriteDestinationSnafu { path })
}

fn cli(banner: &Banner) -> ExitCode {
  println!("{banner}");

  let args = match Args::try_parse() {
    Ok(args) => args,
    Err(error) => match error.kind() {
      ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => error.exit(),
      _ => {
        println!("\n{}", error.render());
        return ExitCode::FAILURE;
      }
    },
  };

  match run(&args) {
    Ok(()) => ExitCode::SUCCESS,
    Err(error) => {
      println!("{error}");
      for cause in error.iter_chain().skip(1) {
        debug!("caused by: {cause}");
      }
      if let Some(backtrace) = ErrorCompat::backtrace(&error) {
        debug!("{backtrace}");
      }
      ExitCode::FAILURE
    }
  }
}

fn main() -> ExitCode {
  env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
  cli(&BANNER)
}
