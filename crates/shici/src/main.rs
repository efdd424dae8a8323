use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

use shici::{NORMALIZED_DUMP, SkipList, write_index, write_records};
use shici_markup::{Dump, LoadMode};

const DEFAULT_DUMP: &str = "data/shi_ci_qu_dict.txt";
const DEFAULT_SKIP_LIST: &str = "data/skip.txt";
const DEFAULT_OUT_DIR: &str = "data";
const DEFAULT_NORMALIZED: &str = "data/dumped_dict.html";

#[derive(Parser)]
#[command(name = "shici", version)]
#[command(about = "Normalize the shici dictionary dump and build its canonical index")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite raw dump records as normalized entries.
    Normalize {
        #[command(flatten)]
        input: DumpArgs,
        #[arg(long, default_value = DEFAULT_NORMALIZED)]
        out: PathBuf,
    },
    /// Build the index files from a normalized dump.
    Index {
        #[arg(long, default_value = DEFAULT_NORMALIZED)]
        normalized: PathBuf,
        #[arg(long, env = "SHICI_OUT_DIR", default_value = DEFAULT_OUT_DIR)]
        out_dir: PathBuf,
    },
    /// Normalize and index in one pass.
    Build {
        #[command(flatten)]
        input: DumpArgs,
        #[arg(long, env = "SHICI_OUT_DIR", default_value = DEFAULT_OUT_DIR)]
        out_dir: PathBuf,
    },
}

#[derive(Args)]
struct DumpArgs {
    #[arg(long, env = "SHICI_DUMP", default_value = DEFAULT_DUMP)]
    dump: PathBuf,
    #[arg(long, env = "SHICI_SKIP_LIST", default_value = DEFAULT_SKIP_LIST)]
    skip_list: PathBuf,
    /// Normalize every record, ignoring the skip list.
    #[arg(long, default_value_t = false, conflicts_with = "skip_list")]
    no_skip_list: bool,
    /// Log and skip malformed records instead of stopping.
    #[arg(long, default_value_t = false)]
    keep_going: bool,
    #[arg(long, env = "SHICI_LOAD_MODE", default_value = "mmap", value_parser = parse_load_mode)]
    load_mode: LoadMode,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Normalize { input, out } => {
            let (dump, skip) = load_input(&input)?;
            let start = Instant::now();
            let normalized = shici::normalize_dump(&dump, &skip, input.keep_going)?;
            info!("normalized in {} ms", start.elapsed().as_millis());
            write_normalized(&out, &normalized)?;
        }
        Commands::Index {
            normalized,
            out_dir,
        } => {
            let start = Instant::now();
            let dump = Dump::load(&normalized)?;
            let index = shici::index_normalized(&dump)?;
            info!("index built in {} ms", start.elapsed().as_millis());
            write_outputs(&out_dir, &index)?;
        }
        Commands::Build { input, out_dir } => {
            let (dump, skip) = load_input(&input)?;
            let start = Instant::now();
            let normalized = shici::normalize_dump(&dump, &skip, input.keep_going)?;
            let index = shici::index_entries(&normalized)?;
            info!("normalized and indexed in {} ms", start.elapsed().as_millis());
            write_normalized(&out_dir.join(NORMALIZED_DUMP), &normalized)?;
            write_outputs(&out_dir, &index)?;
        }
    }

    Ok(())
}

impl DumpArgs {
    fn skip_list_path(&self) -> Option<&Path> {
        (!self.no_skip_list).then_some(self.skip_list.as_path())
    }
}

fn load_input(input: &DumpArgs) -> Result<(Dump, SkipList)> {
    info!(
        "using dump at {} (mode: {:?})",
        input.dump.display(),
        input.load_mode
    );
    let start = Instant::now();
    let dump = Dump::load_with_mode(&input.dump, input.load_mode)?;
    let skip = match input.skip_list_path() {
        Some(path) => {
            let skip = SkipList::load(path)?;
            info!("skipping {} keys from {}", skip.len(), path.display());
            skip
        }
        None => SkipList::default(),
    };
    info!("dump loaded in {} ms", start.elapsed().as_millis());
    Ok((dump, skip))
}

fn write_normalized(path: &Path, normalized: &shici::Normalized) -> Result<()> {
    let start = Instant::now();
    let count = write_records(
        path,
        normalized.entries.iter().map(|(key, e)| (key.as_str(), e)),
    )?;
    info!(
        "wrote {} records to {} in {} ms",
        count,
        path.display(),
        start.elapsed().as_millis()
    );
    if normalized.failed > 0 {
        info!("{} malformed records skipped", normalized.failed);
    }
    Ok(())
}

fn write_outputs<E: shici_markup::Markup>(
    dir: &Path,
    index: &shici_index::CanonicalIndex<E>,
) -> Result<()> {
    let start = Instant::now();
    let files = write_index(dir, index)?;
    info!(
        "wrote {}, {} and {} in {} ms",
        files.unique_entries.display(),
        files.search_keys.display(),
        files.list_entries.display(),
        start.elapsed().as_millis()
    );
    Ok(())
}

fn parse_load_mode(raw: &str) -> Result<LoadMode, String> {
    LoadMode::parse(raw).ok_or_else(|| format!("unknown load mode `{raw}` (expected mmap or owned)"))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let max_level = env_filter
        .max_level_hint()
        .and_then(|hint| hint.into_level())
        .unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .with_max_level(max_level)
        .init();
}
