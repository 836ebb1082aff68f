use std::path::{Path, PathBuf};

use clap::Parser;

use crate::prelude::*;

#[derive(Clone, Parser, Debug)]
#[command(version, about = "Explores the best lines of chess positions with a UCI engine.", long_about = None)]
pub struct Options
{
    #[arg(required = true)]
    /// position files, one FEN or EPD position per line
    pub positions: Vec<PathBuf>,

    #[arg(short = 'p', long)]
    /// path to the UCI engine
    pub engine: PathBuf,

    #[arg(short, long)]
    /// engine options file; defaults to <engine name>.cfg, created if missing
    pub config: Option<PathBuf>,

    #[arg(long, default_value = "2")]
    /// lines to explore per position, as a schedule expression (e.g. 3, 3-1/1m, 3W2b)
    pub pv: String,

    #[arg(long, default_value_t = 2)]
    /// number of plies to explore
    pub depth: u32,

    #[arg(long)]
    /// nodes searched per position
    pub nodes: Option<u64>,

    #[arg(long)]
    /// seconds searched per position
    pub time: Option<u64>,

    #[arg(long)]
    /// engine depth searched per position
    pub plies: Option<u64>,

    #[arg(long, default_value = "")]
    /// stop exploring past scores outside this window, in pawns (e.g. 5, 3W, 1W5B)
    pub threshold: String,

    #[arg(long)]
    /// drop lines further than this many centipawns from the best one (e.g. 50, 50a10W)
    pub cutoff: Option<String>,

    #[arg(long, default_value_t = false)]
    /// do not read or write the result cache
    pub no_cache: bool,

    #[arg(long, default_value = ".cached.db")]
    /// result cache file
    pub cache_file: PathBuf,

    #[arg(long, default_value_t = 20)]
    /// memory in MiB for the in-memory part of the cache
    pub cache_memory: u64,

    #[arg(short, long, default_value = "info")]
    /// lowest log level to show
    pub log_level: String,
}

impl Options
{
    /// The search limit, which must be given exactly once.
    pub fn limit(&self) -> Result<Limit>
    {
        let limits: Vec<Limit> = [
            self.nodes.map(Limit::Nodes),
            self.time.map(|s| Limit::Time(s.saturating_mul(1000))),
            self.plies.map(Limit::Depth),
        ]
        .into_iter()
        .flatten()
        .collect();

        match limits.as_slice()
        {
            | [limit] if limit.amount() > 0 => Ok(*limit),
            | [_] => Err(Error::new(Kind::InvalidOption, "the search limit must be positive".into())),
            | [] => Err(Error::new(
                Kind::InvalidOption,
                "no stopping condition, set one of --nodes, --time or --plies".into(),
            )),
            | _ => Err(Error::new(
                Kind::InvalidOption,
                "only one of --nodes, --time or --plies can be set".into(),
            )),
        }
    }

    /// The combined threshold and cutoff policies.
    pub fn pruning(&self) -> Result<Pruning>
    {
        let mut pruning = Pruning::new().with(self.threshold.parse::<Threshold>()?);
        if let Some(cutoff) = &self.cutoff
        {
            pruning = pruning.with(cutoff.parse::<Cutoff>()?);
        }
        Ok(pruning)
    }

    /// The line schedule for the requested depth.
    pub fn schedule(&self) -> Result<Schedule>
    {
        if self.depth == 0
        {
            return Err(Error::new(Kind::InvalidOption, "the depth must be at least one ply".into()));
        }
        Schedule::new(&self.pv, self.depth)
    }

    /// Where the tree of the `index`th position of `input` is written.
    pub fn output_path(&self, input: &Path, index: usize, limit: &Limit, schedule: &Schedule) -> PathBuf
    {
        let name = input.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        let stem = name.split('.').next().unwrap_or_default();
        let file = format!("{}{}_{}{}v{}p.tree", stem, index, limit.file_tag(), schedule.file_tag(), self.depth);
        input.with_file_name(file)
    }
}
