use std::{fs::File, io::BufWriter, path::Path};

use clap::Parser;
use flexi_logger::{AdaptiveFormat, Logger, WriteMode};
use treepos::prelude::*;

fn main() -> Result<()>
{
    // Read the dotenv file.
    dotenvy::dotenv().ok();

    // Parse the cli options.
    let options = Options::parse();

    // Set the logger to write-and-flush so that it doesn't compete with the cache threads.
    let _logger = Logger::try_with_env_or_str(options.log_level.clone())?
        .write_mode(WriteMode::BufferAndFlush)
        .log_to_stderr()
        .adaptive_format_for_stderr(AdaptiveFormat::WithThread)
        .set_palette("b196;208;195;111;67".to_owned())
        .start()?;

    log::info!("♟ starting {} v{} ♟", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(&options)
    {
        log::error!("fatal error: {}", e);
        return Err(e);
    }

    Ok(())
}

fn run(options: &Options) -> Result<()>
{
    let limit = options.limit()?;
    let schedule = options.schedule()?;
    let pruning = options.pruning()?;

    let mut engine = UciEngine::spawn(&options.engine)?;
    let engine_options = EngineOptions::resolve(options.config.as_deref(), engine.name(), engine.defaults())?;
    engine.configure(&engine_options)?;

    let config = EngineConfig::new(engine.name(), engine_options);
    log::info!("Using {config}.");

    let cache = match options.no_cache
    {
        | true => None,
        | false => Some(Cache::open(&options.cache_file, &config, options.cache_memory)?),
    };

    let rules = ChessRules;
    for input in &options.positions
    {
        for (index, text) in read_positions(input)?.iter().enumerate()
        {
            let root = match rules.normalize(text)
            {
                | Ok(root) => root,
                | Err(err) if !err.fatal() =>
                {
                    log::warn!("Skipping position {} of {}: {}", index, input.display(), err);
                    continue;
                }
                | Err(err) => return Err(err),
            };

            let mut explorator = Explorator::new(&mut engine, &rules, &schedule, &pruning, limit);
            if let Some(cache) = cache.as_ref()
            {
                explorator = explorator.with_cache(cache);
            }
            let tree = explorator.explore(&root, options.depth)?;

            let path = options.output_path(input, index, &limit, &schedule);
            export(&tree, &root, &rules, options.depth, &path)?;
        }
    }

    match cache
    {
        | Some(cache) => cache.close(),
        | None => Ok(()),
    }
}

fn export(tree: &SessionTree, root: &Position, rules: &dyn Rules, depth: u32, path: &Path) -> Result<()>
{
    let mut out = BufWriter::new(File::create(path)?);
    write_tree(tree, root, rules, depth, &mut out)?;
    log::info!("Wrote {} positions to {}.", tree.len(), path.display());
    Ok(())
}
