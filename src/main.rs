use clap::Parser;
use fo_iface::cli::{Cli, Commands, cmd_build, cmd_check, cmd_keys, cmd_revert, cmd_set};
use fo_iface::config;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Install logger immediately, then set runtime max level from config after loading it.
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Trace)
        .try_init();
    // Startup default when config is missing or malformed.
    log::set_max_level(log::LevelFilter::Warn);

    let cli = Cli::parse();
    config::load();
    log::set_max_level(config::get().log_level.as_level_filter());
    if let Some(dir) = cli.art_dir.as_deref() {
        config::set_art_dir(dir);
    }

    match cli.command {
        Commands::Build {
            dump,
            section,
            resolution,
            json,
            time,
        } => cmd_build(&dump, &section, resolution.as_deref(), json, time)?,
        Commands::Keys { section } => cmd_keys(&section)?,
        Commands::Check { dump } => {
            if !cmd_check(&dump)? {
                std::process::exit(1);
            }
        }
        Commands::Set {
            dump,
            key,
            value,
            resolution,
            force,
        } => cmd_set(&dump, &key, &value, resolution.as_deref(), force)?,
        Commands::Revert {
            dump,
            key,
            resolution,
            force,
        } => cmd_revert(&dump, &key, &resolution, force)?,
    }
    Ok(())
}
