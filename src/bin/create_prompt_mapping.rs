use anyhow::Result;
use clap::Parser;
use dpg_bench_prep::config::MappingConfig;
use dpg_bench_prep::mapping;
use std::path::PathBuf;

/// Build the prompt text -> filename mapping from DPG-Bench prompt files.
#[derive(Parser, Debug)]
#[command(name = "create_prompt_mapping", version, about)]
struct Args {
    /// Directory of <name>.txt prompt files [default: dpg_bench/prompts]
    #[arg(long)]
    prompts_dir: Option<PathBuf>,

    /// Where to write the JSON mapping [default: dpg_bench/filename_from_prompt.json]
    #[arg(long)]
    output: Option<PathBuf>,
}

impl From<Args> for MappingConfig {
    fn from(args: Args) -> Self {
        let defaults = MappingConfig::default();
        MappingConfig {
            prompts_dir: args.prompts_dir.unwrap_or(defaults.prompts_dir),
            output_path: args.output.unwrap_or(defaults.output_path),
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let config: MappingConfig = Args::parse().into();

    // 1. Read prompts
    println!("Reading prompts from {}...", config.prompts_dir.display());
    let mapping = mapping::build_from_dir(&config.prompts_dir)?;

    // 2. Write mapping
    mapping.save(&config.output_path)?;

    println!(
        "Saved {} prompt mappings to {}",
        mapping.len(),
        config.output_path.display()
    );
    Ok(())
}
