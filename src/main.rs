use anyhow::Result;
use clap::Parser;
use dpg_bench_prep::config::{self, ConvertConfig};
use dpg_bench_prep::convert;
use dpg_bench_prep::matching::{self, MatchMode};
use dpg_bench_prep::report::ReportWriter;
use indicatif::ProgressBar;
use std::path::PathBuf;

/// Copy generated sample images into DPG-Bench layout, renamed by prompt.
#[derive(Parser, Debug)]
#[command(name = "convert_images", version, about)]
struct Args {
    /// Directory containing sample_XXXXX/ subdirectories
    input_dir: PathBuf,

    /// Output directory for converted images
    output_dir: PathBuf,

    /// Prompt mapping produced by create_prompt_mapping
    #[arg(long, default_value = config::DEFAULT_MAPPING_PATH)]
    mapping: PathBuf,

    /// How a sample prompt is matched against mapping keys
    #[arg(long, value_enum, default_value_t = MatchMode::Contains)]
    match_mode: MatchMode,

    /// Compare prompts case-insensitively
    #[arg(long)]
    ignore_case: bool,

    /// Write a per-sample CSV report here
    #[arg(long)]
    report: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(long)]
    no_progress: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    // 1. Matching policy
    let config = ConvertConfig::new(&args.input_dir, &args.output_dir).with_mapping(&args.mapping);
    let matcher = matching::matcher_for(args.match_mode, args.ignore_case);
    println!(
        "Matching prompts against {} ({})",
        config.mapping_path.display(),
        matcher.name()
    );

    // 2. Prepare CSV report
    let mut report = match &args.report {
        Some(path) => Some(ReportWriter::create(path)?),
        None => None,
    };

    // 3. Convert samples
    println!("Converting samples from {}...", config.input_dir.display());
    let pb = if args.no_progress {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(0)
    };

    let result = convert::convert_images(&config, matcher.as_ref(), &pb, |record| {
        match report.as_mut() {
            Some(report) => report.write(record),
            None => Ok(()),
        }
    });
    pb.finish_and_clear();

    if let Some(report) = report.as_mut() {
        report.flush()?;
    }
    let summary = result?;

    // 4. Summary
    println!();
    println!("{}", summary);
    println!(
        "Converted {} images to {}",
        summary.converted,
        config.output_dir.display()
    );
    if let (Some(path), Some(report)) = (&args.report, &report) {
        println!("Wrote {} report rows to {}", report.rows(), path.display());
    }

    Ok(())
}
