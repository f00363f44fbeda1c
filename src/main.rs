//! specclean - classify spectrograms as clean or noisy and denoise the noisy ones

use std::process;
use anyhow::Context;
use clap::Parser;
use specclean::processing::{BarProgress, BatchProcessor};
use specclean::{init_logging, Args, Config};

const RULE_WIDTH: usize = 80;

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let config = Config::from_args(args)?;

    print_banner(&config);

    let mut processor = BatchProcessor::from_config(config)
        .context("Failed to load the denoising network")?;
    let outcome = processor.run(&mut BarProgress::new())
        .context("Batch processing failed")?;

    println!("{}", "*".repeat(RULE_WIDTH));
    println!("Clean: {}", outcome.clean_count());
    println!("Noisy: {}", outcome.noisy_count());
    println!("Results: {}", outcome.results_path.display());
    println!("Time: {:.2}s", outcome.processing_time.as_secs_f64());
    println!("Done!");

    Ok(())
}

fn print_banner(config: &Config) {
    println!("{}", "*".repeat(RULE_WIDTH));
    println!(
        "Starting to process the {} files in the '{}' directory",
        config.extension(),
        config.source_dir().display()
    );
    println!("{}", "*".repeat(RULE_WIDTH));
    println!("{}", specclean::get_library_info());
    println!("{}", "-".repeat(RULE_WIDTH));
    for (key, value) in config.summary() {
        println!("\t{}:\t{}", key, value);
    }
    println!("{}", "*".repeat(RULE_WIDTH));
}
