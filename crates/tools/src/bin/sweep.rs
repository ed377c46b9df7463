//! Seed sweep: generate many levels across a seed range and report failure
//! counts, for shaking out unsolvable graph shapes.

use clap::Parser;

use roomweave_core::{
    DesignLabel, GenerationError, LevelGenerator, ReplacementCatalog, TemplateCatalog,
};

#[derive(Parser)]
#[command(about = "Generate levels across a seed range and report failures")]
struct Args {
    #[arg(long, default_value_t = 0)]
    start_seed: u64,

    #[arg(long, default_value_t = 500)]
    count: u64,

    #[arg(long, default_value_t = 8)]
    nodes: usize,

    #[arg(long, default_value_t = 2)]
    back_edges: usize,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let templates = TemplateCatalog::build_default();
    let replacements = ReplacementCatalog::empty();

    let mut generated = 0u64;
    let mut no_solution = 0u64;
    let mut retry_exceeded = 0u64;

    for seed in args.start_seed..args.start_seed + args.count {
        let mut generator = LevelGenerator::new(seed, DesignLabel::Default);
        match generator.generate_random(args.nodes, args.back_edges, &templates, &replacements) {
            Ok(_) => generated += 1,
            Err(GenerationError::NoSolution) => {
                no_solution += 1;
                println!("seed {seed}: no solution");
            }
            Err(GenerationError::RetryLimitExceeded { attempts }) => {
                retry_exceeded += 1;
                println!("seed {seed}: retry limit hit after {attempts} attempts");
            }
            Err(other) => anyhow::bail!("seed {seed}: unexpected failure: {other}"),
        }
    }

    println!(
        "{generated} generated, {no_solution} unsolvable, {retry_exceeded} over retry limit"
    );
    Ok(())
}
