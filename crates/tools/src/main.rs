//! Command-line level generator: builds or loads a template catalog,
//! generates a level for a random or supplied graph, and prints it.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::SeedableRng;

use roomweave_core::graph::Graph;
use roomweave_core::{
    DesignLabel, LevelGenerator, ReplacementCatalog, TemplateCatalog, generate_level,
};

#[derive(Parser)]
#[command(about = "Generate a dungeon level from a connectivity graph")]
struct Args {
    /// Seed for the generator.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of graph nodes when drawing a random graph.
    #[arg(long, default_value_t = 6)]
    nodes: usize,

    /// Number of cycle-forming back edges when drawing a random graph.
    #[arg(long, default_value_t = 1)]
    back_edges: usize,

    /// Design label (default, fire, ice, forest) or "random" to draw one
    /// from the seed.
    #[arg(long, default_value = "default")]
    design: String,

    /// Load the template catalog from a JSON file instead of the built-in
    /// set.
    #[arg(long)]
    templates: Option<PathBuf>,

    /// Load the connectivity graph from a JSON file instead of drawing a
    /// random one.
    #[arg(long)]
    graph: Option<PathBuf>,

    /// Skip cosmetic tile replacements.
    #[arg(long)]
    plain: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let design: DesignLabel = if args.design == "random" {
        DesignLabel::pick_random(&mut ChaCha8Rng::seed_from_u64(args.seed))
    } else {
        args.design.parse().map_err(|message: String| anyhow::anyhow!(message))?
    };

    let templates = match &args.templates {
        Some(path) => TemplateCatalog::load(path)
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("loading template catalog from {}", path.display()))?,
        None => TemplateCatalog::build_default(),
    };
    let replacements =
        if args.plain { ReplacementCatalog::empty() } else { ReplacementCatalog::build_default() };

    let level = match &args.graph {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading graph from {}", path.display()))?;
            let graph = Graph::from_json(&text).context("parsing graph JSON")?;
            generate_level(args.seed, design, &graph, &templates, &replacements)
                .map_err(|e| anyhow::anyhow!("{e}"))?
        }
        None => {
            let mut generator = LevelGenerator::new(args.seed, design);
            generator
                .generate_random(args.nodes, args.back_edges, &templates, &replacements)
                .map_err(|e| anyhow::anyhow!("{e}"))?
        }
    };

    print!("{}", level.render_ascii());
    println!();
    println!(
        "rooms: {}  size: {}x{}  fingerprint: {:016x}",
        level.rooms.len(),
        level.width(),
        level.height(),
        level.layout_fingerprint()
    );
    Ok(())
}
