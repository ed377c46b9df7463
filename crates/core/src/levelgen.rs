//! Level generation pipeline: chain decomposition, solve ordering,
//! backtracking placement, door resolution, and assembly with a bounded
//! reachability retry loop.

mod assembler;
mod chains;
mod sequence;
mod solver;
mod space;

use std::fmt;

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::SeedableRng;

use crate::catalog::{ReplacementCatalog, RoomTemplate, TemplateCatalog};
use crate::graph::Graph;
use crate::level::Level;
use crate::types::DesignLabel;

pub use chains::{Chain, ChainKey, ChainSet, decompose};
pub use sequence::solve_order;
pub use space::ConfigurationSpace;

#[derive(Clone, Copy, Debug)]
pub struct GeneratorConfig {
    /// How many assembled levels may fail the start-to-end reachability
    /// check before generation gives up.
    pub max_reachability_retries: u32,
    pub apply_replacements: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self { max_reachability_retries: 32, apply_replacements: true }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GenerationError {
    EmptyCatalog { design: DesignLabel },
    NoSolution,
    RetryLimitExceeded { attempts: u32 },
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyCatalog { design } => {
                write!(f, "no room templates available for design {design:?}")
            }
            Self::NoSolution => write!(f, "placement search exhausted without a valid layout"),
            Self::RetryLimitExceeded { attempts } => {
                write!(f, "no reachable layout after {attempts} attempts")
            }
        }
    }
}

/// Seeded generator for one design. The RNG advances across calls, so
/// repeated `generate` calls on one instance yield different levels while a
/// fresh instance with the same seed replays the same sequence.
pub struct LevelGenerator {
    design: DesignLabel,
    config: GeneratorConfig,
    rng: ChaCha8Rng,
}

impl LevelGenerator {
    pub fn new(seed: u64, design: DesignLabel) -> Self {
        Self { design, config: GeneratorConfig::default(), rng: ChaCha8Rng::seed_from_u64(seed) }
    }

    pub fn with_config(seed: u64, design: DesignLabel, config: GeneratorConfig) -> Self {
        Self { design, config, rng: ChaCha8Rng::seed_from_u64(seed) }
    }

    pub fn design(&self) -> DesignLabel {
        self.design
    }

    /// Generate a level for an externally supplied connectivity graph.
    pub fn generate(
        &mut self,
        graph: &Graph,
        templates: &TemplateCatalog,
        replacements: &ReplacementCatalog,
    ) -> Result<Level, GenerationError> {
        let base = templates.templates_for(self.design);
        if base.is_empty() {
            return Err(GenerationError::EmptyCatalog { design: self.design });
        }
        if graph.node_count() == 0 {
            return Err(GenerationError::NoSolution);
        }
        let expanded: Vec<RoomTemplate> =
            base.iter().flat_map(RoomTemplate::rotations).collect();

        let chains = decompose(graph);
        let order = solve_order(&chains, graph);

        let empty = ReplacementCatalog::empty();
        let palette = if self.config.apply_replacements { replacements } else { &empty };

        let mut attempts = 0;
        loop {
            attempts += 1;
            let Some(solution) = solver::place_all(graph, &order, &expanded, &mut self.rng) else {
                return Err(GenerationError::NoSolution);
            };
            let level = assembler::assemble(solution, self.design, palette, &mut self.rng);
            if level.is_reachable(level.start_tile, level.end_tile) {
                return Ok(level);
            }
            if attempts > self.config.max_reachability_retries {
                return Err(GenerationError::RetryLimitExceeded { attempts });
            }
        }
    }

    /// Generate a level for a freshly drawn random connected graph.
    pub fn generate_random(
        &mut self,
        node_count: usize,
        back_edge_count: usize,
        templates: &TemplateCatalog,
        replacements: &ReplacementCatalog,
    ) -> Result<Level, GenerationError> {
        let graph = Graph::random(node_count, back_edge_count, &mut self.rng);
        self.generate(&graph, templates, replacements)
    }
}

/// One-shot convenience wrapper around [`LevelGenerator`].
pub fn generate_level(
    seed: u64,
    design: DesignLabel,
    graph: &Graph,
    templates: &TemplateCatalog,
    replacements: &ReplacementCatalog,
) -> Result<Level, GenerationError> {
    LevelGenerator::new(seed, design).generate(graph, templates, replacements)
}
