use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::debug;

use crate::graph::{Recipe, RecipeGraph};
use crate::path::{reconstruct_path, Predecessors};

use super::{SearchContext, SearchTrace};

/// Level-synchronous forward discovery from a set of leaves.
///
/// An element joins level `n + 1` when one of its admissible recipes uses
/// only elements from levels `0..=n`. Elements found within the same level
/// never feed each other, so the recorded recipe is the first admissible one
/// in tie-break order whose ingredients were known when the level started.
#[derive(Debug)]
pub(crate) struct ForwardDiscovery<'g> {
    graph: &'g RecipeGraph,
    levels: HashMap<String, usize>,
    predecessors: Predecessors,
    /// Every usable recipe per element, kept only when enumerating.
    alternatives: Option<HashMap<String, Vec<Recipe>>>,
    frontier: Vec<String>,
    level: usize,
}

impl<'g> ForwardDiscovery<'g> {
    pub(crate) fn seeded(graph: &'g RecipeGraph, leaves: &HashSet<String>) -> Self {
        let mut frontier: Vec<String> = leaves.iter().cloned().collect();
        frontier.sort();
        Self {
            graph,
            levels: leaves.iter().map(|leaf| (leaf.clone(), 0)).collect(),
            predecessors: Predecessors::new(),
            alternatives: None,
            frontier,
            level: 0,
        }
    }

    /// Also record every recipe that could have produced each element.
    pub(crate) fn recording_alternatives(mut self) -> Self {
        self.alternatives = Some(HashMap::new());
        self
    }

    pub(crate) fn level(&self) -> usize {
        self.level
    }

    pub(crate) fn is_discovered(&self, element: &str) -> bool {
        self.levels.contains_key(element)
    }

    pub(crate) fn discovered_count(&self) -> usize {
        self.levels.len()
    }

    pub(crate) fn predecessors(&self) -> &Predecessors {
        &self.predecessors
    }

    pub(crate) fn alternatives(&self, element: &str) -> &[Recipe] {
        self.alternatives
            .as_ref()
            .and_then(|alternatives| alternatives.get(element))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Discover the next level. Returns how many elements it added; zero
    /// means the closure is complete.
    pub(crate) fn expand_level(&mut self) -> usize {
        let graph = self.graph;
        let candidates: BTreeSet<&'g str> = self
            .frontier
            .iter()
            .flat_map(|element| graph.products_of(element))
            .map(String::as_str)
            .filter(|product| !self.levels.contains_key(*product))
            .collect();

        let mut discovered: Vec<(&'g str, Vec<Recipe>)> = Vec::new();
        for candidate in candidates {
            let mut usable = graph.admissible_recipes(candidate).filter(|recipe| {
                self.levels.contains_key(&recipe.first) && self.levels.contains_key(&recipe.second)
            });
            let recipes: Vec<Recipe> = if self.alternatives.is_some() {
                usable.cloned().collect()
            } else {
                usable.next().cloned().into_iter().collect()
            };
            if !recipes.is_empty() {
                discovered.push((candidate, recipes));
            }
        }

        self.level += 1;
        self.frontier.clear();
        for (element, recipes) in discovered {
            self.levels.insert(element.to_string(), self.level);
            self.predecessors
                .insert(element.to_string(), recipes[0].clone());
            if let Some(alternatives) = self.alternatives.as_mut() {
                alternatives.insert(element.to_string(), recipes);
            }
            self.frontier.push(element.to_string());
        }
        debug!(
            level = self.level,
            discovered = self.frontier.len(),
            "expanded discovery level"
        );
        self.frontier.len()
    }

    /// Expand until `target` is discovered, the closure completes, or
    /// `max_depth` levels have run. Returns whether `target` was reached.
    pub(crate) fn run_until(&mut self, target: &str, max_depth: usize) -> bool {
        while !self.is_discovered(target) && self.level < max_depth {
            if self.expand_level() == 0 {
                break;
            }
        }
        self.is_discovered(target)
    }
}

/// Single shortest-level path via forward discovery.
pub(crate) fn find_path(ctx: &SearchContext<'_>) -> SearchTrace {
    let mut forward = ForwardDiscovery::seeded(ctx.graph, &ctx.leaves);
    if forward.run_until(&ctx.target, ctx.max_depth) {
        let path = reconstruct_path(&ctx.target, forward.predecessors(), &ctx.leaves);
        return SearchTrace::found(path, forward.discovered_count());
    }
    debug!(
        target_element = %ctx.target,
        levels = forward.level(),
        "breadth-first discovery exhausted"
    );
    SearchTrace::not_found(forward.discovered_count())
}
