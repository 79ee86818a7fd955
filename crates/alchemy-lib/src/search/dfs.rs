use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::path::{CraftPath, Step};

use super::{SearchContext, SearchTrace};

/// Result of descending into one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Descent {
    Found(CraftPath),
    /// The element is already being derived further up this branch.
    Cycle,
    /// No admissible recipe yields a complete derivation.
    NoAdmissibleRecipe,
    DepthExceeded,
}

/// Backtracking depth-first search that keeps the first complete derivation
/// in recipe order.
struct Descender<'c, 'g> {
    ctx: &'c SearchContext<'g>,
    nodes_visited: usize,
    solved: HashMap<String, CraftPath>,
    dead_ends: HashSet<String>,
    /// Bumped whenever a result depended on the current branch (a cycle or
    /// the depth cap); such results are not memoized.
    truncations: usize,
}

impl<'c, 'g> Descender<'c, 'g> {
    fn new(ctx: &'c SearchContext<'g>) -> Self {
        Self {
            ctx,
            nodes_visited: 0,
            solved: HashMap::new(),
            dead_ends: HashSet::new(),
            truncations: 0,
        }
    }

    fn descend(&mut self, element: &str, branch: &mut HashSet<String>, depth: usize) -> Descent {
        self.nodes_visited += 1;
        if self.ctx.is_leaf(element) {
            return Descent::Found(CraftPath::new());
        }
        if let Some(path) = self.solved.get(element) {
            return Descent::Found(path.clone());
        }
        if self.dead_ends.contains(element) {
            return Descent::NoAdmissibleRecipe;
        }
        if branch.contains(element) {
            self.truncations += 1;
            return Descent::Cycle;
        }
        if depth >= self.ctx.max_depth {
            self.truncations += 1;
            return Descent::DepthExceeded;
        }

        let truncations_before = self.truncations;
        branch.insert(element.to_string());
        let graph = self.ctx.graph;
        let mut depth_limited = false;
        let mut outcome = Descent::NoAdmissibleRecipe;
        'recipes: for recipe in graph.admissible_recipes(element) {
            let mut parts = Vec::with_capacity(2);
            for ingredient in recipe.ingredients() {
                match self.descend(ingredient, branch, depth + 1) {
                    Descent::Found(path) => parts.push(path),
                    Descent::DepthExceeded => {
                        depth_limited = true;
                        continue 'recipes;
                    }
                    Descent::Cycle | Descent::NoAdmissibleRecipe => continue 'recipes,
                }
            }
            let mut path = CraftPath::new();
            for part in &parts {
                path.extend_from(part);
            }
            path.push(Step::new(recipe, element));
            outcome = Descent::Found(path);
            break;
        }
        branch.remove(element);

        if let Descent::Found(path) = &outcome {
            self.solved.insert(element.to_string(), path.clone());
        } else if depth_limited {
            outcome = Descent::DepthExceeded;
        } else if self.truncations == truncations_before {
            self.dead_ends.insert(element.to_string());
        }
        outcome
    }
}

/// First complete derivation of the target in recipe order.
pub(crate) fn find_path(ctx: &SearchContext<'_>) -> SearchTrace {
    let mut descender = Descender::new(ctx);
    let mut branch = HashSet::new();
    match descender.descend(&ctx.target, &mut branch, 0) {
        Descent::Found(path) => SearchTrace::found(path, descender.nodes_visited),
        failure => {
            debug!(target_element = %ctx.target, reason = ?failure, "depth-first search failed");
            SearchTrace::not_found(descender.nodes_visited)
        }
    }
}
