//! Enumeration of several distinct paths to one target.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::sync::{Mutex, PoisonError};

use rayon::prelude::*;
use tracing::debug;

use crate::graph::Recipe;
use crate::path::{CraftPath, Step, UniquePaths};

use super::bfs::ForwardDiscovery;
use super::{SearchContext, SearchTrace};

/// Every combination of one left and one right derivation, finished with the
/// step for `result`, offered to `unique` until it fills.
fn combine_into(
    unique: &mut UniquePaths,
    recipe: &Recipe,
    result: &str,
    lefts: &[CraftPath],
    rights: &[CraftPath],
    quota: Option<&PathQuota>,
) {
    for left in lefts {
        for right in rights {
            if unique.is_full() || quota.is_some_and(PathQuota::is_exhausted) {
                return;
            }
            let mut path = left.clone();
            path.extend_from(right);
            path.push(Step::new(recipe, result));
            if unique.contains(&path) {
                continue;
            }
            if quota.is_some_and(|quota| !quota.try_claim()) {
                return;
            }
            unique.offer(path);
        }
    }
}

/// Breadth-first enumeration.
///
/// Discovery runs level by level until the target appears, keeping every
/// recipe whose ingredients sit at lower levels. Paths are then expanded as
/// the Cartesian product of ingredient derivations, memoized per element.
pub(crate) fn enumerate_bfs(ctx: &SearchContext<'_>) -> SearchTrace {
    let mut forward = ForwardDiscovery::seeded(ctx.graph, &ctx.leaves).recording_alternatives();
    if !forward.run_until(&ctx.target, ctx.max_depth) {
        return SearchTrace::not_found(forward.discovered_count());
    }

    let mut expander = BfsExpander {
        ctx,
        forward: &forward,
        memo: HashMap::new(),
    };
    let paths = expander.expand(&ctx.target);
    debug!(
        target_element = %ctx.target,
        paths = paths.len(),
        memoized = expander.memo.len(),
        "breadth-first enumeration complete"
    );
    SearchTrace {
        paths: paths.to_vec(),
        nodes_visited: forward.discovered_count(),
    }
}

struct BfsExpander<'a, 'g> {
    ctx: &'a SearchContext<'g>,
    forward: &'a ForwardDiscovery<'g>,
    memo: HashMap<String, Rc<Vec<CraftPath>>>,
}

impl BfsExpander<'_, '_> {
    fn expand(&mut self, element: &str) -> Rc<Vec<CraftPath>> {
        if self.ctx.is_leaf(element) {
            return Rc::new(vec![CraftPath::new()]);
        }
        if let Some(paths) = self.memo.get(element) {
            return Rc::clone(paths);
        }

        let forward = self.forward;
        let mut unique = UniquePaths::with_cap(self.ctx.max_paths);
        for recipe in forward.alternatives(element) {
            if unique.is_full() {
                break;
            }
            let lefts = self.expand(&recipe.first);
            let rights = self.expand(&recipe.second);
            combine_into(&mut unique, recipe, element, &lefts, &rights, None);
        }

        let paths = Rc::new(unique.into_paths());
        self.memo.insert(element.to_string(), Rc::clone(&paths));
        paths
    }
}

/// Count of complete target paths claimed across concurrently explored
/// branches.
#[derive(Debug)]
pub(crate) struct PathQuota {
    claimed: Mutex<usize>,
    cap: usize,
}

impl PathQuota {
    pub(crate) fn new(cap: usize) -> Self {
        Self {
            claimed: Mutex::new(0),
            cap,
        }
    }

    /// Reserve room for one more path. Returns `false` once the cap is reached.
    pub(crate) fn try_claim(&self) -> bool {
        let mut claimed = self.claimed.lock().unwrap_or_else(PoisonError::into_inner);
        if *claimed >= self.cap {
            return false;
        }
        *claimed += 1;
        true
    }

    pub(crate) fn is_exhausted(&self) -> bool {
        *self.claimed.lock().unwrap_or_else(PoisonError::into_inner) >= self.cap
    }
}

/// Depth-first enumeration.
///
/// Each admissible recipe of the target is explored as its own branch on the
/// rayon pool. Branches share a [`PathQuota`] so the total never exceeds the
/// cap; results are merged in recipe order.
pub(crate) fn enumerate_dfs(ctx: &SearchContext<'_>) -> SearchTrace {
    let branches: Vec<&Recipe> = ctx.graph.admissible_recipes(&ctx.target).collect();
    let quota = PathQuota::new(ctx.max_paths);

    let explored: Vec<(Vec<CraftPath>, usize)> = branches
        .par_iter()
        .map(|recipe| {
            let mut walker = DfsWalker::new(ctx, &quota);
            let paths = walker.branch(&ctx.target, recipe);
            (paths, walker.nodes_visited)
        })
        .collect();

    let mut unique = UniquePaths::with_cap(ctx.max_paths);
    let mut nodes_visited = 1;
    for (paths, visited) in explored {
        nodes_visited += visited;
        for path in paths {
            unique.offer(path);
        }
    }
    debug!(
        target_element = %ctx.target,
        branches = branches.len(),
        paths = unique.len(),
        "depth-first enumeration complete"
    );
    SearchTrace {
        paths: unique.into_paths(),
        nodes_visited,
    }
}

struct DfsWalker<'c, 'g> {
    ctx: &'c SearchContext<'g>,
    quota: &'c PathQuota,
    nodes_visited: usize,
    memo: HashMap<String, Rc<Vec<CraftPath>>>,
    truncations: usize,
}

impl<'c, 'g> DfsWalker<'c, 'g> {
    fn new(ctx: &'c SearchContext<'g>, quota: &'c PathQuota) -> Self {
        Self {
            ctx,
            quota,
            nodes_visited: 0,
            memo: HashMap::new(),
            truncations: 0,
        }
    }

    /// Paths for `target` that start with `recipe`, claimed against the
    /// shared quota. Empty without exploring once other branches filled it.
    fn branch(&mut self, target: &str, recipe: &Recipe) -> Vec<CraftPath> {
        if self.quota.is_exhausted() {
            return Vec::new();
        }
        let mut ancestors = HashSet::from([target.to_string()]);
        let lefts = self.enumerate(&recipe.first, &mut ancestors, 1);
        let rights = if lefts.is_empty() {
            Rc::new(Vec::new())
        } else {
            self.enumerate(&recipe.second, &mut ancestors, 1)
        };
        let mut unique = UniquePaths::with_cap(self.ctx.max_paths);
        combine_into(&mut unique, recipe, target, &lefts, &rights, Some(self.quota));
        unique.into_paths()
    }

    fn enumerate(
        &mut self,
        element: &str,
        ancestors: &mut HashSet<String>,
        depth: usize,
    ) -> Rc<Vec<CraftPath>> {
        self.nodes_visited += 1;
        if self.ctx.is_leaf(element) {
            return Rc::new(vec![CraftPath::new()]);
        }
        if let Some(paths) = self.memo.get(element) {
            return Rc::clone(paths);
        }
        if ancestors.contains(element) || depth >= self.ctx.max_depth {
            self.truncations += 1;
            return Rc::new(Vec::new());
        }

        let truncations_before = self.truncations;
        ancestors.insert(element.to_string());
        let graph = self.ctx.graph;
        let mut unique = UniquePaths::with_cap(self.ctx.max_paths);
        for recipe in graph.admissible_recipes(element) {
            if unique.is_full() {
                break;
            }
            // partial results after the quota fills must not be memoized
            if self.quota.is_exhausted() {
                self.truncations += 1;
                break;
            }
            let lefts = self.enumerate(&recipe.first, ancestors, depth + 1);
            if lefts.is_empty() {
                continue;
            }
            let rights = self.enumerate(&recipe.second, ancestors, depth + 1);
            combine_into(&mut unique, recipe, element, &lefts, &rights, None);
        }
        ancestors.remove(element);

        let paths = Rc::new(unique.into_paths());
        if self.truncations == truncations_before {
            self.memo.insert(element.to_string(), Rc::clone(&paths));
        }
        paths
    }
}
