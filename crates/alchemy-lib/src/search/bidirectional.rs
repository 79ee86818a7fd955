use std::collections::{HashMap, HashSet, VecDeque};

use tracing::debug;

use crate::graph::RecipeGraph;
use crate::path::{reconstruct_path, CraftPath, Predecessors, Step};

use super::{SearchContext, SearchTrace};

/// Order in which each side pops its frontier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FrontierOrder {
    /// Queue: breadth-first on both sides.
    Fifo,
    /// Stack: depth-first on both sides.
    Lifo,
}

fn pop(frontier: &mut VecDeque<String>, order: FrontierOrder) -> Option<String> {
    match order {
        FrontierOrder::Fifo => frontier.pop_front(),
        FrontierOrder::Lifo => frontier.pop_back(),
    }
}

/// Grows the set of craftable elements outward from the leaves.
///
/// Each element carries the discovery level [`ForwardDiscovery`] would give
/// it: leaves are level 0, a product is one above the higher of its
/// ingredients. Products beyond `max_depth` are never recorded, and a
/// cheaper recipe found later lowers a recorded level.
///
/// [`ForwardDiscovery`]: super::bfs::ForwardDiscovery
struct ForwardSide {
    levels: HashMap<String, usize>,
    predecessors: Predecessors,
    frontier: VecDeque<String>,
    max_depth: usize,
}

impl ForwardSide {
    fn seeded(leaves: &HashSet<String>, max_depth: usize) -> Self {
        let mut seeds: Vec<String> = leaves.iter().cloned().collect();
        seeds.sort();
        Self {
            levels: leaves.iter().map(|leaf| (leaf.clone(), 0)).collect(),
            predecessors: Predecessors::new(),
            frontier: seeds.into(),
            max_depth,
        }
    }

    fn level_of(&self, element: &str) -> Option<usize> {
        self.levels.get(element).copied()
    }

    /// Pop one element and record every product it completes within the
    /// level cap. `None` once the frontier is exhausted.
    fn step(&mut self, graph: &RecipeGraph, order: FrontierOrder) -> Option<Vec<String>> {
        let element = pop(&mut self.frontier, order)?;
        let mut discovered = Vec::new();
        for product in graph.products_of(&element) {
            let best = graph
                .admissible_recipes(product)
                .filter_map(|recipe| {
                    let first = self.level_of(&recipe.first)?;
                    let second = self.level_of(&recipe.second)?;
                    Some((first.max(second) + 1, recipe))
                })
                .min_by_key(|(level, _)| *level);
            let Some((level, recipe)) = best else {
                continue;
            };
            let known = self.level_of(product);
            if level > self.max_depth || known.is_some_and(|known| known <= level) {
                continue;
            }
            self.predecessors.insert(product.clone(), recipe.clone());
            self.levels.insert(product.clone(), level);
            self.frontier.push_back(product.clone());
            discovered.push(product.clone());
        }
        Some(discovered)
    }
}

/// How an element reached by the backward side feeds the target.
#[derive(Debug, Clone, Default)]
struct Requirement {
    /// Steps from the one consuming this element up to the one producing the
    /// target, in the order the backward side took them (target first).
    chain: Vec<Step>,
    /// The other ingredient of every step in `chain`.
    siblings: Vec<String>,
}

/// Walks recipes backward from the target toward the leaves.
struct BackwardSide {
    requirements: HashMap<String, Requirement>,
    frontier: VecDeque<String>,
}

impl BackwardSide {
    fn rooted(target: &str) -> Self {
        Self {
            requirements: HashMap::from([(target.to_string(), Requirement::default())]),
            frontier: VecDeque::from([target.to_string()]),
        }
    }

    fn step(&mut self, ctx: &SearchContext<'_>, order: FrontierOrder) -> Option<Vec<String>> {
        let element = pop(&mut self.frontier, order)?;
        if ctx.is_leaf(&element) {
            return Some(Vec::new());
        }
        let Some(current) = self.requirements.get(&element).cloned() else {
            return Some(Vec::new());
        };
        if current.chain.len() >= ctx.max_depth {
            return Some(Vec::new());
        }

        let mut reached = Vec::new();
        for recipe in ctx.graph.admissible_recipes(&element) {
            for ingredient in recipe.ingredients() {
                if self.requirements.contains_key(ingredient) {
                    continue;
                }
                let mut requirement = current.clone();
                requirement.chain.push(Step::new(recipe, &element));
                requirement
                    .siblings
                    .push(recipe.sibling_of(ingredient).to_string());
                self.requirements.insert(ingredient.to_string(), requirement);
                self.frontier.push_back(ingredient.to_string());
                reached.push(ingredient.to_string());
            }
        }
        Some(reached)
    }
}

/// Join the two sides at `element` if the forward side can build it and every
/// sibling the backward chain needs, and the joined derivation puts the
/// target no deeper than the forward level cap.
fn meet(
    element: &str,
    forward: &ForwardSide,
    backward: &BackwardSide,
    leaves: &HashSet<String>,
) -> Option<CraftPath> {
    let mut level = forward.level_of(element)?;
    let requirement = backward.requirements.get(element)?;
    for sibling in requirement.siblings.iter().rev() {
        level = level.max(forward.level_of(sibling)?) + 1;
    }
    if level > forward.max_depth {
        return None;
    }

    let mut path = reconstruct_path(element, &forward.predecessors, leaves);
    for sibling in &requirement.siblings {
        path.extend_from(&reconstruct_path(sibling, &forward.predecessors, leaves));
    }
    for step in requirement.chain.iter().rev() {
        path.push(step.clone());
    }
    Some(path)
}

/// Alternate one forward and one backward step until an element satisfies
/// both sides or both frontiers run dry.
pub(crate) fn find_path(ctx: &SearchContext<'_>, order: FrontierOrder) -> SearchTrace {
    let mut forward = ForwardSide::seeded(&ctx.leaves, ctx.max_depth);
    let mut backward = BackwardSide::rooted(&ctx.target);
    let mut nodes_visited = forward.levels.len() + 1;

    loop {
        let forward_step = forward.step(ctx.graph, order);
        for element in forward_step.iter().flatten() {
            nodes_visited += 1;
            if let Some(path) = meet(element, &forward, &backward, &ctx.leaves) {
                debug!(meeting_point = %element, side = "forward", "frontiers met");
                return SearchTrace::found(path, nodes_visited);
            }
        }

        let backward_step = backward.step(ctx, order);
        for element in backward_step.iter().flatten() {
            nodes_visited += 1;
            if let Some(path) = meet(element, &forward, &backward, &ctx.leaves) {
                debug!(meeting_point = %element, side = "backward", "frontiers met");
                return SearchTrace::found(path, nodes_visited);
            }
        }

        if forward_step.is_none() && backward_step.is_none() {
            debug!(target_element = %ctx.target, "bidirectional frontiers exhausted");
            return SearchTrace::not_found(nodes_visited);
        }
    }
}
