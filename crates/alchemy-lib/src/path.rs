//! Combination steps, paths, and reconstruction from recorded predecessors.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Serialize, Serializer};
use thiserror::Error;
use tracing::debug;

use crate::graph::{Recipe, RecipeGraph};

/// Recipe chosen for each discovered element during a search.
pub type Predecessors = HashMap<String, Recipe>;

/// One combination, rendered as `"<first> + <second> = <result>"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Step {
    pub first: String,
    pub second: String,
    pub result: String,
}

impl Step {
    pub fn new(recipe: &Recipe, result: &str) -> Self {
        Self {
            first: recipe.first.clone(),
            second: recipe.second.clone(),
            result: result.to_string(),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} + {} = {}", self.first, self.second, self.result)
    }
}

impl Serialize for Step {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Ordered combination steps leading from leaf elements to a target.
///
/// Each element is produced at most once; pushing a step for an element that
/// is already produced is a no-op. Equality is order-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CraftPath {
    steps: Vec<Step>,
}

impl CraftPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Whether some step already produces `element`.
    pub fn produces(&self, element: &str) -> bool {
        self.steps.iter().any(|step| step.result == element)
    }

    /// Append `step` unless its result is already produced. Returns whether the
    /// step was added.
    pub fn push(&mut self, step: Step) -> bool {
        if self.produces(&step.result) {
            return false;
        }
        self.steps.push(step);
        true
    }

    /// Append every step of `other`, skipping elements already produced.
    pub fn extend_from(&mut self, other: &CraftPath) {
        for step in &other.steps {
            self.push(step.clone());
        }
    }

    /// Steps as display strings.
    pub fn rendered(&self) -> Vec<String> {
        self.steps.iter().map(Step::to_string).collect()
    }

    /// Check that the path builds `target` from `leaves` using only admissible
    /// steps, each ingredient being a leaf or an earlier result.
    pub fn verify(
        &self,
        graph: &RecipeGraph,
        leaves: &HashSet<String>,
        target: &str,
    ) -> Result<(), PathDefect> {
        let mut available: HashSet<&str> = leaves.iter().map(String::as_str).collect();
        for step in &self.steps {
            if !graph.is_admissible(&step.result, &step.first, &step.second) {
                return Err(PathDefect::Inadmissible(step.clone()));
            }
            for ingredient in [&step.first, &step.second] {
                if !available.contains(ingredient.as_str()) {
                    return Err(PathDefect::MissingIngredient {
                        step: step.clone(),
                        ingredient: ingredient.clone(),
                    });
                }
            }
            available.insert(step.result.as_str());
        }

        match self.steps.last() {
            Some(last) if last.result == target => Ok(()),
            None if leaves.contains(target) => Ok(()),
            last => Err(PathDefect::WrongTarget {
                expected: target.to_string(),
                actual: last.map(|step| step.result.clone()),
            }),
        }
    }
}

/// Reason a path fails [`CraftPath::verify`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathDefect {
    #[error("step '{0}' violates the tier rule")]
    Inadmissible(Step),

    #[error("step '{step}' uses '{ingredient}' before it is available")]
    MissingIngredient { step: Step, ingredient: String },

    #[error("path ends at {actual:?} instead of '{expected}'")]
    WrongTarget {
        expected: String,
        actual: Option<String>,
    },
}

/// Rebuild the path for `target` from the recipe recorded per element.
///
/// Ingredients are expanded depth-first, left before right, so every step
/// follows the steps for both of its ingredients.
pub fn reconstruct_path(
    target: &str,
    predecessors: &Predecessors,
    leaves: &HashSet<String>,
) -> CraftPath {
    let mut path = CraftPath::new();
    let mut expanding = HashSet::new();
    append_derivation(target, predecessors, leaves, &mut path, &mut expanding);
    path
}

fn append_derivation(
    element: &str,
    predecessors: &Predecessors,
    leaves: &HashSet<String>,
    path: &mut CraftPath,
    expanding: &mut HashSet<String>,
) {
    if leaves.contains(element) || path.produces(element) {
        return;
    }
    if !expanding.insert(element.to_string()) {
        debug!(element, "cycle while reconstructing; skipping");
        return;
    }
    let Some(recipe) = predecessors.get(element) else {
        debug!(element, "no recorded recipe while reconstructing");
        return;
    };

    append_derivation(&recipe.first, predecessors, leaves, path, expanding);
    append_derivation(&recipe.second, predecessors, leaves, path, expanding);
    path.push(Step::new(recipe, element));
}

/// Insertion-ordered set of distinct paths with a size cap.
#[derive(Debug, Clone)]
pub struct UniquePaths {
    seen: HashSet<CraftPath>,
    paths: Vec<CraftPath>,
    cap: usize,
}

impl UniquePaths {
    pub fn with_cap(cap: usize) -> Self {
        Self {
            seen: HashSet::new(),
            paths: Vec::new(),
            cap,
        }
    }

    /// Keep `path` if it is new and the cap has room. Returns whether it was kept.
    pub fn offer(&mut self, path: CraftPath) -> bool {
        if self.is_full() || self.seen.contains(&path) {
            return false;
        }
        self.seen.insert(path.clone());
        self.paths.push(path);
        true
    }

    pub fn is_full(&self) -> bool {
        self.paths.len() >= self.cap
    }

    pub fn contains(&self, path: &CraftPath) -> bool {
        self.seen.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn into_paths(self) -> Vec<CraftPath> {
        self.paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::RecipeRecord;
    use crate::graph::build_graph;

    fn leaves() -> HashSet<String> {
        ["air", "earth", "fire", "water"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    fn life_predecessors() -> Predecessors {
        HashMap::from([
            ("energy".to_string(), Recipe::new("fire", "air")),
            ("mud".to_string(), Recipe::new("water", "earth")),
            ("life".to_string(), Recipe::new("energy", "mud")),
        ])
    }

    #[test]
    fn step_renders_in_combination_order() {
        let step = Step::new(&Recipe::new("fire", "air"), "energy");
        assert_eq!(step.to_string(), "fire + air = energy");
        assert_eq!(
            serde_json::to_string(&step).unwrap(),
            "\"fire + air = energy\""
        );
    }

    #[test]
    fn reconstruction_orders_dependencies_first() {
        let path = reconstruct_path("life", &life_predecessors(), &leaves());
        assert_eq!(
            path.rendered(),
            vec![
                "fire + air = energy",
                "water + earth = mud",
                "energy + mud = life"
            ]
        );
    }

    #[test]
    fn reconstruction_emits_shared_ingredients_once() {
        let mut predecessors = life_predecessors();
        predecessors.insert("golem".to_string(), Recipe::new("life", "mud"));
        let path = reconstruct_path("golem", &predecessors, &leaves());
        assert_eq!(path.len(), 4);
        assert_eq!(path.steps().last().unwrap().result, "golem");
    }

    #[test]
    fn verify_accepts_valid_path_and_flags_defects() {
        let graph = build_graph(&[
            RecipeRecord::new("energy", "fire", "air", 1),
            RecipeRecord::new("mud", "water", "earth", 1),
            RecipeRecord::new("life", "energy", "mud", 2),
        ]);
        let path = reconstruct_path("life", &life_predecessors(), &leaves());
        assert_eq!(path.verify(&graph, &leaves(), "life"), Ok(()));

        let mut out_of_order = CraftPath::new();
        out_of_order.push(Step::new(&Recipe::new("energy", "mud"), "life"));
        assert!(matches!(
            out_of_order.verify(&graph, &leaves(), "life"),
            Err(PathDefect::MissingIngredient { .. })
        ));

        assert!(CraftPath::new().verify(&graph, &leaves(), "fire").is_ok());
        assert!(matches!(
            CraftPath::new().verify(&graph, &leaves(), "life"),
            Err(PathDefect::WrongTarget { .. })
        ));
    }

    #[test]
    fn unique_paths_dedupes_and_caps() {
        let mut first = CraftPath::new();
        first.push(Step::new(&Recipe::new("fire", "air"), "energy"));
        let mut second = CraftPath::new();
        second.push(Step::new(&Recipe::new("fire", "fire"), "energy"));
        let mut third = CraftPath::new();
        third.push(Step::new(&Recipe::new("air", "air"), "energy"));

        let mut unique = UniquePaths::with_cap(2);
        assert!(unique.offer(first.clone()));
        assert!(!unique.offer(first));
        assert!(unique.offer(second));
        assert!(unique.is_full());
        assert!(!unique.offer(third));
        assert_eq!(unique.len(), 2);
    }
}
