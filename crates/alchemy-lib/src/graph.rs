use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, info, warn};

use crate::dataset::RecipeRecord;
use crate::error::{Error, Result};

/// Elements that exist without a recipe. They are the only valid leaves of a
/// path and always sit at tier 0.
pub const BASE_ELEMENTS: [&str; 5] = ["air", "earth", "fire", "water", "time"];

/// Minimum Jaro-Winkler similarity for an element name to be offered as a
/// suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// Advancement rank of an element.
pub type Tier = i32;

/// Case-normalize an element identifier.
pub fn normalize_element(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Whether `element` (already normalized) is one of [`BASE_ELEMENTS`].
pub fn is_base_element(element: &str) -> bool {
    BASE_ELEMENTS.contains(&element)
}

/// Two ingredients that combine into a result element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Recipe {
    pub first: String,
    pub second: String,
}

impl Recipe {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }

    /// Both ingredients in declaration order.
    pub fn ingredients(&self) -> [&str; 2] {
        [self.first.as_str(), self.second.as_str()]
    }

    /// The ingredient paired with `ingredient` in this recipe.
    pub fn sibling_of(&self, ingredient: &str) -> &str {
        if self.first == ingredient {
            &self.second
        } else {
            &self.first
        }
    }

    /// Order-insensitive identity, so `a + b` and `b + a` compare equal.
    fn unordered_key(&self) -> (&str, &str) {
        if self.first <= self.second {
            (&self.first, &self.second)
        } else {
            (&self.second, &self.first)
        }
    }
}

/// Immutable recipe graph shared by every search.
///
/// Recipes for each element are kept in lexicographic ingredient order, which
/// is the tie-break every strategy uses when more than one recipe applies.
#[derive(Debug, Clone, Default)]
pub struct RecipeGraph {
    recipes: HashMap<String, Vec<Recipe>>,
    tiers: HashMap<String, Tier>,
    reverse: HashMap<String, Vec<String>>,
    names: Vec<String>,
}

impl RecipeGraph {
    /// Tier of `element`, defaulting to 0 for elements the dataset omits.
    pub fn tier(&self, element: &str) -> Tier {
        self.tiers.get(element).copied().unwrap_or_default()
    }

    /// Every recipe declared for `element`, admissible or not.
    pub fn recipes(&self, element: &str) -> &[Recipe] {
        self.recipes
            .get(element)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Recipes for `element` that pass the combination rule, in tie-break order.
    pub fn admissible_recipes<'a>(&'a self, element: &'a str) -> impl Iterator<Item = &'a Recipe> {
        self.recipes(element)
            .iter()
            .filter(move |recipe| self.is_admissible(element, &recipe.first, &recipe.second))
    }

    /// The combination rule: both ingredients must sit strictly below the
    /// result's tier. Equal tiers are rejected.
    pub fn is_admissible(&self, result: &str, first: &str, second: &str) -> bool {
        let result_tier = self.tier(result);
        self.tier(first) < result_tier && self.tier(second) < result_tier
    }

    /// Elements that `ingredient` helps produce, sorted and deduplicated.
    pub fn products_of(&self, ingredient: &str) -> &[String] {
        self.reverse
            .get(ingredient)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Reverse adjacency: ingredient to the elements it can help build.
    pub fn reverse(&self) -> &HashMap<String, Vec<String>> {
        &self.reverse
    }

    /// Whether the graph knows `element` as a result, an ingredient, or a base.
    pub fn contains(&self, element: &str) -> bool {
        self.tiers.contains_key(element) || self.reverse.contains_key(element)
    }

    /// All known element names in sorted order.
    pub fn elements(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn element_count(&self) -> usize {
        self.names.len()
    }

    pub fn recipe_count(&self) -> usize {
        self.recipes.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Find element names similar to `name`, best match first.
    pub fn fuzzy_matches(&self, name: &str, limit: usize) -> Vec<String> {
        let needle = normalize_element(name);
        let mut scored: Vec<(f64, &String)> = self
            .names
            .iter()
            .map(|candidate| (strsim::jaro_winkler(&needle, candidate), candidate))
            .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
        scored
            .into_iter()
            .take(limit)
            .map(|(_, candidate)| candidate.clone())
            .collect()
    }

    /// Normalize `name` and confirm the graph knows it.
    pub fn resolve(&self, name: &str) -> Result<String> {
        let element = normalize_element(name);
        if self.contains(&element) {
            return Ok(element);
        }
        Err(Error::UnknownElement {
            name: name.trim().to_string(),
            suggestions: self.fuzzy_matches(name, 3),
        })
    }
}

/// Build the recipe graph from flat loader records.
///
/// Identifiers are case-normalized. Malformed records are skipped and recipes
/// declared for base elements are ignored; neither is fatal.
pub fn build_graph(records: &[RecipeRecord]) -> RecipeGraph {
    let mut recipes: HashMap<String, Vec<Recipe>> = HashMap::new();
    let mut tiers: HashMap<String, Tier> = HashMap::new();
    let mut skipped = 0usize;

    for record in records {
        let element = normalize_element(&record.element);
        let first = normalize_element(&record.first);
        let second = normalize_element(&record.second);
        if element.is_empty() || first.is_empty() || second.is_empty() {
            skipped += 1;
            continue;
        }
        if is_base_element(&element) {
            debug!(element = %element, "ignoring recipe declared for a base element");
            continue;
        }

        let tier = record.tier.unwrap_or_default();
        if let Some(previous) = tiers.insert(element.clone(), tier) {
            if previous != tier {
                debug!(element = %element, previous, tier, "conflicting tiers; keeping the last");
            }
        }
        recipes
            .entry(element)
            .or_default()
            .push(Recipe::new(first, second));
    }

    if skipped > 0 {
        warn!(skipped, "skipped recipe records with empty names");
    }

    for base in BASE_ELEMENTS {
        tiers.insert(base.to_string(), 0);
    }

    for list in recipes.values_mut() {
        let mut seen = HashSet::new();
        list.retain(|recipe| {
            let (a, b) = recipe.unordered_key();
            seen.insert((a.to_string(), b.to_string()))
        });
        list.sort();
    }

    let mut reverse: HashMap<String, Vec<String>> = HashMap::new();
    for (result, list) in &recipes {
        for recipe in list {
            for ingredient in recipe.ingredients() {
                reverse
                    .entry(ingredient.to_string())
                    .or_default()
                    .push(result.clone());
            }
        }
    }
    for products in reverse.values_mut() {
        products.sort();
        products.dedup();
    }

    let names: BTreeSet<String> = tiers.keys().chain(reverse.keys()).cloned().collect();

    let graph = RecipeGraph {
        recipes,
        tiers,
        reverse,
        names: names.into_iter().collect(),
    };
    debug!(
        elements = graph.element_count(),
        recipes = graph.recipe_count(),
        "recipe graph built"
    );
    graph
}

/// Holder for the current graph snapshot.
///
/// Searches take an `Arc` snapshot and never see a reload that happens while
/// they run. The lock is held only long enough to clone or swap the `Arc`.
#[derive(Debug, Default)]
pub struct GraphStore {
    current: RwLock<Arc<RecipeGraph>>,
}

impl GraphStore {
    pub fn new(graph: RecipeGraph) -> Self {
        Self {
            current: RwLock::new(Arc::new(graph)),
        }
    }

    /// The graph that new searches should read.
    pub fn snapshot(&self) -> Arc<RecipeGraph> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Swap in a freshly built graph, returning the previous snapshot.
    pub fn replace(&self, graph: RecipeGraph) -> Arc<RecipeGraph> {
        let next = Arc::new(graph);
        info!(
            elements = next.element_count(),
            recipes = next.recipe_count(),
            "replacing recipe graph snapshot"
        );
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(element: &str, first: &str, second: &str, tier: Tier) -> RecipeRecord {
        RecipeRecord::new(element, first, second, tier)
    }

    #[test]
    fn identifiers_are_case_normalized() {
        let graph = build_graph(&[record(" Energy ", "FIRE", "Air", 1)]);
        assert_eq!(graph.tier("energy"), 1);
        assert_eq!(graph.recipes("energy"), &[Recipe::new("fire", "air")]);
        assert_eq!(graph.products_of("fire"), &["energy".to_string()]);
    }

    #[test]
    fn unknown_elements_default_to_tier_zero() {
        let graph = build_graph(&[record("ghost", "ectoplasm", "fire", 3)]);
        assert_eq!(graph.tier("ectoplasm"), 0);
        assert_eq!(graph.tier("nothing-at-all"), 0);
        assert!(graph.contains("ectoplasm"));
        assert!(!graph.contains("nothing-at-all"));
    }

    #[test]
    fn base_elements_stay_at_tier_zero_without_recipes() {
        let graph = build_graph(&[record("fire", "lava", "air", 2), record("lava", "earth", "fire", 1)]);
        assert_eq!(graph.tier("fire"), 0);
        assert!(graph.recipes("fire").is_empty());
        assert!(graph.contains("time"));
    }

    #[test]
    fn combination_rule_rejects_equal_tiers() {
        let graph = build_graph(&[
            record("mud", "water", "earth", 1),
            record("stone", "lava", "air", 2),
            record("lava", "earth", "fire", 1),
            record("brick", "mud", "stone", 2),
            record("x", "x", "fire", 1),
        ]);
        assert!(graph.is_admissible("mud", "water", "earth"));
        assert!(!graph.is_admissible("brick", "mud", "stone"));
        assert!(!graph.is_admissible("x", "x", "fire"));
        assert_eq!(graph.admissible_recipes("x").count(), 0);
    }

    #[test]
    fn swapped_duplicate_recipes_collapse() {
        let graph = build_graph(&[
            record("energy", "fire", "air", 1),
            record("energy", "air", "fire", 1),
            record("energy", "fire", "fire", 1),
        ]);
        assert_eq!(
            graph.recipes("energy"),
            &[Recipe::new("fire", "air"), Recipe::new("fire", "fire")]
        );
    }

    #[test]
    fn reverse_adjacency_is_deduplicated() {
        let graph = build_graph(&[
            record("energy", "fire", "air", 1),
            record("energy", "fire", "fire", 1),
            record("lava", "earth", "fire", 1),
        ]);
        assert_eq!(
            graph.products_of("fire"),
            &["energy".to_string(), "lava".to_string()]
        );
        assert_eq!(graph.reverse().len(), 3);
    }

    #[test]
    fn malformed_records_are_skipped() {
        let graph = build_graph(&[record("", "fire", "air", 1), record("mud", "water", "earth", 1)]);
        assert_eq!(graph.recipe_count(), 1);
    }

    #[test]
    fn resolve_suggests_close_names() {
        let graph = build_graph(&[record("mud", "water", "earth", 1)]);
        assert_eq!(graph.resolve("MUD").unwrap(), "mud");
        match graph.resolve("watr") {
            Err(Error::UnknownElement { suggestions, .. }) => {
                assert_eq!(suggestions.first().map(String::as_str), Some("water"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn store_snapshots_survive_replacement() {
        let store = GraphStore::new(build_graph(&[record("mud", "water", "earth", 1)]));
        let before = store.snapshot();
        let previous = store.replace(build_graph(&[record("lava", "earth", "fire", 1)]));

        assert!(Arc::ptr_eq(&before, &previous));
        assert!(before.contains("mud"));
        assert!(!store.snapshot().contains("mud"));
        assert!(store.snapshot().contains("lava"));
    }
}
