use std::fmt::Write;

use serde::Serialize;

use crate::error::Result;
use crate::graph::{is_base_element, RecipeGraph, Tier};
use crate::search::{SearchOutcome, StrategyKind};

/// Presentation style for turning a summary into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    PlainText,
    RichText,
}

/// Structured representation of a search outcome that higher-level consumers
/// can serialise.
///
/// Single-path strategies fill `steps`; enumerating strategies fill `paths`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchSummary {
    pub target: String,
    pub strategy: StrategyKind,
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paths: Option<Vec<Vec<String>>>,
    pub nodes_visited: usize,
    pub elapsed_ms: f64,
}

impl SearchSummary {
    pub fn from_outcome(outcome: &SearchOutcome) -> Self {
        let enumerating = matches!(
            outcome.strategy,
            StrategyKind::MultiBfs | StrategyKind::MultiDfs
        );
        let (steps, paths) = if enumerating {
            let paths = outcome.paths.iter().map(|path| path.rendered()).collect();
            (None, Some(paths))
        } else {
            (outcome.path().map(|path| path.rendered()), None)
        };

        Self {
            target: outcome.target.clone(),
            strategy: outcome.strategy,
            found: outcome.found,
            steps,
            paths,
            nodes_visited: outcome.stats.nodes_visited,
            elapsed_ms: outcome.stats.elapsed_ms(),
        }
    }

    /// Every path in the summary, whichever field holds it.
    pub fn all_paths(&self) -> Vec<&[String]> {
        match (&self.steps, &self.paths) {
            (Some(steps), _) => vec![steps.as_slice()],
            (None, Some(paths)) => paths.iter().map(Vec::as_slice).collect(),
            (None, None) => Vec::new(),
        }
    }

    pub fn render(&self, mode: RenderMode) -> String {
        match mode {
            RenderMode::PlainText => self.render_plain(),
            RenderMode::RichText => self.render_rich(),
        }
    }

    fn render_plain(&self) -> String {
        let mut buffer = String::new();
        if !self.found {
            let _ = writeln!(
                buffer,
                "No path to {} (strategy: {}, {} nodes visited, {:.3} ms)",
                self.target, self.strategy, self.nodes_visited, self.elapsed_ms
            );
            return buffer;
        }

        let paths = self.all_paths();
        let _ = writeln!(
            buffer,
            "Path to {} ({} path{}; strategy: {}, {} nodes visited, {:.3} ms):",
            self.target,
            paths.len(),
            if paths.len() == 1 { "" } else { "s" },
            self.strategy,
            self.nodes_visited,
            self.elapsed_ms
        );
        for (index, steps) in paths.iter().enumerate() {
            if paths.len() > 1 {
                let _ = writeln!(buffer, "#{}", index + 1);
            }
            if steps.is_empty() {
                let _ = writeln!(buffer, "  (base element, nothing to combine)");
            }
            for (number, step) in steps.iter().enumerate() {
                let _ = writeln!(buffer, "{:>3}: {}", number + 1, step);
            }
        }
        buffer
    }

    fn render_rich(&self) -> String {
        let mut buffer = String::new();
        let _ = writeln!(
            buffer,
            "**{}** ({}, strategy: `{}`)",
            self.target,
            if self.found { "found" } else { "not found" },
            self.strategy
        );
        for (index, steps) in self.all_paths().iter().enumerate() {
            let _ = writeln!(buffer, "* path {}", index + 1);
            for step in steps.iter() {
                let _ = writeln!(buffer, "  * `{}`", step);
            }
        }
        buffer
    }
}

/// One declared recipe and whether the tier rule admits it.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RecipeLine {
    pub first: String,
    pub second: String,
    pub admissible: bool,
}

/// What the graph knows about one element.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RecipeReport {
    pub element: String,
    pub tier: Tier,
    pub base: bool,
    pub recipes: Vec<RecipeLine>,
    pub used_in: Vec<String>,
}

impl RecipeReport {
    /// Resolve `name` in `graph` and describe it.
    pub fn from_graph(graph: &RecipeGraph, name: &str) -> Result<Self> {
        let element = graph.resolve(name)?;
        let recipes = graph
            .recipes(&element)
            .iter()
            .map(|recipe| RecipeLine {
                first: recipe.first.clone(),
                second: recipe.second.clone(),
                admissible: graph.is_admissible(&element, &recipe.first, &recipe.second),
            })
            .collect();

        Ok(Self {
            tier: graph.tier(&element),
            base: is_base_element(&element),
            recipes,
            used_in: graph.products_of(&element).to_vec(),
            element,
        })
    }

    pub fn render_plain(&self) -> String {
        let mut buffer = String::new();
        let kind = if self.base { ", base element" } else { "" };
        let _ = writeln!(buffer, "{} (tier {}{})", self.element, self.tier, kind);
        if self.recipes.is_empty() {
            let _ = writeln!(buffer, "  no recipes");
        }
        for recipe in &self.recipes {
            let marker = if recipe.admissible { "" } else { "  [blocked by tier rule]" };
            let _ = writeln!(
                buffer,
                "  {} + {}{}",
                recipe.first, recipe.second, marker
            );
        }
        if !self.used_in.is_empty() {
            let _ = writeln!(buffer, "Used in: {}", self.used_in.join(", "));
        }
        buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::RecipeRecord;
    use crate::graph::build_graph;
    use crate::search::{search, SearchRequest};

    fn graph() -> RecipeGraph {
        build_graph(&[
            RecipeRecord::new("energy", "fire", "air", 1),
            RecipeRecord::new("energy", "fire", "fire", 1),
            RecipeRecord::new("mud", "water", "earth", 1),
            RecipeRecord::new("life", "energy", "mud", 2),
            RecipeRecord::new("brick", "mud", "life", 2),
        ])
    }

    #[test]
    fn single_path_summary_uses_steps() {
        let outcome = search(&graph(), &SearchRequest::bfs("life")).unwrap();
        let summary = SearchSummary::from_outcome(&outcome);
        assert_eq!(summary.paths, None);
        assert_eq!(summary.steps.as_ref().map(Vec::len), Some(3));

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["strategy"], "bfs");
        assert!(json.get("paths").is_none());

        let text = summary.render(RenderMode::PlainText);
        assert!(text.contains("  3: energy + mud = life"));
    }

    #[test]
    fn enumerating_summary_uses_paths() {
        let outcome = search(&graph(), &SearchRequest::dfs("life").with_max_paths(5)).unwrap();
        let summary = SearchSummary::from_outcome(&outcome);
        assert_eq!(summary.steps, None);
        assert_eq!(summary.all_paths().len(), 2);
        assert!(summary.render(RenderMode::PlainText).contains("#2"));
        assert!(summary.render(RenderMode::RichText).contains("* path 2"));
    }

    #[test]
    fn not_found_renders_reason() {
        let outcome = search(&graph(), &SearchRequest::bfs("unobtainium")).unwrap();
        let text = SearchSummary::from_outcome(&outcome).render(RenderMode::PlainText);
        assert!(text.starts_with("No path to unobtainium"));
    }

    #[test]
    fn recipe_report_flags_blocked_recipes() {
        let report = RecipeReport::from_graph(&graph(), "Brick").unwrap();
        assert_eq!(report.tier, 2);
        assert_eq!(
            report.recipes,
            vec![RecipeLine {
                first: "mud".to_string(),
                second: "life".to_string(),
                admissible: false,
            }]
        );
        assert!(report.render_plain().contains("[blocked by tier rule]"));

        let fire = RecipeReport::from_graph(&graph(), "fire").unwrap();
        assert!(fire.base);
        assert_eq!(fire.used_in, vec!["energy".to_string()]);
    }
}
