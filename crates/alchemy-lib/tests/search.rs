mod common;

use alchemy_lib::{
    build_graph, search, CraftPath, RecipeRecord, SearchAlgorithm, SearchRequest, StrategyKind,
    BASE_ELEMENTS,
};

use common::{base_leaves, fixture_graph};

const CRAFTABLE: [&str; 11] = [
    "energy", "mud", "rain", "lava", "steam", "life", "plant", "stone", "brick", "human", "house",
];

const UNCRAFTABLE: [&str; 3] = ["paradox", "mystery", "ghost"];

fn single_path_requests(target: &str) -> Vec<SearchRequest> {
    vec![
        SearchRequest::bfs(target),
        SearchRequest::dfs(target),
        SearchRequest::bfs(target).with_bidirectional(true),
        SearchRequest::dfs(target).with_bidirectional(true),
    ]
}

#[test]
fn life_scenario_matches_expected_steps() {
    let graph = fixture_graph();
    for request in single_path_requests("Life") {
        let outcome = search(&graph, &request).expect("search runs");
        assert!(outcome.found, "{} should find life", outcome.strategy);
        assert_eq!(outcome.paths.len(), 1);
        if matches!(outcome.strategy, StrategyKind::Bfs | StrategyKind::Dfs) {
            assert_eq!(
                outcome.paths[0].rendered(),
                vec![
                    "fire + air = energy",
                    "water + earth = mud",
                    "energy + mud = life"
                ]
            );
        }
    }
}

#[test]
fn base_elements_resolve_to_empty_paths() {
    let graph = fixture_graph();
    for base in BASE_ELEMENTS {
        for request in single_path_requests(base) {
            let outcome = search(&graph, &request).expect("search runs");
            assert!(outcome.found);
            assert_eq!(outcome.paths, vec![CraftPath::new()]);
        }
        let multi = search(&graph, &SearchRequest::dfs(base).with_max_paths(4)).unwrap();
        assert_eq!(multi.paths, vec![CraftPath::new()]);
    }
}

#[test]
fn every_returned_path_is_admissible_and_ordered() {
    let graph = fixture_graph();
    let leaves = base_leaves();
    for target in CRAFTABLE {
        let mut requests = single_path_requests(target);
        requests.push(SearchRequest::bfs(target).with_max_paths(5));
        requests.push(SearchRequest::dfs(target).with_max_paths(5));
        for request in requests {
            let outcome = search(&graph, &request).expect("search runs");
            assert!(outcome.found, "{} should find {target}", outcome.strategy);
            for path in &outcome.paths {
                assert_eq!(
                    path.verify(&graph, &leaves, target),
                    Ok(()),
                    "{} produced an invalid path for {target}",
                    outcome.strategy
                );
            }
        }
    }
}

#[test]
fn strategies_agree_on_reachability() {
    let graph = fixture_graph();
    for target in CRAFTABLE.iter().chain(UNCRAFTABLE.iter()) {
        let expected = search(&graph, &SearchRequest::bfs(*target)).unwrap().found;
        for algorithm in [SearchAlgorithm::Bfs, SearchAlgorithm::Dfs] {
            let bidirectional = SearchRequest::new(*target, algorithm).with_bidirectional(true);
            assert_eq!(search(&graph, &bidirectional).unwrap().found, expected);
            let single = SearchRequest::new(*target, algorithm);
            assert_eq!(search(&graph, &single).unwrap().found, expected);
        }
    }
}

#[test]
fn max_depth_caps_every_single_path_strategy() {
    let graph = fixture_graph();
    let cases = [("life", 1, false), ("life", 2, true), ("human", 2, false)];
    for (target, max_depth, expected) in cases {
        for request in single_path_requests(target) {
            let outcome = search(&graph, &request.with_max_depth(max_depth)).unwrap();
            assert_eq!(
                outcome.found, expected,
                "{} on {} with max_depth {}",
                outcome.strategy, target, max_depth
            );
        }
    }
}

#[test]
fn uncraftable_targets_are_not_found() {
    let graph = fixture_graph();
    for target in UNCRAFTABLE {
        for request in single_path_requests(target) {
            let outcome = search(&graph, &request).unwrap();
            assert!(!outcome.found, "{} found {target}", outcome.strategy);
            assert!(outcome.paths.is_empty());
        }
    }
}

#[test]
fn enumeration_is_distinct_and_capped() {
    let graph = fixture_graph();
    for algorithm in [SearchAlgorithm::Bfs, SearchAlgorithm::Dfs] {
        let life = search(
            &graph,
            &SearchRequest::new("life", algorithm).with_max_paths(10),
        )
        .unwrap();
        assert_eq!(life.paths.len(), 2);
        assert_ne!(life.paths[0], life.paths[1]);

        let capped = search(
            &graph,
            &SearchRequest::new("house", algorithm).with_max_paths(1),
        )
        .unwrap();
        assert_eq!(capped.paths.len(), 1);
    }
}

#[test]
fn cap_of_two_out_of_five_is_deterministic() {
    let graph = build_graph(&[
        RecipeRecord::new("goal", "fire", "air", 1),
        RecipeRecord::new("goal", "fire", "water", 1),
        RecipeRecord::new("goal", "fire", "earth", 1),
        RecipeRecord::new("goal", "air", "water", 1),
        RecipeRecord::new("goal", "air", "earth", 1),
    ]);
    let request = SearchRequest::bfs("goal").with_max_paths(2);
    let first = search(&graph, &request).unwrap();
    let second = search(&graph, &request).unwrap();
    assert_eq!(first.paths.len(), 2);
    assert_eq!(first.paths, second.paths);
}

#[test]
fn searches_are_idempotent() {
    let graph = fixture_graph();
    for target in ["house", "farmer", "ghost"] {
        for request in single_path_requests(target) {
            let first = search(&graph, &request).unwrap();
            let second = search(&graph, &request).unwrap();
            assert_eq!(first.found, second.found);
            assert_eq!(first.paths, second.paths);
        }
    }
}

#[test]
fn self_referential_recipe_is_never_found() {
    let graph = build_graph(&[RecipeRecord::new("x", "x", "fire", 1)]);
    for request in single_path_requests("x") {
        assert!(!search(&graph, &request).unwrap().found);
    }
    assert!(!search(&graph, &SearchRequest::dfs("x").with_max_paths(3))
        .unwrap()
        .found);
}

#[test]
fn start_elements_replace_the_seeds() {
    let graph = fixture_graph();
    let request = SearchRequest::bfs("human").with_start_elements(["life", "earth"]);
    let outcome = search(&graph, &request).unwrap();
    assert_eq!(outcome.paths[0].rendered(), vec!["life + earth = human"]);

    let starved = SearchRequest::bfs("life").with_start_elements(["fire"]);
    assert!(!search(&graph, &starved).unwrap().found);
}
