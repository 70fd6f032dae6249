use crate::graph::{Edge, RoutingGraph};
use crate::point::{EdgePoint, Position};
use crate::router::{Costing, GraphRouter, Router};
use crate::TopologyError;

use approx::assert_relative_eq;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use std::error::Error;

fn scenario() -> RoutingGraph {
    RoutingGraph::build([
        Edge::new(1, 1, 2, 1.0),
        Edge::new(2, 2, 3, 2.0),
        Edge::new(3, 2, 4, 4.0),
    ])
    .expect("scenario edges are valid")
}

/// A ring 1 -> 2 -> 3 -> 4 -> 1 of unit edges, with a costly
/// shortcut 1 -> 3 and a spur 2 -> 5.
fn ring() -> RoutingGraph {
    RoutingGraph::build([
        Edge::new(1, 1, 2, 1.0),
        Edge::new(2, 2, 3, 1.0),
        Edge::new(3, 3, 4, 1.0),
        Edge::new(4, 4, 1, 1.0),
        Edge::new(5, 1, 3, 5.0),
        Edge::new(6, 2, 5, 1.0),
    ])
    .expect("ring edges are valid")
}

/// Two equal-cost routes from node 1 to node 4, via 2 or via 3.
fn diamond() -> RoutingGraph {
    RoutingGraph::build([
        Edge::new(1, 1, 2, 1.0),
        Edge::new(2, 1, 3, 1.0),
        Edge::new(3, 2, 4, 1.0),
        Edge::new(4, 3, 4, 1.0),
        Edge::new(5, 4, 6, 1.0),
    ])
    .expect("diamond edges are valid")
}

/// An `n` by `n` grid of unit edges in both directions.
fn grid(n: i64) -> RoutingGraph {
    let node = |x: i64, y: i64| y * n + x;
    let mut edges = Vec::new();

    for y in 0..n {
        for x in 0..n {
            if x + 1 < n {
                edges.push((node(x, y), node(x + 1, y)));
                edges.push((node(x + 1, y), node(x, y)));
            }
            if y + 1 < n {
                edges.push((node(x, y), node(x, y + 1)));
                edges.push((node(x, y + 1), node(x, y)));
            }
        }
    }

    RoutingGraph::build(
        edges
            .into_iter()
            .enumerate()
            .map(|(id, (source, target))| Edge::new(id as i64, source, target, 1.0)),
    )
    .expect("grid edges are valid")
}

#[test_log::test]
fn routes_the_reference_scenario() -> Result<(), Box<dyn Error>> {
    let graph = scenario();
    let router = GraphRouter::new(&graph);

    let path = router
        .route(
            &EdgePoint::new(1, 0.0),
            &EdgePoint::new(2, 1.0),
            &Costing::weight(),
        )?
        .expect("E2 is reachable from E1");

    assert_eq!(path.ids(), vec![1, 2]);
    assert_relative_eq!(path.cost(), 3.0);
    assert_eq!(path.source().id(), 1);
    assert_eq!(path.target().id(), 2);

    let pruned = router.route(
        &EdgePoint::new(1, 0.0),
        &EdgePoint::new(3, 1.0),
        &Costing::weight().with_max(2.0),
    )?;
    assert!(pruned.is_none());

    Ok(())
}

#[test_log::test]
fn batches_the_reference_scenario() -> Result<(), Box<dyn Error>> {
    let graph = scenario();
    let router = graph.router();

    let source = EdgePoint::new(1, 0.0);
    let targets = [EdgePoint::new(2, 1.0), EdgePoint::new(3, 1.0)];

    let routes = router.route_to_many(&source, &targets, &Costing::weight())?;
    assert_eq!(routes.len(), 2);
    assert_relative_eq!(routes[&targets[0]].cost(), 3.0);
    assert_relative_eq!(routes[&targets[1]].cost(), 5.0);
    assert_eq!(routes[&targets[1]].ids(), vec![1, 3]);

    let many = router.route_many_to_many(&[source], &targets, &Costing::weight())?;
    assert_eq!(many.len(), 2);
    for target in &targets {
        let (chosen, path) = &many[target];
        assert_eq!(*chosen, source);
        assert_relative_eq!(path.cost(), routes[target].cost());
    }

    Ok(())
}

#[test]
fn partial_edges_are_priced_by_fraction() -> Result<(), Box<dyn Error>> {
    let graph = ring();
    let router = graph.router();

    let path = router
        .route(
            &EdgePoint::new(1, 0.5),
            &EdgePoint::new(3, 0.25),
            &Costing::weight(),
        )?
        .expect("E3 is reachable from E1");

    assert_eq!(path.ids(), vec![1, 2, 3]);
    assert_relative_eq!(path.cost(), 0.5 + 1.0 + 0.25);

    Ok(())
}

#[test]
fn same_edge_ahead_stays_on_the_edge() -> Result<(), Box<dyn Error>> {
    let graph = ring();

    let path = graph
        .router()
        .route(
            &EdgePoint::new(2, 0.2),
            &EdgePoint::new(2, 0.7),
            &Costing::weight(),
        )?
        .expect("a point ahead on the same edge is reachable");

    assert_eq!(path.ids(), vec![2]);
    assert_relative_eq!(path.cost(), 0.5);

    Ok(())
}

#[test]
fn same_edge_behind_loops_around() -> Result<(), Box<dyn Error>> {
    let graph = ring();
    let router = graph.router();

    let source = EdgePoint::new(2, 0.7);
    let target = EdgePoint::new(2, 0.2);

    let path = router
        .route(&source, &target, &Costing::weight())?
        .expect("the ring leads back onto E2");

    assert_eq!(path.ids(), vec![2, 3, 4, 1, 2]);
    assert_relative_eq!(path.cost(), 0.3 + 3.0 + 0.2);

    // The loop costs 3.5, so a tighter ceiling drops it.
    assert!(router
        .route(&source, &target, &Costing::weight().with_max(3.4))?
        .is_none());

    Ok(())
}

#[test]
fn prefers_cheap_detours_over_expensive_shortcuts() -> Result<(), Box<dyn Error>> {
    let graph = ring();

    let path = graph
        .router()
        .route(
            &EdgePoint::new(4, 1.0),
            &EdgePoint::new(3, 0.0),
            &Costing::weight(),
        )?
        .expect("E3 is reachable from E4");

    // Leaving node 1 by E1 then E2 beats the shortcut E5.
    assert_eq!(path.ids(), vec![4, 1, 2, 3]);
    assert_relative_eq!(path.cost(), 2.0);

    Ok(())
}

#[test]
fn cost_function_drives_the_route() -> Result<(), Box<dyn Error>> {
    let graph = ring();

    // Make the shortcut free, every other edge keeps its weight.
    let costing = Costing::new(|edge: &Edge| if edge.id == 5 { 0.0 } else { edge.weight });

    let path = graph
        .router()
        .route(&EdgePoint::new(4, 1.0), &EdgePoint::new(3, 0.0), &costing)?
        .expect("E3 is reachable from E4");

    assert_eq!(path.ids(), vec![4, 5, 3]);
    assert_relative_eq!(path.cost(), 0.0);

    Ok(())
}

#[test]
fn unreachable_targets_are_absent() -> Result<(), Box<dyn Error>> {
    let graph = ring();
    let router = graph.router();

    // E6 leads into node 5, which has no way out.
    let source = EdgePoint::new(6, 0.0);
    let targets = [EdgePoint::new(1, 0.5), EdgePoint::new(6, 0.9)];

    assert!(router
        .route(&source, &targets[0], &Costing::weight())?
        .is_none());

    let routes = router.route_to_many(&source, &targets, &Costing::weight())?;
    assert_eq!(routes.len(), 1);
    assert!(routes.contains_key(&targets[1]));

    Ok(())
}

#[test]
fn pruning_is_monotonic() -> Result<(), Box<dyn Error>> {
    let graph = grid(6);
    let router = graph.router();

    let source = EdgePoint::new(0, 0.0);
    let target = EdgePoint::new(graph.len() as i64 - 1, 1.0);

    let exact = router
        .route(&source, &target, &Costing::weight())?
        .expect("the grid is strongly connected")
        .cost();

    let mut max = exact + 2.0;
    while max >= 0.0 {
        let outcome = router.route(&source, &target, &Costing::weight().with_max(max))?;

        match outcome {
            Some(path) => {
                assert!(max >= exact);
                assert_relative_eq!(path.cost(), exact);
            }
            None => assert!(max < exact, "lost the route under ceiling {max}"),
        }

        max -= 0.5;
    }

    Ok(())
}

#[test]
fn admissible_bound_keeps_routes_optimal() -> Result<(), Box<dyn Error>> {
    let n = 8;
    let graph = grid(n);
    let router = graph.router();

    let source = EdgePoint::new(0, 0.0);
    let goal = n * n - 1;
    let target = graph
        .outgoing(goal - 1)
        .find(|edge| edge.target() == goal)
        .map(|edge| EdgePoint::new(edge.id(), 1.0))
        .expect("the grid has an edge into its far corner");

    // Manhattan distance from an edge's source node to the goal's
    // predecessor never exceeds the remaining cost.
    let predecessor = goal - 1;
    let manhattan = move |edge: &Edge| {
        let (x, y) = (edge.source % n, edge.source / n);
        let (gx, gy) = (predecessor % n, predecessor / n);
        ((x - gx).abs() + (y - gy).abs()) as f64
    };

    let plain = router
        .route(&source, &target, &Costing::weight())?
        .expect("reachable without a bound");
    let guided = router
        .route(&source, &target, &Costing::weight().with_bound(manhattan))?
        .expect("reachable with a bound");

    assert_relative_eq!(plain.cost(), guided.cost());
    assert_relative_eq!(guided.cost(), (2 * (n - 1)) as f64);
    assert_eq!(guided.len(), guided.cost() as usize);

    Ok(())
}

#[test]
fn bounded_search_respects_the_ceiling() -> Result<(), Box<dyn Error>> {
    let n = 8;
    let graph = grid(n);
    let router = graph.router();

    let source = EdgePoint::new(0, 0.0);
    let goal = n * n - 1;
    let predecessor = goal - 1;
    let target = graph
        .outgoing(predecessor)
        .find(|edge| edge.target() == goal)
        .map(|edge| EdgePoint::new(edge.id(), 1.0))
        .expect("the grid has an edge into its far corner");

    let manhattan = move |edge: &Edge| {
        let (x, y) = (edge.source % n, edge.source / n);
        let (gx, gy) = (predecessor % n, predecessor / n);
        ((x - gx).abs() + (y - gy).abs()) as f64
    };

    let exact = (2 * (n - 1)) as f64;

    let below = Costing::weight().with_bound(manhattan).with_max(exact - 0.5);
    assert!(router.route(&source, &target, &below)?.is_none());

    let at = Costing::weight().with_bound(manhattan).with_max(exact);
    let path = router
        .route(&source, &target, &at)?
        .expect("a ceiling equal to the route cost keeps the route");
    assert_relative_eq!(path.cost(), exact);

    Ok(())
}

#[test]
fn source_on_a_node_switches_to_its_siblings() -> Result<(), Box<dyn Error>> {
    let graph = scenario();
    let router = graph.router();

    // E2 and E3 both leave node 2, so E2's start is also E3's start.
    let source = EdgePoint::new(2, 0.0);

    let path = router
        .route(&source, &EdgePoint::new(3, 0.5), &Costing::weight())?
        .expect("E3 leaves the node the source sits on");
    assert_eq!(path.ids(), vec![2, 3]);
    assert_relative_eq!(path.cost(), 2.0);

    let same_node = router
        .route(&source, &EdgePoint::new(3, 0.0), &Costing::weight())?
        .expect("both points sit on node 2");
    assert_relative_eq!(same_node.cost(), 0.0);

    // Once the source has left the node, E3 is out of reach.
    assert!(router
        .route(&EdgePoint::new(2, 0.1), &EdgePoint::new(3, 0.5), &Costing::weight())?
        .is_none());

    let batch = router.route_many_to_many(
        &[EdgePoint::new(1, 0.0), source],
        &[EdgePoint::new(3, 0.5)],
        &Costing::weight(),
    )?;
    let (chosen, path) = &batch[&EdgePoint::new(3, 0.5)];
    assert_eq!(*chosen, source);
    assert_relative_eq!(path.cost(), 2.0);

    Ok(())
}

#[test]
fn picks_the_cheapest_source() -> Result<(), Box<dyn Error>> {
    let graph = ring();
    let router = graph.router();

    let sources = [EdgePoint::new(1, 0.0), EdgePoint::new(3, 0.5)];
    let targets = [EdgePoint::new(4, 0.5), EdgePoint::new(2, 0.5)];

    let routes = router.route_many_to_many(&sources, &targets, &Costing::weight())?;
    assert_eq!(routes.len(), 2);

    for target in &targets {
        let (chosen, path) = &routes[target];

        for source in &sources {
            if let Some(other) = router.route(source, target, &Costing::weight())? {
                assert!(path.cost() <= other.cost());
            }
        }

        assert_eq!(path.source().id(), chosen.edge());
        assert_eq!(path.target().id(), target.edge());
    }

    // E4's midpoint is one edge past E3's midpoint, but 3.5 past E1's start.
    assert_eq!(routes[&targets[0]].0, sources[1]);
    // E2's midpoint is 1.5 edges from E1's start, 3 from E3's midpoint.
    assert_eq!(routes[&targets[1]].0, sources[0]);

    Ok(())
}

#[test]
fn equal_cost_sources_resolve_to_the_first_listed() -> Result<(), Box<dyn Error>> {
    let graph = diamond();
    let router = graph.router();

    let via_two = EdgePoint::new(3, 0.0);
    let via_three = EdgePoint::new(4, 0.0);
    let target = [EdgePoint::new(5, 0.5)];

    for _ in 0..8 {
        let forward = router.route_many_to_many(&[via_two, via_three], &target, &Costing::weight())?;
        assert_eq!(forward[&target[0]].0, via_two);

        let reverse = router.route_many_to_many(&[via_three, via_two], &target, &Costing::weight())?;
        assert_eq!(reverse[&target[0]].0, via_three);
    }

    Ok(())
}

#[test]
fn equal_cost_paths_are_repeatable() -> Result<(), Box<dyn Error>> {
    let graph = diamond();
    let router = graph.router();

    let source = EdgePoint::new(1, 0.0);
    let target = EdgePoint::new(5, 1.0);

    let first = router
        .route(&source, &target, &Costing::weight())?
        .expect("node 6 is reachable")
        .ids();

    assert_eq!(first.len(), 3);
    assert_eq!(first[2], 5);

    for _ in 0..16 {
        let again = router
            .route(&source, &target, &Costing::weight())?
            .expect("node 6 is reachable");
        assert_eq!(again.ids(), first);
    }

    Ok(())
}

#[test]
fn point_reaches_itself_at_no_cost() -> Result<(), Box<dyn Error>> {
    let graph = diamond();

    let path = graph
        .router()
        .route(
            &EdgePoint::new(5, 0.0),
            &EdgePoint::new(5, 0.0),
            &Costing::weight(),
        )?
        .expect("a point is reachable from itself");

    assert_eq!(path.ids(), vec![5]);
    assert_relative_eq!(path.cost(), 0.0);

    Ok(())
}

#[test]
fn routes_from_the_end_of_an_edge() -> Result<(), Box<dyn Error>> {
    let graph = diamond();
    let router = graph.router();

    // A source at the very end of E1 sits on node 2 and pays nothing for E1.
    let source = EdgePoint::new(1, 1.0);
    let targets = [EdgePoint::new(3, 1.0), EdgePoint::new(5, 1.0)];
    let routes = router.route_to_many(&source, &targets, &Costing::weight())?;

    assert_relative_eq!(routes[&targets[0]].cost(), 1.0);
    assert_relative_eq!(routes[&targets[1]].cost(), 2.0);
    assert_eq!(routes[&targets[1]].ids(), vec![1, 3, 5]);

    Ok(())
}

#[test]
fn duplicate_targets_collapse() -> Result<(), Box<dyn Error>> {
    let graph = scenario();
    let router = graph.router();

    let target = EdgePoint::new(2, 0.5);
    let routes = router.route_to_many(
        &EdgePoint::new(1, 0.0),
        &[target, target, target],
        &Costing::weight(),
    )?;

    assert_eq!(routes.len(), 1);
    assert_relative_eq!(routes[&target].cost(), 2.0);

    Ok(())
}

#[test]
fn path_is_consumed_as_edges() -> Result<(), Box<dyn Error>> {
    let graph = ring();

    let path = graph
        .router()
        .route(
            &EdgePoint::new(1, 0.0),
            &EdgePoint::new(4, 1.0),
            &Costing::weight(),
        )?
        .expect("E4 is reachable from E1");

    let borrowed = path.edges().map(|edge| edge.id()).collect::<Vec<_>>();
    let consumed = path.into_iter().map(|edge| edge.id()).collect::<Vec<_>>();

    assert_eq!(borrowed, consumed);
    assert_eq!(consumed, vec![1, 2, 3, 4]);

    Ok(())
}

#[test]
fn contract_violations_fail_fast() {
    let graph = scenario();
    let router = graph.router();

    let valid = EdgePoint::new(1, 0.0);

    let unknown = router.route(&valid, &EdgePoint::new(99, 0.5), &Costing::weight());
    assert!(matches!(unknown, Err(TopologyError::EdgeNotFound(99))));

    let outside = router.route(&valid, &EdgePoint::new(2, 1.5), &Costing::weight());
    assert!(matches!(outside, Err(TopologyError::InvalidArgument(_))));

    let negative = Costing::new(|_: &Edge| -1.0);
    assert!(matches!(
        router.route(&valid, &EdgePoint::new(2, 1.0), &negative),
        Err(TopologyError::InvalidArgument(_))
    ));

    let bad_bound = Costing::weight().with_bound(|_: &Edge| f64::NAN);
    assert!(matches!(
        router.route(&valid, &EdgePoint::new(2, 1.0), &bad_bound),
        Err(TopologyError::InvalidArgument(_))
    ));

    for max in [f64::NAN, -1.0] {
        assert!(matches!(
            router.route_to_many(&valid, &[valid], &Costing::weight().with_max(max)),
            Err(TopologyError::InvalidArgument(_))
        ));
    }

    let batch = router.route_many_to_many(
        &[valid, EdgePoint::new(7, 0.0)],
        &[EdgePoint::new(2, 1.0)],
        &Costing::weight(),
    );
    assert!(matches!(batch, Err(TopologyError::EdgeNotFound(7))));
}

#[test]
fn shared_graph_serves_parallel_queries() -> Result<(), Box<dyn Error>> {
    let graph = grid(10);
    let router = graph.router();

    let sources = (0..graph.len() as i64)
        .step_by(7)
        .map(|id| EdgePoint::new(id, 0.5))
        .collect::<Vec<_>>();
    let targets = (0..graph.len() as i64)
        .step_by(11)
        .map(|id| EdgePoint::new(id, 0.5))
        .collect::<Vec<_>>();

    let costing = Costing::weight().with_max(6.0);

    let sequential = sources
        .iter()
        .map(|source| router.route_to_many(source, &targets, &costing))
        .collect::<Result<Vec<_>, _>>()?;

    let parallel = sources
        .clone()
        .into_par_iter()
        .map(|source| router.route_to_many(&source, &targets, &costing))
        .collect::<Result<Vec<_>, _>>()?;

    for (a, b) in sequential.iter().zip(parallel.iter()) {
        assert_eq!(a.len(), b.len());
        for (target, path) in a {
            assert_eq!(path.ids(), b[target].ids());
            assert!(path.cost() <= 6.0);
        }
    }

    Ok(())
}
