use proptest::prelude::*;
use std::collections::HashSet;

use movie_graph_explorer::db::MemoryGraph;
use movie_graph_explorer::explorer::Explorer;
use movie_graph_explorer::graph::mapper::order_by_release_desc;
use movie_graph_explorer::graph::{ExportSource, MovieProps, MovieSummary, RelatedPerson, RelationKind};
use movie_graph_explorer::visualization::GraphExporter;

fn summaries(years: &[Option<i64>]) -> Vec<MovieSummary> {
    years
        .iter()
        .enumerate()
        .map(|(i, y)| MovieSummary { title: format!("m{i}"), released_year: *y, tagline: None })
        .collect()
}

// Property-based tests: ordering, search filter and exporter invariants
proptest! {
    // Dated movies newest first, undated at the end, ties keep their input order
    #[test]
    fn release_order_is_descending_with_undated_last(
        years in prop::collection::vec(prop::option::of(1900i64..2030), 0..40)
    ) {
        let mut movies = summaries(&years);
        order_by_release_desc(&mut movies);
        prop_assert_eq!(movies.len(), years.len());

        let first_undated = movies.iter().position(|m| m.released_year.is_none()).unwrap_or(movies.len());
        prop_assert!(movies[first_undated..].iter().all(|m| m.released_year.is_none()));
        for pair in movies[..first_undated].windows(2) {
            prop_assert!(pair[0].released_year >= pair[1].released_year);
        }
        for pair in movies.windows(2) {
            if pair[0].released_year == pair[1].released_year {
                let a: usize = pair[0].title[1..].parse().unwrap();
                let b: usize = pair[1].title[1..].parse().unwrap();
                prop_assert!(a < b);
            }
        }
    }

    // Every hit contains the trimmed term, and every movie containing it is a hit
    #[test]
    fn search_returns_exactly_the_matching_titles(
        titles in prop::collection::hash_set("[a-cA-C ]{1,8}", 0..15),
        term in "[a-cA-C]{1,2}",
    ) {
        let conn = titles
            .iter()
            .fold(MemoryGraph::default(), |g, t| g.with_movie(t, None, None));
        let explorer = Explorer::new(&conn);
        let hits = explorer.search_movies(&term).unwrap();
        prop_assert!(hits.iter().all(|m| m.title.contains(&term)));
        let expected = titles.iter().filter(|t| t.contains(&term)).count();
        prop_assert_eq!(hits.len(), expected);
    }

    // One node per distinct person plus the movie, one link per relationship
    #[test]
    fn export_counts_and_link_integrity(
        directors in prop::collection::vec("[A-Z][a-z]{0,5}( [A-Z][a-z]{0,5})?", 0..6),
        actors in prop::collection::vec("[A-Z][a-z]{0,5}( [A-Z][a-z]{0,5})?", 0..12),
    ) {
        let source = ExportSource {
            movie: MovieProps { title: "Prop Movie".into(), released: Some(2000), tagline: None },
            directors: directors.iter().map(|n| RelatedPerson::new(n, RelationKind::Directed)).collect(),
            actors: actors.iter().map(|n| RelatedPerson::new(n, RelationKind::ActedIn)).collect(),
        };
        let graph = GraphExporter::new().build(&source);

        let people: HashSet<&String> = directors.iter().chain(actors.iter()).collect();
        prop_assert_eq!(graph.nodes.len(), 1 + people.len());
        prop_assert_eq!(graph.links.len(), directors.len() + actors.len());
        prop_assert!(graph.dangling_links().is_empty());

        let ids: HashSet<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        prop_assert_eq!(ids.len(), graph.nodes.len());
        prop_assert!(graph.links.iter().all(|l| l.target == graph.nodes[0].id));
    }
}
