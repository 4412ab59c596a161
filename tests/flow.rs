use std::collections::HashSet;

use proptest::prelude::*;
use sankey_flow::{
    error::FlowError,
    flow::{Edge, FlowGraph, FlowSpec, build_flow},
    frame::{Cell, Table},
};

fn table(rows: &[(&str, &str, f64)]) -> Table {
    Table::new(
        vec!["Stage1".into(), "Stage2".into(), "Value".into()],
        rows.iter()
            .map(|(a, b, v)| vec![Cell::from(*a), Cell::from(*b), Cell::Number(*v)])
            .collect(),
    )
}

fn two_stage() -> FlowSpec {
    FlowSpec::new(vec!["Stage1", "Stage2"], "Value").expect("spec")
}

#[test]
fn excludes_zero_and_negative_rows() {
    let graph = build_flow(
        &table(&[("A", "X", 10.0), ("A", "Y", 5.0), ("B", "X", -3.0), ("A", "X", 0.0)]),
        &two_stage(),
    )
    .expect("flow");

    assert_eq!(graph.nodes, vec!["A", "X", "Y"]);
    assert_eq!(
        graph.labeled_edges().collect::<Vec<_>>(),
        vec![("A", "X", 10.0), ("A", "Y", 5.0)]
    );
}

#[test]
fn sums_repeated_pairs_and_orders_groups_lexicographically() {
    let graph = build_flow(
        &table(&[("B", "Y", 1.0), ("A", "Y", 2.0), ("B", "Y", 3.5), ("A", "X", 4.0)]),
        &two_stage(),
    )
    .expect("flow");

    assert_eq!(graph.nodes, vec!["B", "Y", "A", "X"]);
    assert_eq!(
        graph.edges,
        vec![
            Edge {
                source: 2,
                target: 3,
                value: 4.0
            },
            Edge {
                source: 2,
                target: 1,
                value: 2.0
            },
            Edge {
                source: 0,
                target: 1,
                value: 4.5
            },
        ]
    );
}

#[test]
fn three_stages_emit_edges_per_adjacent_pair() {
    let data = Table::new(
        vec!["Etapa".into(), "Unidade".into(), "Produto".into(), "Valor".into()],
        vec![
            vec!["Corte".into(), "Norte".into(), "Mesa".into(), 10.0.into()],
            vec!["Corte".into(), "Sul".into(), "Mesa".into(), 5.0.into()],
            vec!["Montagem".into(), "Norte".into(), "Cadeira".into(), 2.0.into()],
        ],
    );
    let spec = FlowSpec::new(vec!["Etapa", "Unidade", "Produto"], "Valor").expect("spec");
    let graph = build_flow(&data, &spec).expect("flow");

    assert_eq!(
        graph.nodes,
        vec!["Corte", "Norte", "Mesa", "Sul", "Montagem", "Cadeira"]
    );
    assert_eq!(
        graph.labeled_edges().collect::<Vec<_>>(),
        vec![
            ("Corte", "Norte", 10.0),
            ("Corte", "Sul", 5.0),
            ("Montagem", "Norte", 2.0),
            ("Norte", "Cadeira", 2.0),
            ("Norte", "Mesa", 10.0),
            ("Sul", "Mesa", 5.0),
        ]
    );
}

#[test]
fn same_label_in_two_stages_is_one_node() {
    let graph = build_flow(&table(&[("A", "A", 1.0), ("A", "B", 2.0)]), &two_stage())
        .expect("flow");
    assert_eq!(graph.nodes, vec!["A", "B"]);
    assert_eq!(
        graph.edges,
        vec![
            Edge {
                source: 0,
                target: 0,
                value: 1.0
            },
            Edge {
                source: 0,
                target: 1,
                value: 2.0
            },
        ]
    );
}

#[test]
fn rows_missing_any_projected_cell_are_dropped() {
    let data = Table::new(
        vec!["Stage1".into(), "Stage2".into(), "Value".into(), "Notes".into()],
        vec![
            vec!["A".into(), Cell::Missing, 1.0.into(), "x".into()],
            vec!["B".into(), "Y".into(), Cell::Missing, "x".into()],
            vec!["C".into(), "Z".into(), 3.0.into(), Cell::Missing],
        ],
    );
    let graph = build_flow(&data, &two_stage()).expect("flow");
    assert_eq!(graph.nodes, vec!["C", "Z"]);
    assert_eq!(graph.edges.len(), 1);
}

#[test]
fn all_rows_filtered_yields_empty_graph() {
    let graph = build_flow(&table(&[("A", "X", 0.0), ("B", "Y", -1.0)]), &two_stage())
        .expect("flow");
    assert!(graph.is_empty());
    assert_eq!(graph, FlowGraph::default());
}

#[test]
fn structural_errors_are_named() {
    assert_eq!(
        FlowSpec::new(Vec::<String>::new(), "Value"),
        Err(FlowError::TooFewStages { found: 0 })
    );
    let spec = FlowSpec::new(vec!["Stage1", "Stage2"], "Missing").expect("spec");
    assert_eq!(
        build_flow(&table(&[("A", "X", 1.0)]), &spec),
        Err(FlowError::UnknownColumn("Missing".to_string()))
    );
    assert_eq!(
        build_flow(&table(&[]), &two_stage()),
        Err(FlowError::EmptyTable)
    );
}

const LABELS: &[&str] = &["A", "B", "C", "X", "Y"];

fn arb_rows() -> impl Strategy<Value = Vec<(usize, usize, usize, Option<i32>)>> {
    proptest::collection::vec(
        (
            0..LABELS.len(),
            0..LABELS.len(),
            0..LABELS.len(),
            proptest::option::weighted(0.9, -10i32..50),
        ),
        1..40,
    )
}

fn three_stage_table(rows: &[(usize, usize, usize, Option<i32>)]) -> Table {
    Table::new(
        vec!["s1".into(), "s2".into(), "s3".into(), "v".into()],
        rows.iter()
            .map(|(a, b, c, v)| {
                vec![
                    Cell::from(LABELS[*a]),
                    Cell::from(LABELS[*b]),
                    Cell::from(LABELS[*c]),
                    v.map_or(Cell::Missing, |v| Cell::Number(f64::from(v))),
                ]
            })
            .collect(),
    )
}

fn three_stage_spec() -> FlowSpec {
    FlowSpec::new(vec!["s1", "s2", "s3"], "v").expect("spec")
}

proptest! {
    #[test]
    fn edges_are_positive_and_in_range(rows in arb_rows()) {
        let graph = build_flow(&three_stage_table(&rows), &three_stage_spec()).expect("flow");
        for edge in &graph.edges {
            prop_assert!(edge.value > 0.0);
            prop_assert!(edge.source < graph.node_count());
            prop_assert!(edge.target < graph.node_count());
        }
    }

    #[test]
    fn nodes_are_the_distinct_surviving_labels(rows in arb_rows()) {
        let graph = build_flow(&three_stage_table(&rows), &three_stage_spec()).expect("flow");
        let expected: HashSet<&str> = rows
            .iter()
            .filter(|(_, _, _, v)| v.is_some_and(|v| v > 0))
            .flat_map(|(a, b, c, _)| [LABELS[*a], LABELS[*b], LABELS[*c]])
            .collect();
        let actual: HashSet<&str> = graph.nodes.iter().map(String::as_str).collect();
        prop_assert_eq!(graph.node_count(), actual.len());
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn repeated_calls_are_identical(rows in arb_rows()) {
        let data = three_stage_table(&rows);
        let first = build_flow(&data, &three_stage_spec()).expect("flow");
        let second = build_flow(&data, &three_stage_spec()).expect("flow");
        prop_assert_eq!(first, second);
    }

    #[test]
    fn removing_non_positive_rows_changes_nothing(rows in arb_rows()) {
        let kept: Vec<_> = rows
            .iter()
            .copied()
            .filter(|(_, _, _, v)| v.is_none_or(|v| v > 0))
            .collect();
        prop_assume!(!kept.is_empty());
        let full = build_flow(&three_stage_table(&rows), &three_stage_spec()).expect("flow");
        let trimmed = build_flow(&three_stage_table(&kept), &three_stage_spec()).expect("flow");
        prop_assert_eq!(full, trimmed);
    }
}
