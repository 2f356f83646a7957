use std::fmt::Write as _;

use super::{ExportGraph, NodeKind};
use crate::graph::{RelationKind, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DotTheme {
    Light,
    Dark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankDir {
    LR,
    TB,
}

#[derive(Debug, Clone, Copy)]
pub struct DotOptions {
    pub theme: DotTheme,
    pub rankdir: RankDir,
}

impl Default for DotOptions {
    fn default() -> Self {
        Self { theme: DotTheme::Light, rankdir: RankDir::LR }
    }
}

/// Graphviz rendering of an [`ExportGraph`].
#[derive(Debug, Default)]
pub struct DotGenerator;

impl DotGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self {}
    }

    #[must_use]
    pub fn generate_dot(&self, graph: &ExportGraph) -> String {
        self.generate_dot_with_options(graph, DotOptions::default())
    }

    #[must_use]
    pub fn generate_dot_with_options(&self, graph: &ExportGraph, opts: DotOptions) -> String {
        let mut s = String::new();
        s.push_str("digraph MovieGraph\n{\n");
        let rank = match opts.rankdir {
            RankDir::LR => "LR",
            RankDir::TB => "TB",
        };
        let (bg, font) = match opts.theme {
            DotTheme::Light => ("white", "black"),
            DotTheme::Dark => ("#1e1e1e", "#e0e0e0"),
        };
        let _ = write!(
            s,
            "  rankdir={rank};\n  graph [fontname=Helvetica, bgcolor=\"{bg}\"];\n  node [fontname=Helvetica, fontsize=10, style=filled, fontcolor=\"{font}\"];\n  edge [fontname=Helvetica, fontsize=9, fontcolor=\"{font}\"];\n"
        );

        for node in &graph.nodes {
            let (fill, shape) = style_for_node(&node.kind, opts.theme);
            let tooltip = match &node.kind {
                NodeKind::Movie { released: Some(year), .. } => format!("{} ({year})", node.label),
                NodeKind::Movie { released: None, .. } => node.label.clone(),
                NodeKind::Person { role } => format!("{} - {role}", node.label),
            };
            let _ = writeln!(
                s,
                "  \"{}\" [label=\"{}\", fillcolor=\"{fill}\", shape=\"{shape}\", tooltip=\"{}\"];",
                escape(&node.id),
                escape(&node.label),
                escape(&tooltip)
            );
        }

        for link in &graph.links {
            let (color, style) = style_for_link(link.kind);
            let _ = writeln!(
                s,
                "  \"{}\" -> \"{}\" [label=\"{}\", color=\"{color}\", style=\"{style}\"];",
                escape(&link.source),
                escape(&link.target),
                link.kind
            );
        }

        s.push_str("}\n");
        s
    }
}

/// Ids keep their characters; only quotes and backslashes need escaping inside DOT strings.
fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

fn style_for_node(kind: &NodeKind, theme: DotTheme) -> (&'static str, &'static str) {
    match (theme, kind) {
        (DotTheme::Light, NodeKind::Movie { .. }) => ("#e0f3ff", "box"),
        (DotTheme::Light, NodeKind::Person { role: Role::Director }) => ("#fff4e0", "ellipse"),
        (DotTheme::Light, NodeKind::Person { role: Role::Actor }) => ("#e8ffe0", "ellipse"),
        (DotTheme::Dark, NodeKind::Movie { .. }) => ("#124559", "box"),
        (DotTheme::Dark, NodeKind::Person { role: Role::Director }) => ("#7a4c00", "ellipse"),
        (DotTheme::Dark, NodeKind::Person { role: Role::Actor }) => ("#0b6e4f", "ellipse"),
    }
}

fn style_for_link(kind: RelationKind) -> (&'static str, &'static str) {
    match kind {
        RelationKind::Directed => ("#d62728", "solid"),
        RelationKind::ActedIn => ("#1f77b4", "dashed"),
    }
}
