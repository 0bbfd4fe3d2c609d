//! The `dot` module contains the conversion of the automata to the graphviz dot format.
//! Start states are drawn blue, accept states red.

use std::io::Write;

use dot_writer::{Attributes, Color, DotWriter, RankDirection, Shape};

use crate::{Dfa, Nfa};

/// Render the NFA to a graphviz dot format.
pub fn nfa_render<W: Write>(nfa: &Nfa, label: &str, output: &mut W) {
    let mut writer = DotWriter::from(output);
    writer.set_pretty_print(true);
    let mut digraph = writer.digraph();
    digraph
        .set_label(label)
        .set_rank_direction(RankDirection::LeftRight);
    // Nodes are created in state order, so the automatic node ids are node_0, node_1, ...
    for state in 0..nfa.state_count() {
        let mut node = digraph.node_auto();
        node.set_label(&state.to_string());
        if state == nfa.start_state().as_usize() {
            node.set_shape(Shape::Circle)
                .set_color(Color::Blue)
                .set_pen_width(3.0);
        }
        if state == nfa.accept_state().as_usize() {
            node.set_shape(Shape::Circle)
                .set_color(Color::Red)
                .set_pen_width(3.0);
        }
    }
    for transition in nfa.transitions() {
        let label = if transition.symbol.is_epsilon() {
            "ε".to_string()
        } else {
            transition.symbol.to_string()
        };
        digraph
            .edge(
                &format!("node_{}", transition.from.as_usize()),
                &format!("node_{}", transition.to.as_usize()),
            )
            .attributes()
            .set_label(&label);
    }
}

/// Render a DFA to a graphviz dot format.
pub fn dfa_render<W: Write>(dfa: &Dfa, label: &str, output: &mut W) {
    let mut writer = DotWriter::from(output);
    writer.set_pretty_print(true);
    let mut digraph = writer.digraph();
    digraph
        .set_label(label)
        .set_rank_direction(RankDirection::LeftRight);
    // Render the states of the DFA
    for state in dfa.states() {
        let mut node = digraph.node_auto();
        node.set_label(&format!("D{}\n{}", state.id(), state));
        if state.id() == dfa.start_state() {
            node.set_shape(Shape::Circle)
                .set_color(Color::Blue)
                .set_pen_width(3.0);
        }
        if state.is_accepting() {
            node.set_color(Color::Red).set_pen_width(3.0);
        }
    }
    // Render the transitions of the DFA
    for state in dfa.states() {
        let row = dfa.row(state.id()).unwrap_or_default();
        for (symbol, target) in dfa.alphabet().iter().zip(row) {
            if let Some(target) = target {
                digraph
                    .edge(
                        &format!("node_{}", state.id().as_usize()),
                        &format!("node_{}", target.as_usize()),
                    )
                    .attributes()
                    .set_label(&symbol.to_string());
            }
        }
    }
}
