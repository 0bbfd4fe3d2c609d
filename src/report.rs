//! The textual report of a compilation.
//!
//! The report lists the NFA start and accept states, the NFA transitions in construction order and
//! the DFA transition table. Accepting DFA states are prefixed with `*`, missing transitions are
//! shown as `-`.

use std::io::Write;

use crate::{Compilation, Dfa, Nfa, Result};

const NFA_RULE_WIDTH: usize = 24;
const DFA_RULE_WIDTH: usize = 60;

/// Write the complete report of the compilation.
pub fn write_report(compilation: &Compilation, output: &mut dyn Write) -> Result<()> {
    write_nfa(compilation.nfa(), output)?;
    writeln!(output)?;
    write_dfa(compilation.dfa(), output)?;
    Ok(())
}

/// Write the start and accept state and the transition table of the NFA.
pub fn write_nfa(nfa: &Nfa, output: &mut dyn Write) -> Result<()> {
    writeln!(output, "Start state: {}", nfa.start_state())?;
    writeln!(output, "Accept state: {}", nfa.accept_state())?;
    writeln!(output)?;
    writeln!(output, "State Transition Table")?;
    write_line(output, format!("{:<8} {:<8} {:<8}", "From", "Symbol", "To"))?;
    writeln!(output, "{}", "-".repeat(NFA_RULE_WIDTH))?;
    for transition in nfa.transitions() {
        write_line(
            output,
            format!(
                "{:<8} {:<8} {:<8}",
                transition.from.to_string(),
                transition.symbol.to_string(),
                transition.to.to_string()
            ),
        )?;
    }
    Ok(())
}

/// Write the DFA transition table with one column per alphabet symbol.
pub fn write_dfa(dfa: &Dfa, output: &mut dyn Write) -> Result<()> {
    writeln!(output, "DFA Transition Table")?;
    let mut header = format!("{:<8} {:<16}", "State", "Set");
    for symbol in dfa.alphabet() {
        header.push_str(&format!(" {:<8}", symbol));
    }
    write_line(output, header)?;
    writeln!(output, "{}", "-".repeat(DFA_RULE_WIDTH))?;

    for state in dfa.states() {
        let label = if state.is_accepting() {
            format!("*D{}", state.id())
        } else {
            format!("D{}", state.id())
        };
        let mut line = format!("{:<8} {:<16}", label, state.to_string());
        for target in dfa.row(state.id()).unwrap_or_default() {
            let cell = target.map_or_else(|| "-".to_string(), |t| format!("D{}", t));
            line.push_str(&format!(" {:<8}", cell));
        }
        write_line(output, line)?;
    }
    writeln!(output)?;
    writeln!(output, "Note: *Dk means accepting DFA state.")?;
    Ok(())
}

// Column padding leaves trailing blanks behind.
fn write_line(output: &mut dyn Write, line: String) -> Result<()> {
    writeln!(output, "{}", line.trim_end())?;
    Ok(())
}
