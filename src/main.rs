use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{arg, command, value_parser, ArgMatches};
use log::info;

use regex2dfa::{
    dfa_render, nfa_render, write_report, Compiler, Regex2DfaError, Regex2DfaErrorKind,
    StateSetKind,
};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = command!()
        .about("Compiles a regular expression into an NFA and a DFA and prints both")
        .arg(arg!([REGEX] "The regular expression. Read from stdin if omitted"))
        .arg(arg!(--strict "Reject malformed expressions instead of degrading them"))
        .arg(
            arg!(--"state-sets" <KIND> "State set representation used by the subset construction")
                .value_parser(["auto", "fixed", "ordered"])
                .default_value("auto"),
        )
        .arg(
            arg!(--"nfa-dot" <FILE> "Write the NFA in graphviz dot format to FILE")
                .value_parser(value_parser!(PathBuf))
                .required(false),
        )
        .arg(
            arg!(--"dfa-dot" <FILE> "Write the DFA in graphviz dot format to FILE")
                .value_parser(value_parser!(PathBuf))
                .required(false),
        )
        .get_matches();

    let expression = match args.get_one::<String>("REGEX") {
        Some(expression) => expression.clone(),
        None => read_expression(&mut io::stdin().lock())?,
    };

    let state_sets = args
        .get_one::<String>("state-sets")
        .map(|kind| kind.parse::<StateSetKind>())
        .transpose()
        .map_err(anyhow::Error::msg)?
        .unwrap_or_default();

    let compiler = Compiler::new()
        .strict(args.get_flag("strict"))
        .state_sets(state_sets);
    let compilation = compiler.compile(&expression)?;

    let stdout = io::stdout();
    let mut output = stdout.lock();
    write_report(&compilation, &mut output)?;
    output.flush()?;

    write_dot(&args, "nfa-dot", |file| {
        nfa_render(compilation.nfa(), &expression, file)
    })?;
    write_dot(&args, "dfa-dot", |file| {
        dfa_render(compilation.dfa(), &expression, file)
    })?;

    Ok(())
}

// Reads one line from the input. A closed input is an error.
fn read_expression(input: &mut impl BufRead) -> Result<String, Regex2DfaError> {
    eprint!("Enter regular expression: ");
    io::stderr().flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(Regex2DfaError::new(Regex2DfaErrorKind::InputUnavailable));
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn write_dot<F>(args: &ArgMatches, id: &str, render: F) -> anyhow::Result<()>
where
    F: FnOnce(&mut File),
{
    if let Some(path) = args.get_one::<PathBuf>(id) {
        let mut file = File::create(path)
            .with_context(|| format!("can not create {}", path.display()))?;
        render(&mut file);
        info!("Wrote {}", path.display());
    }
    Ok(())
}
