//! CPLEX LP rendering of a selection [`Problem`], for external MILP engines.

use std::fmt::Write;

use crate::problem::Problem;

/// Terms per output line; keeps lines well under the LP format's limit.
const TERMS_PER_LINE: usize = 8;

/// Render `problem` as CPLEX LP text.
///
/// Variable `x{i}` is variable `i` of the problem; a comment header maps
/// each one back to its `name version`.
pub fn write_lp(problem: &Problem) -> String {
    let mut out = String::new();
    out.push_str("\\ pinion selection problem\n");
    for (i, var) in problem.variables.iter().enumerate() {
        let _ = writeln!(out, "\\ x{i} = {}", var.label);
    }

    out.push_str("Minimize\n obj:");
    if problem.variables.is_empty() {
        out.push_str(" 0");
    } else {
        let terms: Vec<String> = problem
            .variables
            .iter()
            .enumerate()
            .map(|(i, var)| format!("{} x{i}", var.cost))
            .collect();
        push_sum(&mut out, &terms);
    }
    out.push('\n');

    out.push_str("Subject To\n");
    for (i, package) in problem.packages.iter().enumerate() {
        if package.variables.len() < 2 {
            continue;
        }
        let _ = write!(out, " pkg_{i}:");
        push_sum(&mut out, &names(&package.variables));
        out.push_str(" <= 1\n");
    }

    for (i, request) in problem.requests.iter().enumerate() {
        if request.candidates.is_empty() {
            let _ = writeln!(out, "\\ req_{i}: `{}` has no candidates", request.constraint);
            continue;
        }
        let _ = write!(out, " req_{i}:");
        push_sum(&mut out, &names(&request.candidates));
        out.push_str(" = 1\n");
    }

    for (i, imp) in problem.implications.iter().enumerate() {
        let _ = write!(out, " dep_{i}: x{}", imp.from);
        push_negated(&mut out, &names(&imp.candidates));
        out.push_str(" <= 0\n");
    }

    for (var, parents) in problem.parents.iter().enumerate() {
        if problem.requested[var] {
            continue;
        }
        let _ = write!(out, " sup_{var}: x{var}");
        push_negated(&mut out, &names(parents));
        out.push_str(" <= 0\n");
    }

    out.push_str("Binary\n");
    let all: Vec<String> = (0..problem.variables.len()).map(|i| format!("x{i}")).collect();
    for chunk in all.chunks(TERMS_PER_LINE) {
        let _ = writeln!(out, " {}", chunk.join(" "));
    }
    out.push_str("End\n");
    out
}

fn names(vars: &[usize]) -> Vec<String> {
    vars.iter().map(|v| format!("x{v}")).collect()
}

fn push_sum(out: &mut String, terms: &[String]) {
    for (n, term) in terms.iter().enumerate() {
        if n > 0 && n % TERMS_PER_LINE == 0 {
            out.push_str("\n   ");
        }
        if n == 0 {
            let _ = write!(out, " {term}");
        } else {
            let _ = write!(out, " + {term}");
        }
    }
}

fn push_negated(out: &mut String, terms: &[String]) {
    for (n, term) in terms.iter().enumerate() {
        if n > 0 && n % TERMS_PER_LINE == 0 {
            out.push_str("\n   ");
        }
        let _ = write!(out, " - {term}");
    }
}
