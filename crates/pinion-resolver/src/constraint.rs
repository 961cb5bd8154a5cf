//! Version constraint parsing and evaluation.
//!
//! Accepted shapes (comparators may be glued to their operands, clauses may
//! be separated by whitespace, `,`, or a `-` directly before a comparator):
//!
//! | Shape                        | Meaning                              |
//! |------------------------------|--------------------------------------|
//! | `name`                       | any version                          |
//! | `name <op> v`                | one comparator                       |
//! | `name <op> v1, <op> v2`      | both comparators                     |
//! | `name v`, `name v build`     | same as `name == v` (build ignored)  |
//!
//! `=` and `==` do not test equality: `== v` accepts `v <= x < v.99999999999999`,
//! so `==1.4` also admits `1.4.5`.

use std::collections::HashMap;
use std::fmt;

use pinion_util::errors::PinionError;

use crate::version::Version;

/// Comparison operator of a single clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Ge,
    Gt,
    Le,
    Lt,
    Ne,
    /// `=` or `==`: a range bounded by the exact-match sentinel.
    Eq,
}

impl Comparator {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            ">=" => Some(Self::Ge),
            ">" => Some(Self::Gt),
            "<=" => Some(Self::Le),
            "<" => Some(Self::Lt),
            "!=" => Some(Self::Ne),
            "=" | "==" => Some(Self::Eq),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ge => ">=",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Lt => "<",
            Self::Ne => "!=",
            Self::Eq => "==",
        }
    }
}

/// Whether `candidate` satisfies `op operand`.
pub fn evaluate(op: Comparator, operand: &Version, candidate: &Version) -> bool {
    match op {
        Comparator::Ge => candidate >= operand,
        Comparator::Gt => candidate > operand,
        Comparator::Le => candidate <= operand,
        Comparator::Lt => candidate < operand,
        Comparator::Ne => candidate != operand,
        Comparator::Eq => candidate >= operand && *candidate < operand.exact_upper_bound(),
    }
}

/// One `(comparator, version)` pair.
#[derive(Debug, Clone)]
pub struct Clause {
    pub op: Comparator,
    pub version: Version,
}

impl Clause {
    pub fn matches(&self, candidate: &Version) -> bool {
        evaluate(self.op, &self.version, candidate)
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op.as_str(), self.version)
    }
}

/// A predicate over the versions of one named package.
///
/// Clauses are ANDed; a constraint without clauses accepts every version.
#[derive(Debug, Clone)]
pub struct Constraint {
    pub name: String,
    pub clauses: Vec<Clause>,
    /// The constraint strings this was parsed (and merged) from.
    pub sources: Vec<String>,
}

#[derive(Debug, PartialEq)]
enum Token {
    Op(Comparator),
    Word(String),
}

impl Constraint {
    /// Parse a single constraint string.
    pub fn parse(spec: &str) -> Result<Self, PinionError> {
        let fail = |reason: &str| PinionError::ConstraintParse {
            spec: spec.to_string(),
            reason: reason.to_string(),
        };

        let tokens = tokenize(spec).map_err(|reason| fail(&reason))?;
        let mut iter = tokens.into_iter();
        let name = match iter.next() {
            Some(Token::Word(name)) => name,
            Some(Token::Op(op)) => {
                return Err(fail(&format!(
                    "expected a package name before `{}`",
                    op.as_str()
                )))
            }
            None => return Err(fail("empty constraint")),
        };
        let rest: Vec<Token> = iter.collect();

        let clauses = match rest.as_slice() {
            [] => Vec::new(),
            [Token::Op(op), Token::Word(v)] => vec![clause(*op, v)],
            [Token::Op(op1), Token::Word(v1), Token::Op(op2), Token::Word(v2)] => {
                vec![clause(*op1, v1), clause(*op2, v2)]
            }
            [Token::Word(v)] | [Token::Word(v), Token::Word(_)] => {
                vec![clause(Comparator::Eq, v)]
            }
            [.., Token::Op(op)] => {
                return Err(fail(&format!("expected a version after `{}`", op.as_str())))
            }
            _ => {
                return Err(fail(&format!(
                    "unexpected {} token(s) after the package name",
                    rest.len()
                )))
            }
        };

        Ok(Self {
            name,
            clauses,
            sources: vec![spec.trim().to_string()],
        })
    }

    pub fn matches(&self, candidate: &Version) -> bool {
        self.clauses.iter().all(|c| c.matches(candidate))
    }

    /// AND another constraint on the same package into this one.
    pub fn merge(&mut self, other: Constraint) {
        debug_assert_eq!(self.name, other.name);
        self.clauses.extend(other.clauses);
        self.sources.extend(other.sources);
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sources.join(", "))
    }
}

fn clause(op: Comparator, version: &str) -> Clause {
    Clause {
        op,
        version: Version::parse(version),
    }
}

fn tokenize(spec: &str) -> Result<Vec<Token>, String> {
    let chars: Vec<char> = spec.chars().collect();
    let mut tokens = Vec::new();
    let mut word = String::new();
    let mut i = 0;

    let flush = |word: &mut String, tokens: &mut Vec<Token>| {
        if !word.is_empty() {
            tokens.push(Token::Word(std::mem::take(word)));
        }
    };

    while i < chars.len() {
        let ch = chars[i];
        match ch {
            c if c.is_whitespace() || c == ',' => {
                flush(&mut word, &mut tokens);
                i += 1;
            }
            '<' | '>' | '=' | '!' => {
                flush(&mut word, &mut tokens);
                let two: String = chars[i..(i + 2).min(chars.len())].iter().collect();
                let (op, width) = match Comparator::from_token(&two) {
                    Some(op) if two.len() == 2 => (op, 2),
                    _ => match Comparator::from_token(&ch.to_string()) {
                        Some(op) => (op, 1),
                        None => return Err(format!("unexpected `{ch}`")),
                    },
                };
                tokens.push(Token::Op(op));
                i += width;
            }
            '-' if chars
                .get(i + 1)
                .is_some_and(|next| matches!(next, '<' | '>' | '=' | '!')) =>
            {
                flush(&mut word, &mut tokens);
                i += 1;
            }
            _ => {
                word.push(ch);
                i += 1;
            }
        }
    }
    flush(&mut word, &mut tokens);

    Ok(tokens)
}

/// Parse dependency specs and AND together those that name the same package.
///
/// The result keeps the order in which each package name first appears.
pub fn group_by_name<S: AsRef<str>>(specs: &[S]) -> Result<Vec<Constraint>, PinionError> {
    let mut grouped: Vec<Constraint> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for spec in specs {
        let constraint = Constraint::parse(spec.as_ref())?;
        match positions.get(&constraint.name) {
            Some(&pos) => grouped[pos].merge(constraint),
            None => {
                positions.insert(constraint.name.clone(), grouped.len());
                grouped.push(constraint);
            }
        }
    }
    Ok(grouped)
}

/// The versions in `available` accepted by every constraint in `constraints`.
///
/// All constraints are expected to name the same package; callers group
/// them with [`group_by_name`] first. Input order is preserved.
pub fn filter_candidates<'a>(constraints: &[Constraint], available: &[&'a str]) -> Vec<&'a str> {
    available
        .iter()
        .copied()
        .filter(|v| {
            let version = Version::parse(v);
            constraints.iter().all(|c| c.matches(&version))
        })
        .collect()
}
