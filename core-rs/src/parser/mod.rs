//! Regex-based recognition of the supported SPARQL subset: `SELECT
//! [DISTINCT] ... WHERE { ... }` and `INSERT DATA { ... }`. Patterns are
//! compiled once behind [`once_cell::sync::Lazy`] statics, mirroring the
//! original's file-scope `std::regex` globals.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{Result, StoreError};

static QUERY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)SELECT\s+(DISTINCT\s+)?(.*?)\s*WHERE\s*\{([^}]+)\}").unwrap()
});

static INSERT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)INSERT\s+DATA\s*\{([^}]+)\}").unwrap());

static TRIPLET_SEP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.\s+").unwrap());
static INSERT_SEP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.\s*").unwrap());

/// One position of a triple pattern: either a bound term or a query
/// variable (recognised by a leading `?`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    Var(String),
    Const(String),
}

impl Term {
    pub fn from_token(token: &str) -> Self {
        if let Some(name) = token.strip_prefix('?') {
            Term::Var(name.to_string())
        } else {
            Term::Const(token.to_string())
        }
    }

    pub fn is_var(&self) -> bool {
        matches!(self, Term::Var(_))
    }
}

/// One `s p o` line of a WHERE clause. The predicate is stored as a raw
/// token (not a [`Term`]) since the grammar never binds it to a variable
/// successfully — a variable predicate is an [`StoreError::UnsupportedPattern`]
/// surfaced by the planner, not the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriplePattern {
    pub s: Term,
    pub p: String,
    pub o: Term,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    pub distinct: bool,
    pub variables: Vec<String>,
    pub patterns: Vec<TriplePattern>,
    /// Predicates touched by the query, duplicates preserved in pattern
    /// order — used as a `LoadPartial` hint.
    pub predicate_hints: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertQuery {
    pub triples: Vec<(String, String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedStatement {
    Select(ParsedQuery),
    Insert(InsertQuery),
}

fn split_triplet_block(raw: &str, sep: &Regex) -> Vec<(String, String, String)> {
    sep.split(raw.trim())
        .map(str::trim)
        .map(|chunk| chunk.trim_end_matches('.').trim())
        .filter(|chunk| !chunk.is_empty())
        .filter_map(|chunk| {
            let mut tokens = chunk.split_whitespace();
            let s = tokens.next()?;
            let p = tokens.next()?;
            let o = tokens.next()?;
            Some((s.to_string(), p.to_string(), o.to_string()))
        })
        .collect()
}

/// Parses `text` as a SPARQL SELECT or INSERT DATA statement.
pub fn parse(text: &str) -> Result<ParsedStatement> {
    if let Some(caps) = QUERY_PATTERN.captures(text) {
        let distinct = caps.get(1).is_some();
        let variables: Vec<String> =
            caps.get(2).map(|m| m.as_str()).unwrap_or_default().split_whitespace().map(String::from).collect();
        let raw_triplets = caps.get(3).map(|m| m.as_str()).unwrap_or_default();

        let mut patterns = Vec::new();
        let mut predicate_hints = Vec::new();
        for (s, p, o) in split_triplet_block(raw_triplets, &TRIPLET_SEP) {
            predicate_hints.push(p.clone());
            patterns.push(TriplePattern { s: Term::from_token(&s), p, o: Term::from_token(&o) });
        }

        return Ok(ParsedStatement::Select(ParsedQuery { distinct, variables, patterns, predicate_hints }));
    }

    if let Some(caps) = INSERT_PATTERN.captures(text) {
        let raw_triplets = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let triples = split_triplet_block(raw_triplets, &INSERT_SEP);
        return Ok(ParsedStatement::Insert(InsertQuery { triples }));
    }

    Err(StoreError::ParseError(text.to_string()))
}
