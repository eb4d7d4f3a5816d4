use tracing::debug;
use winnow::prelude::*;
use winnow::ascii::space0;
use winnow::combinator::{alt, delimited, eof};
use winnow::token::{rest, take_until, take_while};

use crate::error::Error;
use crate::store::RelationshipStore;

const CONTEXT_CHARS: usize = 40;

#[derive(Debug, PartialEq)]
enum Statement {
    Person(String),
    Relationship {
        from: String,
        label: String,
        to: String,
    },
}

/// Build a store from relationship text, one statement per line:
///
/// ```text
/// # comment
/// Alice
/// Alice --mother--> Bob
/// "Mary Ann" --aunt--> Bob
/// ```
pub fn parse_relationships(input: &str) -> Result<RelationshipStore, Error> {
    let mut store = RelationshipStore::new();

    for (i, line) in input.lines().enumerate() {
        let line = line.trim_end();
        let parsed = statement.parse(line).map_err(|e| Error::Syntax {
            line: i + 1,
            context: context(&line[e.offset()..]),
        })?;

        match parsed {
            Some(Statement::Person(id)) => store.add_person(&id),
            Some(Statement::Relationship { from, label, to }) => {
                store.add_relationship(&from, &label, &to)
            }
            None => {}
        }
    }

    debug!(
        people = store.len(),
        relationships = store.edges().len(),
        "parsed relationships"
    );
    Ok(store)
}

fn context(remaining: &str) -> String {
    if remaining.is_empty() {
        return "end of line".to_string();
    }
    if remaining.chars().count() > CONTEXT_CHARS {
        let head: String = remaining.chars().take(CONTEXT_CHARS).collect();
        format!("{head}...")
    } else {
        remaining.to_string()
    }
}

fn statement(input: &mut &str) -> winnow::Result<Option<Statement>> {
    space0.parse_next(input)?;
    alt((
        eof.map(|_| None),
        comment.map(|_| None),
        relationship.map(Some),
        person.map(Some),
    ))
    .parse_next(input)
}

fn comment(input: &mut &str) -> winnow::Result<()> {
    ("#", rest).void().parse_next(input)
}

fn person(input: &mut &str) -> winnow::Result<Statement> {
    let id = identifier.parse_next(input)?;
    Ok(Statement::Person(id))
}

fn relationship(input: &mut &str) -> winnow::Result<Statement> {
    let from = identifier.parse_next(input)?;
    space0.parse_next(input)?;
    "--".parse_next(input)?;
    let label = take_until(1.., "-->").parse_next(input)?;
    "-->".parse_next(input)?;
    space0.parse_next(input)?;
    let to = identifier.parse_next(input)?;

    let label = label.trim();
    if label.is_empty() {
        return Err(winnow::error::ParserError::from_input(input));
    }
    Ok(Statement::Relationship {
        from,
        label: label.to_string(),
        to,
    })
}

fn identifier(input: &mut &str) -> winnow::Result<String> {
    alt((quoted, bare)).map(str::to_string).parse_next(input)
}

fn bare<'s>(input: &mut &'s str) -> winnow::Result<&'s str> {
    take_while(1.., |c: char| c.is_alphanumeric() || c == '_').parse_next(input)
}

fn quoted<'s>(input: &mut &'s str) -> winnow::Result<&'s str> {
    delimited("\"", take_while(1.., |c: char| c != '"'), "\"").parse_next(input)
}
