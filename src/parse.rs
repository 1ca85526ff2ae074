use crate::Graph;
use std::{iter::Peekable, vec};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unexpected character `{ch}` at column {column}")]
    UnexpectedChar { ch: char, column: usize },
    #[error("unexpected `{found}` at column {column}, expected {expected}")]
    UnexpectedToken {
        found: String,
        column: usize,
        expected: &'static str,
    },
    #[error("line ended early, expected {expected}")]
    UnexpectedEnd { expected: &'static str },
    #[error("unknown command `{command}` at column {column}")]
    UnknownCommand { command: String, column: usize },
    #[error("number `{token}` at column {column} does not fit a vertex id")]
    NumberOutOfRange { token: String, column: usize },
    #[error("vertex `{vertex}` at column {column} is out of range for {vertices} vertices")]
    VertexOutOfRange {
        vertex: u32,
        column: usize,
        vertices: u32,
    },
    #[error("edge list given before any `V` line")]
    MissingVertexCount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Word,
    Number,
    LBrace,
    RBrace,
    LAngle,
    RAngle,
    Comma,
}

#[derive(Debug, Clone, Copy)]
struct Token<'a> {
    kind: Kind,
    text: &'a str,
    column: usize,
}

fn tokenize(line: &str) -> Result<Vec<Token<'_>>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = line.char_indices().peekable();
    let mut consumed = 0;
    while let Some((start, ch)) = chars.next() {
        consumed += 1;
        let column = consumed;
        let single = |kind| Token {
            kind,
            text: &line[start..start + ch.len_utf8()],
            column,
        };
        let token = match ch {
            c if c.is_whitespace() => continue,
            '{' => single(Kind::LBrace),
            '}' => single(Kind::RBrace),
            '<' => single(Kind::LAngle),
            '>' => single(Kind::RAngle),
            ',' => single(Kind::Comma),
            c if c.is_ascii_digit() || c.is_ascii_alphabetic() => {
                let digits = c.is_ascii_digit();
                let mut end = start + 1;
                while let Some(&(i, next)) = chars.peek() {
                    let same = if digits {
                        next.is_ascii_digit()
                    } else {
                        next.is_ascii_alphanumeric()
                    };
                    if !same {
                        break;
                    }
                    end = i + 1;
                    chars.next();
                    consumed += 1;
                }
                Token {
                    kind: if digits { Kind::Number } else { Kind::Word },
                    text: &line[start..end],
                    column,
                }
            }
            ch => return Err(ParseError::UnexpectedChar { ch, column }),
        };
        tokens.push(token);
    }
    Ok(tokens)
}

/// A vertex id together with where it appeared on the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub vertex: u32,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Vertices(u32),
    Edges(Vec<(Endpoint, Endpoint)>),
}

struct Parser<'a> {
    tokens: Peekable<vec::IntoIter<Token<'a>>>,
}

impl<'a> Parser<'a> {
    fn next(&mut self, expected: &'static str) -> Result<Token<'a>, ParseError> {
        self.tokens
            .next()
            .ok_or(ParseError::UnexpectedEnd { expected })
    }

    fn expect(&mut self, kind: Kind, expected: &'static str) -> Result<Token<'a>, ParseError> {
        let token = self.next(expected)?;
        if token.kind != kind {
            return Err(unexpected(token, expected));
        }
        Ok(token)
    }

    fn number(&mut self) -> Result<Endpoint, ParseError> {
        let token = self.expect(Kind::Number, "a number")?;
        let vertex = token
            .text
            .parse()
            .map_err(|_| ParseError::NumberOutOfRange {
                token: token.text.to_string(),
                column: token.column,
            })?;
        Ok(Endpoint {
            vertex,
            column: token.column,
        })
    }

    fn edge(&mut self) -> Result<(Endpoint, Endpoint), ParseError> {
        self.expect(Kind::LAngle, "`<`")?;
        let start = self.number()?;
        self.expect(Kind::Comma, "`,`")?;
        let end = self.number()?;
        self.expect(Kind::RAngle, "`>`")?;
        Ok((start, end))
    }

    fn edges(&mut self) -> Result<Vec<(Endpoint, Endpoint)>, ParseError> {
        self.expect(Kind::LBrace, "`{`")?;
        let mut edges = Vec::new();
        if matches!(self.tokens.peek(), Some(t) if t.kind == Kind::RBrace) {
            self.tokens.next();
            return Ok(edges);
        }
        loop {
            edges.push(self.edge()?);
            let token = self.next("`,` or `}`")?;
            match token.kind {
                Kind::Comma => continue,
                Kind::RBrace => return Ok(edges),
                _ => return Err(unexpected(token, "`,` or `}`")),
            }
        }
    }

    fn finish(&mut self) -> Result<(), ParseError> {
        match self.tokens.next() {
            Some(token) => Err(unexpected(token, "end of line")),
            None => Ok(()),
        }
    }
}

fn unexpected(token: Token<'_>, expected: &'static str) -> ParseError {
    ParseError::UnexpectedToken {
        found: token.text.to_string(),
        column: token.column,
        expected,
    }
}

/// Parses one input line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Command>, ParseError> {
    let mut parser = Parser {
        tokens: tokenize(line)?.into_iter().peekable(),
    };
    let Some(head) = parser.tokens.next() else {
        return Ok(None);
    };
    if head.kind != Kind::Word {
        return Err(unexpected(head, "`V` or `E`"));
    }
    let command = match head.text {
        "V" => Command::Vertices(parser.number()?.vertex),
        "E" => Command::Edges(parser.edges()?),
        other => {
            return Err(ParseError::UnknownCommand {
                command: other.to_string(),
                column: head.column,
            })
        }
    };
    parser.finish()?;
    Ok(Some(command))
}

/// Tracks the vertex count across lines and turns edge lines into graphs.
#[derive(Debug, Default)]
pub struct Session {
    vertices: Option<u32>,
}

impl Session {
    pub fn new() -> Session {
        Session::default()
    }

    /// Feeds one line. Returns a graph when the line starts a round; an
    /// empty edge list starts no round.
    pub fn feed(&mut self, line: &str) -> Result<Option<Graph>, ParseError> {
        match parse_line(line)? {
            None => Ok(None),
            Some(Command::Vertices(n)) => {
                self.vertices = Some(n);
                Ok(None)
            }
            Some(Command::Edges(endpoints)) => {
                let vertices = self.vertices.ok_or(ParseError::MissingVertexCount)?;
                let mut edges = Vec::with_capacity(endpoints.len());
                for (start, end) in endpoints {
                    for endpoint in [start, end] {
                        if endpoint.vertex >= vertices {
                            return Err(ParseError::VertexOutOfRange {
                                vertex: endpoint.vertex,
                                column: endpoint.column,
                                vertices,
                            });
                        }
                    }
                    edges.push((start.vertex, end.vertex));
                }
                if edges.is_empty() {
                    return Ok(None);
                }
                Ok(Some(Graph::new(vertices, edges)))
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn edges(line: &str) -> Vec<(u32, u32)> {
        match parse_line(line).unwrap() {
            Some(Command::Edges(edges)) => edges
                .into_iter()
                .map(|(s, e)| (s.vertex, e.vertex))
                .collect(),
            other => panic!("expected edges, got {other:?}"),
        }
    }

    #[test]
    fn test_vertex_line() {
        assert_eq!(parse_line("V 5").unwrap(), Some(Command::Vertices(5)));
        assert_eq!(parse_line("  V   12 ").unwrap(), Some(Command::Vertices(12)));
        assert_eq!(parse_line("").unwrap(), None);
        assert_eq!(parse_line("   ").unwrap(), None);
    }

    #[test]
    fn test_edge_line() {
        assert_eq!(edges("E {<0,1>,<1,2>}"), vec![(0, 1), (1, 2)]);
        assert_eq!(edges("E { <0, 1> , <1 ,2> }"), vec![(0, 1), (1, 2)]);
        assert_eq!(edges("E {}"), vec![]);
        assert_eq!(edges("E {<1234,56789>}"), vec![(1234, 56789)]);
    }

    #[test]
    fn test_errors_name_the_token() {
        assert_eq!(
            parse_line("E {<0;1>}"),
            Err(ParseError::UnexpectedChar { ch: ';', column: 6 })
        );
        assert_eq!(
            parse_line("E {<0,1>,}"),
            Err(ParseError::UnexpectedToken {
                found: "}".to_string(),
                column: 10,
                expected: "`<`",
            })
        );
        assert_eq!(
            parse_line("E {<0,1>"),
            Err(ParseError::UnexpectedEnd {
                expected: "`,` or `}`"
            })
        );
        assert_eq!(
            parse_line("X 3"),
            Err(ParseError::UnknownCommand {
                command: "X".to_string(),
                column: 1,
            })
        );
        assert_eq!(
            parse_line("V 99999999999"),
            Err(ParseError::NumberOutOfRange {
                token: "99999999999".to_string(),
                column: 3,
            })
        );
        assert_eq!(
            parse_line("V 3 4"),
            Err(ParseError::UnexpectedToken {
                found: "4".to_string(),
                column: 5,
                expected: "end of line",
            })
        );
        assert_eq!(
            parse_line("E {<-1,2>}"),
            Err(ParseError::UnexpectedChar { ch: '-', column: 5 })
        );
    }

    #[test]
    fn test_long_line_columns() {
        let edges: Vec<String> = (0..50_000).map(|i| format!("<{i},{}>", i + 1)).collect();
        let line = format!("E {{{}}}", edges.join(","));
        let mut session = Session::new();
        session.feed("V 50001").unwrap();
        let graph = session.feed(&line).unwrap().unwrap();
        assert_eq!(graph.edges().len(), 50_000);
        assert_eq!(graph.edges()[49_999], (49_999, 50_000));

        let broken = format!("{} ;", &line[..line.len() - 1]);
        assert_eq!(
            parse_line(&broken),
            Err(ParseError::UnexpectedChar {
                ch: ';',
                column: broken.chars().count(),
            })
        );
    }

    #[test]
    fn test_session() {
        let mut session = Session::new();
        assert_eq!(
            session.feed("E {<0,1>}"),
            Err(ParseError::MissingVertexCount)
        );
        assert_eq!(session.feed("V 3"), Ok(None));
        let graph = session.feed("E {<0,1>,<1,2>}").unwrap().unwrap();
        assert_eq!(graph.vertex_count(), 3);
        assert_eq!(graph.edges(), &[(0, 1), (1, 2)]);
        assert_eq!(session.feed("E {}"), Ok(None));
        assert_eq!(
            session.feed("E {<0,3>}"),
            Err(ParseError::VertexOutOfRange {
                vertex: 3,
                column: 7,
                vertices: 3,
            })
        );
        assert_eq!(session.feed("V 5"), Ok(None));
        assert_eq!(session.feed("E {}"), Ok(None));
        assert!(session.feed("E {<0,4>}").unwrap().is_some());
    }
}
