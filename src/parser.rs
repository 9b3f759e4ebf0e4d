/// Recursive-descent parser for the command DSL.
///
/// Consumes a token stream per the grammar table, recursing into embedded
/// sub-commands. A sub-command's extent is never known in advance: the
/// recursive call simply consumes exactly the tokens its own schema
/// requires and returns, so a terminator keyword (`LENGTH` after a
/// `SECTION`, `SECOND` after a `FIRST`) binds at the correct nesting depth
/// by construction.
use crate::ast::{BooleanKind, Command, CommandKind, MaterialRef};
use crate::env::Environment;
use crate::error::{ParseError, ParseResult};
use crate::grammar::{self, CommandSchema, Field, FieldKind};
use crate::lexer::{self, SpannedToken};
use crate::span::Span;
use crate::token::Token;

const MAX_DEPTH: usize = 64;

/// Parse one program line against `env`.
///
/// An assignment line `name = <command>` records the binding (source text
/// and ACT) in `env`; `$name` references re-enter the parser on the
/// binding's stored source text.
///
/// # Errors
/// Returns a `ParseError` at the exact point of grammar violation.
pub fn parse_line(line: &str, env: &mut Environment) -> ParseResult<Command> {
    let tokens = lexer::lex(line)?;
    if tokens.is_empty() {
        return Err(ParseError::UnexpectedEol {
            expected: "a command".to_string(),
        });
    }
    let mut parser = Parser::new(line, tokens, 0);

    // Assignment form is recognized before grammar dispatch.
    if parser.is_assignment_ahead() {
        let (name, name_span) = parser.expect_word()?;
        parser.advance(); // `=`
        let rest_start = match parser.tokens.get(parser.pos) {
            Some((_, span)) => span.start,
            None => {
                return Err(ParseError::UnexpectedEol {
                    expected: format!("a command after `{name} =`"),
                })
            }
        };
        let body = parser.parse_command(env)?;
        parser.expect_end()?;
        let source = line[rest_start..].trim_end();
        env.bind(&name, source, body.clone());
        let span = name_span.merge(body.span);
        return Ok(Command::new(
            CommandKind::Assignment {
                name,
                body: Box::new(body),
            },
            span,
        ));
    }

    let command = parser.parse_command(env)?;
    parser.expect_end()?;
    Ok(command)
}

struct Parser<'src> {
    source: &'src str,
    tokens: Vec<SpannedToken>,
    pos: usize,
    depth: usize,
}

/// A parsed schema field, prior to being assembled into a typed ACT node.
enum FieldValue {
    Vec3([f64; 3]),
    Vec2([f64; 2]),
    Scalar(f64),
    Sub(Command),
    SubList(Vec<Command>),
    Points(Vec<[f64; 3]>),
    Text(Option<String>),
}

impl<'src> Parser<'src> {
    const fn new(source: &'src str, tokens: Vec<SpannedToken>, depth: usize) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
            depth,
        }
    }

    fn enter_recursion(&mut self) -> ParseResult<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            Err(ParseError::TooDeeplyNested {
                span: self.peek_span().into(),
            })
        } else {
            Ok(())
        }
    }

    fn leave_recursion(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    // ── Helpers ──────────────────────────────────────────────

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn peek_span(&self) -> Span {
        self.tokens.get(self.pos).map_or_else(
            || Span::new(self.source.len(), self.source.len()),
            |(_, s)| *s,
        )
    }

    fn last_span(&self) -> Span {
        if self.pos == 0 {
            Span::DUMMY
        } else {
            self.tokens[self.pos - 1].1
        }
    }

    fn advance(&mut self) -> Option<SpannedToken> {
        if self.pos < self.tokens.len() {
            let tok = self.tokens[self.pos].clone();
            self.pos += 1;
            Some(tok)
        } else {
            None
        }
    }

    const fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn slice(&self, span: Span) -> &'src str {
        &self.source[span.start..span.end]
    }

    /// The source text of the word at `pos + offset`, if it is a word.
    fn word_at(&self, offset: usize) -> Option<&'src str> {
        match self.tokens.get(self.pos + offset) {
            Some((Token::Word, span)) => Some(self.slice(*span)),
            _ => None,
        }
    }

    fn is_assignment_ahead(&self) -> bool {
        self.word_at(0).is_some() && matches!(self.tokens.get(1), Some((Token::Equals, _)))
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        self.word_at(0)
            .is_some_and(|word| word.eq_ignore_ascii_case(keyword))
    }

    fn expect_word(&mut self) -> ParseResult<(String, Span)> {
        match self.peek() {
            Some(Token::Word) => {
                let (_, span) = self.advance().unwrap();
                Ok((self.slice(span).to_string(), span))
            }
            Some(tok) => Err(ParseError::MissingKeyword {
                expected: "a keyword".to_string(),
                found: tok.to_string(),
                span: self.peek_span().into(),
            }),
            None => Err(ParseError::UnexpectedEol {
                expected: "a keyword".to_string(),
            }),
        }
    }

    fn expect_keyword(&mut self, keyword: &'static str) -> ParseResult<Span> {
        match self.peek() {
            Some(Token::Word) if self.at_keyword(keyword) => Ok(self.advance().unwrap().1),
            Some(tok) => {
                let found = match tok {
                    Token::Word => self.slice(self.peek_span()).to_string(),
                    other => other.to_string(),
                };
                Err(ParseError::MissingKeyword {
                    expected: keyword.to_string(),
                    found,
                    span: self.peek_span().into(),
                })
            }
            None => Err(ParseError::UnexpectedEol {
                expected: format!("keyword `{keyword}`"),
            }),
        }
    }

    fn expect_end(&self) -> ParseResult<()> {
        if self.at_end() {
            Ok(())
        } else {
            Err(ParseError::TrailingTokens {
                span: self.peek_span().into(),
            })
        }
    }

    // ── Commands ─────────────────────────────────────────────

    fn parse_command(&mut self, env: &mut Environment) -> ParseResult<Command> {
        self.enter_recursion()?;
        let result = self.parse_command_inner(env);
        self.leave_recursion();
        result
    }

    fn parse_command_inner(&mut self, env: &mut Environment) -> ParseResult<Command> {
        match self.peek() {
            Some(Token::Variable(_)) => {
                let (tok, span) = self.advance().unwrap();
                let name = match tok {
                    Token::Variable(name) => name,
                    _ => unreachable!(),
                };
                let body = self.parse_variable_body(&name, span, env)?;
                let mut command = Command::new(
                    CommandKind::VarRef {
                        name,
                        body: Box::new(body),
                    },
                    span,
                );
                self.parse_material_suffix(&mut command)?;
                Ok(command)
            }
            Some(Token::Word) => self.parse_keyword_command(env),
            Some(tok) => Err(ParseError::MissingKeyword {
                expected: "CREATE".to_string(),
                found: tok.to_string(),
                span: self.peek_span().into(),
            }),
            None => Err(ParseError::UnexpectedEol {
                expected: "a command".to_string(),
            }),
        }
    }

    /// Splice the binding's stored source text and re-enter the parser on
    /// it. The nesting depth carries over so spliced commands count toward
    /// the recursion limit.
    fn parse_variable_body(
        &mut self,
        name: &str,
        span: Span,
        env: &mut Environment,
    ) -> ParseResult<Command> {
        let source = match env.binding(name) {
            Some(binding) => binding.source.clone(),
            None => {
                return Err(ParseError::UnknownVariable {
                    name: name.to_string(),
                    span: span.into(),
                })
            }
        };
        let tokens = lexer::lex(&source)?;
        let mut inner = Parser::new(&source, tokens, self.depth);
        let mut body = inner.parse_command(env)?;
        inner.expect_end()?;
        // Spans of a spliced body do not point back into the enclosing line.
        body.span = Span::DUMMY;
        Ok(body)
    }

    fn parse_keyword_command(&mut self, env: &mut Environment) -> ParseResult<Command> {
        let (verb, verb_span) = self.expect_word()?;

        // Dispatch looks ahead up to two words so multi-word nouns
        // (`BOOLEAN CUT`, `FACE EDGES`) commit to the right schema.
        let mut nouns: Vec<&str> = Vec::with_capacity(2);
        for offset in 0..2 {
            match self.word_at(offset) {
                Some(word) => nouns.push(word),
                None => break,
            }
        }
        let (schema, used) = match grammar::lookup(&verb, &nouns) {
            Some(hit) => hit,
            None => {
                return Err(ParseError::UnknownCommand {
                    verb: verb.to_uppercase(),
                    noun: nouns.first().unwrap_or(&"").to_uppercase(),
                    span: verb_span.merge(self.peek_span()).into(),
                })
            }
        };
        for _ in 0..used {
            self.advance();
        }

        let mut values = Vec::with_capacity(schema.fields.len());
        for field in schema.fields {
            values.push(self.parse_field(field, env)?);
        }

        let kind = build_kind(schema, values);
        let mut command = Command::new(kind, verb_span.merge(self.last_span()));
        self.parse_material_suffix(&mut command)?;
        command.span = verb_span.merge(self.last_span());
        Ok(command)
    }

    // ── Fields ───────────────────────────────────────────────

    fn parse_field(&mut self, field: &Field, env: &mut Environment) -> ParseResult<FieldValue> {
        // Optional fields are introduced by their keyword or absent.
        if field.kind == FieldKind::OptionalText {
            if !field.keyword.is_empty() && !self.at_keyword(field.keyword[0]) {
                return Ok(FieldValue::Text(None));
            }
            self.advance(); // keyword
            let (text, _) = self.expect_word()?;
            return Ok(FieldValue::Text(Some(text)));
        }

        for keyword in field.keyword {
            self.expect_keyword(keyword)?;
        }
        let keyword_span = self.last_span();

        match field.kind {
            FieldKind::Vec3 => {
                let [x, y, z] = self.numbers::<3>(field)?;
                Ok(FieldValue::Vec3([x, y, z]))
            }
            FieldKind::Vec2 => {
                let [x, y] = self.numbers::<2>(field)?;
                Ok(FieldValue::Vec2([x, y]))
            }
            FieldKind::Scalar | FieldKind::Angle => {
                let [value] = self.numbers::<1>(field)?;
                Ok(FieldValue::Scalar(value))
            }
            FieldKind::SubCommand => {
                if self.at_end() {
                    return Err(ParseError::UnterminatedSubCommand {
                        field: field.name,
                        span: keyword_span.into(),
                    });
                }
                Ok(FieldValue::Sub(self.parse_command(env)?))
            }
            FieldKind::SubCommandList => {
                if self.at_end() {
                    return Err(ParseError::UnterminatedSubCommand {
                        field: field.name,
                        span: keyword_span.into(),
                    });
                }
                let mut commands = vec![self.parse_command(env)?];
                while self.at_keyword("AND") {
                    self.advance();
                    commands.push(self.parse_command(env)?);
                }
                Ok(FieldValue::SubList(commands))
            }
            FieldKind::Points { min } => self.parse_points(field, min),
            FieldKind::OptionalText => unreachable!("handled above"),
        }
    }

    /// Read exactly `N` numbers. A non-number after at least one number is
    /// an arity mismatch (the field ran short); a non-number first is a
    /// bad numeric argument.
    fn numbers<const N: usize>(&mut self, field: &Field) -> ParseResult<[f64; N]> {
        let mut out = [0.0; N];
        for (found, slot) in out.iter_mut().enumerate() {
            match self.peek() {
                Some(Token::Number(n)) => {
                    *slot = *n;
                    self.advance();
                }
                Some(_) if found > 0 => {
                    return Err(ParseError::ArityMismatch {
                        field: field.name,
                        expected: N,
                        found,
                        span: self.peek_span().into(),
                    });
                }
                Some(tok) => {
                    let token = match tok {
                        Token::Word => self.slice(self.peek_span()).to_string(),
                        other => other.to_string(),
                    };
                    return Err(ParseError::InvalidNumeric {
                        field: field.name,
                        token,
                        span: self.peek_span().into(),
                    });
                }
                None if found > 0 => {
                    return Err(ParseError::ArityMismatch {
                        field: field.name,
                        expected: N,
                        found,
                        span: self.last_span().into(),
                    });
                }
                None => {
                    return Err(ParseError::UnexpectedEol {
                        expected: format!("a number for `{}`", field.name),
                    });
                }
            }
        }
        Ok(out)
    }

    fn parse_points(&mut self, field: &Field, min: usize) -> ParseResult<FieldValue> {
        let mut raw = Vec::new();
        while let Some(Token::Number(n)) = self.peek() {
            raw.push(*n);
            self.advance();
        }
        if raw.len() % 3 != 0 {
            return Err(ParseError::ArityMismatch {
                field: field.name,
                expected: raw.len() + 3 - raw.len() % 3,
                found: raw.len(),
                span: self.last_span().into(),
            });
        }
        if raw.len() < min * 3 {
            return Err(ParseError::ArityMismatch {
                field: field.name,
                expected: min * 3,
                found: raw.len(),
                span: self.last_span().into(),
            });
        }
        let points = raw.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();
        Ok(FieldValue::Points(points))
    }

    /// Trailing `WITH MATERIAL CATEGORY.PRESET`. Attaches to the innermost
    /// command that just finished parsing; when a command's final field is
    /// itself a sub-command (a sweep's `PATH`), a trailing material
    /// therefore belongs to that sub-command and the outer command cannot
    /// carry one textually.
    fn parse_material_suffix(&mut self, command: &mut Command) -> ParseResult<()> {
        if !self.at_keyword("WITH") {
            return Ok(());
        }
        self.advance();
        self.expect_keyword("MATERIAL")?;
        let (text, span) = self.expect_word()?;
        let mut parts = text.splitn(2, '.');
        match (parts.next(), parts.next()) {
            (Some(category), Some(preset)) if !category.is_empty() && !preset.is_empty() => {
                command.material = Some(MaterialRef {
                    category: category.to_uppercase(),
                    preset: preset.to_uppercase(),
                });
                Ok(())
            }
            _ => Err(ParseError::InvalidMaterial {
                token: text,
                span: span.into(),
            }),
        }
    }
}

/// Assemble a typed ACT node from the generically parsed field values.
/// The match arms mirror the grammar table rows one for one.
fn build_kind(schema: &CommandSchema, values: Vec<FieldValue>) -> CommandKind {
    use FieldValue as V;
    let mut it = values.into_iter();
    let mut next = || it.next().expect("schema and builder agree on field count");
    match schema.name {
        "BOX" => match (next(), next(), next()) {
            (V::Vec3(origin), V::Vec2(size), V::Scalar(height)) => CommandKind::Box {
                origin,
                size,
                height,
            },
            _ => unreachable!("BOX fields"),
        },
        "ARC" => match (next(), next(), next(), next()) {
            (V::Vec3(center), V::Vec3(start), V::Vec3(normal), V::Scalar(angle)) => {
                CommandKind::Arc {
                    center,
                    start,
                    normal,
                    angle,
                }
            }
            _ => unreachable!("ARC fields"),
        },
        "CIRCLE" => match (next(), next(), next()) {
            (V::Vec3(center), V::Scalar(radius), V::Vec3(normal)) => CommandKind::Circle {
                center,
                radius,
                normal,
            },
            _ => unreachable!("CIRCLE fields"),
        },
        "LINE" => match (next(), next()) {
            (V::Vec3(from), V::Vec3(to)) => CommandKind::Line { from, to },
            _ => unreachable!("LINE fields"),
        },
        "POLYGON" => match next() {
            V::Points(points) => CommandKind::Polygon { points },
            _ => unreachable!("POLYGON fields"),
        },
        "RECTANGLE" => match (next(), next()) {
            (V::Vec3(origin), V::Vec2(size)) => CommandKind::Rectangle { origin, size },
            _ => unreachable!("RECTANGLE fields"),
        },
        "FOLDER" => match next() {
            V::Text(name) => CommandKind::Folder { name },
            _ => unreachable!("FOLDER fields"),
        },
        "PRISM" => match (next(), next()) {
            (V::Sub(section), V::Scalar(length)) => CommandKind::Prism {
                section: Box::new(section),
                length,
            },
            _ => unreachable!("PRISM fields"),
        },
        "REVOLVE" => match (next(), next(), next(), next()) {
            (V::Sub(profile), V::Vec3(axis_origin), V::Vec3(axis_direction), V::Scalar(angle)) => {
                CommandKind::Revolve {
                    profile: Box::new(profile),
                    axis_origin,
                    axis_direction,
                    angle,
                }
            }
            _ => unreachable!("REVOLVE fields"),
        },
        "SWEEP" => match (next(), next()) {
            (V::Sub(profile), V::Sub(path)) => CommandKind::Sweep {
                profile: Box::new(profile),
                path: Box::new(path),
            },
            _ => unreachable!("SWEEP fields"),
        },
        "BEZIER" => match next() {
            V::Points(points) => CommandKind::Bezier { points },
            _ => unreachable!("BEZIER fields"),
        },
        "BOOLEAN CUT" | "BOOLEAN COMMON" | "BOOLEAN FUSE" => {
            let op = match schema.noun[1] {
                "CUT" => BooleanKind::Cut,
                "COMMON" => BooleanKind::Common,
                _ => BooleanKind::Fuse,
            };
            match (next(), next()) {
                (V::Sub(first), V::Sub(second)) => CommandKind::Boolean {
                    op,
                    first: Box::new(first),
                    second: Box::new(second),
                },
                _ => unreachable!("BOOLEAN fields"),
            }
        }
        "FACE WIRE" => match next() {
            V::Sub(wire) => CommandKind::FaceFromWire {
                wire: Box::new(wire),
            },
            _ => unreachable!("FACE WIRE fields"),
        },
        "FACE EDGES" => match next() {
            V::SubList(edges) => CommandKind::FaceFromEdges { edges },
            _ => unreachable!("FACE EDGES fields"),
        },
        "WIRE" => match next() {
            V::SubList(edges) => CommandKind::Wire { edges },
            _ => unreachable!("WIRE fields"),
        },
        "THICKSOLID" => match (next(), next()) {
            (V::Sub(base), V::Scalar(thickness)) => CommandKind::ThickSolid {
                base: Box::new(base),
                thickness,
            },
            _ => unreachable!("THICKSOLID fields"),
        },
        other => unreachable!("no builder for schema {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(line: &str) -> Command {
        let mut env = Environment::new();
        parse_line(line, &mut env).unwrap_or_else(|e| panic!("parse error for `{line}`: {e}"))
    }

    fn parse_err(line: &str) -> ParseError {
        let mut env = Environment::new();
        parse_line(line, &mut env).unwrap_err()
    }

    #[test]
    fn test_box() {
        let cmd = parse_ok("CREATE BOX ORIGIN 0 0 0 SIZE 100 50 HEIGHT 75");
        match cmd.kind {
            CommandKind::Box {
                origin,
                size,
                height,
            } => {
                assert_eq!(origin, [0.0, 0.0, 0.0]);
                assert_eq!(size, [100.0, 50.0]);
                assert!((height - 75.0).abs() < f64::EPSILON);
            }
            other => panic!("expected box, got {other:?}"),
        }
    }

    #[test]
    fn test_case_insensitive_keywords() {
        let cmd = parse_ok("create box origin 0 0 0 size 10 10 height 5");
        assert!(matches!(cmd.kind, CommandKind::Box { .. }));
    }

    #[test]
    fn test_negative_components() {
        let cmd = parse_ok("CREATE LINE FROM 0 0 0 TO 0 0 -1");
        match cmd.kind {
            CommandKind::Line { to, .. } => assert_eq!(to, [0.0, 0.0, -1.0]),
            other => panic!("expected line, got {other:?}"),
        }
    }

    #[test]
    fn test_nested_boolean() {
        let cmd = parse_ok(
            "CREATE BOOLEAN CUT \
             FIRST CREATE BOX ORIGIN 0 0 0 SIZE 100 100 HEIGHT 50 \
             SECOND CREATE BOX ORIGIN 25 25 0 SIZE 50 50 HEIGHT 75",
        );
        match cmd.kind {
            CommandKind::Boolean { op, first, second } => {
                assert_eq!(op, BooleanKind::Cut);
                assert!(matches!(first.kind, CommandKind::Box { .. }));
                assert!(matches!(second.kind, CommandKind::Box { .. }));
            }
            other => panic!("expected boolean, got {other:?}"),
        }
    }

    #[test]
    fn test_depth_aware_terminator() {
        // LENGTH must bind to the outer PRISM, not leak into the CIRCLE.
        let cmd =
            parse_ok("CREATE PRISM SECTION CREATE CIRCLE CENTER 0 0 0 RADIUS 50 NORMAL 0 0 1 LENGTH 100");
        match cmd.kind {
            CommandKind::Prism { section, length } => {
                assert!((length - 100.0).abs() < f64::EPSILON);
                assert!(matches!(section.kind, CommandKind::Circle { .. }));
            }
            other => panic!("expected prism, got {other:?}"),
        }
    }

    #[test]
    fn test_doubly_nested_subcommand() {
        let cmd = parse_ok(
            "CREATE THICKSOLID \
             CREATE PRISM SECTION CREATE RECTANGLE ORIGIN 0 0 0 SIZE 20 10 LENGTH 40 \
             THICKNESS 2",
        );
        match cmd.kind {
            CommandKind::ThickSolid { base, thickness } => {
                assert!((thickness - 2.0).abs() < f64::EPSILON);
                match base.kind {
                    CommandKind::Prism { section, .. } => {
                        assert!(matches!(section.kind, CommandKind::Rectangle { .. }));
                    }
                    other => panic!("expected prism base, got {other:?}"),
                }
            }
            other => panic!("expected thicksolid, got {other:?}"),
        }
    }

    #[test]
    fn test_wire_edge_list() {
        let cmd = parse_ok(
            "CREATE WIRE EDGES CREATE LINE FROM 0 0 0 TO 1 0 0 \
             AND CREATE LINE FROM 1 0 0 TO 1 1 0 \
             AND CREATE ARC CENTER 0 0 0 START 1 1 0 NORMAL 0 0 1 ANGLE 90",
        );
        match cmd.kind {
            CommandKind::Wire { edges } => {
                assert_eq!(edges.len(), 3);
                assert!(matches!(edges[2].kind, CommandKind::Arc { .. }));
            }
            other => panic!("expected wire, got {other:?}"),
        }
    }

    #[test]
    fn test_face_variants() {
        let wire = parse_ok("CREATE FACE WIRE CREATE CIRCLE CENTER 0 0 0 RADIUS 5 NORMAL 0 0 1");
        assert!(matches!(wire.kind, CommandKind::FaceFromWire { .. }));
        let edges = parse_ok("CREATE FACE EDGES CREATE LINE FROM 0 0 0 TO 1 0 0");
        assert!(matches!(
            edges.kind,
            CommandKind::FaceFromEdges { ref edges } if edges.len() == 1
        ));
    }

    #[test]
    fn test_polygon_point_count() {
        let cmd = parse_ok("CREATE POLYGON POINTS 0 0 0 10 0 0 10 10 0 0 10 0");
        assert!(matches!(
            cmd.kind,
            CommandKind::Polygon { ref points } if points.len() == 4
        ));
        let err = parse_err("CREATE POLYGON POINTS 0 0 0 10 0 0");
        assert!(matches!(
            err,
            ParseError::ArityMismatch {
                field: "POINTS",
                expected: 9,
                found: 6,
                ..
            }
        ));
    }

    #[test]
    fn test_folder_name_optional() {
        let bare = parse_ok("CREATE FOLDER");
        assert!(matches!(bare.kind, CommandKind::Folder { name: None }));
        let named = parse_ok("CREATE FOLDER NAME brackets");
        assert!(matches!(
            named.kind,
            CommandKind::Folder { name: Some(ref n) } if n == "brackets"
        ));
    }

    #[test]
    fn test_assignment_binds_and_passes_through() {
        let mut env = Environment::new();
        let cmd = parse_line(
            "profile = CREATE CIRCLE CENTER 0 0 0 RADIUS 10 NORMAL 0 0 1",
            &mut env,
        )
        .unwrap();
        assert!(matches!(cmd.kind, CommandKind::Assignment { ref name, .. } if name == "profile"));
        assert!(env.is_bound("profile"));
        assert_eq!(
            env.binding("profile").unwrap().source,
            "CREATE CIRCLE CENTER 0 0 0 RADIUS 10 NORMAL 0 0 1"
        );
    }

    #[test]
    fn test_variable_splice() {
        let mut env = Environment::new();
        parse_line(
            "a = CREATE CIRCLE CENTER 0 0 0 RADIUS 10 NORMAL 0 0 1",
            &mut env,
        )
        .unwrap();
        let cmd = parse_line("CREATE PRISM SECTION $a LENGTH 5", &mut env).unwrap();
        match cmd.kind {
            CommandKind::Prism { section, .. } => match section.kind {
                CommandKind::VarRef { name, body } => {
                    assert_eq!(name, "a");
                    assert!(matches!(body.kind, CommandKind::Circle { .. }));
                }
                other => panic!("expected var ref, got {other:?}"),
            },
            other => panic!("expected prism, got {other:?}"),
        }
    }

    #[test]
    fn test_variable_chain() {
        let mut env = Environment::new();
        parse_line("a = CREATE LINE FROM 0 0 0 TO 1 0 0", &mut env).unwrap();
        parse_line("w = CREATE WIRE EDGES $a AND $a", &mut env).unwrap();
        let cmd = parse_line("CREATE FACE WIRE $w", &mut env).unwrap();
        let face = cmd.unwrapped();
        assert!(matches!(face.kind, CommandKind::FaceFromWire { .. }));
    }

    #[test]
    fn test_unknown_variable() {
        let err = parse_err("CREATE PRISM SECTION $ghost LENGTH 5");
        assert!(matches!(err, ParseError::UnknownVariable { ref name, .. } if name == "ghost"));
    }

    #[test]
    fn test_unknown_command() {
        let err = parse_err("CREATE CYLINDER RADIUS 50 HEIGHT 100");
        match err {
            ParseError::UnknownCommand { verb, noun, .. } => {
                assert_eq!(verb, "CREATE");
                assert_eq!(noun, "CYLINDER");
            }
            other => panic!("expected unknown command, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_keyword() {
        let err = parse_err("CREATE BOX CENTER 0 0 0 SIZE 1 1 HEIGHT 1");
        assert!(matches!(
            err,
            ParseError::MissingKeyword { ref expected, ref found, .. }
                if expected == "ORIGIN" && found == "CENTER"
        ));
    }

    #[test]
    fn test_arity_mismatch() {
        let err = parse_err("CREATE BOX ORIGIN 0 0 SIZE 1 1 HEIGHT 1");
        assert!(matches!(
            err,
            ParseError::ArityMismatch {
                field: "ORIGIN",
                expected: 3,
                found: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_numeric() {
        let err = parse_err("CREATE CIRCLE CENTER 0 0 0 RADIUS wide NORMAL 0 0 1");
        assert!(matches!(
            err,
            ParseError::InvalidNumeric { field: "RADIUS", ref token, .. } if token == "wide"
        ));
    }

    #[test]
    fn test_unterminated_subcommand() {
        let err = parse_err("CREATE PRISM SECTION");
        assert!(matches!(
            err,
            ParseError::UnterminatedSubCommand {
                field: "SECTION",
                ..
            }
        ));
    }

    #[test]
    fn test_trailing_tokens() {
        let err = parse_err("CREATE FOLDER NAME a b");
        assert!(matches!(err, ParseError::TrailingTokens { .. }));
    }

    #[test]
    fn test_material_suffix() {
        let cmd = parse_ok("CREATE BOX ORIGIN 0 0 0 SIZE 10 10 HEIGHT 10 WITH MATERIAL METALS.POLISHED_STEEL");
        let material = cmd.material.unwrap();
        assert_eq!(material.category, "METALS");
        assert_eq!(material.preset, "POLISHED_STEEL");
    }

    #[test]
    fn test_material_attaches_to_innermost() {
        let cmd = parse_ok(
            "CREATE PRISM SECTION CREATE CIRCLE CENTER 0 0 0 RADIUS 5 NORMAL 0 0 1 \
             WITH MATERIAL WOODS.OAK LENGTH 10",
        );
        match cmd.kind {
            CommandKind::Prism { section, .. } => {
                assert!(section.material.is_some());
            }
            other => panic!("expected prism, got {other:?}"),
        }
        assert!(cmd.material.is_none());
    }

    #[test]
    fn test_malformed_material() {
        let err = parse_err("CREATE FOLDER WITH MATERIAL METALS");
        assert!(matches!(err, ParseError::InvalidMaterial { .. }));
    }

    #[test]
    fn test_lex_error_surfaces_as_parse_error() {
        let err = parse_err("CREATE BOX ORIGIN 1e+ 0 0 SIZE 1 1 HEIGHT 1");
        assert!(matches!(err, ParseError::Lex(_)));
    }
}
