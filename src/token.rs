/// Token types for the command-DSL lexer.
///
/// The DSL is whitespace-delimited; almost everything is a bare `Word`
/// (keyword or identifier, classified later by the parser, since keyword
/// recognition is case-insensitive and position-dependent). The lexer knows
/// nothing about nesting — a sub-command's extent is a parser concern.
use logos::Logos;

fn parse_number(lex: &mut logos::Lexer<'_, Token>) -> Result<f64, ()> {
    lex.slice().parse().map_err(|_| ())
}

fn parse_variable(lex: &mut logos::Lexer<'_, Token>) -> String {
    // Strip the `$` sigil
    lex.slice()[1..].to_string()
}

fn digit_led_word(_lex: &mut logos::Lexer<'_, Token>) -> Result<(), ()> {
    Err(())
}

/// All tokens of the command DSL.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\x0c]+")]
#[logos(skip r"//[^\n]*")]
pub enum Token {
    /// Numeric literal. Signs are part of the token — the DSL has no
    /// arithmetic, so `-` can only introduce a negative number.
    #[regex(r"[+-]?[0-9]+\.?[0-9]*([eE][+-]?[0-9]+)?", parse_number)]
    #[regex(r"[+-]?\.[0-9]+([eE][+-]?[0-9]+)?", parse_number)]
    Number(f64),

    /// `$name` variable reference.
    #[regex(r"\$[A-Za-z_][A-Za-z0-9_]*", parse_variable)]
    Variable(String),

    /// `=` in an assignment line.
    #[token("=")]
    Equals,

    /// Keyword, identifier, or dotted material spec (`METALS.POLISHED_STEEL`).
    /// A digit-led word (`10abc`) is matched here with lower priority than
    /// `Number` so the lexer reports it instead of splitting it in two.
    #[regex(r"[A-Za-z_][A-Za-z0-9_.]*")]
    #[regex(r"[0-9]+[A-Za-z_][A-Za-z0-9_.]*", digit_led_word, priority = 3)]
    Word,
}

impl Token {
    #[must_use]
    pub const fn is_word(&self) -> bool {
        matches!(self, Self::Word)
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Variable(name) => write!(f, "${name}"),
            Self::Equals => write!(f, "="),
            Self::Word => write!(f, "word"),
        }
    }
}
