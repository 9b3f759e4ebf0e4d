/// Lexer for command-DSL lines.
///
/// Wraps the `logos`-generated tokenizer and yields `(Token, Span)` pairs.
/// Splitting is purely whitespace-based; classifying a `Word` as keyword or
/// identifier is the parser's job.
use crate::error::LexError;
use crate::span::Span;
use crate::token::Token;
use logos::Logos;

/// A spanned token: the token itself plus its byte range in the line.
pub type SpannedToken = (Token, Span);

/// Tokenize one program line.
///
/// # Errors
/// Returns a `LexError` for a malformed numeric literal or any byte
/// sequence that is not part of the DSL vocabulary.
pub fn lex(line: &str) -> Result<Vec<SpannedToken>, LexError> {
    let lexer = Token::lexer(line);
    let mut tokens = Vec::new();
    for (result, range) in lexer.spanned() {
        let span = Span::from(range);
        match result {
            Ok(tok) => tokens.push((tok, span)),
            Err(()) => {
                let slice = &line[span.start..span.end];
                let first = slice.chars().next().unwrap_or(' ');
                if first.is_ascii_digit() || first == '.' || first == '+' || first == '-' {
                    return Err(LexError::InvalidNumber {
                        token: slice.to_string(),
                        span: span.into(),
                    });
                }
                return Err(LexError::InvalidToken {
                    token: slice.to_string(),
                    span: span.into(),
                });
            }
        }
    }
    Ok(tokens)
}
