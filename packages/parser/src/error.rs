use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Error, Debug, Clone)]
pub enum ParseError {
    #[error("Unexpected token at byte {pos}: expected {expected}, found {found}")]
    UnexpectedToken {
        pos: usize,
        expected: String,
        found: String,
    },

    #[error("Unexpected end of file at byte {pos}")]
    UnexpectedEof { pos: usize },

    #[error("Mismatched closing tag at byte {pos}: opened <{opened}>, closed </{closed}>")]
    MismatchedClosingTag {
        pos: usize,
        opened: String,
        closed: String,
    },

    #[error("Unterminated expression starting at byte {pos}")]
    UnterminatedExpression { pos: usize },
}

impl ParseError {
    pub fn unexpected_token(
        pos: usize,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::UnexpectedToken {
            pos,
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn unexpected_eof(pos: usize) -> Self {
        Self::UnexpectedEof { pos }
    }
}
