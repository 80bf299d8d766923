use logos::Logos;

/// Token types for the markup dialect.
///
/// The lexer is deliberately fine-grained: outside of tags most tokens are
/// reassembled into verbatim text runs by the parser (using their byte
/// spans), so only the structural tokens (`<`, `</`, `{`, comments) decide
/// where a text run ends. Whitespace is a token, never skipped - in child
/// position it is text and must survive printing byte-for-byte.
#[derive(Logos, Debug, Clone, PartialEq)]
pub enum Token<'src> {
    // Comments are matched whole so their content can contain any
    // structural characters.
    #[regex(r"<!--([^-]|-[^-]|--[^>])*-->")]
    Comment,

    #[token("</")]
    CloseTagOpen,

    #[token("<")]
    TagOpen,

    #[token("/>")]
    SelfClose,

    #[token(">")]
    TagClose,

    #[token("=")]
    Equals,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("/")]
    Slash,

    // Tag and attribute names. Dots/colons/dashes cover member expressions
    // (Foo.Bar), namespaced attributes and aria-/data- names.
    #[regex(r"[A-Za-z_][A-Za-z0-9_.:-]*", |lex| lex.slice(), priority = 3)]
    Ident(&'src str),

    // Quoted attribute values. `<` and `{` are excluded so a stray quote in
    // text can never swallow structure; values needing them use expressions.
    #[regex(r#""[^"<{]*""#, |lex| lex.slice())]
    #[regex(r"'[^'<{]*'", |lex| lex.slice())]
    String(&'src str),

    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    // Any other run of characters; text content between tags.
    #[regex(r"[^<>{}=/'\x22 \t\r\n]+", priority = 1)]
    Word,

    // Stray quote characters that did not open a string.
    #[regex(r#"['\x22]"#)]
    Quote,
}

/// Tokenize source into `(token, byte_range)` pairs.
///
/// Lexing never fails: every byte of input is covered by some token, so the
/// parser can always reconstruct verbatim slices from spans.
pub fn tokenize(source: &str) -> Vec<(Token<'_>, std::ops::Range<usize>)> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(source);
    while let Some(result) = lexer.next() {
        match result {
            Ok(token) => tokens.push((token, lexer.span())),
            // Unrecognized bytes (non-ASCII punctuation etc.) become text.
            Err(()) => tokens.push((Token::Word, lexer.span())),
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_simple_element() {
        let tokens = tokenize("<div>");
        assert_eq!(tokens[0].0, Token::TagOpen);
        assert_eq!(tokens[1].0, Token::Ident("div"));
        assert_eq!(tokens[2].0, Token::TagClose);
    }

    #[test]
    fn test_tokenize_self_closing() {
        let tokens = tokenize("<br/>");
        assert_eq!(tokens[0].0, Token::TagOpen);
        assert_eq!(tokens[1].0, Token::Ident("br"));
        assert_eq!(tokens[2].0, Token::SelfClose);
    }

    #[test]
    fn test_whitespace_is_a_token() {
        let tokens = tokenize("a  b");
        assert_eq!(tokens[0].0, Token::Word);
        assert_eq!(tokens[1].0, Token::Whitespace);
        assert_eq!(tokens[2].0, Token::Word);
    }

    #[test]
    fn test_comment_swallows_structural_chars() {
        let tokens = tokenize("<!-- <div> {x} -->");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].0, Token::Comment);
    }

    #[test]
    fn test_string_never_swallows_tag_open() {
        // A stray apostrophe in text must not absorb the following element.
        let tokens = tokenize("it's here <b>");
        assert!(tokens.iter().any(|(t, _)| *t == Token::TagOpen));
    }

    #[test]
    fn test_spans_cover_all_input() {
        let source = "<div class=\"a\">text {expr} <!-- c --></div>";
        let tokens = tokenize(source);
        let mut end = 0;
        for (_, span) in &tokens {
            assert_eq!(span.start, end);
            end = span.end;
        }
        assert_eq!(end, source.len());
    }
}
