use crate::ast::*;
use crate::error::{ParseError, ParseResult};
use crate::tokenizer::{tokenize, Token};
use std::ops::Range;

/// Parse source text into a markup tree.
pub fn parse(source: &str) -> ParseResult<Document> {
    Parser::new(source).parse_document()
}

/// Recursive-descent parser over the token vector.
pub struct Parser<'src> {
    source: &'src str,
    tokens: Vec<(Token<'src>, Range<usize>)>,
    pos: usize,
    line_starts: Vec<usize>,
}

/// What terminates the current child list. The closing tag's name is
/// checked by the element parser after the child list ends.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ChildTerminator {
    Eof,
    Fragment,
    Tag,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self {
            source,
            tokens: tokenize(source),
            pos: 0,
            line_starts,
        }
    }

    pub fn parse_document(&mut self) -> ParseResult<Document> {
        let children = self.parse_children(ChildTerminator::Eof)?;
        Ok(Document { children })
    }

    fn parse_children(&mut self, terminator: ChildTerminator) -> ParseResult<Vec<Node>> {
        let mut children = Vec::new();

        loop {
            match self.peek() {
                None => {
                    if terminator == ChildTerminator::Eof {
                        break;
                    }
                    return Err(ParseError::unexpected_eof(self.source.len()));
                }
                Some((Token::CloseTagOpen, _)) => {
                    // Consumed by the enclosing element/fragment parser.
                    if terminator == ChildTerminator::Eof {
                        return Err(ParseError::unexpected_token(
                            self.current_offset(),
                            "child node",
                            "closing tag",
                        ));
                    }
                    break;
                }
                Some((Token::Comment, span)) => {
                    let span = span.clone();
                    self.advance();
                    let content = self.source[span.start + 4..span.end - 3].to_string();
                    children.push(Node::Comment(CommentNode {
                        content,
                        span: self.make_span(span.start, span.end),
                    }));
                }
                Some((Token::TagOpen, _)) => {
                    children.push(self.parse_element_or_fragment()?);
                }
                Some((Token::LBrace, _)) => {
                    children.push(self.parse_expression()?);
                }
                _ => {
                    children.push(self.parse_text()?);
                }
            }
        }

        Ok(children)
    }

    /// Accumulate a verbatim text run up to the next structural token.
    fn parse_text(&mut self) -> ParseResult<Node> {
        let start = self.current_offset();
        let mut end = start;

        while let Some((token, span)) = self.peek() {
            match token {
                Token::TagOpen | Token::CloseTagOpen | Token::LBrace | Token::Comment => break,
                _ => {
                    end = span.end;
                    self.advance();
                }
            }
        }

        Ok(Node::Text(TextNode {
            content: self.source[start..end].to_string(),
            span: self.make_span(start, end),
        }))
    }

    fn parse_element_or_fragment(&mut self) -> ParseResult<Node> {
        let start = self.current_offset();
        self.expect(Token::TagOpen)?;

        match self.peek() {
            Some((Token::TagClose, _)) => {
                // `<>` opens a fragment.
                self.advance();
                let children = self.parse_children(ChildTerminator::Fragment)?;
                self.expect(Token::CloseTagOpen)?;
                self.skip_whitespace();
                self.expect(Token::TagClose)?;
                let end = self.previous_end();
                Ok(Node::Fragment(FragmentNode {
                    children,
                    span: self.make_span(start, end),
                }))
            }
            Some((Token::Ident(name), _)) => {
                let tag_name = name.to_string();
                self.advance();
                self.parse_element_rest(tag_name, start)
            }
            Some((token, span)) => Err(ParseError::unexpected_token(
                span.start,
                "tag name or '>'",
                format!("{:?}", token),
            )),
            None => Err(ParseError::unexpected_eof(self.source.len())),
        }
    }

    fn parse_element_rest(&mut self, tag_name: String, start: usize) -> ParseResult<Node> {
        let attributes = self.parse_attributes()?;

        match self.peek() {
            Some((Token::SelfClose, _)) => {
                self.advance();
                let end = self.previous_end();
                Ok(Node::Element(ElementNode {
                    tag_name,
                    attributes,
                    children: Vec::new(),
                    self_closing: true,
                    span: self.make_span(start, end),
                }))
            }
            Some((Token::TagClose, _)) => {
                self.advance();
                let children = self.parse_children(ChildTerminator::Tag)?;

                let close_pos = self.current_offset();
                self.expect(Token::CloseTagOpen)?;
                let closed = self.expect_ident()?;
                if closed != tag_name {
                    return Err(ParseError::MismatchedClosingTag {
                        pos: close_pos,
                        opened: tag_name,
                        closed,
                    });
                }
                self.skip_whitespace();
                self.expect(Token::TagClose)?;
                let end = self.previous_end();

                Ok(Node::Element(ElementNode {
                    tag_name,
                    attributes,
                    children,
                    self_closing: false,
                    span: self.make_span(start, end),
                }))
            }
            Some((token, span)) => Err(ParseError::unexpected_token(
                span.start,
                "'>' or '/>'",
                format!("{:?}", token),
            )),
            None => Err(ParseError::unexpected_eof(self.source.len())),
        }
    }

    fn parse_attributes(&mut self) -> ParseResult<Vec<Attribute>> {
        let mut attributes = Vec::new();

        loop {
            self.skip_whitespace();
            match self.peek() {
                Some((Token::Ident(name), _)) => {
                    let name = name.to_string();
                    self.advance();
                    self.skip_whitespace();

                    let value = if self.check(&Token::Equals) {
                        self.advance();
                        self.skip_whitespace();
                        Some(self.parse_attribute_value()?)
                    } else {
                        None
                    };

                    attributes.push(Attribute { name, value });
                }
                _ => break,
            }
        }

        Ok(attributes)
    }

    fn parse_attribute_value(&mut self) -> ParseResult<AttributeValue> {
        match self.peek() {
            Some((Token::String(raw), _)) => {
                let literal = raw[1..raw.len() - 1].to_string();
                self.advance();
                Ok(AttributeValue::Literal(literal))
            }
            Some((Token::LBrace, _)) => {
                let (content, _range) = self.capture_balanced_braces()?;
                Ok(AttributeValue::Expression(content))
            }
            Some((token, span)) => Err(ParseError::unexpected_token(
                span.start,
                "string or expression",
                format!("{:?}", token),
            )),
            None => Err(ParseError::unexpected_eof(self.source.len())),
        }
    }

    fn parse_expression(&mut self) -> ParseResult<Node> {
        let start = self.current_offset();
        let (content, range) = self.capture_balanced_braces()?;
        Ok(Node::Expression(ExpressionNode {
            content,
            span: self.make_span(start, range.end),
        }))
    }

    /// Consume `{ ... }` with balanced braces, returning the verbatim inner
    /// content and the full byte range including the braces.
    fn capture_balanced_braces(&mut self) -> ParseResult<(String, Range<usize>)> {
        let open = match self.peek() {
            Some((Token::LBrace, span)) => span.clone(),
            _ => {
                return Err(ParseError::unexpected_token(
                    self.current_offset(),
                    "'{'",
                    "other token",
                ))
            }
        };
        self.advance();

        let mut depth = 1usize;
        while let Some((token, span)) = self.peek() {
            let span = span.clone();
            match token {
                Token::LBrace => depth += 1,
                Token::RBrace => {
                    depth -= 1;
                    if depth == 0 {
                        self.advance();
                        let content = self.source[open.end..span.start].to_string();
                        return Ok((content, open.start..span.end));
                    }
                }
                _ => {}
            }
            self.advance();
        }

        Err(ParseError::UnterminatedExpression { pos: open.start })
    }

    // Token plumbing

    fn peek(&self) -> Option<&(Token<'src>, Range<usize>)> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn check(&self, expected: &Token) -> bool {
        matches!(self.peek(), Some((token, _)) if token == expected)
    }

    fn expect(&mut self, expected: Token) -> ParseResult<()> {
        match self.peek() {
            Some((token, _)) if *token == expected => {
                self.advance();
                Ok(())
            }
            Some((token, span)) => Err(ParseError::unexpected_token(
                span.start,
                format!("{:?}", expected),
                format!("{:?}", token),
            )),
            None => Err(ParseError::unexpected_eof(self.source.len())),
        }
    }

    fn expect_ident(&mut self) -> ParseResult<String> {
        match self.peek() {
            Some((Token::Ident(name), _)) => {
                let name = name.to_string();
                self.advance();
                Ok(name)
            }
            Some((token, span)) => Err(ParseError::unexpected_token(
                span.start,
                "identifier",
                format!("{:?}", token),
            )),
            None => Err(ParseError::unexpected_eof(self.source.len())),
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some((Token::Whitespace, _))) {
            self.advance();
        }
    }

    fn current_offset(&self) -> usize {
        self.peek()
            .map(|(_, span)| span.start)
            .unwrap_or(self.source.len())
    }

    fn previous_end(&self) -> usize {
        if self.pos == 0 {
            0
        } else {
            self.tokens[self.pos - 1].1.end
        }
    }

    fn make_span(&self, start: usize, end: usize) -> Span {
        let line_idx = self
            .line_starts
            .partition_point(|&line_start| line_start <= start)
            - 1;
        let column = (start - self.line_starts[line_idx]) as u32;
        Span::new(start, end, line_idx as u32 + 1, column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_element(doc: &Document) -> &ElementNode {
        doc.children
            .iter()
            .find_map(|n| match n {
                Node::Element(e) => Some(e),
                _ => None,
            })
            .expect("no element")
    }

    #[test]
    fn test_parse_nested_elements() {
        let doc = parse("<div><span>hi</span></div>").unwrap();
        let div = first_element(&doc);
        assert_eq!(div.tag_name, "div");
        assert_eq!(div.children.len(), 1);
        match &div.children[0] {
            Node::Element(span) => {
                assert_eq!(span.tag_name, "span");
                assert_eq!(span.children.len(), 1);
            }
            other => panic!("expected element, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_attributes() {
        let doc = parse(r#"<img src="a.png" width={size} hidden/>"#).unwrap();
        let img = first_element(&doc);
        assert!(img.self_closing);
        assert_eq!(img.attributes.len(), 3);
        assert_eq!(
            img.attributes[0].value,
            Some(AttributeValue::Literal("a.png".into()))
        );
        assert_eq!(
            img.attributes[1].value,
            Some(AttributeValue::Expression("size".into()))
        );
        assert_eq!(img.attributes[2].value, None);
    }

    #[test]
    fn test_parse_preserves_whitespace_text() {
        let doc = parse("<div>\n  <p>a</p>\n</div>").unwrap();
        let div = first_element(&doc);
        assert_eq!(div.children.len(), 3);
        match &div.children[0] {
            Node::Text(t) => assert_eq!(t.content, "\n  "),
            other => panic!("expected text, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_fragment() {
        let doc = parse("<><p>a</p><p>b</p></>").unwrap();
        match &doc.children[0] {
            Node::Fragment(f) => assert_eq!(f.children.len(), 2),
            other => panic!("expected fragment, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_expression_with_nested_braces() {
        let doc = parse("<div>{items.map(i => { return i })}</div>").unwrap();
        let div = first_element(&doc);
        match &div.children[0] {
            Node::Expression(e) => assert_eq!(e.content, "items.map(i => { return i })"),
            other => panic!("expected expression, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_comment() {
        let doc = parse("<div><!-- note --></div>").unwrap();
        let div = first_element(&doc);
        match &div.children[0] {
            Node::Comment(c) => assert_eq!(c.content, " note "),
            other => panic!("expected comment, got {:?}", other),
        }
    }

    #[test]
    fn test_spans_track_line_and_column() {
        let doc = parse("<div>\n  <p>a</p>\n</div>").unwrap();
        let div = first_element(&doc);
        assert_eq!(div.span.line, 1);
        assert_eq!(div.span.column, 0);
        match &div.children[1] {
            Node::Element(p) => {
                assert_eq!(p.span.line, 2);
                assert_eq!(p.span.column, 2);
            }
            other => panic!("expected element, got {:?}", other),
        }
    }

    #[test]
    fn test_mismatched_closing_tag_fails() {
        let result = parse("<div><span>x</div></span>");
        assert!(matches!(
            result,
            Err(ParseError::MismatchedClosingTag { .. })
        ));
    }

    #[test]
    fn test_unterminated_expression_fails() {
        let result = parse("<div>{oops</div>");
        assert!(result.is_err());
    }
}
