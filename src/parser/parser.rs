use crate::parser::ast::*;
use crate::parser::lexer::{Lexer, Token};
use thiserror::Error;
use tracing::{debug, trace, warn};

/// Parser error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A block keyword needed another token but the input ended
    #[error("Parse error at {location}: expected iteration count after '{keyword}', found end of input")]
    UnexpectedEndOfInput {
        keyword: Keyword,
        location: SourceLocation,
    },
}

/// Parse `source` into an [`Ast`]
pub fn parse(source: &str) -> Result<Ast, ParseError> {
    Parser::new(source).parse()
}

/// A block that has been opened but not yet closed.
///
/// Each frame stands for one block-body invocation of a recursive descent
/// parser; the frame stack replaces the call stack so nesting depth is bounded
/// only by memory.
#[derive(Debug)]
enum Frame {
    Root {
        body: Vec<NodeId>,
    },
    Loop {
        node: NodeId,
        count: NodeId,
        body: Vec<NodeId>,
    },
    Forever {
        node: NodeId,
        body: Vec<NodeId>,
    },
}

impl Frame {
    fn body_mut(&mut self) -> &mut Vec<NodeId> {
        match self {
            Frame::Root { body } | Frame::Loop { body, .. } | Frame::Forever { body, .. } => body,
        }
    }
}

/// Block-structured parser for macro token streams
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    pub fn new(source: &str) -> Self {
        let mut lexer = Lexer::new(source);
        Self::from_tokens(lexer.tokenize())
    }

    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    /// Parse the token stream into a tree rooted at the `root` sentinel.
    ///
    /// The root level ends at end of input or at the first `end` it reaches
    /// itself; anything after a stray top-level `end` is left unparsed.
    pub fn parse(&mut self) -> Result<Ast, ParseError> {
        let mut ast = Ast::new();
        let mut stack = vec![Frame::Root { body: Vec::new() }];

        loop {
            let Some(token) = self.advance() else {
                // End of input closes every open block, innermost first
                while let Some(frame) = stack.pop() {
                    if let Some(body) = Self::close_frame(&mut ast, frame) {
                        ast.set_children(ast.root_id(), body);
                    }
                }
                break;
            };

            trace!(token = %token, depth = stack.len() - 1, "parse");

            match token.keyword() {
                None => {
                    let node = ast.alloc(AstNode::new(token.kind, token.value));
                    Self::current_body(&mut stack).push(node);
                }
                Some(Keyword::Loop) => {
                    let node = ast.alloc(AstNode::new(TokenKind::Keyword, token.value));
                    Self::current_body(&mut stack).push(node);
                    let count = self.parse_loop_count(&mut ast, token.location)?;
                    stack.push(Frame::Loop {
                        node,
                        count,
                        body: Vec::new(),
                    });
                }
                Some(Keyword::Forever) => {
                    let node = ast.alloc(AstNode::new(TokenKind::Keyword, token.value));
                    Self::current_body(&mut stack).push(node);
                    if !self.is_at_end() {
                        stack.push(Frame::Forever {
                            node,
                            body: Vec::new(),
                        });
                    }
                }
                Some(Keyword::End) => {
                    let Some(frame) = stack.pop() else {
                        unreachable!("root frame is never popped before returning")
                    };
                    if let Some(body) = self.end_frame(&mut ast, frame, &mut stack) {
                        warn!(
                            location = %token.location,
                            skipped = self.tokens.len() - self.position,
                            "'end' outside of any loop stops parsing"
                        );
                        ast.set_children(ast.root_id(), body);
                        break;
                    }
                }
            }
        }

        debug!(nodes = ast.len(), consumed = self.position, "parsed macro");
        Ok(ast)
    }

    /// Consume the token after `loop` as its iteration count node
    fn parse_loop_count(
        &mut self,
        ast: &mut Ast,
        location: SourceLocation,
    ) -> Result<NodeId, ParseError> {
        let count = self.advance().ok_or(ParseError::UnexpectedEndOfInput {
            keyword: Keyword::Loop,
            location,
        })?;

        if count.kind != TokenKind::Number {
            warn!(
                location = %count.location,
                found = %count,
                "loop count is not a number"
            );
        }

        Ok(ast.alloc(AstNode::new(count.kind, count.value)))
    }

    /// Handle an `end` token for the innermost frame.
    ///
    /// Returns the root body when the `end` closed the root level.
    fn end_frame(
        &mut self,
        ast: &mut Ast,
        frame: Frame,
        stack: &mut Vec<Frame>,
    ) -> Option<Vec<NodeId>> {
        match frame {
            Frame::Forever { node, body } if !self.is_at_end() => {
                // `end` only closes one pass over the forever body; the block
                // itself restarts and runs to end of input
                if !body.is_empty() {
                    warn!(
                        discarded = body.len(),
                        "'end' inside forever discards the statements before it"
                    );
                }
                stack.push(Frame::Forever {
                    node,
                    body: Vec::new(),
                });
                None
            }
            frame => Self::close_frame(ast, frame),
        }
    }

    /// Attach a finished block body to its keyword node.
    ///
    /// Returns the body of the root frame instead, since the root is attached
    /// by the caller.
    fn close_frame(ast: &mut Ast, frame: Frame) -> Option<Vec<NodeId>> {
        match frame {
            Frame::Root { body } => Some(body),
            Frame::Loop {
                node,
                count,
                mut body,
            } => {
                body.insert(0, count);
                ast.set_children(node, body);
                None
            }
            Frame::Forever { node, body } => {
                ast.set_children(node, body);
                None
            }
        }
    }

    // ===== Helper methods =====

    fn current_body(stack: &mut [Frame]) -> &mut Vec<NodeId> {
        match stack.last_mut() {
            Some(frame) => frame.body_mut(),
            None => unreachable!("frame stack always holds the root while parsing"),
        }
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned()?;
        self.position += 1;
        Some(token)
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.tokens.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(ast: &Ast, id: NodeId) -> Vec<(TokenKind, String)> {
        ast.children(id)
            .map(|n| (n.kind, n.value.clone()))
            .collect()
    }

    fn child(ast: &Ast, id: NodeId, index: usize) -> NodeId {
        ast.node(id).children[index]
    }

    #[test]
    fn test_parse_flat_statements() {
        let ast = parse("click \"left\"").unwrap();

        assert_eq!(ast.root().kind, TokenKind::Function);
        assert_eq!(ast.root().value, "root");
        assert_eq!(
            summary(&ast, ast.root_id()),
            vec![
                (TokenKind::Function, "click".to_string()),
                (TokenKind::String, "left".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_empty() {
        let ast = parse("   \n").unwrap();
        assert!(ast.is_empty());
        assert_eq!(ast.len(), 1);
    }

    #[test]
    fn test_parse_loop() {
        let ast = parse("loop 3\ntype \"hi\"\nend\nclick").unwrap();
        let root = ast.root_id();

        assert_eq!(
            summary(&ast, root),
            vec![
                (TokenKind::Keyword, "loop".to_string()),
                (TokenKind::Function, "click".to_string()),
            ]
        );
        let block = child(&ast, root, 0);
        assert_eq!(
            summary(&ast, block),
            vec![
                (TokenKind::Number, "3".to_string()),
                (TokenKind::Function, "type".to_string()),
                (TokenKind::String, "hi".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_nested_loops() {
        let ast = parse("loop 2 loop 3 click end keypress \"a\" end").unwrap();
        let outer = child(&ast, ast.root_id(), 0);
        let inner = child(&ast, outer, 1);

        assert_eq!(
            summary(&ast, outer),
            vec![
                (TokenKind::Number, "2".to_string()),
                (TokenKind::Keyword, "loop".to_string()),
                (TokenKind::Function, "keypress".to_string()),
                (TokenKind::String, "a".to_string()),
            ]
        );
        assert_eq!(
            summary(&ast, inner),
            vec![
                (TokenKind::Number, "3".to_string()),
                (TokenKind::Function, "click".to_string()),
            ]
        );
    }

    #[test]
    fn test_unclosed_loop_runs_to_end() {
        let ast = parse("loop 4 click").unwrap();
        let block = child(&ast, ast.root_id(), 0);

        assert_eq!(ast.root().children.len(), 1);
        assert_eq!(ast.node(block).children.len(), 2);
    }

    #[test]
    fn test_loop_as_last_token() {
        let err = parse("click\nloop").unwrap_err();

        assert_eq!(
            err,
            ParseError::UnexpectedEndOfInput {
                keyword: Keyword::Loop,
                location: SourceLocation::new(2, 1),
            }
        );
        assert_eq!(
            err.to_string(),
            "Parse error at line 2, column 1: expected iteration count after 'loop', found end of input"
        );
    }

    #[test]
    fn test_loop_count_takes_any_token() {
        let ast = parse("loop \"x\" click end").unwrap();
        let block = child(&ast, ast.root_id(), 0);

        assert_eq!(
            summary(&ast, block),
            vec![
                (TokenKind::String, "x".to_string()),
                (TokenKind::Function, "click".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_forever() {
        let ast = parse("forever\nclick \"a\"").unwrap();
        let block = child(&ast, ast.root_id(), 0);

        assert_eq!(ast.root().children.len(), 1);
        assert_eq!(ast.node(block).keyword(), Some(Keyword::Forever));
        assert_eq!(
            summary(&ast, block),
            vec![
                (TokenKind::Function, "click".to_string()),
                (TokenKind::String, "a".to_string()),
            ]
        );
    }

    #[test]
    fn test_forever_as_last_token() {
        let ast = parse("click forever").unwrap();
        let block = child(&ast, ast.root_id(), 1);

        assert!(ast.node(block).is_leaf());
    }

    #[test]
    fn test_end_inside_forever_restarts_body() {
        let ast = parse("forever a end b").unwrap();
        let block = child(&ast, ast.root_id(), 0);

        assert_eq!(ast.root().children.len(), 1);
        assert_eq!(
            summary(&ast, block),
            vec![(TokenKind::Function, "b".to_string())]
        );
    }

    #[test]
    fn test_trailing_end_inside_forever() {
        let ast = parse("forever a end").unwrap();
        let block = child(&ast, ast.root_id(), 0);

        assert_eq!(
            summary(&ast, block),
            vec![(TokenKind::Function, "a".to_string())]
        );
    }

    #[test]
    fn test_stray_end_truncates() {
        let ast = parse("click end type \"ignored\"").unwrap();

        assert_eq!(
            summary(&ast, ast.root_id()),
            vec![(TokenKind::Function, "click".to_string())]
        );
    }

    #[test]
    fn test_parser_from_tokens() {
        let tokens = crate::parser::lexer::tokenize("mouseset 10 10");
        let ast = Parser::from_tokens(tokens).parse().unwrap();

        assert_eq!(ast.root().children.len(), 3);
    }

    #[test]
    fn test_deep_nesting() {
        let depth = 50_000;
        let source = format!("{}click{}", "loop 1 ".repeat(depth), " end".repeat(depth));
        let ast = parse(&source).unwrap();

        // root + (loop + count) per level + click
        assert_eq!(ast.len(), 1 + depth * 2 + 1);
        let deepest = ast.walk().map(|(depth, _, _)| depth).max().unwrap();
        assert_eq!(deepest, depth + 1);
    }
}
