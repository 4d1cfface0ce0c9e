//! Recursive-descent parser for the query language.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! expr       := or End
//! or         := and (OR and)*
//! and        := not ( (AND not) | not )*      juxtaposition binds as AND
//! not        := NOT not | '(' or ')' | comparison
//! comparison := SYMBOL [ CMPOP SYMBOL ]
//! ```
//!
//! One token of lookahead suffices; the parser never backtracks. Nesting
//! depth is capped by an explicit constant so a pathologically nested query
//! fails with [`QueryError::TooDeep`] instead of exhausting the call stack.

use super::ast::Expression;
use super::errors::QueryError;
use super::lexer::{Lexer, Token};

/// Maximum nesting depth of `not` chains and parenthesized groups.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Parses query text into an expression tree. Empty input yields
/// [`Expression::Empty`].
pub fn parse(text: &str) -> Result<Expression, QueryError> {
    Parser {
        lexer: Lexer::new(text),
    }
    .parse()
}

struct Parser<'a> {
    lexer: Lexer<'a>,
}

impl Parser<'_> {
    fn parse(mut self) -> Result<Expression, QueryError> {
        if *self.lexer.peek_token()? == Token::End {
            return Ok(Expression::Empty);
        }

        let expression = self.or_expression(0)?;

        match self.lexer.next_token()? {
            Token::End => Ok(expression),
            token => Err(QueryError::UnexpectedToken(token.describe())),
        }
    }

    fn or_expression(&mut self, depth: usize) -> Result<Expression, QueryError> {
        let mut expression = self.and_expression(depth)?;

        while *self.lexer.peek_token()? == Token::Or {
            self.lexer.next_token()?;
            let right = self.and_expression(depth)?;
            expression = Expression::Or(Box::new(expression), Box::new(right));
        }

        Ok(expression)
    }

    fn and_expression(&mut self, depth: usize) -> Result<Expression, QueryError> {
        let mut expression = self.not_expression(depth)?;

        loop {
            match self.lexer.peek_token()? {
                Token::And => {
                    self.lexer.next_token()?;
                }
                // juxtaposition: two operands with nothing between them
                Token::Symbol(_) | Token::Not | Token::OpenParen => {}
                _ => break,
            }

            let right = self.not_expression(depth)?;
            expression = Expression::And(Box::new(expression), Box::new(right));
        }

        Ok(expression)
    }

    fn not_expression(&mut self, depth: usize) -> Result<Expression, QueryError> {
        if depth >= MAX_NESTING_DEPTH {
            return Err(QueryError::TooDeep {
                max: MAX_NESTING_DEPTH,
            });
        }

        match self.lexer.peek_token()? {
            Token::Not => {
                self.lexer.next_token()?;
                let operand = self.not_expression(depth + 1)?;
                Ok(Expression::Not(Box::new(operand)))
            }
            Token::OpenParen => {
                self.lexer.next_token()?;
                let expression = self.or_expression(depth + 1)?;
                match self.lexer.next_token()? {
                    Token::CloseParen => Ok(expression),
                    token => Err(QueryError::UnexpectedToken(token.describe())),
                }
            }
            _ => self.comparison(),
        }
    }

    fn comparison(&mut self) -> Result<Expression, QueryError> {
        let tag = match self.lexer.next_token()? {
            Token::Symbol(name) => name,
            token => return Err(QueryError::UnexpectedToken(token.describe())),
        };

        let operator = match self.lexer.peek_token()? {
            Token::Comparison(operator) => *operator,
            _ => return Ok(Expression::Tag(tag)),
        };
        self.lexer.next_token()?;

        match self.lexer.next_token()? {
            Token::Symbol(value) => Ok(Expression::Comparison {
                tag,
                operator,
                value,
            }),
            token => Err(QueryError::UnexpectedToken(token.describe())),
        }
    }
}
