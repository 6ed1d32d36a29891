//! Recursive-descent parser.
//!
//! Precedence, loosest first: `or`, `and`, equality, relational, additive,
//! multiplicative, unary minus, union, path.
//!
//! Nesting (parentheses, predicates, arguments, unary minus) and the total
//! number of binary operators are capped, which also bounds the depth of
//! the tree the evaluator walks.

use super::ast::{Axis, BinaryOp, Expr, Function, LocationPath, NodeTest, Step};
use super::error::{QueryError, QueryErrorCode, QueryResult};
use super::lexer::{tokenize, Spanned, Token};

/// Deepest nesting of sub-expressions.
const MAX_DEPTH: usize = 256;

/// Most binary and union operators in one expression.
const MAX_OPERATORS: usize = 512;

/// Parses an expression.
pub fn parse(input: &str) -> QueryResult<Expr> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(QueryError::new(QueryErrorCode::ExprError, "empty expression", 0));
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        end: input.len(),
        depth: 0,
        operators: 0,
    };
    let expr = parser.or_expr()?;
    if let Some(extra) = parser.tokens.get(parser.pos) {
        return Err(QueryError::new(
            QueryErrorCode::ExprError,
            format!("unexpected token '{:?}'", extra.token),
            extra.position,
        ));
    }
    Ok(expr)
}

type Level = fn(&mut Parser) -> QueryResult<Expr>;

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    end: usize,
    depth: usize,
    operators: usize,
}

impl Parser {
    fn or_expr(&mut self) -> QueryResult<Expr> {
        self.nested(|p| p.binary(Self::and_expr, &[(Token::Or, BinaryOp::Or)]))
    }

    fn and_expr(&mut self) -> QueryResult<Expr> {
        self.binary(Self::equality_expr, &[(Token::And, BinaryOp::And)])
    }

    fn equality_expr(&mut self) -> QueryResult<Expr> {
        self.binary(
            Self::relational_expr,
            &[(Token::Equal, BinaryOp::Equal), (Token::NotEqual, BinaryOp::NotEqual)],
        )
    }

    fn relational_expr(&mut self) -> QueryResult<Expr> {
        self.binary(
            Self::additive_expr,
            &[
                (Token::Less, BinaryOp::Less),
                (Token::LessEqual, BinaryOp::LessEqual),
                (Token::Greater, BinaryOp::Greater),
                (Token::GreaterEqual, BinaryOp::GreaterEqual),
            ],
        )
    }

    fn additive_expr(&mut self) -> QueryResult<Expr> {
        self.binary(
            Self::multiplicative_expr,
            &[(Token::Plus, BinaryOp::Add), (Token::Minus, BinaryOp::Subtract)],
        )
    }

    fn multiplicative_expr(&mut self) -> QueryResult<Expr> {
        self.binary(
            Self::unary_expr,
            &[
                (Token::Multiply, BinaryOp::Multiply),
                (Token::Div, BinaryOp::Divide),
                (Token::Mod, BinaryOp::Modulo),
            ],
        )
    }

    /// Left-associative chain of `next` separated by any of `ops`.
    fn binary(&mut self, next: Level, ops: &[(Token, BinaryOp)]) -> QueryResult<Expr> {
        let mut left = next(self)?;
        'chain: loop {
            for (token, op) in ops {
                if self.eat(token) {
                    self.count_operator()?;
                    let right = next(self)?;
                    left = Expr::Binary(Box::new(left), *op, Box::new(right));
                    continue 'chain;
                }
            }
            return Ok(left);
        }
    }

    fn unary_expr(&mut self) -> QueryResult<Expr> {
        self.nested(Self::unary_operand)
    }

    fn unary_operand(&mut self) -> QueryResult<Expr> {
        if self.eat(&Token::Minus) {
            let inner = self.unary_expr()?;
            return Ok(Expr::Negate(Box::new(inner)));
        }
        self.union_expr()
    }

    fn union_expr(&mut self) -> QueryResult<Expr> {
        let mut left = self.path_expr()?;
        while self.eat(&Token::Pipe) {
            self.count_operator()?;
            let right = self.path_expr()?;
            left = Expr::Union(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn path_expr(&mut self) -> QueryResult<Expr> {
        match self.peek() {
            Some(
                Token::Variable(_)
                | Token::LeftParen
                | Token::Literal(_)
                | Token::Number(_)
                | Token::Function(_),
            ) => self.filter_expr(),
            Some(Token::Slash) => {
                self.pos += 1;
                let mut steps = Vec::new();
                if self.at_step_start() {
                    self.relative_steps(&mut steps)?;
                }
                Ok(Expr::Path(LocationPath {
                    absolute: true,
                    steps,
                }))
            }
            Some(Token::DoubleSlash) => {
                self.pos += 1;
                let mut steps = vec![Step::descendant_or_self()];
                self.relative_steps(&mut steps)?;
                Ok(Expr::Path(LocationPath {
                    absolute: true,
                    steps,
                }))
            }
            _ => {
                let mut steps = Vec::new();
                self.relative_steps(&mut steps)?;
                Ok(Expr::Path(LocationPath {
                    absolute: false,
                    steps,
                }))
            }
        }
    }

    fn filter_expr(&mut self) -> QueryResult<Expr> {
        let primary = self.primary_expr()?;
        let predicates = self.predicates()?;

        let mut steps = Vec::new();
        if self.eat(&Token::Slash) {
            self.relative_steps(&mut steps)?;
        } else if self.eat(&Token::DoubleSlash) {
            steps.push(Step::descendant_or_self());
            self.relative_steps(&mut steps)?;
        }

        if predicates.is_empty() && steps.is_empty() {
            return Ok(primary);
        }
        Ok(Expr::Filter {
            primary: Box::new(primary),
            predicates,
            steps,
        })
    }

    fn primary_expr(&mut self) -> QueryResult<Expr> {
        let position = self.position();
        let Some(token) = self.advance() else {
            return Err(self.unexpected_end());
        };
        match token {
            Token::Variable(name) => Ok(Expr::Variable(name, position)),
            Token::Literal(text) => Ok(Expr::Literal(text)),
            Token::Number(value) => Ok(Expr::Number(value)),
            Token::LeftParen => {
                let inner = self.or_expr()?;
                self.expect_close_paren()?;
                Ok(inner)
            }
            Token::Function(name) => self.function_call(&name, position),
            other => Err(QueryError::new(
                QueryErrorCode::ExprError,
                format!("unexpected token '{other:?}'"),
                position,
            )),
        }
    }

    fn function_call(&mut self, name: &str, position: usize) -> QueryResult<Expr> {
        let function = Function::from_name(name).ok_or_else(|| {
            QueryError::new(
                QueryErrorCode::UnknownFunc,
                format!("unknown function '{name}'"),
                position,
            )
        })?;
        if !self.eat(&Token::LeftParen) {
            return Err(QueryError::new(
                QueryErrorCode::ExprError,
                format!("expected '(' after '{name}'"),
                self.position(),
            ));
        }

        let mut args = Vec::new();
        if !self.eat(&Token::RightParen) {
            loop {
                args.push(self.or_expr()?);
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
            self.expect_close_paren()?;
        }

        let (min, max) = function.arity();
        if args.len() < min || max.is_some_and(|max| args.len() > max) {
            return Err(QueryError::new(
                QueryErrorCode::InvalidArity,
                format!("{name}() does not take {} argument(s)", args.len()),
                position,
            ));
        }
        Ok(Expr::Call(function, args))
    }

    fn relative_steps(&mut self, steps: &mut Vec<Step>) -> QueryResult<()> {
        loop {
            steps.push(self.step()?);
            if self.eat(&Token::Slash) {
                continue;
            }
            if self.eat(&Token::DoubleSlash) {
                steps.push(Step::descendant_or_self());
                continue;
            }
            return Ok(());
        }
    }

    fn step(&mut self) -> QueryResult<Step> {
        if self.eat(&Token::Dot) {
            return Ok(Self::abbreviated(Axis::SelfAxis));
        }
        if self.eat(&Token::DotDot) {
            return Ok(Self::abbreviated(Axis::Parent));
        }

        let axis = if self.eat(&Token::At) {
            Axis::Attribute
        } else if let Some(Token::Axis(name)) = self.peek() {
            let position = self.position();
            let axis = Axis::from_name(name).ok_or_else(|| {
                QueryError::new(QueryErrorCode::ExprError, format!("unknown axis '{name}'"), position)
            })?;
            self.pos += 1;
            if !self.eat(&Token::ColonColon) {
                return Err(QueryError::new(
                    QueryErrorCode::ExprError,
                    "expected '::' after axis name",
                    self.position(),
                ));
            }
            axis
        } else {
            Axis::Child
        };

        let test = self.node_test()?;
        let predicates = self.predicates()?;
        Ok(Step {
            axis,
            test,
            predicates,
        })
    }

    fn abbreviated(axis: Axis) -> Step {
        Step {
            axis,
            test: NodeTest::Node,
            predicates: Vec::new(),
        }
    }

    fn node_test(&mut self) -> QueryResult<NodeTest> {
        let position = self.position();
        match self.advance() {
            Some(Token::Name(name)) if name == "*" => Ok(NodeTest::Any),
            Some(Token::Name(name)) if name.contains(':') => Err(QueryError::new(
                QueryErrorCode::UndefPrefix,
                format!("namespace prefix in '{name}' is not bound"),
                position,
            )),
            Some(Token::Name(name)) => Ok(NodeTest::Name(name)),
            Some(Token::NodeType(kind)) => {
                if !self.eat(&Token::LeftParen) {
                    return Err(QueryError::new(
                        QueryErrorCode::ExprError,
                        format!("expected '(' after '{kind}'"),
                        self.position(),
                    ));
                }
                let target = match self.peek() {
                    Some(Token::Literal(target)) if kind == "processing-instruction" => {
                        let target = target.clone();
                        self.pos += 1;
                        Some(target)
                    }
                    _ => None,
                };
                self.expect_close_paren()?;
                Ok(match kind.as_str() {
                    "text" => NodeTest::Text,
                    "comment" => NodeTest::Comment,
                    "processing-instruction" => NodeTest::ProcessingInstruction(target),
                    _ => NodeTest::Node,
                })
            }
            Some(other) => Err(QueryError::new(
                QueryErrorCode::ExprError,
                format!("expected a node test, found '{other:?}'"),
                position,
            )),
            None => Err(self.unexpected_end()),
        }
    }

    fn predicates(&mut self) -> QueryResult<Vec<Expr>> {
        let mut predicates = Vec::new();
        while self.eat(&Token::LeftBracket) {
            predicates.push(self.or_expr()?);
            if !self.eat(&Token::RightBracket) {
                return Err(QueryError::new(
                    QueryErrorCode::InvalidPredicate,
                    "expected ']' to close predicate",
                    self.position(),
                ));
            }
        }
        Ok(predicates)
    }

    fn expect_close_paren(&mut self) -> QueryResult<()> {
        if self.eat(&Token::RightParen) {
            Ok(())
        } else {
            Err(QueryError::new(QueryErrorCode::Unclosed, "expected ')'", self.position()))
        }
    }

    fn at_step_start(&self) -> bool {
        matches!(
            self.peek(),
            Some(Token::Dot | Token::DotDot | Token::At | Token::Name(_) | Token::NodeType(_) | Token::Axis(_))
        )
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn position(&self) -> usize {
        self.tokens.get(self.pos).map_or(self.end, |s| s.position)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos)?.token.clone();
        self.pos += 1;
        Some(token)
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Runs `level` one nesting step deeper.
    fn nested(&mut self, level: Level) -> QueryResult<Expr> {
        if self.depth >= MAX_DEPTH {
            return Err(QueryError::new(
                QueryErrorCode::ExprError,
                "expression nested too deeply",
                self.position(),
            ));
        }
        self.depth += 1;
        let result = level(self);
        self.depth -= 1;
        result
    }

    fn count_operator(&mut self) -> QueryResult<()> {
        self.operators += 1;
        if self.operators > MAX_OPERATORS {
            return Err(QueryError::new(
                QueryErrorCode::ExprError,
                "expression has too many operators",
                self.position(),
            ));
        }
        Ok(())
    }

    fn unexpected_end(&self) -> QueryError {
        QueryError::new(QueryErrorCode::ExprError, "unexpected end of expression", self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(input: &str) -> QueryErrorCode {
        parse(input).unwrap_err().kind()
    }

    #[test]
    fn test_double_slash_expands() {
        let Expr::Path(path) = parse("//p").unwrap() else {
            panic!("expected a path");
        };
        assert!(path.absolute);
        assert_eq!(path.steps.len(), 2);
        assert_eq!(path.steps[0], Step::descendant_or_self());
        assert_eq!(path.steps[1].test, NodeTest::Name("p".into()));
    }

    #[test]
    fn test_precedence() {
        let Expr::Binary(_, op, right) = parse("1 + 2 * 3").unwrap() else {
            panic!("expected a binary expression");
        };
        assert_eq!(op, BinaryOp::Add);
        assert!(matches!(*right, Expr::Binary(_, BinaryOp::Multiply, _)));

        let Expr::Binary(_, op, _) = parse("a = 1 or b").unwrap() else {
            panic!("expected a binary expression");
        };
        assert_eq!(op, BinaryOp::Or);
    }

    #[test]
    fn test_axes_and_abbreviations() {
        let Expr::Path(path) = parse("ancestor::div/@class/..").unwrap() else {
            panic!("expected a path");
        };
        let axes: Vec<_> = path.steps.iter().map(|s| s.axis).collect();
        assert_eq!(axes, vec![Axis::Ancestor, Axis::Attribute, Axis::Parent]);
    }

    #[test]
    fn test_root_only() {
        assert_eq!(
            parse("/").unwrap(),
            Expr::Path(LocationPath {
                absolute: true,
                steps: Vec::new()
            })
        );
    }

    #[test]
    fn test_filter_with_trailing_path() {
        let expr = parse("(//a)[1]/@href").unwrap();
        let Expr::Filter { predicates, steps, .. } = expr else {
            panic!("expected a filter expression");
        };
        assert_eq!(predicates.len(), 1);
        assert_eq!(steps[0].axis, Axis::Attribute);
    }

    #[test]
    fn test_processing_instruction_target() {
        let Expr::Path(path) = parse("processing-instruction('xml-stylesheet')").unwrap() else {
            panic!("expected a path");
        };
        assert_eq!(
            path.steps[0].test,
            NodeTest::ProcessingInstruction(Some("xml-stylesheet".into()))
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(code(""), QueryErrorCode::ExprError);
        assert_eq!(code("//div[@id='x'"), QueryErrorCode::InvalidPredicate);
        assert_eq!(code("count(//p"), QueryErrorCode::Unclosed);
        assert_eq!(code("frobnicate(1)"), QueryErrorCode::UnknownFunc);
        assert_eq!(code("count()"), QueryErrorCode::InvalidArity);
        assert_eq!(code("concat('a')"), QueryErrorCode::InvalidArity);
        assert_eq!(code("sideways::p"), QueryErrorCode::ExprError);
        assert_eq!(code("//svg:rect"), QueryErrorCode::UndefPrefix);
        assert_eq!(code("//p)"), QueryErrorCode::ExprError);
        assert_eq!(code("//"), QueryErrorCode::ExprError);
    }

    #[test]
    fn test_error_position_points_at_problem() {
        let err = parse("//p[1] | frob()").unwrap_err();
        assert_eq!(err.position(), 9);
    }

    #[test]
    fn test_deep_nesting_is_an_error() {
        let depth = 10_000;
        let parens = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(code(&parens), QueryErrorCode::ExprError);

        let negations = format!("{}1", "-".repeat(depth));
        assert_eq!(code(&negations), QueryErrorCode::ExprError);

        let calls = format!("{}1{}", "number(".repeat(depth), ")".repeat(depth));
        assert_eq!(code(&calls), QueryErrorCode::ExprError);

        let predicates = format!("a{}", "[b".repeat(depth) + &"]".repeat(depth));
        assert_eq!(code(&predicates), QueryErrorCode::ExprError);
    }

    #[test]
    fn test_long_operator_chains_are_an_error() {
        let chain = vec!["1"; 5_000].join(" + ");
        assert_eq!(code(&chain), QueryErrorCode::ExprError);
        let union = vec!["a"; 5_000].join(" | ");
        assert_eq!(code(&union), QueryErrorCode::ExprError);
    }

    #[test]
    fn test_moderate_nesting_parses() {
        let parens = format!("{}1{}", "(".repeat(50), ")".repeat(50));
        assert_eq!(parse(&parens).unwrap(), Expr::Number(1.0));
        assert!(parse(&vec!["1"; 100].join(" + ")).is_ok());
    }
}
