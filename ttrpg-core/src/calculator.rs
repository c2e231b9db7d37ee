//! Restricted arithmetic evaluator.
//!
//! Supports `+ - * /` (also `×` and `÷`), unary signs, parentheses and
//! decimal literals. Nothing else is accepted.

use crate::error::GameError;

const MAX_DEPTH: usize = 64;

/// Evaluate an arithmetic expression.
pub fn evaluate(expression: &str) -> Result<f64, GameError> {
    let mut parser = Parser {
        chars: expression.chars().filter(|c| !c.is_whitespace()).collect(),
        pos: 0,
        depth: 0,
    };

    if parser.chars.is_empty() {
        return Err(GameError::invalid("Empty expression"));
    }

    let value = parser.expr()?;
    if let Some(c) = parser.peek() {
        return Err(GameError::invalid(format!("Unexpected '{c}' in expression")));
    }
    if !value.is_finite() {
        return Err(GameError::invalid("Expression does not have a finite value"));
    }
    Ok(value)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        self.pos += 1;
        c
    }

    fn expr(&mut self) -> Result<f64, GameError> {
        let mut value = self.term()?;
        while let Some(op @ ('+' | '-')) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            value = if op == '+' { value + rhs } else { value - rhs };
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64, GameError> {
        let mut value = self.unary()?;
        loop {
            match self.peek() {
                Some('*' | '×') => {
                    self.pos += 1;
                    value *= self.unary()?;
                }
                Some('/' | '÷') => {
                    self.pos += 1;
                    let rhs = self.unary()?;
                    if rhs == 0.0 {
                        return Err(GameError::invalid("Division by zero"));
                    }
                    value /= rhs;
                }
                _ => return Ok(value),
            }
        }
    }

    fn unary(&mut self) -> Result<f64, GameError> {
        match self.peek() {
            Some(sign @ ('+' | '-')) => {
                self.pos += 1;
                let value = self.nested(Self::unary)?;
                Ok(if sign == '-' { -value } else { value })
            }
            _ => self.atom(),
        }
    }

    fn atom(&mut self) -> Result<f64, GameError> {
        match self.peek() {
            Some('(') => {
                self.pos += 1;
                let value = self.nested(Self::expr)?;
                match self.bump() {
                    Some(')') => Ok(value),
                    _ => Err(GameError::invalid("Unbalanced parentheses")),
                }
            }
            Some(c) if c.is_ascii_digit() || c == '.' => self.number(),
            Some(c) => Err(GameError::invalid(format!("Unexpected '{c}' in expression"))),
            None => Err(GameError::invalid("Unexpected end of expression")),
        }
    }

    fn number(&mut self) -> Result<f64, GameError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit() || c == '.') {
            self.pos += 1;
        }
        let literal: String = self.chars[start..self.pos].iter().collect();
        literal
            .parse()
            .map_err(|_| GameError::invalid(format!("Bad number '{literal}'")))
    }

    fn nested(&mut self, rule: fn(&mut Self) -> Result<f64, GameError>) -> Result<f64, GameError> {
        if self.depth >= MAX_DEPTH {
            return Err(GameError::invalid("Expression is nested too deeply"));
        }
        self.depth += 1;
        let result = rule(self);
        self.depth -= 1;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence() {
        assert_eq!(evaluate("2 + 3 * 4").unwrap(), 14.0);
        assert_eq!(evaluate("10 - 4 - 3").unwrap(), 3.0);
        assert_eq!(evaluate("20 / 4 / 5").unwrap(), 1.0);
    }

    #[test]
    fn test_parentheses() {
        assert_eq!(evaluate("(2 + 3) * 4").unwrap(), 20.0);
        assert_eq!(evaluate("((1))").unwrap(), 1.0);
    }

    #[test]
    fn test_unary_and_decimals() {
        assert_eq!(evaluate("-3 + 5").unwrap(), 2.0);
        assert_eq!(evaluate("--2").unwrap(), 2.0);
        assert_eq!(evaluate("1.5 * 2").unwrap(), 3.0);
        assert_eq!(evaluate("-(4 - 6)").unwrap(), 2.0);
    }

    #[test]
    fn test_unicode_operators() {
        assert_eq!(evaluate("6 × 7").unwrap(), 42.0);
        assert_eq!(evaluate("9 ÷ 3").unwrap(), 3.0);
    }

    #[test]
    fn test_rejects_identifiers() {
        assert!(evaluate("__import__('os')").is_err());
        assert!(evaluate("2 + x").is_err());
        assert!(evaluate("abs(3)").is_err());
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(evaluate("").is_err());
        assert!(evaluate("(1 + 2").is_err());
        assert!(evaluate("1 + 2)").is_err());
        assert!(evaluate("1 +").is_err());
        assert!(evaluate("1..2").is_err());
        assert!(evaluate("2 ** 3").is_err());
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(
            evaluate("1 / (2 - 2)"),
            Err(GameError::InvalidArgument("Division by zero".to_string()))
        );
    }

    #[test]
    fn test_depth_limit() {
        let deep = format!("{}1{}", "(".repeat(200), ")".repeat(200));
        assert!(evaluate(&deep).is_err());
        let shallow = format!("{}1{}", "(".repeat(20), ")".repeat(20));
        assert_eq!(evaluate(&shallow).unwrap(), 1.0);
    }
}
