//! Arithmetic calculation capability.
//!
//! Evaluates `+ - * /` expressions with parentheses and decimals via a small
//! recursive-descent parser. Malformed expressions are reported as result
//! text, the way a calculation service would answer.

use std::iter::Peekable;
use std::str::Chars;

use anyhow::Result;
use async_trait::async_trait;
use cotools_core::ToolParams;

use crate::capability::{get_str, ToolCapability};

/// Arithmetic expression evaluator
pub struct CalculatorApi;

impl CalculatorApi {
    /// Extract the longest arithmetic-looking run from free text.
    ///
    /// A run must contain at least one digit to count.
    fn extract_expression(text: &str) -> Option<String> {
        let mut best: Option<String> = None;
        let mut current = String::new();
        for c in text.chars().chain(std::iter::once('\n')) {
            if c.is_ascii_digit() || "+-*/(). ".contains(c) {
                current.push(c);
            } else {
                if candidate_beats(&current, best.as_deref()) {
                    best = Some(current.trim().to_string());
                }
                current.clear();
            }
        }
        best.filter(|expr| !expr.is_empty())
    }
}

fn candidate_beats(candidate: &str, best: Option<&str>) -> bool {
    let trimmed = candidate.trim();
    trimmed.chars().any(|c| c.is_ascii_digit())
        && best.map_or(true, |b| trimmed.len() > b.len())
}

#[async_trait]
impl ToolCapability for CalculatorApi {
    fn name(&self) -> &str {
        "CalculatorAPI"
    }

    async fn call(&self, params: &ToolParams) -> Result<String> {
        let expression = get_str(params, "expression")
            .map(str::to_string)
            .or_else(|| {
                get_str(params, "query").and_then(Self::extract_expression)
            })
            .or_else(|| {
                get_str(params, "context").and_then(Self::extract_expression)
            });

        let Some(expression) = expression else {
            return Ok("Error: no arithmetic expression found in the request".to_string());
        };

        Ok(match evaluate(&expression) {
            Ok(value) => format!("Calculation result: {expression} = {}", format_number(value)),
            Err(e) => format!("Error calculating {expression}: {e}"),
        })
    }
}

/// Evaluate an arithmetic expression
pub fn evaluate(expression: &str) -> Result<f64, String> {
    let mut parser = Parser {
        chars: expression.chars().peekable(),
    };
    let value = parser.expr()?;
    parser.skip_whitespace();
    match parser.chars.peek() {
        Some(c) => Err(format!("unexpected character '{c}'")),
        None => Ok(value),
    }
}

/// Grammar: expr := term (('+'|'-') term)*; term := factor (('*'|'/') factor)*;
/// factor := '-' factor | '(' expr ')' | number
struct Parser<'a> {
    chars: Peekable<Chars<'a>>,
}

impl Parser<'_> {
    fn skip_whitespace(&mut self) {
        while matches!(self.chars.peek(), Some(c) if c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn expr(&mut self) -> Result<f64, String> {
        let mut value = self.term()?;
        loop {
            self.skip_whitespace();
            match self.chars.peek() {
                Some('+') => {
                    self.chars.next();
                    value += self.term()?;
                }
                Some('-') => {
                    self.chars.next();
                    value -= self.term()?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn term(&mut self) -> Result<f64, String> {
        let mut value = self.factor()?;
        loop {
            self.skip_whitespace();
            match self.chars.peek() {
                Some('*') => {
                    self.chars.next();
                    value *= self.factor()?;
                }
                Some('/') => {
                    self.chars.next();
                    let divisor = self.factor()?;
                    if divisor == 0.0 {
                        return Err("division by zero".to_string());
                    }
                    value /= divisor;
                }
                _ => return Ok(value),
            }
        }
    }

    fn factor(&mut self) -> Result<f64, String> {
        self.skip_whitespace();
        match self.chars.peek() {
            Some('-') => {
                self.chars.next();
                Ok(-self.factor()?)
            }
            Some('(') => {
                self.chars.next();
                let value = self.expr()?;
                self.skip_whitespace();
                match self.chars.next() {
                    Some(')') => Ok(value),
                    _ => Err("missing closing parenthesis".to_string()),
                }
            }
            Some(c) if c.is_ascii_digit() || *c == '.' => self.number(),
            Some(c) => Err(format!("unexpected character '{c}'")),
            None => Err("unexpected end of expression".to_string()),
        }
    }

    fn number(&mut self) -> Result<f64, String> {
        let mut raw = String::new();
        while let Some(&c) = self.chars.peek() {
            if !c.is_ascii_digit() && c != '.' {
                break;
            }
            raw.push(c);
            self.chars.next();
        }
        raw.parse::<f64>().map_err(|_| format!("invalid number '{raw}'"))
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cotools_core::ParamValue;

    #[test]
    fn evaluates_precedence_and_parentheses() {
        assert_eq!(evaluate("12*7").unwrap(), 84.0);
        assert_eq!(evaluate("2 + 3 * 4").unwrap(), 14.0);
        assert_eq!(evaluate("(2 + 3) * 4").unwrap(), 20.0);
        assert_eq!(evaluate("-3 + 5").unwrap(), 2.0);
        assert_eq!(evaluate("10 / 4").unwrap(), 2.5);
    }

    #[test]
    fn rejects_malformed_expressions() {
        assert!(evaluate("1 +").is_err());
        assert!(evaluate("(1 + 2").is_err());
        assert!(evaluate("1 / 0").is_err());
        assert!(evaluate("two + two").is_err());
    }

    #[test]
    fn extracts_the_expression_from_free_text() {
        assert_eq!(
            CalculatorApi::extract_expression("calculate 12*7 for me"),
            Some("12*7".to_string())
        );
        assert_eq!(
            CalculatorApi::extract_expression("compute (1 + 2) * 3"),
            Some("(1 + 2) * 3".to_string())
        );
        assert_eq!(CalculatorApi::extract_expression("no math here"), None);
    }

    #[tokio::test]
    async fn call_formats_the_result() {
        let mut params = ToolParams::new();
        params.insert("query".to_string(), ParamValue::from("calculate 12*7"));
        let result = CalculatorApi.call(&params).await.unwrap();
        assert_eq!(result, "Calculation result: 12*7 = 84");
    }

    #[tokio::test]
    async fn call_without_expression_reports_soft_error() {
        let mut params = ToolParams::new();
        params.insert("query".to_string(), ParamValue::from("nothing numeric"));
        let result = CalculatorApi.call(&params).await.unwrap();
        assert!(result.starts_with("Error:"));
    }
}
