//! `=expression` → evaluate arithmetic.
//!
//! Supports `+ - * /`, unary signs, parentheses and decimal literals
//! (with exponents and `_` digit separators).  Anything else, including
//! division by zero, is reported as an invalid expression.

use super::{QueryAction, RouterResult, SPECIAL_PREFIX};

const PREFIX: char = '=';

pub fn handle_query(query: &str) -> Option<RouterResult> {
    let expression = query.strip_prefix(PREFIX)?.trim();
    let mut result = RouterResult::consumed();

    if expression.is_empty() {
        result.push(
            format!("{}calc:hint", SPECIAL_PREFIX),
            "Type an expression to calculate".into(),
            None,
        );
        return Some(result);
    }

    let Some(value) = evaluate(expression) else {
        result.push(
            format!("{}calc:error", SPECIAL_PREFIX),
            "Invalid expression".into(),
            None,
        );
        return Some(result);
    };

    let formatted = format_number(value);
    result.push(
        format!("{}calc:{}", SPECIAL_PREFIX, identifier(expression)),
        format!("{} = {}", expression, formatted),
        Some(QueryAction::CalcResult {
            expression: expression.to_string(),
            result: formatted,
        }),
    );
    Some(result)
}

fn identifier(expression: &str) -> String {
    let id: String = expression.chars().filter(|c| c.is_alphanumeric()).collect();
    if id.is_empty() {
        "result".to_string()
    } else {
        id
    }
}

/// Evaluate `expression`, or `None` when it is not valid arithmetic.
pub fn evaluate(expression: &str) -> Option<f64> {
    let tokens = tokenize(expression)?;
    let mut parser = Parser { tokens: &tokens, pos: 0 };
    let value = parser.expr()?;
    if parser.pos != tokens.len() {
        return None;
    }
    Some(value)
}

/// Integral values print without a fraction; everything else uses six
/// significant digits, switching to exponent notation for very large or
/// very small magnitudes.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "nan".into();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf".into() } else { "-inf".into() };
    }
    if value == 0.0 {
        return "0".into();
    }
    if value.fract() == 0.0 {
        return format!("{:.0}", value);
    }
    format_general(value)
}

fn format_general(value: f64) -> String {
    const PRECISION: i32 = 6;

    // Exponent after rounding to the target precision.
    let sci = format!("{:.*e}", (PRECISION - 1) as usize, value);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m.to_string(), e.parse::<i32>().unwrap_or(0)),
        None => return sci,
    };

    if exp < -4 || exp >= PRECISION {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(&mantissa), sign, exp.abs())
    } else {
        let decimals = (PRECISION - 1 - exp) as usize;
        trim_fraction(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_fraction(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

//  Lexer

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Option<Vec<Token>> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let token = match c {
            c if c.is_whitespace() => {
                i += 1;
                continue;
            }
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '0'..='9' | '.' => {
                let (value, end) = lex_number(&chars, i)?;
                tokens.push(Token::Number(value));
                i = end;
                continue;
            }
            _ => return None,
        };
        tokens.push(token);
        i += 1;
    }
    Some(tokens)
}

/// Scan a numeric literal starting at `start`.  Underscores are only
/// accepted between two digits.
fn lex_number(chars: &[char], start: usize) -> Option<(f64, usize)> {
    let mut i = start;
    let mut text = String::new();

    let digits = |i: &mut usize, text: &mut String| -> Option<usize> {
        let mut count = 0;
        while *i < chars.len() {
            let c = chars[*i];
            if c.is_ascii_digit() {
                text.push(c);
                count += 1;
            } else if c == '_' {
                let next_is_digit = chars.get(*i + 1).is_some_and(|n| n.is_ascii_digit());
                if count == 0 || !next_is_digit {
                    return None;
                }
            } else {
                break;
            }
            *i += 1;
        }
        Some(count)
    };

    let int_digits = digits(&mut i, &mut text)?;
    // `007` is not a literal, `000`, `0.7` and `07e1` are.
    let padded_int = text.starts_with('0') && text.chars().any(|c| c != '0');
    let mut frac_digits = 0;
    let mut integral = true;
    if chars.get(i) == Some(&'.') {
        integral = false;
        text.push('.');
        i += 1;
        frac_digits = digits(&mut i, &mut text)?;
    }
    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    if matches!(chars.get(i), Some('e') | Some('E')) {
        integral = false;
        text.push('e');
        i += 1;
        if let Some(&sign @ ('+' | '-')) = chars.get(i) {
            text.push(sign);
            i += 1;
        }
        if digits(&mut i, &mut text)? == 0 {
            return None;
        }
    }

    if integral && padded_int {
        return None;
    }

    // A literal running straight into a name or another dot is malformed.
    if chars.get(i).is_some_and(|c| c.is_alphanumeric() || *c == '.' || *c == '_') {
        return None;
    }

    text.parse::<f64>().ok().map(|v| (v, i))
}

//  Parser
//
//  expr  := term (('+' | '-') term)*
//  term  := unary (('*' | '/') unary)*
//  unary := ('+' | '-') unary | atom
//  atom  := NUMBER | '(' expr ')'

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.peek()?;
        self.pos += 1;
        Some(token)
    }

    fn expr(&mut self) -> Option<f64> {
        let mut value = self.term()?;
        while let Some(op @ (Token::Plus | Token::Minus)) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            value = if op == Token::Plus { value + rhs } else { value - rhs };
        }
        Some(value)
    }

    fn term(&mut self) -> Option<f64> {
        let mut value = self.unary()?;
        while let Some(op @ (Token::Star | Token::Slash)) = self.peek() {
            self.pos += 1;
            let rhs = self.unary()?;
            value = if op == Token::Star {
                value * rhs
            } else {
                if rhs == 0.0 {
                    return None;
                }
                value / rhs
            };
        }
        Some(value)
    }

    fn unary(&mut self) -> Option<f64> {
        match self.peek()? {
            Token::Plus => {
                self.pos += 1;
                self.unary()
            }
            Token::Minus => {
                self.pos += 1;
                self.unary().map(|v| -v)
            }
            _ => self.atom(),
        }
    }

    fn atom(&mut self) -> Option<f64> {
        match self.bump()? {
            Token::Number(v) => Some(v),
            Token::LParen => {
                let value = self.expr()?;
                match self.bump()? {
                    Token::RParen => Some(value),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_a_calculation() {
        assert!(handle_query("firefox").is_none());
        assert!(handle_query("?x").is_none());
    }

    #[test]
    fn bare_prefix_gives_hint() {
        let result = handle_query("=").unwrap();
        assert!(result.consume);
        assert_eq!(result.items[0].0, "__special__:calc:hint");
        assert!(result.actions.is_empty());
    }

    #[test]
    fn invalid_expression_gives_error_row() {
        for query in ["=2+", "=abc", "=1/0", "=(1+2", "=2 3", "=2**3", "=1__0"] {
            let result = handle_query(query).unwrap();
            assert_eq!(result.items[0].0, "__special__:calc:error", "{}", query);
            assert!(result.actions.is_empty());
        }
    }

    #[test]
    fn valid_expression_gives_result_row() {
        let result = handle_query("= 2 + 3 * 4").unwrap();
        let (id, label) = &result.items[0];
        assert_eq!(id, "__special__:calc:234");
        assert_eq!(label, "2 + 3 * 4 = 14");
        assert_eq!(
            result.actions[id],
            QueryAction::CalcResult {
                expression: "2 + 3 * 4".into(),
                result: "14".into()
            }
        );
    }

    #[test]
    fn identifier_falls_back_to_result() {
        assert_eq!(identifier("(.5)"), "5");
        assert_eq!(identifier("+()"), "result");
    }

    #[test]
    fn evaluation() {
        assert_eq!(evaluate("(1 + 2) * 3"), Some(9.0));
        assert_eq!(evaluate("-(-2)"), Some(2.0));
        assert_eq!(evaluate("+-+3"), Some(-3.0));
        assert_eq!(evaluate("7 / 2"), Some(3.5));
        assert_eq!(evaluate("1_000 + .5"), Some(1000.5));
        assert_eq!(evaluate("1e3 - 2E-1"), Some(999.8));
        assert_eq!(evaluate("10 - 4 - 3"), Some(3.0));
        assert_eq!(evaluate("5."), Some(5.0));
        assert_eq!(evaluate(""), None);
        assert_eq!(evaluate("."), None);
        assert_eq!(evaluate("1e"), None);
        assert_eq!(evaluate("1.2.3"), None);
    }

    #[test]
    fn leading_zeros_only_in_floats() {
        assert_eq!(evaluate("01"), None);
        assert_eq!(evaluate("1 + 007"), None);
        assert_eq!(evaluate("0_1"), None);
        assert_eq!(evaluate("0"), Some(0.0));
        assert_eq!(evaluate("000"), Some(0.0));
        assert_eq!(evaluate("01.5"), Some(1.5));
        assert_eq!(evaluate("07e1"), Some(70.0));
        assert_eq!(handle_query("=01").unwrap().items[0].0, "__special__:calc:error");
    }

    #[test]
    fn formatting() {
        assert_eq!(format_number(14.0), "14");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert_eq!(format_number(3.5), "3.5");
        assert_eq!(format_number(1.0 / 3.0), "0.333333");
        assert_eq!(format_number(2.0 / 3.0), "0.666667");
        assert_eq!(format_number(1234.5678), "1234.57");
        assert_eq!(format_number(0.0001), "0.0001");
        assert_eq!(format_number(0.00001234), "1.234e-05");
        assert_eq!(format_number(1234567.5), "1.23457e+06");
        assert_eq!(format_number(f64::INFINITY), "inf");
        assert_eq!(format_number(f64::NEG_INFINITY), "-inf");
    }
}
