//! Expression tokenizer.

use expr::error::ExprError;
use expr::rules;
use expr::token::{Token, TokenKind, Tokens};

/// Splits `input` into tokens using the rule table.
///
/// Whitespace is dropped and register tokens lose their `$`. Fails at the
/// first position where no rule matches, or when the expression doesn't fit
/// into a token stream.
pub fn tokenize(input: &str) -> Result<Tokens, ExprError> {
    let mut tokens = Tokens::new();
    let mut position = 0;

    while position < input.len() {
        let rest = &input[position..];
        let m = match rules::find(rest) {
            Some(m) => m,
            None => {
                debug!("no match at position {}\n{}\n{:>width$}", position, input, "^", width = position + 1);
                return Err(ExprError::NoMatch {
                    offset: position,
                    remaining: rest.to_string(),
                });
            }
        };

        let text = &rest[..m.len];
        trace!("match rules[{}] = \"{}\" at position {} with len {}: {}", m.index, m.rule.pattern, position, m.len, text);

        let start = position;
        position += m.len;

        let text = match m.rule.kind {
            TokenKind::Whitespace => continue,
            TokenKind::Register => &text[1..],
            _ => text,
        };

        tokens.push(Token::new(m.rule.kind, m.rule.precedence, text, start))
            .map_err(|_| ExprError::TooManyTokens { offset: start })?;
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use expr::token::MAX_TOKENS;
    use expr::token::TokenKind::*;

    #[test]
    fn basic() {
        let tokens = tokenize("*0x1000 + $eax").unwrap();
        assert_eq!(tokens.kinds(), vec![Star, IntHex, Plus, Register]);
        assert_eq!(tokens[1].text(), "0x1000");
        assert_eq!(tokens[3].text(), "eax");
        assert_eq!(tokens[3].offset(), 10);
        assert_eq!(tokens[2].precedence(), 4);
    }

    #[test]
    fn comparisons() {
        let tokens = tokenize("$eip==4194304").unwrap();
        assert_eq!(tokens.kinds(), vec![Register, Eq, IntDecimal]);
        let tokens = tokenize("!(a!=b)||c&&d").unwrap();
        assert_eq!(tokens.kinds(), vec![Not, LParen, Value, Neq, Value, RParen, Or, Value, And, Value]);
    }

    #[test]
    fn empty_and_blank() {
        assert!(tokenize("").unwrap().is_empty());
        assert!(tokenize("   ").unwrap().is_empty());
    }

    #[test]
    fn no_match() {
        assert_eq!(
            tokenize("1 + 2 % 3"),
            Err(ExprError::NoMatch { offset: 6, remaining: "% 3".to_string() })
        );
        assert_eq!(
            tokenize("$"),
            Err(ExprError::NoMatch { offset: 0, remaining: "$".to_string() })
        );
    }

    #[test]
    fn token_limit() {
        // "1+1+...+1+" is exactly one token per byte
        let full = vec!["1"; MAX_TOKENS / 2].join("+") + "+";
        assert_eq!(tokenize(&full).unwrap().len(), MAX_TOKENS);

        let too_long = full + "1";
        assert_eq!(
            tokenize(&too_long),
            Err(ExprError::TooManyTokens { offset: MAX_TOKENS })
        );
    }

    #[test]
    fn stateless() {
        let first = tokenize("$eax + 1").unwrap();
        let second = tokenize("$eax + 1").unwrap();
        assert_eq!(first, second);
    }
}
