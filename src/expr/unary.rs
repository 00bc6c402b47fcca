//! Reclassification of prefix `*` and `-`.
//!
//! The tokenizer can't tell `a * b` from `*b` or `a - b` from `-b`. A `*` or
//! `-` is unary if it starts the expression or follows anything that can't
//! end an operand (an operator or `(`). This is a local heuristic without
//! lookahead.

use expr::token::{TokenKind, Tokens};

/// Whether a token of kind `prev` can end an operand.
fn ends_operand(prev: TokenKind) -> bool {
    prev.is_operand() || prev == TokenKind::RParen
}

/// Turns prefix `*` into `Dereference` and prefix `-` into `Negate`, in place.
pub fn disambiguate(tokens: &mut Tokens) {
    let tokens = tokens.as_mut_slice();
    for i in 0..tokens.len() {
        let unary = match tokens[i].kind() {
            TokenKind::Star => TokenKind::Dereference,
            TokenKind::Minus => TokenKind::Negate,
            _ => continue,
        };

        if i == 0 || !ends_operand(tokens[i - 1].kind()) {
            trace!("token {} at position {} is {:?}", i, tokens[i].offset(), unary);
            tokens[i].make_unary(unary);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expr::lexer::tokenize;
    use expr::token::TokenKind::*;
    use expr::token::UNARY_PRECEDENCE;

    fn kinds(input: &str) -> Vec<TokenKind> {
        let mut tokens = tokenize(input).unwrap();
        disambiguate(&mut tokens);
        tokens.kinds()
    }

    #[test]
    fn leading() {
        assert_eq!(kinds("*0+1"), vec![Dereference, IntDecimal, Plus, IntDecimal]);
        assert_eq!(kinds("-3+5"), vec![Negate, IntDecimal, Plus, IntDecimal]);
    }

    #[test]
    fn binary_after_operands() {
        assert_eq!(kinds("a*b"), vec![Value, Star, Value]);
        assert_eq!(kinds("$eax-0x10"), vec![Register, Minus, IntHex]);
        assert_eq!(kinds("(1)*2"), vec![LParen, IntDecimal, RParen, Star, IntDecimal]);
    }

    #[test]
    fn after_operators() {
        assert_eq!(kinds("3-(-5)"), vec![IntDecimal, Minus, LParen, Negate, IntDecimal, RParen]);
        assert_eq!(kinds("2**$esp"), vec![IntDecimal, Star, Dereference, Register]);
        assert_eq!(kinds("--1"), vec![Negate, Negate, IntDecimal]);
        assert_eq!(kinds("!*a"), vec![Not, Dereference, Value]);
    }

    #[test]
    fn precedence_is_raised() {
        let mut tokens = tokenize("-*4").unwrap();
        disambiguate(&mut tokens);
        assert_eq!(tokens[0].precedence(), UNARY_PRECEDENCE);
        assert_eq!(tokens[1].precedence(), UNARY_PRECEDENCE);
    }

    #[test]
    fn other_tokens_untouched() {
        let mut tokens = tokenize("1 / !2").unwrap();
        let before = tokens.clone();
        disambiguate(&mut tokens);
        assert_eq!(tokens, before);
    }
}
