//! Recursive evaluation of a disambiguated token stream.
//!
//! There's no parse tree. `eval(l, r)` reduces the inclusive token range
//! `[l, r]` directly:
//!
//! * A single token is a literal, register or symbol.
//! * A range fully wrapped in a matching pair of parentheses evaluates to its
//!   contents.
//! * Otherwise the range is split at its *dominant operator*: the operator
//!   outside of any parentheses with the lowest precedence. On ties the
//!   rightmost one is chosen, which makes binary operators left-associative
//!   (`8-3-2` splits into `8-3` and `2`).

use cpu::RegisterFile;
use expr::{Context, ExprError};
use expr::token::{Token, TokenKind, Tokens};
use memory::{Segment, VirtualMemory};
use symbols::SymbolTable;

/// Value substituted for unknown symbols when `Options::lenient_symbols` is
/// set.
pub const UNKNOWN_SYMBOL_VALUE: u32 = 0xFFFF_FFFF;

/// Evaluates a token stream against a machine context.
#[derive(Debug)]
pub struct Evaluator<'a, R: 'a, M: 'a, S: 'a> {
    tokens: &'a [Token],
    ctx: &'a Context<'a, R, M, S>,
}

impl<'a, R, M, S> Evaluator<'a, R, M, S>
where
    R: RegisterFile,
    M: VirtualMemory,
    S: SymbolTable,
{
    /// Creates an evaluator for `tokens`, which should already have been
    /// passed through `unary::disambiguate`.
    pub fn new(tokens: &'a Tokens, ctx: &'a Context<'a, R, M, S>) -> Self {
        Self {
            tokens: tokens.as_slice(),
            ctx,
        }
    }

    /// Evaluates the whole token stream.
    pub fn run(&self) -> Result<u32, ExprError> {
        if self.tokens.is_empty() {
            return Err(ExprError::EmptyOperand);
        }

        self.check_balance()?;
        self.eval(0, self.tokens.len() - 1)
    }

    fn check_balance(&self) -> Result<(), ExprError> {
        let mut open = Vec::new();
        for token in self.tokens {
            match token.kind() {
                TokenKind::LParen => open.push(token.offset()),
                TokenKind::RParen => {
                    if open.pop().is_none() {
                        return Err(ExprError::UnbalancedParens { offset: token.offset() });
                    }
                }
                _ => {}
            }
        }

        match open.pop() {
            Some(offset) => Err(ExprError::UnbalancedParens { offset }),
            None => Ok(()),
        }
    }

    fn eval(&self, l: usize, r: usize) -> Result<u32, ExprError> {
        if l > r {
            return Err(ExprError::EmptyOperand);
        }

        let value = if l == r {
            self.leaf(&self.tokens[l])?
        } else if self.is_enclosed(l, r) {
            self.eval(l + 1, r - 1)?
        } else {
            let op = self.dominant_operator(l, r)
                .ok_or_else(|| ExprError::MissingOperator { offset: self.tokens[l].offset() })?;

            if op == l || self.tokens[op].kind().is_unary() {
                self.unary(l, r)?
            } else {
                self.binary(l, op, r)?
            }
        };

        trace!("eval({}, {}) = {:#x}", l, r, value);
        Ok(value)
    }

    /// Resolves a single operand token.
    fn leaf(&self, token: &Token) -> Result<u32, ExprError> {
        let parse = |digits: &str, radix| {
            u32::from_str_radix(digits, radix).map_err(|_| ExprError::InvalidLiteral {
                text: token.text().to_string(),
                offset: token.offset(),
            })
        };

        match token.kind() {
            TokenKind::IntDecimal => parse(token.text(), 10),
            TokenKind::IntHex => parse(&token.text()[2..], 16),
            TokenKind::Register => {
                self.ctx.registers.read_register(token.text()).ok_or_else(|| ExprError::UnknownRegister {
                    name: token.text().to_string(),
                    offset: token.offset(),
                })
            }
            TokenKind::Value => match self.ctx.symbols.resolve(token.text()) {
                Some(value) => Ok(value),
                None if self.ctx.options.lenient_symbols => {
                    debug!("unknown symbol '{}', using {:#x}", token.text(), UNKNOWN_SYMBOL_VALUE);
                    Ok(UNKNOWN_SYMBOL_VALUE)
                }
                None => Err(ExprError::UnknownSymbol {
                    name: token.text().to_string(),
                    offset: token.offset(),
                }),
            },
            _ => Err(ExprError::UnexpectedToken {
                token: token.to_string(),
                offset: token.offset(),
            }),
        }
    }

    /// Applies the prefix operator at `l` to the value of `[l+1, r]`.
    fn unary(&self, l: usize, r: usize) -> Result<u32, ExprError> {
        let op = &self.tokens[l];
        match op.kind() {
            TokenKind::Dereference => {
                let address = self.eval(l + 1, r)?;
                self.ctx.memory.read(address, 4, Segment::Ds)
                    .map_err(|error| ExprError::Memory { address, error })
            }
            TokenKind::Negate => Ok(self.eval(l + 1, r)?.wrapping_neg()),
            TokenKind::Not => Ok((self.eval(l + 1, r)? == 0) as u32),
            _ => Err(ExprError::NotUnary {
                token: op.to_string(),
                offset: op.offset(),
            }),
        }
    }

    /// Applies the binary operator at `op`. Both sides are always evaluated,
    /// `&&` and `||` don't short-circuit.
    fn binary(&self, l: usize, op: usize, r: usize) -> Result<u32, ExprError> {
        let lhs = self.eval(l, op - 1)?;
        let rhs = self.eval(op + 1, r)?;

        let token = &self.tokens[op];
        Ok(match token.kind() {
            TokenKind::Plus => lhs.wrapping_add(rhs),
            TokenKind::Minus => lhs.wrapping_sub(rhs),
            TokenKind::Star => lhs.wrapping_mul(rhs),
            TokenKind::Slash => {
                if rhs == 0 {
                    return Err(ExprError::DivisionByZero { offset: token.offset() });
                }
                // signed, truncating towards zero
                (lhs as i32).wrapping_div(rhs as i32) as u32
            }
            TokenKind::Eq => (lhs == rhs) as u32,
            TokenKind::Neq => (lhs != rhs) as u32,
            TokenKind::And => (lhs != 0 && rhs != 0) as u32,
            TokenKind::Or => (lhs != 0 || rhs != 0) as u32,
            _ => return Err(ExprError::UnexpectedToken {
                token: token.to_string(),
                offset: token.offset(),
            }),
        })
    }

    /// Whether `[l, r]` is wrapped in a single matching pair of parentheses.
    ///
    /// `(1)+(2)` starts and ends with parentheses, but they don't match.
    fn is_enclosed(&self, l: usize, r: usize) -> bool {
        if self.tokens[l].kind() != TokenKind::LParen || self.tokens[r].kind() != TokenKind::RParen {
            return false;
        }

        let mut depth = 0i32;
        for token in &self.tokens[l + 1..r] {
            match token.kind() {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    depth -= 1;
                    if depth < 0 {
                        return false;
                    }
                }
                _ => {}
            }
        }

        depth == 0
    }

    /// Whether token `i` is inside a parenthesis opened within `[l, i)`.
    fn is_nested(&self, l: usize, i: usize) -> bool {
        let mut depth = 0;
        for token in self.tokens[l..i].iter().rev() {
            match token.kind() {
                TokenKind::LParen if depth == 0 => return true,
                TokenKind::LParen => depth -= 1,
                TokenKind::RParen => depth += 1,
                _ => {}
            }
        }

        false
    }

    /// Finds the operator `[l, r]` should be split at.
    fn dominant_operator(&self, l: usize, r: usize) -> Option<usize> {
        let mut dominant: Option<usize> = None;
        for i in l..=r {
            let token = &self.tokens[i];
            if !token.kind().is_operator() || self.is_nested(l, i) {
                continue;
            }

            match dominant {
                Some(d) if self.tokens[d].precedence() < token.precedence() => {}
                _ => dominant = Some(i),
            }
        }

        dominant
    }
}
