use memory::MemoryError;

use std::error::Error;
use std::fmt;

/// An error that can occur while evaluating an expression.
///
/// Offsets are byte offsets into the expression string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprError {
    /// No tokenizer rule matches at `offset`.
    NoMatch {
        offset: usize,
        /// The unscanned rest of the expression.
        remaining: String,
    },
    /// The expression has more tokens than fit in a token stream.
    TooManyTokens { offset: usize },
    /// An operator is missing an operand, or the expression is empty.
    EmptyOperand,
    /// A parenthesis at `offset` has no partner.
    UnbalancedParens { offset: usize },
    /// Operands follow each other without an operator in between.
    MissingOperator { offset: usize },
    /// A token that isn't a prefix operator was used as one.
    NotUnary { token: String, offset: usize },
    /// A token appeared where an operand was expected.
    UnexpectedToken { token: String, offset: usize },
    /// A numeric literal doesn't fit in 32 bits.
    InvalidLiteral { text: String, offset: usize },
    UnknownRegister { name: String, offset: usize },
    UnknownSymbol { name: String, offset: usize },
    /// The right-hand side of the `/` at `offset` evaluated to 0.
    DivisionByZero { offset: usize },
    /// Dereferencing `address` failed.
    Memory { address: u32, error: MemoryError },
}

impl ExprError {
    /// Returns the position in the expression this error refers to, if any.
    pub fn offset(&self) -> Option<usize> {
        use self::ExprError::*;

        match self {
            NoMatch { offset, .. } |
            TooManyTokens { offset } |
            UnbalancedParens { offset } |
            MissingOperator { offset } |
            NotUnary { offset, .. } |
            UnexpectedToken { offset, .. } |
            InvalidLiteral { offset, .. } |
            UnknownRegister { offset, .. } |
            UnknownSymbol { offset, .. } |
            DivisionByZero { offset } => Some(*offset),
            EmptyOperand | Memory { .. } => None,
        }
    }

    /// Whether the expression was rejected by the tokenizer.
    pub fn is_lexical(&self) -> bool {
        match self {
            ExprError::NoMatch { .. } | ExprError::TooManyTokens { .. } => true,
            _ => false,
        }
    }
}

impl fmt::Display for ExprError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::ExprError::*;

        match self {
            NoMatch { offset, remaining } => write!(f, "no match at position {}: '{}'", offset, remaining),
            TooManyTokens { offset } => write!(f, "expression too long (more than {} tokens at position {})", ::expr::token::MAX_TOKENS, offset),
            EmptyOperand => write!(f, "missing operand"),
            UnbalancedParens { offset } => write!(f, "unbalanced parenthesis at position {}", offset),
            MissingOperator { offset } => write!(f, "expected an operator in expression starting at position {}", offset),
            NotUnary { token, .. } => write!(f, "'{}' is not a unary operator", token),
            UnexpectedToken { token, .. } => write!(f, "unexpected '{}'", token),
            InvalidLiteral { text, .. } => write!(f, "invalid number '{}'", text),
            UnknownRegister { name, .. } => write!(f, "unknown register '${}'", name),
            UnknownSymbol { name, .. } => write!(f, "no symbol '{}' in current context", name),
            DivisionByZero { .. } => write!(f, "division by zero"),
            Memory { address, error } => write!(f, "cannot dereference {:#010x}: {}", address, error),
        }
    }
}

impl Error for ExprError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ExprError::Memory { error, .. } => Some(error),
            _ => None,
        }
    }
}
