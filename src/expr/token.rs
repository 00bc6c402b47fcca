//! Tokens and bounded token streams.

use std::fmt;
use std::ops::Index;

/// Maximum number of tokens in a single expression.
pub const MAX_TOKENS: usize = 32;

/// Maximum length of a token's text in bytes. Longer text is truncated.
pub const MAX_TOKEN_LEN: usize = 31;

/// Precedence given to the unary operators created by disambiguation.
///
/// Binds tighter than `*` and `/`.
pub const UNARY_PRECEDENCE: u8 = 6;

/// Classification of a token.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum TokenKind {
    /// Spaces between tokens. Only appears in the rule table, never in a
    /// token stream.
    Whitespace,
    /// Decimal integer literal.
    IntDecimal,
    /// Hexadecimal integer literal with `0x` or `0X` prefix.
    IntHex,
    /// `$name`. The token text is the name without the `$`.
    Register,
    /// Bare identifier, resolved through the symbol table.
    Value,
    /// `||`
    Or,
    /// `&&`
    And,
    /// `==`
    Eq,
    /// `!=`
    Neq,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*` (multiplication)
    Star,
    /// `/`
    Slash,
    /// `!`
    Not,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// Unary `*`: reads memory at the operand's address.
    Dereference,
    /// Unary `-`: two's complement negation.
    Negate,
}

impl TokenKind {
    /// Whether this token is a value on its own (a literal, register or
    /// identifier).
    pub fn is_operand(&self) -> bool {
        match self {
            TokenKind::IntDecimal | TokenKind::IntHex | TokenKind::Register | TokenKind::Value => true,
            _ => false,
        }
    }

    /// Whether this token is a unary or binary operator. Parentheses are not
    /// operators.
    pub fn is_operator(&self) -> bool {
        match self {
            TokenKind::Whitespace | TokenKind::LParen | TokenKind::RParen => false,
            _ => !self.is_operand(),
        }
    }

    /// Whether this token is always applied as a prefix operator.
    pub fn is_unary(&self) -> bool {
        match self {
            TokenKind::Dereference | TokenKind::Negate | TokenKind::Not => true,
            _ => false,
        }
    }
}

/// A classified lexical unit of an expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    kind: TokenKind,
    precedence: u8,
    text: String,
    offset: usize,
}

impl Token {
    /// Creates a token, truncating `text` to `MAX_TOKEN_LEN` bytes.
    ///
    /// # Parameters
    ///
    /// * `kind`: Token classification.
    /// * `precedence`: Binding strength for operators (smaller binds looser).
    ///   Ignored for operands.
    /// * `text`: Matched source text (without a register's `$`).
    /// * `offset`: Byte offset of the token in the expression.
    pub fn new(kind: TokenKind, precedence: u8, text: &str, offset: usize) -> Self {
        let mut len = text.len().min(MAX_TOKEN_LEN);
        while !text.is_char_boundary(len) {
            len -= 1;
        }
        if len < text.len() {
            debug!("truncating token '{}' to {} bytes", text, len);
        }

        Self {
            kind,
            precedence,
            text: text[..len].to_string(),
            offset,
        }
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn precedence(&self) -> u8 {
        self.precedence
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Reclassifies this token as a unary operator.
    pub(crate) fn make_unary(&mut self, kind: TokenKind) {
        self.kind = kind;
        self.precedence = UNARY_PRECEDENCE;
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.kind == TokenKind::Register {
            f.write_str("$")?;
        }
        f.write_str(&self.text)
    }
}

/// An ordered token sequence holding at most `MAX_TOKENS` tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokens {
    tokens: Vec<Token>,
}

impl Tokens {
    pub fn new() -> Self {
        Self {
            tokens: Vec::with_capacity(MAX_TOKENS),
        }
    }

    /// Appends a token.
    ///
    /// If the stream is already full, the token is handed back as the error.
    pub fn push(&mut self, token: Token) -> Result<(), Token> {
        if self.tokens.len() >= MAX_TOKENS {
            return Err(token);
        }
        self.tokens.push(token);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn as_slice(&self) -> &[Token] {
        &self.tokens
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [Token] {
        &mut self.tokens
    }

    /// Returns the kinds of all tokens, in order.
    pub fn kinds(&self) -> Vec<TokenKind> {
        self.tokens.iter().map(Token::kind).collect()
    }
}

impl Index<usize> for Tokens {
    type Output = Token;

    fn index(&self, index: usize) -> &Token {
        &self.tokens[index]
    }
}

/// Prints the tokens separated by spaces.
impl fmt::Display for Tokens {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, token) in self.tokens.iter().enumerate() {
            if i != 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", token)?;
        }
        Ok(())
    }
}
