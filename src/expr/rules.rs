//! The ordered pattern table driving the tokenizer.
//!
//! Rules are tried top to bottom and the first one matching at the current
//! position wins, so order matters: the catch-all identifier rule must come
//! last, and `||`, `&&`, `==` and `!=` must precede their one-character
//! prefixes.

use expr::token::TokenKind;

use regex::Regex;

/// A tokenizer rule.
#[derive(Debug)]
pub struct Rule {
    /// Regular expression, implicitly anchored at the current position.
    pub pattern: &'static str,
    pub kind: TokenKind,
    /// Precedence of the produced token (smaller binds looser).
    pub precedence: u8,
}

macro_rules! rules {
    ( $( $pattern:expr => $kind:ident, $prec:expr; )+ ) => {
        &[ $( Rule { pattern: $pattern, kind: TokenKind::$kind, precedence: $prec }, )+ ]
    };
}

/// All rules, in matching order.
pub static RULES: &[Rule] = rules! {
    r"[0-9]+\b"             => IntDecimal, 0;
    r"0[xX][0-9a-fA-F]+\b"  => IntHex, 0;
    r"\$[a-zA-Z]+"          => Register, 0;
    r"[ \t]+"               => Whitespace, 0;
    r"\|\|"                 => Or, 1;
    r"&&"                   => And, 2;
    r"=="                   => Eq, 3;
    r"!="                   => Neq, 3;
    r"\+"                   => Plus, 4;
    r"-"                    => Minus, 4;
    r"\*"                   => Star, 5;
    r"/"                    => Slash, 5;
    r"!"                    => Not, 6;
    r"\("                   => LParen, 7;
    r"\)"                   => RParen, 7;
    r"\b[a-zA-Z_0-9]+"      => Value, 0;
};

lazy_static! {
    static ref COMPILED: Vec<Regex> = {
        debug!("compiling {} tokenizer rules", RULES.len());
        RULES.iter()
            .map(|rule| {
                Regex::new(&format!("^(?:{})", rule.pattern))
                    .unwrap_or_else(|e| panic!("tokenizer rule `{}` failed to compile: {}", rule.pattern, e))
            })
            .collect()
    };
}

/// Compiles the rule table if that hasn't happened yet.
pub fn init() {
    ::lazy_static::initialize(&COMPILED);
}

/// A successful rule match.
#[derive(Debug, Copy, Clone)]
pub struct Match {
    /// Index of the matching rule in `RULES`.
    pub index: usize,
    pub rule: &'static Rule,
    /// Length of the matched text in bytes.
    pub len: usize,
}

/// Finds the first rule matching at the start of `input`.
///
/// `input` should be the unscanned remainder of the expression, so patterns
/// can't see what precedes the current position.
pub fn find(input: &str) -> Option<Match> {
    COMPILED.iter()
        .zip(RULES)
        .enumerate()
        .filter_map(|(index, (regex, rule))| {
            regex.find(input).map(|m| Match { index, rule, len: m.end() })
        })
        .next()
}
