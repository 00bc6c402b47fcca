//! Debugger expression evaluation.
//!
//! Expressions are evaluated in three stages: the `lexer` splits the input
//! into `Tokens` using the ordered `rules` table, `unary::disambiguate`
//! reclassifies prefix `*` and `-`, and the `Evaluator` reduces the token
//! stream to a `u32`.
//!
//! Operands are decimal and `0x` hexadecimal literals, `$`-prefixed register
//! names and bare symbol names. Binary operators, loosest first:
//!
//! | Precedence | Operators       |
//! |------------|-----------------|
//! | 1          | `\|\|`          |
//! | 2          | `&&`            |
//! | 3          | `==` `!=`       |
//! | 4          | `+` `-`         |
//! | 5          | `*` `/`         |
//! | 6 (prefix) | `!` `*` `-`     |
//!
//! Arithmetic wraps at 32 bits, `/` divides signed. Comparisons and logical
//! operators produce 0 or 1 and never short-circuit.
//!
//! ```
//! use sdb::cpu::State;
//! use sdb::expr;
//! use sdb::memory::ArrayMemory;
//! use sdb::symbols::SymbolMap;
//!
//! let mut state = State::new(0x100000, 0x7c00);
//! state.set_eax(5);
//! let mem = ArrayMemory::new(Vec::new());
//! let syms = SymbolMap::new();
//!
//! assert_eq!(expr::evaluate("$eax * 2 + 1", &state, &mem, &syms), Ok(11));
//! assert_eq!(expr::evaluate("$eip == 0x100000", &state, &mem, &syms), Ok(1));
//! ```

mod error;
mod eval;
pub mod lexer;
pub mod report;
pub mod rules;
pub mod token;
pub mod unary;

pub use self::error::ExprError;
pub use self::eval::{Evaluator, UNKNOWN_SYMBOL_VALUE};
pub use self::lexer::tokenize;

use cpu::RegisterFile;
use memory::VirtualMemory;
use symbols::SymbolTable;

/// Evaluation options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
    /// Evaluate unknown symbols to `UNKNOWN_SYMBOL_VALUE` instead of failing.
    pub lenient_symbols: bool,
}

/// The machine an expression is evaluated against.
#[derive(Debug)]
pub struct Context<'a, R: 'a, M: 'a, S: 'a> {
    registers: &'a R,
    memory: &'a M,
    symbols: &'a S,
    options: Options,
}

impl<'a, R, M, S> Context<'a, R, M, S>
where
    R: RegisterFile,
    M: VirtualMemory,
    S: SymbolTable,
{
    pub fn new(registers: &'a R, memory: &'a M, symbols: &'a S) -> Self {
        Self {
            registers,
            memory,
            symbols,
            options: Options::default(),
        }
    }

    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> Options {
        self.options
    }

    /// Evaluates `expr`.
    ///
    /// Nothing is cached between calls, the same expression against the same
    /// machine state always produces the same result.
    pub fn evaluate(&self, expr: &str) -> Result<u32, ExprError> {
        let mut tokens = tokenize(expr)?;
        unary::disambiguate(&mut tokens);
        debug!("evaluating {}", tokens);

        let value = Evaluator::new(&tokens, self).run()?;
        debug!("{} = {:#x}", expr, value);
        Ok(value)
    }
}

/// Evaluates `expr` with default options.
pub fn evaluate<R, M, S>(expr: &str, registers: &R, memory: &M, symbols: &S) -> Result<u32, ExprError>
where
    R: RegisterFile,
    M: VirtualMemory,
    S: SymbolTable,
{
    Context::new(registers, memory, symbols).evaluate(expr)
}

/// Prepares the tokenizer.
///
/// Calling this is optional, the rule table is otherwise compiled on first
/// use. A broken rule table panics here instead of in the middle of a
/// session.
pub fn init() {
    rules::init();
}
