extern crate sdb;

use sdb::cpu::State;
use sdb::expr::{self, Context, ExprError, Options, UNKNOWN_SYMBOL_VALUE};
use sdb::memory::{ArrayMemory, MemoryError, VirtualMemory};
use sdb::symbols::SymbolMap;

struct Machine {
    state: State,
    mem: ArrayMemory,
    syms: SymbolMap,
}

impl Machine {
    fn new() -> Self {
        let mut state = State::new(0x0040_0000, 0x7c00);
        state.set_eax(0x1234_5678);
        state.set_ecx(3);

        let mut mem = ArrayMemory::new(Vec::new());
        mem.add_mapping(0..=0xFF, &[0x78, 0x56, 0x34, 0x12, 0x10, 0, 0, 0], "low").unwrap();

        let mut syms = SymbolMap::new();
        syms.insert("main", 0x0040_0020);

        Self { state, mem, syms }
    }

    fn eval(&self, expr: &str) -> Result<u32, ExprError> {
        expr::evaluate(expr, &self.state, &self.mem, &self.syms)
    }

    fn eval_lenient(&self, expr: &str) -> Result<u32, ExprError> {
        Context::new(&self.state, &self.mem, &self.syms)
            .with_options(Options { lenient_symbols: true })
            .evaluate(expr)
    }
}

fn eval(expr: &str) -> Result<u32, ExprError> {
    Machine::new().eval(expr)
}

#[test]
fn literals() {
    assert_eq!(eval("123"), Ok(123));
    assert_eq!(eval("0x1A"), Ok(26));
    assert_eq!(eval("0XfF"), Ok(255));
    assert_eq!(eval("  42\t"), Ok(42));
    assert_eq!(eval("4294967295"), Ok(0xFFFF_FFFF));
}

#[test]
fn precedence_and_grouping() {
    assert_eq!(eval("2+3*4"), Ok(14));
    assert_eq!(eval("(2+3)*4"), Ok(20));
    assert_eq!(eval("((7))"), Ok(7));
    assert_eq!(eval("(1+2)*(3+4)"), Ok(21));
    assert_eq!(eval("1+2==3"), Ok(1));
}

#[test]
fn left_associative() {
    assert_eq!(eval("8-3-2"), Ok(3));
    assert_eq!(eval("100/10/5"), Ok(2));
}

#[test]
fn unary_operators() {
    assert_eq!(eval("-3+5"), Ok(2));
    assert_eq!(eval("3-(-5)"), Ok(8));
    assert_eq!(eval("2*-3"), Ok(-6i32 as u32));
    assert_eq!(eval("--1"), Ok(1));
    assert_eq!(eval("!0"), Ok(1));
    assert_eq!(eval("!5"), Ok(0));
    assert_eq!(eval("!!5"), Ok(1));
}

#[test]
fn dereference() {
    assert_eq!(eval("*0+1"), Ok(0x1234_5679));
    assert_eq!(eval("*4"), Ok(0x10));
    assert_eq!(eval("**4"), Ok(0));
    assert_eq!(eval("*(2+2)*2"), Ok(0x20));
}

#[test]
fn dereference_fault() {
    assert_eq!(eval("*0x5000"), Err(ExprError::Memory {
        address: 0x5000,
        error: MemoryError::Fault(0x5000),
    }));
}

#[test]
fn comparisons_and_logic() {
    assert_eq!(eval("1==1"), Ok(1));
    assert_eq!(eval("1!=1"), Ok(0));
    assert_eq!(eval("0||1&&0"), Ok(0));
    assert_eq!(eval("1||0&&0"), Ok(1));
    assert_eq!(eval("5&&7"), Ok(1));
}

#[test]
fn wrapping_arithmetic() {
    assert_eq!(eval("0-1"), Ok(0xFFFF_FFFF));
    assert_eq!(eval("0xFFFFFFFF+2"), Ok(1));
    assert_eq!(eval("0x10000*0x10000"), Ok(0));
}

#[test]
fn signed_division() {
    assert_eq!(eval("-7/2"), Ok(-3i32 as u32));
    assert_eq!(eval("7/-2"), Ok(-3i32 as u32));
    assert_eq!(eval("0x80000000/-1"), Ok(0x8000_0000));
    assert_eq!(eval("10/0"), Err(ExprError::DivisionByZero { offset: 2 }));
}

#[test]
fn registers() {
    let machine = Machine::new();
    assert_eq!(machine.eval("$eax"), Ok(0x1234_5678));
    assert_eq!(machine.eval("$ax"), Ok(0x5678));
    assert_eq!(machine.eval("$ah"), Ok(0x56));
    assert_eq!(machine.eval("$al"), Ok(0x78));
    assert_eq!(machine.eval("$eip==4194304"), Ok(1));
    assert_eq!(machine.eval("$esp"), Ok(0x7c00));
    assert_eq!(machine.eval("$eax+4*$ecx"), Ok(0x1234_5684));
    assert_eq!(machine.eval("$eflags"), Ok(0x2));
    assert_eq!(machine.eval("$foo"), Err(ExprError::UnknownRegister {
        name: "foo".to_string(),
        offset: 0,
    }));
}

#[test]
fn symbols() {
    let machine = Machine::new();
    assert_eq!(machine.eval("main"), Ok(0x0040_0020));
    assert_eq!(machine.eval("main-$eip"), Ok(0x20));
    assert_eq!(machine.eval("1+nope"), Err(ExprError::UnknownSymbol {
        name: "nope".to_string(),
        offset: 2,
    }));
    assert_eq!(machine.eval_lenient("nope"), Ok(UNKNOWN_SYMBOL_VALUE));
    assert_eq!(machine.eval_lenient("main"), Ok(0x0040_0020));
}

#[test]
fn malformed() {
    assert_eq!(eval(""), Err(ExprError::EmptyOperand));
    assert_eq!(eval("1+"), Err(ExprError::EmptyOperand));
    assert_eq!(eval("()"), Err(ExprError::EmptyOperand));
    assert_eq!(eval("(2+3"), Err(ExprError::UnbalancedParens { offset: 0 }));
    assert_eq!(eval("2+3)"), Err(ExprError::UnbalancedParens { offset: 3 }));
    assert_eq!(eval("3 4"), Err(ExprError::MissingOperator { offset: 0 }));
    assert_eq!(eval("(1)(2)"), Err(ExprError::MissingOperator { offset: 0 }));
    assert_eq!(eval("+3"), Err(ExprError::NotUnary { token: "+".to_string(), offset: 0 }));
    assert_eq!(eval("4294967296"), Err(ExprError::InvalidLiteral {
        text: "4294967296".to_string(),
        offset: 0,
    }));
}

#[test]
fn lexical_errors() {
    let err = eval("1 % 2").unwrap_err();
    assert!(err.is_lexical());
    assert_eq!(err.offset(), Some(2));

    let long = vec!["1"; 17].join("+");
    let err = eval(&long).unwrap_err();
    assert_eq!(err, ExprError::TooManyTokens { offset: 32 });
    assert!(err.is_lexical());
}

#[test]
fn repeatable() {
    let machine = Machine::new();
    for _ in 0..3 {
        assert_eq!(machine.eval("*$esp/0"), machine.eval("*$esp/0"));
        assert_eq!(machine.eval("(1+2)*$ecx"), Ok(9));
    }
}
