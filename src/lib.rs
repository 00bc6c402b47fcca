//! Expression evaluator for the monitor of an i386 emulator.
//!
//! The monitor inspects a paused guest: its `cpu::State`, its guest memory
//! (any `memory::VirtualMemory`) and an optional symbol table. Debugger
//! commands take arithmetic expressions like `*($esp + 4) == main` that are
//! evaluated by the `expr` module to a 32-bit value.

#![doc(html_root_url = "https://docs.rs/sdb/0.1.0")]
#![warn(missing_debug_implementations)]

#[macro_use] extern crate bitflags;
#[macro_use] extern crate lazy_static;
#[macro_use] extern crate log;
#[macro_use] extern crate num_derive;
extern crate num_traits;
extern crate memmap;
extern crate regex;
extern crate termcolor;

pub mod cpu;
pub mod expr;
pub mod memory;
pub mod monitor;
pub mod symbols;
