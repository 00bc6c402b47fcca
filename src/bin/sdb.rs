extern crate sdb;
extern crate env_logger;
extern crate termcolor;
#[macro_use] extern crate log;
extern crate structopt;

use sdb::cpu::{Register, State};
use sdb::expr;
use sdb::expr::report;
use sdb::memory::{ArrayMemory, MmapMemory, VirtualMemory};
use sdb::monitor::Monitor;

use structopt::StructOpt;
use termcolor::{ColorChoice, StandardStream, WriteColor};
use std::{fs, io, process};
use std::error::Error;
use std::io::BufRead;
use std::num::ParseIntError;
use std::path::PathBuf;
use std::str::FromStr;

/// Parse a number that might be hexadecimal.
fn parse_hex(src: &str) -> Result<u32, ParseIntError> {
    if src.starts_with("0x") {
        u32::from_str_radix(&src[2..], 16)
    } else {
        u32::from_str(src)
    }
}

/// Parse a `name=value` pair.
fn parse_assignment(src: &str) -> Result<(String, u32), String> {
    let eq = src.find('=').ok_or_else(|| format!("expected `name=value`, got '{}'", src))?;
    let value = parse_hex(&src[eq + 1..]).map_err(|e| format!("invalid value in '{}': {}", src, e))?;
    Ok((src[..eq].to_string(), value))
}

#[derive(Debug, StructOpt)]
#[structopt(name = "sdb", about = "Evaluate debugger expressions against an i386 machine image.")]
struct Opt {
    /// Raw memory image to map into the guest address space.
    #[structopt(long = "image", parse(from_os_str))]
    image: Option<PathBuf>,

    /// Address to map the image at (can also be a hexadecimal value starting
    /// with `0x`). Also the initial value of `eip`.
    #[structopt(long = "base", default_value = "0x100000", parse(try_from_str = parse_hex))]
    base: u32,

    /// Set a register, for example `--reg eax=0x10`. Can be repeated.
    #[structopt(long = "reg", number_of_values = 1, parse(try_from_str = parse_assignment))]
    regs: Vec<(String, u32)>,

    /// Define a symbol, for example `--sym main=0x100020`. Can be repeated.
    #[structopt(long = "sym", number_of_values = 1, parse(try_from_str = parse_assignment))]
    syms: Vec<(String, u32)>,

    /// Read symbols from the output of `nm`.
    #[structopt(long = "symbols", parse(from_os_str))]
    symbols: Option<PathBuf>,

    /// Evaluate unknown symbols to 0xffffffff instead of failing.
    #[structopt(long = "lenient-symbols")]
    lenient_symbols: bool,

    /// How to print results (hex, dec or both).
    #[structopt(long = "format", default_value = "both")]
    format: Format,

    /// Print all registers before evaluating anything.
    #[structopt(long = "info-registers")]
    info_registers: bool,

    /// Expressions to evaluate. When none are given, one expression per line
    /// is read from stdin.
    expressions: Vec<String>,
}

#[derive(Debug, Copy, Clone)]
enum Format {
    Hex,
    Dec,
    Both,
}

impl Format {
    fn print(&self, value: u32) {
        match self {
            Format::Hex => println!("{:#x}", value),
            Format::Dec => println!("{}", value),
            Format::Both => println!("{:#010x}  {}", value, value),
        }
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, String> {
        Ok(match s {
            "hex" => Format::Hex,
            "dec" => Format::Dec,
            "both" => Format::Both,
            _ => return Err(format!("invalid format: {}", s)),
        })
    }
}

/// Evaluates and prints a single expression. Returns whether it succeeded.
fn evaluate<M, W>(monitor: &Monitor<M>, expr: &str, format: Format, stderr: &mut W) -> io::Result<bool>
where
    M: VirtualMemory,
    W: WriteColor,
{
    match monitor.evaluate(expr) {
        Ok(value) => {
            format.print(value);
            Ok(true)
        }
        Err(e) => {
            report::print_error(stderr, expr, &e)?;
            Ok(false)
        }
    }
}

fn session<M: VirtualMemory>(opt: &Opt, mut monitor: Monitor<M>, image: Option<&[u8]>) -> Result<bool, Box<dyn Error>> {
    if let (Some(image), Some(path)) = (image, &opt.image) {
        monitor.load_image(opt.base, image, &path.display().to_string())?;
    }

    if let Some(path) = &opt.symbols {
        let listing = fs::read_to_string(path)?;
        let count = monitor.symbols_mut().extend_from_nm(&listing)?;
        info!("read {} symbols from {}", count, path.display());
    }
    for (name, value) in &opt.syms {
        monitor.symbols_mut().insert(name.as_str(), *value);
    }

    let mut options = monitor.options();
    options.lenient_symbols = opt.lenient_symbols;
    monitor.set_options(options);

    if opt.info_registers {
        print!("{}", monitor.state());
    }

    let stderr = StandardStream::stderr(ColorChoice::Auto);
    let mut stderr = stderr.lock();
    let mut ok = true;
    if opt.expressions.is_empty() {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = line?;
            let expr = line.trim();
            if expr.is_empty() {
                continue;
            }
            ok &= evaluate(&monitor, expr, opt.format, &mut stderr)?;
        }
    } else {
        for expr in &opt.expressions {
            ok &= evaluate(&monitor, expr, opt.format, &mut stderr)?;
        }
    }

    Ok(ok)
}

fn run() -> Result<bool, Box<dyn Error>> {
    let opt = Opt::from_args();
    expr::init();

    let mut state = State::new(opt.base, 0);
    for (name, value) in &opt.regs {
        let reg = Register::from_name(name).ok_or_else(|| format!("unknown register '{}'", name))?;
        state.set_register(reg, *value);
    }

    match &opt.image {
        Some(path) => {
            let image = fs::read(path)?;
            match MmapMemory::new() {
                Ok(mem) => session(&opt, Monitor::new(state, mem), Some(&image[..])),
                Err(e) => {
                    warn!("cannot reserve the guest address space ({}), using a heap buffer", e);
                    session(&opt, Monitor::new(state, ArrayMemory::new(Vec::new())), Some(&image[..]))
                }
            }
        }
        None => session(&opt, Monitor::new(state, ArrayMemory::new(Vec::new())), None),
    }
}

fn main() {
    // By default, only log warnings and errors
    env_logger::Builder::from_default_env()
        .filter(None, log::LevelFilter::Warn)
        .init();

    match run() {
        Ok(true) => {},
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("exiting due to error: {}", e);
            process::exit(1);
        },
    }
}
