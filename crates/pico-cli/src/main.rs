//! `pico` — loads a `.pbc` bytecode file, discovers native extension
//! libraries, and runs the unit to completion (§6.3).
//!
//! Thin entry point: `main` parses arguments, installs logging, and
//! hands off to [`run`], which does the real work and returns a
//! `Result` the way the rest of the workspace does. `main` is the one
//! place allowed to print a bare diagnostic and set a nonzero exit code.

mod error;

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use error::Result;
use pico_gc::GcConfig;
use pico_vm::{disasm, env::Environment, interpreter::Vm, loader};

/// Pico — a small bytecode virtual machine.
#[derive(Parser, Debug)]
#[command(name = "pico")]
#[command(author = "Pico Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Loads and runs a Pico bytecode unit", long_about = None)]
struct Cli {
    /// Path to the `.pbc` bytecode file to run.
    #[arg(default_value = "./out.pbc")]
    bytecode: PathBuf,

    /// Directory to scan for native extension libraries.
    #[arg(default_value = "./lib")]
    lib_dir: PathBuf,

    /// Enable debug-level logging (maps to `RUST_LOG=debug` if unset).
    #[arg(short, long, global = true, env = "PICO_VERBOSE")]
    verbose: bool,

    /// Disassemble the loaded unit instead of executing it.
    #[arg(long)]
    disassemble: bool,

    /// Print GC statistics to stderr on shutdown.
    #[arg(long)]
    gc_stats: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "debug" } else { "info" })
    });
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init();
}

fn run(cli: Cli) -> Result<()> {
    let unit = loader::load(&cli.bytecode)?;

    if cli.disassemble {
        print!("{}", disasm::disassemble(&unit.functions, &unit.constants));
        return Ok(());
    }

    let mut env = Environment::new(GcConfig::from_env()).map_err(pico_vm::VmError::from)?;

    pico_ext::load_libraries(&cli.lib_dir, &mut env)?;
    loader::validate_extern_imports(&unit, &env.registry)?;

    let main_index = unit.main_index;
    let mut vm = Vm::new(unit);
    tracing::info!(bytecode = %cli.bytecode.display(), main_index, "pico: starting root frame");
    vm.run(&mut env)?;

    if cli.gc_stats {
        let stats = env.gc.stats();
        eprintln!(
            "gc: {} collection(s), {} growth(s), {} byte(s) live after last cycle (high water {})",
            stats.collections, stats.growths, stats.bytes_copied_last_cycle, stats.high_water_mark
        );
    }

    env.shutdown();
    Ok(())
}
