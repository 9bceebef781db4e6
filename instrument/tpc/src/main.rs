//! Tracepoint CLI.
//!
//! `tp instrument` rewrites a module so every function invocation records
//! its inputs and output; `tp run` executes the instrumented module in the
//! bundled runtime; `tp report` prints static signatures.

mod commands;

use std::path::PathBuf;
use std::sync::Once;

use commands::{
    instrument_file, parse_instrument_flag, report_file, run_file, InstrumentOptions,
};
use tp_passes::DEFAULT_RECORD_FILE;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Enable with `RUST_LOG=tp_passes=debug` or `RUST_LOG=tp_rt=debug`.
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}

fn main() {
    init_tracing();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    match args[1].as_str() {
        "instrument" => {
            let mut opts = InstrumentOptions::default();
            let mut path = None;
            let mut i = 2;
            while i < args.len() {
                let arg = &args[i];
                // -o takes its value from the next argument
                if arg == "-o" && i + 1 < args.len() {
                    opts.output = Some(PathBuf::from(&args[i + 1]));
                    i += 2;
                } else if parse_instrument_flag(&mut opts, arg) {
                    i += 1;
                } else if !arg.starts_with('-') && path.is_none() {
                    path = Some(arg.clone());
                    i += 1;
                } else {
                    eprintln!("error: unrecognized option `{arg}`");
                    std::process::exit(1);
                }
            }
            let Some(path) = path else {
                eprintln!("Usage: tp instrument <file.tir> [options]");
                std::process::exit(1);
            };
            instrument_file(&path, &opts);
        }
        "run" => {
            let mut opts = InstrumentOptions::default();
            let mut entry = "main".to_owned();
            let mut path = None;
            let mut fn_args = Vec::new();
            for arg in args.iter().skip(2) {
                if let Some(name) = arg.strip_prefix("--entry=") {
                    entry = name.to_owned();
                } else if parse_instrument_flag(&mut opts, arg) {
                    // consumed
                } else if arg.starts_with("--") {
                    eprintln!("error: unrecognized option `{arg}`");
                    std::process::exit(1);
                } else if path.is_none() {
                    path = Some(arg.clone());
                } else {
                    fn_args.push(arg.clone());
                }
            }
            let Some(path) = path else {
                eprintln!("Usage: tp run <file.tir> [options] [args...]");
                std::process::exit(1);
            };
            run_file(&path, &entry, &fn_args, &opts);
        }
        "report" => {
            let Some(path) = args.get(2) else {
                eprintln!("Usage: tp report <file.tir>");
                std::process::exit(1);
            };
            report_file(path);
        }
        "help" | "--help" | "-h" => print_usage(),
        other => {
            eprintln!("error: unknown command `{other}`");
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!("Usage: tp <command> [options]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  instrument <file.tir> [options]          Instrument and print the module");
    eprintln!("  run <file.tir> [options] [args...]       Instrument, then execute a function");
    eprintln!("  report <file.tir>                        Print one signature line per function");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --sink=console|file          Record destination (default: console)");
    eprintln!("  --record-output-file=PATH    File-sink path (default: {DEFAULT_RECORD_FILE})");
    eprintln!("  --policy=entry-once|bundled-per-exit");
    eprintln!("                               Emission policy (default chosen per sink)");
    eprintln!("  --call-count                 Also insert the per-function call counter");
    eprintln!("  --entry=NAME                 Function to run (default: main)");
    eprintln!("  -o PATH                      Write the instrumented module to PATH");
}
