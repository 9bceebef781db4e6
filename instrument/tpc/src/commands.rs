//! Subcommand implementations.

use std::path::PathBuf;

use tp_ir::{parse_module, Module, Ty};
use tp_passes::{
    CallCounterPass, EmissionPolicy, FunctionIoPass, FunctionPass as _, PassManager,
    SignatureReportPass, TraceConfig, DEFAULT_RECORD_FILE,
};
use tp_rt::{Machine, RtValue};

/// Instrumentation options shared by `instrument` and `run`.
#[derive(Debug, Default)]
pub struct InstrumentOptions {
    pub file_sink: bool,
    pub record_file: Option<String>,
    pub policy: Option<EmissionPolicy>,
    pub call_count: bool,
    pub output: Option<PathBuf>,
}

/// Try to consume one `--flag` style option. Returns `false` when the
/// argument is not an instrumentation flag.
pub fn parse_instrument_flag(opts: &mut InstrumentOptions, arg: &str) -> bool {
    if let Some(sink) = arg.strip_prefix("--sink=") {
        match sink {
            "console" => opts.file_sink = false,
            "file" => opts.file_sink = true,
            other => {
                eprintln!("error: unknown sink `{other}` (expected `console` or `file`)");
                std::process::exit(1);
            }
        }
        true
    } else if let Some(path) = arg.strip_prefix("--record-output-file=") {
        opts.record_file = Some(path.to_owned());
        true
    } else if let Some(policy) = arg.strip_prefix("--policy=") {
        opts.policy = Some(match policy {
            "entry-once" => EmissionPolicy::EntryOnce,
            "bundled-per-exit" => EmissionPolicy::BundledPerExit,
            other => {
                eprintln!(
                    "error: unknown policy `{other}` (expected `entry-once` or `bundled-per-exit`)"
                );
                std::process::exit(1);
            }
        });
        true
    } else if arg == "--call-count" {
        opts.call_count = true;
        true
    } else {
        false
    }
}

fn trace_config(opts: &InstrumentOptions) -> TraceConfig {
    let mut config = if opts.file_sink {
        let path = opts
            .record_file
            .clone()
            .unwrap_or_else(|| DEFAULT_RECORD_FILE.to_owned());
        TraceConfig::file(path)
    } else {
        TraceConfig::console()
    };
    if let Some(policy) = opts.policy {
        config = config.with_policy(policy);
    }
    config
}

fn load_module(path: &str) -> Module {
    let src = match std::fs::read_to_string(path) {
        Ok(src) => src,
        Err(err) => {
            eprintln!("error: cannot read {path}: {err}");
            std::process::exit(1);
        }
    };
    let name = std::path::Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("module");
    match parse_module(name, &src) {
        Ok(module) => module,
        Err(err) => {
            eprintln!("error: {path}: {err}");
            std::process::exit(1);
        }
    }
}

fn instrument(module: &mut Module, opts: &InstrumentOptions) -> bool {
    let mut pm = PassManager::new();
    pm.add(FunctionIoPass::new(trace_config(opts)));
    if opts.call_count {
        pm.add(CallCounterPass::new());
    }
    pm.run(module)
}

/// `tp instrument <file>` - print (or write) the instrumented module.
pub fn instrument_file(path: &str, opts: &InstrumentOptions) {
    let mut module = load_module(path);
    if !instrument(&mut module, opts) {
        eprintln!("note: nothing to instrument in {path}");
    }
    let text = module.to_string();
    match &opts.output {
        Some(out) => {
            if let Err(err) = std::fs::write(out, &text) {
                eprintln!("error: cannot write {}: {err}", out.display());
                std::process::exit(1);
            }
        }
        None => print!("{text}"),
    }
}

/// `tp run <file>` - instrument in memory, then execute one function.
pub fn run_file(path: &str, entry: &str, raw_args: &[String], opts: &InstrumentOptions) {
    let mut module = load_module(path);
    instrument(&mut module, opts);

    let Some(func) = module.function(entry) else {
        eprintln!("error: no function `@{entry}` in {path}");
        std::process::exit(1);
    };
    let param_tys: Vec<Ty> = func.params.iter().map(|p| p.ty).collect();
    if raw_args.len() != param_tys.len() {
        eprintln!(
            "error: `@{entry}` expects {} argument(s), got {}",
            param_tys.len(),
            raw_args.len()
        );
        std::process::exit(1);
    }
    let mut args = Vec::with_capacity(raw_args.len());
    for (raw, ty) in raw_args.iter().zip(param_tys) {
        match parse_arg(raw, ty) {
            Ok(value) => args.push(value),
            Err(err) => {
                eprintln!("error: {err}");
                std::process::exit(1);
            }
        }
    }

    let machine = Machine::new(&module);
    match machine.call(entry, &args) {
        Ok(RtValue::Unit) => {}
        Ok(value) => println!("{value}"),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}

/// `tp report <file>` - print one signature line per function.
pub fn report_file(path: &str) {
    let mut module = load_module(path);
    let mut pass = SignatureReportPass::new();
    for func in &mut module.functions {
        pass.run(&mut module.decls, func);
    }
    print!("{}", pass.into_report());
}

fn parse_arg(raw: &str, ty: Ty) -> Result<RtValue, String> {
    match ty {
        Ty::I1 | Ty::I8 | Ty::I16 | Ty::I32 | Ty::I64 => raw
            .parse::<i64>()
            .map(RtValue::Int)
            .map_err(|_| format!("`{raw}` is not an integer")),
        Ty::F32 => raw
            .parse::<f32>()
            .map(RtValue::F32)
            .map_err(|_| format!("`{raw}` is not a float")),
        Ty::F64 => raw
            .parse::<f64>()
            .map(RtValue::F64)
            .map_err(|_| format!("`{raw}` is not a float")),
        Ty::Ptr => {
            let parsed = match raw.strip_prefix("0x") {
                Some(hex) => u64::from_str_radix(hex, 16),
                None => raw.parse::<u64>(),
            };
            parsed
                .map(RtValue::Ptr)
                .map_err(|_| format!("`{raw}` is not a pointer value"))
        }
        Ty::Void | Ty::Vec { .. } => {
            Err(format!("cannot pass a `{ty}` value on the command line"))
        }
    }
}
