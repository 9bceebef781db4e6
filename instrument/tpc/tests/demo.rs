//! The shipped demo fixture stays loadable and runnable.

use pretty_assertions::assert_eq;
use tp_ir::parse_module;
use tp_passes::{FunctionIoPass, PassManager, TraceConfig};
use tp_rt::{capture_console, Machine, RtValue};

fn demo_source() -> String {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../demos/factorial.tir");
    std::fs::read_to_string(path).expect("demo fixture exists")
}

#[test]
fn factorial_demo_parses_and_round_trips() {
    let src = demo_source();
    let module = parse_module("factorial", &src).expect("parse");
    let reprinted = module.to_string();
    let reparsed = parse_module("factorial", &reprinted).expect("reparse");
    assert_eq!(reparsed.to_string(), reprinted);
}

#[test]
fn factorial_demo_runs_instrumented() {
    let mut module = parse_module("factorial", &demo_source()).expect("parse");
    let mut pm = PassManager::new();
    pm.add(FunctionIoPass::new(TraceConfig::console()));
    pm.run(&mut module);

    let console = capture_console();
    let machine = Machine::with_console(&module, console.clone());
    assert_eq!(machine.call("main", &[]), Ok(RtValue::Int(120)));

    let out = console.captured();
    // One record per invocation: main once, factorial five times.
    assert_eq!(out.matches("name:main,").count(), 1);
    assert_eq!(out.matches("name:factorial,").count(), 5);
    assert!(out.ends_with("output:integer:120,\n"));
}
