//! End-to-end checks: instrument a module, execute it in the runtime, and
//! inspect the records that come out.

use pretty_assertions::assert_eq;
use tp_ir::{parse_module, Module};
use tp_passes::{CallCounterPass, EmissionPolicy, FunctionIoPass, PassManager, TraceConfig};
use tp_rt::{capture_console, Machine, RtValue};

const MAYBE: &str = "\
fn @maybe(i32 %n) -> i32 {
entry:
  %c = cmp.gt.i32 %n, 0
  br %c, pos, neg
pos:
  ret %n
neg:
  ret 0
}
";

fn instrumented(src: &str, config: TraceConfig) -> Module {
    let mut module = parse_module("test", src).expect("parse");
    let mut pm = PassManager::new();
    pm.add(FunctionIoPass::new(config));
    pm.run(&mut module);
    module
}

#[test]
fn add_records_name_arguments_and_output() {
    let src = "\
fn @add(i32 %a, i32 %b) -> i32 {
entry:
  %t0 = add.i32 %a, %b
  ret %t0
}
";
    let module = instrumented(src, TraceConfig::console());
    let console = capture_console();
    let machine = Machine::with_console(&module, console.clone());

    let result = machine
        .call("add", &[RtValue::Int(2), RtValue::Int(3)])
        .expect("run");
    assert_eq!(result, RtValue::Int(5));
    assert_eq!(
        console.captured(),
        "name:add,input:integer:2,input:integer:3,output:integer:5,\n"
    );
}

#[test]
fn entry_once_emits_one_entry_and_one_exit_per_invocation() {
    let module = instrumented(MAYBE, TraceConfig::console());
    let console = capture_console();
    let machine = Machine::with_console(&module, console.clone());

    assert_eq!(machine.call("maybe", &[RtValue::Int(4)]), Ok(RtValue::Int(4)));
    assert_eq!(machine.call("maybe", &[RtValue::Int(-4)]), Ok(RtValue::Int(0)));
    assert_eq!(
        console.captured(),
        "name:maybe,input:integer:4,output:integer:4,\n\
         name:maybe,input:integer:-4,output:integer:0,\n"
    );
}

#[test]
fn bundled_policy_emits_one_complete_record_per_exit_reached() {
    let module = instrumented(
        MAYBE,
        TraceConfig::console().with_policy(EmissionPolicy::BundledPerExit),
    );
    let console = capture_console();
    let machine = Machine::with_console(&module, console.clone());

    machine.call("maybe", &[RtValue::Int(4)]).expect("run");
    machine.call("maybe", &[RtValue::Int(-4)]).expect("run");
    assert_eq!(
        console.captured(),
        "name:maybe,input:integer:4,output:integer:4,\n\
         name:maybe,input:integer:-4,output:integer:0,\n"
    );
}

#[test]
fn void_function_round_trips_both_markers() {
    let src = "\
fn @log() -> void {
entry:
  ret
}
";
    let module = instrumented(src, TraceConfig::console());
    let console = capture_console();
    let machine = Machine::with_console(&module, console.clone());

    assert_eq!(machine.call("log", &[]), Ok(RtValue::Unit));
    assert_eq!(console.captured(), "name:log,input:void,output:void,\n");
}

#[test]
fn float_double_and_pointer_arguments_format_per_category() {
    let src = "\
fn @mix(f32 %x, f64 %y, ptr %p) -> f64 {
entry:
  ret %y
}
";
    let module = instrumented(src, TraceConfig::console());
    let console = capture_console();
    let machine = Machine::with_console(&module, console.clone());

    machine
        .call(
            "mix",
            &[RtValue::F32(1.5), RtValue::F64(-0.25), RtValue::Ptr(0xbeef)],
        )
        .expect("run");
    assert_eq!(
        console.captured(),
        "name:mix,input:float:1.500000,input:double:-0.250000,input:pointer:0xbeef,\
         output:double:-0.250000,\n"
    );
}

#[test]
fn call_counter_logs_running_count() {
    let src = "\
fn @f() -> void {
entry:
  ret
}
";
    let mut module = parse_module("test", src).expect("parse");
    let mut pm = PassManager::new();
    pm.add(CallCounterPass::new());
    pm.run(&mut module);

    let console = capture_console();
    let machine = Machine::with_console(&module, console.clone());
    for _ in 0..3 {
        machine.call("f", &[]).expect("run");
    }
    assert_eq!(console.captured(), "f1\nf2\nf3\n");
}

#[test]
fn counter_and_io_pass_compose() {
    let src = "\
fn @fact(i32 %n) -> i32 {
entry:
  %base = cmp.le.i32 %n, 1
  br %base, one, recurse
one:
  ret 1
recurse:
  %m = sub.i32 %n, 1
  %sub = call @fact(%m)
  %r = mul.i32 %n, %sub
  ret %r
}
";
    let mut module = parse_module("test", src).expect("parse");
    let mut pm = PassManager::new();
    pm.add(FunctionIoPass::new(TraceConfig::console()));
    pm.add(CallCounterPass::new());
    pm.run(&mut module);

    let console = capture_console();
    let machine = Machine::with_console(&module, console.clone());
    assert_eq!(machine.call("fact", &[RtValue::Int(3)]), Ok(RtValue::Int(6)));

    let out = console.captured();
    // Three nested invocations: three counter lines, three entries, three
    // exits.
    assert_eq!(out.matches("fact1\n").count(), 1);
    assert_eq!(out.matches("fact3\n").count(), 1);
    assert_eq!(out.matches("name:fact,").count(), 3);
    assert_eq!(out.matches("output:integer:").count(), 3);
    // Innermost call returns first.
    assert_eq!(machine.counters().get("fact"), 3);
}

#[test]
fn file_sink_appends_complete_records_across_invocations() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("out.txt");
    let path = path.to_str().expect("utf8 path");

    let module = instrumented(MAYBE, TraceConfig::file(path));
    let machine = Machine::new(&module);

    machine.call("maybe", &[RtValue::Int(4)]).expect("first run");
    machine.call("maybe", &[RtValue::Int(-4)]).expect("second run");

    // Every handle the generated code opened has been closed again.
    assert_eq!(machine.files().open_count(), 0);

    let contents = std::fs::read_to_string(path).expect("read records");
    assert_eq!(
        contents,
        "name:maybe,input:integer:4,output:integer:4,\n\
         name:maybe,input:integer:-4,output:integer:0,\n"
    );
}

#[test]
fn file_sink_open_failure_skips_emission_but_not_the_function() {
    let module = instrumented(MAYBE, TraceConfig::file("/nonexistent-dir-tp/out.txt"));
    let machine = Machine::new(&module);

    // The record is lost; the function still runs and returns correctly.
    assert_eq!(machine.call("maybe", &[RtValue::Int(9)]), Ok(RtValue::Int(9)));
    assert_eq!(machine.files().open_count(), 0);
}

#[test]
fn optnone_functions_are_still_instrumented() {
    let src = "\
fn @frozen(i32 %n) -> i32 optnone {
entry:
  ret %n
}
";
    let module = instrumented(src, TraceConfig::console());
    let console = capture_console();
    let machine = Machine::with_console(&module, console.clone());
    machine.call("frozen", &[RtValue::Int(1)]).expect("run");
    assert_eq!(
        console.captured(),
        "name:frozen,input:integer:1,output:integer:1,\n"
    );
}
