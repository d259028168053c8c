use std::{env, fs, process::ExitCode};

use minisom::{NoopTracer, Runner, StdPrint, StderrTracer, VmTracer};

const USAGE: &str = "usage: minisom [--trace] [class-file.som ...] [-e expression]";

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();

    let mut files: Vec<String> = Vec::new();
    let mut expression: Option<String> = None;
    let mut trace = false;

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-e" => {
                let Some(expr) = iter.next() else {
                    eprintln!("error: -e requires an expression\n{USAGE}");
                    return ExitCode::FAILURE;
                };
                expression = Some(expr);
            }
            "--trace" => trace = true,
            "-h" | "--help" => {
                println!("{USAGE}");
                return ExitCode::SUCCESS;
            }
            _ => files.push(arg),
        }
    }

    if files.is_empty() && expression.is_none() {
        eprintln!("{USAGE}");
        return ExitCode::FAILURE;
    }

    let mut runner = match Runner::new() {
        Ok(runner) => runner,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut noop = NoopTracer;
    let mut stderr_tracer = StderrTracer;
    let tracer: &mut dyn VmTracer = if trace { &mut stderr_tracer } else { &mut noop };
    let mut print = StdPrint;

    // Class files first; the first one named is the program's entry class.
    let mut entry_class: Option<String> = None;
    for path in &files {
        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(err) => {
                eprintln!("error: cannot read {path}: {err}");
                return ExitCode::FAILURE;
            }
        };
        match runner.load_class_source(&source) {
            Ok(name) => {
                entry_class.get_or_insert(name);
            }
            Err(err) => {
                eprintln!("error in {path}: {err}");
                return ExitCode::FAILURE;
            }
        }
    }

    if let Some(expression) = expression {
        match runner.run_expression(&expression, &mut print, tracer) {
            Ok(value) => {
                println!("{value}");
                ExitCode::SUCCESS
            }
            Err(err) => {
                eprintln!("error: {err}");
                ExitCode::FAILURE
            }
        }
    } else {
        // No expression: the program is run by sending `run` to the entry class.
        let entry = entry_class.expect("file list is non-empty here");
        match runner.send_to_global(&entry, "run", &mut print, tracer) {
            Ok(_) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("error: {err}");
                ExitCode::FAILURE
            }
        }
    }
}
