use std::{
    env, fs,
    io::{self, Read},
    process::ExitCode,
};

use sol25::{Runner, StdInput, StdPrint, StderrTracer};

const USAGE: &str = "usage: sol25 [--trace] <ast-file | ->";

fn main() -> ExitCode {
    let mut trace = false;
    let mut path: Option<String> = None;
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--trace" => trace = true,
            "--help" | "-h" => {
                println!("{USAGE}");
                return ExitCode::SUCCESS;
            }
            _ if path.is_none() => path = Some(arg),
            _ => {
                eprintln!("{USAGE}");
                return ExitCode::FAILURE;
            }
        }
    }
    let Some(path) = path else {
        eprintln!("{USAGE}");
        return ExitCode::FAILURE;
    };

    let source = match read_source(&path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("error: cannot read '{path}': {err}");
            return ExitCode::FAILURE;
        }
    };

    let runner = match Runner::new(&source) {
        Ok(runner) => runner,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(err.exit_code());
        }
    };

    let result = if trace {
        runner.run_with_tracer(&mut StdPrint, &mut StdInput, &mut StderrTracer)
    } else {
        runner.run_stdio()
    };
    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}

fn read_source(path: &str) -> io::Result<String> {
    if path == "-" {
        let mut source = String::new();
        io::stdin().read_to_string(&mut source)?;
        return Ok(source);
    }
    fs::read_to_string(path)
}
