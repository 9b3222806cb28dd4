use std::env;
use std::fs;
use std::io::{stdin, stdout, BufReader};
use std::process::ExitCode;

use pl0::Program;

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let (command, path) = match (args.get(1), args.get(2)) {
        (Some(command), Some(path)) if args.len() == 3 => (command.as_str(), path.as_str()),
        _ => {
            eprintln!("Usage: pl0 <compile|run> <file.pl0>");
            return ExitCode::FAILURE;
        }
    };

    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("failed to read '{path}': {err}");
            return ExitCode::FAILURE;
        }
    };

    match command {
        "compile" => match Program::compile(&source) {
            Ok(program) => {
                for inst in program.instructions() {
                    println!("{inst}");
                }
                ExitCode::SUCCESS
            }
            Err(err) => {
                eprintln!("{err}");
                ExitCode::FAILURE
            }
        },
        "run" => {
            let program = match Program::compile(&source) {
                Ok(program) => program,
                Err(err) => {
                    eprintln!("{err}");
                    return ExitCode::FAILURE;
                }
            };
            match program.run(BufReader::new(stdin()), stdout()) {
                Ok(()) => ExitCode::SUCCESS,
                Err(err) => {
                    eprintln!("{err}");
                    ExitCode::FAILURE
                }
            }
        }
        other => {
            eprintln!("unknown command '{other}', expected 'compile' or 'run'");
            ExitCode::FAILURE
        }
    }
}
