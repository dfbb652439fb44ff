use py2wf::{ast, codegen, lower};
use std::process;

struct Config {
    filename: String,
    mode: Mode,
    out_path: Option<String>,
}

enum Mode {
    Default,
    Check,
    EmitActions,
}

struct CliError {
    code: i32,
    msg: String,
    show_usage: bool,
}

impl CliError {
    fn compile(msg: impl Into<String>) -> Self {
        Self { code: 2, msg: msg.into(), show_usage: false }
    }

    fn io(msg: impl Into<String>) -> Self {
        Self { code: 1, msg: msg.into(), show_usage: false }
    }

    fn usage(msg: impl Into<String>) -> Self {
        Self { code: 1, msg: msg.into(), show_usage: true }
    }

    fn usage_with_code(msg: impl Into<String>, code: i32) -> Self {
        Self { code, msg: msg.into(), show_usage: true }
    }
}

fn usage_text() -> &'static str {
    "Usage: py2wf [flags] <tree.json> [flags]\n\
     Flags:\n\
     \x20 -o, --out <file>       Write the artifact to a file instead of stdout\n\
     \x20 --check                Lower the tree without emitting an artifact\n\
     \x20 --emit-actions         Emit the lowered action list (debug)\n\
     \x20 -h, --help             Print help information"
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let config = match parse_args(args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e.msg);
            if e.show_usage {
                eprintln!("{}", usage_text());
            }
            process::exit(e.code);
        }
    };

    if let Err(e) = compile(config) {
        eprintln!("{}", e.msg);
        if e.show_usage {
            eprintln!("{}", usage_text());
        }
        process::exit(e.code);
    }
}

fn parse_args(args: Vec<String>) -> Result<Config, CliError> {
    if args.len() < 2 {
        return Err(CliError::usage("error: missing input file"));
    }

    let mut filename: Option<String> = None;
    let mut out_path: Option<String> = None;
    let mut check = false;
    let mut emit_actions = false;

    let mut i = 1;
    while i < args.len() {
        let arg = &args[i];
        if arg == "-h" || arg == "--help" {
            println!("{}", usage_text());
            process::exit(0);
        } else if arg == "-o" || arg == "--out" {
            if i + 1 < args.len() {
                out_path = Some(args[i + 1].clone());
                i += 2;
            } else {
                return Err(CliError::usage(format!("error: {} requires an argument", arg)));
            }
        } else if arg == "--check" {
            check = true;
            i += 1;
        } else if arg == "--emit-actions" {
            emit_actions = true;
            i += 1;
        } else if arg.starts_with("-") {
            return Err(CliError::usage(format!("error: Unexpected argument: {}", arg)));
        } else {
            if filename.is_some() {
                return Err(CliError::usage(format!(
                    "error: Unexpected argument: {} (input already specified)",
                    arg
                )));
            }
            filename = Some(arg.clone());
            i += 1;
        }
    }

    if check && out_path.is_some() {
        return Err(CliError::usage_with_code("error: --check cannot be used with --out", 2));
    }
    if check && emit_actions {
        return Err(CliError::usage("error: --check cannot be used with --emit-actions"));
    }

    let mode = if check {
        Mode::Check
    } else if emit_actions {
        Mode::EmitActions
    } else {
        Mode::Default
    };

    let filename = match filename {
        Some(f) => f,
        None => {
            return Err(CliError::usage("error: missing input file"));
        }
    };

    Ok(Config { filename, mode, out_path })
}

fn compile(config: Config) -> Result<(), CliError> {
    let src = std::fs::read_to_string(&config.filename)
        .map_err(|e| CliError::io(format!("Failed to read {}: {}", config.filename, e)))?;

    let module: ast::Module = serde_json::from_str(&src)
        .map_err(|e| CliError::compile(format!("invalid syntax tree: {}", e)))?;

    let lowering = lower::lower(&module).map_err(|e| CliError::compile(e.to_string()))?;
    for notice in &lowering.notices {
        eprintln!("warning: {}", notice);
    }

    if let Mode::Check = config.mode {
        println!("OK");
        return Ok(());
    }

    if let Mode::EmitActions = config.mode {
        let out = serde_json::to_string_pretty(&lowering.actions)
            .map_err(|e| CliError::io(format!("Failed to serialize actions: {}", e)))?;
        println!("{}", out);
        return Ok(());
    }

    let artifact = codegen::synthesize(lowering.actions);
    let mut out = serde_json::to_string_pretty(&artifact)
        .map_err(|e| CliError::io(format!("Failed to serialize artifact: {}", e)))?;
    out.push('\n');

    if let Some(out_path) = config.out_path {
        std::fs::write(&out_path, out)
            .map_err(|e| CliError::io(format!("Failed to write to {}: {}", out_path, e)))?;
    } else {
        print!("{}", out);
    }

    Ok(())
}
