use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use ariadne::Source;
use clap::Parser as ArgParser;
use yansi::Paint;

use panda::codegen::{Generator, GeneratorConfig};
use panda::error::CompileError;
use panda::lexer;
use panda::parser::Parser;

/// Compiler for the panda programming language.
#[derive(ArgParser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the file you would like to compile.
    file_path: PathBuf,

    /// Output executable path; defaults to the source file's name,
    /// without extension, in its own directory.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Keep the intermediate .asm and .o files under output/.
    #[arg(long)]
    full_output: bool,

    /// Execute the compiled program after a successful build.
    #[arg(long)]
    run: bool,

    /// Print the token stream and stop.
    #[arg(long)]
    dump_tokens: bool,

    /// Print the parsed AST nodes and stop.
    #[arg(long)]
    dump_ast: bool,

    /// Render compiler errors as full source reports instead of
    /// one-line diagnostics.
    #[arg(long)]
    explain: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let source = match fs::read_to_string(&args.file_path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!(
                "{} cannot read {}: {err}",
                "error:".red().bold(),
                args.file_path.display()
            );
            return ExitCode::FAILURE;
        }
    };

    match pipeline(&args, &source) {
        Ok(code) => ExitCode::from((code & 0xff) as u8),
        Err(err) => {
            report(&args, &source, &err);
            ExitCode::FAILURE
        }
    }
}

fn pipeline(args: &Args, source: &str) -> Result<i32, CompileError> {
    let tokens = lexer::tokenize(source)?;
    if args.dump_tokens {
        for (token, span) in tokens.iter() {
            println!("{token:?} @ {}..{}", span.start, span.end);
        }
        return Ok(0);
    }

    let nodes = Parser::new(tokens, source).parse()?;
    if args.dump_ast {
        for node in &nodes {
            println!("{node:?}");
        }
        return Ok(0);
    }

    let mut program = Generator::new(GeneratorConfig::default()).generate(&nodes);
    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(&args.file_path));
    program.compile(&output_path, args.full_output)?;

    if args.run {
        return program.run();
    }
    Ok(0)
}

fn default_output(file_path: &Path) -> PathBuf {
    file_path.with_extension("")
}

fn report(args: &Args, source: &str, err: &CompileError) {
    let file = args.file_path.display().to_string();
    if args.explain {
        if let Some(report) = err.report(file.clone()) {
            let _ = report.eprint((file, Source::from(source)));
            return;
        }
    }
    eprintln!("{} {err}", "error:".red().bold());
}
