use arith_codegen::{emit_object, Jit};
use chrono::Utc;
use clap::Parser;
use log::{debug, Level, LevelFilter};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use std::fs;
use std::io::stdout;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> eyre::Result<ExitCode> {
    color_eyre::install()?;
    let app = App::parse();
    init_logging(app.log.unwrap_or(LevelFilter::Warn))?;
    debug!("starting arithc with args {app:?}");

    let source = match (&app.expression, &app.file) {
        (Some(expression), None) => expression.clone(),
        (None, Some(path)) => fs::read_to_string(path)?,
        _ => eyre::bail!("an expression must be given either inline or with --file"),
    };

    let ast = arith_parsing::parse(&source)?;
    if app.print_ast {
        println!("AST:");
        println!("{ast}");
    }

    let mut jit = Jit::new();
    let compiled = jit.compile(&ast)?;
    if app.print_ir {
        println!("GENERATED IR:");
        println!("{}", compiled.clif());
    }
    println!("RESULT: {}", compiled.run());

    if let Some(path) = &app.emit_ir {
        fs::write(path, compiled.clif())?;
        debug!("wrote ir to {}", path.display());
    }
    if let Some(path) = &app.emit_object {
        let object = emit_object(&ast, "arithc")?;
        fs::write(path, object.bytes())?;
        println!("Wrote {}", path.display());
    }

    Ok(ExitCode::SUCCESS)
}

fn init_logging(level_filter: LevelFilter) -> eyre::Result<()> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} {:>5} {} --- {:<24} : {}",
                Utc::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level().if_supports_color(Stdout, |text| match text {
                    Level::Error => text.bright_red().to_string(),
                    Level::Warn => text.bright_yellow().to_string(),
                    Level::Info => text.green().to_string(),
                    Level::Debug => text.blue().to_string(),
                    Level::Trace => text.purple().to_string(),
                }),
                sysinfo::get_current_pid().unwrap(),
                record.target(),
                message
            ))
        })
        .level(level_filter)
        .level_for("cranelift_codegen", LevelFilter::Off)
        .level_for("cranelift_jit", LevelFilter::Off)
        .chain(stdout())
        .apply()?;
    Ok(())
}

/// Compiles an arithmetic expression, runs it, and optionally emits its
/// intermediate representation or object code.
#[derive(Debug, Parser)]
#[clap(name = "arithc")]
struct App {
    /// The expression to compile
    expression: Option<String>,

    /// Read the expression from a file instead
    #[clap(short, long, conflicts_with = "expression")]
    file: Option<PathBuf>,

    /// Print the parsed AST
    #[clap(short = 'a', long = "print-ast")]
    print_ast: bool,

    /// Print the generated IR
    #[clap(short = 'i', long = "print-ir")]
    print_ir: bool,

    /// Emit an object file for the host target
    #[clap(
        short = 'o',
        long = "emit-object",
        value_name = "PATH",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "out.o"
    )]
    emit_object: Option<PathBuf>,

    /// Emit the generated IR as a textual file
    #[clap(
        short = 'l',
        long = "emit-ir",
        value_name = "PATH",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "out.clif"
    )]
    emit_ir: Option<PathBuf>,

    #[clap(long = "log-level", env = "RUST_LOG")]
    log: Option<LevelFilter>,
}
