mod args;

use std::io;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use nlpform_lang::{codegen, presets, CompiledModel, Error, ModelBuilder, ProblemSpec, Target};
use nlpform_solver::CobylaSolver;
use tracing_subscriber::EnvFilter;

use crate::args::ProblemArgs;

#[derive(Parser)]
#[command(name = "nlpform")]
#[command(about = "Formulate and solve small nonlinear programs", long_about = None)]
struct Cli {
    /// Log solver progress and print full error diagnostics
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Pretty,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Build, solve and report a problem
    Solve {
        #[command(flatten)]
        problem: ProblemArgs,
        /// Output format
        #[arg(short, long, value_enum, default_value = "pretty")]
        format: Format,
        /// Also print the problem as a program for this target
        #[arg(long)]
        emit: Option<Target>,
    },
    /// Build the model without solving it
    Check {
        #[command(flatten)]
        problem: ProblemArgs,
    },
    /// Print the problem as a program without solving it
    Emit {
        #[command(flatten)]
        problem: ProblemArgs,
        /// gekko or toml
        #[arg(short, long, default_value = "gekko")]
        target: Target,
    },
    /// List the built-in problems
    Presets,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("NLPFORM_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}: {}", e.kind(), e);
            if cli.verbose {
                eprintln!("{:#?}", e);
            }
            ExitCode::FAILURE
        }
    }
}

fn build(problem: &ProblemArgs) -> Result<(ProblemSpec, CompiledModel), Error> {
    let spec = problem.resolve()?;
    tracing::debug!(
        component = "cli",
        operation = "resolve",
        file = ?problem.file,
        preset = ?problem.preset,
        variables = spec.variables,
        "Resolved problem"
    );
    let model = ModelBuilder::build(&spec)?;
    Ok((spec, model))
}

fn run(command: Commands) -> Result<(), Error> {
    match command {
        Commands::Solve { problem, format, emit } => {
            let (spec, model) = build(&problem)?;
            let solver = CobylaSolver::with_config(spec.solver.clone());
            let (_, report) = model.solve_with(&solver)?;

            match format {
                Format::Pretty => print!("{}", report),
                Format::Json => {
                    let json = serde_json::to_string_pretty(&report)
                        .map_err(|e| Error::Config(e.to_string()))?;
                    println!("{}", json);
                }
            }
            if let Some(target) = emit {
                println!();
                print!("{}", codegen::emit(&model, &spec.solver, target)?);
            }
        }
        Commands::Check { problem } => {
            let (_, model) = build(&problem)?;

            println!("✓ problem is valid");
            println!("  variables: {}", model.variable_names.join(", "));
            println!("  {}: {}", model.sense, model.objective.expr);
            for c in &model.constraints {
                println!("  subject to: {} {} {}", c.left.expr, c.op, c.right.expr);
            }
        }
        Commands::Emit { problem, target } => {
            let (spec, model) = build(&problem)?;
            print!("{}", codegen::emit(&model, &spec.solver, target)?);
        }
        Commands::Presets => {
            for preset in presets::PRESETS {
                println!("  {:10} {}", preset.name, preset.description);
            }
        }
    }
    Ok(())
}
