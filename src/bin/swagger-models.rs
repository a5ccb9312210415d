//! Swagger Models CLI
//!
//! Command-line interface for inspecting and building models from a spec.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use swagger_models::{
    compile, load_spec, load_spec_auto, prepare_spec, CompileError, CompileOptions, ModelError,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "swagger-models")]
#[command(about = "Build model types from Swagger definitions")]
#[command(version)]
struct Cli {
    /// Log debug output to stderr (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the models defined in a spec
    Models {
        /// Spec source: file path or URL (http:// or https://)
        spec: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Print each model's attribute summary with declared types
        #[arg(long, conflicts_with = "json")]
        describe: bool,
    },

    /// Construct a model instance and print its flattened form
    Build {
        /// Spec source: file path or URL (http:// or https://)
        spec: String,

        /// Model name (bare or #/definitions/ pointer)
        #[arg(long, short)]
        model: String,

        /// Constructor arguments as a JSON object
        #[arg(long, conflicts_with = "args_file")]
        args: Option<String>,

        /// File containing constructor arguments as a JSON object
        #[arg(long)]
        args_file: Option<PathBuf>,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Print the spec with refs repaired, models tagged and refs inlined
    Prepare {
        /// Spec source: file path or URL (http:// or https://)
        spec: String,

        /// Skip inlining of internal $ref pointers
        #[arg(long)]
        no_inline: bool,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Models {
            spec,
            json,
            describe,
        } => run_models(&spec, json, describe),

        Commands::Build {
            spec,
            model,
            args,
            args_file,
            output,
            pretty,
        } => run_build(BuildArgs {
            spec,
            model,
            args,
            args_file,
            output,
            pretty,
        }),

        Commands::Prepare {
            spec,
            no_inline,
            output,
            pretty,
        } => run_prepare(&spec, no_inline, output, pretty),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_models(spec_source: &str, json_output: bool, describe: bool) -> Result<(), u8> {
    let mut spec = load_spec_auto(spec_source).map_err(|e| report(&e.into()))?;
    let registry = compile(&mut spec, &CompileOptions::new()).map_err(|e| report(&e))?;

    if describe {
        let docs: Vec<String> = registry
            .model_names()
            .into_iter()
            .filter_map(|name| registry.get(name))
            .map(|model_type| model_type.docstring())
            .collect();
        println!("{}", docs.join("\n\n"));
        return Ok(());
    }

    let mut listing = Vec::new();
    for name in registry.model_names() {
        let Some(model_type) = registry.get(name) else {
            continue;
        };
        listing.push(json!({
            "name": name,
            "properties": model_type.host_types().keys().collect::<Vec<_>>(),
            "required": model_type.required(),
        }));
    }

    if json_output {
        println!("{}", Value::Array(listing));
    } else {
        for entry in &listing {
            let props: Vec<&str> = entry["properties"]
                .as_array()
                .map(|p| p.iter().filter_map(|v| v.as_str()).collect())
                .unwrap_or_default();
            let required: Vec<&str> = entry["required"]
                .as_array()
                .map(|r| r.iter().filter_map(|v| v.as_str()).collect())
                .unwrap_or_default();
            println!(
                "{} ({}) required: [{}]",
                entry["name"].as_str().unwrap_or_default(),
                props.join(", "),
                required.join(", ")
            );
        }
    }

    Ok(())
}

struct BuildArgs {
    spec: String,
    model: String,
    args: Option<String>,
    args_file: Option<PathBuf>,
    output: Option<PathBuf>,
    pretty: bool,
}

fn run_build(args: BuildArgs) -> Result<(), u8> {
    let BuildArgs {
        spec: spec_source,
        model,
        args,
        args_file,
        output,
        pretty,
    } = args;

    let mut spec = load_spec_auto(&spec_source).map_err(|e| report(&e.into()))?;
    let registry = compile(&mut spec, &CompileOptions::new()).map_err(|e| report(&e))?;

    let arguments = match (&args, &args_file) {
        (Some(text), _) => serde_json::from_str(text).map_err(|e| {
            eprintln!("Error: invalid --args JSON: {}", e);
            2u8
        })?,
        (None, Some(path)) => load_spec(path).map_err(|e| report(&e.into()))?,
        (None, None) => json!({}),
    };

    let model_type = registry.get(&model).ok_or_else(|| {
        report(&CompileError::Model(ModelError::UnknownModel {
            name: model.clone(),
        }))
    })?;

    let instance = model_type
        .construct_json(&arguments)
        .map_err(|e| report(&e.into()))?;
    debug!(instance = ?instance, "constructed");

    let flat = instance.flatten().map_err(|e| report(&e.into()))?;
    write_json(&flat, output.as_deref(), pretty)
}

fn run_prepare(
    spec_source: &str,
    no_inline: bool,
    output: Option<PathBuf>,
    pretty: bool,
) -> Result<(), u8> {
    let mut spec = load_spec_auto(spec_source).map_err(|e| report(&e.into()))?;
    let options = CompileOptions::new().inline_refs(!no_inline);
    prepare_spec(&mut spec, &options).map_err(|e| report(&e))?;

    write_json(&spec, output.as_deref(), pretty)
}

fn write_json(value: &Value, output: Option<&Path>, pretty: bool) -> Result<(), u8> {
    let json_output = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;

    match output {
        Some(path) => {
            std::fs::write(path, &json_output).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            println!("{}", json_output);
        }
    }

    Ok(())
}

/// Print an error and return its exit code.
fn report(error: &CompileError) -> u8 {
    eprintln!("Error: {}", error);
    error.exit_code() as u8
}
