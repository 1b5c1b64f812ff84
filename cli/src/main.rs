use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use schema_tools_registry::{BoundApi, RegistryConfig, SourceConfig};
use schema_tools_validate::AssertOptions;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "schema-tools")]
#[command(about = "Validate, assert and shape JSON objects against versioned schemas")]
struct Cli {
    #[command(flatten)]
    registry: RegistryArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct RegistryArgs {
    /// Schema directory or bundle file; repeat to merge, later wins.
    #[arg(long = "schemas", global = true)]
    schemas: Vec<PathBuf>,
    /// YAML registry configuration with formats and sources.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List schema names.
    Names,
    /// List versions of a schema.
    Versions(NameArgs),
    /// Print the example object of a schema version.
    Example(TargetArgs),
    /// Validate an object and list every error.
    Validate(ValidateArgs),
    /// Assert an object; prints it back when it conforms.
    Assert(AssertArgs),
    /// Replace dynamic-format values with format defaults.
    Sanitize(ObjectArgs),
    /// Drop properties the schema does not declare.
    Trim(ObjectArgs),
    /// Add missing properties from declared default values.
    Fill(ObjectArgs),
    /// Run structural checks and validate every example.
    Check,
}

#[derive(Debug, Args)]
struct NameArgs {
    name: String,
}

#[derive(Debug, Args)]
struct TargetArgs {
    name: String,
    version: String,
}

#[derive(Debug, Args)]
struct ObjectArgs {
    #[command(flatten)]
    target: TargetArgs,
    /// JSON input file; stdin when omitted.
    #[arg(long)]
    input: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    #[command(flatten)]
    object: ObjectArgs,
    /// Report only the first error per field.
    #[arg(long)]
    first_error: bool,
}

#[derive(Debug, Args)]
struct AssertArgs {
    #[command(flatten)]
    object: ObjectArgs,
    /// Dotted path to take from the schema example before validating.
    #[arg(long = "substitute")]
    substitutions: Vec<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let result = load_api(&cli.registry).and_then(|api| match cli.command {
        Command::Names => run_names(&api),
        Command::Versions(args) => run_versions(&api, args),
        Command::Example(args) => run_example(&api, args),
        Command::Validate(args) => run_validate(api, args),
        Command::Assert(args) => run_assert(&api, args),
        Command::Sanitize(args) => run_sanitize(&api, args),
        Command::Trim(args) => run_trim(&api, args),
        Command::Fill(args) => run_fill(&api, args),
        Command::Check => run_check(&api),
    });

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn load_api(args: &RegistryArgs) -> Result<BoundApi, String> {
    let mut config = match &args.config {
        Some(path) => RegistryConfig::load(path)
            .map_err(|err| format!("Failed to load config {}: {err}", path.display()))?,
        None => RegistryConfig::default(),
    };

    for path in &args.schemas {
        let source = if path.is_dir() {
            SourceConfig::Dir(path.clone())
        } else {
            SourceConfig::Bundle(path.clone())
        };
        config.sources.push(source);
    }
    if config.sources.is_empty() {
        return Err("no schema sources; pass --schemas or --config".to_string());
    }

    tracing::debug!(sources = config.sources.len(), "loading schema registry");
    config.bind().map_err(|err| err.to_string())
}

fn run_names(api: &BoundApi) -> Result<(), String> {
    for name in api.schema_names() {
        println!("{name}");
    }
    Ok(())
}

fn run_versions(api: &BoundApi, args: NameArgs) -> Result<(), String> {
    let versions = api.schema_versions(&args.name);
    if versions.is_empty() {
        return Err(format!("Missing schema {}", args.name));
    }
    for version in versions {
        println!("{version}");
    }
    Ok(())
}

fn run_example(api: &BoundApi, args: TargetArgs) -> Result<(), String> {
    let example = api
        .get_example(&args.name, &args.version)
        .ok_or_else(|| format!("Could not find schema {}@{}", args.name, args.version))?;
    print_json(&Value::Object(example.clone()))
}

fn run_validate(api: BoundApi, args: ValidateArgs) -> Result<(), String> {
    let object = read_input(args.object.input.as_deref())?;
    let api = api.with_greedy(!args.first_error);
    let target = &args.object.target;
    api.validate(&target.name, &target.version, &object)
        .map_err(|errors| errors.to_string())?;
    println!("ok");
    Ok(())
}

fn run_assert(api: &BoundApi, args: AssertArgs) -> Result<(), String> {
    let object = read_input(args.object.input.as_deref())?;
    let mut options = AssertOptions::new();
    for path in &args.substitutions {
        options = options.substitute(path);
    }
    let target = &args.object.target;
    let object = api
        .assert_schema_with(&target.name, &target.version, object, &options)
        .map_err(|err| err.to_string())?;
    print_json(&object)
}

fn run_sanitize(api: &BoundApi, args: ObjectArgs) -> Result<(), String> {
    let object = read_input(args.input.as_deref())?;
    let result = api
        .sanitize(&args.target.name, &args.target.version, object)
        .map_err(|err| err.to_string())?;
    print_json(&result)
}

fn run_trim(api: &BoundApi, args: ObjectArgs) -> Result<(), String> {
    let object = read_input(args.input.as_deref())?;
    let result = api
        .trim(&args.target.name, &args.target.version, &object)
        .map_err(|err| err.to_string())?;
    print_json(&result)
}

fn run_fill(api: &BoundApi, args: ObjectArgs) -> Result<(), String> {
    let object = read_input(args.input.as_deref())?;
    let result = api
        .fill(&args.target.name, &args.target.version, &object)
        .map_err(|err| err.to_string())?;
    print_json(&result)
}

fn run_check(api: &BoundApi) -> Result<(), String> {
    let mut problems: Vec<String> = api.check().iter().map(ToString::to_string).collect();
    problems.extend(api.check_examples());

    if problems.is_empty() {
        println!("ok: {} schemas", api.schema_names().len());
        return Ok(());
    }
    for problem in &problems {
        println!("{problem}");
    }
    Err(format!("{} problem(s) found", problems.len()))
}

fn read_input(path: Option<&Path>) -> Result<Value, String> {
    let text = match path {
        Some(path) => fs::read_to_string(path)
            .map_err(|err| format!("Failed to read {}: {err}", path.display()))?,
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(|err| format!("Failed to read stdin: {err}"))?;
            text
        }
    };
    serde_json::from_str(&text).map_err(|err| format!("Invalid JSON input: {err}"))
}

fn print_json(value: &Value) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value).map_err(|err| format!("Failed to serialize output: {err}"))?;
    println!("{text}");
    Ok(())
}
