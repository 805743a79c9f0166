//! Swagger GraphQL CLI
//!
//! Command-line interface for compiling Swagger 2.0 documents into GraphQL
//! schemas and resolver manifests.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use std::path::{Path, PathBuf};
use swagger_graphql_common::{ApiDocument, CompiledSchema};
use swagger_graphql_compiler::{compile, CompileOptions, RootKind};
use swagger_graphql_generator::{ManifestFormat, SchemaGenerator};
use swagger_graphql_parser::SwaggerParser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "swagger-graphql")]
#[command(version, about = "Compile Swagger 2.0 documents into GraphQL schemas", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a Swagger document and summarize its definitions and operations
    #[command(after_help = "EXAMPLES:\n  \
        swagger-graphql inspect --spec petstore.yaml\n\n  \
        # List every operation and where it lands in the schema\n  \
        swagger-graphql inspect --spec petstore.json --verbose")]
    Inspect {
        /// Path to the Swagger document (.json, .yaml or .yml)
        #[arg(short, long)]
        spec: PathBuf,
    },

    /// Compile a Swagger document into schema.graphql and a resolver manifest
    #[command(after_help = "EXAMPLES:\n  \
        swagger-graphql generate \\\n    \
        --spec petstore.yaml \\\n    \
        --output ./graphql\n\n  \
        # Prefix every generated type and root field\n  \
        swagger-graphql generate \\\n    \
        --spec petstore.yaml \\\n    \
        --name-prefix Store \\\n    \
        --format yaml \\\n    \
        --output ./graphql")]
    Generate {
        /// Path to the Swagger document (.json, .yaml or .yml)
        #[arg(short, long)]
        spec: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        /// Prefix prepended to generated type names and root fields
        #[arg(long, default_value = "")]
        name_prefix: String,

        /// Resolver manifest format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

impl From<OutputFormat> for ManifestFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => ManifestFormat::Json,
            OutputFormat::Yaml => ManifestFormat::Yaml,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose)?;

    if cli.verbose {
        println!("{} Verbose mode enabled", "→".cyan());
    }

    match cli.command {
        Commands::Inspect { spec } => {
            inspect_command(spec.as_path(), cli.verbose)?;
        }
        Commands::Generate {
            spec,
            output,
            name_prefix,
            format,
        } => {
            generate_command(
                spec.as_path(),
                output.as_path(),
                &name_prefix,
                format.into(),
                cli.verbose,
            )?;
        }
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise warnings, or debug output with `--verbose`
fn init_tracing(verbose: bool) -> Result<()> {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::builder()
        .parse(std::env::var("RUST_LOG").unwrap_or_else(|_| default.to_string()))
        .context("Invalid RUST_LOG filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn load(spec_path: &Path) -> Result<ApiDocument> {
    debug!(spec = %spec_path.display(), "loading Swagger document");
    let parser = SwaggerParser::from_file(spec_path)
        .with_context(|| format!("Failed to load {}", spec_path.display()))?;
    let document = parser
        .parse()
        .context("Failed to dereference Swagger document")?;
    info!(
        title = %document.title,
        definitions = document.definitions.len(),
        operations = document.operations.len(),
        "loaded Swagger document"
    );
    Ok(document)
}

fn inspect_command(spec_path: &Path, verbose: bool) -> Result<()> {
    println!("{} Inspecting: {}", "→".cyan(), spec_path.display());

    let document = load(spec_path)?;

    println!("\n{}", "✓ Load successful!".green().bold());
    println!("\n{}", "Document:".bold());
    println!("  Title: {}", document.title.yellow());
    println!("  Version: {}", document.version.yellow());
    println!("  Definitions: {}", document.definitions.len());
    println!("  Operations: {}", document.operations.len());
    println!("  Security schemes: {}", document.security_definitions.len());

    if verbose {
        println!("\n{}", "Definitions:".bold());
        for name in document.definitions.keys() {
            println!("  • {}", name.cyan());
        }

        println!("\n{}", "Operations:".bold());
        for op in &document.operations {
            let root = match RootKind::for_method(&op.method) {
                RootKind::Query => "query",
                RootKind::Mutation => "mutation",
            };
            println!(
                "  • {} {} {} ({})",
                op.method.yellow(),
                op.path,
                op.operation_id.as_deref().unwrap_or("<no operation id>").cyan(),
                root
            );
        }
    }

    let schema = compile(document, &CompileOptions::default())
        .context("Failed to compile Swagger document")?;
    print_schema_summary(&schema);

    Ok(())
}

fn generate_command(
    spec_path: &Path,
    output: &Path,
    name_prefix: &str,
    format: ManifestFormat,
    verbose: bool,
) -> Result<()> {
    println!(
        "{} Generating GraphQL schema from: {}",
        "→".cyan(),
        spec_path.display()
    );

    if verbose {
        println!("  Output: {}", output.display());
        println!("  Name prefix: {:?}", name_prefix);
        println!("  Manifest format: {}", format);
    }

    println!("{} Parsing spec...", "→".cyan());
    let document = load(spec_path)?;
    println!(
        "{} Parsed {} operations",
        "✓".green(),
        document.operations.len()
    );

    println!("{} Compiling schema...", "→".cyan());
    let schema = compile(document, &CompileOptions::with_name_prefix(name_prefix))
        .context("Failed to compile Swagger document")?;
    debug!(
        name_prefix,
        query = schema.query.len(),
        mutation = schema.mutation.len(),
        "compiled schema"
    );
    print_schema_summary(&schema);

    println!("{} Writing files...", "→".cyan());
    let generator = SchemaGenerator::new(schema).context("Failed to create generator")?;
    generator
        .generate_to_directory(output, format)
        .context("Failed to generate schema artifacts")?;

    println!("\n{}", "✓ Generation complete!".green().bold());
    println!("\n{}", "Generated files:".bold());
    println!("  📄 {}/schema.graphql", output.display());
    println!("  📄 {}/resolvers.{}", output.display(), format.extension());

    Ok(())
}

fn print_schema_summary(schema: &CompiledSchema) {
    println!("\n{}", "Schema:".bold());
    println!("  Types: {}", schema.types.len());
    println!("  Query fields: {}", schema.query.len());
    println!("  Mutation fields: {}", schema.mutation.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_generate_defaults() {
        let cli = Cli::try_parse_from(["swagger-graphql", "generate", "--spec", "api.yaml"]).unwrap();
        match cli.command {
            Commands::Generate {
                spec,
                output,
                name_prefix,
                format,
            } => {
                assert_eq!(spec, PathBuf::from("api.yaml"));
                assert_eq!(output, PathBuf::from("./output"));
                assert_eq!(name_prefix, "");
                assert_eq!(ManifestFormat::from(format), ManifestFormat::Json);
            }
            Commands::Inspect { .. } => panic!("expected generate"),
        }
    }

    #[test]
    fn test_generate_with_prefix_and_yaml() {
        let cli = Cli::try_parse_from([
            "swagger-graphql",
            "--verbose",
            "generate",
            "-s",
            "api.json",
            "--name-prefix",
            "Store",
            "--format",
            "yaml",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Generate {
                name_prefix,
                format,
                ..
            } => {
                assert_eq!(name_prefix, "Store");
                assert_eq!(ManifestFormat::from(format), ManifestFormat::Yaml);
            }
            Commands::Inspect { .. } => panic!("expected generate"),
        }
    }

    #[test]
    fn test_load_yaml_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ping.yaml");
        std::fs::write(
            &path,
            "swagger: '2.0'\ninfo: {title: Ping, version: '1'}\nhost: api.example.com\nbasePath: /v1\npaths:\n  /ping:\n    get:\n      operationId: ping\n      responses:\n        '200': {description: ok, schema: {type: string}}\n",
        )
        .unwrap();

        let document = load(&path).unwrap();
        assert_eq!(document.title, "Ping");
        assert_eq!(document.operations.len(), 1);

        let missing = load(&dir.path().join("missing.yaml")).unwrap_err();
        assert!(missing.to_string().starts_with("Failed to load"));
    }
}
