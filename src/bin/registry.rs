//! Record Registry CLI
//!
//! Inspect record types from the built-ins and definition files.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use record_registry::{
    bootstrap, DefinitionFile, RegistrationPolicy, RegistryConfig, RegistryError, TypeRegistry,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "record-registry")]
#[command(about = "Inspect typed record schemas")]
struct Cli {
    /// Config file to load (optional)
    #[arg(short, long)]
    config: Option<String>,

    /// Extra definition files to register
    #[arg(short, long)]
    definitions: Vec<PathBuf>,

    /// Reject duplicate type names instead of overwriting
    #[arg(long)]
    strict: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered types
    List,

    /// Show the fields of a type
    Show {
        /// Type name
        name: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print a default-constructed instance as JSON
    Construct {
        /// Type name
        name: String,
    },

    /// Validate definition files
    Check {
        /// Files to check
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Show the effective configuration
    Config {
        /// Write it to this file instead
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = RegistryConfig::load_from(cli.config.as_deref())?;
    if cli.strict {
        config.registry.policy = RegistrationPolicy::Strict;
    }
    config.registry.definitions.extend(cli.definitions);

    match cli.command {
        Commands::List => {
            let registry = bootstrap(&config)?;
            let names = registry.type_names();
            if names.is_empty() {
                println!("No types registered.");
            } else {
                println!("📚 Registered types:");
                for name in names {
                    let schema = registry.lookup(&name)?;
                    println!("  {} ({} fields)", name, schema.fields.len());
                }
            }
            Ok(())
        }

        Commands::Show { name, json } => {
            let registry = bootstrap(&config)?;
            let schema = registry
                .lookup(&name)
                .map_err(|e| with_suggestion(&registry, &name, e))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&schema.to_definition())?);
            } else {
                println!("📦 Type: {}", schema.type_name);
                println!("🔒 Fingerprint: {}", schema.fingerprint);
                println!("📄 Fields:");
                for field in &schema.fields {
                    println!("  {}: {}", field.name, field.field_type);
                }
            }
            Ok(())
        }

        Commands::Construct { name } => {
            let registry = bootstrap(&config)?;
            let instance = registry
                .construct(&name)
                .map_err(|e| with_suggestion(&registry, &name, e))?;
            println!("{}", serde_json::to_string_pretty(&instance)?);
            Ok(())
        }

        Commands::Check { files } => {
            let registry = TypeRegistry::from_config(&config);
            let mut all_valid = true;

            for file in &files {
                let result = DefinitionFile::from_path(file).and_then(|defs| defs.register_all(&registry));
                match result {
                    Ok(count) => println!("  ✅ {} - {} types", file.display(), count),
                    Err(e) => {
                        println!("  ❌ {} - {}", file.display(), e);
                        all_valid = false;
                    }
                }
            }

            if !all_valid {
                std::process::exit(1);
            }
            Ok(())
        }

        Commands::Config { output } => {
            match output {
                Some(path) => {
                    config.save(&path)?;
                    println!("✅ Wrote config file: {}", path);
                }
                None => println!("{}", toml::to_string_pretty(&config)?),
            }
            Ok(())
        }
    }
}

/// Attach the closest registered name to a not-found error
fn with_suggestion(registry: &TypeRegistry, name: &str, err: RegistryError) -> Box<dyn std::error::Error> {
    if !err.is_not_found() {
        return err.into();
    }

    let matcher = SkimMatcherV2::default();
    let best = registry
        .type_names()
        .into_iter()
        .filter_map(|candidate| {
            let score = matcher
                .fuzzy_match(&candidate, name)
                .or_else(|| matcher.fuzzy_match(name, &candidate))?;
            Some((score, candidate))
        })
        .max_by_key(|(score, _)| *score);

    match best {
        Some((_, candidate)) => format!("{} (did you mean '{}'?)", err, candidate).into(),
        None => err.into(),
    }
}
