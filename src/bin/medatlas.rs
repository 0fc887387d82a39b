//! MedAtlas CLI
//!
//! Loads the configured content modules and answers queries against them.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use medatlas::{ContentStore, Facet, Level, OutputFormat, StoreConfig};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "medatlas")]
#[command(about = "Query leveled medical reference content")]
struct Cli {
    /// Config file layered over the default locations
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Extra directory of JSON content modules (repeatable)
    #[arg(long = "content-dir", global = true)]
    content_dirs: Vec<PathBuf>,

    /// Skip the corpus compiled into the binary
    #[arg(long, global = true)]
    no_bundled: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load every module and report integrity problems
    Validate,

    /// Print one entity, or one of its levels, as JSON
    Show {
        id: String,
        /// Level 1-5
        #[arg(short, long)]
        level: Option<u8>,
    },

    /// List the levels an entity declares
    Levels { id: String },

    /// List entities by facet (type, region, system, division, category,
    /// specialty, rotation, discipline)
    Facet {
        axis: String,
        /// Omit to list the axis' values
        value: Option<String>,
    },

    /// List entities carrying a tag
    Tag {
        /// Omit to list every tag
        tag: Option<String>,
    },

    /// Find entities by exact name or alternate name
    Find { name: String },

    /// Find entities by FMA, HPO, ICD-10 or ICD-11 code
    Code { code: String },

    /// Resolve an entity's cross-references
    Xrefs { id: String },

    /// List entities that link to an entity
    Backlinks { id: String },

    /// Show catalog statistics
    Stats,

    /// Export the cross-reference graph as GraphViz DOT
    GraphExport {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = StoreConfig::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    if cli.no_bundled {
        config.sources.include_bundled = false;
    }
    config.sources.directories.extend(cli.content_dirs);
    let format = config.output.format;

    let store = ContentStore::open(&config).context("failed to load content")?;

    match cli.command {
        Commands::Validate => {
            let stats = store.stats();
            println!(
                "✅ Loaded {} entities from {} modules",
                stats.entities, stats.modules
            );
            let problems = store.integrity_report();
            if problems.is_empty() {
                println!("✅ All {} cross-references resolve", stats.cross_references);
            } else {
                for problem in problems {
                    let marker = if problem.is_warning() { "⚠️ " } else { "❌" };
                    println!("  {} {}", marker, problem);
                }
                if stats.dangling_references > 0 {
                    bail!("{} dangling cross-reference(s)", stats.dangling_references);
                }
                println!("⚠️  {} type mismatch warning(s)", stats.type_mismatches);
            }
        }

        Commands::Show { id, level } => {
            let entity = store
                .get_by_id(&id)
                .with_context(|| format!("no entity with id `{}`", id))?;
            match level {
                Some(n) => {
                    let level = Level::new(n).with_context(|| format!("level {} outside 1-5", n))?;
                    let content = entity
                        .level(level)
                        .with_context(|| format!("`{}` does not declare level {}", id, level))?;
                    print_json(content, format)?;
                }
                None => print_json(&**entity, format)?,
            }
        }

        Commands::Levels { id } => {
            let entity = store
                .get_by_id(&id)
                .with_context(|| format!("no entity with id `{}`", id))?;
            println!("📚 {} ({})", entity.name, entity.id);
            if entity.levels.is_empty() {
                println!("   (no levels declared)");
            }
            for (level, content) in &entity.levels {
                println!("   {} {:<22} {}", level, level.audience(), content.summary);
            }
        }

        Commands::Facet { axis, value } => {
            let facet: Facet = axis.parse().map_err(anyhow::Error::msg)?;
            match value {
                Some(value) => {
                    let entities = store.get_by_facet(facet, &value);
                    println!("🔎 {} = {} ({} entities)", facet, value, entities.len());
                    for entity in entities {
                        println!("   {} [{}] {}", entity.id, entity.content_type(), entity.name);
                    }
                }
                None => {
                    for (value, count) in store.facet_values(facet) {
                        println!("   {:<24} {}", value, count);
                    }
                }
            }
        }

        Commands::Tag { tag } => match tag {
            Some(tag) => {
                let entities = store.get_by_tag(&tag);
                println!("🏷️  {} ({} entities)", tag, entities.len());
                for entity in entities {
                    println!("   {} [{}] {}", entity.id, entity.content_type(), entity.name);
                }
            }
            None => {
                for (tag, count) in store.tags() {
                    println!("   {:<32} {}", tag, count);
                }
            }
        },

        Commands::Find { name } => {
            let entities = store.find_by_name(&name);
            if entities.is_empty() {
                println!("No entity named `{}`", name);
            }
            for entity in entities {
                println!("   {} [{}] {}", entity.id, entity.content_type(), entity.name);
            }
        }

        Commands::Code { code } => {
            let entities = store.find_by_code(&code);
            if entities.is_empty() {
                println!("No entity coded `{}`", code);
            }
            for entity in entities {
                println!("   {} [{}] {}", entity.id, entity.content_type(), entity.name);
            }
        }

        Commands::Xrefs { id } => {
            let entity = store
                .get_by_id(&id)
                .with_context(|| format!("no entity with id `{}`", id))?;
            println!("🔗 {} ({} cross-references)", entity.id, entity.cross_references.len());
            for (reference, result) in entity.cross_references.iter().zip(store.get_cross_references(&id)) {
                match result {
                    Ok(target) => println!(
                        "   ✅ {:<10} {} ({})",
                        reference.relationship,
                        target.id,
                        reference.display_label()
                    ),
                    Err(e) if e.is_warning() => println!("   ⚠️  {:<10} {}", reference.relationship, e),
                    Err(e) => println!("   ❌ {:<10} {}", reference.relationship, e),
                }
            }
        }

        Commands::Backlinks { id } => {
            if !store.exists(&id) {
                bail!("no entity with id `{}`", id);
            }
            let backlinks = store.referenced_by(&id);
            println!("↩️  {} is referenced by {} entities", id, backlinks.len());
            for (entity, relationship) in backlinks {
                println!("   {:<10} {} [{}]", relationship, entity.id, entity.content_type());
            }
        }

        Commands::Stats => {
            print_json(&store.stats(), format)?;
        }

        Commands::GraphExport { output } => {
            let dot = store.reference_graph().to_dot();
            match output {
                Some(path) => {
                    std::fs::write(&path, dot)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("✅ Wrote cross-reference graph to {}", path.display());
                }
                None => print!("{}", dot),
            }
        }
    }

    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let json = match format {
        OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
        OutputFormat::Compact => serde_json::to_string(value)?,
    };
    println!("{}", json);
    Ok(())
}
