//! Relata CLI
//!
//! Loads a dataset of base relations (the built-in family dataset unless
//! `--dataset` is given) and evaluates relations and combinators over it:
//! - `list` / `show` inspect base relations
//! - `test` asks a membership question, induction included
//! - `eval` builds a derived relation from base relations and prints it
//! - `demo` walks through the family example

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use relata_core::{var, Atom, BoundView, Combinator, Dataset, Relation, RelationRegistry, Tuple};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const FAMILY_DATASET: &str = include_str!("../data/family.json");

#[derive(Parser)]
#[command(name = "relata")]
#[command(author, version, about = "Relata: relational algebra over enumerated relations")]
struct Cli {
    /// Dataset to load (JSON). Defaults to the built-in family dataset.
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,

    /// Log filter used when `RELATA_LOG` is not set.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List base relations with their arity, size and properties.
    List,

    /// Print the extension of a base relation.
    Show {
        /// Relation name
        relation: String,
    },

    /// Membership test, including pairs induced by declared properties.
    Test {
        /// Relation name
        relation: String,

        /// One atom per slot
        #[arg(required = true)]
        atoms: Vec<String>,
    },

    /// Build a derived relation from base relations and print it.
    ///
    /// Operands are used unbound, so they unify slot by slot.
    Eval {
        #[arg(value_enum)]
        combinator: CombinatorArg,

        /// Operand relation names
        #[arg(required = true)]
        relations: Vec<String>,

        /// Test these candidates instead of enumerating. Slots of one
        /// candidate are separated by `:` (e.g. `piotr:teresa`).
        #[arg(long, value_delimiter = ',')]
        candidates: Vec<String>,
    },

    /// Walk through the family example: male, child, grandparent, father.
    Demo,
}

#[derive(Clone, Copy, ValueEnum)]
enum CombinatorArg {
    Union,
    Intersection,
    Complement,
    Composition,
    Converse,
}

impl From<CombinatorArg> for Combinator {
    fn from(value: CombinatorArg) -> Self {
        match value {
            CombinatorArg::Union => Combinator::Union,
            CombinatorArg::Intersection => Combinator::Intersection,
            CombinatorArg::Complement => Combinator::Complement,
            CombinatorArg::Composition => Combinator::Composition,
            CombinatorArg::Converse => Combinator::Converse,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let registry = load_registry(cli.dataset.as_deref())?;

    match cli.command {
        Commands::List => cmd_list(&registry),
        Commands::Show { relation } => cmd_show(&registry, &relation),
        Commands::Test { relation, atoms } => cmd_test(&registry, &relation, &atoms),
        Commands::Eval {
            combinator,
            relations,
            candidates,
        } => cmd_eval(&registry, combinator.into(), &relations, &candidates),
        Commands::Demo => cmd_demo(&registry),
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_env("RELATA_LOG").unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_registry(dataset: Option<&Path>) -> Result<RelationRegistry> {
    let dataset = match dataset {
        Some(path) => Dataset::from_path(path)?,
        None => Dataset::from_json_str(FAMILY_DATASET)?,
    };
    let registry = RelationRegistry::new();
    dataset.install(&registry)?;
    Ok(registry)
}

fn lookup(registry: &RelationRegistry, name: &str) -> Result<Relation> {
    registry.get(name).ok_or_else(|| {
        let known: Vec<String> = registry.relations().iter().map(|r| r.name().to_string()).collect();
        anyhow!("unknown relation `{name}` (known: {})", known.join(", "))
    })
}

fn parse_tuple(candidate: &str) -> Tuple {
    candidate.split(':').map(Atom::parse_token).collect()
}

fn verdict(matched: bool) -> colored::ColoredString {
    if matched {
        "yes".green().bold()
    } else {
        "no".red().bold()
    }
}

fn print_extension(relation: &Relation) {
    let extension = relation.extension();
    println!(
        "{} {}",
        relation.to_string().bold(),
        format!("({} tuple(s))", extension.len()).dimmed()
    );
    for tuple in extension.iter() {
        println!("  {tuple}");
    }
}

// ============================================================================
// Commands
// ============================================================================

fn cmd_list(registry: &RelationRegistry) -> Result<()> {
    for relation in registry.relations() {
        println!(
            "{} arity {}  size {:<4} {}",
            format!("{:<24}", relation.name()).bold(),
            relation.arity(),
            relation.len(),
            relation.properties().to_string().cyan()
        );
    }
    Ok(())
}

fn cmd_show(registry: &RelationRegistry, name: &str) -> Result<()> {
    print_extension(&lookup(registry, name)?);
    Ok(())
}

fn cmd_test(registry: &RelationRegistry, name: &str, atoms: &[String]) -> Result<()> {
    let relation = lookup(registry, name)?;
    let tuple: Tuple = atoms.iter().map(|a| Atom::parse_token(a)).collect();
    if tuple.len() != relation.arity() {
        eprintln!(
            "{} `{}` has arity {}, got {} atom(s)",
            "note:".yellow().bold(),
            relation.name(),
            relation.arity(),
            tuple.len()
        );
    }
    println!("{}{}: {}", relation.name(), tuple, verdict(relation.test(&tuple)));
    Ok(())
}

fn cmd_eval(
    registry: &RelationRegistry,
    combinator: Combinator,
    names: &[String],
    candidates: &[String],
) -> Result<()> {
    let operands = names
        .iter()
        .map(|name| lookup(registry, name).map(BoundView::from))
        .collect::<Result<Vec<_>>>()?;
    let derived = registry.derive(combinator, operands)?;

    if candidates.is_empty() {
        print_extension(&derived);
        return Ok(());
    }
    println!("{}", derived.to_string().bold());
    for candidate in candidates {
        let tuple = parse_tuple(candidate);
        println!("  {tuple}: {}", verdict(derived.test(&tuple)));
    }
    Ok(())
}

fn cmd_demo(registry: &RelationRegistry) -> Result<()> {
    let human = lookup(registry, "is_human")?;
    let parent = lookup(registry, "is_parent")?;
    let female = lookup(registry, "is_female")?;

    let male = registry.complement(&female)?;
    let child = registry.derive(Combinator::Converse, vec![BoundView::from(&parent)])?;
    let grandparent = registry.derive(
        Combinator::Composition,
        vec![BoundView::from(&parent), BoundView::from(&parent)],
    )?;
    let father = registry.derive(
        Combinator::Intersection,
        vec![parent.bind([var("A"), var("B")])?, male.bind([var("A")])?],
    )?;

    let people: Vec<Atom> = human.extension().iter().map(|t| t[0].clone()).collect();
    let list = |r: &Relation| {
        let names: Vec<String> = r.filter(people.iter().cloned()).map(|a| a.to_string()).collect();
        println!("{} {}", r.name().bold(), names.join(", "));
    };
    list(&female);
    list(&male);
    println!();

    let ask = |r: &Relation, a: &str, b: &str| {
        println!("{a} {} {b}: {}", r.name(), verdict(r.test((a, b))));
    };
    ask(&parent, "teresa", "piotr");
    ask(&parent, "piotr", "teresa");
    ask(&father, "teresa", "ania");
    ask(&father, "robert", "ania");
    println!();
    ask(&child, "piotr", "teresa");
    ask(&grandparent, "janina", "karol");
    ask(&grandparent, "teresa", "karol");
    println!();

    print_extension(&grandparent);
    Ok(())
}
