//! CLI front-end for the triple-store core: a thin `clap` surface that
//! resolves a [`Config`], drives exactly one façade/parser/planner/
//! executor operation per subcommand, and prints the result.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use triplestore_core::config::Config;
use triplestore_core::database::{Database, DatabaseBuilder};
use triplestore_core::{executor, parser, planner};

#[derive(Parser)]
#[command(name = "triplestore", version, about = "An in-memory RDF triple-store with a SPARQL subset engine")]
struct Cli {
    /// Directory holding `<name>.db` databases.
    #[arg(long, env = "TRIPLESTORE_DB_ROOT", global = true)]
    db_root: Option<PathBuf>,

    /// Emit result rows as JSON instead of an aligned table.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a database from a whitespace-separated triples file and save it.
    Create { name: String, data_file: PathBuf },
    /// Load only the dictionaries and print summary statistics.
    LoadBasic { name: String },
    /// Load the dictionaries and every predicate's triples.
    LoadAll { name: String },
    /// Load the dictionaries and only the named predicates' triples.
    LoadPartial {
        name: String,
        #[arg(required = true)]
        predicates: Vec<String>,
    },
    /// Insert one triple and save.
    Insert { name: String, s: String, p: String, o: String },
    /// Run a SPARQL SELECT or INSERT DATA statement.
    Query { name: String, sparql: String },
    /// Re-save an already-loaded database (loads all first).
    Save { name: String },
    /// Print dictionary/index statistics for a database.
    Stats { name: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let cfg = Config::resolve(cli.db_root.clone(), None);

    match cli.command {
        Command::Create { name, data_file } => {
            let db = DatabaseBuilder::create(cfg.db_root.clone(), &name, &data_file)
                .await
                .context("failed to create database from data file")?;
            db.save().await.context("failed to save database")?;
            println!("created '{name}' with {} triples", db.triple_count());
        }
        Command::LoadBasic { name } => {
            let db = DatabaseBuilder::load_basic(cfg.db_root.clone(), &name).await?;
            print_stats(&db, cli.json)?;
        }
        Command::LoadAll { name } => {
            let db = DatabaseBuilder::load_all(cfg.db_root.clone(), &name).await?;
            print_stats(&db, cli.json)?;
        }
        Command::LoadPartial { name, predicates } => {
            let db = DatabaseBuilder::load_partial(cfg.db_root.clone(), &name, &predicates).await?;
            print_stats(&db, cli.json)?;
        }
        Command::Insert { name, s, p, o } => {
            let mut db = DatabaseBuilder::load_all(cfg.db_root.clone(), &name)
                .await
                .context("insert requires an existing database; run `create` first")?;
            db.insert(&s, &p, &o);
            db.save().await.context("failed to save database")?;
            println!("inserted ({s} {p} {o}); {} triples total", db.triple_count());
        }
        Command::Save { name } => {
            let db = DatabaseBuilder::load_all(cfg.db_root.clone(), &name).await?;
            db.save().await.context("failed to save database")?;
            println!("saved '{name}'");
        }
        Command::Stats { name } => {
            let db = DatabaseBuilder::load_basic(cfg.db_root.clone(), &name).await?;
            print_stats(&db, cli.json)?;
        }
        Command::Query { name, sparql } => {
            let db = DatabaseBuilder::load_all(cfg.db_root.clone(), &name).await?;
            run_query(&db, &sparql, cli.json)?;
        }
    }

    Ok(())
}

fn print_stats(db: &Database, json: bool) -> Result<()> {
    if json {
        let payload = serde_json::json!({
            "name": db.name(),
            "triple_count": db.triple_count(),
            "predicate_count": db.predicate_statistics().len().saturating_sub(1),
        });
        println!("{payload}");
    } else {
        println!("database:         {}", db.name());
        println!("triple_count:     {}", db.triple_count());
        println!("predicate_count:  {}", db.predicate_statistics().len().saturating_sub(1));
    }
    Ok(())
}

fn run_query(db: &Database, sparql: &str, json: bool) -> Result<()> {
    match parser::parse(sparql)? {
        parser::ParsedStatement::Select(query) => {
            let query_plan = planner::plan(db, &query.patterns)?;
            let outcome = executor::execute(db, query_plan.steps);
            let rows = executor::project(db, &outcome.rows, &query_plan.var_ids, &query.variables, query.distinct)?;
            print_rows(&query.variables, &rows, outcome.last_query_time_ms, json);
        }
        parser::ParsedStatement::Insert(_) => {
            anyhow::bail!("INSERT DATA must go through the `insert` subcommand, not `query`");
        }
    }
    Ok(())
}

fn print_rows(vars: &[String], rows: &[Vec<String>], elapsed_ms: f64, json: bool) {
    if json {
        let payload = serde_json::json!({ "variables": vars, "rows": rows, "last_query_time_ms": elapsed_ms });
        println!("{payload}");
        return;
    }

    println!("{}", vars.join("\t"));
    for row in rows {
        println!("{}", row.join("\t"));
    }
    println!("-- {} row(s) in {:.3} ms", rows.len(), elapsed_ms);
}
