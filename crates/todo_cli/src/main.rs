//! CLI entry point for the todo core.
//!
//! # Responsibility
//! - Run one owner-scoped todo operation against a SQLite file.
//! - Keep output deterministic for quick local sanity checks.
//!
//! File logging is enabled when `TODO_LOG_DIR` is set.

use clap::{Args, Parser, Subcommand};
use log::info;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use todo_core::db::open_db;
use todo_core::{
    init_logging, LogConfig, OwnerId, SqliteTodoStore, Todo, TodoId, TodoService,
};

#[derive(Parser, Debug)]
#[command(name = "todo_cli", version, about = "Owner-scoped ordered todo lists")]
struct Cli {
    /// SQLite database file.
    #[arg(long, env = "TODO_DB", value_name = "PATH")]
    db: PathBuf,

    /// Owner whose list is read or changed.
    #[arg(long, value_name = "UUID")]
    owner: OwnerId,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print todos in order.
    #[command(alias = "ls")]
    List,
    /// Append a todo.
    Add(TextArgs),
    /// Toggle completion.
    Done(IdArgs),
    /// Replace the text of a todo.
    Edit(EditArgs),
    /// Move a todo to a position (clamped to the list end).
    #[command(alias = "mv")]
    Move(MoveArgs),
    /// Delete a todo.
    #[command(alias = "rm")]
    Delete(IdArgs),
    /// Delete completed todos.
    Clear,
    /// Report ordering health.
    Check,
    /// Renumber positions to 0..N.
    Repair,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Add(_) => "add",
            Self::Done(_) => "done",
            Self::Edit(_) => "edit",
            Self::Move(_) => "move",
            Self::Delete(_) => "delete",
            Self::Clear => "clear",
            Self::Check => "check",
            Self::Repair => "repair",
        }
    }
}

#[derive(Args, Debug)]
struct IdArgs {
    id: TodoId,
}

#[derive(Args, Debug)]
struct TextArgs {
    #[arg(required = true, num_args = 1..)]
    words: Vec<String>,
}

#[derive(Args, Debug)]
struct EditArgs {
    id: TodoId,
    #[arg(required = true, num_args = 1..)]
    words: Vec<String>,
}

#[derive(Args, Debug)]
struct MoveArgs {
    id: TodoId,
    #[arg(allow_negative_numbers = true)]
    position: i64,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    if let Some(config) = LogConfig::from_env()? {
        init_logging(&config)?;
    }

    let conn = open_db(&cli.db)?;
    let service = TodoService::new(SqliteTodoStore::try_new(&conn)?);
    let owner_id = cli.owner;
    info!(
        "event=cli_command module=cli status=start command={}",
        cli.command.name()
    );

    match cli.command {
        Command::List => {
            for todo in service.list(owner_id)? {
                print_todo(&todo);
            }
        }
        Command::Add(args) => print_todo(&service.create(owner_id, &args.words.join(" "))?),
        Command::Done(args) => print_todo(&service.toggle_completed(owner_id, args.id)?),
        Command::Edit(args) => {
            print_todo(&service.edit_text(owner_id, args.id, &args.words.join(" "))?)
        }
        Command::Move(args) => {
            let summary = service.move_todo(owner_id, args.id, args.position)?;
            println!("moved repositioned={}", summary.repositioned);
        }
        Command::Delete(args) => {
            let summary = service.delete(owner_id, args.id)?;
            println!(
                "deleted removed={} repositioned={}",
                summary.removed, summary.repositioned
            );
        }
        Command::Clear => {
            let summary = service.clear_completed(owner_id)?;
            println!(
                "cleared removed={} repositioned={}",
                summary.removed, summary.repositioned
            );
        }
        Command::Check => {
            let report = service.verify_ordering(owner_id)?;
            println!("count={} dense={}", report.count, report.dense);
        }
        Command::Repair => {
            let summary = service.repair_ordering(owner_id)?;
            println!("repaired repositioned={}", summary.repositioned);
        }
    }
    Ok(())
}

fn print_todo(todo: &Todo) {
    let mark = if todo.completed { "x" } else { " " };
    println!("{:>3} [{mark}] #{} {}", todo.position, todo.id, todo.text);
}
