use std::error::Error;

use clap::{Args, Parser, Subcommand};
use engine::{Expense, ExpenseType, Fields, Location, RecordId, UserClock};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use serde_json::Value;

#[derive(Parser, Debug)]
#[command(name = "expenses_admin")]
#[command(about = "Admin utilities for the expenses tracker (bootstrap lookups, record expenses)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./expenses.db?mode=rwc"
    )]
    database_url: String,

    /// Log level for the admin tool.
    #[arg(long, env = "EXPENSES_LOG", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Type(Lookup),
    Location(Lookup),
    Expense(ExpenseArgs),
}

#[derive(Args, Debug)]
struct Lookup {
    #[command(subcommand)]
    command: LookupCommand,
}

#[derive(Subcommand, Debug)]
enum LookupCommand {
    Create {
        #[arg(long)]
        description: String,
    },
    List,
}

#[derive(Args, Debug)]
struct ExpenseArgs {
    #[command(subcommand)]
    command: ExpenseCommand,
}

#[derive(Subcommand, Debug)]
enum ExpenseCommand {
    Create(ExpenseCreateArgs),
    Show {
        #[arg(long)]
        id: i64,
    },
}

#[derive(Args, Debug)]
struct ExpenseCreateArgs {
    #[arg(long)]
    type_id: String,
    #[arg(long)]
    location_id: String,
    #[arg(long)]
    amount: String,
    #[arg(long)]
    comment: Option<String>,
    /// `YYYY-MM-DD HH:MM:SS`, defaults to now.
    #[arg(long)]
    date: Option<String>,
}

impl ExpenseCreateArgs {
    fn into_fields(self) -> Fields {
        let mut fields = Fields::new();
        fields.insert("typeid".to_string(), Value::String(self.type_id));
        fields.insert("locationid".to_string(), Value::String(self.location_id));
        fields.insert("amount".to_string(), Value::String(self.amount));
        if let Some(comment) = self.comment {
            fields.insert("comment".to_string(), Value::String(comment));
        }
        if let Some(date) = self.date {
            fields.insert("date".to_string(), Value::String(date));
        }
        fields
    }
}

fn description_fields(description: String) -> Fields {
    let mut fields = Fields::new();
    fields.insert("description".to_string(), Value::String(description));
    fields
}

async fn run_lookup_type(
    db: &DatabaseConnection,
    command: LookupCommand,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    match command {
        LookupCommand::Create { description } => {
            let kind = ExpenseType::create(db, &description_fields(description)).await?;
            tracing::info!(typeid = %kind.id(), "type created");
            println!("{}", kind.id());
        }
        LookupCommand::List => {
            for kind in ExpenseType::all(db).await? {
                println!("{}\t{}", kind.id(), kind.description()?);
            }
        }
    }
    Ok(())
}

async fn run_lookup_location(
    db: &DatabaseConnection,
    command: LookupCommand,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    match command {
        LookupCommand::Create { description } => {
            let location = Location::create(db, &description_fields(description)).await?;
            tracing::info!(locationid = %location.id(), "location created");
            println!("{}", location.id());
        }
        LookupCommand::List => {
            for location in Location::all(db).await? {
                println!("{}\t{}", location.id(), location.description()?);
            }
        }
    }
    Ok(())
}

async fn print_expense(
    db: &DatabaseConnection,
    expense: &Expense,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let kind = expense.expense_type(db).await?;
    let location = expense.location(db).await?;
    println!(
        "#{} {} {} at {} on {} {}",
        expense.id(),
        expense.amount()?,
        kind.description()?,
        location.description()?,
        expense.date(&UserClock::default(), false)?,
        expense.comment()?
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "expenses_admin={level},engine={level}",
            level = cli.log_level
        ))
        .init();

    let db = Database::connect(&cli.database_url).await?;
    migration::Migrator::up(&db, None).await?;

    match cli.command {
        Command::Type(lookup) => run_lookup_type(&db, lookup.command).await?,
        Command::Location(lookup) => run_lookup_location(&db, lookup.command).await?,
        Command::Expense(args) => match args.command {
            ExpenseCommand::Create(create) => {
                let expense = Expense::create_resolved(&db, &create.into_fields()).await?;
                tracing::info!(expense = %expense.id(), "expense created");
                print_expense(&db, &expense).await?;
            }
            ExpenseCommand::Show { id } => {
                let expense = Expense::find(&db, RecordId::new(id)?).await?;
                print_expense(&db, &expense).await?;
            }
        },
    }

    Ok(())
}
