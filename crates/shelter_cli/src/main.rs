//! Command-line front end for the shelter pet store.
//!
//! # Responsibility
//! - Map catalog menu actions (list, show, insert dummy data, delete) and
//!   editor saves (add, edit) onto store calls.
//! - Own all user-facing messages; the core only returns counts and errors.

use clap::{Args, Parser, Subcommand};
use shelter_core::{
    collection_locator, default_log_level, init_logging, Gender, Locator, Pet, PetFields,
    PetStore, StoreConfig, StoreError, StoreResult, DATABASE_NAME,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "shelter")]
#[command(version)]
#[command(about = "Manage the local pet shelter catalog")]
struct Cli {
    /// Path to the database file
    #[arg(short, long, global = true, default_value = DATABASE_NAME)]
    db: PathBuf,

    /// Absolute directory for rolling log files (logging is off when unset)
    #[arg(long, global = true)]
    log_dir: Option<String>,

    /// Log level: trace|debug|info|warn|error
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every pet
    List,
    /// Show one pet by locator (`pets/3`) or bare id (`3`)
    Show { target: String },
    /// Insert the sample pet Toto
    InsertDummy,
    /// Add a pet; name is required, omitted fields take their defaults
    Add(PetArgs),
    /// Change the supplied fields of one pet
    Edit {
        target: String,
        #[command(flatten)]
        fields: PetArgs,
    },
    /// Delete one pet by locator or id
    Delete { target: String },
    /// Delete every pet
    DeleteAll,
    /// Print the number of pets
    Count,
}

/// Editor fields. Text is trimmed and validated by the core.
#[derive(Args)]
struct PetArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    breed: Option<String>,
    /// unknown|male|female or 0|1|2
    #[arg(long, value_parser = parse_gender)]
    gender: Option<Gender>,
    /// Weight in kg
    #[arg(long, allow_negative_numbers = true)]
    weight: Option<i64>,
}

impl PetArgs {
    fn to_fields(&self) -> PetFields {
        let mut fields = PetFields::new();
        if let Some(name) = &self.name {
            fields = fields.name(name.as_str());
        }
        if let Some(breed) = &self.breed {
            fields = fields.breed(breed.as_str());
        }
        if let Some(gender) = self.gender {
            fields = fields.gender(gender);
        }
        if let Some(weight) = self.weight {
            fields = fields.weight(weight);
        }
        fields
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        if let Err(err) = init_logging(level, log_dir) {
            eprintln!("warning: logging disabled: {err}");
        }
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let store = PetStore::connect(StoreConfig::at_path(&cli.db))
        .map_err(|err| format!("cannot open {}: {err}", cli.db.display()))?;

    let result = execute(&store, &cli.command);
    if let Err(err) = store.close() {
        eprintln!("warning: {err}");
    }
    result
}

fn execute(store: &PetStore, command: &Commands) -> Result<(), String> {
    match command {
        Commands::List => {
            let pets = store.query(&collection_locator()).map_err(describe)?;
            if pets.is_empty() {
                println!("No pets yet.");
            }
            for pet in &pets {
                println!("{}", format_pet(pet));
            }
        }
        Commands::Show { target } => {
            let locator = parse_target(target)?;
            match store.query_one(&locator).map_err(describe)? {
                Some(pet) => println!("{}", format_pet(&pet)),
                None => println!("No pet at {locator}."),
            }
        }
        Commands::InsertDummy => {
            let locator = insert_dummy(store).map_err(describe)?;
            println!("Inserted {locator}.");
        }
        Commands::Add(args) => {
            let locator = store
                .insert(&collection_locator(), &args.to_fields())
                .map_err(|err| format!("Error with saving pet: {err}"))?;
            println!("Pet saved as {locator}.");
        }
        Commands::Edit { target, fields } => {
            let locator = parse_target(target)?;
            let updated = store
                .update(&locator, &fields.to_fields())
                .map_err(|err| format!("Error with updating pet: {err}"))?;
            match updated {
                0 => println!("Error with updating pet."),
                _ => println!("Pet updated."),
            }
        }
        Commands::Delete { target } => {
            let locator = parse_target(target)?;
            match store.delete(&locator).map_err(describe)? {
                0 => println!("Error with deleting pet."),
                _ => println!("Pet deleted."),
            }
        }
        Commands::DeleteAll => {
            let deleted = store.delete(&collection_locator()).map_err(describe)?;
            println!("Deleted {deleted} pet(s).");
        }
        Commands::Count => println!("{}", store.count().map_err(describe)?),
    }
    Ok(())
}

fn insert_dummy(store: &PetStore) -> StoreResult<Locator> {
    let fields = PetFields::new()
        .name("Toto")
        .breed("Terrier")
        .gender(Gender::Male)
        .weight(7);
    store.insert(&collection_locator(), &fields)
}

/// Accepts a full locator or a bare numeric id.
fn parse_target(target: &str) -> Result<Locator, String> {
    let text = if target.bytes().all(|byte| byte.is_ascii_digit()) && !target.is_empty() {
        format!("pets/{target}")
    } else {
        target.to_string()
    };
    text.parse::<Locator>().map_err(|err| err.to_string())
}

fn parse_gender(value: &str) -> Result<Gender, String> {
    let value = value.trim();
    if let Ok(code) = value.parse::<i64>() {
        return Gender::from_code(code).ok_or_else(|| format!("unknown gender code `{code}`"));
    }
    [Gender::Unknown, Gender::Male, Gender::Female]
        .into_iter()
        .find(|gender| gender.label().eq_ignore_ascii_case(value))
        .ok_or_else(|| format!("unknown gender `{value}`"))
}

fn format_pet(pet: &Pet) -> String {
    let breed = if pet.breed.is_empty() {
        "unknown breed"
    } else {
        pet.breed.as_str()
    };
    format!(
        "#{} {} ({breed}, {}, {} kg)",
        pet.id, pet.name, pet.gender, pet.weight
    )
}

fn describe(err: StoreError) -> String {
    err.to_string()
}
