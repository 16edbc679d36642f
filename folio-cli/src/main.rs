use clap::{Parser, Subcommand, ValueEnum};
use folio::content::{Admin, Donation, Friend, Project, SocialMedia, Update};
use folio::editor::SectionEntry;
use folio::{Config, ContentStore, Section, SectionUpdate};
use std::process;

/// folio CLI: inspect and edit a portfolio site document from the command line
#[derive(Parser)]
#[command(name = "folio", version, about)]
struct Cli {
    /// Path to the site document (overrides folio.yaml and FOLIO_DATA_FILE)
    #[arg(long)]
    data_file: Option<String>,

    /// Output format
    #[arg(long, default_value = "yaml")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Yaml,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Create the document with seed data if it does not exist
    Init,

    /// Print the whole document or one section
    Show {
        /// Section name (profile, social, friends, projects, updates, donations, admin, stats)
        section: Option<String>,
    },

    /// Replace a whole section with JSON or YAML from a file or stdin
    Set {
        /// Section name
        section: String,
        /// Read the value from a file
        #[arg(long)]
        file: Option<String>,
        /// Read the value from stdin
        #[arg(long)]
        stdin: bool,
    },

    /// Edit projects (key: id)
    Project {
        #[command(subcommand)]
        action: EntryAction,
    },

    /// Edit friends (key: name)
    Friend {
        #[command(subcommand)]
        action: EntryAction,
    },

    /// Edit social links (key: name)
    Social {
        #[command(subcommand)]
        action: EntryAction,
    },

    /// Edit updates (key: date)
    Update {
        #[command(subcommand)]
        action: EntryAction,
    },

    /// Edit donation links (key: name)
    Donation {
        #[command(subcommand)]
        action: EntryAction,
    },

    /// Show the visitor count, or count a visit
    Visitors {
        #[arg(long)]
        increment: bool,
    },

    /// Print an Argon2 hash for a password
    HashPassword { password: String },

    /// Store a new admin password (hashed)
    SetPassword {
        /// Also change the admin username
        #[arg(long)]
        username: Option<String>,
        password: String,
    },
}

#[derive(Subcommand)]
enum EntryAction {
    /// List entries
    List,

    /// Add an entry (e.g. --field name="Site" --field description.en="My site")
    Add {
        #[arg(long = "field", value_parser = parse_key_value)]
        fields: Vec<(String, String)>,
    },

    /// Change fields of an existing entry
    Edit {
        key: String,
        #[arg(long = "field", value_parser = parse_key_value)]
        fields: Vec<(String, String)>,
    },

    /// Remove every entry with the key
    Remove { key: String },
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let pos = s.find('=').ok_or_else(|| {
        format!("Invalid key=value pair: no '=' found in '{s}'")
    })?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("ERROR:{e}");
        process::exit(1);
    }
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn run(cli: Cli) -> CliResult<()> {
    let mut config = Config::load()?;
    if let Some(path) = &cli.data_file {
        config.data_file = path.into();
    }
    let store = || config.open_store();

    let output = match cli.command {
        Command::HashPassword { password } => {
            println!("{}", folio::auth::hash_password(&password)?);
            return Ok(());
        }

        Command::Init => serde_json::json!({
            "ok": true,
            "path": store()?.describe(),
        }),

        Command::Show { section } => {
            let db = store()?.read()?;
            match section {
                Some(name) => db.section_value(name.parse::<Section>()?)?,
                None => serde_json::to_value(&db)?,
            }
        }

        Command::Set {
            section,
            file,
            stdin,
        } => {
            let raw = read_input(file, stdin)?;
            let value: serde_json::Value = serde_yaml::from_str(&raw)?;
            let db = store()?.update_section_raw(&section, value)?;
            db.section_value(section.parse()?)?
        }

        Command::Project { action } => run_entries::<Project>(&store()?, action)?,
        Command::Friend { action } => run_entries::<Friend>(&store()?, action)?,
        Command::Social { action } => run_entries::<SocialMedia>(&store()?, action)?,
        Command::Update { action } => run_entries::<Update>(&store()?, action)?,
        Command::Donation { action } => run_entries::<Donation>(&store()?, action)?,

        Command::Visitors { increment } => {
            let store = store()?;
            if increment {
                serde_json::json!({ "count": store.visitors().increment()? })
            } else {
                serde_json::to_value(store.visitors().stats()?)?
            }
        }

        Command::SetPassword { username, password } => {
            let store = store()?;
            let current = store.read()?.admin;
            let admin = Admin {
                username: username.unwrap_or(current.username),
                password: folio::auth::hash_password(&password)?,
            };
            let db = store.update_section(SectionUpdate::Admin(admin))?;
            serde_json::json!({ "ok": true, "username": db.admin.username })
        }
    };

    print_output(&output, &cli.format)
}

fn run_entries<T: SectionEntry>(store: &ContentStore, action: EntryAction) -> CliResult<serde_json::Value> {
    let editor = store.editor::<T>();
    let value = match action {
        EntryAction::List => serde_json::to_value(editor.list()?)?,

        EntryAction::Add { fields } => {
            let entry: T = serde_json::from_value(fields_to_value(&fields))?;
            serde_json::to_value(editor.add(entry)?)?
        }

        EntryAction::Edit { key, fields } => {
            let key = parse_entry_key::<T>(&key)?;
            let mut merged = serde_json::to_value(editor.get(&key)?)?;
            merge_into(&mut merged, fields_to_value(&fields));
            let entry: T = serde_json::from_value(merged)?;
            serde_json::to_value(editor.edit(&key, entry)?)?
        }

        EntryAction::Remove { key } => {
            let parsed = parse_entry_key::<T>(&key)?;
            let left = editor.remove(&parsed)?;
            serde_json::json!({ "ok": true, "removed": key, "remaining": left.len() })
        }
    };
    Ok(value)
}

fn parse_entry_key<T: SectionEntry>(key: &str) -> CliResult<T::Key> {
    key.parse::<T::Key>()
        .map_err(|_| format!("Invalid {} key '{key}'", T::SECTION).into())
}

fn print_output(value: &serde_json::Value, format: &OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
    }
    Ok(())
}

/// Build an object from `key=value` pairs. Dotted keys nest
/// (`title.en=Hi` becomes `{"title": {"en": "Hi"}}`).
fn fields_to_value(fields: &[(String, String)]) -> serde_json::Value {
    let mut root = serde_json::Value::Object(serde_json::Map::new());
    for (key, val) in fields {
        let json_val = field_value(val);
        let mut node = &mut root;
        let mut parts = key.split('.').peekable();
        while let Some(part) = parts.next() {
            if !node.is_object() {
                *node = serde_json::Value::Object(serde_json::Map::new());
            }
            let map = match node.as_object_mut() {
                Some(map) => map,
                None => break,
            };
            if parts.peek().is_none() {
                map.insert(part.to_string(), json_val.clone());
                break;
            }
            node = map
                .entry(part.to_string())
                .or_insert_with(|| serde_json::Value::Object(serde_json::Map::new()));
        }
    }
    root
}

/// Entry fields are strings or string lists, so only `[...]` and `{...}` are
/// read as JSON. `name=2024` stays the string "2024".
fn field_value(raw: &str) -> serde_json::Value {
    let trimmed = raw.trim_start();
    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        if let Ok(value) = serde_json::from_str(raw) {
            return value;
        }
    }
    serde_json::Value::String(raw.to_string())
}

/// Recursively overwrite `base` with the fields present in `patch`.
fn merge_into(base: &mut serde_json::Value, patch: serde_json::Value) {
    match (base, patch) {
        (serde_json::Value::Object(base_map), serde_json::Value::Object(patch_map)) => {
            for (key, value) in patch_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_into(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, patch) => *base = patch,
    }
}

fn read_input(file: Option<String>, stdin: bool) -> CliResult<String> {
    if let Some(path) = file {
        let content = std::fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read '{path}': {e}"))?;
        Ok(content)
    } else if stdin {
        use std::io::Read;
        let mut content = String::new();
        std::io::stdin().read_to_string(&mut content)?;
        Ok(content)
    } else {
        Err("Provide --file or --stdin".into())
    }
}
