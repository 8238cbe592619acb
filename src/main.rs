// src/main.rs

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Value};

use keyadmin::config::KeyAdminConfig;
use keyadmin::criteria::Criteria;
use keyadmin::errors::{KeyAdminError, KeyAdminResult};
use keyadmin::logging::init_logging;
use keyadmin::operation::Operation;
use keyadmin::Portal;

/// Command-line access to the Key Administrator gateway.
#[derive(Parser, Debug)]
#[command(name = "keyadmin", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file (defaults to ./keyadmin.toml when present)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    connection: ConnectionArgs,
}

/// Overrides applied on top of the loaded configuration.
#[derive(Args, Debug)]
struct ConnectionArgs {
    /// Gateway host
    #[arg(long, global = true)]
    host: Option<String>,

    /// Gateway port
    #[arg(long, global = true)]
    port: Option<u16>,

    /// Reseller login
    #[arg(long, short = 'u', global = true)]
    username: Option<String>,

    /// Reseller password
    #[arg(long, short = 'p', global = true, env = "KEYADMIN_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long, global = true)]
    insecure: bool,

    /// Trace request and response bodies
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the credentials are accepted
    LoginValid,

    /// Generate a new password for the login
    NewPassword,

    /// Show key information
    KeyInfo {
        key_number: String,
    },

    /// Retrieve a key file
    KeyRetrieve {
        key_number: String,

        /// Ask for a key usable by earlier product versions
        #[arg(long)]
        compatible: bool,
    },

    /// Find key numbers by server address
    FindKeys {
        #[arg(long = "ip")]
        ips: Vec<String>,

        #[arg(long = "mac")]
        macs: Vec<String>,
    },

    /// Search client accounts
    FindClient {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        company_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        key_number: Option<String>,
    },

    /// Run any registered operation, e.g. `call key.bind PLSK.1 10.0.0.1`
    ///
    /// Arguments are sent as strings. With `--json` each argument is parsed
    /// as a JSON value instead, e.g. `call --json key.retrieve '"PLSK.1"' true`.
    Call {
        operation: String,

        /// Parse every argument as JSON
        #[arg(long)]
        json: bool,

        args: Vec<String>,
    },
}

fn print_json(value: &impl Serialize) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => eprintln!("failed to render output: {e}"),
    }
}

fn parse_args(operation: Operation, raw: &[String], json: bool) -> KeyAdminResult<Vec<Value>> {
    if !json {
        return Ok(raw.iter().map(|arg| Value::String(arg.clone())).collect());
    }
    raw.iter()
        .map(|arg| {
            serde_json::from_str(arg).map_err(|e| KeyAdminError::InvalidArguments {
                operation,
                reason: format!("'{arg}' is not valid JSON: {e}"),
            })
        })
        .collect()
}

fn client_criteria(pairs: [(&str, Option<String>); 5]) -> Criteria {
    pairs
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key.to_string(), Value::String(v))))
        .collect()
}

#[tokio::main]
async fn main() -> KeyAdminResult<()> {
    let cli = Cli::parse();

    let mut config = KeyAdminConfig::load_from(cli.config.as_deref())?;
    let overrides = cli.connection;
    if let Some(host) = overrides.host {
        config.portal.host = host;
    }
    if let Some(port) = overrides.port {
        config.portal.port = port;
    }
    if let Some(username) = overrides.username {
        config.portal.username = username;
    }
    if let Some(password) = overrides.password {
        config.portal.password = password;
    }
    if overrides.insecure {
        config.portal.verify_tls = false;
    }
    if overrides.debug {
        config.portal.debug = true;
        config.logging.enabled = true;
        config.logging.level = "trace".to_string();
    }
    config.validate()?;
    init_logging(&config.logging);

    let portal = Portal::connect(&config.portal)?;

    match cli.command {
        Command::LoginValid => {
            print_json(&json!({ "valid": portal.client().login_valid().await? }));
        }
        Command::NewPassword => {
            print_json(&json!({ "password": portal.client().generate_new_password().await? }));
        }
        Command::KeyInfo { key_number } => {
            print_json(&portal.key().metadata(&key_number).await?);
        }
        Command::KeyRetrieve {
            key_number,
            compatible,
        } => {
            print_json(&portal.key().retrieve(&key_number, compatible).await?);
        }
        Command::FindKeys { ips, macs } => {
            let mut criteria = Criteria::new();
            criteria.insert("ips".to_string(), json!(ips));
            criteria.insert("macs".to_string(), json!(macs));
            print_json(&portal.key().find_by(criteria).await?);
        }
        Command::FindClient {
            first_name,
            last_name,
            company_name,
            email,
            key_number,
        } => {
            let criteria = client_criteria([
                ("first_name", first_name),
                ("last_name", last_name),
                ("company_name", company_name),
                ("email", email),
                ("key_number", key_number),
            ]);
            print_json(&portal.client().find_by(criteria).await?);
        }
        Command::Call {
            operation,
            json,
            args,
        } => {
            let operation: Operation = operation.parse()?;
            let args = parse_args(operation, &args, json)?;
            print_json(&portal.dispatch(operation, args).await?);
        }
    }

    Ok(())
}
