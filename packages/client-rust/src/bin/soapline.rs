//! Soapline command line client.
//!
//! # Usage
//!
//! ```bash
//! # List operations and each overload's inputs
//! soapline -d duck_service.json operations
//!
//! # Call an operation by keyword
//! soapline -d duck_service.json call Disco.Submit sessionID=1 errorMessage='"No error"' assetData=Data
//!
//! # Call the third overload positionally, replying from a file
//! soapline -d duck_service.json call Disco.Submit --index 2 --inject reply.xml 1 2 3 true err asset
//!
//! # Build a value object
//! soapline -d duck_service.json create T_KeyValuePair Key=k Value=v
//! ```

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context as _};
use clap::{Parser, Subcommand};
use soapline_client::{
    CallArguments, Client, ClientConfig, Detail, InjectedReply, OperationHandle, Response,
};
use soapline_core::Value;

#[derive(Parser)]
#[command(name = "soapline")]
#[command(version)]
#[command(about = "Invoke operations on a described SOAP service")]
struct Cli {
    /// Service description locator (file path, file:// or http(s):// URL)
    #[arg(long, short, env = "SOAPLINE_DESCRIPTION")]
    description: String,

    /// Return (status, detail) pairs instead of failing on faults
    #[arg(long, global = true)]
    no_raise_faults: bool,

    /// Proxy per URL scheme, e.g. http=http://proxy:3128 (repeatable)
    #[arg(long = "proxy", value_name = "SCHEME=URL", global = true)]
    proxies: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List operation names and the inputs of each signature
    Operations,

    /// Invoke an operation
    Call {
        operation: String,

        /// Pre-select an overload by declaration index
        #[arg(long)]
        index: Option<usize>,

        /// Use the file's contents as the reply instead of the network
        #[arg(long, value_name = "FILE")]
        inject: Option<PathBuf>,

        /// HTTP status reported for an injected reply
        #[arg(long, default_value_t = 200, requires = "inject")]
        inject_status: u16,

        /// NAME=VALUE binds by name; anything else binds positionally.
        /// Values are parsed as JSON, falling back to plain strings.
        args: Vec<String>,
    },

    /// Construct a value object and print it as JSON
    Create {
        type_name: String,

        /// FIELD=VALUE assignments
        fields: Vec<String>,
    },
}

fn parse_value(raw: &str) -> Value {
    serde_json::from_str::<serde_json::Value>(raw)
        .map_or_else(|_| Value::String(raw.to_string()), Value::from)
}

fn parse_proxies(entries: &[String]) -> anyhow::Result<HashMap<String, String>> {
    entries
        .iter()
        .map(|entry| match entry.split_once('=') {
            Some((scheme, url)) if !scheme.is_empty() => Ok((scheme.to_string(), url.to_string())),
            _ => bail!("invalid proxy '{entry}', expected SCHEME=URL"),
        })
        .collect()
}

fn response_json(response: Response) -> serde_json::Value {
    match response {
        Response::Payload(payload) => payload.map_or(serde_json::Value::Null, |v| v.to_json()),
        Response::Status { status, detail } => {
            let detail = match detail {
                None => serde_json::Value::Null,
                Some(Detail::Payload(value)) => value.to_json(),
                Some(Detail::Fault(fault)) => {
                    serde_json::to_value(&fault).unwrap_or(serde_json::Value::Null)
                }
            };
            serde_json::json!({ "status": status, "detail": detail })
        }
    }
}

async fn call(
    client: &Client,
    operation: &str,
    index: Option<usize>,
    inject: Option<InjectedReply>,
    raw_args: &[String],
) -> anyhow::Result<()> {
    let mut args = CallArguments::new();
    for raw in raw_args {
        args = match raw.split_once('=') {
            Some((name, value)) => args.kw(name, parse_value(value)),
            None => args.arg(parse_value(raw)),
        };
    }
    if let Some(reply) = inject {
        args = args.inject(reply);
    }

    let handle = client.operation(operation)?;
    let response = match index {
        Some(index) => handle.index(index)?.call(args).await?,
        None => handle.call(args).await?,
    };
    println!("{}", serde_json::to_string_pretty(&response_json(response))?);
    Ok(())
}

fn list_operations(client: &Client) -> anyhow::Result<()> {
    for name in client.service().names() {
        let handle: OperationHandle = client.operation(name)?;
        for (idx, signature) in handle.signatures().iter().enumerate() {
            let inputs = signature.input_names().collect::<Vec<_>>().join(", ");
            if handle.is_overloaded() {
                println!("{name}[{idx}]({inputs})");
            } else {
                println!("{name}({inputs})");
            }
        }
    }
    Ok(())
}

fn create(client: &Client, type_name: &str, raw_fields: &[String]) -> anyhow::Result<()> {
    let fields = raw_fields
        .iter()
        .map(|raw| {
            raw.split_once('=')
                .map(|(name, value)| (name.to_string(), parse_value(value)))
                .with_context(|| format!("invalid field '{raw}', expected FIELD=VALUE"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    let object = client.create(type_name, fields)?;
    println!("{}", serde_json::to_string_pretty(&Value::from(object).to_json())?);
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ClientConfig {
        raise_faults: !cli.no_raise_faults,
        proxies: parse_proxies(&cli.proxies)?,
    };
    let client = Client::connect(&cli.description, config).await?;

    match cli.command {
        Commands::Operations => list_operations(&client),
        Commands::Call {
            operation,
            index,
            inject,
            inject_status,
            args,
        } => {
            let inject = match inject {
                Some(path) => {
                    let body = tokio::fs::read(&path)
                        .await
                        .with_context(|| format!("reading {}", path.display()))?;
                    Some(InjectedReply::new(body).with_status(inject_status))
                }
                None => None,
            };
            call(&client, &operation, index, inject, &args).await
        }
        Commands::Create { type_name, fields } => create(&client, &type_name, &fields),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
