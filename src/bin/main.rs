//! cip30-inspect - decode CIP-30 payloads and dry-run wallet sessions
//!
//!   cip30-inspect address <hex> [--format f]            → decoded change address
//!   cip30-inspect balance <cbor-hex> [--filter f]       → decoded balance
//!   cip30-inspect session <fixture.json> <wallet>       → discover + connect + decode
//!
//! Sessions run against an in-memory host described by a JSON fixture
//! (`{"cardano": {"nami": {...}}}`), the same shape a browser's
//! `window.cardano` has.
//!
//! Output format:
//!   --json     Output compact JSON (default for non-tty)
//!   --pretty   Pretty-print JSON (default for tty)

use anyhow::{anyhow, Context};
use cip30_session::core::consts::env as env_keys;
use cip30_session::decode::{self, AddressFormat, AssetFilter};
use cip30_session::logging::init_logging;
use cip30_session::{MemoryRegistry, SessionConfig, WalletSession};
use serde_json::{json, Value};
use std::env;
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing::debug;

fn main() {
    init_logging();

    let args: Vec<String> = env::args().collect();
    let opts = ParsedArgs::parse(&args[1..]);

    if opts.help {
        print_usage();
        return;
    }

    if opts.version {
        println!("cip30-inspect {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    let result = match opts.command.as_deref() {
        Some("address") | Some("addr") => cmd_address(&opts),
        Some("balance") => cmd_balance(&opts),
        Some("session") => cmd_session(&opts),
        Some(cmd) => Err(anyhow!("Unknown command: {}", cmd)),
        None => {
            print_usage();
            return;
        }
    };

    let pretty = !opts.json && (opts.pretty || std::io::stdout().is_terminal());
    let render = |value: &Value| {
        if pretty {
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        } else {
            value.to_string()
        }
    };

    match result {
        Ok(output) => println!("{}", render(&output)),
        Err(e) => {
            eprintln!("{}", render(&json!({"error": format!("{:#}", e)})));
            std::process::exit(1);
        }
    }
}

#[derive(Default)]
struct ParsedArgs {
    command: Option<String>,
    positional: Vec<String>,
    format: Option<String>,
    filter: Option<String>,
    policy: Option<String>,
    fixture: Option<PathBuf>,
    json: bool,
    pretty: bool,
    help: bool,
    version: bool,
}

impl ParsedArgs {
    fn parse(args: &[String]) -> Self {
        let mut opts = ParsedArgs::default();
        let mut positional = Vec::new();
        let mut i = 0;

        while i < args.len() {
            let arg = &args[i];
            match arg.as_str() {
                "--help" | "-h" => opts.help = true,
                "--version" | "-V" => opts.version = true,
                "--json" => opts.json = true,
                "--pretty" => opts.pretty = true,
                "--format" | "-f" => {
                    if i + 1 < args.len() {
                        opts.format = Some(args[i + 1].clone());
                        i += 1;
                    }
                }
                "--filter" | "-t" => {
                    if i + 1 < args.len() {
                        opts.filter = Some(args[i + 1].clone());
                        i += 1;
                    }
                }
                "--policy" | "-p" => {
                    if i + 1 < args.len() {
                        opts.policy = Some(args[i + 1].clone());
                        i += 1;
                    }
                }
                "--fixture" => {
                    if i + 1 < args.len() {
                        opts.fixture = Some(PathBuf::from(&args[i + 1]));
                        i += 1;
                    }
                }
                _ if !arg.starts_with('-') => positional.push(arg.clone()),
                _ => {} // Ignore unknown flags
            }
            i += 1;
        }

        // First positional is command
        if !positional.is_empty() {
            opts.command = Some(positional.remove(0));
        }
        opts.positional = positional;

        // Environment is lower priority than CLI args
        if opts.fixture.is_none() {
            opts.fixture = env::var(env_keys::FIXTURE).ok().filter(|s| !s.is_empty()).map(PathBuf::from);
        }

        opts
    }

    fn arg(&self, index: usize, what: &str) -> anyhow::Result<&str> {
        self.positional
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| anyhow!("missing <{}>", what))
    }
}

fn print_usage() {
    println!(
        r#"cip30-inspect - CIP-30 payload decoder and session dry-run

USAGE:
    cip30-inspect <command> [args] [options]

COMMANDS:
    address <hex>                 Decode a raw address (getChangeAddress output)
    balance <cbor-hex>            Decode a balance (getBalance output)
    session [fixture] <wallet>    Discover, connect and decode against a fixture host

OPTIONS:
    --format, -f <fmt>      Address format: bech32|cbor|bytes|stakehex|stakekey (default: bech32)
    --filter, -t <type>     Asset filter: lovelace|ada|ft|nft|asset|handles|policy (default: lovelace)
    --policy, -p <id>       Policy id for --filter policy
    --fixture <path>        Host fixture file (env: CIP30_FIXTURE)

OUTPUT OPTIONS:
    --json                  Compact JSON output
    --pretty                Pretty-print JSON
    --version, -V           Print version

LOGGING:
    RUST_LOG=debug          Log filter (stderr)
    CIP30_LOG_JSON=1        JSON log lines

EXAMPLES:
    cip30-inspect address 01a1b2... --format stakekey
    cip30-inspect balance 821a0016e360a1581c... --filter nft
    cip30-inspect session wallets.json nami --filter ada
    CIP30_FIXTURE=wallets.json cip30-inspect session nami --json | jq .connected
"#
    );
}

fn address_format(opts: &ParsedArgs) -> AddressFormat {
    opts.format.as_deref().map(AddressFormat::parse).unwrap_or_default()
}

fn asset_filter(opts: &ParsedArgs) -> anyhow::Result<AssetFilter> {
    match opts.filter.as_deref() {
        Some(filter) => Ok(AssetFilter::parse(filter)?),
        None => Ok(AssetFilter::default()),
    }
}

fn cmd_address(opts: &ParsedArgs) -> anyhow::Result<Value> {
    let raw = opts.arg(0, "hex")?;
    let format = address_format(opts);
    let address = decode::decode_address(raw, format)?;
    Ok(json!({"format": format.as_str(), "address": address}))
}

fn cmd_balance(opts: &ParsedArgs) -> anyhow::Result<Value> {
    let raw = opts.arg(0, "cbor-hex")?;
    let filter = asset_filter(opts)?;
    let balance = decode::decode_balance(raw, filter, opts.policy.as_deref().unwrap_or_default())?;
    Ok(json!({"filter": filter.as_str(), "balance": balance}))
}

fn cmd_session(opts: &ParsedArgs) -> anyhow::Result<Value> {
    let (fixture, wallet) = match (opts.positional.len(), &opts.fixture) {
        (0, _) => return Err(anyhow!("missing <wallet>")),
        (1, Some(path)) => (path.clone(), opts.arg(0, "wallet")?),
        (1, None) => return Err(anyhow!("no fixture: pass <fixture> or set {}", env_keys::FIXTURE)),
        _ => (PathBuf::from(opts.arg(0, "fixture")?), opts.arg(1, "wallet")?),
    };
    let format = address_format(opts);
    let filter = asset_filter(opts)?;
    let policy = opts.policy.clone().unwrap_or_default();

    let registry = MemoryRegistry::load(&fixture)?;
    let session = WalletSession::with_config(registry, SessionConfig::new());

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create runtime")?;

    rt.block_on(async {
        let found = session.refresh();
        debug!(providers = found, fixture = %fixture.display(), "session: discovered");
        session.connect(wallet).await?;

        let state = session.snapshot();
        let providers: Vec<Value> = state
            .providers
            .iter()
            .map(|(key, d)| json!({"key": key, "name": d.name(), "apiVersion": d.api_version()}))
            .collect();
        let mut output = json!({
            "providers": providers,
            "selected": state.selected.as_ref().map(|d| &d.info),
            "connected": state.connected,
            "phase": state.phase,
        });

        if let Some(facade) = state.facade {
            output["networkId"] = json!(facade.get_network_id().await?);
            output["address"] = json!(facade.get_address(format).await?);
            output["assets"] = json!(facade.get_assets(filter, &policy).await?);
        }
        Ok::<Value, anyhow::Error>(output)
    })
}
