use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use marketing_os_api::{
    atomize, recombine, recombine_selected, Console, ConsoleConfig, LoadState, PermissionEditor,
    ViewId,
};
use marketing_os_api::records::{Channel, Trigger};
use marketing_os_core::{FieldFilter, PermissionType, RecordId, SortSpec};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const CLI_CONTRACT_VERSION: &str = "cli.v1";
const LOG_ENV: &str = "MOS_LOG";

#[derive(Debug, Parser)]
#[command(name = "mos")]
#[command(about = "Marketing OS console CLI")]
struct Cli {
    /// YAML console config; defaults to `MOS_CONFIG_PATH` when unset.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Routes,
    View(ViewArgs),
    Permissions {
        #[command(subcommand)]
        command: PermissionsCommand,
    },
    Triggers {
        #[command(subcommand)]
        command: TriggersCommand,
    },
    Webhooks {
        #[command(subcommand)]
        command: WebhooksCommand,
    },
    Atomize(AtomizeArgs),
    Upload(UploadArgs),
}

#[derive(Debug, Args)]
struct ViewArgs {
    #[arg(value_parser = parse_view)]
    view: ViewId,
    #[arg(long)]
    search: Option<String>,
    /// Exact match, `field=value`; `All` matches everything.
    #[arg(long = "filter", value_parser = parse_exact_filter)]
    filters: Vec<FieldFilter>,
    /// Inclusive numeric range, `field=min..max`.
    #[arg(long = "range", value_parser = parse_range_filter)]
    ranges: Vec<FieldFilter>,
    #[arg(long)]
    sort: Option<String>,
    #[arg(long, default_value_t = false, requires = "sort")]
    desc: bool,
    #[arg(long, default_value_t = 1)]
    page: usize,
}

#[derive(Debug, Subcommand)]
enum PermissionsCommand {
    Show {
        #[arg(long)]
        role: Option<String>,
    },
    Set(PermissionSetArgs),
}

#[derive(Debug, Args)]
struct PermissionSetArgs {
    #[arg(long)]
    role: String,
    #[arg(long)]
    module: String,
    #[arg(long, value_enum)]
    permission: PermissionArg,
    #[arg(long, action = clap::ArgAction::Set)]
    granted: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PermissionArg {
    View,
    Edit,
    Admin,
}

impl From<PermissionArg> for PermissionType {
    fn from(value: PermissionArg) -> Self {
        match value {
            PermissionArg::View => Self::View,
            PermissionArg::Edit => Self::Edit,
            PermissionArg::Admin => Self::Admin,
        }
    }
}

#[derive(Debug, Subcommand)]
enum TriggersCommand {
    Add(TriggerAddArgs),
}

#[derive(Debug, Args)]
struct TriggerAddArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    event: String,
    #[arg(long, value_enum, default_value_t = ChannelArg::Email)]
    channel: ChannelArg,
    #[arg(long, default_value_t = false)]
    disabled: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ChannelArg {
    Email,
    Sms,
    Push,
    Webhook,
}

impl From<ChannelArg> for Channel {
    fn from(value: ChannelArg) -> Self {
        match value {
            ChannelArg::Email => Self::Email,
            ChannelArg::Sms => Self::Sms,
            ChannelArg::Push => Self::Push,
            ChannelArg::Webhook => Self::Webhook,
        }
    }
}

#[derive(Debug, Subcommand)]
enum WebhooksCommand {
    Test {
        #[arg(long)]
        id: RecordId,
    },
}

#[derive(Debug, Args)]
struct AtomizeArgs {
    #[arg(long)]
    text: String,
    /// Atom indexes to recombine; all atoms when omitted.
    #[arg(long, value_delimiter = ',')]
    select: Vec<usize>,
}

#[derive(Debug, Args)]
struct UploadArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    size: u64,
}

#[derive(Debug, Serialize)]
struct RouteEntry<'a> {
    path: &'a str,
    view: ViewId,
    table: bool,
}

fn with_contract_version(value: Value) -> Value {
    match value {
        Value::Object(mut object) => {
            object.insert(
                "contract_version".to_string(),
                Value::String(CLI_CONTRACT_VERSION.to_string()),
            );
            Value::Object(object)
        }
        other => json!({
            "contract_version": CLI_CONTRACT_VERSION,
            "payload": other
        }),
    }
}

fn emit_json(value: Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&with_contract_version(value))?);
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = ConsoleConfig::load(cli.config.as_deref()).context("failed to load console config")?;
    debug!(?config, "config resolved");
    let mut console = Console::with_fixtures(config)?;

    match cli.command {
        Command::Routes => run_routes(&console),
        Command::View(args) => run_view(&mut console, args),
        Command::Permissions { command } => run_permissions(&console, command),
        Command::Triggers { command } => run_triggers(&mut console, command),
        Command::Webhooks { command } => run_webhooks(&mut console, command).await,
        Command::Atomize(args) => run_atomize(&args),
        Command::Upload(args) => run_upload(&mut console, &args).await,
    }
}

fn run_routes(console: &Console) -> Result<()> {
    let routes = console
        .router()
        .routes()
        .map(|(path, view)| RouteEntry { path, view, table: view.is_table() })
        .collect::<Vec<_>>();
    emit_json(json!({
        "current": console.router().current(),
        "routes": routes,
    }))
}

fn run_view(console: &mut Console, args: ViewArgs) -> Result<()> {
    for filter in args.filters.into_iter().chain(args.ranges) {
        console.apply_filter(args.view, filter)?;
    }
    let table = console.table_mut(args.view)?;
    if let Some(term) = args.search.as_deref() {
        table.set_search(term);
    }
    if let Some(key) = args.sort {
        table.set_sort(Some(if args.desc { SortSpec::descending(key) } else { SortSpec::ascending(key) }));
    }
    table.go_to_page(args.page);

    let snapshot = console.snapshot(args.view)?;
    let mut value = serde_json::to_value(&snapshot)?;
    if let Value::Object(object) = &mut value {
        object.insert("view".to_string(), json!(args.view));
        object.insert("path".to_string(), json!(args.view.path()));
    }
    emit_json(value)
}

fn run_permissions(console: &Console, command: PermissionsCommand) -> Result<()> {
    match command {
        PermissionsCommand::Show { role } => {
            let snapshot = console.permissions().snapshot();
            let roles = match role {
                Some(role) => {
                    let editor = console.open_permission_editor(&role)?;
                    vec![(role, editor.rows())]
                }
                None => snapshot
                    .roles()
                    .map(|role| {
                        let rows = snapshot
                            .modules(role)
                            .map(|(module, row)| (module.to_string(), row))
                            .collect::<Vec<_>>();
                        (role.to_string(), rows)
                    })
                    .collect(),
            };
            let roles = roles
                .into_iter()
                .map(|(role, rows)| {
                    let modules = rows
                        .into_iter()
                        .map(|(module, row)| json!({ "module": module, "permissions": row }))
                        .collect::<Vec<_>>();
                    json!({ "role": role, "modules": modules })
                })
                .collect::<Vec<_>>();
            emit_json(json!({ "roles": roles }))
        }
        PermissionsCommand::Set(args) => {
            let mut editor = PermissionEditor::open(console.permissions(), &args.role)?;
            let permission = PermissionType::from(args.permission);
            let row = editor.set(&args.module, permission, args.granted)?;
            editor.save();
            emit_json(json!({
                "role": args.role,
                "module": args.module,
                "permission": permission.as_str(),
                "granted": args.granted,
                "permissions": row,
            }))
        }
    }
}

fn run_triggers(console: &mut Console, command: TriggersCommand) -> Result<()> {
    match command {
        TriggersCommand::Add(args) => {
            let id = console.add_trigger(Trigger {
                id: 0,
                name: args.name,
                event: args.event,
                channel: args.channel.into(),
                enabled: !args.disabled,
            })?;
            let trigger = console
                .triggers()
                .collection()
                .get(id)
                .ok_or_else(|| anyhow!("trigger {id} missing after add"))?;
            emit_json(json!({
                "id": id,
                "trigger": trigger,
                "total": console.triggers().collection().len(),
            }))
        }
    }
}

async fn run_webhooks(console: &mut Console, command: WebhooksCommand) -> Result<()> {
    match command {
        WebhooksCommand::Test { id } => {
            let report = console.test_webhook(id).await?;
            emit_json(serde_json::to_value(&report)?)
        }
    }
}

fn run_atomize(args: &AtomizeArgs) -> Result<()> {
    let atoms = atomize(&args.text);
    let recombined = if args.select.is_empty() {
        recombine(&atoms)
    } else {
        recombine_selected(&atoms, &args.select)
    };
    emit_json(json!({ "atoms": atoms, "recombined": recombined }))
}

async fn run_upload(console: &mut Console, args: &UploadArgs) -> Result<()> {
    let state = console.upload(&args.name, args.size).await?;
    let value = match state {
        LoadState::Ready(receipt) => json!({ "state": "ready", "receipt": receipt }),
        LoadState::Failed(message) => json!({ "state": "failed", "message": message }),
        other => json!({ "state": other.label() }),
    };
    emit_json(value)
}

fn parse_view(value: &str) -> Result<ViewId, String> {
    value.parse::<ViewId>().map_err(|err| err.to_string())
}

fn split_assignment(value: &str) -> Result<(&str, &str), String> {
    let (field, rest) = value
        .split_once('=')
        .ok_or_else(|| format!("expected `field=value`, got `{value}`"))?;
    let field = field.trim();
    if field.is_empty() {
        return Err(format!("missing field name in `{value}`"));
    }
    Ok((field, rest.trim()))
}

fn parse_exact_filter(value: &str) -> Result<FieldFilter, String> {
    let (field, selected) = split_assignment(value)?;
    Ok(FieldFilter::exact(field, selected))
}

fn parse_range_filter(value: &str) -> Result<FieldFilter, String> {
    let (field, bounds) = split_assignment(value)?;
    let (min, max) = bounds
        .split_once("..")
        .ok_or_else(|| format!("expected `field=min..max`, got `{value}`"))?;
    let min = min.trim().parse::<f64>().map_err(|err| format!("invalid range minimum `{min}`: {err}"))?;
    let max = max.trim().parse::<f64>().map_err(|err| format!("invalid range maximum `{max}`: {err}"))?;
    if min > max {
        return Err(format!("range minimum {min} exceeds maximum {max}"));
    }
    Ok(FieldFilter::range(field, min, max))
}
