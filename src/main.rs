//! Cutover CLI - track the activities of a go-live plan.

use cutover::cli::{
    ActivityCommands, ActivityFields, Cli, Commands, ConfigCommands, SettingsCommands,
    SystemCommands,
};
use cutover::commands::{self, Output};
use cutover::config::{ConfigOverrides, OutputFormat, ResolvedConfig, resolve_config, resolve_data_dir};
use clap::Parser;
use std::path::Path;
use std::process;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable holding the log filter (e.g. `debug`, `cutover=trace`).
const LOG_ENV: &str = "CV_LOG";

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.log_file.as_deref()) {
        eprintln!("Warning: could not open log file: {}", e);
    }

    let data_dir = match resolve_data_dir(cli.data_dir.clone()) {
        Ok(resolved) => {
            tracing::debug!(path = %resolved.value.display(), source = %resolved.source, "resolved data directory");
            resolved.value
        }
        Err(e) => fail(&e, cli.human_readable),
    };

    let overrides = if cli.human_readable {
        ConfigOverrides::new().with_output_format(OutputFormat::Human)
    } else {
        ConfigOverrides::new()
    };
    let config = resolve_config(&data_dir, &overrides).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "ignoring unreadable config.kdl");
        ResolvedConfig::default()
    });
    let human = *config.output_format() == OutputFormat::Human;

    if let Err(e) = run_command(cli.command, &data_dir, &config, &overrides, human) {
        fail(&e, human);
    }
}

/// Print an error in the selected format and exit.
fn fail(e: &cutover::Error, human: bool) -> ! {
    if human {
        eprintln!("Error: {}", e);
    } else {
        eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
    }
    process::exit(1);
}

/// Install the tracing subscriber, writing to stderr or to `log_file`.
fn init_logging(log_file: Option<&Path>) -> std::io::Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    if let Some(path) = log_file {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path);
        match file {
            Ok(file) => {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .with_writer(std::sync::Mutex::new(file))
                            .with_ansi(false),
                    )
                    .init();
                return Ok(());
            }
            Err(e) => {
                init_stderr_logging(filter);
                return Err(e);
            }
        }
    }

    init_stderr_logging(filter);
    Ok(())
}

fn init_stderr_logging(filter: EnvFilter) {
    // Stdout carries command output
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

/// Fill in the audit editor name from config when the flag was not given.
fn with_editor(mut fields: ActivityFields, config: &ResolvedConfig) -> ActivityFields {
    if fields.editor_name.is_none() {
        fields.editor_name = config.editor_name().map(str::to_string);
    }
    fields
}

fn run_command(
    command: Commands,
    data_dir: &Path,
    config: &ResolvedConfig,
    overrides: &ConfigOverrides,
    human: bool,
) -> Result<(), cutover::Error> {
    match command {
        Commands::Activity { command } => match command {
            ActivityCommands::Create { title, fields } => {
                let request = with_editor(fields, config).into_new(title);
                let result = commands::activity_create(data_dir, &request)?;
                output(&result, human);
            }
            ActivityCommands::Show { id } => {
                let result = commands::activity_show(data_dir, &id)?;
                output(&result, human);
            }
            ActivityCommands::List { phase, status } => {
                let result =
                    commands::activity_list(data_dir, phase.as_deref(), status.as_deref())?;
                output(&result, human);
            }
            ActivityCommands::Update { id, title, fields } => {
                let request = with_editor(fields, config).into_update(title);
                let result = commands::activity_update(data_dir, &id, &request)?;
                output(&result, human);
            }
            ActivityCommands::BulkUpdate { ids, fields } => {
                let request = with_editor(fields, config).into_update(None);
                let result = commands::activity_bulk_update(data_dir, &ids, &request)?;
                output(&result, human);
            }
            ActivityCommands::Delete { ids } => {
                let result = match ids.as_slice() {
                    [id] => commands::activity_delete(data_dir, id)?,
                    _ => commands::activity_bulk_delete(data_dir, &ids)?,
                };
                output(&result, human);
            }
            ActivityCommands::Log { id } => {
                let result = commands::activity_log(data_dir, &id)?;
                output(&result, human);
            }
        },
        Commands::Settings { command } => match command {
            SettingsCommands::Show => {
                let result = commands::settings_show(data_dir)?;
                output(&result, human);
            }
            SettingsCommands::Set { source } => {
                let result = commands::settings_set(data_dir, &source)?;
                output(&result, human);
            }
            SettingsCommands::Title { title } => {
                let result = commands::settings_title(data_dir, &title)?;
                output(&result, human);
            }
        },
        Commands::Config { command } => match command {
            ConfigCommands::Show => {
                let result = commands::config_show(data_dir, overrides)?;
                output(&result, human);
            }
            ConfigCommands::Set { key, value } => {
                let result = commands::config_set(data_dir, &key, &value)?;
                output(&result, human);
            }
        },
        Commands::System { command } => match command {
            SystemCommands::Init => {
                let result = commands::system_init(data_dir)?;
                output(&result, human);
            }
        },
        #[cfg(feature = "gui")]
        Commands::Gui { port, host } => {
            run_gui(data_dir.to_path_buf(), port, &host)?;
        }
    }

    Ok(())
}

/// Print output in JSON or human-readable format.
fn output<T: Output>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}

/// Run the web server until interrupted
#[cfg(feature = "gui")]
fn run_gui(data_dir: std::path::PathBuf, port: u16, host: &str) -> Result<(), cutover::Error> {
    use cutover::storage::Storage;

    if !Storage::exists(&data_dir) {
        return Err(cutover::Error::NotInitialized);
    }

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| cutover::Error::Other(format!("Failed to create runtime: {}", e)))?
        .block_on(async {
            cutover::gui::start_server(&data_dir, port, host)
                .await
                .map_err(|e| cutover::Error::Other(format!("Web server error: {}", e)))
        })
}
