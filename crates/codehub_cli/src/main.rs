//! Command-line client for a CodeHub endpoint.

mod output;
mod remote;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use codehub_core::{
    config::expand_tilde,
    models::{EditorDraft, Expiration, Privacy, SubmissionEdit, UploadFile, UploadOptions},
    text::parse_tags,
    AppError, Config, Workspace,
};
use remote::AppsScriptBackend;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "codehub", about = "CodeHub CLI", version)]
struct Cli {
    /// Endpoint URL (can also be set via CODEHUB_ENDPOINT)
    #[arg(short, long, env = "CODEHUB_ENDPOINT", global = true)]
    endpoint: Option<String>,

    /// Local state file (can also be set via CODEHUB_STATE_PATH)
    #[arg(long, env = "CODEHUB_STATE_PATH", global = true)]
    state: Option<String>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    json: bool,

    /// Request timeout in seconds
    #[arg(short = 't', long, env = "CODEHUB_REQUEST_TIMEOUT", global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Set your user name and register it with the endpoint
    Login { name: String },
    /// Show the current user, role and folder
    Whoami,
    /// List the folders you can see
    Folders,
    /// Create, delete or switch folders
    Folder {
        #[command(subcommand)]
        command: FolderCommand,
    },
    /// List files in the current folder
    List {
        /// Match file name, description, content, uploader or tags
        #[arg(short, long)]
        search: Option<String>,
        /// Exact file type, e.g. `rs`
        #[arg(long = "type")]
        file_type: Option<String>,
        /// Only starred files
        #[arg(long, conflicts_with = "recent")]
        starred: bool,
        /// Only the newest files
        #[arg(long)]
        recent: bool,
    },
    /// Print one file
    Get { id: String },
    /// Upload files from disk
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(short, long)]
        description: Option<String>,
        /// Target folder id (defaults to the current folder)
        #[arg(long)]
        folder: Option<String>,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
        /// never, 1day, 1week, 1month or 3months
        #[arg(long, default_value = "never", value_parser = parse_expiration)]
        expires: Expiration,
    },
    /// Create a file from stdin or a local file
    New {
        name: String,
        /// Read content from this file instead of stdin
        #[arg(short, long)]
        file: Option<PathBuf>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(long)]
        folder: Option<String>,
        #[arg(long)]
        tags: Option<String>,
    },
    /// Change a file you own
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        /// Replace content with this file's content
        #[arg(short, long)]
        file: Option<PathBuf>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(long)]
        tags: Option<String>,
        #[arg(long)]
        folder: Option<String>,
    },
    /// Delete one or more files
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Star or unstar a file
    Star { id: String },
    /// Manage local projects
    Project {
        #[command(subcommand)]
        command: ProjectCommand,
    },
    /// Show recent activity
    Activity {
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },
    /// Show dashboard figures
    Stats,
    /// Write every file in the current folder to a directory
    Export {
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
    /// Send or read chat messages
    Chat {
        #[command(subcommand)]
        command: ChatCommand,
    },
    /// Switch between dark and light mode
    Theme {
        #[arg(value_enum)]
        mode: ThemeMode,
    },
}

#[derive(Subcommand)]
enum FolderCommand {
    Create {
        name: String,
        #[arg(long, value_enum, default_value = "private")]
        privacy: PrivacyArg,
    },
    Delete {
        id: String,
    },
    Switch {
        id: String,
    },
}

#[derive(Subcommand)]
enum ProjectCommand {
    Create {
        name: String,
        #[arg(short, long, default_value = "")]
        description: String,
    },
    List,
    Switch {
        id: String,
    },
}

#[derive(Subcommand)]
enum ChatCommand {
    Send { chat_id: String, text: String },
    Show { chat_id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PrivacyArg {
    Public,
    Private,
}

impl From<PrivacyArg> for Privacy {
    fn from(value: PrivacyArg) -> Self {
        match value {
            PrivacyArg::Public => Privacy::Public,
            PrivacyArg::Private => Privacy::Private,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ThemeMode {
    Dark,
    Light,
}

fn parse_expiration(value: &str) -> Result<Expiration, AppError> {
    value.parse()
}

impl Commands {
    /// Label used in `<label> failed: ...` messages.
    fn label(&self) -> &'static str {
        match self {
            Self::Completions { .. } => "Completions",
            Self::Login { .. } => "Login",
            Self::Whoami => "Whoami",
            Self::Folders => "Folders",
            Self::Folder { command } => match command {
                FolderCommand::Create { .. } => "Create folder",
                FolderCommand::Delete { .. } => "Delete folder",
                FolderCommand::Switch { .. } => "Switch folder",
            },
            Self::List { .. } => "List",
            Self::Get { .. } => "Get",
            Self::Upload { .. } => "Upload",
            Self::New { .. } => "New",
            Self::Edit { .. } => "Edit",
            Self::Delete { .. } => "Delete",
            Self::Star { .. } => "Star",
            Self::Project { .. } => "Project",
            Self::Activity { .. } => "Activity",
            Self::Stats => "Stats",
            Self::Export { .. } => "Export",
            Self::Chat { .. } => "Chat",
            Self::Theme { .. } => "Theme",
        }
    }
}

fn optional_tags(raw: Option<String>) -> Vec<String> {
    raw.as_deref().map(parse_tags).unwrap_or_default()
}

fn read_content(file: Option<&Path>) -> io::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

fn read_upload(path: &Path) -> anyhow::Result<UploadFile> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| anyhow::anyhow!("{}: {}", path.display(), err))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    Ok(UploadFile { file_name, content })
}

fn print_nonempty(output: String) {
    if !output.is_empty() {
        println!("{}", output);
    }
}

/// Resolved endpoint, state path and timeout after flags override the environment.
struct Settings {
    endpoint: String,
    state_path: PathBuf,
    timeout: Duration,
    admin_username: String,
}

impl Settings {
    fn resolve(cli: &Cli, config: Config) -> Self {
        let nonblank = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };
        Self {
            endpoint: nonblank(&cli.endpoint).unwrap_or(config.endpoint),
            state_path: PathBuf::from(expand_tilde(
                nonblank(&cli.state).unwrap_or(config.state_path),
            )),
            timeout: Duration::from_secs(cli.timeout.unwrap_or(config.request_timeout_secs)),
            admin_username: config.admin_username,
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let settings = Settings::resolve(&cli, Config::from_env());
    tracing::debug!(state = %settings.state_path.display(), "resolved settings");
    let backend = AppsScriptBackend::new(&settings.endpoint, settings.timeout)?;
    let endpoint = backend.endpoint().to_string();
    let mut ws = Workspace::open(backend, &settings.state_path, &settings.admin_username)?;

    let result = execute(cli.command, &mut ws, cli.json).await;
    if let Err(err) = &result {
        if err
            .downcast_ref::<AppError>()
            .is_some_and(AppError::is_endpoint_failure)
        {
            tracing::warn!(%endpoint, "endpoint request failed");
        }
    }
    result
}

async fn execute(
    command: Commands,
    ws: &mut Workspace<AppsScriptBackend>,
    json: bool,
) -> anyhow::Result<()> {
    match command {
        Commands::Completions { .. } => {}
        Commands::Login { name } => {
            ws.sign_in(&name).await?;
            println!(
                "Signed in as {}{}",
                ws.session().user_name(),
                if ws.session().is_admin() { " (admin)" } else { "" }
            );
        }
        Commands::Whoami => {
            let session = ws.session();
            let folder = ws.folder_name(session.current_folder());
            if json {
                println!(
                    "{}",
                    output::to_json(&serde_json::json!({
                        "userName": session.user_name(),
                        "role": session.role(),
                        "currentFolder": session.current_folder(),
                        "folderName": folder,
                    }))?
                );
            } else if session.is_signed_in() {
                println!(
                    "{} ({:?}) in {}",
                    session.user_name(),
                    session.role(),
                    folder
                );
            } else {
                println!("Not signed in; browsing {} anonymously", folder);
            }
        }
        Commands::Folders => {
            ws.refresh().await?;
            let visible = ws.visible_folders();
            print_nonempty(output::format_folders(
                &visible,
                ws.session().current_folder(),
                json,
            )?);
        }
        Commands::Folder { command } => match command {
            FolderCommand::Create { name, privacy } => {
                let id = ws.create_folder(&name, privacy.into()).await?;
                match id {
                    Some(id) => println!("Created folder: {} ({})", name.trim(), id),
                    None => println!("Created folder: {}", name.trim()),
                }
            }
            FolderCommand::Delete { id } => {
                ws.load_folders().await?;
                let name = ws.folder_name(&id);
                ws.delete_folder(&id).await?;
                println!("Deleted folder: {} (files moved to General)", name);
            }
            FolderCommand::Switch { id } => {
                ws.load_folders().await?;
                ws.switch_folder(&id)?;
                println!("Switched to folder: {}", ws.folder_name(&id));
            }
        },
        Commands::List {
            search,
            file_type,
            starred,
            recent,
        } => {
            ws.refresh().await?;
            let mut items = if starred {
                ws.starred()
            } else if recent {
                ws.recent()
            } else {
                ws.current_submissions()
            };
            if search.is_some() || file_type.is_some() {
                let narrowed = ws.search(search.as_deref(), file_type.as_deref());
                items.retain(|item| {
                    narrowed
                        .iter()
                        .any(|kept| kept.submission_id == item.submission_id)
                });
            }
            print_nonempty(output::format_submissions(
                &items,
                &ws.state().starred_files,
                json,
            )?);
        }
        Commands::Get { id } => {
            ws.refresh().await?;
            let submission = ws.store().get(&id).ok_or(AppError::NotFound)?;
            println!("{}", output::format_submission(submission, json)?);
        }
        Commands::Upload {
            files,
            description,
            folder,
            tags,
            expires,
        } => {
            let uploads = files
                .iter()
                .map(|path| read_upload(path))
                .collect::<anyhow::Result<Vec<_>>>()?;
            ws.load_folders().await?;
            let options = UploadOptions {
                description,
                folder,
                tags: optional_tags(tags),
                expiration: expires,
            };
            let ids = ws.upload(uploads, options).await?;
            if json {
                println!("{}", output::to_json(&ids)?);
            } else {
                println!("Uploaded {} file(s)", ids.len());
            }
        }
        Commands::New {
            name,
            file,
            description,
            folder,
            tags,
        } => {
            let code_content = read_content(file.as_deref())?;
            ws.load_folders().await?;
            let draft = EditorDraft {
                file_name: name,
                code_content,
                description,
                folder,
                tags: optional_tags(tags),
            };
            let id = ws.create_from_editor(draft).await?;
            match id {
                Some(id) => println!("Created file: {}", id),
                None => println!("Created file"),
            }
        }
        Commands::Edit {
            id,
            name,
            file,
            description,
            tags,
            folder,
        } => {
            let code_content = match file {
                Some(path) => Some(std::fs::read_to_string(path)?),
                None => None,
            };
            ws.refresh().await?;
            let edit = SubmissionEdit {
                file_name: name,
                code_content,
                description,
                tags: tags.map(|raw| parse_tags(&raw)),
                folder,
            };
            ws.update_submission(&id, edit).await?;
            println!("Updated file: {}", id);
        }
        Commands::Delete { ids } => {
            ws.refresh().await?;
            if let [id] = ids.as_slice() {
                ws.delete_submission(id).await?;
                println!("Deleted file: {}", id);
            } else {
                let report = ws.bulk_delete(&ids).await?;
                for (id, err) in &report.failed {
                    eprintln!("Delete failed for {}: {}", id, err);
                }
                println!(
                    "Deleted {} of {} file(s)",
                    report.deleted.len(),
                    ids.len()
                );
                if !report.is_complete() {
                    anyhow::bail!("{} file(s) could not be deleted", report.failed.len());
                }
            }
        }
        Commands::Star { id } => {
            let starred = ws.toggle_star(&id)?;
            println!("{} {}", if starred { "Starred" } else { "Unstarred" }, id);
        }
        Commands::Project { command } => match command {
            ProjectCommand::Create { name, description } => {
                let project = ws.create_project(&name, &description)?;
                println!("Created project: {} ({})", project.name, project.id);
            }
            ProjectCommand::List => {
                print_nonempty(output::format_projects(
                    ws.projects(),
                    ws.session().current_folder(),
                    json,
                )?);
            }
            ProjectCommand::Switch { id } => {
                ws.switch_project(&id)?;
                println!("Switched to project: {}", ws.folder_name(&id));
            }
        },
        Commands::Activity { limit } => {
            print_nonempty(output::format_activity(ws.activity(limit), json)?);
        }
        Commands::Stats => {
            ws.refresh().await?;
            println!("{}", output::format_analytics(&ws.analytics(), json)?);
        }
        Commands::Export { dir } => {
            ws.refresh().await?;
            let files = ws.export_current_folder()?;
            std::fs::create_dir_all(&dir)?;
            let paths = output::export_paths(&dir, &files);
            for (submission, path) in files.iter().zip(&paths) {
                std::fs::write(path, &submission.code_content)?;
            }
            println!("Exported {} file(s) to {}", files.len(), dir.display());
        }
        Commands::Chat { command } => match command {
            ChatCommand::Send { chat_id, text } => {
                match ws.post_chat_message(&chat_id, &text)? {
                    Some(message) => println!("Sent message {}", message.id),
                    None => println!("Nothing to send"),
                }
            }
            ChatCommand::Show { chat_id } => {
                print_nonempty(output::format_chat(ws.chat(&chat_id), json)?);
            }
        },
        Commands::Theme { mode } => {
            ws.set_dark_mode(mode == ThemeMode::Dark)?;
            println!(
                "Theme set to {}",
                if mode == ThemeMode::Dark { "dark" } else { "light" }
            );
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let label = cli.command.label();
    if let Err(err) = run(cli).await {
        eprintln!("{} failed: {}", label, err);
        std::process::exit(1);
    }
    Ok(())
}
