//! Hotel super-admin console
//!
//! Command-line front end for reviewing hotel admin registrations, browsing
//! hotels and curating the homepage carousel.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use superadmin_console::views::HotelFilters;
use superadmin_console::{ApiClient, ImageUpload, Section, Shell, render};
use superadmin_core::hotel::ALL_DISTRICTS;
use superadmin_core::types::{AdminId, AdminStatus, CarouselImageId};
use superadmin_core::{CarouselState, Config, Error, FileStore, Result, Session, init_logging};
use tokio::signal;
use tracing::{debug, info, warn};

/// Command line interface for the hotel super-admin console
#[derive(Parser)]
#[command(
    name = "superadmin",
    version = env!("CARGO_PKG_VERSION"),
    about = "Super-admin console for the hotel booking platform",
    long_about = "Review pending hotel admin registrations, browse approved admins and hotels, and manage the homepage carousel."
)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(short, long)]
    log_level: Option<String>,

    /// Enable structured JSON logging
    #[arg(long)]
    json: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
enum Commands {
    /// Store a bearer token for later commands
    Login {
        /// JWT, with or without a `Bearer ` prefix
        #[arg(long, env = "SUPERADMIN_TOKEN", hide_env_values = true)]
        token: String,
    },

    /// Forget the stored token
    Logout,

    /// Show the admin identity carried by the stored token
    Whoami,

    /// Show headline numbers
    Overview,

    /// Review pending admin registrations
    Pending {
        /// Pending approvals subcommand
        #[command(subcommand)]
        action: PendingCommands,
    },

    /// Browse approved admins
    Admins {
        /// Approved admins subcommand
        #[command(subcommand)]
        action: AdminCommands,
    },

    /// Browse every registration, pending or approved
    Users {
        /// All-users subcommand
        #[command(subcommand)]
        action: UserCommands,
    },

    /// List hotels
    Hotels {
        /// Only hotels whose name or address contains this text
        #[arg(short, long)]
        search: Option<String>,

        /// Only hotels in this district
        #[arg(short, long)]
        district: Option<String>,

        /// Only hotels registered by the signed-in admin
        #[arg(long)]
        mine: bool,
    },

    /// List districts
    Districts,

    /// Manage the homepage carousel
    Carousel {
        /// Carousel subcommand
        #[command(subcommand)]
        action: CarouselCommands,
    },

    /// Validate configuration
    Config {
        /// Show resolved configuration
        #[arg(short, long)]
        show: bool,
    },
}

/// Pending approval commands
#[derive(Subcommand)]
enum PendingCommands {
    /// List pending registrations
    List,

    /// Approve a registration
    Approve {
        /// Admin ID
        #[arg(value_name = "ADMIN_ID")]
        id: AdminId,
    },

    /// Reject a registration
    Reject {
        /// Admin ID
        #[arg(value_name = "ADMIN_ID")]
        id: AdminId,
    },
}

/// Approved admin commands
#[derive(Subcommand)]
enum AdminCommands {
    /// List approved admins
    List,

    /// Show an admin and the hotels they registered
    Details {
        /// Admin ID
        #[arg(value_name = "ADMIN_ID")]
        id: AdminId,
    },
}

/// All-users commands
#[derive(Subcommand)]
enum UserCommands {
    /// List registrations
    List {
        /// Only registrations with this status (pending or approved)
        #[arg(short, long)]
        status: Option<AdminStatus>,
    },

    /// Show one registration in full
    Show {
        /// Admin ID
        #[arg(value_name = "ADMIN_ID")]
        id: AdminId,
    },
}

/// Carousel commands
#[derive(Subcommand)]
enum CarouselCommands {
    /// List carousel images
    List,

    /// Upload an image (jpg, jpeg, png, webp or gif)
    Upload {
        /// Image file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Switch an image between Active and Inactive
    Toggle {
        /// Image ID
        #[arg(value_name = "IMAGE_ID")]
        id: CarouselImageId,

        /// Current state; read from the server list when omitted
        #[arg(value_name = "STATE")]
        state: Option<CarouselState>,
    },

    /// Delete an image
    Delete {
        /// Image ID
        #[arg(value_name = "IMAGE_ID")]
        id: CarouselImageId,
    },
}

/// Main entry point for the console
#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if it exists (for development convenience)
    if let Err(e) = dotenvy::dotenv()
        && !e.not_found()
    {
        eprintln!("Note: .env file not loaded: {e}");
    }

    let cli = Cli::parse();

    let result = tokio::select! {
        result = run(cli) => result,
        _ = signal::ctrl_c() => {
            warn!("Interrupted");
            Err(Error::Cancelled)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", describe(&e));
            ExitCode::FAILURE
        }
    }
}

fn describe(error: &Error) -> String {
    if error.is_auth_failure() {
        error.user_message("authorize")
    } else {
        error.to_string()
    }
}

/// Load configuration, install logging and dispatch the command
///
/// # Errors
///
/// Returns the first error the command hits
async fn run(cli: Cli) -> Result<()> {
    let config = Config::load_from(cli.config.as_deref())?;

    let mut logging = config.logging.clone();
    if let Some(level) = &cli.log_level {
        logging.level.clone_from(level);
    }
    if cli.json {
        logging.format = "json".to_string();
    }
    init_logging(&logging)?;
    debug!(
        version = env!("CARGO_PKG_VERSION"),
        base_url = %config.api.base_url,
        "Configuration loaded"
    );

    if let Commands::Config { show } = cli.command {
        return handle_config_command(&config, show);
    }

    let session = Arc::new(open_session(&config)?);
    let api = ApiClient::new(&config.api, Arc::clone(&session))?;
    let mut shell = Shell::new(Arc::new(api));

    match cli.command {
        Commands::Login { token } => {
            shell.login(&token)?;
            let identity = session.resolve_admin_identity();
            if identity.is_empty() {
                println!("Logged in (token carries no admin identity)");
            } else {
                println!("Logged in as {identity}");
            }
            Ok(())
        }
        Commands::Logout => {
            shell.logout()?;
            println!("Logged out");
            Ok(())
        }
        Commands::Whoami => {
            if !shell.is_authenticated() {
                println!("Not logged in");
                return Ok(());
            }
            let identity = session.resolve_admin_identity();
            if identity.is_empty() {
                println!("Logged in, but the token carries no admin identity");
            } else {
                println!("{identity}");
            }
            Ok(())
        }
        Commands::Overview => show_section(&mut shell, Section::Overview).await,
        Commands::Pending { action } => handle_pending_command(&mut shell, action).await,
        Commands::Admins { action } => handle_admin_command(&mut shell, action).await,
        Commands::Users { action } => handle_user_command(&mut shell, action).await,
        Commands::Hotels {
            search,
            district,
            mine,
        } => list_hotels(&mut shell, search, district, mine).await,
        Commands::Districts => list_districts(&mut shell).await,
        Commands::Carousel { action } => handle_carousel_command(&mut shell, action).await,
        Commands::Config { .. } => Ok(()),
    }
}

fn open_session(config: &Config) -> Result<Session> {
    let store = FileStore::open(&config.session.store_path)?;
    debug!(path = %store.path().display(), "Session store opened");
    Ok(Session::new(Arc::new(store), &config.session))
}

/// Print the mounted view
fn print_view(shell: &Shell) {
    if let Some(view) = shell.view() {
        print!("{}", render::active_view(view));
    }
}

/// Mount a section, print it, and pass the load result on
async fn show_section(shell: &mut Shell, section: Section) -> Result<()> {
    let result = shell.navigate(section).await;
    print_view(shell);
    result
}

/// Handle pending approval commands
///
/// # Errors
///
/// Returns error if the list cannot be loaded or the decision fails
async fn handle_pending_command(shell: &mut Shell, action: PendingCommands) -> Result<()> {
    let id = match action {
        PendingCommands::List => return show_section(shell, Section::PendingApprovals).await,
        PendingCommands::Approve { id } | PendingCommands::Reject { id } => id,
    };
    let approve = matches!(action, PendingCommands::Approve { .. });

    shell.navigate(Section::PendingApprovals).await?;
    let result = match shell.pending() {
        Some(view) if approve => view.approve(id).await.map(drop),
        Some(view) => view.reject(id).await.map(drop),
        None => Ok(()),
    };
    let result = shell.report(result);
    print_view(shell);
    result
}

/// Handle approved admin commands
///
/// # Errors
///
/// Returns error if the list or the admin's hotels cannot be loaded
async fn handle_admin_command(shell: &mut Shell, action: AdminCommands) -> Result<()> {
    match action {
        AdminCommands::List => show_section(shell, Section::ApprovedAdmins).await,
        AdminCommands::Details { id } => {
            shell.navigate(Section::ApprovedAdmins).await?;
            let result = match shell.approved() {
                Some(view) => view.open_details(id).await,
                None => Ok(()),
            };
            let result = shell.report(result);
            print_view(shell);
            result
        }
    }
}

/// Handle all-users commands
///
/// # Errors
///
/// Returns error if either list cannot be loaded or the admin is not listed
async fn handle_user_command(shell: &mut Shell, action: UserCommands) -> Result<()> {
    let result = shell.navigate(Section::AllUsers).await;
    let Some(view) = shell.users() else {
        return result;
    };
    if result.is_err() {
        print!("{}", render::heading(Section::AllUsers));
        print!("{}", render::messages(view.snapshot().error.as_deref(), None));
        return result;
    }

    match action {
        UserCommands::List { status } => {
            print!("{}", render::heading(Section::AllUsers));
            print!("{}", render::users(&view.entries(status)));
            if status.is_none() {
                println!(
                    "{} pending, {} approved",
                    view.count(AdminStatus::Pending),
                    view.count(AdminStatus::Approved)
                );
            }
            Ok(())
        }
        UserCommands::Show { id } => {
            let entry = view.details(id)?;
            print!("{}", render::user_details(&entry));
            Ok(())
        }
    }
}

/// List hotels with the given filters
///
/// # Errors
///
/// Returns error if the hotels cannot be loaded, or `--mine` is given
/// without an admin identity in the token
async fn list_hotels(
    shell: &mut Shell,
    search: Option<String>,
    district: Option<String>,
    mine: bool,
) -> Result<()> {
    let filters = HotelFilters {
        search_term: search.unwrap_or_default(),
        district: district.unwrap_or_else(|| ALL_DISTRICTS.to_string()),
        added_by_me: mine,
    };
    info!(?filters, "Listing hotels");

    shell.switch(Section::HotelManagement)?;
    let result = match shell.hotels() {
        Some(view) => view.apply_filters(filters).await,
        None => Ok(()),
    };
    let result = shell.report(result);
    print_view(shell);
    result
}

/// List district names
///
/// # Errors
///
/// Returns error if the session is rejected
async fn list_districts(shell: &mut Shell) -> Result<()> {
    shell.switch(Section::HotelManagement)?;
    let result = match shell.hotels() {
        Some(view) => view.load_districts().await.map(|()| view.districts()),
        None => Ok(Vec::new()),
    };
    let districts = shell.report(result)?;
    print!("{}", render::districts(&districts));
    Ok(())
}

/// Handle carousel commands
///
/// # Errors
///
/// Returns error if the list cannot be loaded or the action fails
async fn handle_carousel_command(shell: &mut Shell, action: CarouselCommands) -> Result<()> {
    // Read the file before touching the network so a bad path fails fast
    let upload = match &action {
        CarouselCommands::Upload { file } => Some(read_upload(file).await?),
        _ => None,
    };

    shell.navigate(Section::Carousel).await?;
    let Some(view) = shell.carousel() else {
        return Ok(());
    };

    let result = match (action, upload) {
        (CarouselCommands::List, _) => Ok(()),
        (CarouselCommands::Upload { .. }, Some(upload)) => view.upload(upload).await,
        (CarouselCommands::Upload { file }, None) => Err(Error::validation(
            "file",
            format!("could not read {}", file.display()),
        )),
        (CarouselCommands::Toggle { id, state: Some(current) }, _) => {
            view.toggle(id, current).await.map(drop)
        }
        (CarouselCommands::Toggle { id, state: None }, _) => view.toggle_listed(id).await.map(drop),
        (CarouselCommands::Delete { id }, _) => view.delete(id).await,
    };

    let result = shell.report(result);
    print_view(shell);
    result
}

async fn read_upload(path: &Path) -> Result<ImageUpload> {
    let upload = ImageUpload::from_path(path).await?;
    info!(
        file = %upload.file_name,
        bytes = upload.bytes.len(),
        "Image ready for upload"
    );
    Ok(upload)
}

/// Handle the config command
///
/// # Errors
///
/// Returns error if configuration cannot be serialized
fn handle_config_command(config: &Config, show: bool) -> Result<()> {
    if show {
        let config_toml = toml::to_string_pretty(config).map_err(|e| {
            Error::configuration(format!("Failed to serialize configuration: {e}"))
        })?;
        println!("{config_toml}");
    } else {
        println!("Configuration is valid");
    }
    Ok(())
}
