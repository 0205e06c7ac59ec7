//! Barbershop CLI
//!
//! Terminal front-end for the income API:
//! - Log in and out
//! - List, add, edit and delete income records
//! - Show and update pricing settings
//! - Print income charts
//! - Run an interactive shell

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use tokio::io::BufReader;

use barbershop::aggregate::{sort_records, SortConfig, SortDirection, SortField};
use barbershop::models::{parse_date_bound, DateRange, Granularity};
use barbershop::pages::{login, ChartsPage, DashboardPage, IncomeForm, IncomePage, LoginPage, SettingsPage};
use barbershop::state::Flash;
use barbershop::{
    render, shell, ApiClient, App, AppError, AuthState, Config, Navigation, Route, RouteGuard,
    SessionStore,
};

#[derive(Parser)]
#[command(name = "barbershop")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Record and review barbershop income")]
#[command(long_about = "Barbershop income tracker.\nRecord per-barber income, review the dashboard and chart trends against the income API.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: ~/.config/barbershop/config.toml, then ./barbershop.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Income API URL (overrides config and BARBERSHOP_BASE_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: Format,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and store the session token
    Login {
        /// Account email
        email: String,
        /// Password (prompted for when omitted)
        #[arg(short, long)]
        password: Option<String>,
        /// Keep the token for the remember period instead of this command only
        #[arg(short, long)]
        remember: bool,
    },

    /// Forget the session token everywhere
    Logout,

    /// Show whether a session token is stored
    Status,

    /// Income records
    Income {
        #[command(subcommand)]
        action: IncomeAction,
    },

    /// Pricing settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// Income charts for a date range
    Charts {
        /// Start date, YYYY-MM-DD (default: 30 days ago)
        #[arg(long)]
        start: Option<String>,
        /// End date, YYYY-MM-DD (default: today)
        #[arg(long)]
        end: Option<String>,
        /// Bucket size (day, month, year)
        #[arg(short, long, default_value = "day")]
        granularity: String,
        /// Barber to show the income trend for
        #[arg(short, long)]
        source: Option<String>,
    },

    /// Interactive shell
    Shell,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum IncomeAction {
    /// List income records
    List {
        /// Start date, YYYY-MM-DD
        #[arg(long)]
        start: Option<String>,
        /// End date, YYYY-MM-DD
        #[arg(long)]
        end: Option<String>,
        /// Sort by source, heads, income or date
        #[arg(short, long, default_value = "date")]
        sort: String,
        /// Sort descending
        #[arg(short, long)]
        desc: bool,
    },
    /// Create an income record
    Add {
        /// Name of the barber
        source: String,
        /// Number of customers served
        heads: String,
        /// Record is the owner's own work
        #[arg(long)]
        owner: bool,
    },
    /// Update an income record
    Edit {
        id: String,
        source: String,
        heads: String,
        #[arg(long)]
        owner: bool,
    },
    /// Delete an income record
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Show the current settings
    Show,
    /// Update haircut price and owner share percentage
    Set { price: String, percent: String },
}

/// Configuration plus the session, client and guard built from it
struct Connection {
    config: Config,
    session: Arc<SessionStore>,
    client: ApiClient,
    guard: RouteGuard,
}

impl Connection {
    fn open(config_path: Option<&PathBuf>, api_url: Option<&String>) -> anyhow::Result<Self> {
        let mut config = match config_path {
            Some(path) => Config::load_with_env(path)?,
            None => Config::load_default(),
        };
        if let Some(url) = api_url {
            config.api.base_url = url.clone();
        }
        barbershop::logging::init(&config.logging);

        let session = Arc::new(SessionStore::open(&config.session).context("Failed to open session store")?);
        let client = ApiClient::new(&config.api, Arc::clone(&session))?;
        let guard = RouteGuard::new(Arc::clone(&session));
        tracing::debug!("Using income API at {}", client.base_url());

        Ok(Self {
            config,
            session,
            client,
            guard,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let Cli {
        command,
        config,
        api_url,
        format,
    } = Cli::parse();

    // `config` must work before any config file exists
    let connect = || Connection::open(config.as_ref(), api_url.as_ref());

    match command {
        Commands::Config { output } => write_config(output.as_ref())?,

        Commands::Login {
            email,
            password,
            remember,
        } => {
            let mut page = LoginPage::new();
            page.email = email;
            page.password = match password {
                Some(password) => password,
                None => prompt_password()?,
            };
            page.remember_me = remember;

            let Connection { client, session, .. } = connect()?;
            if page.submit(&client, &session).await.is_none() {
                bail!("{}", page.error().unwrap_or(login::LOGIN_FAILED));
            }
            println!("Logged in as {}", page.email.trim());
            if !remember {
                eprintln!("Note: without --remember the token ends with this command.");
                eprintln!("Use --remember, or `barbershop shell` for a session-only login.");
            }
        }

        Commands::Logout => {
            App::with_client(connect()?.client).logout()?;
            println!("Logged out");
        }

        Commands::Status => {
            let Connection {
                config,
                session,
                client,
                guard,
            } = connect()?;
            let logged_in = guard.state() == AuthState::Authenticated;
            let expires = session
                .cookies()
                .cookie(&config.session.cookie_name)
                .and_then(|cookie| cookie.expires);

            match format {
                Format::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({
                        "api_url": client.base_url(),
                        "logged_in": logged_in,
                        "expires": expires,
                    }))?
                ),
                Format::Table => {
                    println!("Barbershop v{}", env!("CARGO_PKG_VERSION"));
                    println!();
                    println!("API: {}", client.base_url());
                    match (logged_in, expires) {
                        (true, Some(expires)) => {
                            println!("Session: logged in (until {})", expires.format("%Y-%m-%d %H:%M UTC"))
                        }
                        (true, None) => println!("Session: logged in"),
                        (false, _) => println!("Session: not logged in"),
                    }
                }
            }
        }

        Commands::Income { action } => {
            let Connection { client, guard, .. } = connect()?;
            require_login(&guard)?;
            run_income(&client, action, format).await?;
        }

        Commands::Settings { action } => {
            let Connection { client, guard, .. } = connect()?;
            require_login(&guard)?;
            let mut page = SettingsPage::new();
            page.load(&client).await;
            if let Some(error) = page.load_error() {
                bail!("{}", error);
            }

            if let SettingsAction::Set { price, percent } = action {
                page.haircut_price = price;
                page.owner_share_percentage = percent;
                page.submit(&client).await;
            }
            check_flash(page.flash())?;

            match format {
                Format::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({
                        "haircutPrice": page.haircut_price.parse::<f64>().ok(),
                        "ownerSharePercentage": page.owner_share_percentage.parse::<f64>().ok(),
                    }))?
                ),
                Format::Table => print!("{}", render::settings(&page)),
            }
        }

        Commands::Charts {
            start,
            end,
            granularity,
            source,
        } => {
            let Connection { client, guard, .. } = connect()?;
            require_login(&guard)?;
            let mut page = ChartsPage::default();

            // Page defaults, overridden per side
            let mut range = page.query().range;
            if let Some(start) = start {
                range.start = parse_date_bound(&start).map_err(anyhow::Error::msg)?;
            }
            if let Some(end) = end {
                range.end = parse_date_bound(&end).map_err(anyhow::Error::msg)?;
            }
            let granularity: Granularity = granularity.parse().map_err(anyhow::Error::msg)?;

            page.configure(range, granularity, source);
            page.load(&client).await;
            if let Some(error) = page.error() {
                bail!("{}", error);
            }

            match format {
                Format::Json => {
                    let series: Vec<_> = [
                        page.source_chart(),
                        page.income_chart(),
                        page.heads_chart(),
                        page.trend_chart(),
                    ]
                    .into_iter()
                    .flatten()
                    .map(|s| json!({"title": s.title, "labels": s.labels, "values": s.values}))
                    .collect();
                    let summary = page.summary().map(|s| {
                        json!({
                            "totalIncome": s.total_income,
                            "totalHeads": s.total_heads,
                            "averageIncomePerHead": s.average_per_head(),
                        })
                    });
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&json!({"summary": summary, "charts": series}))?
                    );
                }
                Format::Table => print!("{}", render::charts(&page)),
            }
        }

        Commands::Shell => {
            let mut app = App::with_client(connect()?.client);
            let stdin = BufReader::new(tokio::io::stdin());
            shell::run(&mut app, stdin, tokio::io::stdout()).await?;
        }
    }

    Ok(())
}

async fn run_income(client: &ApiClient, action: IncomeAction, format: Format) -> anyhow::Result<()> {
    match action {
        IncomeAction::List {
            start,
            end,
            sort,
            desc,
        } => {
            let range = DateRange::new(
                parse_date_bound(start.as_deref().unwrap_or("-")).map_err(anyhow::Error::msg)?,
                parse_date_bound(end.as_deref().unwrap_or("-")).map_err(anyhow::Error::msg)?,
            );
            let field: SortField = sort.parse().map_err(anyhow::Error::msg)?;
            let direction = if desc { SortDirection::Desc } else { SortDirection::Asc };
            let sort = SortConfig::new(field, direction);

            let mut page = DashboardPage::new();
            page.set_filter(client, range).await;
            if let Some(error) = page.error() {
                bail!("{}", error);
            }

            let rows = sort_records(page.records(), sort);
            match format {
                Format::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
                Format::Table => {
                    print!("{}", render::totals_cards(&page.totals()));
                    println!();
                    print!("{}", render::records_table(&rows, Some(sort)));
                }
            }
        }

        IncomeAction::Add { source, heads, owner } => {
            let mut page = IncomePage::new();
            page.form = IncomeForm::new(source, heads, owner);
            page.submit(client).await;
            check_flash(page.flash())?;
        }

        IncomeAction::Edit {
            id,
            source,
            heads,
            owner,
        } => {
            let mut page = IncomePage::new();
            page.load(client).await;
            if let Some(error) = page.load_error() {
                bail!("{}", error);
            }
            if !page.edit(&id) {
                bail!("No income record with id '{}'", id);
            }
            page.form = IncomeForm::new(source, heads, owner);
            page.submit(client).await;
            check_flash(page.flash())?;
        }

        IncomeAction::Delete { id } => {
            let mut page = IncomePage::new();
            page.delete(client, &id).await;
            check_flash(page.flash())?;
        }
    }
    Ok(())
}

/// Stop with a hint when the route guard would send us to the login page
fn require_login(guard: &RouteGuard) -> anyhow::Result<()> {
    match guard.navigate(Route::Home) {
        Navigation::Render(_) => Ok(()),
        Navigation::Redirect(_) => bail!("{}", AppError::NotAuthenticated),
    }
}

/// Print a success flash, fail on an error flash
fn check_flash(flash: Option<&Flash>) -> anyhow::Result<()> {
    match flash {
        Some(flash) if flash.is_error() => bail!("{}", flash.message),
        Some(flash) => {
            println!("{}", flash);
            Ok(())
        }
        None => Ok(()),
    }
}

fn prompt_password() -> anyhow::Result<String> {
    use std::io::{BufRead, Write};

    eprint!("Password: ");
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn write_config(output: Option<&PathBuf>) -> anyhow::Result<()> {
    let config = barbershop::config::generate_default_config();

    match output {
        Some(path) => {
            // Create parent directory if needed
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &config)?;
            println!("Config written to {:?}", path);
        }
        None => {
            print!("{}", config);
        }
    }
    Ok(())
}
