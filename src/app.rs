//! Application Shell
//!
//! Composition root: owns the session store, the API client, the route
//! guard and every page's state, and tracks which route and section are on
//! screen.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;

use crate::api::{ApiClient, ApiError};
use crate::config::{Config, ConfigError};
use crate::guard::{Navigation, Route, RouteGuard};
use crate::pages::{ChartsPage, DashboardPage, IncomePage, LoginPage, SettingsPage};
use crate::session::{SessionError, SessionStore};

/// Errors that stop the shell from starting or acting
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Session storage error: {0}")]
    Session(#[from] SessionError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Not logged in. Run `barbershop login <email>` first.")]
    NotAuthenticated,
}

/// View shown inside the authenticated shell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Section {
    #[default]
    Dashboard,
    Charts,
    AddIncome,
    Settings,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Dashboard,
        Section::Charts,
        Section::AddIncome,
        Section::Settings,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Section::Dashboard => "dashboard",
            Section::Charts => "charts",
            Section::AddIncome => "add-income",
            Section::Settings => "settings",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Section::Dashboard => "Dashboard",
            Section::Charts => "Income Charts",
            Section::AddIncome => "Add Income",
            Section::Settings => "Settings",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dashboard" | "home" => Ok(Section::Dashboard),
            "charts" | "income-charts" => Ok(Section::Charts),
            "add-income" | "income" | "add" => Ok(Section::AddIncome),
            "settings" => Ok(Section::Settings),
            other => Err(format!(
                "Unknown section '{}' (expected dashboard, charts, add-income or settings)",
                other
            )),
        }
    }
}

pub struct App {
    session: Arc<SessionStore>,
    pub(crate) client: ApiClient,
    guard: RouteGuard,
    route: Route,
    section: Section,
    pub login: LoginPage,
    pub dashboard: DashboardPage,
    pub income: IncomePage,
    pub charts: ChartsPage,
    pub settings: SettingsPage,
}

impl App {
    /// Open the on-disk session and build the client from `config`
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let session = Arc::new(SessionStore::open(&config.session)?);
        let client = ApiClient::new(&config.api, session)?;
        tracing::info!("Using income API at {}", client.base_url());
        Ok(Self::with_client(client))
    }

    /// Build around an existing client; its session store is shared
    pub fn with_client(client: ApiClient) -> Self {
        let session = Arc::clone(client.session());
        Self {
            guard: RouteGuard::new(Arc::clone(&session)),
            session,
            client,
            route: Route::Login,
            section: Section::default(),
            login: LoginPage::new(),
            dashboard: DashboardPage::new(),
            income: IncomePage::new(),
            charts: ChartsPage::default(),
            settings: SettingsPage::new(),
        }
    }

    /// Mount the login route; a stored session goes straight to the shell.
    pub fn start(&mut self) -> Route {
        let target = self.login.on_mount(&self.session).unwrap_or(Route::Login);
        self.navigate(target).route()
    }

    pub fn navigate(&mut self, route: Route) -> Navigation {
        let navigation = self.guard.navigate(route);
        self.route = navigation.route();
        navigation
    }

    /// Switch the shell to `section` and fetch its data.
    ///
    /// Has no effect outside the authenticated route.
    pub async fn select_section(&mut self, section: Section) -> bool {
        if self.navigate(Route::Home) != Navigation::Render(Route::Home) {
            return false;
        }
        self.section = section;
        self.refresh().await;
        true
    }

    /// Re-fetch whatever the current section shows
    pub async fn refresh(&mut self) {
        if self.route != Route::Home {
            return;
        }
        match self.section {
            Section::Dashboard => self.dashboard.load(&self.client).await,
            Section::Charts => self.charts.load(&self.client).await,
            Section::AddIncome => self.income.load(&self.client).await,
            Section::Settings => self.settings.load(&self.client).await,
        }
    }

    /// Submit the login form; on success enter the shell on the dashboard.
    pub async fn login(&mut self) -> bool {
        let Some(route) = self.login.submit(&self.client, &self.session).await else {
            return false;
        };
        self.navigate(route);
        self.select_section(Section::Dashboard).await
    }

    /// Close the message on whatever is on screen
    pub fn dismiss(&mut self) {
        match (self.route, self.section) {
            (Route::Login, _) => self.login.dismiss(),
            (Route::Home, Section::Dashboard) => self.dashboard.dismiss(),
            (Route::Home, Section::Charts) => self.charts.dismiss(),
            (Route::Home, Section::AddIncome) => self.income.dismiss(),
            (Route::Home, Section::Settings) => self.settings.dismiss(),
        }
    }

    /// Forget the token everywhere and return to the login route.
    ///
    /// Page state is reset even when a store could not be cleared.
    pub fn logout(&mut self) -> Result<(), AppError> {
        let cleared = self.session.clear_all();

        self.login = LoginPage::new();
        self.dashboard = DashboardPage::new();
        self.income = IncomePage::new();
        self.charts = ChartsPage::default();
        self.settings = SettingsPage::new();
        self.section = Section::default();
        self.navigate(Route::Login);

        tracing::info!("Logged out");
        cleared.map_err(AppError::from)
    }

    /// Fail with `NotAuthenticated` unless the shell may render
    pub fn require_auth(&mut self) -> Result<(), AppError> {
        match self.navigate(Route::Home) {
            Navigation::Render(_) => Ok(()),
            Navigation::Redirect(_) => Err(AppError::NotAuthenticated),
        }
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn section(&self) -> Section {
        self.section
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }
}
