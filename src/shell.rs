//! Interactive Shell
//!
//! A line-oriented front-end over [`App`]. One shell run is one "browser
//! session": a login without `remember` lasts until the shell exits.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::aggregate::SortField;
use crate::app::{App, Section};
use crate::guard::Route;
use crate::models::{parse_date_bound, DateRange, Granularity};
use crate::pages::IncomeForm;
use crate::render;

const HELP: &str = "\
Commands:
  help                              Show this help
  login <email> [remember]          Log in (prompts for the password)
  logout                            Log out and forget the token
  go <section>                      dashboard | charts | add-income | settings
  refresh                           Reload the current section
  sort <field>                      Sort the dashboard by source | heads | income | date
  filter <start|-> <end|->          Filter the dashboard by date (YYYY-MM-DD)
  reset                             Clear the dashboard filter
  add <source> <heads> [owner]      Create an income record
  edit <id> [<source> <heads> [owner]]
                                    Load a record into the form, or update it
  cancel                            Cancel editing
  delete <id>                       Delete an income record
  save <price> <percent>            Update haircut price and owner share
  range <start|-> <end|->           Set the charts date range
  granularity <day|month|year>      Set the charts bucket size
  trend <source|->                  Show the income trend for one barber
  dismiss                           Close the current message
  quit                              Exit
";

#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Help,
    Login { email: String, remember: bool },
    Logout,
    Go(Section),
    Refresh,
    Sort(SortField),
    Filter(DateRange),
    Reset,
    Add(IncomeForm),
    Edit { id: String, form: Option<IncomeForm> },
    Cancel,
    Delete(String),
    Save { price: String, percent: String },
    Range(DateRange),
    Granularity(Granularity),
    Trend(Option<String>),
    Dismiss,
    Quit,
}

impl ShellCommand {
    /// Parse one input line; a blank line yields `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&name, args)) = words.split_first() else {
            return Ok(None);
        };

        let command = match (name.to_ascii_lowercase().as_str(), args) {
            ("help" | "?", _) => ShellCommand::Help,
            ("quit" | "exit", _) => ShellCommand::Quit,
            ("logout", []) => ShellCommand::Logout,
            ("refresh", []) => ShellCommand::Refresh,
            ("reset", []) => ShellCommand::Reset,
            ("cancel", []) => ShellCommand::Cancel,
            ("dismiss", []) => ShellCommand::Dismiss,
            ("login", [email]) => ShellCommand::Login {
                email: email.to_string(),
                remember: false,
            },
            ("login", [email, flag]) if is_flag(flag, "remember") => ShellCommand::Login {
                email: email.to_string(),
                remember: true,
            },
            ("go", [section]) => ShellCommand::Go(section.parse()?),
            ("sort", [field]) => ShellCommand::Sort(field.parse()?),
            ("filter", [start, end]) => ShellCommand::Filter(date_range(start, end)?),
            ("range", [start, end]) => ShellCommand::Range(date_range(start, end)?),
            ("granularity", [g]) => ShellCommand::Granularity(g.parse()?),
            ("trend", ["-"]) => ShellCommand::Trend(None),
            ("trend", [_, ..]) => ShellCommand::Trend(Some(args.join(" "))),
            ("add", rest) => ShellCommand::Add(form(rest)?),
            ("edit", [id]) => ShellCommand::Edit {
                id: id.to_string(),
                form: None,
            },
            ("edit", [id, rest @ ..]) => ShellCommand::Edit {
                id: id.to_string(),
                form: Some(form(rest)?),
            },
            ("delete", [id]) => ShellCommand::Delete(id.to_string()),
            ("save", [price, percent]) => ShellCommand::Save {
                price: price.to_string(),
                percent: percent.to_string(),
            },
            (other, _) => {
                return Err(format!(
                    "Unknown or malformed command '{}'. Type 'help' for usage.",
                    other
                ))
            }
        };
        Ok(Some(command))
    }

    /// Commands available before logging in
    fn is_public(&self) -> bool {
        matches!(
            self,
            ShellCommand::Help | ShellCommand::Login { .. } | ShellCommand::Quit
        )
    }
}

fn is_flag(word: &str, flag: &str) -> bool {
    word.trim_start_matches('-').eq_ignore_ascii_case(flag)
}

fn date_range(start: &str, end: &str) -> Result<DateRange, String> {
    Ok(DateRange::new(parse_date_bound(start)?, parse_date_bound(end)?))
}

/// `<source...> <heads> [owner]`; the source may span several words.
fn form(args: &[&str]) -> Result<IncomeForm, String> {
    let (args, is_owner) = match args.split_last() {
        Some((flag, rest)) if is_flag(flag, "owner") => (rest, true),
        _ => (args, false),
    };
    match args.split_last() {
        Some((heads, source)) if !source.is_empty() => {
            Ok(IncomeForm::new(source.join(" "), *heads, is_owner))
        }
        _ => Err("Expected: <source> <heads> [owner]".to_string()),
    }
}

/// What the loop does after a command
#[derive(Debug, PartialEq)]
pub enum Flow {
    Continue(String),
    Quit,
}

/// Render whatever is on screen
pub fn view(app: &App) -> String {
    match app.route() {
        Route::Login => render::login(&app.login),
        Route::Home => match app.section() {
            Section::Dashboard => render::dashboard(&app.dashboard),
            Section::Charts => render::charts(&app.charts),
            Section::AddIncome => render::income(&app.income),
            Section::Settings => render::settings(&app.settings),
        },
    }
}

/// Make `section` current, fetching it only when switching
async fn focus(app: &mut App, section: Section) {
    if app.section() != section {
        app.select_section(section).await;
    }
}

/// Run one command against the app
pub async fn execute(app: &mut App, command: ShellCommand) -> Flow {
    if app.route() != Route::Home && !command.is_public() {
        return Flow::Continue("Please log in first: login <email> [remember]\n".to_string());
    }

    match command {
        ShellCommand::Help => return Flow::Continue(HELP.to_string()),
        ShellCommand::Quit => return Flow::Quit,
        ShellCommand::Login { email, remember } => {
            app.login.email = email;
            app.login.remember_me = remember;
            if app.login().await && !remember {
                tracing::debug!("Session-only login; token ends with this shell");
            }
        }
        ShellCommand::Logout => {
            if let Err(e) = app.logout() {
                tracing::error!("Logout could not clear every store: {}", e);
                return Flow::Continue(format!("Logged out, but: {}\n", e));
            }
        }
        ShellCommand::Go(section) => {
            app.select_section(section).await;
        }
        ShellCommand::Refresh => app.refresh().await,
        ShellCommand::Sort(field) => {
            focus(app, Section::Dashboard).await;
            app.dashboard.request_sort(field);
        }
        ShellCommand::Filter(range) => {
            focus(app, Section::Dashboard).await;
            app.dashboard.set_filter(&app.client, range).await;
        }
        ShellCommand::Reset => {
            focus(app, Section::Dashboard).await;
            app.dashboard.reset_filters(&app.client).await;
        }
        ShellCommand::Add(form) => {
            focus(app, Section::AddIncome).await;
            app.income.cancel_edit();
            app.income.form = form;
            app.income.submit(&app.client).await;
        }
        ShellCommand::Edit { id, form } => {
            focus(app, Section::AddIncome).await;
            if !app.income.edit(&id) {
                return Flow::Continue(format!("No income record with id '{}'\n", id));
            }
            if let Some(form) = form {
                app.income.form = form;
                app.income.submit(&app.client).await;
            }
        }
        ShellCommand::Cancel => {
            focus(app, Section::AddIncome).await;
            app.income.cancel_edit();
        }
        ShellCommand::Delete(id) => {
            focus(app, Section::AddIncome).await;
            app.income.delete(&app.client, &id).await;
        }
        ShellCommand::Save { price, percent } => {
            focus(app, Section::Settings).await;
            app.settings.haircut_price = price;
            app.settings.owner_share_percentage = percent;
            app.settings.submit(&app.client).await;
        }
        ShellCommand::Range(range) => {
            focus(app, Section::Charts).await;
            app.charts.set_range(&app.client, range).await;
        }
        ShellCommand::Granularity(granularity) => {
            focus(app, Section::Charts).await;
            app.charts.set_granularity(&app.client, granularity).await;
        }
        ShellCommand::Trend(source) => {
            focus(app, Section::Charts).await;
            app.charts.set_source(&app.client, source).await;
        }
        ShellCommand::Dismiss => app.dismiss(),
    }

    Flow::Continue(view(app))
}

/// Read commands from `input` until `quit` or end of input.
pub async fn run<R, W>(app: &mut App, input: R, mut output: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();

    if app.start() == Route::Home {
        app.refresh().await;
    }
    output
        .write_all(format!("Barbershop Income Tracker ('help' for commands)\n\n{}", view(app)).as_bytes())
        .await?;

    loop {
        output.write_all(b"barbershop> ").await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let command = match ShellCommand::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                output.write_all(format!("{}\n", message).as_bytes()).await?;
                continue;
            }
        };

        if let ShellCommand::Login { .. } = command {
            output.write_all(b"Password: ").await?;
            output.flush().await?;
            app.login.password = lines.next_line().await?.unwrap_or_default();
        }

        match execute(app, command).await {
            Flow::Continue(text) => output.write_all(text.as_bytes()).await?,
            Flow::Quit => break,
        }
    }

    output.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionStore;
    use crate::test_support::{client_for, record_json, StubApi};
    use chrono::NaiveDate;
    use serde_json::json;
    use std::sync::Arc;
    use tokio::io::BufReader;

    #[test]
    fn test_parse_commands() {
        assert_eq!(ShellCommand::parse("   ").unwrap(), None);
        assert_eq!(
            ShellCommand::parse("login owner@shop.ph remember").unwrap(),
            Some(ShellCommand::Login {
                email: "owner@shop.ph".to_string(),
                remember: true
            })
        );
        assert_eq!(
            ShellCommand::parse("go add-income").unwrap(),
            Some(ShellCommand::Go(Section::AddIncome))
        );
        assert_eq!(
            ShellCommand::parse("filter 2024-03-01 -").unwrap(),
            Some(ShellCommand::Filter(DateRange::new(
                NaiveDate::from_ymd_opt(2024, 3, 1),
                None
            )))
        );
        assert_eq!(
            ShellCommand::parse("add Mike 5 owner").unwrap(),
            Some(ShellCommand::Add(IncomeForm::new("Mike", "5", true)))
        );
        assert_eq!(
            ShellCommand::parse("trend -").unwrap(),
            Some(ShellCommand::Trend(None))
        );
        assert_eq!(
            ShellCommand::parse("add Mike Jr 5").unwrap(),
            Some(ShellCommand::Add(IncomeForm::new("Mike Jr", "5", false)))
        );
        assert_eq!(
            ShellCommand::parse("edit r1 Big Ben 2 --owner").unwrap(),
            Some(ShellCommand::Edit {
                id: "r1".to_string(),
                form: Some(IncomeForm::new("Big Ben", "2", true)),
            })
        );
        assert_eq!(
            ShellCommand::parse("trend Mike Jr").unwrap(),
            Some(ShellCommand::Trend(Some("Mike Jr".to_string())))
        );
        assert_eq!(ShellCommand::parse("dismiss").unwrap(), Some(ShellCommand::Dismiss));
        assert!(ShellCommand::parse("add 5 owner").is_err());
        assert!(ShellCommand::parse("go reports").is_err());
        assert!(ShellCommand::parse("add Mike").is_err());
        assert!(ShellCommand::parse("dance").is_err());
    }

    #[tokio::test]
    async fn test_commands_require_login() {
        let stub = StubApi::new();
        let base = stub.serve().await;
        let mut app = App::with_client(client_for(&base, Arc::new(SessionStore::in_memory())));
        app.start();

        let flow = execute(&mut app, ShellCommand::Go(Section::Charts)).await;
        assert_eq!(
            flow,
            Flow::Continue("Please log in first: login <email> [remember]\n".to_string())
        );
        assert_eq!(execute(&mut app, ShellCommand::Quit).await, Flow::Quit);
        assert!(stub.requests().is_empty());
    }

    #[tokio::test]
    async fn test_session_from_login_to_logout() {
        let stub = StubApi::new();
        stub.respond("POST", "/api/users/login", 200, json!({"token": "tok"}));
        stub.respond(
            "GET",
            "/api/income",
            200,
            json!({"incomes": [record_json("a1", "Mike", 5, 750.0, "2024-03-04")]}),
        );
        stub.respond("POST", "/api/income", 201, json!({}));
        let base = stub.serve().await;

        let session = Arc::new(SessionStore::in_memory());
        let mut app = App::with_client(client_for(&base, session.clone()));

        let script = "login owner@shop.ph\nsecret\nadd Ana 3\nlogout\nquit\n";
        let mut output = Vec::new();
        run(&mut app, BufReader::new(script.as_bytes()), &mut output)
            .await
            .unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("Password: "));
        assert!(text.contains("₱750.00"));
        assert!(text.contains("Income record created successfully!"));
        assert!(text.contains("== Login =="));

        let login = stub.requests_to("POST", "/api/users/login");
        assert_eq!(login[0].body, Some(json!({"email": "owner@shop.ph", "password": "secret"})));

        let created = stub.requests_to("POST", "/api/income");
        assert_eq!(
            created[0].body,
            Some(json!({"source": "Ana", "numberOfHeads": 3, "isOwner": false}))
        );

        assert_eq!(app.route(), Route::Login);
        assert!(session.token().unwrap().is_none());
    }
}
