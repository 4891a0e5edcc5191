use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use rutinas_client::clients::models::common::DayOfWeek;
use rutinas_client::clients::models::requests::RoutinePayload;
use rutinas_client::clients::models::responses::PaginatedRoutines;
use rutinas_client::services::browser::{Browser, Handled};
use rutinas_client::services::debounce::Debouncer;
use rutinas_client::services::editor::RoutineEditor;
use rutinas_client::services::export::DEFAULT_EXPORT_FILE;
use rutinas_client::services::output_formatter::{
    format_home, format_notice, format_pagination, format_routine_detail, format_routine_line,
    format_stats,
};
use rutinas_client::services::query::ApplyOutcome;
use rutinas_client::services::screen::{Action, Done, HomeScreen, Severity};
use rutinas_client::{Config, RoutinesClient};

#[derive(Debug, Parser, Clone)]
#[command(name = "rutinas", version, about = "Manage gym routines on a routines server")]
pub struct Cli {
    /// Base URL of the routines API (overrides API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// List routines page by page
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Only routines with exercises on this day
        #[arg(long)]
        day: Option<DayOfWeek>,
    },
    /// Search routines by name
    Search {
        term: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        day: Option<DayOfWeek>,
    },
    /// Show one routine with its weekly calendar
    Show { id: i64 },
    /// Create a routine from a JSON draft {name, description?, exercises[]}
    Create {
        #[arg(long)]
        file: PathBuf,
    },
    /// Replace a routine with a JSON draft
    Update {
        id: i64,
        #[arg(long)]
        file: PathBuf,
    },
    Delete { id: i64 },
    /// Copy a routine server-side
    Duplicate {
        id: i64,
        #[arg(long)]
        name: Option<String>,
    },
    Stats,
    /// Download every routine as CSV
    Export {
        #[arg(long, default_value = DEFAULT_EXPORT_FILE)]
        output: PathBuf,
    },
    /// Interactive home screen: type to search, `:day`, `:page`, `:quit`
    Browse,
}

pub async fn run(args: Cli) -> Result<()> {
    let mut config = Config::from_env()?;
    if let Some(api_url) = args.api_url {
        config.api_url = api_url;
    }
    let client = RoutinesClient::new(&config)?;

    match args.command {
        Command::List { page, day } => {
            let routines = client.get_routines(page.max(1), config.page_size, day).await?;
            print_page(&routines);
        }
        Command::Search { term, page, day } => {
            let routines = client
                .search_routines(&term, page.max(1), config.page_size, day)
                .await?;
            print_page(&routines);
        }
        Command::Show { id } => {
            let routine = client.get_routine(id).await?;
            print!("{}", format_routine_detail(&routine));
        }
        Command::Create { file } => {
            let editor = RoutineEditor::from_payload(read_draft(&file).await?, None);
            let mut screen = HomeScreen::new(client, config.page_size);
            let saved = screen.submit(&editor).await?;
            finish(&mut screen)?;
            if let Some(routine) = saved {
                println!("{}", format_routine_line(&routine));
            }
        }
        Command::Update { id, file } => {
            let editor = RoutineEditor::from_payload(read_draft(&file).await?, Some(id));
            let mut screen = HomeScreen::new(client, config.page_size);
            let saved = screen.submit(&editor).await?;
            finish(&mut screen)?;
            if let Some(routine) = saved {
                println!("{}", format_routine_line(&routine));
            }
        }
        Command::Delete { id } => {
            let mut screen = HomeScreen::new(client, config.page_size);
            screen.delete(id).await;
            finish(&mut screen)?;
        }
        Command::Duplicate { id, name } => {
            let mut screen = HomeScreen::new(client, config.page_size);
            let copy = screen.duplicate(id, name.as_deref()).await;
            finish(&mut screen)?;
            if let Some(routine) = copy {
                println!("{}", format_routine_line(&routine));
            }
        }
        Command::Stats => {
            let stats = client.get_stats().await?;
            println!("{}", format_stats(&stats));
        }
        Command::Export { output } => {
            let mut screen = HomeScreen::new(client, config.page_size);
            screen.export_csv(&output).await;
            finish(&mut screen)?;
        }
        Command::Browse => browse(&config, client).await?,
    }

    Ok(())
}

async fn read_draft(path: &Path) -> Result<RoutinePayload> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parse routine draft {}", path.display()))
}

fn print_page(routines: &PaginatedRoutines) {
    if routines.items.is_empty() {
        println!("No routines found.");
    }
    for routine in &routines.items {
        println!("{}", format_routine_line(routine));
    }
    println!("{}", format_pagination(&routines.meta));
}

/// Print the screen's notice and turn an error notice into a failing exit.
fn finish(screen: &mut HomeScreen<RoutinesClient>) -> Result<()> {
    match screen.take_notice() {
        Some(notice) if notice.severity == Severity::Error => {
            Err(anyhow::anyhow!("{}", notice.message))
        }
        Some(notice) => {
            println!("{}", format_notice(&notice));
            Ok(())
        }
        None => Ok(()),
    }
}

#[derive(Debug, PartialEq)]
enum BrowseCommand {
    Input(String),
    Day(Option<DayOfWeek>),
    Page(u32),
    Open(i64),
    Delete(i64),
    Duplicate(i64),
    Export(PathBuf),
    Quit,
    Unknown(String),
}

fn parse_browse_command(line: &str) -> BrowseCommand {
    let Some(command) = line.trim().strip_prefix(':') else {
        return BrowseCommand::Input(line.to_string());
    };
    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let arg = parts.next();

    match (name, arg) {
        ("q" | "quit", _) => BrowseCommand::Quit,
        ("day", None) | ("day", Some("all")) => BrowseCommand::Day(None),
        ("day", Some(day)) => match day.parse::<DayOfWeek>() {
            Ok(day) => BrowseCommand::Day(Some(day)),
            Err(e) => BrowseCommand::Unknown(e.to_string()),
        },
        ("page", Some(page)) => match page.parse::<u32>() {
            Ok(page) if page > 0 => BrowseCommand::Page(page),
            _ => BrowseCommand::Unknown(format!("invalid page: {}", page)),
        },
        ("open", Some(id)) | ("delete", Some(id)) | ("dup", Some(id)) => match id.parse::<i64>() {
            Ok(id) if name == "open" => BrowseCommand::Open(id),
            Ok(id) if name == "delete" => BrowseCommand::Delete(id),
            Ok(id) => BrowseCommand::Duplicate(id),
            Err(_) => BrowseCommand::Unknown(format!("invalid id: {}", id)),
        },
        ("export", path) => {
            BrowseCommand::Export(PathBuf::from(path.unwrap_or(DEFAULT_EXPORT_FILE)))
        }
        _ => BrowseCommand::Unknown(format!("unknown command: {}", line.trim())),
    }
}

fn render(screen: &mut HomeScreen<RoutinesClient>) {
    println!("{}", format_home(&screen.query, screen.stats()));
    if let Some(notice) = screen.take_notice() {
        println!("{}", format_notice(&notice));
    }
}

async fn browse(config: &Config, client: RoutinesClient) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut browser = Browser::new(HomeScreen::new(client, config.page_size), tx);
    browser.reload_stats();
    browser.fetch();

    let mut debouncer = Debouncer::new(config.search_debounce);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_browse_command(&line) {
                    BrowseCommand::Input(text) => {
                        browser.screen.query.set_input(text.clone());
                        debouncer.push(text);
                    }
                    BrowseCommand::Day(day) => {
                        if browser.screen.query.set_day_filter(day) {
                            browser.fetch();
                        }
                    }
                    BrowseCommand::Page(page) => {
                        if browser.screen.query.set_page(page) {
                            browser.fetch();
                        }
                    }
                    BrowseCommand::Open(id) => browser.start(Action::Open(id)),
                    BrowseCommand::Delete(id) => browser.start(Action::Delete(id)),
                    BrowseCommand::Duplicate(id) => browser.start(Action::Duplicate {
                        routine_id: id,
                        new_name: None,
                    }),
                    BrowseCommand::Export(path) => browser.start(Action::Export(path)),
                    BrowseCommand::Quit => break,
                    BrowseCommand::Unknown(message) => {
                        eprintln!("{message}");
                        eprintln!("type to search, or :day <day|all>, :page <n>, :open <id>, :delete <id>, :dup <id>, :export [file], :quit");
                    }
                }
            }
            term = debouncer.settled() => {
                if browser.screen.query.commit_term(&term) {
                    browser.fetch();
                }
            }
            Some(event) = rx.recv() => {
                match browser.handle(event) {
                    Handled::Query(ApplyOutcome::Stale) => {}
                    Handled::Action(Some(Done::Opened(routine))) => {
                        print!("{}", format_routine_detail(&routine));
                        render(&mut browser.screen);
                    }
                    _ => render(&mut browser.screen),
                }
            }
        }
    }

    if browser.pending_actions() > 0 {
        tracing::warn!(pending = browser.pending_actions(), "browse.quit_with_pending_actions");
    }
    Ok(())
}
