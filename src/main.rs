//! EPOS Portal - browse and configure EPOS data distributions in the terminal.

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use epos_portal::api::{CatalogApi, DiscoverApi, SearchQuery};
use epos_portal::app::{App, AppPorts, InputTarget, Pane};
use epos_portal::config::{Args, PortalConfig};
use epos_portal::data::{build_facet_model, CatalogReader};
use epos_portal::storage::{JsonFileStore, MemoryStore, Store};
use epos_portal::{ui, util};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let print_tree = args.print_tree;
    let config = PortalConfig::from(args);

    // Set up logging if --log option is provided
    if let Some(log_path) = &config.log {
        let file = std::fs::File::create(log_path)?;
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
        tracing::info!("Starting EPOS Portal");
    }

    let catalog = match CatalogReader::read_file(&config.catalog) {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        },
    };
    let api = CatalogApi::new(catalog);

    if print_tree {
        let summaries = api.search(&SearchQuery::new(config.query.clone())).await?;
        let model = build_facet_model(&api.catalog().domains, &summaries);
        print!("{}", util::format_facet_tree(&model));
        return Ok(());
    }

    let store: Box<dyn Store> = match &config.state {
        Some(path) => Box::new(JsonFileStore::open(path)?),
        None => Box::new(MemoryStore::new()),
    };
    let mut app = App::new(Arc::new(api), store, AppPorts::default());
    app.load(SearchQuery::new(config.query.clone())).await?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let res = run_app(&mut terminal, &mut app).await;
    app.dispose();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {}", err);
    }

    if config.log.is_some() {
        tracing::info!("EPOS Portal exited");
    }

    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<()> {
    loop {
        app.process_events();
        terminal.draw(|f| ui::draw(f, app))?;

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        // Search mode - handle separately
        if app.search.is_active() {
            match key.code {
                KeyCode::Enter => {
                    if app.search.submit().is_some() {
                        if let Err(e) = app.run_search().await {
                            app.status = format!("Search failed: {}", e);
                        }
                    }
                },
                KeyCode::Esc => app.search.cancel(),
                KeyCode::Backspace => app.search.backspace(),
                KeyCode::Char(c) => app.search.input(c),
                _ => {},
            }
            continue;
        }

        // Line input - parameter values and global filters
        if let Some(input) = app.input.as_mut() {
            match key.code {
                KeyCode::Enter => app.commit_input(),
                KeyCode::Esc => app.input = None,
                KeyCode::Backspace => {
                    input.buffer.pop();
                },
                KeyCode::Char(c) => input.buffer.push(c),
                _ => {},
            }
            continue;
        }

        match (key.modifiers, key.code) {
            // Quit
            (KeyModifiers::NONE, KeyCode::Char('q')) => return Ok(()),

            // Navigation
            (KeyModifiers::NONE, KeyCode::Tab) => app.next_pane(),
            (KeyModifiers::NONE, KeyCode::Up) | (KeyModifiers::NONE, KeyCode::Char('k')) => {
                app.cursor_up();
            },
            (KeyModifiers::NONE, KeyCode::Down) | (KeyModifiers::NONE, KeyCode::Char('j')) => {
                app.cursor_down();
            },
            (KeyModifiers::NONE, KeyCode::Left) | (KeyModifiers::NONE, KeyCode::Char('h')) => {
                if app.focus == Pane::Facets {
                    app.facets.collapse_current();
                }
            },
            (KeyModifiers::NONE, KeyCode::Right) | (KeyModifiers::NONE, KeyCode::Char('l')) => {
                if app.focus == Pane::Facets {
                    app.facets.expand_current();
                }
            },
            (KeyModifiers::NONE, KeyCode::Char('[')) => app.switch_domain(false),
            (KeyModifiers::NONE, KeyCode::Char(']')) => app.switch_domain(true),

            // Selection
            (KeyModifiers::NONE, KeyCode::Char(' ')) | (KeyModifiers::NONE, KeyCode::Enter) => {
                match app.focus {
                    Pane::Facets => app.toggle_facet(),
                    Pane::Distributions => app.select_current_distribution(),
                    Pane::Results => app.focus = Pane::Parameters,
                    Pane::Parameters => app.start_param_edit(),
                }
            },
            (KeyModifiers::NONE, KeyCode::Char('x')) => app.clear_facets(),
            (KeyModifiers::NONE, KeyCode::Delete) => app.deselect_current(),

            // Search and global filters
            (KeyModifiers::NONE, KeyCode::Char('/')) => app.search.start(),
            (KeyModifiers::NONE, KeyCode::Char('b')) => {
                app.start_filter_input(InputTarget::BoundingBox);
            },
            (KeyModifiers::NONE, KeyCode::Char('d')) => {
                app.start_filter_input(InputTarget::TimeRange);
            },

            // Results
            (KeyModifiers::NONE, KeyCode::Char('p')) => app.toggle_pin_current(),
            (KeyModifiers::NONE, KeyCode::Char('f')) => app.switch_view(),
            (KeyModifiers::NONE, KeyCode::Char('a')) => app.apply_current(),
            (KeyModifiers::NONE, KeyCode::Char('r')) => app.reset_current(),
            (KeyModifiers::NONE, KeyCode::Char('m')) => app.toggle_spatial_link(),
            (KeyModifiers::NONE, KeyCode::Char('t')) => app.toggle_temporal_link(),

            // Clipboard
            (KeyModifiers::NONE, KeyCode::Char('u')) => app.copy_current_url().await,
            (KeyModifiers::NONE, KeyCode::Char('y')) => app.copy_current_info(),
            (KeyModifiers::NONE, KeyCode::Char('c')) => app.copy_facet_tree(),

            // Features
            (KeyModifiers::SHIFT, KeyCode::Char('T')) => app.cycle_theme(),
            (KeyModifiers::SHIFT, KeyCode::Char('?')) => {
                app.status = "Help: q=quit, Tab=pane, Space=check/select, /=search, b/d=bbox/time, p=pin, f=favourites, a=apply, u=copy URL".to_string();
            },
            (KeyModifiers::NONE, KeyCode::Esc) => app.focus = Pane::Facets,

            _ => {},
        }
    }
}
