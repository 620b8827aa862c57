use std::io;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use kata_dojo::api::offline::OfflineService;
use kata_dojo::api::{Completion, Deliver, KataService};
use kata_dojo::app::{App, Focus};
use kata_dojo::config::Config;
use kata_dojo::context::AppContext;
use kata_dojo::event::{AppEvent, EventHandler};
use kata_dojo::logging;
use kata_dojo::nav::route::{History, format_fragment};
use kata_dojo::store::json_store::JsonStore;
use kata_dojo::theme_store::{ThemeStore, system_preference};
use kata_dojo::ui::components::code_pane::CodePane;
use kata_dojo::ui::components::lesson_panel::LessonPanel;
use kata_dojo::ui::components::output_pane::OutputPane;
use kata_dojo::ui::components::sidebar_tree::SidebarTreeWidget;
use kata_dojo::ui::layout::AppLayout;
use kata_dojo::workspace::split::TerminalPointerCapture;

#[derive(Parser)]
#[command(name = "kata-dojo", version, about = "Terminal workspace for Rust compiler-error katas")]
struct Cli {
    #[arg(long, help = "Initial location fragment, e.g. '#/katas/move-semantics'")]
    location: Option<String>,

    #[arg(short, long, help = "Open this kata id (shorthand for --location)")]
    kata: Option<String>,

    #[arg(long, help = "Kata server base URL")]
    api_url: Option<String>,

    #[arg(long, help = "Use the bundled catalog instead of the server")]
    offline: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_else(|e| {
        eprintln!("Warning: could not read config ({e}); using defaults");
        Config::default()
    });
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    if cli.offline {
        config.offline = true;
    }

    let log_guard = logging::init(&config.log_filter);

    let initial = match (&cli.kata, &cli.location) {
        (Some(id), _) => format_fragment(id),
        (None, Some(location)) => location.clone(),
        (None, None) => String::new(),
    };

    let events = EventHandler::new(Duration::from_millis(config.tick_rate_ms));

    let tx = events.sender();
    let deliver: Deliver = Arc::new(move |completion: Completion| {
        let _ = tx.send(AppEvent::Completed(completion));
    });
    let service = build_service(&config, deliver)?;

    let mut history = History::new(&initial);
    {
        let tx = events.sender();
        history.on_change(move || {
            let _ = tx.send(AppEvent::FragmentChanged);
        });
    }

    let store = JsonStore::new()
        .inspect_err(|e| tracing::warn!(error = %e, "preference store unavailable"))
        .ok();
    let theme = ThemeStore::new(store, system_preference());
    let ctx = AppContext::new(history, service, theme);

    let mut app = App::new(config, ctx, Rc::new(TerminalPointerCapture));
    app.start();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        tracing::error!(error = ?err, "event loop failed");
        eprintln!("Error: {err:?}");
        if let Some(guard) = &log_guard {
            eprintln!("See logs in {}", guard.log_dir().display());
        }
    }

    persist_split_ratio(&app);

    Ok(())
}

/// Remember a dragged divider. Reloads the file so CLI overrides are not
/// written back.
fn persist_split_ratio(app: &App) {
    let ratio = app.layout.split_ratio();
    if (ratio - app.config.split_ratio).abs() < f64::EPSILON {
        return;
    }
    let Ok(mut on_disk) = Config::load() else {
        return;
    };
    on_disk.split_ratio = ratio;
    if let Err(e) = on_disk.save() {
        tracing::warn!(error = %e, "failed to save split ratio");
    }
}

fn build_service(config: &Config, deliver: Deliver) -> Result<Rc<dyn KataService>> {
    #[cfg(feature = "network")]
    if !config.offline {
        use kata_dojo::api::http::HttpService;
        let timeout = Duration::from_secs(config.request_timeout_secs);
        tracing::info!(api_url = %config.api_url, "using kata server");
        return Ok(Rc::new(HttpService::new(&config.api_url, timeout, deliver)?));
    }

    #[cfg(not(feature = "network"))]
    if !config.offline {
        tracing::warn!("built without network support; using bundled catalog");
    }

    tracing::info!("using bundled offline catalog");
    Ok(Rc::new(OfflineService::new(deliver)?))
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        app.handle_event(events.next()?);
        // Drain whatever queued up while we were drawing.
        while let Some(event) = events.try_next() {
            app.handle_event(event);
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let theme = app.theme.borrow();
    let colors = &theme.colors;
    let area = frame.area();

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    let layout = AppLayout::new(area, app.config.sidebar_width, app.focus == Focus::Sidebar);

    let location = app
        .ctx
        .route
        .current_kata_id()
        .unwrap_or_else(|| "no kata selected".to_string());
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " kata-dojo ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {location}  [{}]", theme.name),
            Style::default().fg(colors.text_dim()).bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, layout.header);

    app.sidebar_area.set(layout.sidebar);
    if let Some(sidebar_area) = layout.sidebar {
        let rows = app.sidebar.rows();
        let list = app.ctx.resource.list().get();
        frame.render_widget(
            SidebarTreeWidget::new(
                &rows,
                &list,
                app.sidebar.cursor(),
                app.focus == Focus::Sidebar,
                &theme,
            ),
            sidebar_area,
        );
    }

    if layout.panes.width > 0 {
        let detail = app.ctx.resource.detail().get();
        let state = app.workspace.state();
        frame.render_widget(
            LessonPanel::new(&detail, &state.disclosures, &theme),
            layout.lesson,
        );

        let panes = app.layout.areas(layout.panes);
        if panes.code.width > 0 {
            frame.render_widget(
                CodePane::new(
                    &state.buffer,
                    state.active_view,
                    app.focus == Focus::Editor,
                    &theme,
                ),
                panes.code,
            );
        }
        if let Some(divider) = panes.divider {
            let color = if app.layout.is_dragging() {
                colors.divider_active()
            } else {
                colors.divider()
            };
            let bar: Vec<Line> = (0..divider.height)
                .map(|_| Line::from(Span::styled("\u{2502}", Style::default().fg(color))))
                .collect();
            frame.render_widget(Paragraph::new(bar), divider);
        }
        if panes.output.width > 0 {
            frame.render_widget(
                OutputPane::new(
                    &state.run_state,
                    app.output_scroll,
                    app.focus == Focus::Output,
                    &theme,
                ),
                panes.output,
            );
        }
    } else {
        app.layout.clear_areas();
    }

    let hints = match app.focus {
        Focus::Sidebar => " [j/k] Move  [Enter] Open  [Tab] Focus  [Alt+\u{2190}/\u{2192}] Back/Fwd  [Ctrl+T] Theme  [q] Quit ",
        Focus::Editor => " [Ctrl+R] Run  [F2] Broken  [F3] Solution  [F4] Hint  [F6/F7] Maximize  [F8/F9] Notes  [Esc] Sidebar ",
        Focus::Output => " [j/k] Scroll  [Ctrl+\u{2190}/\u{2192}] Resize  [Tab] Focus  [q] Quit ",
    };
    let footer = Paragraph::new(Line::from(Span::styled(
        hints,
        Style::default().fg(colors.text_dim()),
    )));
    frame.render_widget(footer, layout.footer);
}
