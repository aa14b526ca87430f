//! src/main.rs
//! Terminal host for the registration form controller

use std::{
    io::{self, Stdout},
    panic::PanicHookInfo,
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use crossterm::{
    event::{Event as TerminalEvent, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Frame, Terminal, backend::CrosstermBackend};
use tokio::{
    signal,
    sync::{Notify, mpsc},
};
use tracing::{debug, error, info, warn};

use regform_core::{
    Logger, RegistrationFormController,
    config::Config,
    controller::{
        actions::Action,
        event_loop::{EventLoop, TaskResult},
    },
    lookup::{FixtureRegionLookup, HttpRegionLookup, RegionLookup},
    model::{
        avatar::AvatarPreview,
        form_state::RegistrationTab,
        region_list::RegionListState,
        ui_state::{PromptKind, UIState},
    },
    view::{ElementId, SnapshotView, ui::FormRenderer},
};

type AppTerminal = Terminal<CrosstermBackend<Stdout>>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    setup_panic_handler();

    let loaded = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => Config::from_path(&path).await,
        None => Config::load().await,
    };
    let config = loaded.unwrap_or_else(|e| {
        eprintln!("Failed to load config, using defaults: {e}");
        Config::default()
    });

    let _log_guard = Logger::init(&config.logging).context("Failed to initialize logging")?;
    info!("Starting registration form host");

    let app = App::new(config)
        .await
        .context("Failed to initialize application")?;
    app.run().await.context("Application runtime error")?;

    info!("Application exited cleanly");
    Ok(())
}

struct App {
    terminal: AppTerminal,
    event_loop: EventLoop<SnapshotView>,
    action_tx: mpsc::UnboundedSender<Action>,
    renderer: FormRenderer,
    ui: UIState,
    shutdown: Arc<Notify>,
    last_region_state: &'static str,
    last_avatar: AvatarPreview,
}

impl App {
    async fn new(config: Config) -> Result<Self> {
        let lookup: Arc<dyn RegionLookup> = match &config.lookup.fixture_path {
            Some(path) => Arc::new(
                FixtureRegionLookup::from_file(path)
                    .await
                    .with_context(|| format!("Failed to load region fixture {}", path.display()))?,
            ),
            None => Arc::new(HttpRegionLookup::new(&config.lookup)?),
        };

        let (task_tx, task_rx) = mpsc::unbounded_channel::<TaskResult>();
        let (action_tx, action_rx) = mpsc::unbounded_channel::<Action>();

        let view = SnapshotView::from_config(&config.form);
        let mut controller = RegistrationFormController::from_config(view, lookup, task_tx, &config);
        controller.subscribe(ElementId::Region, |event| {
            debug!(?event, "region changed");
        });

        let event_loop = EventLoop::new(controller, action_rx, task_rx);

        // Page load.
        action_tx
            .send(Action::Initialize)
            .context("Action channel closed before start")?;

        let terminal = setup_terminal().context("Failed to initialize terminal")?;

        Ok(Self {
            terminal,
            event_loop,
            action_tx,
            renderer: FormRenderer::new(),
            ui: UIState::new(),
            shutdown: Arc::new(Notify::new()),
            last_region_state: "unselected",
            last_avatar: AvatarPreview::Placeholder,
        })
    }

    async fn run(mut self) -> Result<()> {
        self.setup_shutdown_handler();
        let mut event_stream = EventStream::new();
        let mut tick = tokio::time::interval(Duration::from_millis(250));

        loop {
            self.render()?;

            tokio::select! {
                _ = self.shutdown.notified() => {
                    info!("Shutdown signal received");
                    break;
                }

                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(TerminalEvent::Key(key))) => self.handle_key(key),
                        Some(Ok(TerminalEvent::Resize(..))) => self.ui.request_redraw(),
                        Some(Ok(_)) => {}
                        Some(Err(e)) => warn!("Terminal event error: {}", e),
                        None => break,
                    }
                }

                action = self.event_loop.next_action() => {
                    if !self.event_loop.dispatch(action) {
                        info!("Quit action from event loop");
                        break;
                    }
                    self.after_dispatch();
                }

                _ = tick.tick() => {
                    self.ui.expire_notification(Instant::now());
                }
            }
        }

        let metrics = self.event_loop.metrics();
        info!(
            actions = metrics.actions,
            tasks = metrics.tasks,
            stale_tasks = metrics.stale_tasks,
            frames = self.renderer.stats().frames,
            avg_frame_us = self.renderer.stats().avg().as_micros(),
            "Final metrics"
        );
        Ok(())
    }

    fn send(&self, action: Action) {
        if self.action_tx.send(action).is_err() {
            warn!("Action channel closed");
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if self.ui.prompt.is_some() {
            self.handle_prompt_key(key);
            return;
        }

        let controller = self.event_loop.controller_mut();
        match (key.code, key.modifiers) {
            (KeyCode::Char('q'), KeyModifiers::NONE) | (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
                self.send(Action::Quit);
            }

            (KeyCode::Left, _) => self.send(Action::TabChanged(RegistrationTab::Legal)),
            (KeyCode::Right, _) => self.send(Action::TabChanged(RegistrationTab::Individual)),

            (KeyCode::Char('f'), KeyModifiers::NONE) => {
                let view = controller.view_mut();
                let checked = !view.snapshot().fop_checked;
                view.input_fop_checked(checked);
                self.send(Action::FopCheckboxChanged(checked));
            }

            (KeyCode::Char('c'), KeyModifiers::NONE) => {
                let current = controller.view().snapshot().country.clone().unwrap_or_default();
                self.ui.open_prompt(PromptKind::Country, current);
            }

            (KeyCode::Char('a'), KeyModifiers::NONE) => {
                self.ui.open_prompt(PromptKind::AvatarPath, String::new());
            }

            (KeyCode::Up, _) | (KeyCode::Down, _) => {
                let snap = controller.view().snapshot();
                if snap.region_enabled {
                    let delta = if key.code == KeyCode::Up { -1 } else { 1 };
                    self.ui.move_region_cursor(delta, snap.region_options.len());
                }
            }

            (KeyCode::Enter, _) => {
                let snap = controller.view().snapshot();
                if snap.region_enabled
                    && let Some(opt) = snap.region_options.get(self.ui.region_cursor)
                {
                    let value = (!opt.is_placeholder()).then(|| opt.value.to_string());
                    controller.view_mut().input_region(value.as_deref());
                    self.send(Action::RegionSelected(value));
                }
            }

            _ => {}
        }
        self.ui.request_redraw();
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.ui.take_prompt();
            }
            KeyCode::Enter => {
                let Some(prompt) = self.ui.take_prompt() else {
                    return;
                };
                let value = prompt.buffer.trim().to_string();
                match prompt.kind {
                    PromptKind::Country => {
                        let country = (!value.is_empty()).then_some(value);
                        self.event_loop
                            .controller_mut()
                            .view_mut()
                            .input_country(country.as_deref());
                        self.ui.region_cursor = 0;
                        self.send(Action::CountryChanged(country));
                    }
                    PromptKind::AvatarPath => {
                        let path = (!value.is_empty()).then(|| PathBuf::from(value));
                        self.send(Action::AvatarFileSelected(path));
                    }
                }
            }
            KeyCode::Backspace => {
                if let Some(prompt) = self.ui.prompt.as_mut() {
                    prompt.buffer.pop();
                }
                self.ui.request_redraw();
            }
            KeyCode::Char(c) => {
                if let Some(prompt) = self.ui.prompt.as_mut() {
                    prompt.buffer.push(c);
                }
                self.ui.request_redraw();
            }
            _ => {}
        }
    }

    /// Surfaces region and avatar transitions in the status line.
    fn after_dispatch(&mut self) {
        self.ui.request_redraw();
        let controller = self.event_loop.controller();

        let state = controller.regions().name();
        if state != self.last_region_state {
            self.last_region_state = state;
            match controller.regions() {
                RegionListState::Error { error, .. } => {
                    let message = format!("Region lookup failed: {error}");
                    self.ui.show_error(message);
                }
                RegionListState::Populated { regions, .. } => {
                    let message = format!("{} regions loaded", regions.len());
                    self.ui.show_info(message);
                }
                _ => {}
            }
        }

        let avatar = controller.avatar().clone();
        if avatar != self.last_avatar {
            if let AvatarPreview::ReadError { reason, .. } = &avatar {
                self.ui.show_error(format!("Avatar not previewed: {reason}"));
            }
            self.last_avatar = avatar;
        }
    }

    fn render(&mut self) -> Result<()> {
        if !self.ui.needs_redraw() {
            return Ok(());
        }

        let start = Instant::now();
        let snapshot = self.event_loop.controller().view().snapshot();
        let renderer = &mut self.renderer;
        let ui = &self.ui;
        self.terminal
            .draw(|frame: &mut Frame<'_>| renderer.render(frame, snapshot, ui))
            .context("Failed to draw terminal")?;
        self.ui.clear_redraw();

        let duration = start.elapsed();
        if duration.as_millis() > 16 {
            warn!("Slow render: {}ms (target: <16ms)", duration.as_millis());
        }
        Ok(())
    }

    fn setup_shutdown_handler(&self) {
        let shutdown: Arc<Notify> = self.shutdown.clone();

        tokio::spawn(async move {
            #[cfg(unix)]
            {
                use tokio::signal::unix::{SignalKind, signal};

                let (Ok(mut sigterm), Ok(mut sigint)) = (
                    signal(SignalKind::terminate()),
                    signal(SignalKind::interrupt()),
                ) else {
                    warn!("Failed to install signal handlers");
                    return;
                };

                tokio::select! {
                    _ = sigterm.recv() => info!("Received SIGTERM"),
                    _ = sigint.recv() => info!("Received SIGINT"),
                    _ = signal::ctrl_c() => info!("Received Ctrl+C"),
                }
            }

            #[cfg(not(unix))]
            {
                if let Err(e) = signal::ctrl_c().await {
                    warn!("Failed to listen for Ctrl+C: {}", e);
                    return;
                }
                info!("Received Ctrl+C");
            }

            shutdown.notify_one();
        });
    }
}

impl Drop for App {
    fn drop(&mut self) {
        if let Err(e) = cleanup_terminal(&mut self.terminal) {
            warn!("Failed to cleanup terminal: {}", e);
        }
    }
}

fn setup_terminal() -> Result<AppTerminal> {
    enable_raw_mode().context("Failed to enable raw mode")?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;

    info!("Terminal setup complete");
    Ok(terminal)
}

fn cleanup_terminal(terminal: &mut AppTerminal) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    info!("Terminal cleanup complete");
    Ok(())
}

fn setup_panic_handler() {
    let original_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info: &PanicHookInfo<'_>| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);

        error!("Application panicked: {}", panic_info);
        original_hook(panic_info);
    }));
}
