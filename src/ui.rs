use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers, MouseButton, MouseEvent, MouseEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};
use std::{
    io::{self, Stdout},
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::Mutex;
use tui_input::Input;
use tui_logger::TuiLoggerWidget;

use crate::client::{ConnectionStatus, QualAiClientManager};
use crate::config::QualAiConfig;
use crate::menu::{MenuAction, MenuRenderer};
use crate::screens::chat::ChatScreen;
use crate::screens::connect::{ConnectAction, ConnectScreen};
use crate::screens::project::ProjectScreen;
use crate::screens::upload::UploadScreen;
use crate::statusbar::{Screen, StatusBarRenderer};

/// Restores the terminal even when the app unwinds. Raw mode, the alternate
/// screen and mouse capture are all torn down in Drop.
struct TerminalGuard;

impl TerminalGuard {
    fn new(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<Self> {
        enable_raw_mode()?;
        execute!(terminal.backend_mut(), EnterAlternateScreen)?;
        execute!(terminal.backend_mut(), event::EnableMouseCapture)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), event::DisableMouseCapture);
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

pub struct App {
    client_manager: Arc<Mutex<QualAiClientManager>>,
    config: QualAiConfig,
    current_screen: Screen,
    previous_screen: Screen,
    should_quit: bool,

    connect_screen: ConnectScreen,
    project_screen: ProjectScreen,
    chat_screen: ChatScreen,
    upload_screen: UploadScreen,

    new_project_input: Option<Input>,

    menu_renderer: MenuRenderer,
    statusbar_renderer: StatusBarRenderer,
}

impl App {
    pub fn new(config: QualAiConfig) -> Result<Self> {
        let manager = QualAiClientManager::new(config.clone())?;
        let client_manager = Arc::new(Mutex::new(manager));

        let mut statusbar_renderer = StatusBarRenderer::new();
        statusbar_renderer.set_project(config.project.clone());

        Ok(Self {
            connect_screen: ConnectScreen::new(&config.server_url),
            project_screen: ProjectScreen::new(client_manager.clone(), config.autosave_delay_ms),
            chat_screen: ChatScreen::new(client_manager.clone()),
            upload_screen: UploadScreen::new(),
            client_manager,
            config,
            current_screen: Screen::Connect,
            previous_screen: Screen::Connect,
            should_quit: false,
            new_project_input: None,
            menu_renderer: MenuRenderer::new(),
            statusbar_renderer,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let stdout = io::stdout();
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let _guard = TerminalGuard::new(&mut terminal)?;
        self.run_app(&mut terminal).await
    }

    async fn run_app(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        let mut last_tick = Instant::now();
        let tick_rate = Duration::from_millis(250);

        loop {
            terminal.draw(|f| self.ui(f))?;

            let timeout = tick_rate.saturating_sub(last_tick.elapsed());
            if event::poll(timeout)? {
                match event::read()? {
                    Event::Key(key) => {
                        self.handle_input(key.code, key.modifiers).await?;
                    }
                    Event::Mouse(mouse) => {
                        self.handle_mouse_event(mouse).await?;
                    }
                    _ => {}
                }
            }

            if last_tick.elapsed() >= tick_rate {
                self.on_tick().await;
                last_tick = Instant::now();
            }

            if self.should_quit {
                if let Err(e) = self.project_screen.flush_pending_save().await {
                    log::error!("Final save failed, unsaved changes were lost: {e}");
                }
                return Ok(());
            }
        }
    }

    fn set_status(&mut self, message: String) {
        self.statusbar_renderer.set_status_message(message);
    }

    fn switch_screen(&mut self, screen: Screen) {
        if self.current_screen != screen {
            self.previous_screen = self.current_screen;
            self.current_screen = screen;
            self.statusbar_renderer.set_current_screen(screen);
        }
    }

    async fn connection_status(&self) -> ConnectionStatus {
        self.client_manager.lock().await.get_connection_status()
    }

    async fn on_tick(&mut self) {
        let status = self.connection_status().await;
        self.menu_renderer.set_connection_status(status.clone());
        self.statusbar_renderer.set_connection_status(status);

        // Autosave runs on every tick; a dirty buffer must not wait for the
        // user to come back to the project screen.
        if let Err(e) = self.project_screen.on_tick().await {
            log::error!("Autosave failed: {e}");
            self.set_status(format!("Autosave failed: {e}"));
        }

        if self.upload_screen.take_newly_completed() > 0 {
            if let Err(e) = self.project_screen.refresh_documents().await {
                log::warn!("Document refresh after upload failed: {e}");
            } else {
                self.set_status("Upload complete, documents refreshed".to_string());
            }
        }
    }

    async fn do_connect(&mut self, url: String) {
        self.connect_screen.set_in_progress(true);
        self.connect_screen.log(&format!("Connecting to {url}..."));
        self.statusbar_renderer
            .set_connection_status(ConnectionStatus::Connecting);

        let result = self.client_manager.lock().await.connect(&url).await;
        self.connect_screen.set_in_progress(false);

        match result {
            Ok(()) => {
                self.connect_screen.log("Connected");
                self.set_status(format!("Connected to {url}"));
                if let Err(e) = self.project_screen.refresh_documents().await {
                    log::warn!("Failed to load documents: {e}");
                }
                if let Err(e) = self.chat_screen.load_history().await {
                    log::warn!("Failed to load chat history: {e}");
                }
                self.load_default_project().await;
                self.switch_screen(Screen::Project);
            }
            Err(e) => {
                self.connect_screen.log(&format!("Connection failed: {e}"));
                self.set_status("Connection failed".to_string());
            }
        }
    }

    /// Without a configured project, fall back to the first one the
    /// backend reports.
    async fn load_default_project(&mut self) {
        if self.statusbar_renderer.project.is_some() {
            return;
        }
        match self.client_manager.lock().await.list_projects().await {
            Ok(projects) => {
                log::info!("Projects available: {projects:?}");
                if let Some(first) = projects.first() {
                    self.client_manager
                        .lock()
                        .await
                        .set_project(Some(first.clone()));
                    self.statusbar_renderer.set_project(Some(first.clone()));
                }
            }
            Err(e) => log::warn!("Failed to list projects: {e}"),
        }
    }

    async fn dispatch_menu_action(&mut self, action: MenuAction) -> Result<()> {
        self.menu_renderer.close_menu();
        match action {
            MenuAction::NewProject => {
                self.new_project_input = Some(Input::default());
            }
            MenuAction::RefreshDocuments => match self.project_screen.refresh_documents().await {
                Ok(()) => self.set_status("Documents refreshed".to_string()),
                Err(e) => self.set_status(format!("Refresh failed: {e}")),
            },
            MenuAction::Upload => self.switch_screen(Screen::Upload),
            MenuAction::Exit => self.should_quit = true,
            MenuAction::ViewProject => self.switch_screen(Screen::Project),
            MenuAction::ViewChat => self.switch_screen(Screen::Chat),
            MenuAction::ViewLogs => self.switch_screen(Screen::Logs),
            MenuAction::ViewHelp => self.switch_screen(Screen::Help),
        }
        Ok(())
    }

    async fn commit_new_project(&mut self) {
        let Some(input) = self.new_project_input.take() else {
            return;
        };
        let name = input.value().trim().to_string();
        if name.is_empty() {
            self.set_status("Project name cannot be empty".to_string());
            return;
        }
        let result = self.client_manager.lock().await.create_project(&name).await;
        match result {
            Ok(()) => {
                self.client_manager
                    .lock()
                    .await
                    .set_project(Some(name.clone()));
                self.statusbar_renderer.set_project(Some(name.clone()));
                self.set_status(format!("Project '{name}' created"));
            }
            Err(e) => self.set_status(format!("Failed to create project: {e}")),
        }
    }

    async fn handle_input(&mut self, key: KeyCode, modifiers: KeyModifiers) -> Result<()> {
        // New-project dialog swallows everything while open
        if self.new_project_input.is_some() {
            match key {
                KeyCode::Esc => {
                    self.new_project_input = None;
                    self.set_status("New project cancelled".to_string());
                }
                KeyCode::Enter => self.commit_new_project().await,
                _ => {
                    if let Some(req) = crate::screens::to_input_request(key, modifiers) {
                        if let Some(input) = self.new_project_input.as_mut() {
                            input.handle(req);
                        }
                    }
                }
            }
            return Ok(());
        }

        if self.menu_renderer.get_active_menu().is_some() && key == KeyCode::Esc {
            self.menu_renderer.close_menu();
            return Ok(());
        }

        // Global shortcuts
        let connected = self.connection_status().await == ConnectionStatus::Connected;
        match key {
            KeyCode::Char('x') if modifiers.contains(KeyModifiers::ALT) => {
                self.should_quit = true;
                return Ok(());
            }
            KeyCode::Char('q') if modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
                return Ok(());
            }
            KeyCode::F(1) => {
                self.switch_screen(Screen::Help);
                return Ok(());
            }
            KeyCode::F(4) => {
                self.switch_screen(Screen::Logs);
                return Ok(());
            }
            KeyCode::F(2) if connected => {
                self.switch_screen(Screen::Project);
                return Ok(());
            }
            KeyCode::F(3) if connected => {
                self.switch_screen(Screen::Chat);
                return Ok(());
            }
            KeyCode::F(5) if connected => {
                return self.dispatch_menu_action(MenuAction::RefreshDocuments).await;
            }
            KeyCode::Char('n') if modifiers.contains(KeyModifiers::CONTROL) && connected => {
                self.new_project_input = Some(Input::default());
                return Ok(());
            }
            KeyCode::Char('u') if modifiers.contains(KeyModifiers::CONTROL) && connected => {
                self.switch_screen(Screen::Upload);
                return Ok(());
            }
            _ => {}
        }

        match self.current_screen {
            Screen::Connect => {
                if let Some(action) = self.connect_screen.handle_input(key, modifiers) {
                    match action {
                        ConnectAction::Connect(url) => self.do_connect(url).await,
                        ConnectAction::Quit => self.should_quit = true,
                    }
                }
            }
            Screen::Project => {
                if let Some(status) = self.project_screen.handle_input(key, modifiers).await? {
                    self.set_status(status);
                }
            }
            Screen::Chat => {
                self.chat_screen.handle_input(key, modifiers).await?;
            }
            Screen::Upload => match key {
                KeyCode::Enter => {
                    let project = self.client_manager.lock().await.project().map(String::from);
                    if let Some(status) = self
                        .upload_screen
                        .start_upload(project, &self.config)
                        .await?
                    {
                        self.set_status(status);
                    }
                }
                KeyCode::Esc => self.switch_screen(Screen::Project),
                _ => self.upload_screen.handle_input(key, modifiers),
            },
            Screen::Help | Screen::Logs => {
                if key == KeyCode::Esc {
                    let back = self.previous_screen;
                    self.switch_screen(back);
                }
            }
        }
        Ok(())
    }

    async fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<()> {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return Ok(());
        }

        if mouse.row == 0 {
            self.menu_renderer.handle_menu_click(mouse.column);
            return Ok(());
        }

        if self.menu_renderer.get_active_menu().is_some() {
            // Dropdowns start on the row below the menu bar.
            if let Some(action) = self.menu_renderer.handle_dropdown_click(mouse.row - 1) {
                return self.dispatch_menu_action(action).await;
            }
            self.menu_renderer.close_menu();
            return Ok(());
        }

        if self.current_screen == Screen::Connect {
            if let Some(ConnectAction::Connect(url)) = self
                .connect_screen
                .handle_mouse_click(mouse.column, mouse.row)
            {
                self.do_connect(url).await;
            }
        }
        Ok(())
    }

    fn ui(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Menu bar
                Constraint::Min(3),    // Content
                Constraint::Length(1), // Status bar
            ])
            .split(f.area());

        self.menu_renderer.render_menu_bar(f, chunks[0]);

        match self.current_screen {
            Screen::Connect => self.connect_screen.render(f, chunks[1]),
            Screen::Project => self.project_screen.render(f, chunks[1]),
            Screen::Chat => self.chat_screen.render(f, chunks[1]),
            Screen::Upload => self.upload_screen.render(f, chunks[1]),
            Screen::Logs => render_logs(f, chunks[1]),
            Screen::Help => render_help(f, chunks[1]),
        }

        self.statusbar_renderer.render_status_bar(f, chunks[2]);

        if let Some(menu_type) = self.menu_renderer.get_active_menu() {
            self.menu_renderer.render_dropdown_menu(f, menu_type);
        }

        if let Some(input) = &self.new_project_input {
            let dialog = centered_rect(40, 3, f.area());
            let body = Paragraph::new(input.value())
                .style(Style::default().fg(Color::Yellow))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::Yellow))
                        .title("New project name"),
                );
            f.render_widget(Clear, dialog);
            f.render_widget(body, dialog);
            f.set_cursor_position((dialog.x + 1 + input.visual_cursor() as u16, dialog.y + 1));
        }
    }
}

fn render_logs(f: &mut Frame, area: Rect) {
    let widget = TuiLoggerWidget::default()
        .block(Block::default().borders(Borders::ALL).title("Logs (Esc to close)"))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Green))
        .style_debug(Style::default().fg(Color::Gray))
        .output_separator(' ')
        .output_timestamp(Some("%H:%M:%S".to_string()));
    f.render_widget(widget, area);
}

fn render_help(f: &mut Frame, area: Rect) {
    let text = "\
QualAI terminal client

Global keys
  F1           Help
  F2           Project screen
  F3           Chat screen
  F4           Logs
  F5           Refresh documents
  Ctrl+N       New project
  Ctrl+U       Upload screen
  Alt+X        Exit

Project screen
  Tab          Switch between documents and editor
  Enter        Open document / expand folder
  r            Rename selected document
  Delete       Delete selected document
  Ctrl+S       Save now (edits autosave after a pause)

Chat screen
  Enter        Send message
  Up/Down      Scroll history

Upload screen
  Enter        Upload the typed file or folder path
  Esc          Back to project";

    let help = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Help (Esc to close)"));
    f.render_widget(help, area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
