use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use fieldsnap_config::Config;
use fieldsnap_engine::host::{FixedGeolocation, GrantedPermissions, HostPlatform, camera_unavailable};
use fieldsnap_engine::{
    Asset, Coordinates, ImagePicker, ImageSource, PickerOptions, PickerResponse, Screen,
    ScreenState, StdFileStore,
};
use futures::executor::block_on;
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use std::{
    cell::{Cell, RefCell},
    env,
    fs::File,
    io::{Stdout, stdout},
    path::PathBuf,
    process,
};

/// Stands in for the gallery dialog: hands back whatever path was typed at the prompt.
/// An empty answer is a cancelled pick.
#[derive(Debug, Default)]
struct PromptPicker {
    pending: RefCell<Option<String>>,
    launches: Cell<u32>,
}

impl PromptPicker {
    fn offer(&self, path: String) {
        *self.pending.borrow_mut() = Some(path);
    }
}

impl ImagePicker for PromptPicker {
    async fn launch(&self, source: ImageSource, _options: &PickerOptions) -> PickerResponse {
        self.launches.set(self.launches.get() + 1);
        if source == ImageSource::Camera {
            return camera_unavailable(source);
        }
        match self.pending.borrow_mut().take() {
            Some(path) if !path.trim().is_empty() => PickerResponse::Picked {
                assets: vec![Asset::from_uri(path.trim())],
            },
            _ => PickerResponse::Cancelled,
        }
    }
}

type CliPlatform = HostPlatform<PromptPicker, GrantedPermissions, FixedGeolocation>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Mode {
    Normal,
    /// Typing a path for the gallery pick
    GalleryPrompt(String),
}

struct App {
    screen: Screen<CliPlatform>,
    mode: Mode,
}

impl App {
    fn new(config: &Config) -> Self {
        let pictures_dir = config.pictures_path.clone().unwrap_or_else(|| {
            dirs::picture_dir()
                .or_else(|| dirs::home_dir().map(|home| home.join("Pictures")))
                .unwrap_or_else(|| PathBuf::from("Pictures"))
        });
        let downloads_dir = config.downloads_path.clone().unwrap_or_else(|| {
            dirs::download_dir()
                .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
                .unwrap_or_else(|| PathBuf::from("Downloads"))
        });
        let fixed_position = config
            .position
            .map(|p| Coordinates::new(p.longitude, p.latitude));

        let platform = HostPlatform::new(
            PromptPicker::default(),
            GrantedPermissions,
            FixedGeolocation::new(fixed_position),
            StdFileStore::new(pictures_dir, downloads_dir),
        );

        Self {
            screen: Screen::new(platform),
            mode: Mode::Normal,
        }
    }

    fn state(&self) -> ScreenState {
        self.screen.state()
    }

    fn open_camera(&self) {
        let outcome = block_on(self.screen.open_camera());
        log::debug!("Camera flow finished: {outcome:?}");
    }

    fn open_gallery(&self, path: String) {
        self.screen.platform().picker.offer(path);
        let outcome = block_on(self.screen.open_gallery());
        log::debug!("Gallery flow finished: {outcome:?}");
    }

    fn get_location(&self) {
        let outcome = block_on(self.screen.get_location());
        log::debug!("Location flow finished: {outcome:?}");
    }

    /// Returns false once the user asks to quit
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match &mut self.mode {
            Mode::Normal => match code {
                KeyCode::Char('q') => return false,
                KeyCode::Char('c') => self.open_camera(),
                KeyCode::Char('g') => self.mode = Mode::GalleryPrompt(String::new()),
                KeyCode::Char('l') => self.get_location(),
                _ => {}
            },
            Mode::GalleryPrompt(input) => match code {
                KeyCode::Char(c) => input.push(c),
                KeyCode::Backspace => {
                    input.pop();
                }
                KeyCode::Esc => {
                    self.mode = Mode::Normal;
                    self.open_gallery(String::new());
                }
                KeyCode::Enter => {
                    let path = std::mem::take(input);
                    self.mode = Mode::Normal;
                    self.open_gallery(path);
                }
                _ => {}
            },
        }
        true
    }
}

fn main() -> Result<()> {
    let log_path = init_logging()?;
    let config_path = Config::config_path();

    let config = match Config::load_or_default() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            eprintln!("Fix or remove {}", config_path.display());
            process::exit(1);
        }
    };
    log::info!("fieldsnap-cli starting, logging to {}", log_path.display());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(&config);

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

/// Send log output to a file in the temp dir so it stays off the TUI
fn init_logging() -> Result<PathBuf> {
    let log_path = env::temp_dir().join("fieldsnap-cli.log");
    let file = File::create(&log_path)?;
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(log_path)
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && !app.handle_key(key.code)
        {
            return Ok(());
        }
    }
}

fn ui(f: &mut Frame, app: &App) {
    let state = app.state();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Length(4),
                Constraint::Length(3),
                Constraint::Min(3),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.area());

    let title = Paragraph::new(Line::from("fieldsnap"))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    let coordinates: Vec<Line> = state
        .coordinate_lines()
        .map(|lines| lines.into_iter().map(Line::from).collect())
        .unwrap_or_default();
    let coordinates = Paragraph::new(coordinates)
        .block(Block::default().borders(Borders::ALL).title("Position"));
    f.render_widget(coordinates, chunks[1]);

    let button_style = Style::default().bg(Color::Blue).fg(Color::White);
    let buttons = Line::from(vec![
        Span::styled(" Open Camera ", button_style),
        Span::raw("  "),
        Span::styled(" Open Gallery ", button_style),
        Span::raw("  "),
        Span::styled(" Get Geo Location ", button_style),
    ]);
    f.render_widget(
        Paragraph::new(vec![buttons]).block(Block::default().borders(Borders::ALL)),
        chunks[2],
    );

    let image = state
        .image
        .map(|image| vec![Line::from(image.to_string())])
        .unwrap_or_default();
    let image = Paragraph::new(image)
        .block(Block::default().borders(Borders::ALL).title("Photo"))
        .wrap(ratatui::widgets::Wrap { trim: true });
    f.render_widget(image, chunks[3]);

    let footer = match &app.mode {
        Mode::Normal => Paragraph::new(Line::from(vec![
            Span::raw("c: Camera | "),
            Span::raw("g: Gallery | "),
            Span::raw("l: Location | "),
            Span::raw("q: Quit"),
        ]))
        .block(Block::default()),
        Mode::GalleryPrompt(input) => Paragraph::new(Line::from(input.as_str())).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Image path (Enter: pick, Esc: cancel)"),
        ),
    };
    f.render_widget(footer, chunks[4]);
}
