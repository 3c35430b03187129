use std::fs::{self, File};
use std::io::{self, Stdout};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;

use pacman_grid::components::Direction;
use pacman_grid::config::Args;
use pacman_grid::display::TermDisplay;
use pacman_grid::engine::Engine;
use pacman_grid::level::{Level, MazeLevel};

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;
    let levels = load_levels(&args)?;

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;

    let result = run(&args, levels);

    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}

/// Logging goes to a file or nowhere; stderr would tear up the screen.
fn init_logging(args: &Args) -> Result<()> {
    let Some(path) = &args.log_file else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn load_levels(args: &Args) -> Result<Vec<Box<dyn Level>>> {
    if args.maze.is_empty() {
        return Ok(MazeLevel::builtin()
            .into_iter()
            .map(|level| Box::new(level) as Box<dyn Level>)
            .collect());
    }
    let mut levels: Vec<Box<dyn Level>> = Vec::with_capacity(args.maze.len());
    for path in &args.maze {
        let text = fs::read_to_string(path)
            .with_context(|| format!("cannot read maze {}", path.display()))?;
        let name = path
            .file_stem()
            .map_or_else(|| path.display().to_string(), |s| s.to_string_lossy().into_owned());
        let level = MazeLevel::parse(&name, &text)
            .with_context(|| format!("bad maze {}", path.display()))?;
        levels.push(Box::new(level));
    }
    Ok(levels)
}

fn key_direction(code: KeyCode) -> Option<Direction> {
    match code {
        KeyCode::Up | KeyCode::Char('k') => Some(Direction::North),
        KeyCode::Down | KeyCode::Char('j') => Some(Direction::South),
        KeyCode::Left | KeyCode::Char('h') => Some(Direction::West),
        KeyCode::Right | KeyCode::Char('l') => Some(Direction::East),
        _ => None,
    }
}

fn run(args: &Args, levels: Vec<Box<dyn Level>>) -> Result<()> {
    let mut display = TermDisplay::new(io::stdout());
    display.set_terminal_size(terminal::size()?);
    let mut engine: Engine<TermDisplay<Stdout>> = Engine::new(display, levels, args.settings());
    engine.start().context("cannot load the first maze")?;
    let frame_time = args.frame_time();

    loop {
        let frame_start = Instant::now();
        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => {
                        engine.stop();
                        return Ok(());
                    }
                    KeyCode::Enter | KeyCode::Char(' ') if !engine.is_running() => {
                        engine.start().context("cannot load the next maze")?;
                    }
                    code => {
                        if let Some(dir) = key_direction(code) {
                            engine.input(dir);
                        }
                    }
                },
                Event::Resize(w, h) => engine.surface_mut().set_terminal_size((w, h)),
                _ => {}
            }
        }

        engine.poll(Instant::now());
        engine.refresh();

        let title = format!(
            "{} | Score: {} | q to quit",
            engine.level_name().unwrap_or("Pac-Man"),
            engine.map().player().map_or(0, |p| p.score())
        );
        let display = engine.surface_mut();
        display.set_title(&title);
        display.present()?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}
