use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use crossterm::{
    cursor::{Hide, Show as ShowCursor},
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::info;
use skyburst::surface::TermCanvas;
use skyburst::{CancelToken, FramePacer, Host, HostEvent, MonotonicClock, Preset, Show, ShowConfig};
use std::fs::File;
use std::io::{BufWriter, Stdout, stdout};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PresetArg {
    /// Hard clear each frame, plain dots
    Classic,
    /// Afterglow trails, falling hearts, a caption first
    Hearts,
}

impl From<PresetArg> for Preset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Classic => Preset::Classic,
            PresetArg::Hearts => Preset::Hearts,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "skyburst",
    version,
    about = "skyburst - fireworks in your terminal",
    after_help = "Press 'q', ESC, or Ctrl+C to exit; Space pauses"
)]
struct Args {
    /// Built-in look to start from (ignored when --config is given)
    #[arg(long, value_enum, default_value_t = PresetArg::Hearts)]
    preset: PresetArg,

    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Seed for a reproducible show
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    fps: Option<u32>,

    /// Background colour as hex (e.g. --bg-color 1a1b26)
    #[arg(long = "bg-color", value_name = "RRGGBB")]
    bg_color: Option<String>,

    /// Caption typed before the first rocket
    #[arg(long, conflicts_with = "no_intro")]
    intro: Option<String>,

    /// Start the fireworks straight away
    #[arg(long)]
    no_intro: bool,

    /// Write logs here (RUST_LOG sets the filter, default info)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

struct TerminalHost {
    out: BufWriter<Stdout>,
    canvas: TermCanvas,
    pacer: FramePacer,
}

impl Host for TerminalHost {
    type Surface = TermCanvas;

    fn wait_for_frame(&mut self, events: &mut Vec<HostEvent>) -> skyburst::Result<()> {
        let deadline = self.pacer.next_deadline(Instant::now());

        // Drain input until the frame is due
        loop {
            let timeout = deadline.saturating_duration_since(Instant::now());
            if !event::poll(timeout)? {
                break;
            }
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => events.push(HostEvent::Quit),
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        events.push(HostEvent::Quit)
                    }
                    KeyCode::Char(' ') => events.push(HostEvent::TogglePause),
                    _ => {}
                },
                Event::Resize(cols, rows) => {
                    self.canvas.resize(cols as usize, rows as usize);
                    execute!(self.out, Clear(ClearType::All))?;
                    events.push(HostEvent::Resized);
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn surface(&mut self) -> &mut TermCanvas {
        &mut self.canvas
    }

    fn present(&mut self) -> skyburst::Result<()> {
        self.canvas.present(&mut self.out)?;
        Ok(())
    }
}

fn init_logging(path: Option<&Path>) -> Result<()> {
    // stderr belongs to the alternate screen, so no file means no logger
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path).with_context(|| format!("cannot create log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()?;
    Ok(())
}

fn build_config(args: &Args) -> Result<ShowConfig> {
    let mut config = match &args.config {
        Some(path) => ShowConfig::from_file(path).with_context(|| format!("cannot load {}", path.display()))?,
        None => ShowConfig::preset(args.preset.into()),
    };

    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(fps) = args.fps {
        config.fps = fps;
    }
    if let Some(bg) = &args.bg_color {
        config.background = bg.clone();
    }
    if let Some(text) = &args.intro {
        config.intro.text = text.clone();
    }
    if args.no_intro {
        config.intro.text.clear();
    }

    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;
    let config = build_config(&args)?;
    info!("config: {config:?}");

    let mut show = Show::new(&config, MonotonicClock::new())?;

    let (cols, rows) = terminal::size().context("cannot read terminal size")?;
    let mut host = TerminalHost {
        out: BufWriter::with_capacity(1024 * 64, stdout()),
        canvas: TermCanvas::new(cols as usize, rows as usize, config.scale, config.background_rgb()),
        pacer: FramePacer::new(config.fps, Instant::now()),
    };

    terminal::enable_raw_mode()?;
    execute!(host.out, EnterAlternateScreen, Hide, Clear(ClearType::All))?;

    let cancel = CancelToken::new();
    let result = skyburst::run(&mut show, &mut host, &cancel);

    // Restore the terminal before reporting any error from the loop
    execute!(host.out, ShowCursor, LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;

    result.context("show aborted")
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyburst::config::Backdrop;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("skyburst").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn hearts_is_the_default_preset() {
        let config = build_config(&parse(&[])).unwrap();
        assert_eq!(config.intro.text, "Happy Birthday!");
        assert_eq!(config.backdrop, Backdrop::Trail { alpha: 0.08 });
    }

    #[test]
    fn flags_override_preset() {
        let config = build_config(&parse(&[
            "--preset", "classic", "--seed", "9", "--fps", "30", "--bg-color", "1a1b26", "--intro", "hi",
        ]))
        .unwrap();
        assert_eq!(config.backdrop, Backdrop::Clear);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.fps, 30);
        assert_eq!(config.background_rgb(), (0x1a, 0x1b, 0x26));
        assert_eq!(config.intro.text, "hi");
    }

    #[test]
    fn no_intro_and_bad_colour() {
        let config = build_config(&parse(&["--no-intro"])).unwrap();
        assert!(config.intro.text.is_empty());

        assert!(build_config(&parse(&["--bg-color", "xyz"])).is_err());
        assert!(Args::try_parse_from(["skyburst", "--intro", "a", "--no-intro"]).is_err());
    }
}
