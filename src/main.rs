//! flowless - page and follow growing line streams.

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use flowless::buffer::source::{self, SourceArgs, SourceRequest};
use flowless::buffer::{PipeGuard, ReloadPolicy};
use flowless::input::{spawn_input_thread, InputControl};
use flowless::render::TerminalUI;
use flowless::{logging, Application, Config, FlowlessError, Screen, ScreenOptions, ScreenStack};
use std::io::IsTerminal;
use std::path::PathBuf;

fn cli() -> Command {
    Command::new("flowless")
        .version(flowless::VERSION)
        .about("A pager that follows growing files, pipes and commands")
        .long_about(
            "flowless pages a file, standard input, a named pipe, a command's output or a URL. \
             Reading continues in the background while you scroll, search and filter.",
        )
        .arg(
            Arg::new("file")
                .help("File to page; `name:LINE` opens at LINE, URLs are fetched")
                .index(1),
        )
        .arg(
            Arg::new("follow")
                .short('f')
                .help("Start in follow mode")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("line")
                .short('n')
                .value_name("LINE")
                .help("Open scrolled to LINE")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("line-numbers")
                .short('N')
                .help("Show line numbers")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("timestamps")
                .short('T')
                .help("Show the time each line was read")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("command")
                .short('e')
                .value_name("CMD")
                .help("Page the output of CMD"),
        )
        .arg(
            Arg::new("pipe")
                .short('p')
                .long("pipe")
                .help("Read from a named pipe, creating it if needed")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("pipe-path")
                .long("pipe-path")
                .value_name("PATH")
                .help("Location of the named pipe used by --pipe")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("separate")
                .short('s')
                .help("Split tab-separated columns")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("rewatch")
                .short('w')
                .help("Reload the whole file when it changes")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("filter-command")
                .long("filter-command")
                .value_name("CMD")
                .help("Pipe the file through CMD before display"),
        )
}

fn screen_options(matches: &ArgMatches, config: &Config) -> ScreenOptions {
    let mut options = ScreenOptions::from_config(config);
    options.follow = matches.get_flag("follow");
    options.goto_line = matches.get_one::<usize>("line").copied();
    options.show_line_numbers |= matches.get_flag("line-numbers");
    options.show_timestamps = matches.get_flag("timestamps");
    options.separate_columns |= matches.get_flag("separate");
    if matches.get_flag("rewatch") {
        options.reload = ReloadPolicy::Rewatch;
    }
    options
}

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(err) = logging::init() {
        eprintln!("flowless: {err}");
    }
    let config = Config::load().context("loading configuration")?;
    let matches = cli().get_matches();

    let pipe = matches.get_flag("pipe").then(|| {
        matches
            .get_one::<PathBuf>("pipe-path")
            .cloned()
            .unwrap_or_else(|| config.resolved_pipe_path())
    });
    let args = SourceArgs {
        file: matches.get_one::<String>("file").cloned(),
        pipe,
        command: matches.get_one::<String>("command").cloned(),
        filter: matches.get_one::<String>("filter-command").cloned(),
        stdin_is_tty: std::io::stdin().is_terminal(),
    };
    let request = source::resolve(&args);
    log::debug!("source request: {request:?}");

    // Held until exit so the pipe is removed afterwards.
    let _pipe_guard: Option<PipeGuard> = match &request {
        SourceRequest::Pipe(path) => Some(source::ensure_fifo(path)?),
        _ => None,
    };

    let opened = tokio::task::spawn_blocking(move || source::open(&request)).await?;
    let opened = match opened {
        Ok(opened) => opened,
        Err(err @ FlowlessError::FileNotFound { .. }) => {
            eprintln!("flowless: {err}");
            std::process::exit(1);
        }
        Err(err) => return Err(err.into()),
    };

    let options = screen_options(&matches, &config);
    let theme = options.theme.clone();
    let root = Screen::open(opened, options);

    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    let control = InputControl::new();
    let input_thread = spawn_input_thread(tx, control.clone());

    let ui = Box::new(TerminalUI::with_theme(theme)?);
    let mut app = Application::new(ScreenStack::new(root), ui, rx, control);
    let result = app.run().await;

    if input_thread.join().is_err() {
        log::error!("input thread panicked");
    }
    result.map_err(Into::into)
}
