//! Screens: one navigable view over one line store.
//!
//! A screen turns each input event into a [`Transition`] and, on every poll tick, reaps
//! finished read cycles, checks the backing file for changes and advances follow mode.

pub mod stack;

pub use stack::{ScreenStack, StackStatus};

use crate::buffer::{
    spawn_ingest, ChildProcess, FileWatch, IngestHandle, IngestOptions, Line, LineStore,
    OpenedSource, ReaderKind, ReloadPolicy, TailEvent,
};
use crate::config::{Config, DEFAULT_BUFFER_LINES};
use crate::error::Result;
use crate::follow::{FollowMode, FollowOutcome};
use crate::help::help_text;
use crate::input::{command_for, Command, InputEvent, Key, Prompt, PromptKind, PromptOutcome};
use crate::input::ScrollDirection;
use crate::render::{compose_status, ColorTheme, Renderer, Spinner, StatusInfo, UIRenderer, ViewState};
use crate::search::{scan_backward, scan_forward, ScanResult, SearchOptions, SearchPattern};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// What the screen stack should do after an event.
#[derive(Debug)]
pub enum Transition {
    Continue,
    Push(Box<Screen>),
    Pop,
    /// Leave the program regardless of how many screens are open.
    Exit,
    External(ExternalCommand),
}

/// Programs that take over the terminal until they exit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExternalCommand {
    Editor { path: PathBuf, line: usize },
    Shell,
}

#[derive(Debug, Clone)]
pub struct ScreenOptions {
    pub buffer_lines: usize,
    pub follow: bool,
    /// 1-based line to open at.
    pub goto_line: Option<usize>,
    pub show_line_numbers: bool,
    /// Lines are stamped with their capture time only while this is set.
    pub show_timestamps: bool,
    pub separate_columns: bool,
    pub reload: ReloadPolicy,
    pub theme: ColorTheme,
    pub follow_poll: Duration,
    pub idle_poll: Duration,
}

impl Default for ScreenOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl ScreenOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            buffer_lines: config.buffer_lines,
            follow: false,
            goto_line: None,
            show_line_numbers: config.line_numbers,
            show_timestamps: false,
            separate_columns: config.separate_columns,
            reload: ReloadPolicy::Tail,
            theme: ColorTheme::from(config.theme),
            follow_poll: config.follow_poll(),
            idle_poll: config.idle_poll(),
        }
    }

    /// Options for screens spawned from this one (filter, help, headers).
    fn for_child(&self) -> Self {
        Self {
            follow: false,
            goto_line: None,
            ..self.clone()
        }
    }
}

pub struct Screen {
    name: Option<String>,
    store: Arc<LineStore>,
    view: ViewState,
    renderer: Renderer,
    follow: FollowMode,
    /// Unlimited loading as toggled with `L`; restored when a follow mode ends.
    user_unlimited: bool,
    ingest: Option<IngestHandle>,
    watch: Option<FileWatch>,
    process: Option<ChildProcess>,
    headers: Option<Vec<(String, String)>>,
    prompt: Option<Prompt>,
    /// Shown instead of the status until the next key.
    message: Option<String>,
    search_options: SearchOptions,
    mouse: bool,
    spinner: Spinner,
    options: ScreenOptions,
}

impl std::fmt::Debug for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Screen")
            .field("name", &self.name)
            .field("lines", &self.store.len())
            .field("view", &self.view)
            .field("follow", &self.follow)
            .finish_non_exhaustive()
    }
}

impl Screen {
    fn with_store(store: Arc<LineStore>, name: Option<String>, options: ScreenOptions) -> Self {
        let view = ViewState {
            show_line_numbers: options.show_line_numbers,
            show_timestamps: options.show_timestamps,
            separate_columns: options.separate_columns,
            ..ViewState::new(80, 24)
        };
        Self {
            name,
            store,
            view,
            renderer: Renderer::new(options.theme.clone()),
            follow: FollowMode::Off,
            user_unlimited: false,
            ingest: None,
            watch: None,
            process: None,
            headers: None,
            prompt: None,
            message: None,
            search_options: SearchOptions::default(),
            mouse: false,
            spinner: Spinner::default(),
            options,
        }
    }

    /// Start paging `source`; ingestion begins immediately.
    pub fn open(source: OpenedSource, options: ScreenOptions) -> Self {
        let capacity = match options.buffer_lines {
            0 => DEFAULT_BUFFER_LINES,
            n => n,
        };
        let store = Arc::new(LineStore::new(capacity));
        let goto_line = options.goto_line.or(source.goto_line);
        let follow = options.follow;

        let mut screen = Self::with_store(Arc::clone(&store), source.name, options);
        screen.watch = source
            .watch
            .map(|target| FileWatch::new(target, screen.options.reload));
        screen.process = source.process;
        screen.headers = source.headers;
        let ingest_options = screen.ingest_options();
        screen.ingest = Some(spawn_ingest(
            store,
            source.reader,
            source.kind,
            0,
            ingest_options,
        ));

        if follow {
            screen.start_follow(FollowMode::Following);
        }
        if let Some(line) = goto_line {
            // Settled by the first tick, once the view has its real size.
            let target = line.saturating_sub(1);
            screen.view.goto_target = Some(target);
            screen.start_follow(FollowMode::Going(target));
        }
        screen
    }

    /// Screen over fixed lines that keep their numbering.
    pub fn from_lines(lines: Vec<Line>, name: Option<String>, options: ScreenOptions) -> Self {
        Self::with_store(Arc::new(LineStore::from_lines(lines)), name, options)
    }

    pub fn from_text(text: &str, name: Option<String>, options: ScreenOptions) -> Self {
        Self::with_store(Arc::new(LineStore::from_text(text)), name, options)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn store(&self) -> &Arc<LineStore> {
        &self.store
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn follow_mode(&self) -> FollowMode {
        self.follow
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn prompt(&self) -> Option<&Prompt> {
        self.prompt.as_ref()
    }

    pub fn mouse_enabled(&self) -> bool {
        self.mouse
    }

    pub fn is_loading(&self) -> bool {
        self.store.is_loading()
    }

    /// How long the UI loop may wait for input before the next tick.
    pub fn poll_interval(&self) -> Duration {
        if self.follow.is_active() {
            self.options.follow_poll
        } else {
            self.options.idle_poll
        }
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.view.resize(cols, rows);
        self.publish_position();
    }

    /// The backlog is measured from the bottom of the window, so any capacity
    /// leaves room to fill the screen.
    fn publish_position(&self) {
        self.store.set_consumer_y(self.view.y + self.view.content_rows());
    }

    /// Force the next paint to redraw everything.
    pub fn invalidate(&mut self) {
        self.renderer.invalidate();
    }

    /// Stop ingestion and release a producer waiting for room.
    pub fn close(&self) {
        self.store.close();
    }

    pub fn paint(&mut self, ui: &mut dyn UIRenderer) -> Result<()> {
        self.renderer.paint(ui, &self.store, &self.view)?;
        let status = self.status_line();
        self.renderer.paint_status(ui, status)?;
        Ok(())
    }

    fn status_line(&self) -> String {
        if let Some(prompt) = &self.prompt {
            return prompt.line();
        }
        if let Some(message) = &self.message {
            return message.clone();
        }
        let loading = self.store.is_loading();
        let text = StatusInfo {
            name: self.name.as_deref(),
            top: self.view.y,
            len: self.store.len(),
            x: self.view.x,
            loading,
            unlimited: self.store.is_unlimited(),
            following: self.follow == FollowMode::Following,
            search: self.view.search.as_ref().map(|p| p.text()),
            mouse: self.mouse,
        }
        .text();
        compose_status(&text, self.view.cols, loading.then(|| self.spinner.glyph()))
    }

    /// Called when the input wait timed out.
    pub fn idle(&mut self) {
        if self.store.is_loading() {
            self.spinner.advance();
        }
    }

    /// Poll-tick work: finish read cycles, detect file changes, advance follow mode.
    pub fn tick(&mut self) {
        self.reap_ingest();
        if self.ingest.is_none() {
            self.check_source();
        }
        self.step_follow();
        self.publish_position();
    }

    fn reap_ingest(&mut self) {
        if !self.ingest.as_ref().is_some_and(IngestHandle::is_finished) {
            return;
        }
        let Some(handle) = self.ingest.take() else {
            return;
        };
        let report = handle.join();
        log::debug!(
            "read cycle finished: {} lines, offset {}",
            report.lines,
            report.offset
        );
        if let Some(err) = &report.error {
            log::warn!("{}: read error: {err}", self.name.as_deref().unwrap_or("input"));
        }
        if let Some(watch) = self.watch.as_mut() {
            watch.record_offset(report.offset);
        }
    }

    fn check_source(&mut self) {
        let Some(watch) = self.watch.as_mut() else {
            return;
        };
        let path = watch.path().to_path_buf();
        let event = match watch.check() {
            Ok(event) => event,
            Err(err) => {
                self.message = Some(err.to_string());
                return;
            }
        };

        match event {
            TailEvent::Unchanged => {}
            TailEvent::Appended { reader, offset } => {
                log::debug!("{} grew, resuming at {offset}", path.display());
                self.start_ingest(reader, ReaderKind::File(path), offset);
            }
            TailEvent::Truncated { reader } => {
                self.message = Some(format!("{} is truncated. Rewinded.", path.display()));
                self.store.reset_numbering();
                self.start_ingest(reader, ReaderKind::File(path), 0);
            }
            TailEvent::Reloaded { reader, process } => {
                log::debug!("{} changed, reloading", path.display());
                let kind = if process.is_some() {
                    ReaderKind::Stream
                } else {
                    ReaderKind::File(path)
                };
                self.store.close();
                self.store = Arc::new(LineStore::new(self.store.capacity()));
                self.store
                    .set_unlimited(self.user_unlimited || self.follow.wants_unlimited());
                self.process = process;
                self.view.y = 0;
                self.renderer.invalidate();
                self.start_ingest(reader, kind, 0);
            }
        }
    }

    /// Capture time is recorded once timestamps have been asked for.
    fn ingest_options(&self) -> IngestOptions {
        IngestOptions {
            timestamps: self.options.show_timestamps,
        }
    }

    fn start_ingest(&mut self, reader: Box<dyn std::io::Read + Send>, kind: ReaderKind, offset: u64) {
        self.ingest = Some(spawn_ingest(
            Arc::clone(&self.store),
            reader,
            kind,
            offset,
            self.ingest_options(),
        ));
    }

    fn step_follow(&mut self) {
        if !self.follow.is_active() {
            return;
        }
        let step = self.follow.step(&self.store, &self.view);
        if let Some(y) = step.scroll_to {
            self.view.scroll_to(y, self.store.len());
        }
        if let Some(outcome) = step.outcome {
            log::debug!("follow settled: {outcome:?}");
            match outcome {
                // Following ends with buffering back to its bounded default.
                FollowOutcome::CaughtUp => self.user_unlimited = false,
                FollowOutcome::NotFound => self.report_not_found(),
                _ => {}
            }
            self.store.set_unlimited(self.user_unlimited);
        }
    }

    fn start_follow(&mut self, mode: FollowMode) {
        self.follow = mode;
        if mode.wants_unlimited() {
            self.store.set_unlimited(true);
        }
    }

    fn stop_follow(&mut self) {
        if self.follow.is_active() {
            self.follow = FollowMode::Off;
            self.store.set_unlimited(self.user_unlimited);
        }
    }

    pub fn handle_event(&mut self, event: InputEvent) -> Transition {
        let transition = match event {
            InputEvent::Resize { cols, rows } => {
                self.resize(cols, rows);
                self.renderer.invalidate();
                Transition::Continue
            }
            InputEvent::Scroll { direction, lines } => {
                self.stop_follow();
                match direction {
                    ScrollDirection::Up => self.view.scroll_up(lines),
                    ScrollDirection::Down => self.view.scroll_down(lines, self.store.len()),
                }
                Transition::Continue
            }
            InputEvent::Click { column, row } => {
                match self
                    .view
                    .line_at_row(row, self.store.len())
                    .and_then(|index| self.store.get(index))
                {
                    Some(line) => log::info!("click {column},{row}: {:?}", line.text),
                    None => log::info!("click {column},{row}: no line"),
                }
                Transition::Continue
            }
            InputEvent::Key(key) => self.handle_key(key),
        };
        self.publish_position();
        transition
    }

    fn handle_key(&mut self, key: Key) -> Transition {
        self.message = None;
        self.stop_follow();

        if let Some(mut prompt) = self.prompt.take() {
            match prompt.handle_key(&key) {
                PromptOutcome::Editing => self.prompt = Some(prompt),
                PromptOutcome::Cancelled => log::debug!("prompt cancelled by {key}"),
                PromptOutcome::Submitted(text) => self.submit_prompt(prompt.kind().clone(), text),
            }
            return Transition::Continue;
        }

        self.run_command(command_for(&key))
    }

    fn run_command(&mut self, command: Command) -> Transition {
        let len = self.store.len();
        match command {
            Command::Quit => return Transition::Pop,
            Command::Exit => return Transition::Exit,
            Command::LineUp => self.view.scroll_up(1),
            Command::LineDown => self.view.scroll_down(1, len),
            Command::ColumnLeft => self.view.scroll_left(1),
            Command::ColumnRight => self.view.scroll_right(1),
            Command::Top => {
                self.view.y = 0;
                self.view.x = 0;
            }
            Command::Bottom => {
                self.view.y = self.view.y_max(len);
                self.view.x = 0;
            }
            Command::PageDown => self.view.scroll_down(self.view.content_rows(), len),
            Command::PageUp => self.view.scroll_up(self.view.content_rows()),
            Command::Goto(digit) => self.prompt = Some(Prompt::goto(digit)),
            Command::Follow => self.start_follow(FollowMode::Following),
            Command::ToggleUnlimited => {
                self.user_unlimited = !self.user_unlimited;
                self.store.set_unlimited(self.user_unlimited);
            }
            Command::Search => self.prompt = Some(Prompt::search(self.search_options)),
            Command::SearchNext => {
                if self.view.search.is_some() {
                    self.search_forward(self.view.y + 1);
                }
            }
            Command::SearchPrev => {
                if self.view.search.is_some() {
                    self.search_backward();
                }
            }
            Command::Filter => {
                if let Some(screen) = self.filter_screen() {
                    return Transition::Push(Box::new(screen));
                }
            }
            Command::Save => self.prompt = Some(Prompt::save_file()),
            Command::Edit => match &self.watch {
                Some(watch) => {
                    return Transition::External(ExternalCommand::Editor {
                        path: watch.path().to_path_buf(),
                        line: self.view.y + 1,
                    })
                }
                None => self.message = Some("no file to edit".to_string()),
            },
            Command::ToggleMouse => self.mouse = !self.mouse,
            Command::ToggleLineNumbers => {
                self.view.show_line_numbers = !self.view.show_line_numbers
            }
            Command::ToggleTimestamps => {
                self.view.show_timestamps = !self.view.show_timestamps;
                // Lines read from now on carry their capture time.
                self.options.show_timestamps |= self.view.show_timestamps;
            }
            Command::ToggleColumns => self.view.separate_columns = !self.view.separate_columns,
            Command::Shell => return Transition::External(ExternalCommand::Shell),
            Command::SendInput => {
                if self.process.as_ref().is_some_and(ChildProcess::accepts_input) {
                    self.prompt = Some(Prompt::send_input());
                } else {
                    self.message = Some("no process to send input to".to_string());
                }
            }
            Command::Headers => match &self.headers {
                Some(headers) => {
                    let lines = headers
                        .iter()
                        .enumerate()
                        .map(|(idx, (name, value))| {
                            Line::new(format!("{name}: {value}"), idx as u64 + 1)
                        })
                        .collect();
                    return Transition::Push(Box::new(Screen::from_lines(
                        lines,
                        Some("HEADERS".to_string()),
                        self.options.for_child(),
                    )));
                }
                None => self.message = Some("no headers".to_string()),
            },
            Command::Help => {
                return Transition::Push(Box::new(Screen::from_text(
                    &help_text(),
                    Some("HELP".to_string()),
                    self.options.for_child(),
                )))
            }
            Command::Unrecognized(key) => {
                log::debug!("unknown key {key:?}");
                self.message = Some(format!("unknown: {key}"));
            }
        }
        Transition::Continue
    }

    fn submit_prompt(&mut self, kind: PromptKind, text: String) {
        match kind {
            PromptKind::Goto => {
                if let Ok(line) = text.parse::<usize>() {
                    self.goto_line(line);
                }
            }
            PromptKind::Search(options) => self.apply_search(&text, options),
            PromptKind::SaveFile => {
                if text.is_empty() {
                    return;
                }
                let path = PathBuf::from(text);
                if path.exists() {
                    self.prompt = Some(Prompt::confirm_overwrite(path));
                } else {
                    self.save(&path);
                }
            }
            PromptKind::ConfirmOverwrite(path) => {
                if text == "y" {
                    self.save(&path);
                }
            }
            PromptKind::SendInput => {
                if let Some(process) = self.process.as_mut() {
                    if let Err(err) = process.send_line(&text) {
                        self.message = Some(format!("send failed: {err}"));
                    }
                }
            }
        }
    }

    /// Scroll to 1-based `line`, waiting for it when it has not been read yet.
    pub fn goto_line(&mut self, line: usize) {
        let target = line.saturating_sub(1);
        self.view.goto_target = Some(target);
        let eof = self.store.is_eof();
        let len = self.store.len();
        if target < len || eof {
            self.view.scroll_to(target, len);
        } else {
            self.start_follow(FollowMode::Going(target));
        }
    }

    fn apply_search(&mut self, text: &str, options: SearchOptions) {
        self.search_options = options;
        if text.is_empty() {
            self.view.search = None;
            return;
        }
        match SearchPattern::compile(text, options) {
            Ok(pattern) => {
                self.view.search = Some(pattern);
                self.search_forward(self.view.y);
            }
            Err(err) => self.message = Some(err.to_string()),
        }
    }

    fn search_forward(&mut self, start: usize) {
        let Some(pattern) = &self.view.search else {
            return;
        };
        let eof = self.store.is_eof();
        match scan_forward(&self.store, pattern, start) {
            ScanResult::Found(index) => self.view.scroll_to(index, self.store.len()),
            ScanResult::Exhausted { len } if !eof => {
                self.start_follow(FollowMode::Searching { from: len })
            }
            ScanResult::Exhausted { .. } => self.report_not_found(),
        }
    }

    fn search_backward(&mut self) {
        let found = match (&self.view.search, self.view.y.checked_sub(1)) {
            (Some(pattern), Some(start)) => scan_backward(&self.store, pattern, start),
            _ => None,
        };
        match found {
            Some(index) => self.view.scroll_to(index, self.store.len()),
            None => self.report_not_found(),
        }
    }

    fn report_not_found(&mut self) {
        let term = self.view.search.as_ref().map(|p| p.text()).unwrap_or("");
        self.message = Some(format!("not found: [{term}]"));
    }

    fn filter_screen(&self) -> Option<Screen> {
        let pattern = self.view.search.as_ref()?;
        let title = format!("*filter mode [{}]*", pattern.text());
        if self.name.as_deref() == Some(title.as_str()) {
            return None;
        }
        let lines: Vec<Line> = self
            .store
            .snapshot()
            .iter()
            .filter(|line| pattern.is_match(&line.text))
            .map(|line| Line::clone(line))
            .collect();
        let mut screen = Screen::from_lines(lines, Some(title), self.options.for_child());
        screen.view.search = Some(pattern.clone());
        screen.search_options = self.search_options;
        Some(screen)
    }

    fn save(&mut self, path: &std::path::Path) {
        let text = self
            .store
            .snapshot()
            .iter()
            .map(|line| line.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        match std::fs::write(path, text) {
            Ok(()) => log::info!("saved {} lines to {}", self.store.len(), path.display()),
            Err(err) => {
                log::warn!("save to {} failed: {err}", path.display());
                self.message = Some(format!("cannot save {}: {err}", path.display()));
            }
        }
    }
}

impl Drop for Screen {
    fn drop(&mut self) {
        self.store.close();
    }
}
