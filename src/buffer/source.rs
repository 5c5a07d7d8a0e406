//! Opening the input stream a screen reads from.
//!
//! Resolution order: named pipe, explicit command, help (interactive terminal without
//! arguments), piped stdin, then a named file. A missing file is retried as `name:LINE`
//! and then as a remote resource before giving up.

use crate::buffer::ingest::ReaderKind;
use crate::error::{FlowlessError, Result};
use crate::help;
use std::fs::File;
use std::io::{self, Cursor, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

/// What the user asked to page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceRequest {
    Pipe(PathBuf),
    Command(String),
    Help,
    Stdin,
    File {
        name: String,
        filter: Option<String>,
    },
}

/// Inputs to source resolution, gathered from the command line and the environment.
#[derive(Debug, Clone, Default)]
pub struct SourceArgs {
    pub file: Option<String>,
    pub pipe: Option<PathBuf>,
    pub command: Option<String>,
    pub filter: Option<String>,
    pub stdin_is_tty: bool,
}

pub fn resolve(args: &SourceArgs) -> SourceRequest {
    if let Some(path) = &args.pipe {
        return SourceRequest::Pipe(path.clone());
    }
    if let Some(command) = &args.command {
        return SourceRequest::Command(command.clone());
    }
    match &args.file {
        None if args.stdin_is_tty => SourceRequest::Help,
        None => SourceRequest::Stdin,
        Some(name) => SourceRequest::File {
            name: name.clone(),
            filter: args.filter.clone(),
        },
    }
}

/// Where tail detection should look for changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchTarget {
    pub path: PathBuf,
    pub filter: Option<String>,
}

/// An opened input, ready to hand to the ingestion pipeline.
pub struct OpenedSource {
    pub name: Option<String>,
    pub reader: Box<dyn Read + Send>,
    pub kind: ReaderKind,
    pub watch: Option<WatchTarget>,
    pub process: Option<ChildProcess>,
    pub headers: Option<Vec<(String, String)>>,
    /// 1-based line requested through the `name:LINE` shorthand.
    pub goto_line: Option<usize>,
}

impl std::fmt::Debug for OpenedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenedSource")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("watch", &self.watch)
            .field("goto_line", &self.goto_line)
            .finish_non_exhaustive()
    }
}

impl OpenedSource {
    fn stream(name: Option<String>, reader: Box<dyn Read + Send>) -> Self {
        Self {
            name,
            reader,
            kind: ReaderKind::Stream,
            watch: None,
            process: None,
            headers: None,
            goto_line: None,
        }
    }
}

pub fn open(request: &SourceRequest) -> Result<OpenedSource> {
    match request {
        SourceRequest::Pipe(path) => Ok(OpenedSource {
            kind: ReaderKind::Fifo(path.clone()),
            ..OpenedSource::stream(
                Some(format!("pipe:{}", path.display())),
                Box::new(LazyFile::new(path.clone())),
            )
        }),
        SourceRequest::Command(command) => {
            let mut process = ChildProcess::spawn(command, Stdio::piped())?;
            let stdout = process.take_stdout(command)?;
            Ok(OpenedSource {
                process: Some(process),
                ..OpenedSource::stream(Some(command.clone()), Box::new(stdout))
            })
        }
        SourceRequest::Help => Ok(OpenedSource::stream(
            Some("HELP".to_string()),
            Box::new(Cursor::new(help::help_text().into_bytes())),
        )),
        SourceRequest::Stdin => Ok(OpenedSource::stream(None, Box::new(io::stdin()))),
        SourceRequest::File { name, filter } => open_named(name, filter.as_deref()),
    }
}

fn open_named(name: &str, filter: Option<&str>) -> Result<OpenedSource> {
    let path = Path::new(name);
    if path.exists() {
        return open_path(path, filter);
    }

    if let Some((base, line)) = split_line_suffix(name) {
        if Path::new(base).exists() {
            let mut source = open_path(Path::new(base), filter)?;
            source.goto_line = Some(line);
            return Ok(source);
        }
    }

    if is_remote(name) {
        return open_remote(name);
    }

    Err(FlowlessError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn open_path(path: &Path, filter: Option<&str>) -> Result<OpenedSource> {
    let name = Some(path.display().to_string());

    if is_fifo(path) {
        return Ok(OpenedSource {
            kind: ReaderKind::Fifo(path.to_path_buf()),
            ..OpenedSource::stream(name, Box::new(LazyFile::new(path.to_path_buf())))
        });
    }

    let file = open_file(path)?;
    if let Some(command) = filter {
        let mut process = ChildProcess::spawn(command, Stdio::from(file))?;
        let stdout = process.take_stdout(command)?;
        return Ok(OpenedSource {
            watch: Some(WatchTarget {
                path: path.to_path_buf(),
                filter: Some(command.to_string()),
            }),
            process: Some(process),
            ..OpenedSource::stream(name, Box::new(stdout))
        });
    }

    Ok(OpenedSource {
        kind: ReaderKind::File(path.to_path_buf()),
        watch: Some(WatchTarget {
            path: path.to_path_buf(),
            filter: None,
        }),
        ..OpenedSource::stream(name, Box::new(file))
    })
}

pub(crate) fn open_file(path: &Path) -> Result<File> {
    File::open(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => FlowlessError::FileNotFound {
            path: path.to_path_buf(),
        },
        io::ErrorKind::PermissionDenied => FlowlessError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => FlowlessError::file_error(format!("cannot open {}", path.display()), err),
    })
}

fn open_remote(url: &str) -> Result<OpenedSource> {
    log::debug!("fetching remote source {url}");
    let response =
        reqwest::blocking::get(url).map_err(|e| FlowlessError::remote(url, e.to_string()))?;

    let mut headers = vec![("Status".to_string(), response.status().to_string())];
    headers.extend(response.headers().iter().map(|(key, value)| {
        (
            key.as_str().to_string(),
            value.to_str().unwrap_or("<binary>").to_string(),
        )
    }));

    Ok(OpenedSource {
        headers: Some(headers),
        ..OpenedSource::stream(Some(url.to_string()), Box::new(response))
    })
}

/// Split `file.log:120` into (`file.log`, 120).
pub fn split_line_suffix(name: &str) -> Option<(&str, usize)> {
    let (base, line) = name.rsplit_once(':')?;
    if base.is_empty() || line.is_empty() || !line.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    line.parse().ok().map(|line| (base, line))
}

fn is_remote(name: &str) -> bool {
    name.split_once("://")
        .map(|(scheme, _)| !scheme.is_empty() && scheme.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or(false)
}

#[cfg(unix)]
fn is_fifo(path: &Path) -> bool {
    use std::os::unix::fs::FileTypeExt;
    std::fs::metadata(path)
        .map(|meta| meta.file_type().is_fifo())
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_fifo(_path: &Path) -> bool {
    false
}

/// Opens its path on first read, so a named pipe can wait for a writer on the
/// ingestion thread instead of blocking startup.
struct LazyFile {
    path: PathBuf,
    file: Option<File>,
}

impl LazyFile {
    fn new(path: PathBuf) -> Self {
        Self { path, file: None }
    }
}

impl Read for LazyFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.file.is_none() {
            self.file = Some(File::open(&self.path)?);
        }
        match self.file.as_mut() {
            Some(file) => file.read(buf),
            None => Ok(0),
        }
    }
}

/// A `sh -c` subprocess feeding a screen. Killed when dropped.
#[derive(Debug)]
pub struct ChildProcess {
    child: Child,
    stdin: Option<ChildStdin>,
}

impl ChildProcess {
    pub fn spawn(command: &str, stdin: Stdio) -> Result<Self> {
        let mut child = Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdin(stdin)
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| FlowlessError::process(command, e))?;
        let stdin = child.stdin.take();
        log::debug!("spawned `{command}` as pid {}", child.id());
        Ok(Self { child, stdin })
    }

    pub(crate) fn take_stdout(&mut self, command: &str) -> Result<std::process::ChildStdout> {
        self.child.stdout.take().ok_or_else(|| {
            FlowlessError::process(
                command,
                io::Error::new(io::ErrorKind::BrokenPipe, "stdout not captured"),
            )
        })
    }

    pub fn accepts_input(&self) -> bool {
        self.stdin.is_some()
    }

    /// Forward one user-typed line to the process.
    pub fn send_line(&mut self, line: &str) -> io::Result<()> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "no input attached"))?;
        stdin.write_all(line.as_bytes())?;
        stdin.write_all(b"\n")?;
        stdin.flush()
    }
}

impl Drop for ChildProcess {
    fn drop(&mut self) {
        self.stdin.take();
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Named pipe created for `--pipe`; removed again when dropped.
#[derive(Debug)]
pub struct PipeGuard {
    path: PathBuf,
}

impl PipeGuard {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PipeGuard {
    fn drop(&mut self) {
        if let Err(err) = std::fs::remove_file(&self.path) {
            log::warn!("could not remove {}: {err}", self.path.display());
        }
    }
}

/// Create the named pipe at `path` unless one is already there.
#[cfg(unix)]
pub fn ensure_fifo(path: &Path) -> Result<PipeGuard> {
    use nix::sys::stat::Mode;

    if path.exists() {
        if !is_fifo(path) {
            return Err(FlowlessError::source(format!(
                "{} exists and is not a named pipe",
                path.display()
            )));
        }
    } else {
        nix::unistd::mkfifo(path, Mode::S_IRUSR | Mode::S_IWUSR).map_err(|errno| {
            FlowlessError::file_error(
                format!("cannot create named pipe {}", path.display()),
                io::Error::from(errno),
            )
        })?;
    }
    Ok(PipeGuard {
        path: path.to_path_buf(),
    })
}

#[cfg(not(unix))]
pub fn ensure_fifo(path: &Path) -> Result<PipeGuard> {
    Err(FlowlessError::source(format!(
        "named pipes are not supported here: {}",
        path.display()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_all(source: &mut OpenedSource) -> String {
        let mut text = String::new();
        source.reader.read_to_string(&mut text).unwrap();
        text
    }

    #[test]
    fn resolution_prefers_pipe_then_command() {
        let mut args = SourceArgs {
            file: Some("a.log".into()),
            pipe: Some(PathBuf::from("/tmp/p")),
            command: Some("ls".into()),
            ..SourceArgs::default()
        };
        assert_eq!(resolve(&args), SourceRequest::Pipe(PathBuf::from("/tmp/p")));

        args.pipe = None;
        assert_eq!(resolve(&args), SourceRequest::Command("ls".into()));

        args.command = None;
        assert_eq!(
            resolve(&args),
            SourceRequest::File {
                name: "a.log".into(),
                filter: None
            }
        );
    }

    #[test]
    fn resolution_without_file_depends_on_tty() {
        let tty = SourceArgs {
            stdin_is_tty: true,
            ..SourceArgs::default()
        };
        assert_eq!(resolve(&tty), SourceRequest::Help);
        assert_eq!(resolve(&SourceArgs::default()), SourceRequest::Stdin);
    }

    #[test]
    fn line_suffix_parsing() {
        assert_eq!(split_line_suffix("app.log:42"), Some(("app.log", 42)));
        assert_eq!(split_line_suffix("a:b:7"), Some(("a:b", 7)));
        assert_eq!(split_line_suffix("app.log"), None);
        assert_eq!(split_line_suffix("app.log:"), None);
        assert_eq!(split_line_suffix(":12"), None);
        assert_eq!(split_line_suffix("http://host"), None);
    }

    #[test]
    fn remote_detection() {
        assert!(is_remote("https://example.com/log"));
        assert!(!is_remote("plain.log"));
        assert!(!is_remote("://broken"));
    }

    #[test]
    fn missing_file_is_reported() {
        let err = open(&SourceRequest::File {
            name: "/definitely/not/here.log".into(),
            filter: None,
        })
        .unwrap_err();
        assert!(matches!(err, FlowlessError::FileNotFound { .. }));
    }

    #[test]
    fn file_with_line_suffix_opens_base_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, "a\nb\n").unwrap();

        let name = format!("{}:2", path.display());
        let mut source = open(&SourceRequest::File { name, filter: None }).unwrap();
        assert_eq!(source.goto_line, Some(2));
        assert_eq!(source.kind, ReaderKind::File(path.clone()));
        assert_eq!(source.watch.as_ref().unwrap().path, path);
        assert_eq!(read_all(&mut source), "a\nb\n");
    }

    #[test]
    fn help_source_is_named_help() {
        let mut source = open(&SourceRequest::Help).unwrap();
        assert_eq!(source.name.as_deref(), Some("HELP"));
        assert!(!read_all(&mut source).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn filter_command_transforms_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, "quiet\n").unwrap();

        let mut source = open(&SourceRequest::File {
            name: path.display().to_string(),
            filter: Some("tr a-z A-Z".into()),
        })
        .unwrap();
        assert_eq!(read_all(&mut source), "QUIET\n");
        assert_eq!(source.kind, ReaderKind::Stream);
        assert_eq!(
            source.watch.as_ref().unwrap().filter.as_deref(),
            Some("tr a-z A-Z")
        );
    }

    #[cfg(unix)]
    #[test]
    fn command_source_accepts_forwarded_input() {
        let mut source = open(&SourceRequest::Command("head -n 1".into())).unwrap();
        let process = source.process.as_mut().unwrap();
        assert!(process.accepts_input());
        process.send_line("echoed").unwrap();
        assert_eq!(read_all(&mut source), "echoed\n");
    }

    #[cfg(unix)]
    #[test]
    fn fifo_guard_creates_and_removes_pipe() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flowless.pipe");
        {
            let guard = ensure_fifo(&path).unwrap();
            assert!(is_fifo(guard.path()));
            let reused = ensure_fifo(&path).unwrap();
            assert_eq!(reused.path(), guard.path());
        }
        assert!(!path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn regular_file_cannot_serve_as_pipe() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain");
        std::fs::write(&path, "").unwrap();
        assert!(matches!(
            ensure_fifo(&path),
            Err(FlowlessError::SourceError { .. })
        ));
    }
}
