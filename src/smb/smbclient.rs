//! Session implementation backed by the Samba `smbclient` binary
//!
//! Every operation runs one `smbclient -c <command>` process against the
//! share, so a "session" here is the validated parameter set plus the
//! resolved binary. Passwords travel through the `PASSWD` environment
//! variable, never on the command line.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use tokio::io::AsyncRead;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::error::SmbError;
use super::params::{AuthMode, ConnectionParameters, DEFAULT_SMB_PORT};
use super::path_utils::{split_parent, to_wire_path};
use super::session::{copy_in_chunks, RemoteEntry, SessionConnector, ShareSession};

/// Fallback locations searched when `smbclient` is not on `PATH`
const COMMON_BINARY_PATHS: &[&str] = &[
    "/usr/bin/smbclient",
    "/bin/smbclient",
    "/usr/local/bin/smbclient",
];

/// Environment variable overriding the binary location
pub const SMBCLIENT_PATH_ENV: &str = "SMBCLIENT_PATH";

static NT_STATUS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"NT_STATUS_[A-Z0-9_]+").expect("static regex"));

// "  name    A    1024  Mon Jan  1 12:34:56 2024"
// Anchored on the fixed-width date at the end so names may contain spaces,
// letters and digits.
static LS_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s+(.+?)\s+([A-Za-z]+)\s+(\d+)\s+(\w{3} \w{3} [ \d]\d \d\d:\d\d:\d\d \d{4})\s*$",
    )
    .expect("static regex")
});

fn is_entry_line(line: &str) -> bool {
    LS_LINE_RE.is_match(line)
}

fn is_executable_file(path: &Path) -> bool {
    let Ok(metadata) = std::fs::metadata(path) else {
        return false;
    };
    if !metadata.is_file() {
        return false;
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o111 != 0
    }
    #[cfg(not(unix))]
    {
        true
    }
}

/// Locate the smbclient binary.
///
/// Order: `SMBCLIENT_PATH` (if executable), `PATH`, common install locations,
/// then `/usr/bin/smbclient` as a last resort.
pub fn resolve_binary_path() -> PathBuf {
    if let Some(explicit) = std::env::var_os(SMBCLIENT_PATH_ENV) {
        let explicit = PathBuf::from(explicit);
        if is_executable_file(&explicit) {
            return explicit;
        }
        warn!(
            "{} points to {:?} which is not an executable file, ignoring",
            SMBCLIENT_PATH_ENV, explicit
        );
    }

    if let Some(path_var) = std::env::var_os("PATH") {
        for dir in std::env::split_paths(&path_var) {
            let candidate = dir.join("smbclient");
            if is_executable_file(&candidate) {
                return candidate;
            }
        }
    }

    COMMON_BINARY_PATHS
        .iter()
        .map(PathBuf::from)
        .find(|p| is_executable_file(p))
        .unwrap_or_else(|| PathBuf::from(COMMON_BINARY_PATHS[0]))
}

/// Arguments and environment for one smbclient run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
}

impl Invocation {
    /// Build the invocation for `command` against the configured share.
    pub fn build(params: &ConnectionParameters, command: &str) -> Self {
        let mut args = Vec::new();
        let mut env = Vec::new();

        // Keep the server name as the target (Kerberos SPN) and dial the
        // explicit address with -I when both are known.
        let has_name = !params.server_name.trim().is_empty();
        let has_address = !params.server_address.trim().is_empty();
        let target = if has_name {
            params.server_name.as_str()
        } else {
            params.network_address()
        };
        args.push(format!("//{}/{}", target, params.share_name));
        if has_name && has_address {
            args.push("-I".to_string());
            args.push(params.server_address.clone());
        }

        if params.port != DEFAULT_SMB_PORT {
            args.push("-p".to_string());
            args.push(params.port.to_string());
        }

        match params.auth_mode {
            AuthMode::Kerberos => {
                args.push("--use-kerberos=required".to_string());
                if let Some(identity) = params.identity() {
                    args.push("-U".to_string());
                    args.push(identity);
                }
                args.push("-N".to_string());
            }
            AuthMode::Ntlm | AuthMode::Negotiate => {
                let kerberos = if params.auth_mode == AuthMode::Ntlm {
                    "off"
                } else {
                    "desired"
                };
                args.push(format!("--use-kerberos={}", kerberos));
                if let Some(identity) = params.identity() {
                    args.push("-U".to_string());
                    args.push(identity);
                }
                if let Some(password) = params.password.as_deref() {
                    env.push(("PASSWD".to_string(), password.to_string()));
                }
            }
        }

        args.push("-c".to_string());
        args.push(command.to_string());

        Self { args, env }
    }

    /// Render for logs with secrets replaced by `***`.
    pub fn redacted(&self) -> String {
        let mut parts: Vec<String> = self
            .env
            .iter()
            .map(|(k, v)| {
                if k.to_ascii_uppercase().contains("PASS") {
                    format!("{}=***", k)
                } else {
                    format!("{}={}", k, v)
                }
            })
            .collect();

        let mut redact_next = false;
        for arg in &self.args {
            if redact_next {
                // -U user%password form
                match arg.split_once('%') {
                    Some((user, _)) => parts.push(format!("{}%***", user)),
                    None => parts.push(arg.clone()),
                }
                redact_next = false;
            } else {
                redact_next = arg == "-U";
                parts.push(arg.clone());
            }
        }
        parts.join(" ")
    }
}

/// First `NT_STATUS_*` code in the output, if any.
///
/// Directory entry lines are skipped: a file may be named `NT_STATUS_*`.
pub fn find_nt_status(output: &str) -> Option<&str> {
    output
        .lines()
        .filter(|line| !is_entry_line(line))
        .find_map(|line| NT_STATUS_RE.find(line))
        .map(|m| m.as_str())
}

/// Parse `ls` output into entries, skipping headers, free-space lines and
/// the `.`/`..` pseudo entries.
pub fn parse_ls_output(output: &str) -> Vec<RemoteEntry> {
    let mut entries = Vec::new();
    for line in output.lines() {
        if line.trim().is_empty()
            || line.contains("blocks of size")
            || line.contains("blocks available")
        {
            continue;
        }
        let Some(caps) = LS_LINE_RE.captures(line) else {
            continue;
        };
        let name = caps[1].trim();
        if name == "." || name == ".." {
            continue;
        }
        let modified = caps[4].trim();
        entries.push(RemoteEntry {
            name: name.to_string(),
            is_dir: caps[2].contains('D'),
            size: caps[3].parse().unwrap_or(0),
            modified: (!modified.is_empty()).then(|| modified.to_string()),
        });
    }
    entries
}

/// Entry reported by a clean `ls "<path>"`.
///
/// Without wildcards the listing names only the target, so any parsed entry
/// means the path exists. The exact name is preferred when present.
fn stat_entry(output: &str, path: &str) -> Result<RemoteEntry, SmbError> {
    let (_, name) = split_parent(path);
    let mut entries = parse_ls_output(output);
    match entries.iter().position(|e| e.name.eq_ignore_ascii_case(name)) {
        Some(idx) => Ok(entries.swap_remove(idx)),
        None if !entries.is_empty() => Ok(entries.swap_remove(0)),
        None => Err(SmbError::NotFound(path.to_string())),
    }
}

/// Most useful part of a failed run's output for an error message.
fn summarize_output(output: &str) -> String {
    let status_lines: Vec<&str> = output
        .lines()
        .filter(|l| !is_entry_line(l))
        .map(str::trim)
        .filter(|l| l.contains("NT_STATUS_"))
        .collect();
    if !status_lines.is_empty() {
        return status_lines.join("; ");
    }
    let trimmed = output.trim();
    if trimmed.is_empty() {
        "no output".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Connector that produces smbclient-backed sessions
#[derive(Debug, Clone)]
pub struct SmbClientConnector {
    binary: PathBuf,
}

impl SmbClientConnector {
    /// Use the binary found by [`resolve_binary_path`].
    pub fn new() -> Self {
        Self::with_binary(resolve_binary_path())
    }

    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

impl Default for SmbClientConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SessionConnector for SmbClientConnector {
    async fn connect(
        &self,
        params: &ConnectionParameters,
    ) -> Result<Box<dyn ShareSession>, SmbError> {
        let session = SmbClientSession {
            binary: self.binary.clone(),
            params: params.clone(),
        };

        // Tree connect and disconnect straight away: proves the credentials
        // and the share before any real work.
        session.run("exit", None, params.timeout).await?;
        info!("Connected to {}", params.service_path());

        Ok(Box::new(session))
    }
}

/// One logical session against a share
pub struct SmbClientSession {
    binary: PathBuf,
    params: ConnectionParameters,
}

impl SmbClientSession {
    async fn run(
        &self,
        command: &str,
        stdin: Option<&mut (dyn AsyncRead + Send + Unpin)>,
        timeout: Duration,
    ) -> Result<String, SmbError> {
        let invocation = Invocation::build(&self.params, command);
        if self.params.log_commands {
            info!(
                "Executing smbclient: {} {}",
                self.binary.display(),
                invocation.redacted()
            );
        }

        let mut cmd = Command::new(&self.binary);
        cmd.args(&invocation.args)
            .envs(invocation.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let exchange = async {
            let mut child = cmd.spawn().map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    SmbError::ClientUnavailable(format!("{}: {}", self.binary.display(), e))
                } else {
                    SmbError::IoError(e)
                }
            })?;

            let mut feed_error = None;
            if let (Some(source), Some(mut pipe)) = (stdin, child.stdin.take()) {
                if let Err(e) = copy_in_chunks(source, &mut pipe).await {
                    feed_error = Some(e);
                }
                // Closing stdin signals end of file to smbclient
                drop(pipe);
            }

            let output = child.wait_with_output().await?;
            Ok::<_, SmbError>((output, feed_error))
        };

        let (output, feed_error) = tokio::time::timeout(timeout, exchange)
            .await
            .map_err(|_| {
                SmbError::Timeout(format!(
                    "smbclient did not finish '{}' within {:?}",
                    command, timeout
                ))
            })??;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        if let Some(status) = find_nt_status(&text) {
            if self.params.log_commands {
                warn!("smbclient reported {}: {}", status, text.trim());
            }
            return Err(SmbError::from_nt_status(status, summarize_output(&text)));
        }
        if !output.status.success() {
            return Err(SmbError::CommandFailed(format!(
                "{} ({})",
                summarize_output(&text),
                output.status
            )));
        }
        if let Some(e) = feed_error {
            return Err(SmbError::IoError(e));
        }

        if self.params.log_commands {
            debug!("smbclient succeeded. Output: {}", text.trim());
        }
        Ok(text)
    }
}

#[async_trait::async_trait]
impl ShareSession for SmbClientSession {
    async fn list_path(&self, _share: &str, path: &str) -> Result<Vec<RemoteEntry>, SmbError> {
        let command = if path.is_empty() {
            "ls".to_string()
        } else {
            format!("ls \"{}\\*\"", to_wire_path(path))
        };
        let output = self.run(&command, None, self.params.timeout).await?;
        Ok(parse_ls_output(&output))
    }

    async fn stat(&self, _share: &str, path: &str) -> Result<RemoteEntry, SmbError> {
        let command = format!("ls \"{}\"", to_wire_path(path));
        let output = self.run(&command, None, self.params.timeout).await?;
        stat_entry(&output, path)
    }

    async fn create_directory(&self, _share: &str, path: &str) -> Result<(), SmbError> {
        let command = format!("mkdir \"{}\"", to_wire_path(path));
        self.run(&command, None, self.params.timeout).await?;
        Ok(())
    }

    async fn store_file(
        &self,
        _share: &str,
        path: &str,
        source: &mut (dyn AsyncRead + Send + Unpin),
    ) -> Result<u64, SmbError> {
        // `put -` reads the file body from stdin
        let mut counted = CountingReader::new(source);
        let command = format!("put - \"{}\"", to_wire_path(path));
        let stdin: &mut (dyn AsyncRead + Send + Unpin) = &mut counted;
        self.run(&command, Some(stdin), self.params.transfer_timeout)
            .await?;
        Ok(counted.count)
    }

    async fn close(self: Box<Self>) -> Result<(), SmbError> {
        // Each command already disconnected; nothing is held open.
        debug!("Closing session for {}", self.params.service_path());
        Ok(())
    }
}

/// Wraps a reader and counts the bytes read through it.
struct CountingReader<'a> {
    inner: &'a mut (dyn AsyncRead + Send + Unpin),
    count: u64,
}

impl<'a> CountingReader<'a> {
    fn new(inner: &'a mut (dyn AsyncRead + Send + Unpin)) -> Self {
        Self { inner, count: 0 }
    }
}

impl AsyncRead for CountingReader<'_> {
    fn poll_read(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
        buf: &mut tokio::io::ReadBuf<'_>,
    ) -> std::task::Poll<std::io::Result<()>> {
        let before = buf.filled().len();
        let poll = std::pin::Pin::new(&mut *self.inner).poll_read(cx, buf);
        if let std::task::Poll::Ready(Ok(())) = &poll {
            let read = buf.filled().len() - before;
            self.count += read as u64;
        }
        poll
    }
}
