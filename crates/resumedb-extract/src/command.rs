//! External converter invocations.

use anyhow::{anyhow, bail, Context, Result};
use std::ffi::OsStr;
use std::path::Path;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;

const OFFICE_EXECUTABLES: [&str; 3] = ["soffice", "libreoffice", "localc"];

const WORD_SCRIPT: &str = r#"
$word = New-Object -ComObject Word.Application
$word.Visible = $false
try {
    $doc = $word.Documents.Open($env:RESUMEDB_WORD_PATH, $false, $true)
    $doc.Content.Text
    $doc.Close($false)
} finally {
    $word.Quit()
}
"#;

fn command(program: &str) -> Command {
    let mut cmd = Command::new(program);
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    cmd
}

fn stdout_of(program: &str, output: Output) -> Result<String> {
    if !output.status.success() {
        bail!(
            "{program} exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Run `program` with `args` and return its stdout.
pub(crate) async fn capture<I, S>(program: &str, args: I) -> Result<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = command(program)
        .args(args)
        .output()
        .await
        .with_context(|| format!("failed to launch {program}"))?;
    stdout_of(program, output)
}

pub(crate) async fn textutil(path: &Path) -> Result<String> {
    capture("textutil", [OsStr::new("-convert"), OsStr::new("txt"), OsStr::new("-stdout"), path.as_os_str()]).await
}

pub(crate) async fn word_automation(path: &Path) -> Result<String> {
    let output = command("powershell")
        .args(["-NoProfile", "-NonInteractive", "-Command", WORD_SCRIPT])
        .env("RESUMEDB_WORD_PATH", path)
        .output()
        .await
        .context("failed to launch powershell")?;
    stdout_of("powershell", output)
}

pub(crate) async fn pdftotext(path: &Path) -> Result<String> {
    capture(
        "pdftotext",
        [
            OsStr::new("-layout"),
            OsStr::new("-enc"),
            OsStr::new("UTF-8"),
            path.as_os_str(),
            OsStr::new("-"),
        ],
    )
    .await
}

/// Convert through a headless office suite, trying each known executable.
///
/// Output goes to a scratch directory that is removed on return. Each
/// attempt is bounded by `limit`; a child still running at the deadline is
/// killed.
pub(crate) async fn office_suite(path: &Path, limit: Duration) -> Result<String> {
    let stem = path
        .file_stem()
        .ok_or_else(|| anyhow!("path has no file name"))?
        .to_os_string();
    let mut failures = Vec::new();

    for exe in OFFICE_EXECUTABLES {
        let outdir = tempfile::tempdir().context("failed to create scratch directory")?;
        let mut cmd = command(exe);
        cmd.args(["--headless", "--convert-to", "txt:Text", "--outdir"])
            .arg(outdir.path())
            .arg(path);

        let output = match tokio::time::timeout(limit, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                failures.push(format!("{exe}: {e}"));
                continue;
            }
            Err(_) => {
                failures.push(format!("{exe}: timed out after {}s", limit.as_secs()));
                continue;
            }
        };
        if let Err(e) = stdout_of(exe, output) {
            failures.push(e.to_string());
            continue;
        }

        let mut produced = outdir.path().join(&stem);
        produced.set_extension("txt");
        match tokio::fs::read(&produced).await {
            Ok(bytes) => return Ok(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) => failures.push(format!("{exe}: no output at {}: {e}", produced.display())),
        }
    }
    bail!("{}", failures.join("; "))
}

/// Best-effort `file` verdict for diagnostics.
pub(crate) async fn describe(path: &Path) -> Option<String> {
    capture("file", [path.as_os_str()])
        .await
        .ok()
        .map(|s| s.trim().to_string())
}
