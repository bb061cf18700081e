//! Platform URL openers

use async_trait::async_trait;
use jarvis_agent::{Error, UrlOpener};
use std::process::Stdio;
use tokio::process::Command;

/// Opens URLs with the desktop's default handler
pub struct SystemOpener;

impl SystemOpener {
    fn command(url: &str) -> Command {
        #[cfg(target_os = "macos")]
        let command = {
            let mut c = Command::new("open");
            c.arg(url);
            c
        };
        #[cfg(target_os = "windows")]
        let command = {
            let (program, args) = windows_argv(url);
            let mut c = Command::new(program);
            c.args(args);
            c
        };
        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        let command = {
            let mut c = Command::new("xdg-open");
            c.arg(url);
            c
        };
        command
    }
}

/// Hands the URL to the shell's protocol handler without going through
/// `cmd`, which would split it at `&`.
#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
fn windows_argv(url: &str) -> (&'static str, Vec<String>) {
    (
        "rundll32",
        vec!["url.dll,FileProtocolHandler".to_string(), url.to_string()],
    )
}

#[async_trait]
impl UrlOpener for SystemOpener {
    fn name(&self) -> &str {
        "system opener"
    }

    async fn open(&self, url: &str) -> jarvis_agent::Result<()> {
        run(Self::command(url), url).await
    }
}

/// Opens URLs with the browser named by `$BROWSER`
pub struct BrowserEnvOpener {
    browser: Option<String>,
}

impl BrowserEnvOpener {
    pub fn new(browser: Option<String>) -> Self {
        Self {
            browser: browser.filter(|b| !b.trim().is_empty()),
        }
    }

    pub fn from_env() -> Self {
        Self::new(std::env::var("BROWSER").ok())
    }

    /// Program and arguments for `url`. A `%s` in the configured command is
    /// replaced by the URL; otherwise the URL is appended.
    fn argv(&self, url: &str) -> Option<Vec<String>> {
        let browser = self.browser.as_deref()?;
        let mut argv: Vec<String> = browser.split_whitespace().map(str::to_string).collect();
        if argv.iter().any(|a| a.contains("%s")) {
            for arg in argv.iter_mut() {
                *arg = arg.replace("%s", url);
            }
        } else {
            argv.push(url.to_string());
        }
        Some(argv)
    }
}

#[async_trait]
impl UrlOpener for BrowserEnvOpener {
    fn name(&self) -> &str {
        "$BROWSER"
    }

    async fn open(&self, url: &str) -> jarvis_agent::Result<()> {
        let Some(argv) = self.argv(url) else {
            return Err(Error::OpenFailed {
                url: url.to_string(),
                reason: "BROWSER is not set".to_string(),
            });
        };
        let mut command = Command::new(&argv[0]);
        command.args(&argv[1..]);
        run(command, url).await
    }
}

async fn run(mut command: Command, url: &str) -> jarvis_agent::Result<()> {
    let status = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map_err(|e| Error::OpenFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    if status.success() {
        Ok(())
    } else {
        Err(Error::OpenFailed {
            url: url.to_string(),
            reason: format!("exited with {}", status),
        })
    }
}
