//! Hand URLs to the desktop's default opener.

use std::process::{Command, Stdio};

use anyhow::{bail, Context, Result};

/// Program and leading arguments of the platform opener.
fn opener() -> (&'static str, &'static [&'static str]) {
    #[cfg(target_os = "macos")]
    {
        return ("open", &[]);
    }

    #[cfg(target_os = "windows")]
    {
        return ("cmd", &["/C", "start", ""]);
    }

    #[allow(unreachable_code)]
    ("xdg-open", &[])
}

/// Only web links are handed out; anything else would be run by the opener.
fn check_url(url: &str) -> Result<()> {
    let url = url.trim();
    if !(url.starts_with("https://") || url.starts_with("http://")) {
        bail!("refusing to open non-web link {url:?}");
    }
    Ok(())
}

/// Open `url` in the user's browser.  Returns once the opener has started;
/// it is not waited on.
pub fn open_url(url: &str) -> Result<()> {
    check_url(url)?;
    let (program, args) = opener();
    Command::new(program)
        .args(args)
        .arg(url.trim())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("failed to run {program}"))?;
    tracing::info!(url, program, "opened link");
    Ok(())
}
