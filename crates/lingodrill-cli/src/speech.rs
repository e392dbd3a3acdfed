//! Pronunciation through whatever speech program the host has.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use lingodrill_core::traits::{SilentSpeaker, Speaker};

/// Speech programs tried in order.
const PROGRAMS: &[&str] = &["espeak-ng", "espeak", "say"];

/// Speaks through an external program. Failures are logged and otherwise ignored.
pub struct SystemSpeaker {
    program: PathBuf,
}

impl SystemSpeaker {
    /// The first speech program on `PATH`, if any.
    pub fn detect() -> Option<Self> {
        let path = std::env::var_os("PATH")?;
        std::env::split_paths(&path)
            .flat_map(|dir| PROGRAMS.iter().map(move |p| dir.join(p)))
            .find(|candidate| candidate.is_file())
            .map(|program| Self { program })
    }

    fn is_say(&self) -> bool {
        self.program.file_name().is_some_and(|name| name == "say")
    }
}

impl Speaker for SystemSpeaker {
    fn speak(&self, text: &str, locale: &str) {
        let mut cmd = Command::new(&self.program);
        if !self.is_say() {
            // espeak takes a language like "de", not a full locale.
            let language = locale.split(['-', '_']).next().unwrap_or(locale);
            cmd.arg("-v").arg(language);
        }
        cmd.arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        match cmd.spawn() {
            Ok(mut child) => {
                std::thread::spawn(move || child.wait());
            }
            Err(e) => {
                tracing::debug!("failed to run {}: {e}", self.program.display());
            }
        }
    }
}

/// The system speaker when one is installed, silence otherwise.
pub fn speaker() -> Box<dyn Speaker> {
    match SystemSpeaker::detect() {
        Some(speaker) => Box::new(speaker),
        None => Box::new(SilentSpeaker),
    }
}
