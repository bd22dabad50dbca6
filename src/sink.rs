//! Log channels for analysis output.
//!
//! Three channels carry everything the tool prints:
//! - result: the reports themselves, on stdout; always on
//! - demo: processing commentary (file opens, phase notes), on stderr,
//!   enabled with `/d`
//! - debug: diagnostics (parse warnings, type collisions), on stderr,
//!   enabled with `/b`
//!
//! With `/f` every enabled channel is also teed to `logFile.txt` inside the
//! analysis root.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Name of the tee file created inside the analysis root with `/f`.
pub const LOG_FILE_NAME: &str = "logFile.txt";

/// The three output channels.
pub struct LogSinks {
    demo_on: bool,
    debug_on: bool,
    file: Option<Mutex<File>>,
}

impl LogSinks {
    /// Create sinks with the given channel switches. The result channel has
    /// no switch; the reports are the program's output.
    pub fn new(demo_on: bool, debug_on: bool) -> Self {
        Self {
            demo_on,
            debug_on,
            file: None,
        }
    }

    /// Create sinks with demo and debug off.
    pub fn quiet() -> Self {
        Self::new(false, false)
    }

    /// Tee every enabled channel to `logFile.txt` inside `dir`.
    /// Returns the path of the created file.
    pub fn attach_file(&mut self, dir: &Path) -> io::Result<PathBuf> {
        let path = dir.join(LOG_FILE_NAME);
        let file = File::create(&path)?;
        self.file = Some(Mutex::new(file));
        Ok(path)
    }

    pub fn demo_enabled(&self) -> bool {
        self.demo_on
    }

    pub fn debug_enabled(&self) -> bool {
        self.debug_on
    }

    /// Write a line to the result channel.
    pub fn result(&self, msg: &str) {
        println!("{}", msg);
        self.tee(msg);
    }

    /// Write a line to the demo channel, if enabled.
    pub fn demo(&self, msg: &str) {
        if self.demo_on {
            eprintln!("{}", msg);
            self.tee(msg);
        }
    }

    /// Write a line to the debug channel, if enabled.
    pub fn debug(&self, msg: &str) {
        if self.debug_on {
            eprintln!("{}", msg);
            self.tee(msg);
        }
    }

    fn tee(&self, msg: &str) {
        if let Some(file) = &self.file {
            if let Ok(mut f) = file.lock() {
                let _ = writeln!(f, "{}", msg);
            }
        }
    }
}

impl Default for LogSinks {
    fn default() -> Self {
        Self::quiet()
    }
}
