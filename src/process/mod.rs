use std::path::Path;
use std::process::{Command, Stdio};

use log::{debug, info};

use crate::error::{LauncherError, LauncherResult};

/// Starts the client without waiting on it.
#[derive(Clone, Debug, Default)]
pub struct ProcessLauncher {
    wrapper: Vec<String>,
}

impl ProcessLauncher {
    pub fn new(wrapper: Vec<String>) -> Self {
        Self { wrapper }
    }

    pub fn command(&self, executable: &Path, args: &[String]) -> Command {
        let mut command = match self.wrapper.split_first() {
            Some((program, prefix)) => {
                let mut command = Command::new(program);
                command.args(prefix).arg(executable);
                command
            }
            None => Command::new(executable),
        };
        command.args(args);

        if let Some(dir) = executable.parent() {
            command.current_dir(dir);
        }
        command.stdin(Stdio::null());
        command.stdout(Stdio::null());
        command.stderr(Stdio::null());

        #[cfg(target_os = "windows")]
        {
            use std::os::windows::process::CommandExt;
            // DETACHED_PROCESS | CREATE_NEW_PROCESS_GROUP
            command.creation_flags(0x00000008 | 0x00000200);
        }

        command
    }

    /// Spawn `executable` and release the handle. The child outlives the launcher.
    pub fn spawn_detached(&self, executable: &Path, args: &[String]) -> LauncherResult<()> {
        if !executable.is_file() {
            return Err(LauncherError::Launch {
                path: executable.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "client executable missing"),
            });
        }

        let mut command = self.command(executable, args);
        debug!("launch: {:?}", command);
        let child = command.spawn().map_err(|source| LauncherError::Launch {
            path: executable.to_path_buf(),
            source,
        })?;
        info!("launch: started {} (pid {})", executable.display(), child.id());
        Ok(())
    }
}
