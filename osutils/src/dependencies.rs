use std::{
    ffi::{OsStr, OsString},
    io,
    os::unix::process::ExitStatusExt,
    path::PathBuf,
    process::{Command as StdCommand, Output},
};

use log::trace;
use strum_macros::IntoStaticStr;

#[derive(Debug, thiserror::Error)]
pub enum DependencyError {
    #[error("Failed to find dependency '{dependency}': {source}")]
    NotFound {
        dependency: Dependency,
        #[source]
        source: which::Error,
    },

    #[error("Failed to execute dependency '{dependency}': {inner}")]
    CouldNotExecute {
        dependency: Dependency,
        #[source]
        inner: io::Error,
    },

    #[error("Dependency '{dependency}' finished unsuccessfully: {explanation}\nCmdline: {rendered_command}\n{output}")]
    ExecutionFailed {
        dependency: Dependency,
        rendered_command: String,
        code: Option<i32>,
        signal: Option<i32>,
        explanation: String,
        output: String,
    },
}

/// Enum of external commands used in the code base.
#[derive(Debug, Clone, Copy, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Dependency {
    Apt,
    Chown,
    Dd,
    #[strum(serialize = "dpkg-reconfigure")]
    DpkgReconfigure,
    Git,
    #[strum(serialize = "invoke-rc.d")]
    InvokeRcd,
    Lsblk,
    Mount,
    Mountpoint,
    Openssl,
    Pip3,
    Python3,
    Setupcon,
    Systemctl,
    Udevadm,
    Umount,
    Useradd,
    Usermod,
    // Test dependencies
    #[cfg(test)]
    DoesNotExist,
    #[cfg(test)]
    Echo,
    #[cfg(test)]
    False,
}

impl std::fmt::Display for Dependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.into())
    }
}

impl Dependency {
    /// Gets the name of the dependency, e.g. Dependency::Lsblk => "lsblk".
    pub fn name(&self) -> &'static str {
        self.into()
    }

    /// Checks if the dependency is present on the host.
    pub fn exists(&self) -> bool {
        self.path().is_ok()
    }

    /// Gets the path of the dependency.
    pub fn path(&self) -> Result<PathBuf, Box<DependencyError>> {
        which::which(self.name()).map_err(|source| {
            Box::new(DependencyError::NotFound {
                dependency: *self,
                source,
            })
        })
    }

    /// Converts the dependency to a new Command instance.
    /// (Note this does not create a std::process::Command instance)
    pub fn cmd(&self) -> Command {
        Command {
            dependency: *self,
            args: vec![],
            envs: vec![],
            current_dir: None,
        }
    }
}

pub struct Command {
    dependency: Dependency,
    args: Vec<OsString>,
    envs: Vec<(OsString, OsString)>,
    current_dir: Option<PathBuf>,
}

impl Command {
    pub fn arg<S: AsRef<OsStr>>(&mut self, arg: S) -> &mut Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(&mut self, args: I) -> &mut Command
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for arg in args {
            self.arg(arg.as_ref());
        }
        self
    }

    pub fn env<K, V>(&mut self, key: K, val: V) -> &mut Command
    where
        K: AsRef<OsStr>,
        V: AsRef<OsStr>,
    {
        self.envs
            .push((key.as_ref().to_os_string(), val.as_ref().to_os_string()));
        self
    }

    pub fn current_dir(&mut self, dir: impl Into<PathBuf>) -> &mut Command {
        self.current_dir = Some(dir.into());
        self
    }

    pub fn run_and_check(&self) -> Result<(), Box<DependencyError>> {
        self.output()?.check()
    }

    pub fn output_and_check(&self) -> Result<String, Box<DependencyError>> {
        self.output()?.check_output()
    }

    fn render_command(&self) -> String {
        if self.args.is_empty() {
            self.dependency.to_string()
        } else {
            format!(
                "{} {}",
                self.dependency,
                self.args
                    .iter()
                    .map(|arg| arg.to_string_lossy())
                    .map(|arg| if arg.contains(' ') {
                        format!("'{arg}'")
                    } else {
                        arg.into()
                    })
                    .collect::<Vec<_>>()
                    .join(" "),
            )
        }
    }

    pub fn output(&self) -> Result<CommandOutput, Box<DependencyError>> {
        let mut cmd = StdCommand::new(self.dependency.path()?);
        cmd.args(&self.args);
        cmd.envs(self.envs.clone());
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }
        let rendered_command = self.render_command();
        trace!("Executing '{rendered_command}'");
        let output = cmd
            .output()
            .map_err(|inner| DependencyError::CouldNotExecute {
                dependency: self.dependency,
                inner,
            })?;
        let output = CommandOutput {
            rendered_command: rendered_command.clone(),
            dependency: self.dependency,
            inner: output,
        };
        trace!(
            "Executed '{rendered_command}': {}. Report:\n{}",
            output.explain_exit(),
            output.output_report(),
        );
        Ok(output)
    }
}

#[derive(Debug)]
pub struct CommandOutput {
    rendered_command: String,
    dependency: Dependency,
    inner: Output,
}

impl CommandOutput {
    /// Checks if the process exited successfully
    pub fn success(&self) -> bool {
        self.inner.status.success()
    }

    /// Gets the exit code of the process, if it exited normally
    pub fn code(&self) -> Option<i32> {
        self.inner.status.code()
    }

    /// Gets the signal that terminated the process, if it was terminated by a signal
    fn signal(&self) -> Option<i32> {
        self.inner.status.signal()
    }

    /// Gets stderr
    pub fn error_output(&self) -> String {
        String::from_utf8_lossy(&self.inner.stderr).into()
    }

    /// Gets stdout
    pub fn output(&self) -> String {
        String::from_utf8_lossy(&self.inner.stdout).into()
    }

    /// Gets all available output, useful for reporting or debugging
    pub fn output_report(&self) -> String {
        let stdout = self.output();
        let stderr = self.error_output();

        let mut res = String::with_capacity(stdout.len() + stderr.len() + 20);

        if !stdout.is_empty() {
            res += &format!("stdout:\n{stdout}\n");
        }

        if !stderr.is_empty() {
            if !res.is_empty() {
                res += "\n";
            }
            res += &format!("stderr:\n{stderr}\n");
        }

        res
    }

    /// Checks if the process exited successfully, otherwise produces an error
    pub fn check(&self) -> Result<(), Box<DependencyError>> {
        if self.success() {
            return Ok(());
        }

        Err(Box::new(DependencyError::ExecutionFailed {
            dependency: self.dependency,
            rendered_command: self.rendered_command.clone(),
            code: self.code(),
            signal: self.signal(),
            explanation: self.explain_exit(),
            output: match self.output_report() {
                s if !s.is_empty() => s,
                _ => "(no output collected)".into(),
            },
        }))
    }

    /// Checks if the process exited successfully and returns the output,
    /// otherwise produces an error with the output
    pub fn check_output(&self) -> Result<String, Box<DependencyError>> {
        self.check()?;
        Ok(self.output())
    }

    /// Produces a string explaining the exit status of the process
    fn explain_exit(&self) -> String {
        if let Some(code) = self.code() {
            format!("exited with status: {code}")
        } else if let Some(signal) = self.signal() {
            format!("terminated by signal: {signal}")
        } else {
            "exited with unknown status".into()
        }
    }
}
