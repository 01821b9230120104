use std::process::Child;

use tracing::debug;

use crate::Result;

/// Handle to a detached child process.
#[derive(Debug)]
pub struct Background {
    child: Option<Child>,
}

impl Background {
    pub(crate) fn new(child: Child) -> Self {
        Self { child: Some(child) }
    }

    /// Placeholder handle produced in dry-run mode.
    pub(crate) fn dry() -> Self {
        Self { child: None }
    }

    /// The child's pid, or `None` for a dry-run handle.
    pub fn pid(&self) -> Option<u32> {
        self.child.as_ref().map(Child::id)
    }

    /// True once the child has exited.
    pub fn stopped(&mut self) -> Result<bool> {
        match self.child.as_mut() {
            Some(child) => match child.try_wait()? {
                Some(status) => {
                    debug!("background process finished with {status}");
                    Ok(true)
                }
                None => Ok(false),
            },
            None => Ok(true),
        }
    }

    /// Hard-kills the child. A process that already exited is not an error.
    pub fn terminate(&mut self) -> Result<()> {
        if let Some(child) = self.child.as_mut() {
            debug!("terminating background process {}", child.id());
            match child.kill() {
                Ok(()) => {
                    child.wait()?;
                }
                // InvalidInput means the process has already exited.
                Err(err) if err.kind() == std::io::ErrorKind::InvalidInput => {}
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }
}
