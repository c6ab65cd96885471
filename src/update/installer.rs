//! Toolchain installation with zero-downtime symlink swapping
//!
//! Extracts a verified release archive into the install root and repoints
//! the bin-directory symlinks at the new tree. Extraction rejects any
//! archive entry that would resolve outside the install root.

use crate::core::error::{Result, UpdateError};
use crate::core::types::InstallLayout;
use crate::update::poll::Deadline;
use crate::update::version_check::TOOLCHAIN_DIR;
use flate2::read::GzDecoder;
use path_clean::PathClean;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tar::EntryType;
use wait_timeout::ChildExt;

/// Entry-point binaries exposed through the bin directory; the first one is
/// used for post-install verification
const ENTRY_POINTS: [&str; 2] = ["go", "gofmt"];

/// Argument passed to the entry point to query its version
const VERSION_ARG: &str = "version";

/// Installs extracted toolchain trees into a fixed directory layout
pub struct Installer {
    layout: InstallLayout,
}

impl Installer {
    /// Create an installer over the given layout
    pub fn new(layout: InstallLayout) -> Self {
        Installer { layout }
    }

    /// The layout this installer operates on
    pub fn layout(&self) -> &InstallLayout {
        &self.layout
    }

    /// Default user-level layout: `~/.local/lib` and `~/.local/bin`
    pub fn default_layout() -> Result<InstallLayout> {
        let user_dirs = directories::UserDirs::new().ok_or(UpdateError::HomeDirectoryNotFound)?;
        let home = user_dirs.home_dir();
        InstallLayout::new(
            home.join(".local").join("lib"),
            home.join(".local").join("bin"),
        )
    }

    /// Install the toolchain from `archive_path`.
    ///
    /// Stages run strictly in order, each fatal on error: ensure the layout
    /// directories exist, remove any previous installation, extract the
    /// archive, then create the entry-point symlinks. A failure while
    /// creating symlinks leaves the extracted tree in place; the caller must
    /// treat the installation as broken.
    pub fn install(&self, deadline: &Deadline, archive_path: &Path) -> Result<()> {
        self.ensure_directories()?;
        self.remove_existing()?;
        self.extract_archive(deadline, archive_path)?;
        self.create_symlinks()?;
        Ok(())
    }

    /// Create the install root and bin directory, parents included
    fn ensure_directories(&self) -> Result<()> {
        fs::create_dir_all(&self.layout.install_root)
            .map_err(|e| UpdateError::fs("create install directory", &self.layout.install_root, e))?;
        fs::create_dir_all(&self.layout.bin_dir)
            .map_err(|e| UpdateError::fs("create bin directory", &self.layout.bin_dir, e))?;
        Ok(())
    }

    /// Remove a previous toolchain tree and stale entry-point symlinks.
    ///
    /// Absence of either is not an error.
    fn remove_existing(&self) -> Result<()> {
        let toolchain = self.layout.install_root.join(TOOLCHAIN_DIR);
        if toolchain.exists() {
            fs::remove_dir_all(&toolchain)
                .map_err(|e| UpdateError::fs("remove existing installation", &toolchain, e))?;
        }

        for name in ENTRY_POINTS {
            let link = self.layout.bin_dir.join(name);
            // symlink_metadata also catches dangling links a plain exists()
            // check would miss.
            match fs::symlink_metadata(&link) {
                Ok(_) => {
                    fs::remove_file(&link)
                        .map_err(|e| UpdateError::fs("remove existing symlink", &link, e))?;
                },
                Err(e) if e.kind() == io::ErrorKind::NotFound => {},
                Err(e) => return Err(UpdateError::fs("inspect symlink", &link, e)),
            }
        }

        Ok(())
    }

    /// Stream-extract the gzip tar archive into the install root.
    ///
    /// Cancellation is checked before each entry header is read.
    fn extract_archive(&self, deadline: &Deadline, archive_path: &Path) -> Result<()> {
        let file =
            File::open(archive_path).map_err(|e| UpdateError::fs("open archive", archive_path, e))?;
        let decoder = GzDecoder::new(file);
        let mut archive = tar::Archive::new(decoder);

        let root = self.layout.install_root.clean();
        let mut entries = archive
            .entries()
            .map_err(|e| UpdateError::fs("read archive", archive_path, e))?;

        loop {
            if deadline.expired() {
                return Err(UpdateError::DeadlineElapsed {
                    operation: "extract archive".to_string(),
                });
            }

            let entry = match entries.next() {
                Some(entry) => entry,
                None => break,
            };
            let mut entry =
                entry.map_err(|e| UpdateError::fs("read archive entry", archive_path, e))?;
            self.unpack_entry(&root, &mut entry)?;
        }

        Ok(())
    }

    /// Write one archive entry below the install root.
    fn unpack_entry<R: Read>(&self, root: &Path, entry: &mut tar::Entry<R>) -> Result<()> {
        let name = entry
            .path()
            .map_err(|e| UpdateError::fs("decode archive entry name", root, e))?
            .into_owned();
        let target = resolve_entry_target(root, &name)?;
        let entry_type = entry.header().entry_type();
        let mode = entry.header().mode().unwrap_or(0o644);

        match entry_type {
            EntryType::Directory => {
                fs::create_dir_all(&target)
                    .map_err(|e| UpdateError::fs("create directory", &target, e))?;
                set_mode(&target, mode)?;
            },
            EntryType::Regular => {
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent)
                        .map_err(|e| UpdateError::fs("create parent directory", parent, e))?;
                }

                // A fresh, truncated file: a stray existing file never
                // bleeds into the new tree.
                let mut output =
                    File::create(&target).map_err(|e| UpdateError::fs("create file", &target, e))?;
                io::copy(entry, &mut output)
                    .map_err(|e| UpdateError::fs("write file", &target, e))?;
                set_mode(&target, mode)?;
            },
            EntryType::Symlink => {
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent)
                        .map_err(|e| UpdateError::fs("create parent directory", parent, e))?;
                }

                let link_target = entry
                    .link_name()
                    .map_err(|e| UpdateError::fs("decode symlink target", &target, e))?
                    .ok_or_else(|| {
                        UpdateError::configuration(format!(
                            "archive symlink entry {} has no target",
                            name.display()
                        ))
                    })?;

                // The target string is copied verbatim; the extractor never
                // dereferences it.
                make_symlink(&link_target, &target)?;
            },
            other => {
                tracing::warn!(
                    entry = %name.display(),
                    entry_type = ?other,
                    "skipping unsupported archive entry type"
                );
            },
        }

        Ok(())
    }

    /// Point the bin-directory symlinks at the freshly extracted tree.
    ///
    /// Failure here is fatal; the extraction is not rolled back.
    fn create_symlinks(&self) -> Result<()> {
        for name in ENTRY_POINTS {
            let source = self
                .layout
                .install_root
                .join(TOOLCHAIN_DIR)
                .join("bin")
                .join(name);
            let link = self.layout.bin_dir.join(name);
            make_symlink(&source, &link)?;
        }
        Ok(())
    }

    /// Confirm the installed toolchain actually runs.
    ///
    /// Executes the primary entry point with a version query under the
    /// remaining deadline; if the deadline wins the race the subprocess is
    /// killed and a timeout error returned.
    pub fn verify(&self, deadline: &Deadline) -> Result<()> {
        let entry_point = self.layout.bin_dir.join(ENTRY_POINTS[0]);
        if !entry_point.exists() {
            return Err(UpdateError::EntryPointMissing { path: entry_point });
        }

        run_version_query(&entry_point, deadline)
    }
}

/// Resolve an archive entry name below the (already normalized) install
/// root, rejecting anything that escapes it.
///
/// Both sides are compared in normalized form and component-wise, so an
/// entry resolving to a sibling directory that merely shares a string
/// prefix with the root (`/opt/go-evil` vs `/opt/go`) is rejected too.
fn resolve_entry_target(root: &Path, name: &Path) -> Result<PathBuf> {
    let target = root.join(name).clean();
    if target == *root || !target.starts_with(root) {
        return Err(UpdateError::PathTraversal {
            entry: name.display().to_string(),
        });
    }
    Ok(target)
}

/// Apply tar permission bits to an extracted path
#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .map_err(|e| UpdateError::fs("set permissions on", path, e))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}

/// Create a symlink at `link` pointing to `target`
#[cfg(unix)]
fn make_symlink(target: &Path, link: &Path) -> Result<()> {
    std::os::unix::fs::symlink(target, link).map_err(|e| UpdateError::Symlink {
        link: link.to_path_buf(),
        target: target.to_path_buf(),
        source: e,
    })
}

#[cfg(not(unix))]
fn make_symlink(_target: &Path, link: &Path) -> Result<()> {
    Err(UpdateError::configuration(format!(
        "symlink-based installation is not supported on this platform ({})",
        link.display()
    )))
}

/// Run `<entry_point> version`, capturing combined output, racing the
/// remaining deadline against process exit.
fn run_version_query(entry_point: &Path, deadline: &Deadline) -> Result<()> {
    let command = format!("{} {}", entry_point.display(), VERSION_ARG);
    let timeout = deadline.remaining();
    if timeout.is_zero() {
        return Err(UpdateError::DeadlineElapsed {
            operation: "verify installation".to_string(),
        });
    }

    let mut child = Command::new(entry_point)
        .arg(VERSION_ARG)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| UpdateError::fs("execute", entry_point, e))?;

    // spawn() already closed the parent's copies of the pipe write ends, so
    // reading below sees EOF as soon as the child is done writing.
    match child
        .wait_timeout(timeout)
        .map_err(|e| UpdateError::fs("wait for", entry_point, e))?
    {
        Some(status) => {
            let output = drain_output(&mut child)?;
            if status.success() {
                tracing::debug!(output = %output.trim(), "entry point responded");
                Ok(())
            } else {
                Err(UpdateError::CommandFailed {
                    command,
                    status: status.to_string(),
                    output: output.trim().to_string(),
                })
            }
        },
        None => {
            // Deadline won the race: kill the child and reap it so no
            // zombie is left behind.
            let _ = child.kill();
            let _ = child.wait();
            Err(UpdateError::CommandTimeout { command, timeout })
        },
    }
}

/// Read the child's stdout and stderr to completion, stdout first
fn drain_output(child: &mut std::process::Child) -> Result<String> {
    let mut output = String::new();
    if let Some(mut stdout) = child.stdout.take() {
        stdout.read_to_string(&mut output)?;
    }
    if let Some(mut stderr) = child.stderr.take() {
        stderr.read_to_string(&mut output)?;
    }
    Ok(output)
}
