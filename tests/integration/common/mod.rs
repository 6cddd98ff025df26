#![allow(dead_code)]

use std::{
    fs,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
};

use assert_cmd::Command;
use tempfile::{TempDir, tempdir};

pub const TEMPLATE: &str = "\
[unix_http_server]
file = /tmp/supervisor.sock

[supervisord]
logfile = /tmp/supervisord.log
nodaemon = false

[supervisorctl]
serverurl = unix:///tmp/supervisor.sock

";

/// Temporary project directory with stand-in `supervisord` and `supervisorctl`
/// scripts that append their argv to `calls.log`.
///
/// While `daemon.down` exists, `supervisorctl status` exits 4 like the real client
/// does when the socket is missing; running the fake `supervisord` removes it.
pub struct Project {
    _temp: TempDir,
    root: PathBuf,
}

impl Project {
    pub fn new() -> Self {
        let temp = tempdir().expect("failed to create tempdir");
        let root = temp.path().to_path_buf();
        let bin = root.join("bin");
        fs::create_dir_all(&bin).expect("failed to create bin dir");

        let log = root.join("calls.log");
        let down = root.join("daemon.down");

        write_script(
            &bin.join("supervisord"),
            &format!(
                "#!/bin/sh\necho \"supervisord $*\" >> '{log}'\nrm -f '{down}'\nexit 0\n",
                log = log.display(),
                down = down.display(),
            ),
        );
        write_script(
            &bin.join("supervisorctl"),
            &format!(
                r#"#!/bin/sh
echo "supervisorctl $*" >> '{log}'
if [ "$3" = "status" ] && [ -f '{down}' ]; then
  echo "unix:///tmp/supervisor.sock no such file"
  exit 4
fi
if [ "$3" = "status" ]; then
  echo "api                              RUNNING   pid 42, uptime 0:01:00"
fi
if [ "$4" = "broken" ]; then
  echo "broken: ERROR (no such process)"
  exit 7
fi
exit 0
"#,
                log = log.display(),
                down = down.display(),
            ),
        );

        Self { _temp: temp, root }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join("supervisord.conf")
    }

    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.root.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent dir");
        }
        fs::write(&path, contents).expect("failed to write fixture");
        path
    }

    pub fn mark_daemon_down(&self) {
        fs::write(self.root.join("daemon.down"), "").expect("failed to write marker");
    }

    /// Lines appended by the fake supervisor programs, with the compiled config path
    /// replaced by `$CONF`.
    pub fn calls(&self) -> Vec<String> {
        let conf = self.config_path().display().to_string();
        fs::read_to_string(self.root.join("calls.log"))
            .unwrap_or_default()
            .lines()
            .map(|line| line.replace(&conf, "$CONF"))
            .collect()
    }

    /// `supman` running inside the project with the fake programs configured.
    pub fn supman(&self) -> Command {
        let mut command = Command::new(assert_cmd::cargo::cargo_bin!("supman"));
        command
            .current_dir(&self.root)
            .env("SUPMAN_SUPERVISORD", self.root.join("bin/supervisord"))
            .env("SUPMAN_SUPERVISORCTL", self.root.join("bin/supervisorctl"))
            .env_remove("SUPMAN_PROBE")
            .env_remove("SUPMAN_CONFIG")
            .env_remove("SUPMAN_TEMPLATE")
            .env_remove("SUPMAN_MANIFEST")
            .env_remove("RUST_LOG");
        command
    }
}

fn write_script(path: &Path, body: &str) {
    fs::write(path, body).expect("failed to write script");
    let mut permissions = fs::metadata(path)
        .expect("failed to stat script")
        .permissions();
    permissions.set_mode(0o755);
    fs::set_permissions(path, permissions).expect("failed to chmod script");
}
