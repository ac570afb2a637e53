use std::{fs, path::Path, process::Command};

use temp_dir::TempDir;

use crate::{config::Settings, git::Git};

pub struct RepoTestContext {
    pub dir: TempDir,
}

impl RepoTestContext {
    pub fn setup_init() -> Self {
        let dir = TempDir::new().unwrap();

        run(dir.path(), &["git", "init", "--initial-branch=main"]);
        set_config(dir.path());

        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn git(&self) -> Git {
        self.git_with(Settings::default())
    }

    pub fn git_with(&self, settings: Settings) -> Git {
        Git::open(self.dir.path(), settings).unwrap()
    }

    pub fn write(&self, file_name: &str, contents: &str) {
        let path = self.dir.child(file_name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }
}

// https://git-scm.com/book/en/v2/Git-Internals-Environment-Variables
const ENV_VARS: &[(&str, &str)] = &[
    ("GIT_CONFIG_GLOBAL", "/dev/null"),
    ("GIT_CONFIG_SYSTEM", "/dev/null"),
    ("GIT_AUTHOR_NAME", "Author Name"),
    ("GIT_AUTHOR_EMAIL", "author@email.com"),
    ("GIT_AUTHOR_DATE", "Fri Feb 16 11:11 2024 +0100"),
    ("GIT_COMMITTER_NAME", "Committer Name"),
    ("GIT_COMMITTER_EMAIL", "committer@email.com"),
    ("GIT_COMMITTER_DATE", "Sun Feb 18 14:00 2024 +0100"),
    ("LC_ALL", "C"),
];

pub fn run(dir: &Path, cmd: &[&str]) -> String {
    let output = Command::new(cmd[0])
        .args(&cmd[1..])
        .envs(ENV_VARS.iter().copied())
        .current_dir(dir)
        .output()
        .unwrap_or_else(|_| panic!("failed to execute {:?}", cmd));

    assert!(
        output.status.success(),
        "{:?} failed: {}",
        cmd,
        String::from_utf8_lossy(&output.stderr)
    );

    String::from_utf8(output.stderr).unwrap()
}

fn set_config(path: &Path) {
    run(path, &["git", "config", "user.email", "ci@example.com"]);
    run(path, &["git", "config", "user.name", "CI"]);
}

pub fn commit(dir: &Path, file_name: &str, contents: &str) {
    let path = dir.to_path_buf().join(file_name);
    let message = match path.try_exists() {
        Ok(true) => format!("modify {}\n\nCommit body goes here\n", file_name),
        _ => format!("add {}\n\nCommit body goes here\n", file_name),
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).expect("error writing to file");
    run(dir, &["git", "add", file_name]);
    run(dir, &["git", "commit", "-m", &message]);
}
