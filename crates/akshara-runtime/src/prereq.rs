use std::fmt;
use std::process::{Command, Stdio};

/// A missing prerequisite with actionable install instructions.
#[derive(Debug)]
pub struct MissingPrereq {
    pub name: &'static str,
    pub purpose: &'static str,
    pub install_hint: &'static str,
}

impl fmt::Display for MissingPrereq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "  - {}: {} (install: {})",
            self.name, self.purpose, self.install_hint
        )
    }
}

fn command_exists(name: &str) -> bool {
    Command::new("which")
        .arg(name)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|s| s.success())
}

fn succeeds(program: &str, args: &[&str]) -> bool {
    Command::new(program)
        .args(args)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|s| s.success())
}

pub(crate) fn compose_plugin_available() -> bool {
    succeeds("docker", &["compose", "version"])
}

pub(crate) fn standalone_compose_available() -> bool {
    succeeds("docker-compose", &["version"])
}

/// Check prerequisites for the compose backend.
/// Returns a list of missing items. Empty list means all prerequisites are met.
pub fn check_compose_prereqs() -> Vec<MissingPrereq> {
    let mut missing = Vec::new();

    if !command_exists("docker") {
        missing.push(MissingPrereq {
            name: "docker",
            purpose: "running the transliteration service containers",
            install_hint: "zypper install docker | apt install docker.io | dnf install moby-engine | pacman -S docker",
        });
    } else if !succeeds("docker", &["info"]) {
        missing.push(MissingPrereq {
            name: "docker daemon",
            purpose: "running the transliteration service containers",
            install_hint: "start the daemon (systemctl start docker) and make sure your user may access it",
        });
    }

    if !compose_plugin_available() && !standalone_compose_available() {
        missing.push(MissingPrereq {
            name: "docker compose",
            purpose: "orchestrating the front, back and fonts services",
            install_hint: "install the compose plugin (docker-compose-plugin) or standalone docker-compose",
        });
    }

    if !command_exists("git") {
        missing.push(MissingPrereq {
            name: "git",
            purpose: "fetching the service's compose definition",
            install_hint: "zypper install git | apt install git | dnf install git | pacman -S git",
        });
    }

    missing
}

/// Format a list of missing prerequisites into a user-friendly error message.
pub fn format_missing(missing: &[MissingPrereq]) -> String {
    use std::fmt::Write as _;
    let mut msg = String::from("missing prerequisites:\n");
    for m in missing {
        let _ = writeln!(msg, "{m}");
    }
    msg.push_str("\nAkshara requires these tools to run the transliteration service locally.");
    msg
}
