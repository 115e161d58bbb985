use super::{CliError, EXIT_FAILURE, EXIT_SUCCESS};
use akshara_core::{Context, ManagerBuilder, ServiceManager};
use akshara_runtime::{format_missing, ProjectLock};
use akshara_schema::default_settings_path;

pub fn run(builder: ManagerBuilder, ctx: &Context, json_output: bool) -> Result<u8, CliError> {
    let manager = builder.build()?;
    let mut checks: Vec<Check> = Vec::new();
    let mut all_pass = true;

    check_prereqs(&manager, &mut checks, &mut all_pass);
    check_settings(&mut checks);
    check_checkout(&manager, &mut checks);
    check_lock(&manager, &mut checks, &mut all_pass);
    check_service(&manager, ctx, &mut checks);

    print_results(&checks, all_pass, json_output)
}

fn check_prereqs(manager: &ServiceManager, checks: &mut Vec<Check>, all_pass: &mut bool) {
    let missing = manager.missing_prereqs();
    if missing.is_empty() {
        checks.push(Check::pass(
            "backend_prereqs",
            &format!("Prerequisites for the {} backend satisfied", manager.backend_name()),
        ));
    } else {
        *all_pass = false;
        checks.push(Check::fail(
            "backend_prereqs",
            &format!("Missing prerequisites: {}", format_missing(&missing)),
        ));
    }
}

fn check_settings(checks: &mut Vec<Check>) {
    match default_settings_path() {
        Some(path) if path.exists() => checks.push(Check::pass(
            "settings",
            &format!("Settings loaded from {}", path.display()),
        )),
        Some(path) => checks.push(Check::info(
            "settings",
            &format!("No settings file at {} (using defaults)", path.display()),
        )),
        None => checks.push(Check::info(
            "settings",
            "No config directory found (using defaults)",
        )),
    }
}

fn check_checkout(manager: &ServiceManager, checks: &mut Vec<Check>) {
    let compose = manager.spec().compose_path();
    if compose.exists() {
        checks.push(Check::pass(
            "compose_checkout",
            &format!("Compose definition present at {}", compose.display()),
        ));
    } else {
        checks.push(Check::info(
            "compose_checkout",
            "Compose definition not fetched yet (will be cloned on first init)",
        ));
    }
}

fn check_lock(manager: &ServiceManager, checks: &mut Vec<Check>, all_pass: &mut bool) {
    match ProjectLock::try_acquire(manager.lock_dir(), manager.project()) {
        Ok(Some(_)) => checks.push(Check::pass("project_lock", "Project lock is free")),
        Ok(None) => checks.push(Check::warn(
            "project_lock",
            "Project lock is held by another process",
        )),
        Err(e) => {
            *all_pass = false;
            checks.push(Check::fail(
                "project_lock",
                &format!("Cannot check project lock: {e}"),
            ));
        }
    }
}

fn check_service(manager: &ServiceManager, ctx: &Context, checks: &mut Vec<Check>) {
    match manager.status(ctx) {
        Ok(status) if status.all_ready(&manager.spec().services) => checks.push(Check::pass(
            "service",
            &format!("Service ready at {}", manager.base_url()),
        )),
        Ok(status) if status.running => checks.push(Check::warn(
            "service",
            "Service containers are running but not all are healthy",
        )),
        Ok(_) => checks.push(Check::info(
            "service",
            "Service is not running (start it with `akshara init`)",
        )),
        Err(e) => checks.push(Check::warn(
            "service",
            &format!("Cannot query service status: {e}"),
        )),
    }
}

fn print_results(checks: &[Check], all_pass: bool, json_output: bool) -> Result<u8, CliError> {
    if json_output {
        let json = serde_json::json!({
            "healthy": all_pass,
            "checks": checks.iter().map(|c| serde_json::json!({
                "name": c.name,
                "status": c.status,
                "message": c.message,
            })).collect::<Vec<_>>(),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&json).map_err(|e| e.to_string())?
        );
    } else {
        println!("Akshara Doctor\n");
        for check in checks {
            let icon = match check.status {
                "pass" => "✓",
                "fail" => "✗",
                "warn" => "⚠",
                _ => "ℹ",
            };
            println!("  {icon} {}", check.message);
        }
        println!();
        if all_pass {
            println!("All checks passed.");
        } else {
            println!("Some checks failed. See above for details.");
        }
    }
    Ok(if all_pass { EXIT_SUCCESS } else { EXIT_FAILURE })
}

struct Check {
    name: &'static str,
    status: &'static str,
    message: String,
}

impl Check {
    fn new(name: &'static str, status: &'static str, message: &str) -> Self {
        Self {
            name,
            status,
            message: message.to_owned(),
        }
    }

    fn pass(name: &'static str, message: &str) -> Self {
        Self::new(name, "pass", message)
    }

    fn fail(name: &'static str, message: &str) -> Self {
        Self::new(name, "fail", message)
    }

    fn warn(name: &'static str, message: &str) -> Self {
        Self::new(name, "warn", message)
    }

    fn info(name: &'static str, message: &str) -> Self {
        Self::new(name, "info", message)
    }
}
