use super::{colorize_state, json_pretty, CliError, EXIT_SUCCESS};
use akshara_core::{Context, ManagerBuilder};

pub fn run(builder: ManagerBuilder, ctx: &Context, json: bool) -> Result<u8, CliError> {
    let manager = builder.build()?;
    let status = manager.status(ctx)?;

    if json {
        let payload = serde_json::json!({
            "project": status.project,
            "backend": manager.backend_name(),
            "running": status.running,
            "ready": status.all_ready(&manager.spec().services),
            "base_url": manager.base_url(),
            "services": status.services,
        });
        println!("{}", json_pretty(&payload)?);
        return Ok(EXIT_SUCCESS);
    }

    let overall = if status.running { "running" } else { "exited" };
    println!("project: {} ({})", status.project, colorize_state(overall));
    println!("endpoint: {}", manager.base_url());
    if status.services.is_empty() {
        println!("no containers found");
    } else {
        println!("{:<12} {:<12} HEALTH", "SERVICE", "STATE");
        for svc in &status.services {
            println!(
                "{:<12} {:<12} {}",
                svc.name,
                colorize_state(&svc.state),
                svc.health.as_deref().unwrap_or("-")
            );
        }
    }
    Ok(EXIT_SUCCESS)
}
