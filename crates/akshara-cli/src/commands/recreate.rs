use super::{json_pretty, spin_fail, spin_ok, with_pull_progress, CliError, EXIT_SUCCESS};
use akshara_core::{Context, ManagerBuilder};

pub fn run(
    builder: ManagerBuilder,
    ctx: &Context,
    latest: bool,
    json: bool,
) -> Result<u8, CliError> {
    let (builder, pb) = if json {
        (builder, None)
    } else {
        let (builder, pb) = with_pull_progress(builder);
        pb.set_message("recreating service...");
        (builder, Some(pb))
    };
    let manager = builder.build()?;

    if let Err(e) = manager.recreate(ctx, latest) {
        if let Some(ref pb) = pb {
            spin_fail(pb, "recreate failed");
        }
        return Err(e.into());
    }
    if let Some(ref pb) = pb {
        spin_ok(pb, "service recreated");
    }

    if json {
        let payload = serde_json::json!({
            "project": manager.project(),
            "state": manager.state(),
            "pulled_latest": latest,
            "base_url": manager.base_url(),
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!("recreated {} at {}", manager.project(), manager.base_url());
    }
    Ok(EXIT_SUCCESS)
}
