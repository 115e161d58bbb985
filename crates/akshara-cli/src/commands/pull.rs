use super::{json_pretty, spin_fail, spin_ok, with_pull_progress, CliError, EXIT_SUCCESS};
use akshara_core::{Context, ManagerBuilder};

pub fn run(builder: ManagerBuilder, ctx: &Context, json: bool) -> Result<u8, CliError> {
    let (builder, pb) = if json {
        (builder, None)
    } else {
        let (builder, pb) = with_pull_progress(builder);
        pb.set_message("pulling images...");
        (builder, Some(pb))
    };
    let manager = builder.build()?;

    if let Err(e) = manager.pull_images(ctx) {
        if let Some(ref pb) = pb {
            spin_fail(pb, "pull failed");
        }
        return Err(e.into());
    }
    if let Some(ref pb) = pb {
        spin_ok(pb, "images up to date");
    }

    if json {
        let payload = serde_json::json!({
            "project": manager.project(),
            "pulled": true,
        });
        println!("{}", json_pretty(&payload)?);
    }
    Ok(EXIT_SUCCESS)
}
