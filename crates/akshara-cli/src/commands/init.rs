use super::{json_pretty, spin_fail, spin_ok, spinner, CliError, EXIT_SUCCESS};
use akshara_core::{Context, ManagerBuilder};

pub fn run(builder: ManagerBuilder, ctx: &Context, quiet: bool, json: bool) -> Result<u8, CliError> {
    let manager = builder.build()?;

    let pb = (!json && !quiet).then(|| spinner("starting transliteration service..."));
    let result = if quiet {
        manager.init_quiet(ctx)
    } else {
        manager.init(ctx)
    };
    if let Err(e) = result {
        if let Some(ref pb) = pb {
            spin_fail(pb, "service failed to start");
        }
        return Err(e.into());
    }
    if let Some(ref pb) = pb {
        spin_ok(pb, "service ready");
    }

    if json {
        let payload = serde_json::json!({
            "project": manager.project(),
            "backend": manager.backend_name(),
            "state": manager.state(),
            "base_url": manager.base_url(),
        });
        println!("{}", json_pretty(&payload)?);
    } else if !quiet {
        println!("{} ready at {}", manager.project(), manager.base_url());
    }
    Ok(EXIT_SUCCESS)
}
