use super::{json_pretty, CliError, EXIT_SUCCESS};
use akshara_core::{Context, ManagerBuilder};

pub fn run(builder: ManagerBuilder, ctx: &Context, json: bool) -> Result<u8, CliError> {
    let manager = builder.build()?;
    manager.stop(ctx)?;
    if json {
        let payload = serde_json::json!({
            "project": manager.project(),
            "stopped": true,
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!("stopped {}", manager.project());
    }
    Ok(EXIT_SUCCESS)
}
