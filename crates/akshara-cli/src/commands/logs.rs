use super::{CliError, EXIT_SUCCESS};
use akshara_core::{Context, ManagerBuilder};

pub fn run(builder: ManagerBuilder, ctx: &Context, tail: usize) -> Result<u8, CliError> {
    let manager = builder.build()?;
    let logs = manager.logs(ctx, tail)?;
    print!("{logs}");
    if !logs.is_empty() && !logs.ends_with('\n') {
        println!();
    }
    Ok(EXIT_SUCCESS)
}
