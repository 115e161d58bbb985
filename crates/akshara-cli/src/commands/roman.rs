use super::{json_pretty, CliError, EXIT_SUCCESS};
use akshara_core::{Context, CoreError, ManagerBuilder, TranslitOptions};

pub fn run(
    builder: ManagerBuilder,
    ctx: &Context,
    text: &str,
    lang: &str,
    json: bool,
) -> Result<u8, CliError> {
    let manager = builder.build()?;

    let registry = manager.registry();
    let source = registry.default_script_for(lang).map_err(CoreError::from)?;
    let target = registry
        .romanization_scheme_for(&source)
        .map_err(CoreError::from)?;

    manager.init_quiet(ctx)?;
    let result = manager.roman(ctx, text, lang, &TranslitOptions::default())?;

    if json {
        let payload = serde_json::json!({
            "text": text,
            "lang": lang,
            "from": source,
            "to": target,
            "result": result,
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!("{result}");
    }
    Ok(EXIT_SUCCESS)
}
