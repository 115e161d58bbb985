use super::{json_pretty, CliError, EXIT_SUCCESS};
use akshara_core::CoreError;
use akshara_schema::{normalize_language, ScriptCatalog, ScriptRegistry, BUILTIN_SCRIPTS};

pub fn run(lang: Option<&str>, json: bool) -> Result<u8, CliError> {
    let catalog = ScriptCatalog::builtin();
    match lang {
        Some(code) => language(catalog, code, json),
        None => {
            if json {
                println!("{}", json_pretty(&BUILTIN_SCRIPTS)?);
            } else {
                for script in BUILTIN_SCRIPTS {
                    println!("{script}");
                }
            }
            Ok(EXIT_SUCCESS)
        }
    }
}

fn language(catalog: &ScriptCatalog, code: &str, json: bool) -> Result<u8, CliError> {
    let scripts = catalog.scripts_for(code).map_err(CoreError::from)?;
    let normalized = normalize_language(code).unwrap_or_else(|| code.to_owned());
    let romanization = scripts
        .first()
        .and_then(|primary| catalog.romanization_scheme_for(primary).ok());

    if json {
        let payload = serde_json::json!({
            "language": normalized,
            "scripts": scripts,
            "romanization": romanization,
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!("language: {normalized}");
        for (i, script) in scripts.iter().enumerate() {
            let marker = if i == 0 { " (primary)" } else { "" };
            println!("  {script}{marker}");
        }
        match romanization {
            Some(scheme) => println!("romanization: {scheme}"),
            None => println!("romanization: none"),
        }
    }
    Ok(EXIT_SUCCESS)
}
