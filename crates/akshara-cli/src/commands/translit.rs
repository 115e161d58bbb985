use super::{json_pretty, CliError, EXIT_SUCCESS};
use akshara_core::{Context, ManagerBuilder, Script, TranslitOptions};

pub struct Request<'a> {
    pub text: &'a str,
    pub from: Option<&'a str>,
    pub to: &'a str,
    pub no_nativize: bool,
    pub pre_options: &'a [String],
    pub post_options: &'a [String],
}

impl Request<'_> {
    fn options(&self) -> TranslitOptions {
        TranslitOptions {
            nativize: !self.no_nativize,
            pre_options: self.pre_options.to_vec(),
            post_options: self.post_options.to_vec(),
        }
    }
}

pub fn run(
    builder: ManagerBuilder,
    ctx: &Context,
    req: &Request<'_>,
    json: bool,
) -> Result<u8, CliError> {
    let manager = builder.build()?;
    let from = req.from.map(Script::new);
    let to = Script::new(req.to);
    manager.validate_request(req.text, from.as_ref(), &to)?;

    manager.init_quiet(ctx)?;
    let result = manager.translit(ctx, req.text, from.as_ref(), &to, &req.options())?;

    if json {
        let payload = serde_json::json!({
            "text": req.text,
            "from": req.from,
            "to": req.to,
            "result": result,
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!("{result}");
    }
    Ok(EXIT_SUCCESS)
}
