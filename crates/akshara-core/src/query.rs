use crate::CoreError;
use akshara_runtime::{CancelReason, Context};
use akshara_schema::{Script, ScriptRegistry, TranslitOptions};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Issues transliteration requests against a running service endpoint.
///
/// Every input is validated against the [`ScriptRegistry`] before the network
/// is touched. The HTTP call itself runs on a worker thread under
/// [`Context::run_blocking`], so a canceled context returns without waiting
/// for the service to answer.
#[derive(Clone)]
pub struct QueryClient {
    registry: Arc<dyn ScriptRegistry>,
    agent: ureq::Agent,
    timeout: Duration,
}

impl QueryClient {
    pub fn new(registry: Arc<dyn ScriptRegistry>, timeout: Duration) -> Self {
        // Traffic to the local service must not be routed through *_PROXY.
        let config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .proxy(None)
            .build();
        Self {
            registry,
            agent: ureq::Agent::new_with_config(config),
            timeout,
        }
    }

    pub fn registry(&self) -> &dyn ScriptRegistry {
        self.registry.as_ref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Validate and send one request.
    ///
    /// The request is bounded by the client timeout and by `ctx`, whichever
    /// ends first. Either bound running out is reported as
    /// `Canceled(DeadlineExceeded)`, so callers see one error for "took too
    /// long" whether or not they set a deadline themselves.
    pub fn transliterate(
        &self,
        ctx: &Context,
        base_url: &str,
        text: &str,
        from: Option<&Script>,
        to: &Script,
        opts: &TranslitOptions,
    ) -> Result<String, CoreError> {
        self.validate(text, from, to)?;
        let params = build_query(text, from, to, opts);
        self.send(ctx, base_url, params)
    }

    /// Check a request's inputs without sending it. An empty `from` means
    /// auto-detection and is always accepted.
    pub fn validate(
        &self,
        text: &str,
        from: Option<&Script>,
        to: &Script,
    ) -> Result<(), CoreError> {
        if text.is_empty() {
            return Err(CoreError::EmptyInput);
        }
        if let Some(source) = from.filter(|s| !s.is_empty()) {
            if !self.registry.is_valid_script(source) {
                return Err(CoreError::InvalidSourceScript(source.to_string()));
            }
        }
        if !self.registry.is_valid_script(to) {
            return Err(CoreError::InvalidTargetScript(to.to_string()));
        }
        Ok(())
    }

    /// Romanize `text` written in the primary script of `language_code`.
    pub fn romanize(
        &self,
        ctx: &Context,
        base_url: &str,
        text: &str,
        language_code: &str,
        opts: &TranslitOptions,
    ) -> Result<String, CoreError> {
        let source = self.registry.default_script_for(language_code)?;
        let target = self.registry.romanization_scheme_for(&source)?;
        debug!("romanizing {language_code} as {source} -> {target}");
        self.transliterate(ctx, base_url, text, Some(&source), &target, opts)
    }

    fn send(
        &self,
        ctx: &Context,
        url: &str,
        params: Vec<(&'static str, String)>,
    ) -> Result<String, CoreError> {
        ctx.check()?;
        let timeout = ctx
            .remaining()
            .map_or(self.timeout, |left| left.min(self.timeout));
        debug!("GET {url} ({} params, timeout {timeout:?})", params.len());

        let agent = self.agent.clone();
        let target = url.to_owned();
        ctx.run_blocking(move || request(&agent, &target, &params, timeout))?
    }
}

fn request(
    agent: &ureq::Agent,
    url: &str,
    params: &[(&'static str, String)],
    timeout: Duration,
) -> Result<String, CoreError> {
    let mut req = agent
        .get(url)
        .config()
        .timeout_global(Some(timeout))
        .build();
    for (key, value) in params {
        req = req.query(key, value);
    }

    let mut resp = match req.call() {
        Ok(resp) => resp,
        Err(ureq::Error::Timeout(_)) => {
            return Err(CoreError::Canceled(CancelReason::DeadlineExceeded))
        }
        Err(e) => {
            return Err(CoreError::Transport {
                url: url.to_owned(),
                message: e.to_string(),
            })
        }
    };

    let status = resp.status().as_u16();
    if status != 200 {
        return Err(CoreError::Backend { status });
    }

    let body = resp
        .body_mut()
        .read_to_string()
        .map_err(|e| CoreError::Transport {
            url: url.to_owned(),
            message: e.to_string(),
        })?;
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err(CoreError::EmptyResult);
    }
    Ok(trimmed.to_owned())
}

/// The ordered query parameters for one transliteration request.
///
/// `nativize` only appears when it is turned off, and option lists only when
/// they are non-empty.
pub fn build_query(
    text: &str,
    from: Option<&Script>,
    to: &Script,
    opts: &TranslitOptions,
) -> Vec<(&'static str, String)> {
    let mut params = vec![("text", text.to_owned()), ("target", to.to_string())];
    if let Some(source) = from.filter(|s| !s.is_empty()) {
        params.push(("source", source.to_string()));
    }
    if !opts.nativize {
        params.push(("nativize", "false".to_owned()));
    }
    if !opts.pre_options.is_empty() {
        params.push(("preoptions", opts.pre_options.join(",")));
    }
    if !opts.post_options.is_empty() {
        params.push(("postoptions", opts.post_options.join(",")));
    }
    params
}
