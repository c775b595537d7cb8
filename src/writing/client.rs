use super::{fill_template, format_source, render_failed, write_comment_header, write_doc};
use crate::context::GenerationContext;
use crate::error::GenError;
use std::fmt::Write;

const CLIENT_TEMPLATE: &str = include_str!("client.rs.tmpl");

/// `client.rs` of the generated SDK: the client, its error type and one
/// service handle per tag
pub fn render_client(ctx: &GenerationContext) -> Result<String, GenError> {
    let mut accessors = String::new();
    let mut services = String::new();
    write_services(ctx, &mut accessors, &mut services).map_err(render_failed("client.rs"))?;

    let mut out = String::new();
    write_comment_header(&mut out, "API client").map_err(render_failed("client.rs"))?;
    out.push_str(&fill_template(
        "client.rs",
        CLIENT_TEMPLATE,
        &[
            ("SERVER_URL", format!("{:?}", ctx.config.base_url)),
            ("TOKEN_ENV_VAR", format!("{:?}", ctx.config.token_env_variable)),
            ("TIMEOUT_SECS", ctx.config.request_timeout_secs.to_string()),
            ("ACCESSORS", accessors),
            ("SERVICES", services),
        ],
    )?);
    format_source("client.rs", &out)
}

fn write_services(ctx: &GenerationContext, accessors: &mut String, services: &mut String) -> std::fmt::Result {
    for service in ctx.services.values() {
        writeln!(accessors)?;
        match service.description.as_str() {
            "" => writeln!(accessors, "    /// Methods of [`{}`]", service.name)?,
            description => write_doc(accessors, "    ", description)?,
        }
        writeln!(accessors, "    pub fn {}(&self) -> {} {{", service.accessor, service.name)?;
        writeln!(accessors, "        {} {{ client: self.clone() }}", service.name)?;
        writeln!(accessors, "    }}")?;

        writeln!(services)?;
        match service.description.as_str() {
            "" => writeln!(services, "/// {}", service.name)?,
            description => write_doc(services, "", description)?,
        }
        writeln!(services, "#[derive(Debug, Clone)]")?;
        writeln!(services, "pub struct {} {{", service.name)?;
        writeln!(services, "    pub(crate) client: Client,")?;
        writeln!(services, "}}")?;
    }
    Ok(())
}
