use super::{format_source, render_failed, write_comment_header, write_doc};
use crate::context::GenerationContext;
use crate::datatypes::{Builtin, TypeRef};
use crate::error::GenError;
use crate::openapi::ParameterLocation;
use crate::operations::{BodyKind, MethodParam, MethodUnit, Pagination, ResponseKind, path_placeholders};
use std::fmt::{Result, Write};

const TYPES: &str = "crate::types::";
const INDENT: &str = "    ";
const INDENT2: &str = "        ";

/// `paths.rs` of the generated SDK: the methods of every service
pub fn render_paths(ctx: &GenerationContext) -> std::result::Result<String, GenError> {
    let mut out = String::new();
    write_paths(&mut out, ctx).map_err(render_failed("paths.rs"))?;
    format_source("paths.rs", &out)
}

fn write_paths(out: &mut String, ctx: &GenerationContext) -> Result {
    write_comment_header(out, "API methods")?;
    for service in ctx.services.values() {
        writeln!(out, "impl crate::client::{} {{", service.name)?;
        for method in service.methods.values() {
            write_method(out, ctx, method)?;
        }
        writeln!(out, "}}\n")?;
    }
    Ok(())
}

fn write_method(out: &mut String, ctx: &GenerationContext, method: &MethodUnit) -> Result {
    write_doc(out, INDENT, &method.docs.join("\n"))?;

    let mut args = vec!["&self".to_owned()];
    for param in method.arguments() {
        args.push(format!("{}: {}", param.rust_name, param_type(param)));
    }
    if let Some(body) = &method.body {
        match &body.kind {
            BodyKind::Json(t) => args.push(format!("{}: &{}", body.arg, t.to_rust(TYPES))),
            BodyKind::Raw { .. } => args.push(format!("{}: bytes::Bytes", body.arg)),
        }
    }
    let returns = match &method.response {
        ResponseKind::Empty => "()".to_owned(),
        ResponseKind::Json(t) => t.to_rust(TYPES),
        ResponseKind::Raw => "bytes::Bytes".to_owned(),
    };
    writeln!(
        out,
        "{INDENT}pub async fn {}({}) -> Result<{returns}, crate::client::Error> {{",
        method.name,
        args.join(", ")
    )?;
    match &method.pagination {
        Some(pagination) => write_all_pages_body(out, ctx, method, pagination)?,
        None => write_request_body(out, ctx, method)?,
    }
    writeln!(out, "{INDENT}}}\n")
}

fn param_type(param: &MethodParam) -> String {
    let t = param.type_.to_rust(TYPES);
    if param.required { t } else { format!("Option<{t}>") }
}

/// One request: path, query, headers, body, send
fn write_request_body(out: &mut String, ctx: &GenerationContext, method: &MethodUnit) -> Result {
    let placeholders = path_placeholders(&method.path);
    if placeholders.is_empty() {
        writeln!(out, "{INDENT2}let url_path = {:?};", method.path)?;
    } else {
        let mut template = method.path.clone();
        let mut values = vec![];
        for placeholder in &placeholders {
            template = template.replacen(&format!("{{{placeholder}}}"), "{}", 1);
            let Some(param) = method.params.iter().find(|p| {
                p.location == ParameterLocation::Path && p.name == *placeholder
            }) else {
                continue;
            };
            values.push(format!(
                "crate::client::encode_path(&{})",
                value_expr(ctx, &param.type_, &param.rust_name, false)
            ));
        }
        writeln!(
            out,
            "{INDENT2}let url_path = format!({template:?}, {});",
            values.join(", ")
        )?;
    }

    let query: Vec<&MethodParam> = method
        .params
        .iter()
        .filter(|p| p.location == ParameterLocation::Query)
        .collect();
    let headers: Vec<&MethodParam> = method
        .params
        .iter()
        .filter(|p| p.location == ParameterLocation::Header)
        .collect();
    let mutable = !query.is_empty() || !headers.is_empty() || method.body.is_some();

    writeln!(
        out,
        "{INDENT2}let {}req = self.client.request(reqwest::Method::{}, &url_path);",
        if mutable { "mut " } else { "" },
        method.http_method.as_str()
    )?;

    if !query.is_empty() {
        writeln!(out, "{INDENT2}let mut query_pairs: Vec<(&str, String)> = Vec::new();")?;
        for param in &query {
            write_optional(out, param, |var, by_ref| {
                format!(
                    "query_pairs.push(({:?}, {}));",
                    param.name,
                    value_expr(ctx, &param.type_, var, by_ref)
                )
            })?;
        }
        writeln!(out, "{INDENT2}req = req.query(&query_pairs);")?;
    }
    for param in &headers {
        write_optional(out, param, |var, by_ref| {
            format!(
                "req = req.header({:?}, {});",
                param.name,
                value_expr(ctx, &param.type_, var, by_ref)
            )
        })?;
    }
    if let Some(body) = &method.body {
        match &body.kind {
            BodyKind::Json(_) => writeln!(out, "{INDENT2}req = req.json({});", body.arg)?,
            BodyKind::Raw { content_type } => writeln!(
                out,
                "{INDENT2}req = req.header(reqwest::header::CONTENT_TYPE, {content_type:?}).body({});",
                body.arg
            )?,
        }
    }

    let send = match method.response {
        ResponseKind::Empty => "send_empty",
        ResponseKind::Json(_) => "send_json",
        ResponseKind::Raw => "send_raw",
    };
    writeln!(out, "{INDENT2}self.client.{send}(req).await")
}

/// Writes `statement` for the parameter, wrapped in `if let Some` when it is
/// optional
fn write_optional(out: &mut String, param: &MethodParam, statement: impl Fn(&str, bool) -> String) -> Result {
    if param.required {
        writeln!(out, "{INDENT2}{}", statement(&param.rust_name, false))
    } else {
        writeln!(out, "{INDENT2}if let Some(value) = &{} {{", param.rust_name)?;
        writeln!(out, "{INDENT2}{INDENT}{}", statement("value", true))?;
        writeln!(out, "{INDENT2}}}")
    }
}

/// String form of a parameter value for the query string, a header or a
/// path segment
fn value_expr(ctx: &GenerationContext, type_: &TypeRef, var: &str, by_ref: bool) -> String {
    let json = || {
        if by_ref {
            format!("serde_json::to_string({var}).unwrap_or_default()")
        } else {
            format!("serde_json::to_string(&{var}).unwrap_or_default()")
        }
    };
    match type_ {
        TypeRef::Builtin(Builtin::DateTime) => format!("{var}.to_rfc3339()"),
        TypeRef::Builtin(Builtin::Any | Builtin::Bytes) | TypeRef::Map(_) => json(),
        TypeRef::Builtin(_) => format!("{var}.to_string()"),
        TypeRef::Vec(inner) if is_displayable(ctx, inner) => format!(
            "{var}.iter().map(|item| item.to_string()).collect::<Vec<_>>().join(\",\")"
        ),
        TypeRef::Vec(_) => json(),
        TypeRef::Named { name, .. } if ctx.is_enum(name) => format!("{var}.to_string()"),
        TypeRef::Named { .. } => json(),
    }
}

fn is_displayable(ctx: &GenerationContext, type_: &TypeRef) -> bool {
    match type_ {
        TypeRef::Builtin(Builtin::Any | Builtin::Bytes) => false,
        TypeRef::Builtin(_) => true,
        TypeRef::Named { name, .. } => ctx.is_enum(name),
        TypeRef::Vec(_) | TypeRef::Map(_) => false,
    }
}

/// Delegates to the base method through the runtime page collector
fn write_all_pages_body(out: &mut String, ctx: &GenerationContext, method: &MethodUnit, pagination: &Pagination) -> Result {
    let mut call_args = vec![];
    for param in &method.params {
        let arg = match param.name.as_str() {
            "page_token" if param.required => "page_token.unwrap_or_default()".to_owned(),
            "page_token" => "page_token".to_owned(),
            "limit" => {
                let cast = match &param.type_ {
                    TypeRef::Builtin(Builtin::Integer(_) | Builtin::Number) => {
                        format!("limit as {}", param.type_.to_rust(TYPES))
                    }
                    _ => "limit.to_string()".to_owned(),
                };
                if param.required { cast } else { format!("Some({cast})") }
            }
            _ => param.rust_name.clone(),
        };
        call_args.push(arg);
    }
    if let Some(body) = &method.body {
        call_args.push(body.arg.clone());
    }

    let items = if pagination.items_optional {
        format!("page.{}.unwrap_or_default()", pagination.items_field)
    } else {
        format!("page.{}", pagination.items_field)
    };
    let next_page = if pagination.next_page_optional {
        format!("page.{}", pagination.next_page_field)
    } else {
        format!("Some(page.{})", pagination.next_page_field)
    };

    writeln!(
        out,
        "{INDENT2}crate::pagination::collect_all_pages({}, |page_token, limit| {{",
        ctx.config.page_size
    )?;
    for param in method.arguments() {
        writeln!(out, "{INDENT2}{INDENT}let {0} = {0}.clone();", param.rust_name)?;
    }
    if let Some(body) = &method.body
        && matches!(body.kind, BodyKind::Raw { .. })
    {
        writeln!(out, "{INDENT2}{INDENT}let {0} = {0}.clone();", body.arg)?;
    }
    writeln!(out, "{INDENT2}{INDENT}async move {{")?;
    writeln!(
        out,
        "{INDENT2}{INDENT2}let page = self.{}({}).await?;",
        pagination.base,
        call_args.join(", ")
    )?;
    writeln!(out, "{INDENT2}{INDENT2}Ok(({items}, {next_page}))")?;
    writeln!(out, "{INDENT2}{INDENT}}}")?;
    writeln!(out, "{INDENT2}}})")?;
    writeln!(out, "{INDENT2}.await")
}
