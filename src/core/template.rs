//! Template/merge engine.
//!
//! Parses human-authored env templates, resolves `{vault:key}` placeholders
//! against configured vaults, and re-emits the text with every
//! non-placeholder line reproduced byte-for-byte. Missing secrets are
//! handled by a caller-selected strategy; an overlay template can be
//! layered on a shared base; `--all` appends each touched vault's
//! unreferenced keys.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::core::context::Context;
use crate::core::validation::is_key_name;
use crate::core::vaults::VaultPool;
use crate::error::{Error, NotFoundError, Result};

/// A placeholder referencing a vault and, optionally, an explicit key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    vault: String,
    key: Option<String>,
}

impl Placeholder {
    /// The referenced vault slug.
    pub fn vault(&self) -> &str {
        &self.vault
    }

    /// The key to resolve; `{vault}` alone implies the assignment name.
    pub fn key_for<'a>(&'a self, name: &'a str) -> &'a str {
        self.key.as_deref().unwrap_or(name)
    }
}

/// One template line.
#[derive(Debug, Clone)]
pub enum Line {
    /// Comment, blank line, or non-placeholder assignment; reproduced
    /// verbatim in env output.
    Literal(String),
    /// `NAME = {vault:key}` shaped assignment.
    Assignment {
        name: String,
        placeholder: Placeholder,
        /// The original line text, for the `skip` strategy.
        raw: String,
    },
}

/// Parsed template: an ordered sequence of lines.
#[derive(Debug, Default)]
pub struct Template {
    lines: Vec<Line>,
}

impl Template {
    /// Parse template text.
    ///
    /// Parsing never fails: any line that does not have the assignment
    /// shape is kept as a literal.
    pub fn parse(text: &str) -> Self {
        let lines = text.lines().map(parse_line).collect();
        Self { lines }
    }

    /// Parse a template file.
    ///
    /// # Errors
    ///
    /// Returns `NotFoundError::Template` when the file does not exist.
    pub fn from_file(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => Ok(Self::parse(&text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(NotFoundError::Template(path.display().to_string()).into())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Lines in order.
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Append another template's lines after a separator comment.
    pub fn append_overlay(&mut self, overlay: Template, label: &str) {
        self.lines.push(Line::Literal(format!("# overlay: {}", label)));
        self.lines.extend(overlay.lines);
    }

    /// Distinct vault slugs referenced by placeholders, sorted.
    pub fn referenced_vaults(&self) -> Vec<String> {
        let set: BTreeSet<&str> = self
            .lines
            .iter()
            .filter_map(|line| match line {
                Line::Assignment { placeholder, .. } => Some(placeholder.vault()),
                Line::Literal(_) => None,
            })
            .collect();
        set.into_iter().map(str::to_string).collect()
    }

    /// Keys this template resolves against one vault.
    pub fn referenced_keys(&self, vault: &str) -> BTreeSet<String> {
        self.lines
            .iter()
            .filter_map(|line| match line {
                Line::Assignment {
                    name, placeholder, ..
                } if placeholder.vault() == vault => {
                    Some(placeholder.key_for(name).to_string())
                }
                _ => None,
            })
            .collect()
    }
}

fn parse_line(line: &str) -> Line {
    let literal = || Line::Literal(line.to_string());

    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return literal();
    }

    let Some((name_part, rest)) = trimmed.split_once('=') else {
        return literal();
    };
    let name = name_part.trim();
    if !is_key_name(name) {
        return literal();
    }

    let Some(token) = placeholder_token(rest.trim()) else {
        return literal();
    };
    let Some(placeholder) = parse_placeholder(token) else {
        return literal();
    };

    Line::Assignment {
        name: name.to_string(),
        placeholder,
        raw: line.to_string(),
    }
}

/// Extract the value token from the right-hand side of an assignment,
/// stripping optional quotes and a trailing comment.
fn placeholder_token(rest: &str) -> Option<&str> {
    for quote in ['"', '\''] {
        if let Some(inner) = rest.strip_prefix(quote) {
            let (token, after) = inner.split_once(quote)?;
            let after = after.trim();
            if after.is_empty() || after.starts_with('#') {
                return Some(token.trim());
            }
            return None;
        }
    }

    let token = match rest.find('#') {
        Some(idx) => rest[..idx].trim(),
        None => rest,
    };
    Some(token)
}

fn parse_placeholder(token: &str) -> Option<Placeholder> {
    let inner = token.strip_prefix('{')?.strip_suffix('}')?;
    if inner.contains(['{', '}']) || inner.chars().any(char::is_whitespace) {
        return None;
    }

    let (vault, key) = match inner.split_once(':') {
        Some((vault, key)) => (vault, Some(key)),
        None => (inner, None),
    };
    if vault.is_empty() || key.is_some_and(str::is_empty) {
        return None;
    }

    Some(Placeholder {
        vault: vault.to_string(),
        key: key.map(str::to_string),
    })
}

/// What to do when a placeholder has no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingValue {
    /// Abort the whole render, listing every unresolved placeholder.
    #[default]
    Fail,
    /// Drop the assignment, leaving a comment naming the removed key.
    Remove,
    /// Keep the assignment with an empty value.
    Blank,
    /// Reproduce the original placeholder line unchanged.
    Skip,
}

/// Serialization format for rendered output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Line-by-line env text preserving the template's structure.
    #[default]
    Env,
    /// Resolved pairs only, as a pretty-printed JSON object.
    Json,
}

/// Render-time options.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Environment every referenced vault is resolved at.
    pub environment: String,
    /// Missing-value strategy.
    pub missing: MissingValue,
    /// Explicit vault list; replaces placeholder auto-discovery entirely.
    pub vaults: Option<Vec<String>>,
    /// Append each touched vault's unreferenced keys.
    pub include_all: bool,
}

/// Render result, serializable as env text or JSON.
#[derive(Debug)]
pub struct Rendered {
    lines: Vec<String>,
    resolved: BTreeMap<String, String>,
}

impl Rendered {
    /// Env-format text: the line structure of the template, with a
    /// trailing newline.
    pub fn to_env(&self) -> String {
        if self.lines.is_empty() {
            return String::new();
        }
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }

    /// JSON object of resolved pairs, keys sorted, pretty-printed, with a
    /// trailing newline. Literal and comment lines are discarded.
    pub fn to_json(&self) -> Result<String> {
        let mut out = serde_json::to_string_pretty(&self.resolved)?;
        out.push('\n');
        Ok(out)
    }

    /// Serialize in the requested format.
    pub fn serialize(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Env => Ok(self.to_env()),
            OutputFormat::Json => self.to_json(),
        }
    }

    /// Resolved name/value pairs.
    pub fn resolved(&self) -> &BTreeMap<String, String> {
        &self.resolved
    }
}

/// Render a template against the pool.
///
/// Vaults are auto-discovered from placeholders unless `options.vaults`
/// overrides the discovery; each is resolved at `options.environment`.
///
/// # Errors
///
/// With `MissingValue::Fail`, returns `NotFoundError::Placeholders`
/// listing every unresolved placeholder and produces no partial output.
/// Backend failures (as opposed to missing secrets) abort the render.
pub fn render(pool: &VaultPool, template: &Template, options: &RenderOptions) -> Result<Rendered> {
    let touched: Vec<String> = match &options.vaults {
        Some(explicit) => explicit.clone(),
        None => template.referenced_vaults(),
    };

    let mut lines = Vec::with_capacity(template.lines().len());
    let mut resolved = BTreeMap::new();
    let mut unresolved: Vec<String> = Vec::new();

    for line in template.lines() {
        match line {
            Line::Literal(text) => lines.push(text.clone()),
            Line::Assignment {
                name,
                placeholder,
                raw,
            } => {
                let key = placeholder.key_for(name);
                let value = lookup(pool, placeholder, key, &touched, &options.environment)?;
                match value {
                    Some(value) => {
                        lines.push(format_env_line(name, &value));
                        resolved.insert(name.clone(), value);
                    }
                    None => match options.missing {
                        MissingValue::Fail => {
                            unresolved.push(format!("{}:{}", placeholder.vault(), key));
                        }
                        MissingValue::Remove => {
                            lines.push(format!("# removed missing secret: {}", key));
                        }
                        MissingValue::Blank => {
                            lines.push(format!("{}=", name));
                            resolved.insert(name.clone(), String::new());
                        }
                        MissingValue::Skip => lines.push(raw.clone()),
                    },
                }
            }
        }
    }

    if !unresolved.is_empty() {
        return Err(NotFoundError::Placeholders(unresolved).into());
    }

    if options.include_all {
        append_extras(pool, template, options, &touched, &mut lines, &mut resolved)?;
    }

    Ok(Rendered { lines, resolved })
}

/// Resolve one placeholder.
///
/// `Ok(None)` means "no value" (missing secret, unknown vault or
/// environment, or a vault excluded by an explicit filter) and triggers
/// the missing-value strategy; hard backend failures propagate.
fn lookup(
    pool: &VaultPool,
    placeholder: &Placeholder,
    key: &str,
    touched: &[String],
    environment: &str,
) -> Result<Option<String>> {
    if !touched.iter().any(|v| v == placeholder.vault()) {
        return Ok(None);
    }

    let context = Context::new(placeholder.vault(), environment);
    let driver = match pool.resolve(&context) {
        Ok(driver) => driver,
        Err(Error::NotFound(_)) => return Ok(None),
        Err(e) => return Err(e),
    };

    match driver.get(key, environment) {
        Ok(secret) => Ok(Some(secret.value().to_string())),
        Err(Error::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Append each touched vault's unreferenced keys as a distinct section.
///
/// Template output is meant for direct consumption, so extras use real
/// values, never masked ones.
fn append_extras(
    pool: &VaultPool,
    template: &Template,
    options: &RenderOptions,
    touched: &[String],
    lines: &mut Vec<String>,
    resolved: &mut BTreeMap<String, String>,
) -> Result<()> {
    for vault in touched {
        let context = Context::new(vault.clone(), options.environment.clone());
        let Ok(driver) = pool.resolve(&context) else {
            // auto-discovered vault that never resolved; its placeholders
            // already went through the missing-value strategy
            continue;
        };

        let referenced = template.referenced_keys(vault);
        let extras: Vec<_> = driver
            .list(&options.environment)?
            .into_iter()
            .filter(|s| !referenced.contains(s.key()))
            .collect();

        if extras.is_empty() {
            continue;
        }

        lines.push(format!("# additional secrets from {}", context));
        for secret in extras {
            lines.push(format_env_line(secret.key(), secret.value()));
            resolved.insert(secret.key().to_string(), secret.value().to_string());
        }
    }
    Ok(())
}

/// Quote set matching the env file contract: whitespace or `&#"'$`.
fn needs_quoting(value: &str) -> bool {
    value
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '&' | '#' | '"' | '\'' | '$'))
}

/// Emit `NAME=value`, double-quoting when the value needs it.
fn format_env_line(name: &str, value: &str) -> String {
    if needs_quoting(value) {
        let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
        format!("{}=\"{}\"", name, escaped)
    } else {
        format!("{}={}", name, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::driver::{MemoryDriver, VaultDriver};
    use crate::core::secret::{Capabilities, VaultRef};

    fn pool_with(vaults: &[(&str, &[(&str, &str)])]) -> VaultPool {
        let mut pool = VaultPool::new("v", vec!["dev".to_string()]);
        for (slug, secrets) in vaults {
            let driver = MemoryDriver::new(VaultRef::new(*slug, "app", Capabilities::all()));
            for (key, value) in *secrets {
                driver.set(key, value, "dev", false).unwrap();
            }
            pool.insert(Box::new(driver));
        }
        pool
    }

    fn options(missing: MissingValue) -> RenderOptions {
        RenderOptions {
            environment: "dev".to_string(),
            missing,
            vaults: None,
            include_all: false,
        }
    }

    #[test]
    fn test_parse_classifies_lines() {
        let template = Template::parse(
            "# header\n\nDB = {v:DB_URL}\nTOKEN={v}\nPLAIN=not-a-placeholder\n",
        );
        let lines = template.lines();
        assert!(matches!(lines[0], Line::Literal(_)));
        assert!(matches!(lines[1], Line::Literal(_)));
        assert!(matches!(lines[2], Line::Assignment { .. }));
        assert!(matches!(lines[3], Line::Assignment { .. }));
        assert!(matches!(lines[4], Line::Literal(_)));
    }

    #[test]
    fn test_parse_bare_vault_implies_name_as_key() {
        let template = Template::parse("TOKEN={v}\n");
        match &template.lines()[0] {
            Line::Assignment {
                name, placeholder, ..
            } => {
                assert_eq!(name, "TOKEN");
                assert_eq!(placeholder.vault(), "v");
                assert_eq!(placeholder.key_for(name), "TOKEN");
            }
            Line::Literal(_) => panic!("expected assignment"),
        }
    }

    #[test]
    fn test_parse_quoted_and_commented_placeholders() {
        let template =
            Template::parse("A = \"{v:KEY_A}\"\nB = '{v:KEY_B}'\nC = {v:KEY_C} # trailing\n");
        for line in template.lines() {
            assert!(matches!(line, Line::Assignment { .. }), "line {:?}", line);
        }
    }

    #[test]
    fn test_parse_rejects_malformed_placeholders() {
        for text in [
            "A = {}",
            "A = {v:}",
            "A = {:key}",
            "A = { v : key }",
            "A = {v:key} trailing-junk",
            "A = value",
            "2BAD = {v}",
        ] {
            let template = Template::parse(text);
            assert!(
                matches!(template.lines()[0], Line::Literal(_)),
                "expected literal for {:?}",
                text
            );
        }
    }

    #[test]
    fn test_render_resolves_and_preserves_literals() {
        let pool = pool_with(&[("v", &[("DB_URL", "postgres://db")])]);
        let template = Template::parse("# config\n\nDB = {v:DB_URL}\nSTATIC=1\n");
        let rendered = render(&pool, &template, &options(MissingValue::Fail)).unwrap();
        assert_eq!(
            rendered.to_env(),
            "# config\n\nDB=postgres://db\nSTATIC=1\n"
        );
    }

    #[test]
    fn test_render_fail_lists_all_unresolved_and_produces_nothing() {
        let pool = pool_with(&[("v", &[("DB", "x")])]);
        let template = Template::parse("DB={v:DB}\nA={v:MISSING_A}\nB={v:MISSING_B}\n");
        let err = render(&pool, &template, &options(MissingValue::Fail)).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("v:MISSING_A"));
        assert!(msg.contains("v:MISSING_B"));
    }

    #[test]
    fn test_render_blank_keeps_empty_assignment() {
        let pool = pool_with(&[("v", &[("DB", "x")])]);
        let template = Template::parse("DB={v:DB}\nMISSING={v:NONE}\n");
        let rendered = render(&pool, &template, &options(MissingValue::Blank)).unwrap();
        assert_eq!(rendered.to_env(), "DB=x\nMISSING=\n");
    }

    #[test]
    fn test_render_remove_leaves_no_braces() {
        let pool = pool_with(&[("v", &[("DB", "x")])]);
        let template = Template::parse("DB={v:DB}\nMISSING={v:NONE}\n");
        let rendered = render(&pool, &template, &options(MissingValue::Remove)).unwrap();
        let out = rendered.to_env();
        assert!(!out.contains('{'));
        assert!(out.contains("# removed missing secret: NONE"));
    }

    #[test]
    fn test_render_skip_reproduces_placeholder_text() {
        let pool = pool_with(&[("v", &[("DB", "x")])]);
        let template = Template::parse("DB={v:DB}\nMISSING = {v:NONE} # keep\n");
        let rendered = render(&pool, &template, &options(MissingValue::Skip)).unwrap();
        assert!(rendered.to_env().contains("MISSING = {v:NONE} # keep"));
    }

    #[test]
    fn test_render_quotes_values_with_specials() {
        let pool = pool_with(&[(
            "v",
            &[
                ("SPACED", "hello world"),
                ("DOLLAR", "pa$s"),
                ("PLAIN", "simple"),
            ],
        )]);
        let template = Template::parse("SPACED={v}\nDOLLAR={v}\nPLAIN={v}\n");
        let out = render(&pool, &template, &options(MissingValue::Fail))
            .unwrap()
            .to_env();
        assert!(out.contains("SPACED=\"hello world\""));
        assert!(out.contains("DOLLAR=\"pa$s\""));
        assert!(out.contains("PLAIN=simple"));
    }

    #[test]
    fn test_explicit_vault_filter_replaces_discovery() {
        let pool = pool_with(&[("v", &[("DB", "x")]), ("w", &[("OTHER", "y")])]);
        let template = Template::parse("DB={v:DB}\nOTHER={w:OTHER}\n");

        let mut opts = options(MissingValue::Skip);
        opts.vaults = Some(vec!["v".to_string()]);
        let out = render(&pool, &template, &opts).unwrap().to_env();

        // w is excluded, so its placeholder goes through the strategy
        assert!(out.contains("DB=x"));
        assert!(out.contains("OTHER={w:OTHER}"));
    }

    #[test]
    fn test_overlay_appends_after_separator() {
        let pool = pool_with(&[("v", &[("DB", "x"), ("EXTRA", "y")])]);
        let mut base = Template::parse("DB={v:DB}\n");
        base.append_overlay(Template::parse("EXTRA={v:EXTRA}\n"), "prod.env");

        let out = render(&pool, &base, &options(MissingValue::Fail))
            .unwrap()
            .to_env();
        assert_eq!(out, "DB=x\n# overlay: prod.env\nEXTRA=y\n");
    }

    #[test]
    fn test_include_all_appends_unreferenced_sorted() {
        let pool = pool_with(&[(
            "v",
            &[("DB", "x"), ("ZETA", "z"), ("ALPHA", "a")],
        )]);
        let template = Template::parse("DB={v:DB}\n");
        let mut opts = options(MissingValue::Fail);
        opts.include_all = true;

        let out = render(&pool, &template, &opts).unwrap().to_env();
        assert_eq!(
            out,
            "DB=x\n# additional secrets from v:dev\nALPHA=a\nZETA=z\n"
        );
    }

    #[test]
    fn test_json_output_sorted_with_trailing_newline() {
        let pool = pool_with(&[("v", &[("B_KEY", "2"), ("A_KEY", "1")])]);
        let template = Template::parse("# comment\nB={v:B_KEY}\nA={v:A_KEY}\n");
        let rendered = render(&pool, &template, &options(MissingValue::Fail)).unwrap();

        let json = rendered.to_json().unwrap();
        assert!(json.ends_with('\n'));
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["A"], "1");
        assert_eq!(parsed["B"], "2");
        // comments are discarded; keys arrive sorted
        assert!(json.find("\"A\"").unwrap() < json.find("\"B\"").unwrap());
    }

    #[test]
    fn test_empty_template_renders_empty() {
        let pool = pool_with(&[("v", &[])]);
        let rendered = render(&pool, &Template::parse(""), &options(MissingValue::Fail)).unwrap();
        assert_eq!(rendered.to_env(), "");
    }
}
