//! `{var}` substitution for batch command arguments and package values.

use std::collections::HashMap;
use std::path::Path;

use sidbroker_sid::Sid;

/// Variable substitution context.
///
/// # Example
///
/// ```
/// use sidbroker_runner::TemplateContext;
/// use sidbroker_sid::Sid;
/// use std::path::Path;
///
/// let sid: Sid = "PROJ/S/SQ010/SH0020/ANI/V003/W/movie".parse().unwrap();
/// let ctx = TemplateContext::new()
///     .with_sid(&sid, Some(Path::new("/prod/PROJ/S/SQ010/SH0020/ANI/V003/W.movie")));
///
/// assert_eq!(ctx.substitute("{shot}_{version}"), "SH0020_V003");
/// assert_eq!(ctx.substitute("--sid={sid}"), "--sid=PROJ/S/SQ010/SH0020/ANI/V003/W/movie");
/// ```
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    vars: HashMap<String, String>,
}

impl TemplateContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set Sid variables.
    ///
    /// This adds:
    /// - `{sid}` - the Sid string
    /// - `{path}` - the Sid's filesystem path, when known
    /// - one variable per populated field (`{project}`, `{task}`, ...)
    pub fn with_sid(mut self, sid: &Sid, path: Option<&Path>) -> Self {
        self.vars.insert("sid".to_string(), sid.to_string());
        if let Some(path) = path {
            self.vars
                .insert("path".to_string(), path.display().to_string());
        }
        for (field, value) in sid.fields() {
            self.vars.insert(field.to_string(), value.to_string());
        }
        self
    }

    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_string(), value.to_string());
        self
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.vars.insert(key.to_string(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(|s| s.as_str())
    }

    /// Substitute `{varname}` occurrences in one left-to-right pass.
    /// Unknown variables are left as is, and substituted values are never
    /// expanded again.
    pub fn substitute(&self, template: &str) -> String {
        let mut result = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(open) = rest.find('{') {
            result.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            match after.find(['{', '}']) {
                Some(close) if after[close..].starts_with('}') => {
                    let key = &after[..close];
                    match self.vars.get(key) {
                        Some(value) => result.push_str(value),
                        None => {
                            result.push('{');
                            result.push_str(key);
                            result.push('}');
                        }
                    }
                    rest = &after[close + 1..];
                }
                // Unclosed, or another `{` starts first.
                _ => {
                    result.push('{');
                    rest = after;
                }
            }
        }
        result.push_str(rest);
        result
    }

    pub fn substitute_all(&self, templates: &[String]) -> Vec<String> {
        templates.iter().map(|t| self.substitute(t)).collect()
    }
}
