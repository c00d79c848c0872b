//! Rendering passes for prompt templates
//!
//! A template is rendered by four passes applied in a fixed order:
//!
//! 1. [`interpolate`]: `{{name}}`
//! 2. [`resolve_conditionals`]: `{{#if name}}...{{/if}}`
//! 3. [`expand_iterations`]: `{{#each name}}...{{/each}}`
//! 4. [`resolve_dotted`]: `{{name.property}}`
//!
//! Every pass scans left to right without overlap and never rescans its own
//! output. Text that does not form a valid directive is copied through, so
//! malformed templates degrade to literal text instead of failing.

use std::borrow::Cow;

use serde_json::Value;

use super::variables::{stringify, Lookup, VariableBag};

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

const IF_OPEN: &str = "#if ";
const IF_CLOSE: &str = "{{/if}}";
const EACH_OPEN: &str = "#each ";
const EACH_CLOSE: &str = "{{/each}}";

/// Token bound to a primitive element inside `{{#each}}`
const THIS: &str = "this";

/// A single rendering stage
pub type Pass = fn(&str, &VariableBag) -> String;

/// The rendering pipeline, in execution order
pub const PASSES: [(&str, Pass); 4] = [
    ("interpolate", interpolate as Pass),
    ("conditionals", resolve_conditionals as Pass),
    ("iterations", expand_iterations as Pass),
    ("dotted", resolve_dotted as Pass),
];

/// Render template text against a variable bag
pub fn render_text(template: &str, variables: &VariableBag) -> String {
    PASSES
        .iter()
        .fold(template.to_string(), |text, (name, pass)| {
            let rendered = pass(&text, variables);
            tracing::trace!(pass = %name, before = text.len(), after = rendered.len(), "Pass applied");
            rendered
        })
}

/// Replace `{{name}}` with the variable's string form; unknown names stay literal
pub fn interpolate(text: &str, variables: &VariableBag) -> String {
    replace_tokens(text, |candidate| {
        let (name, len) = parse_simple(candidate)?;
        let replacement = match variables.lookup(name) {
            Lookup::Found(value) => stringify(value),
            Lookup::Missing => Cow::Borrowed(&candidate[..len]),
        };
        Some((len, replacement))
    })
}

/// Keep the body of `{{#if name}}...{{/if}}` when `name` is truthy, drop it otherwise
pub fn resolve_conditionals(text: &str, variables: &VariableBag) -> String {
    replace_tokens(text, |candidate| {
        let block = parse_block(candidate, IF_OPEN, IF_CLOSE)?;
        let replacement = if variables.lookup(block.name).is_truthy() {
            block.body
        } else {
            ""
        };
        Some((block.len, Cow::Borrowed(replacement)))
    })
}

/// Instantiate the body of `{{#each name}}...{{/each}}` once per array element
pub fn expand_iterations(text: &str, variables: &VariableBag) -> String {
    replace_tokens(text, |candidate| {
        let block = parse_block(candidate, EACH_OPEN, EACH_CLOSE)?;
        let items: &[Value] = match variables.lookup(block.name) {
            Lookup::Found(Value::Array(items)) => items.as_slice(),
            _ => &[],
        };
        let rendered: String = items
            .iter()
            .map(|item| render_item(block.body, item))
            .collect();
        Some((block.len, Cow::Owned(rendered)))
    })
}

/// Replace `{{name.property}}` when `name` is an object holding `property`
pub fn resolve_dotted(text: &str, variables: &VariableBag) -> String {
    replace_tokens(text, |candidate| {
        let (name, property, len) = parse_dotted(candidate)?;
        let replacement = match variables.lookup_property(name, property) {
            Lookup::Found(value) => stringify(value),
            Lookup::Missing => Cow::Borrowed(&candidate[..len]),
        };
        Some((len, replacement))
    })
}

/// Object elements substitute their own properties, anything else binds `{{this}}`
fn render_item(body: &str, item: &Value) -> String {
    match item {
        Value::Object(properties) => replace_tokens(body, |candidate| {
            let (name, len) = parse_simple(candidate)?;
            let replacement = match properties.get(name) {
                Some(value) => stringify(value),
                None => Cow::Borrowed(&candidate[..len]),
            };
            Some((len, replacement))
        }),
        element => replace_tokens(body, |candidate| {
            let (name, len) = parse_simple(candidate)?;
            let replacement = if name == THIS {
                stringify(element)
            } else {
                Cow::Borrowed(&candidate[..len])
            };
            Some((len, replacement))
        }),
    }
}

/// Walk `text`, offering every `{{` position to `parse`.
///
/// `parse` sees the remaining text starting at the braces and returns the
/// matched length plus its replacement. On no match the scan moves forward by
/// a single character, so `{{{name}}}` still finds `{{name}}`.
fn replace_tokens<'r, F>(text: &'r str, mut parse: F) -> String
where
    F: FnMut(&'r str) -> Option<(usize, Cow<'r, str>)>,
{
    let mut output = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find(OPEN) {
        output.push_str(&rest[..pos]);
        let candidate = &rest[pos..];

        match parse(candidate) {
            Some((len, replacement)) => {
                output.push_str(&replacement);
                rest = &candidate[len..];
            }
            None => {
                output.push('{');
                rest = &candidate[1..];
            }
        }
    }

    output.push_str(rest);
    output
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Length of the leading run of word characters, if non-empty
fn word_len(s: &str) -> Option<usize> {
    let len = s.bytes().take_while(|b| is_word_byte(*b)).count();
    (len > 0).then_some(len)
}

/// `{{word}}` → (word, token length)
fn parse_simple(candidate: &str) -> Option<(&str, usize)> {
    let inner = candidate.strip_prefix(OPEN)?;
    let end = word_len(inner)?;
    inner[end..]
        .starts_with(CLOSE)
        .then(|| (&inner[..end], OPEN.len() + end + CLOSE.len()))
}

/// `{{word.word}}` → (name, property, token length)
fn parse_dotted(candidate: &str) -> Option<(&str, &str, usize)> {
    let inner = candidate.strip_prefix(OPEN)?;
    let name_end = word_len(inner)?;
    let after_dot = inner[name_end..].strip_prefix('.')?;
    let property_end = word_len(after_dot)?;
    if !after_dot[property_end..].starts_with(CLOSE) {
        return None;
    }

    let len = OPEN.len() + name_end + 1 + property_end + CLOSE.len();
    Some((&inner[..name_end], &after_dot[..property_end], len))
}

struct Block<'a> {
    name: &'a str,
    body: &'a str,
    /// Length from the opening braces through the closing tag
    len: usize,
}

/// `{{<keyword>word}}body<closer>` where the first `closer` ends the block
fn parse_block<'a>(candidate: &'a str, keyword: &str, closer: &str) -> Option<Block<'a>> {
    let after_keyword = candidate.strip_prefix(OPEN)?.strip_prefix(keyword)?;
    let name_end = word_len(after_keyword)?;
    let body_start = after_keyword[name_end..].strip_prefix(CLOSE)?;
    let body_len = body_start.find(closer)?;

    let header_len = candidate.len() - body_start.len();
    Some(Block {
        name: &after_keyword[..name_end],
        body: &body_start[..body_len],
        len: header_len + body_len + closer.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bag(value: Value) -> VariableBag {
        VariableBag::try_from(value).unwrap()
    }

    #[test]
    fn test_interpolate_present_and_missing() {
        let vars = bag(json!({"city": "Kyoto", "nights": 3}));
        assert_eq!(
            interpolate("{{nights}} nights in {{city}} with {{budget}}", &vars),
            "3 nights in Kyoto with {{budget}}"
        );
    }

    #[test]
    fn test_interpolate_keeps_falsy_values() {
        let vars = bag(json!({"zero": 0, "empty": "", "no": false}));
        assert_eq!(interpolate("[{{zero}}|{{empty}}|{{no}}]", &vars), "[0||false]");
    }

    #[test]
    fn test_interpolate_ignores_non_word_tokens() {
        let vars = bag(json!({"name": "Ann"}));
        assert_eq!(
            interpolate("{{ name }} {{na-me}} {{}} {{name", &vars),
            "{{ name }} {{na-me}} {{}} {{name"
        );
    }

    #[test]
    fn test_interpolate_triple_braces() {
        let vars = bag(json!({"name": "Ann"}));
        assert_eq!(interpolate("{{{name}}}", &vars), "{Ann}");
    }

    #[test]
    fn test_interpolate_does_not_rescan_output() {
        let vars = bag(json!({"a": "{{b}}", "b": "B"}));
        assert_eq!(interpolate("{{a}}", &vars), "{{b}}");
    }

    #[test]
    fn test_conditionals() {
        let template = "{{#if flag}}X{{/if}}";
        assert_eq!(resolve_conditionals(template, &bag(json!({"flag": true}))), "X");
        assert_eq!(resolve_conditionals(template, &bag(json!({"flag": 1}))), "X");
        assert_eq!(resolve_conditionals(template, &bag(json!({"flag": "y"}))), "X");
        assert_eq!(resolve_conditionals(template, &bag(json!({"flag": false}))), "");
        assert_eq!(resolve_conditionals(template, &bag(json!({"flag": ""}))), "");
        assert_eq!(resolve_conditionals(template, &bag(json!({}))), "");
    }

    #[test]
    fn test_conditionals_span_lines() {
        let vars = bag(json!({"vip": true}));
        assert_eq!(
            resolve_conditionals("a{{#if vip}}\nline one\nline two\n{{/if}}b", &vars),
            "a\nline one\nline two\nb"
        );
    }

    #[test]
    fn test_conditionals_first_closer_wins() {
        let vars = bag(json!({"a": true, "b": false}));
        assert_eq!(
            resolve_conditionals("{{#if a}}1{{#if b}}2{{/if}}3{{/if}}", &vars),
            "1{{#if b}}23{{/if}}"
        );
    }

    #[test]
    fn test_conditionals_unclosed_stays_literal() {
        let vars = bag(json!({"a": true}));
        assert_eq!(resolve_conditionals("{{#if a}}open", &vars), "{{#if a}}open");
        assert_eq!(resolve_conditionals("stray {{/if}}", &vars), "stray {{/if}}");
    }

    #[test]
    fn test_iterations_over_objects() {
        let vars = bag(json!({"items": [{"name": "a"}, {"name": "b"}]}));
        assert_eq!(expand_iterations("{{#each items}}{{name}}-{{/each}}", &vars), "a-b-");
    }

    #[test]
    fn test_iterations_over_primitives() {
        let vars = bag(json!({"items": [1, 2, 3]}));
        assert_eq!(expand_iterations("{{#each items}}{{this}},{{/each}}", &vars), "1,2,3,");
    }

    #[test]
    fn test_iterations_leave_unknown_item_tokens() {
        let vars = bag(json!({"legs": [{"from": "LIS", "to": "NRT"}, {"from": "NRT"}]}));
        assert_eq!(
            expand_iterations("{{#each legs}}{{from}}>{{to}} {{this}};{{/each}}", &vars),
            "LIS>NRT {{this}};NRT>{{to}} {{this}};"
        );
    }

    #[test]
    fn test_iterations_non_array_renders_empty() {
        let template = "[{{#each items}}{{this}}{{/each}}]";
        assert_eq!(expand_iterations(template, &bag(json!({"items": "abc"}))), "[]");
        assert_eq!(expand_iterations(template, &bag(json!({"items": {"a": 1}}))), "[]");
        assert_eq!(expand_iterations(template, &bag(json!({}))), "[]");
        assert_eq!(expand_iterations(template, &bag(json!({"items": []}))), "[]");
    }

    #[test]
    fn test_iterations_do_not_resolve_outer_dotted_tokens() {
        let vars = bag(json!({"items": [{"name": "a"}]}));
        assert_eq!(
            expand_iterations("{{#each items}}{{name}}@{{trip.city}}{{/each}}", &vars),
            "a@{{trip.city}}"
        );
    }

    #[test]
    fn test_dotted() {
        let template = "Send to {{user.email}}";
        assert_eq!(
            resolve_dotted(template, &bag(json!({"user": {"email": "a@b.com"}}))),
            "Send to a@b.com"
        );
        assert_eq!(
            resolve_dotted(template, &bag(json!({"user": {}}))),
            "Send to {{user.email}}"
        );
        assert_eq!(
            resolve_dotted(template, &bag(json!({"user": null}))),
            "Send to {{user.email}}"
        );
    }

    #[test]
    fn test_dotted_rejects_deeper_paths() {
        let vars = bag(json!({"a": {"b": {"c": 1}}}));
        assert_eq!(resolve_dotted("{{a.b.c}}", &vars), "{{a.b.c}}");
    }

    #[test]
    fn test_render_text_greeting() {
        let vars = bag(json!({"name": "Ann", "vip": true, "list": ["x", "y"]}));
        let template =
            "Hi {{name}}! {{#if vip}}Welcome back.{{/if}} Items: {{#each list}}{{this}} {{/each}}";
        assert_eq!(render_text(template, &vars), "Hi Ann! Welcome back. Items: x y ");
    }

    #[test]
    fn test_render_text_plain_template_unchanged() {
        let template = "Plan a trip. No directives here, just {braces} and }} stray {{.";
        assert_eq!(render_text(template, &VariableBag::new()), template);
    }

    #[test]
    fn test_render_text_outer_dotted_survives_iteration() {
        let vars = bag(json!({
            "trip": {"city": "Porto"},
            "days": [{"title": "Ribeira"}, {"title": "Douro"}]
        }));
        assert_eq!(
            render_text("{{#each days}}{{title}} in {{trip.city}}. {{/each}}", &vars),
            "Ribeira in Porto. Douro in Porto. "
        );
    }

    #[test]
    fn test_render_text_interpolation_runs_before_iteration() {
        let vars = bag(json!({"name": "outer", "items": [{"name": "inner"}]}));
        assert_eq!(
            render_text("{{#each items}}{{name}}{{/each}}", &vars),
            "outer"
        );
    }

    #[test]
    fn test_render_text_is_repeatable() {
        let vars = bag(json!({"name": "Ann", "missing_flag": null}));
        let template = "{{name}} {{#if missing_flag}}hidden{{/if}}{{unknown}}";
        let first = render_text(template, &vars);
        let second = render_text(template, &vars);
        assert_eq!(first, second);
        assert_eq!(first, "Ann {{unknown}}");
    }

    #[test]
    fn test_render_text_string_forms() {
        let vars = bag(json!({
            "nights": 3.0,
            "note": null,
            "rows": [[1, 2]],
            "stops": ["Lyon", "Nice"]
        }));
        let template = "{{nights}}|{{note}}|{{#each rows}}{{this}}{{/each}}|{{stops}}";
        assert_eq!(render_text(template, &vars), "3||1,2|Lyon,Nice");
    }

    #[test]
    fn test_pass_order() {
        let names: Vec<&str> = PASSES.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, ["interpolate", "conditionals", "iterations", "dotted"]);
    }
}
