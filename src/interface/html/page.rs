// src/interface/html/page.rs

//! Markup for the HTML interface: the command index, the command forms and
//! the error pages.

use crate::interface::{
    Interface,
    html::HtmlInterface,
    options::{InputOption, InputType},
};
use std::fmt::Write;

const STYLE: &str = "\
body { font-family: sans-serif; margin: 2em; color: #222; }
h1 { font-size: 1.6em; }
td.right { text-align: right; padding-right: 1em; vertical-align: top; }
td.help { color: #666; font-size: 0.9em; }
.required { color: #c00; }
.error { color: #c00; border: 1px solid #c00; padding: 0.4em; margin: 0.4em 0; }
";

/// Escapes text for use inside HTML content and double-quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn document(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><title>{}</title><style>{}</style></head><body>{}</body></html>",
        escape(title),
        STYLE,
        body
    )
}

/// Lists the commands that have an HTML form.
pub fn render_index(command_names: &[&str]) -> String {
    let mut body = String::from("<h1>Commands</h1><ul>");
    for name in command_names {
        let name = escape(name);
        let _ = write!(body, "<li><a href=\"/{}\">{}</a></li>", name, name);
    }
    body.push_str("</ul>");
    document("Commands", &body)
}

pub fn render_help() -> String {
    document(
        "Help",
        "<h1>Help</h1><p>Pick a command on the <a href=\"/\">index</a>, fill in its form \
         and submit it. Fields marked with <span class=\"required\">*</span> are required.</p>",
    )
}

pub fn render_error(title: &str, message: &str) -> String {
    let body = format!(
        "<h1>{}</h1><div class=\"error\"><pre>{}</pre></div><p><a href=\"/\">Back to the index</a></p>",
        escape(title),
        escape(message)
    );
    document(title, &body)
}

/// The form of one command, with `errors` listed above it.
pub fn render_form(interface: &HtmlInterface, errors: &[String]) -> String {
    let definition = interface.definition();
    let cmd = definition.command();

    let mut body = String::new();
    let _ = write!(body, "<h1>{}</h1><div id=\"content\">", escape(cmd.name()));
    let _ = write!(body, "<p>{}</p>", escape(cmd.long_description()));
    body.push_str("<p>An (<span class=\"required\">*</span>) denotes a required field.</p>");
    for error in errors {
        let _ = write!(body, "<div class=\"error\">{}</div>", escape(error));
    }

    let multipart = definition
        .inputs()
        .iter()
        .any(|o| o.input_type() == InputType::UploadFile);
    let enctype = if multipart {
        "multipart/form-data"
    } else {
        "application/x-www-form-urlencoded"
    };
    let _ = write!(body, "<form method=\"POST\" enctype=\"{}\"><table>", enctype);
    for option in definition.inputs() {
        body.push_str(&render_row(interface, option));
    }
    body.push_str("</table><input type=\"submit\"></form></div>");

    document(cmd.name(), &body)
}

fn render_row(interface: &HtmlInterface, option: &InputOption) -> String {
    let label = if option.is_required() {
        format!("<span class=\"required\">*</span>{}", escape(option.name()))
    } else {
        escape(option.name())
    };
    format!(
        "<tr><td class=\"right\">{}</td><td>{}</td></tr><tr><td></td><td class=\"help\">{}</td></tr>",
        label,
        render_widget(interface, option),
        escape(option.help())
    )
}

fn render_widget(interface: &HtmlInterface, option: &InputOption) -> String {
    let field = escape(&interface.field_name(option));
    let placeholder = option
        .default()
        .filter(|v| !v.is_null())
        .map(|v| format!(" placeholder=\"{}\"", escape(&v.to_string())))
        .unwrap_or_default();

    match option.input_type() {
        InputType::Int => format!("<input type=\"number\" name=\"{}\"{} />", field, placeholder),
        InputType::Float => format!(
            "<input type=\"number\" step=\"any\" name=\"{}\"{} />",
            field, placeholder
        ),
        InputType::Bool => format!("<input type=\"checkbox\" name=\"{}\" value=\"true\" />", field),
        InputType::UploadFile => format!("<input type=\"file\" name=\"{}\" />", field),
        InputType::Choice => option
            .choices()
            .unwrap_or_default()
            .iter()
            .map(|choice| {
                let choice = escape(choice);
                format!(
                    "<label>{}<input type=\"radio\" name=\"{}\" value=\"{}\" /></label> ",
                    choice, field, choice
                )
            })
            .collect(),
        _ => format!("<input type=\"text\" name=\"{}\"{} />", field, placeholder),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::command::Command;
    use crate::interface::factory::make_interface;
    use crate::interface::html::output_handlers::identity;
    use crate::interface::options::{InterfaceKind, OutputOption};
    use crate::interface::test_support::{Greet, greet};

    fn greet_html() -> HtmlInterface {
        let ins = Greet.inputs();
        make_interface::<HtmlInterface>(
            greet,
            vec![],
            vec![
                InputOption::bound(InterfaceKind::Html, ins.get("name").unwrap())
                    .build()
                    .unwrap(),
                InputOption::bound(InterfaceKind::Html, ins.get("times").unwrap())
                    .build()
                    .unwrap(),
            ],
            vec![OutputOption::html_page("result", identity)],
            "0.2.0",
        )
        .build()
        .unwrap()
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("<a href=\"x\">&'"), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn test_form_lists_prefixed_fields_and_errors() {
        let page = render_form(&greet_html(), &["Error: name is required.".to_string()]);
        assert!(page.contains("<h1>greet</h1>"));
        assert!(page.contains("name=\"pyqi_name\""));
        assert!(page.contains("<input type=\"number\" name=\"pyqi_times\" placeholder=\"1\" />"));
        assert!(page.contains("<span class=\"required\">*</span>name"));
        assert!(page.contains("<div class=\"error\">Error: name is required.</div>"));
        assert!(page.contains("application/x-www-form-urlencoded"));
    }

    #[test]
    fn test_index_links_commands() {
        let page = render_index(&["greet", "make-bash-completion"]);
        assert!(page.contains("<li><a href=\"/greet\">greet</a></li>"));
        assert!(page.contains("<a href=\"/make-bash-completion\">"));
    }
}
