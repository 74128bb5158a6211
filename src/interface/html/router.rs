// src/interface/html/router.rs

//! Maps HTTP requests onto the HTML interfaces of the registered commands.
//!
//! | Route                        | Response                                  |
//! |------------------------------|-------------------------------------------|
//! | `GET /`, `/index`, `/home`   | list of commands with an HTML form        |
//! | `GET /help`                  | help page                                 |
//! | `GET /<command>`             | the command's form                        |
//! | `POST /<command>`            | run; page, download or form with errors   |
//! | anything else                | 404                                       |

use crate::{
    cli::dispatcher::CommandDefinition,
    core::error::CommandError,
    interface::{
        DispatchError, Interface, Rejection,
        html::{FormData, HtmlInterface, HtmlOutput, page},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A response ready to be written to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    fn new(status: u16, content_type: &str, body: Vec<u8>) -> Self {
        Self {
            status,
            headers: vec![("Content-Type".to_string(), content_type.to_string())],
            body,
        }
    }

    pub fn html(status: u16, body: String) -> Self {
        Self::new(status, "text/html; charset=utf-8", body.into_bytes())
    }

    pub fn not_found() -> Self {
        Self::new(404, "text/plain; charset=utf-8", b"Not found".to_vec())
    }

    /// Value of the first header named `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug)]
pub struct Router {
    registry: &'static [CommandDefinition],
    prefix: String,
}

impl Router {
    pub fn new(registry: &'static [CommandDefinition], prefix: &str) -> Self {
        Self {
            registry,
            prefix: prefix.to_string(),
        }
    }

    pub fn handle(&self, method: Method, path: &str, form: FormData) -> HttpResponse {
        log::debug!("{:?} {}", method, path);

        match (method, path) {
            (Method::Get, "/" | "/index" | "/home") => {
                let names: Vec<&str> = self
                    .registry
                    .iter()
                    .filter(|def| def.html.is_some())
                    .map(|def| def.name)
                    .collect();
                HttpResponse::html(200, page::render_index(&names))
            }
            (Method::Get, "/help") => HttpResponse::html(200, page::render_help()),
            _ => match self.find(path) {
                Some(definition) => self.handle_command(definition, method, form),
                None => HttpResponse::not_found(),
            },
        }
    }

    fn find(&self, path: &str) -> Option<&'static CommandDefinition> {
        let name = path.strip_prefix('/')?;
        self.registry
            .iter()
            .find(|def| def.name == name && def.html.is_some())
    }

    fn build(&self, definition: &CommandDefinition) -> Result<HtmlInterface, CommandError> {
        let factory = definition
            .html
            .ok_or_else(|| CommandError::configuration(format!("'{}' has no HTML form.", definition.name)))?;
        Ok(factory()?.build()?.with_prefix(&self.prefix))
    }

    fn handle_command(&self, definition: &CommandDefinition, method: Method, form: FormData) -> HttpResponse {
        let mut interface = match self.build(definition) {
            Ok(interface) => interface,
            Err(e) => {
                log::error!("Could not build HTML interface for '{}': {}", definition.name, e);
                return HttpResponse::html(500, page::render_error("Configuration error", &e.to_string()));
            }
        };

        if method == Method::Get {
            return HttpResponse::html(200, page::render_form(&interface, &[]));
        }

        match interface.dispatch(form) {
            Ok(HtmlOutput::Page { mime_type, body }) => HttpResponse::new(200, &mime_type, body),
            Ok(HtmlOutput::Download { filename, body }) => {
                let mut response = HttpResponse::new(200, "application/octet-stream", body);
                response
                    .headers
                    .push(("Content-Disposition".to_string(), content_disposition(&filename)));
                response
            }
            Err(DispatchError::Rejected(Rejection::Invalid(errors))) => {
                HttpResponse::html(400, page::render_form(&interface, &errors))
            }
            Err(DispatchError::Rejected(Rejection::Informational(text))) => {
                HttpResponse::html(200, page::render_error(definition.name, &text))
            }
            Err(DispatchError::Failed(e)) => HttpResponse::html(
                400,
                page::render_error(&format!("{} failed", definition.name), &format!("{:#}", e)),
            ),
        }
    }
}

/// `attachment; filename="..."` with control characters, quotes and backslashes dropped.
fn content_disposition(filename: &str) -> String {
    let safe: String = filename
        .chars()
        .filter(|c| !c.is_control() && *c != '"' && *c != '\\')
        .collect();
    format!("attachment; filename=\"{}\"", safe)
}

// MARK: --- UNIT TESTS ---

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::dispatcher::COMMAND_REGISTRY;
    use crate::interface::html::FormField;

    fn router() -> Router {
        Router::new(COMMAND_REGISTRY, "pyqi_")
    }

    fn form(fields: &[(&str, &str)]) -> FormData {
        fields
            .iter()
            .map(|(k, v)| (k.to_string(), FormField::Text(v.to_string())))
            .collect()
    }

    fn body(response: &HttpResponse) -> String {
        String::from_utf8_lossy(&response.body).into_owned()
    }

    #[test]
    fn test_index_lists_html_commands_only() {
        for path in ["/", "/index", "/home"] {
            let response = router().handle(Method::Get, path, FormData::new());
            assert_eq!(response.status, 200);
            assert!(body(&response).contains("href=\"/make-bash-completion\""));
            assert!(!body(&response).contains("serve-html-interface"));
        }
    }

    #[test]
    fn test_form_page() {
        let response = router().handle(Method::Get, "/make-bash-completion", FormData::new());
        assert_eq!(response.status, 200);
        assert!(body(&response).contains("name=\"pyqi_driver_name\""));
        assert!(body(&response).contains("name=\"pyqi_download-file\""));
    }

    #[test]
    fn test_unknown_routes() {
        assert_eq!(router().handle(Method::Get, "/nope", FormData::new()).status, 404);
        assert_eq!(
            router().handle(Method::Get, "/serve-html-interface", FormData::new()).status,
            404
        );
        assert_eq!(router().handle(Method::Post, "/help", FormData::new()).status, 404);
    }

    #[test]
    fn test_post_download() {
        let response = router().handle(
            Method::Post,
            "/make-bash-completion",
            form(&[("pyqi_driver_name", "qcli"), ("pyqi_download-file", "qcli_completion")]),
        );
        assert_eq!(response.status, 200);
        assert_eq!(
            response.header("content-disposition"),
            Some("attachment; filename=\"qcli_completion.sh\"")
        );
        assert!(body(&response).contains("complete -F _qcli_complete -f qcli"));
    }

    #[test]
    fn test_download_filename_is_quoted_and_sanitized() {
        let response = router().handle(
            Method::Post,
            "/make-bash-completion",
            form(&[("pyqi_driver_name", "qcli"), ("pyqi_download-file", "my \"comp\";\r\nX-Evil: 1")]),
        );
        assert_eq!(response.status, 200);
        assert_eq!(
            response.header("Content-Disposition"),
            Some("attachment; filename=\"my comp;X-Evil: 1.sh\"")
        );
    }

    #[test]
    fn test_post_with_missing_field_rerenders_form() {
        let response = router().handle(
            Method::Post,
            "/make-bash-completion",
            form(&[("pyqi_download-file", "x")]),
        );
        assert_eq!(response.status, 400);
        let page = body(&response);
        assert_eq!(page.matches("<div class=\"error\">").count(), 1);
        assert!(page.contains("Error: driver_name is required."));
        assert!(page.contains("<form method=\"POST\""));
    }
}
