// src/system/server.rs

//! Blocking HTTP server for the HTML interface. One request at a time.

use crate::interface::html::{
    FormData, FormField,
    router::{HttpResponse, Method, Router},
};
use anyhow::{Result, anyhow};
use futures::{executor::block_on, stream};
use std::io::Read;
use tiny_http::{Header, Request, Response, Server};
use url::form_urlencoded;

/// Serves `router` on `port` until the listener shuts down.
pub fn serve(port: u16, router: &Router) -> Result<()> {
    let server = Server::http(("0.0.0.0", port))
        .map_err(|e| anyhow!("Failed to bind HTML interface server on port {}: {}", port, e))?;

    log::info!("HTML interface server started on port {}", port);
    println!("Serving HTML interface on http://localhost:{}/", port);

    for request in server.incoming_requests() {
        handle_request(request, router);
    }

    log::info!("HTML interface server stopped");
    Ok(())
}

fn handle_request(mut request: Request, router: &Router) {
    let url = request.url().to_string();
    let path = url.split('?').next().unwrap_or("/");

    let response = match request.method() {
        tiny_http::Method::Get => router.handle(Method::Get, path, FormData::new()),
        tiny_http::Method::Post => match read_form(&mut request) {
            Ok(form) => router.handle(Method::Post, path, form),
            Err(response) => response,
        },
        other => {
            log::debug!("Unsupported method {} for {}", other, path);
            plain(405, "Method not allowed")
        }
    };

    let status = response.status;
    let mut reply = Response::from_data(response.body).with_status_code(status);
    for (name, value) in &response.headers {
        match Header::from_bytes(name.as_bytes(), value.as_bytes()) {
            Ok(header) => reply.add_header(header),
            Err(()) => log::warn!("Dropped invalid response header '{}'", name),
        }
    }
    if let Err(e) = request.respond(reply) {
        log::warn!("Failed to answer {}: {}", url, e);
    }
}

/// Reads a form body, urlencoded or multipart.
fn read_form(request: &mut Request) -> Result<FormData, HttpResponse> {
    let content_type = request
        .headers()
        .iter()
        .find(|h| h.field.equiv("Content-Type"))
        .map(|h| h.value.as_str().to_string())
        .unwrap_or_default();

    let mut body = Vec::new();
    if let Err(e) = request.as_reader().read_to_end(&mut body) {
        log::warn!("Failed to read request body: {}", e);
        return Err(plain(400, "Unreadable request body"));
    }

    if content_type.to_ascii_lowercase().starts_with("multipart/") {
        parse_multipart(&content_type, body).map_err(|e| {
            log::debug!("Rejected multipart body: {:#}", e);
            plain(400, &format!("Malformed multipart body: {}", e))
        })
    } else {
        Ok(parse_form(&body))
    }
}

/// Parses an `application/x-www-form-urlencoded` body.
pub fn parse_form(body: &[u8]) -> FormData {
    form_urlencoded::parse(body)
        .into_owned()
        .map(|(key, value)| (key, FormField::Text(value)))
        .collect()
}

/// Parses a `multipart/form-data` body. Parts sent with a filename become
/// [`FormField::File`], every other part is text.
pub fn parse_multipart(content_type: &str, body: Vec<u8>) -> Result<FormData> {
    let boundary = multer::parse_boundary(content_type)?;
    let stream = stream::iter(vec![Ok::<Vec<u8>, std::io::Error>(body)]);
    let mut multipart = multer::Multipart::new(stream, boundary);

    block_on(async {
        let mut form = FormData::new();
        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            let filename = field.file_name().map(str::to_string);
            let contents = field.bytes().await?.to_vec();
            let value = match filename {
                Some(filename) => FormField::File { filename, contents },
                None => FormField::Text(String::from_utf8_lossy(&contents).into_owned()),
            };
            form.insert(name, value);
        }
        Ok::<FormData, anyhow::Error>(form)
    })
}

fn plain(status: u16, message: &str) -> HttpResponse {
    HttpResponse {
        status,
        headers: vec![("Content-Type".to_string(), "text/plain; charset=utf-8".to_string())],
        body: message.as_bytes().to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_form() {
        let form = parse_form(b"pyqi_driver_name=q+cli&pyqi_download-file=a%2Fb&empty=");
        assert_eq!(
            form.get("pyqi_driver_name"),
            Some(&FormField::Text("q cli".into()))
        );
        assert_eq!(
            form.get("pyqi_download-file"),
            Some(&FormField::Text("a/b".into()))
        );
        assert_eq!(form.get("empty"), Some(&FormField::Text(String::new())));
    }

    #[test]
    fn test_parse_multipart_with_upload() {
        let body = concat!(
            "--XyZ\r\n",
            "Content-Disposition: form-data; name=\"pyqi_name\"\r\n",
            "\r\n",
            "Ann\r\n",
            "--XyZ\r\n",
            "Content-Disposition: form-data; name=\"pyqi_data\"; filename=\"notes.txt\"\r\n",
            "Content-Type: text/plain\r\n",
            "\r\n",
            "line one\nline two\r\n",
            "--XyZ--\r\n",
        );
        let form = parse_multipart("multipart/form-data; boundary=XyZ", body.as_bytes().to_vec()).unwrap();

        assert_eq!(form.get("pyqi_name"), Some(&FormField::Text("Ann".into())));
        assert_eq!(
            form.get("pyqi_data"),
            Some(&FormField::File {
                filename: "notes.txt".into(),
                contents: b"line one\nline two".to_vec(),
            })
        );
    }

    #[test]
    fn test_parse_multipart_without_boundary_fails() {
        assert!(parse_multipart("multipart/form-data", Vec::new()).is_err());
    }
}
