/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use std::time::Duration;

use tokio::{
    io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader},
    net::{TcpListener, TcpStream},
    task::JoinHandle,
};

pub const ENDPOINT_PATH: &str = "/EWS/Exchange.asmx";

/// What the server answers every connection with.
#[derive(Clone, Debug)]
pub struct Reply {
    pub status: u16,
    pub reason: &'static str,
    pub headers: Vec<(&'static str, String)>,
    pub body: String,
    pub delay: Option<Duration>,

    /// Overrides the announced `Content-Length`, e.g. to end the body early.
    pub content_length: Option<usize>,
}

impl Reply {
    pub fn new(status: u16, reason: &'static str, body: impl Into<String>) -> Self {
        Self {
            status,
            reason,
            headers: Vec::new(),
            body: body.into(),
            delay: None,
            content_length: None,
        }
    }

    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, "OK", body)
    }

    pub fn with_header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_content_length(mut self, content_length: usize) -> Self {
        self.content_length = Some(content_length);
        self
    }
}

/// A request as received by the server.
#[derive(Clone, Debug)]
pub struct Captured {
    pub request_line: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Captured {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(header, _)| header.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn body_text(&self) -> &str {
        std::str::from_utf8(&self.body).expect("request body should be UTF-8")
    }
}

/// A minimal HTTP/1.1 server answering a fixed number of connections, one
/// request each.
pub struct MockServer {
    pub url: String,
    handle: JoinHandle<Vec<Captured>>,
}

impl MockServer {
    pub async fn start(reply: Reply, connections: usize) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("should bind to a local port");
        let address = listener.local_addr().expect("listener should have an address");

        let handle = tokio::spawn(async move {
            let mut handlers = Vec::new();
            for _ in 0..connections {
                let (stream, _) = listener.accept().await.expect("should accept");

                let reply = reply.clone();
                handlers.push(tokio::spawn(async move {
                    handle_connection(stream, &reply)
                        .await
                        .expect("connection should be well-formed")
                }));
            }

            let mut captured = Vec::new();
            for handler in handlers {
                captured.push(handler.await.expect("handler should not panic"));
            }

            captured
        });

        Self {
            url: format!("http://{address}{ENDPOINT_PATH}"),
            handle,
        }
    }

    /// Waits for every expected connection and returns what was received.
    pub async fn requests(self) -> Vec<Captured> {
        self.handle.await.expect("server should not panic")
    }
}

async fn handle_connection(stream: TcpStream, reply: &Reply) -> std::io::Result<Captured> {
    let mut reader = BufReader::new(stream);

    let mut request_line = String::new();
    reader.read_line(&mut request_line).await?;

    let mut headers = Vec::new();
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).await?;

        let line = line.trim_end();
        if line.is_empty() {
            break;
        }

        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_ascii_lowercase(), value.trim().to_string()));
        }
    }

    let length = headers
        .iter()
        .find(|(name, _)| name == "content-length")
        .and_then(|(_, value)| value.parse().ok())
        .unwrap_or(0);
    let mut body = vec![0; length];
    reader.read_exact(&mut body).await?;

    if let Some(delay) = reply.delay {
        tokio::time::sleep(delay).await;
    }

    let mut response = format!("HTTP/1.1 {} {}\r\n", reply.status, reply.reason);
    for (name, value) in &reply.headers {
        response.push_str(&format!("{name}: {value}\r\n"));
    }
    response.push_str(&format!(
        "Content-Type: text/xml; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        reply.content_length.unwrap_or(reply.body.len())
    ));
    response.push_str(&reply.body);

    // The client may have given up on a delayed reply already.
    let mut stream = reader.into_inner();
    if stream.write_all(response.as_bytes()).await.is_ok() {
        let _ = stream.shutdown().await;
    }

    Ok(Captured {
        request_line: request_line.trim_end().to_string(),
        headers,
        body,
    })
}

/// Wraps a payload in a response envelope as Exchange would send it.
pub fn envelope(payload: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="utf-8"?>"#,
            r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">"#,
            r#"<s:Header><h:ServerVersionInfo MajorVersion="15" MinorVersion="20" "#,
            r#"MajorBuildNumber="7452" MinorBuildNumber="32" "#,
            r#"xmlns:h="http://schemas.microsoft.com/exchange/services/2006/types"/></s:Header>"#,
            r#"<s:Body>{}</s:Body></s:Envelope>"#,
        ),
        payload
    )
}

pub const FIND_ITEM_RESPONSE: &str = concat!(
    r#"<m:FindItemResponse xmlns:m="http://schemas.microsoft.com/exchange/services/2006/messages" "#,
    r#"xmlns:t="http://schemas.microsoft.com/exchange/services/2006/types">"#,
    r#"<m:ResponseMessages><m:FindItemResponseMessage ResponseClass="Success">"#,
    r#"<m:ResponseCode>NoError</m:ResponseCode>"#,
    r#"<m:RootFolder TotalItemsInView="1" IncludesLastItemInRange="true"><t:Items>"#,
    r#"<t:Message><t:ItemId Id="AAMkADk0" ChangeKey="CQAAABYA"/><t:Subject>Status update</t:Subject></t:Message>"#,
    r#"</t:Items></m:RootFolder>"#,
    r#"</m:FindItemResponseMessage></m:ResponseMessages></m:FindItemResponse>"#,
);
