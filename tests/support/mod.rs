#![allow(dead_code)]

use std::{collections::HashMap, sync::Arc};

use oai_tester::{Console, HarvestSummary, Harvester, OaiConfig};
use reqwest::Url;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    sync::Mutex,
    task::JoinHandle,
};

pub const METADATA_PREFIX: &str = "marcxchange";
pub const MARC_RECORD: &str = r#"<record xmlns="info:lc/xmlns/marcxchange-v1"><leader>00000nam</leader><datafield tag="245"><subfield code="a">Integration Title</subfield></datafield></record>"#;

#[derive(Clone)]
pub struct MockResponse {
    status: u16,
    body: String,
}

impl MockResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Serves the scripted responses in request order and records every request
/// path. Requests past the end of the script get a 404.
pub struct MockOaiServer {
    pub endpoint: String,
    requests: Arc<Mutex<Vec<String>>>,
    handle: JoinHandle<()>,
}

impl MockOaiServer {
    pub async fn requests(&self) -> Vec<String> {
        self.requests.lock().await.clone()
    }

    pub async fn request_params(&self) -> Vec<HashMap<String, String>> {
        self.requests()
            .await
            .iter()
            .map(|path| parse_query_params(path))
            .collect()
    }
}

impl Drop for MockOaiServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub struct HarvestOutput {
    pub summary: HarvestSummary,
    pub console: String,
}

pub async fn start_mock_oai_server(responses: Vec<MockResponse>) -> anyhow::Result<MockOaiServer> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let address = listener.local_addr()?;
    let endpoint = format!("http://{}/oai", address);
    let requests = Arc::new(Mutex::new(Vec::new()));
    let requests_for_task = requests.clone();
    let script = Arc::new(responses);

    let handle = tokio::spawn(async move {
        loop {
            let (mut socket, _) = match listener.accept().await {
                Ok(value) => value,
                Err(_) => break,
            };
            let requests = requests_for_task.clone();
            let script = script.clone();
            tokio::spawn(async move {
                if let Err(error) = handle_connection(&mut socket, &requests, &script).await {
                    eprintln!("mock OAI server request handling failed: {}", error);
                }
            });
        }
    });

    Ok(MockOaiServer {
        endpoint,
        requests,
        handle,
    })
}

pub async fn run_harvest(endpoint: &str, metadata_prefix: &str) -> anyhow::Result<HarvestOutput> {
    let config = OaiConfig::new(Url::parse(endpoint)?, metadata_prefix.to_string());
    let harvester = Harvester::new(config)?;
    let mut console = Console::new(Vec::new());

    let summary = harvester.run(&mut console).await?;
    let console = String::from_utf8(console.into_inner())?;

    Ok(HarvestOutput {
        summary,
        console: anstream::adapter::strip_str(&console).to_string(),
    })
}

pub fn list_records_response(records: usize, token: Option<&str>) -> String {
    let record_xml = (1..=records)
        .map(|n| {
            format!(
                "<record><header><identifier>oai:test:{n}</identifier><datestamp>2026-02-07</datestamp></header><metadata>{MARC_RECORD}</metadata></record>"
            )
        })
        .collect::<Vec<_>>()
        .join("");
    let token_xml = match token {
        Some("") => r#"<resumptionToken completeListSize="10" cursor="0"/>"#.to_string(),
        Some(token) => {
            format!(r#"<resumptionToken completeListSize="10" cursor="0">{token}</resumptionToken>"#)
        }
        None => String::new(),
    };

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<OAI-PMH xmlns="http://www.openarchives.org/OAI/2.0/">
  <responseDate>2026-02-07T00:00:00Z</responseDate>
  <request verb="ListRecords" metadataPrefix="{METADATA_PREFIX}">http://localhost/oai</request>
  <ListRecords>{record_xml}{token_xml}</ListRecords>
</OAI-PMH>"#
    )
}

pub fn error_response(code: &str, message: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<OAI-PMH xmlns="http://www.openarchives.org/OAI/2.0/">
  <responseDate>2026-02-07T00:00:00Z</responseDate>
  <request verb="ListRecords">http://localhost/oai</request>
  <error code="{code}">{message}</error>
</OAI-PMH>"#
    )
}

pub fn parse_query_params(path: &str) -> HashMap<String, String> {
    let url = Url::parse("http://localhost")
        .and_then(|base| base.join(path))
        .expect("request path should be a valid url path");
    url.query_pairs()
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect()
}

async fn handle_connection(
    socket: &mut TcpStream,
    requests: &Mutex<Vec<String>>,
    script: &[MockResponse],
) -> anyhow::Result<()> {
    let mut buf = vec![0u8; 8192];
    let mut total = 0usize;

    loop {
        let bytes_read = socket.read(&mut buf[total..]).await?;
        if bytes_read == 0 {
            return Ok(());
        }
        total += bytes_read;
        if buf[..total].windows(4).any(|window| window == b"\r\n\r\n") {
            break;
        }
        if total == buf.len() {
            break;
        }
    }

    let request = String::from_utf8_lossy(&buf[..total]);
    let request_line = request.lines().next().unwrap_or_default();
    let path = request_line.split_whitespace().nth(1).unwrap_or("/");

    let index = {
        let mut requests = requests.lock().await;
        requests.push(path.to_string());
        requests.len() - 1
    };

    let (status, body) = match script.get(index) {
        Some(response) => (response.status, response.body.as_str()),
        None => (404, "no more scripted responses"),
    };
    let status_text = if status == 200 { "OK" } else { "ERROR" };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: text/xml; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        status_text,
        body.len(),
        body
    );

    socket.write_all(response.as_bytes()).await?;
    Ok(())
}
