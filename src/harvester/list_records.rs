use std::io::Write;

use anyhow::Context;
use reqwest::{Client, Url};
use tracing::{debug, warn};

use crate::console::Console;
use crate::harvester::{
    HarvestSummary, Harvester,
    oai::Pagination,
    response::{OaiError, parse_list_records},
    token::DecodedToken,
};

pub(super) async fn run<W: Write>(
    harvester: &Harvester,
    console: &mut Console<W>,
) -> anyhow::Result<HarvestSummary> {
    let mut pagination = Pagination::Initial;
    let mut summary = HarvestSummary::default();

    while let Some(url) = harvester.config.list_records_url(&pagination) {
        report_fetching(console, &url)?;

        let body = fetch(&harvester.client, &url).await?;
        let page = parse_list_records(&body)
            .with_context(|| format!("response from {} is not well-formed XML", url))?;

        summary.pages += 1;
        summary.records += page.records;
        debug!(
            "Page {}: {} record(s), complete list size {:?}, cursor {:?}",
            summary.pages, page.records, page.complete_list_size, page.cursor
        );

        if let Some(error) = &page.error {
            warn!("OAI-PMH request error: {} {}", error.code, error.message);
            report_server_error(console, error)?;
        }

        pagination = Pagination::next(page.resumption_token.as_deref());
        match &pagination {
            Pagination::Resume(token) => report_token(console, &DecodedToken::decode(token))?,
            Pagination::Initial => {
                warn!("Server returned an empty resumption token, the listing starts over");
                report_done(console)?;
            }
            Pagination::Finished => report_done(console)?,
        }
    }

    console.line(&format!(
        "Harvested {} records from {} pages.",
        summary.records, summary.pages
    ))?;
    Ok(summary)
}

async fn fetch(client: &Client, url: &Url) -> anyhow::Result<String> {
    debug!("GET {}", url);

    let response = client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("request to {} failed", url))?
        .error_for_status()?;

    Ok(response.text().await?)
}

fn report_fetching<W: Write>(console: &mut Console<W>, url: &Url) -> std::io::Result<()> {
    console.plain("Fetching data from ")?;
    write!(console.accent()?, "{}", url)?;
    console.line(".")
}

fn report_token<W: Write>(console: &mut Console<W>, token: &DecodedToken) -> std::io::Result<()> {
    console.plain("Got resumption token ")?;
    write!(console.accent()?, "{}", token.raw())?;

    if let DecodedToken::Decoded { text, .. } = token {
        console.plain(". It was decoded to ")?;
        write!(console.accent()?, "{}", text)?;
    }

    console.line(".")
}

fn report_done<W: Write>(console: &mut Console<W>) -> std::io::Result<()> {
    console.line("No resumption token, we're done!")
}

fn report_server_error<W: Write>(console: &mut Console<W>, error: &OaiError) -> std::io::Result<()> {
    console.plain("The server reported ")?;
    write!(console.accent()?, "{}", error.code)?;
    console.line(&format!(": {}.", error.message))
}
