mod list_records;
pub mod oai;
pub mod response;
pub mod token;

use std::io::Write;

use clap::Args;
use reqwest::{Client, Url};

pub use oai::{DEFAULT_METADATA_PREFIX, OAI_NAMESPACE, OaiConfig, Pagination};
pub use response::{ListRecordsPage, OaiError, parse_list_records};
pub use token::DecodedToken;

use crate::console::Console;

#[derive(Debug, Args)]
pub struct HarvesterArgs {
    /// The url to the OAI-PMH service without any query parameters
    #[arg(short, long, env = "OAI_URL")]
    pub url: Url,

    /// OAI metadata prefix
    #[arg(short, long, default_value = DEFAULT_METADATA_PREFIX, env = "METADATA_PREFIX")]
    pub metadata_prefix: String,
}

impl From<HarvesterArgs> for OaiConfig {
    fn from(value: HarvesterArgs) -> Self {
        OaiConfig::new(value.url, value.metadata_prefix)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HarvestSummary {
    pub pages: usize,
    pub records: usize,
}

pub struct Harvester {
    config: OaiConfig,
    client: Client,
}

impl Harvester {
    pub fn new(config: OaiConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { config, client })
    }

    /// Walks the whole `ListRecords` result set, one page at a time, until a
    /// response comes back without a resumption token.
    pub async fn run<W: Write>(&self, console: &mut Console<W>) -> anyhow::Result<HarvestSummary> {
        list_records::run(self, console).await
    }
}
