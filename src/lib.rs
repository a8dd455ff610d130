mod console;
mod harvester;

pub use console::{Colored, Console};
pub use harvester::{
    DEFAULT_METADATA_PREFIX, DecodedToken, HarvestSummary, Harvester, HarvesterArgs,
    ListRecordsPage, OAI_NAMESPACE, OaiConfig, OaiError, Pagination, parse_list_records,
};
