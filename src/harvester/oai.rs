use reqwest::Url;

pub const OAI_NAMESPACE: &str = "http://www.openarchives.org/OAI/2.0/";
pub const DEFAULT_METADATA_PREFIX: &str = "marcxchange";

const LIST_RECORDS: &str = "ListRecords";

#[derive(Debug, Clone)]
pub struct OaiConfig {
    pub endpoint: Url,
    pub metadata_prefix: String,
}

impl OaiConfig {
    pub fn new(endpoint: Url, metadata_prefix: String) -> Self {
        Self {
            endpoint,
            metadata_prefix,
        }
    }

    /// Full `ListRecords` url for the given pagination state, or `None` once
    /// the harvest has finished.
    pub fn list_records_url(&self, pagination: &Pagination) -> Option<Url> {
        let mut url = self.endpoint.clone();
        url.set_query(None);

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("verb", LIST_RECORDS);
            match pagination {
                Pagination::Initial => query.append_pair("metadataPrefix", &self.metadata_prefix),
                Pagination::Resume(token) => query.append_pair("resumptionToken", token),
                Pagination::Finished => return None,
            };
        }

        Some(url)
    }
}

/// Where the harvest stands between two requests.
///
/// `Initial` and `Finished` both mean "no token", but only `Finished` stops
/// the loop. A blank token element sends the loop back to `Initial`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Pagination {
    #[default]
    Initial,
    Resume(String),
    Finished,
}

impl Pagination {
    /// State following a response whose token element was `token`
    /// (`None` when the element was absent).
    pub fn next(token: Option<&str>) -> Self {
        match token {
            None => Pagination::Finished,
            Some(token) if token.trim().is_empty() => Pagination::Initial,
            Some(token) => Pagination::Resume(token.to_string()),
        }
    }
}
