use crate::{BooruClient, BooruError};
use common::{ImageDto, Page, SearchRequest};

pub struct SearchApi<'a> {
    client: &'a BooruClient,
}

impl<'a> SearchApi<'a> {
    pub(crate) const fn new(client: &'a BooruClient) -> Self {
        Self { client }
    }

    pub fn search(&self, request: &SearchRequest) -> Result<Page<ImageDto>, BooruError> {
        self.client.post("search", Some(request))
    }

    /// Turns a natural language query into a tag search expression.
    pub fn parse(&self, query: &str) -> Result<String, BooruError> {
        self.client.post_text("search/parse", query)
    }
}
