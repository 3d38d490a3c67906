use crate::{BooruClient, BooruError};
use common::TagDto;

pub struct TagsApi<'a> {
    client: &'a BooruClient,
}

impl<'a> TagsApi<'a> {
    pub(crate) const fn new(client: &'a BooruClient) -> Self {
        Self { client }
    }

    /// Lists all tags, or the tags matching `query` when it is not blank.
    pub fn list(&self, query: Option<&str>) -> Result<Vec<TagDto>, BooruError> {
        match query.map(str::trim).filter(|q| !q.is_empty()) {
            Some(q) => self.client.get_query("tags", &[("query", q)]),
            None => self.client.get("tags"),
        }
    }
}
