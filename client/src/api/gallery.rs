use std::io::Write;

use tracing::debug;

use crate::{BooruClient, BooruError};
use common::{ImageDto, ImageUpdate, TagRef};

pub struct GalleryApi<'a> {
    client: &'a BooruClient,
}

impl<'a> GalleryApi<'a> {
    pub(crate) const fn new(client: &'a BooruClient) -> Self {
        Self { client }
    }

    /// Fetches one image; the backend counts this as a view.
    pub fn get(&self, id: u64) -> Result<ImageDto, BooruError> {
        self.client.get(&format!("images/{id}"))
    }

    pub fn delete(&self, id: u64) -> Result<(), BooruError> {
        self.client.delete(&format!("images/{id}"))
    }

    pub fn update(&self, id: u64, update: &ImageUpdate) -> Result<ImageDto, BooruError> {
        self.client.put(&format!("images/{id}"), Some(update))
    }

    pub fn regenerate_tags(&self, id: u64) -> Result<ImageDto, BooruError> {
        self.client
            .post::<_, ()>(&format!("images/{id}/tags/regenerate"), None)
    }

    pub fn add_tag(&self, id: u64, tag: &TagRef) -> Result<ImageDto, BooruError> {
        self.client.post(&format!("images/{id}/tags"), Some(tag))
    }

    pub fn remove_tag(&self, id: u64, tag_id: u64) -> Result<ImageDto, BooruError> {
        self.client.delete_with(&format!("images/{id}/tags/{tag_id}"))
    }

    pub fn delete_many(&self, ids: &[u64]) -> Result<(), BooruError> {
        self.client.post_unit("images/batch/delete", Some(ids))
    }

    /// Streams the zip archive of the given images into `writer`.
    /// Returns the number of bytes written.
    pub fn download_many<W: Write + ?Sized>(
        &self,
        ids: &[u64],
        writer: &mut W,
    ) -> Result<u64, BooruError> {
        let mut response = self.client.post_raw("images/batch/download", ids)?;
        let written = response.copy_to(writer)?;
        debug!("Downloaded {written} bytes for {} images", ids.len());
        Ok(written)
    }
}
