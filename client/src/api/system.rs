use std::io::Write;
use std::path::Path;

use crate::api::upload::file_form;
use crate::{BooruClient, BooruError};
use common::Settings;

pub struct SystemApi<'a> {
    client: &'a BooruClient,
}

impl<'a> SystemApi<'a> {
    pub(crate) const fn new(client: &'a BooruClient) -> Self {
        Self { client }
    }

    pub fn settings(&self) -> Result<Settings, BooruError> {
        self.client.get("system/settings")
    }

    /// Updates the given keys; keys not present are left unchanged.
    pub fn update_settings(&self, settings: &Settings) -> Result<(), BooruError> {
        self.client.post_unit("system/settings", Some(settings))
    }

    pub fn clear_cache(&self) -> Result<(), BooruError> {
        self.client
            .post_unit::<()>("system/settings/clear-cache", None)
    }

    /// Streams a full system backup into `writer`.
    pub fn download_backup<W: Write + ?Sized>(&self, writer: &mut W) -> Result<u64, BooruError> {
        let mut response = self.client.get_raw("system/backup")?;
        Ok(response.copy_to(writer)?)
    }

    pub fn restore_backup(&self, path: &Path) -> Result<(), BooruError> {
        let form = file_form(path)?;
        self.client.post_multipart("system/backup/restore", form)
    }

    /// Deletes all data and resets the settings.
    pub fn reset(&self) -> Result<(), BooruError> {
        self.client.delete("system/backup/reset")
    }
}
