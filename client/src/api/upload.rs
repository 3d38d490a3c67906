use std::path::Path;

use reqwest::blocking::multipart::{Form, Part};
use uuid::Uuid;

use crate::{BooruClient, BooruError};
use common::TasksInfo;

pub struct UploadApi<'a> {
    client: &'a BooruClient,
}

impl<'a> UploadApi<'a> {
    pub(crate) const fn new(client: &'a BooruClient) -> Self {
        Self { client }
    }

    /// Uploads one file as the `file` part of a multipart form.
    pub fn file(&self, path: &Path) -> Result<(), BooruError> {
        let form = file_form(path)?;
        self.client.post_multipart("upload", form)
    }

    pub fn tasks(&self) -> Result<TasksInfo, BooruError> {
        self.client.get("upload/tasks")
    }

    pub fn retry(&self, id: &Uuid) -> Result<(), BooruError> {
        self.client
            .post_query("upload/tasks", &[("id", id.to_string())])
    }

    pub fn delete(&self, id: &Uuid) -> Result<(), BooruError> {
        self.client.delete(&format!("upload/tasks/{id}"))
    }

    pub fn clear_failed(&self) -> Result<(), BooruError> {
        self.client.delete("upload/tasks")
    }
}

/// Builds the multipart form carrying `path` under the `file` field.
pub(crate) fn file_form(path: &Path) -> Result<Form, BooruError> {
    let filename = upload_file_name(path)
        .ok_or_else(|| BooruError::InvalidFile(format!("no file name in {}", path.display())))?;
    let part = Part::file(path)?.file_name(filename);
    Ok(Form::new().part("file", part))
}

/// Last component of `path`, with any `/` or `\` separated prefix removed.
pub(crate) fn upload_file_name(path: &Path) -> Option<String> {
    let raw = path.to_string_lossy();
    raw.rsplit(['/', '\\'])
        .next()
        .filter(|name| !name.is_empty())
        .map(ToString::to_string)
}
