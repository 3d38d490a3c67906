mod auth;
mod gallery;
mod search;
mod system;
mod tags;
mod upload;

pub use auth::AuthApi;
pub use gallery::GalleryApi;
pub use search::SearchApi;
pub use system::SystemApi;
pub use tags::TagsApi;
pub use upload::UploadApi;
