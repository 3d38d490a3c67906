mod auth;
mod constants;
mod error;
mod image;
mod page;
mod search;
mod settings;
mod tag;
mod upload;

pub use auth::{AuthStatus, LoginResponse, PasswordRequest};
pub use constants::*;
pub use error::ErrorBody;
pub use image::{ImageDto, ImageTagDto, ImageUpdate};
pub use page::Page;
pub use search::{Direction, InvalidSort, SearchRequest, Sort, TagQuery};
pub use settings::{Settings, SettingsIter};
pub use tag::{InvalidTagRef, TagDto, TagRef, TagType};
pub use upload::{TasksInfo, UploadTask};
