// Settings keys understood by the backend
pub const SETTING_UPLOAD_MAX_FILE_SIZE: &str = "upload.max-file-size";
pub const SETTING_UPLOAD_ALLOWED_EXTENSIONS: &str = "upload.allowed-extensions";
pub const SETTING_THUMBNAIL_SIZE: &str = "file.thumbnail.size";
pub const SETTING_LLM_URL: &str = "llm.url";
pub const SETTING_LLM_MODEL: &str = "llm.model";
pub const SETTING_LLM_API_KEY: &str = "llm.api-key";

pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;
pub const DEFAULT_ALLOWED_EXTENSIONS: &str = "jpg,png,webp,gif,jpeg";

// Gallery paging
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const DEFAULT_SORT: &str = "createdAt,desc";

// Prefix marking an excluded tag in a tag search expression
pub const EXCLUDE_PREFIX: char = '-';
