//! Terminal renderings of backend data, and the screen attached to each
//! route.

use comfy_table::{Cell, ContentArrangement, Table, presets::UTF8_FULL};

use client::{BooruClient, BooruError, QueueStats, UploadReport};
use common::{
    AuthStatus, DEFAULT_PAGE_SIZE, DEFAULT_SORT, ImageDto, Page, SearchRequest, Settings, TagDto,
    TasksInfo, UploadTask,
};

use crate::router::Route;
use crate::theme::Palette;

const SECRET_MASK: &str = "********";

/// Fetches what the route shows and prints it.
pub fn render(route: Route, client: &BooruClient, palette: Palette) -> Result<(), BooruError> {
    match route {
        Route::Gallery => {
            let page = client.search().search(&gallery_request())?;
            print_page(&page, palette);
        }
        Route::Upload => {
            let tasks = client.upload().tasks()?;
            println!("{}", tasks_table(&tasks));
        }
        Route::Settings => {
            let settings = client.system().settings()?;
            println!("{}", settings_table(&settings, false));
        }
        Route::Login => {
            let status = client.auth().status()?;
            print_login(&status, client.has_token());
        }
    }
    Ok(())
}

/// First page of the gallery, newest first.
#[must_use]
pub fn gallery_request() -> SearchRequest {
    SearchRequest {
        page: Some(0),
        size: Some(DEFAULT_PAGE_SIZE),
        sort: DEFAULT_SORT.parse().ok(),
        ..SearchRequest::default()
    }
}

pub fn print_login(status: &AuthStatus, has_token: bool) {
    println!("Backend: {status}");
    if !status.initialized {
        println!("Run 'bakactl auth setup' to set the gallery password");
    } else if status.password_set && !has_token {
        println!("Login required: run 'bakactl auth login'");
    } else if has_token {
        println!("A session token is stored");
    }
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn tag_cell(name: &str, kind: &common::TagType, palette: Palette) -> Cell {
    let cell = Cell::new(name);
    match palette.tag_color(kind) {
        Some(color) => cell.fg(color),
        None => cell,
    }
}

#[must_use]
pub fn images_table(images: &[ImageDto]) -> Table {
    let mut table = new_table(vec!["ID", "Title", "Size", "Dimensions", "Tags", "Created"]);
    for image in images {
        table.add_row(vec![
            Cell::new(image.id),
            Cell::new(&image.title),
            Cell::new(format_size(image.size)),
            Cell::new(format!("{}x{}", image.width, image.height)),
            Cell::new(image.tags.len()),
            Cell::new(image.created_at.format("%Y-%m-%d %H:%M")),
        ]);
    }
    table
}

pub fn print_page(page: &Page<ImageDto>, palette: Palette) {
    if page.empty {
        println!("No images found");
        return;
    }
    println!("{}", images_table(&page.content));
    println!("{}", palette.highlight(&page_footer(page)));
}

#[must_use]
pub fn page_footer<T>(page: &Page<T>) -> String {
    format!(
        "Page {}/{} ({} images)",
        page.number.saturating_add(1),
        page.total_pages.max(1),
        page.total_elements
    )
}

#[must_use]
pub fn image_table(image: &ImageDto) -> Table {
    let mut table = new_table(vec!["Field", "Value"]);
    let rows: Vec<(&str, String)> = vec![
        ("ID", image.id.to_string()),
        ("Title", image.title.clone()),
        ("File", image.file_name.clone()),
        ("Size", format_size(image.size)),
        ("Dimensions", format!("{}x{}", image.width, image.height)),
        ("Hash", image.hash.clone()),
        ("Views", image.view_count.to_string()),
        ("Created", image.created_at.to_rfc3339()),
        ("Updated", image.updated_at.to_rfc3339()),
        ("URL", image.url.clone()),
        ("Thumbnail", image.thumbnail_url.clone()),
    ];
    for (field, value) in rows {
        table.add_row(vec![Cell::new(field), Cell::new(value)]);
    }
    table
}

#[must_use]
pub fn image_tags_table(image: &ImageDto, palette: Palette) -> Table {
    let mut table = new_table(vec!["ID", "Tag", "Type", "Score"]);
    for tag in &image.tags {
        table.add_row(vec![
            Cell::new(tag.id),
            tag_cell(&tag.name, &tag.kind, palette),
            Cell::new(&tag.kind),
            Cell::new(tag.score.map(|s| format!("{s:.2}")).unwrap_or_default()),
        ]);
    }
    table
}

pub fn print_image(image: &ImageDto, palette: Palette) {
    println!("{}", image_table(image));
    if image.tags.is_empty() {
        println!("No tags");
    } else {
        println!("{}", image_tags_table(image, palette));
    }
}

#[must_use]
pub fn tags_table(tags: &[TagDto], palette: Palette) -> Table {
    let mut table = new_table(vec!["ID", "Name", "Type"]);
    for tag in tags {
        table.add_row(vec![
            Cell::new(tag.id),
            tag_cell(&tag.name, &tag.kind, palette),
            Cell::new(&tag.kind),
        ]);
    }
    table
}

/// Settings as a key/value table. Secret values are masked unless `reveal`.
#[must_use]
pub fn settings_table(settings: &Settings, reveal: bool) -> Table {
    let mut table = new_table(vec!["Key", "Value"]);
    for (key, value) in settings {
        let value = if !reveal && Settings::is_secret(key) && !value.is_empty() {
            SECRET_MASK
        } else {
            value
        };
        table.add_row(vec![Cell::new(key), Cell::new(value)]);
    }
    table
}

fn task_row(state: &str, task: &UploadTask) -> Vec<Cell> {
    vec![
        Cell::new(state),
        Cell::new(task.id),
        Cell::new(&task.filename),
        Cell::new(format_size(task.size)),
        Cell::new(task.error_message.as_deref().unwrap_or_default()),
    ]
}

#[must_use]
pub fn tasks_table(tasks: &TasksInfo) -> Table {
    let mut table = new_table(vec!["State", "ID", "File", "Size", "Error"]);
    if let Some(task) = &tasks.processing_task {
        table.add_row(task_row("processing", task));
    }
    for task in &tasks.failed_tasks {
        table.add_row(task_row("failed", task));
    }
    table.add_row(vec![
        Cell::new("pending"),
        Cell::new(""),
        Cell::new(format!("{} file(s)", tasks.pending_count)),
        Cell::new(""),
        Cell::new(""),
    ]);
    table
}

/// One-line progress of the local upload queue.
#[must_use]
pub fn queue_progress(stats: &QueueStats) -> String {
    format!(
        "waiting {} | uploading {} | done {} | failed {}",
        stats.waiting, stats.processing, stats.completed, stats.failed
    )
}

pub fn print_upload_report(report: &UploadReport) {
    println!(
        "Uploaded {} file(s), {} failed",
        report.stats.completed, report.stats.failed
    );
    if report.failures.is_empty() {
        return;
    }
    let mut table = new_table(vec!["File", "Error"]);
    for failure in &report.failures {
        table.add_row(vec![
            Cell::new(failure.path.display()),
            Cell::new(&failure.error),
        ]);
    }
    println!("{table}");
}

/// Human readable byte count, binary units.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = "KiB";
    for next in UNITS.iter().skip(1) {
        if value < 1024.0 {
            break;
        }
        value /= 1024.0;
        unit = next;
    }
    format!("{value:.1} {unit}")
}
