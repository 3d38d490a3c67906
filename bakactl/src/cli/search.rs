use clap::{Args, Subcommand};
use rand::Rng;
use tracing::debug;

use common::{DEFAULT_PAGE_SIZE, DEFAULT_SORT, ImageDto, Page, SearchRequest, Sort, TagQuery};

use super::{Command, CommandError, Context};
use crate::views;

#[derive(Args, Debug)]
pub struct SearchCommand {
    #[command(subcommand)]
    command: SearchSubCommand,
}

#[derive(Args, Debug)]
struct Criteria {
    #[arg(help = "Tags to match, '-tag' excludes (after '--' or inside quotes)")]
    tags: Vec<String>,
    #[arg(short = 'x', long, value_name = "TAG", help = "Exclude a tag")]
    exclude: Vec<String>,
    #[arg(short, long, help = "Match title or file name")]
    keyword: Option<String>,
    #[arg(long, help = "Random order, with a fresh seed", conflicts_with = "seed")]
    random: bool,
    #[arg(long, help = "Random order with a fixed seed")]
    seed: Option<String>,
    #[arg(long)]
    width_min: Option<u32>,
    #[arg(long)]
    width_max: Option<u32>,
    #[arg(long)]
    height_min: Option<u32>,
    #[arg(long)]
    height_max: Option<u32>,
    #[arg(long, help = "Minimum file size in bytes")]
    size_min: Option<u64>,
    #[arg(long, help = "Maximum file size in bytes")]
    size_max: Option<u64>,
    #[arg(short, long, default_value_t = 1, help = "Page number, starting at 1")]
    page: u32,
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    per_page: u32,
    #[arg(long, default_value = DEFAULT_SORT, help = "Sort as property,asc|desc")]
    sort: Sort,
}

impl Criteria {
    fn tag_query(&self) -> TagQuery {
        let query = TagQuery::parse(&self.tags.join(" "));
        self.exclude.iter().fold(query, |q, tag| q.exclude(tag))
    }

    fn to_request(&self) -> Result<SearchRequest, CommandError> {
        if self.page == 0 {
            return Err(CommandError::Generic(
                "Page numbers start at 1".to_string(),
            ));
        }
        let query = self.tag_query();
        let random_seed = if self.random {
            Some(rand::rng().random::<u32>().to_string())
        } else {
            self.seed.clone()
        };
        let request = SearchRequest {
            tags: (!query.is_empty()).then(|| query.to_string()),
            keyword: self
                .keyword
                .as_deref()
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string),
            random_seed,
            width_min: self.width_min,
            width_max: self.width_max,
            height_min: self.height_min,
            height_max: self.height_max,
            size_min: self.size_min,
            size_max: self.size_max,
            page: Some(self.page.saturating_sub(1)),
            size: Some(self.per_page),
            sort: Some(self.sort.clone()),
        };
        request.validate().map_err(CommandError::Generic)?;
        Ok(request)
    }
}

#[derive(Subcommand, Debug)]
#[command(about = "Search the gallery")]
enum SearchSubCommand {
    #[command(about = "Search images by tags and attributes")]
    Run {
        #[command(flatten)]
        criteria: Criteria,
        #[arg(long, help = "Fetch every page after the requested one")]
        all: bool,
        #[arg(short, long, help = "Print image ids only")]
        quiet: bool,
        #[arg(long, conflicts_with = "quiet")]
        json: bool,
    },
    #[command(about = "Turn a natural language description into a tag expression")]
    Parse {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
        #[arg(long, help = "Search with the resulting tags")]
        run: bool,
        #[arg(long)]
        json: bool,
    },
}

impl Command for SearchCommand {
    fn execute(&self, ctx: &mut Context) -> Result<(), CommandError> {
        match &self.command {
            SearchSubCommand::Run {
                criteria,
                all,
                quiet,
                json,
            } => {
                let request = criteria.to_request()?;
                let pages = fetch_pages(ctx, request, *all)?;
                print_pages(ctx, &pages, *quiet, *json)?;
            }
            SearchSubCommand::Parse { text, run, json } => {
                let text = text.join(" ");
                let tags = ctx.client.search().parse(&text)?;
                debug!("Parsed '{text}' into '{tags}'");
                if !run {
                    println!("{tags}");
                    return Ok(());
                }
                let request = SearchRequest {
                    tags: (!tags.trim().is_empty()).then_some(tags),
                    ..views::gallery_request()
                };
                let pages = fetch_pages(ctx, request, false)?;
                print_pages(ctx, &pages, false, *json)?;
            }
        }
        Ok(())
    }
}

fn fetch_pages(
    ctx: &Context,
    mut request: SearchRequest,
    all: bool,
) -> Result<Vec<Page<ImageDto>>, CommandError> {
    let mut pages = Vec::new();
    loop {
        let page = ctx.client.search().search(&request)?;
        let next = page.next_page();
        pages.push(page);
        match next.filter(|_| all) {
            Some(number) => request.page = Some(number),
            None => break,
        }
    }
    Ok(pages)
}

fn print_pages(
    ctx: &Context,
    pages: &[Page<ImageDto>],
    quiet: bool,
    json: bool,
) -> Result<(), CommandError> {
    if json {
        let images: Vec<&ImageDto> = pages.iter().flat_map(|p| &p.content).collect();
        println!("{}", serde_json::to_string_pretty(&images)?);
    } else if quiet {
        for image in pages.iter().flat_map(|p| &p.content) {
            println!("{}", image.id);
        }
    } else {
        for page in pages {
            views::print_page(page, ctx.palette());
        }
    }
    Ok(())
}
