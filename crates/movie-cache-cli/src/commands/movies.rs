use super::context::AppContext;
use crate::output::Output;
use color_eyre::Result;
use comfy_table::{Cell, Color, Table};
use movie_cache_core::{follow_favorites, DetailView, MovieFeed, PageLoad};
use movie_cache_models::{Movie, MovieId};
use owo_colors::OwoColorize;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

fn movies_table(movies: &[Movie]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("ID").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Title").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Released").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Lang").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Rating").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Fav").add_attribute(comfy_table::Attribute::Bold),
    ]);
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);

    for movie in movies {
        let favorite = if movie.is_favorite {
            Cell::new("★").fg(Color::Yellow)
        } else {
            Cell::new("")
        };
        table.add_row(vec![
            Cell::new(movie.id),
            Cell::new(movie.title.as_deref().unwrap_or("-")),
            Cell::new(movie.release_date.as_deref().unwrap_or("-")),
            Cell::new(movie.original_language.as_deref().unwrap_or("-")),
            Cell::new(
                movie
                    .vote_average
                    .map(|v| format!("{:.1}", v))
                    .unwrap_or_else(|| "-".to_string()),
            ),
            favorite,
        ]);
    }
    table
}

pub async fn run_page(ctx: &AppContext, page: u32, output: &Output) -> Result<()> {
    let repository = ctx.repository()?;
    let movie_page = repository.fetch_page(page).await?;
    if !output.is_human() {
        output.json(&serde_json::to_value(&movie_page)?);
        return Ok(());
    }
    if output.is_quiet() {
        return Ok(());
    }

    println!(
        "\n{} {}\n",
        "Discover".bright_cyan().bold(),
        format!("page {} of {} ({} results)", movie_page.page, movie_page.total_pages, movie_page.total_results).dimmed()
    );
    println!("{}", movies_table(&movie_page.movies));
    Ok(())
}

pub async fn run_detail(ctx: &AppContext, id: MovieId, output: &Output) -> Result<()> {
    let repository = ctx.repository()?;
    let view = DetailView::new(Arc::clone(&repository), id);
    let detail = view.load().await?;
    let poster_url = repository.image_url(detail.poster_path.as_deref(), None);
    let backdrop_url = repository.image_url(detail.backdrop_path.as_deref(), Some("original"));

    if !output.is_human() {
        let mut value = serde_json::to_value(&detail)?;
        if let Some(map) = value.as_object_mut() {
            map.insert("poster_url".to_string(), json!(poster_url.as_ref().map(|u| u.as_str())));
            map.insert("backdrop_url".to_string(), json!(backdrop_url.as_ref().map(|u| u.as_str())));
        }
        output.json(&value);
        return Ok(());
    }
    if output.is_quiet() {
        return Ok(());
    }

    let title = detail.title.as_deref().unwrap_or("Untitled");
    if detail.is_favorite {
        println!("\n{} {}\n", title.bright_cyan().bold(), "★".yellow());
    } else {
        println!("\n{}\n", title.bright_cyan().bold());
    }

    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table.add_row(vec!["ID".to_string(), detail.id.to_string()]);
    table.add_row(vec!["Released".to_string(), detail.release_date.clone().unwrap_or_else(|| "-".to_string())]);
    table.add_row(vec!["Language".to_string(), detail.original_language.clone().unwrap_or_else(|| "-".to_string())]);
    table.add_row(vec![
        "Rating".to_string(),
        detail.vote_average.map(|v| format!("{:.1}", v)).unwrap_or_else(|| "-".to_string()),
    ]);
    table.add_row(vec![
        "Poster".to_string(),
        poster_url.map(|u| u.to_string()).unwrap_or_else(|| "-".to_string()),
    ]);
    table.add_row(vec![
        "Backdrop".to_string(),
        backdrop_url.map(|u| u.to_string()).unwrap_or_else(|| "-".to_string()),
    ]);
    println!("{}", table);

    if let Some(overview) = detail.overview.as_deref().filter(|o| !o.is_empty()) {
        println!("\n{}", overview);
    }
    Ok(())
}

pub async fn run_favorite(ctx: &AppContext, id: MovieId, output: &Output) -> Result<()> {
    let repository = ctx.local_repository()?;
    let mut subscription = repository.subscribe();

    let is_favorite = repository.toggle_favorite(id).await?;
    let notified = std::iter::from_fn(|| subscription.try_recv()).find(|change| change.id == id);
    debug!("Favorite change seen by subscriber: {:?}", notified);

    if !output.is_human() {
        output.json(&json!({ "id": id, "is_favorite": is_favorite, "notified": notified }));
        return Ok(());
    }
    if is_favorite {
        output.success(format!("Movie {} marked as favorite", id));
    } else {
        output.success(format!("Movie {} removed from favorites", id));
    }
    if let Some(change) = notified {
        output.info(format!("Subscribers notified: {} -> {}", change.id, change.is_favorite));
    }
    Ok(())
}

pub async fn run_status(ctx: &AppContext, id: MovieId, output: &Output) -> Result<()> {
    let repository = ctx.local_repository()?;
    let is_favorite = repository.is_favorite(id)?;

    if !output.is_human() {
        output.json(&json!({ "id": id, "is_favorite": is_favorite }));
    } else if is_favorite {
        output.info(format!("Movie {} is a favorite", id));
    } else {
        output.info(format!("Movie {} is not a favorite", id));
    }
    Ok(())
}

/// Walk the listing the way a scrolling consumer would: load the first page,
/// then keep prefetching as the last rows come into view.
pub async fn run_browse(ctx: &AppContext, pages: u32, output: &Output) -> Result<()> {
    let repository = ctx.repository()?;
    let feed = Arc::new(MovieFeed::new(Arc::clone(&repository)));
    let follower = follow_favorites(&feed, repository.subscribe());

    feed.load_first_page().await?;
    while feed.current_page() < pages.max(1) {
        let last_row = feed.len().saturating_sub(1);
        if !feed.should_prefetch(last_row) {
            break;
        }
        match feed.load_next_page().await? {
            PageLoad::Loaded { page, added } => debug!("Browse loaded page {} (+{} movies)", page, added),
            PageLoad::Skipped => break,
        }
    }

    let movies = feed.movies();
    let current_page = feed.current_page();
    let total_pages = feed.total_pages();
    drop(feed);
    follower.abort();

    if !output.is_human() {
        output.json(&json!({
            "pages_loaded": current_page,
            "total_pages": total_pages,
            "movies": movies,
        }));
        return Ok(());
    }
    if output.is_quiet() {
        return Ok(());
    }

    println!(
        "\n{} {}\n",
        "Browse".bright_cyan().bold(),
        format!("{} movies from {} of {} pages", movies.len(), current_page, total_pages).dimmed()
    );
    println!("{}", movies_table(&movies));
    Ok(())
}
