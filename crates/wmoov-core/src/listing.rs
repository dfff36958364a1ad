//! Listing page extraction
//!
//! Walks the movie headings of a loaded "now showing" page and builds one
//! [`Movie`] per accepted heading. Rating, genres, popularity and the detail
//! link are read from the heading's own container only, so one entry's fields
//! never leak into its neighbour's record. A container that holds several
//! headings is not used; only the heading itself is read then.

use log::{debug, info, warn};

use crate::config::Selectors;
use crate::driver::{Element, Tab};
use crate::error::Result;
use crate::parser::{extract_genres, extract_popularity, extract_rating, normalize_title};
use crate::types::{DetailRef, Movie};

/// Extract the movies listed on the page loaded in `tab`.
///
/// Headings that are section labels or fail to read are skipped. At most
/// `limit` movies are returned when a limit is given.
///
/// # Errors
/// Only fails when the headings themselves cannot be queried.
pub async fn extract_listing<T: Tab>(
    tab: &T,
    selectors: &Selectors,
    limit: Option<usize>,
) -> Result<Vec<Movie>> {
    let headings = tab.find_all(&selectors.heading).await?;
    debug!("Found {} headings on listing page", headings.len());

    let mut movies = Vec::new();
    for heading in &headings {
        if limit.is_some_and(|max| movies.len() >= max) {
            debug!("Reached limit of {} movies", movies.len());
            break;
        }

        match extract_movie(heading, selectors).await {
            Ok(Some(movie)) => movies.push(movie),
            Ok(None) => {}
            Err(e) => warn!("Skipping listing entry: {}", e),
        }
    }

    info!("Found {} movies on listing page", movies.len());
    Ok(movies)
}

async fn extract_movie<E: Element>(heading: &E, selectors: &Selectors) -> Result<Option<Movie>> {
    let raw = heading.inner_text().await?;
    let Some(title) = normalize_title(&raw) else {
        debug!("Ignoring heading {:?}", raw.trim());
        return Ok(None);
    };

    let Some(container) = heading.parent().await? else {
        warn!("No container around '{}', skipping", title);
        return Ok(None);
    };

    // A parent shared with other headings belongs to no single movie
    let shared = container.find_all(&selectors.heading).await?.len() > 1;
    let scope = if shared {
        debug!("Container of '{}' holds other headings, reading the heading only", title);
        heading
    } else {
        &container
    };

    let detail = resolve_detail(heading, scope, selectors).await?;

    let mut rating_texts = Vec::new();
    for candidate in scope.find_all(&selectors.rating).await? {
        rating_texts.push(candidate.inner_text().await?);
    }
    let text = scope.inner_text().await?;

    let mut movie = Movie::new(title, detail);
    movie.rating = extract_rating(&rating_texts);
    movie.genres = extract_genres(&text);
    movie.popularity = extract_popularity(&text);

    debug!(
        "Listing entry '{}': rating {:?}, {} genres, popularity {}",
        movie.title,
        movie.rating,
        movie.genres.len(),
        movie.popularity
    );
    Ok(Some(movie))
}

/// Link inside the heading first, then any detail link in `scope`
async fn resolve_detail<E: Element>(
    heading: &E,
    scope: &E,
    selectors: &Selectors,
) -> Result<DetailRef> {
    if let Some(link) = heading.find(&selectors.heading_link).await? {
        if let Some(href) = link.attribute("href").await? {
            if href.contains(&selectors.detail_path) {
                return Ok(DetailRef::Resolved(href));
            }
        }
    }

    if let Some(link) = scope.find(&selectors.detail_link()).await? {
        if let Some(href) = link.attribute("href").await? {
            return Ok(DetailRef::Resolved(href));
        }
    }

    Ok(DetailRef::Unresolved)
}
