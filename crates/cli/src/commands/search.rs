//! Search.

use nijitter_client::{DebouncedSearch, SEARCH_DEBOUNCE};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::Context;
use crate::render::{line, print_search, status};

/// Run one search.
///
/// # Errors
///
/// Returns an error if the request fails.
pub async fn once(ctx: &Context, query: &str) -> Result<(), Box<dyn std::error::Error>> {
    let search = DebouncedSearch::new(ctx.api.clone(), SEARCH_DEBOUNCE);
    let results = search.search_now(query).await?;
    print_search(&results, ctx.image_base());
    Ok(())
}

/// Read queries from stdin, one per line, and print the results of the
/// latest one. Lines arriving within the debounce window replace each other.
///
/// # Errors
///
/// Returns an error if stdin cannot be read.
pub async fn interactive(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let search = DebouncedSearch::new(ctx.api.clone(), SEARCH_DEBOUNCE);
    let mut results = search.subscribe();
    let image_base = ctx.config.image_url.clone();

    let printer = tokio::spawn(async move {
        while results.changed().await.is_ok() {
            let state = results.borrow_and_update().clone();
            if state.query.is_empty() {
                status("(cleared)");
            } else {
                line(&format!("--- {} ---", state.query));
                print_search(&state.results, image_base.as_deref());
            }
        }
    });

    status("Type a query and press Enter (Ctrl+D to quit)");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(input) = lines.next_line().await? {
        search.push(&input);
    }

    // Let the last query settle before exiting.
    tokio::time::sleep(SEARCH_DEBOUNCE * 2).await;
    printer.abort();
    Ok(())
}
