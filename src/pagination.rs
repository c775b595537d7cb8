//! Collects every page of a cursor-paginated endpoint.

use std::future::Future;

/// Calls `fetch` with the page token of the previous page (none for the
/// first one) and `page_size`, until a page comes back without a next page
/// token or with an empty one.
///
/// Items are returned in page order. The first error ends the loop and is
/// returned as is; items of the pages fetched before it are dropped.
pub async fn collect_all_pages<T, E, F, Fut>(page_size: u32, mut fetch: F) -> Result<Vec<T>, E>
where
    F: FnMut(Option<String>, u32) -> Fut,
    Fut: Future<Output = Result<(Vec<T>, Option<String>), E>>,
{
    let mut items = Vec::new();
    let mut page_token: Option<String> = None;
    loop {
        let (page, next_page) = fetch(page_token.take(), page_size).await?;
        items.extend(page);
        match next_page {
            Some(token) if !token.is_empty() => page_token = Some(token),
            _ => return Ok(items),
        }
    }
}
