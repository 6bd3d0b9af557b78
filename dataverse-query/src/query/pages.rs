//! Cookie-driven page stream.

use async_stream::try_stream;
use futures::Stream;
use log::debug;

use crate::error::Error;

use super::descriptor::QueryDescriptor;
use super::page::Page;
use super::port::FromRecord;
use super::port::RetrievalPort;

/// Returns the page number following the one `query` is positioned on.
fn next_page_number(query: &QueryDescriptor) -> Result<u32, Error> {
    let current = query.page_info.page_number;
    current.checked_add(1).ok_or_else(|| Error::PageOverflow {
        entity: query.entity_name.clone(),
        page: current,
    })
}

/// Streams every page of `query`, starting from page 1 without a cookie.
///
/// Pages are requested one at a time: each request carries the cookie of
/// the page before it. The stream ends after the first page whose
/// `more_records` is false, or after the first error.
pub(crate) fn page_stream<'a, P, T>(
    port: &'a P,
    mut query: QueryDescriptor,
) -> impl Stream<Item = Result<Page<T>, Error>> + 'a
where
    P: RetrievalPort + ?Sized,
    T: FromRecord + 'a,
{
    query.page_info.page_number = 1;
    query.page_info.paging_cookie = None;

    try_stream! {
        loop {
            debug!(
                "Fetching '{}' page {} (cookie: {})",
                query.entity_name,
                query.page_info.page_number,
                query.page_info.paging_cookie.is_some()
            );

            let page = port.retrieve_page(&query).await?;
            let more_records = page.more_records();
            let next_cookie = page.paging_cookie().map(ToOwned::to_owned);

            debug!(
                "Received {} '{}' records (more: {})",
                page.len(),
                query.entity_name,
                more_records
            );
            yield page.map_records::<T>()?;

            if !more_records {
                break;
            }
            query.page_info.page_number = next_page_number(&query)?;
            query.page_info.paging_cookie = next_cookie;
        }
    }
}
