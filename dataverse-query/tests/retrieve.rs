//! Retrieval behaviour against a scripted in-memory port.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use dataverse_query::FromRecord;
use dataverse_query::QueryBuilder;
use dataverse_query::RetrievalPort;
use dataverse_query::error::Error;
use dataverse_query::model::Record;
use dataverse_query::query::Page;
use dataverse_query::query::PagingState;
use dataverse_query::query::QueryDescriptor;
use futures::TryStreamExt;
use serde::Deserialize;
use simplelog::Config;
use simplelog::LevelFilter;
use simplelog::TestLogger;

#[derive(Debug, thiserror::Error)]
#[error("throttled")]
struct Throttled;

/// Replays scripted responses and records every request it receives.
#[derive(Default)]
struct ScriptedPort {
    responses: Mutex<VecDeque<Result<Page, Throttled>>>,
    requests: Mutex<Vec<QueryDescriptor>>,
}

impl ScriptedPort {
    fn new(responses: impl IntoIterator<Item = Result<Page, Throttled>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn requests(&self) -> Vec<QueryDescriptor> {
        self.requests.lock().unwrap().clone()
    }

    /// (page number, cookie) of every request, in order.
    fn paging_log(&self) -> Vec<(u32, Option<String>)> {
        self.requests()
            .into_iter()
            .map(|q| (q.page_info.page_number, q.page_info.paging_cookie))
            .collect()
    }
}

#[async_trait]
impl RetrievalPort for ScriptedPort {
    async fn retrieve_page(&self, query: &QueryDescriptor) -> Result<Page, Error> {
        self.requests.lock().unwrap().push(query.clone());
        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(Ok(page)) => Ok(page),
            Some(Err(err)) => Err(Error::retrieval(err)),
            None => Ok(Page::new(Vec::new())),
        }
    }
}

fn init_logging() {
    let _ = TestLogger::init(LevelFilter::Trace, Config::default());
}

fn account(name: &str) -> Record {
    Record::new("account").set("name", name)
}

fn names(records: &[Record]) -> Vec<&str> {
    records
        .iter()
        .map(|r| r.get_string("name").unwrap().unwrap())
        .collect()
}

/// Three pages of 2, 2 and 1 records.
fn three_pages() -> Vec<Result<Page, Throttled>> {
    vec![
        Ok(Page::new(vec![account("a1"), account("a2")])
            .with_more_records(true)
            .with_paging_cookie("cookie-1")),
        Ok(Page::new(vec![account("a3"), account("a4")])
            .with_more_records(true)
            .with_paging_cookie("cookie-2")),
        Ok(Page::new(vec![account("a5")]).with_paging_cookie("cookie-3")),
    ]
}

#[tokio::test]
async fn test_retrieve_issues_one_request_with_current_page() {
    init_logging();
    let port = ScriptedPort::new([Ok(Page::new(vec![account("b"), account("a")])
        .with_more_records(true)
        .with_paging_cookie("next"))]);

    let mut query = port.query("account");
    query
        .include_columns(["name"])
        .page_info(PagingState::new().with_page(4).with_cookie("c3"));

    let records: Vec<Record> = query.retrieve().await.unwrap();

    assert_eq!(names(&records), ["b", "a"]);
    assert_eq!(port.paging_log(), [(4, Some("c3".to_string()))]);
    assert_eq!(query.expression().page_info.page_number, 4);
    assert_eq!(query.expression().page_info.paging_cookie.as_deref(), Some("c3"));
}

#[tokio::test]
async fn test_retrieve_all_follows_cookies() {
    init_logging();
    let port = ScriptedPort::new(three_pages());
    let query = port.query("account");

    let records: Vec<Record> = query.retrieve_all().await.unwrap();

    assert_eq!(names(&records), ["a1", "a2", "a3", "a4", "a5"]);
    assert_eq!(
        port.paging_log(),
        [
            (1, None),
            (2, Some("cookie-1".to_string())),
            (3, Some("cookie-2".to_string())),
        ]
    );
}

#[tokio::test]
async fn test_retrieve_all_restores_paging_state() {
    init_logging();
    let mut responses = three_pages();
    responses.push(Ok(Page::new(vec![account("again")])));
    let port = ScriptedPort::new(responses);

    let mut query = port.query("account");
    query
        .page_info(PagingState::new().with_page(7).with_cookie("saved"))
        .total_record_count(true)
        .page_size(Some(2));

    let all: Vec<Record> = query.retrieve_all().await.unwrap();
    assert_eq!(all.len(), 5);

    let paging = &query.expression().page_info;
    assert_eq!(paging.page_number, 7);
    assert_eq!(paging.paging_cookie.as_deref(), Some("saved"));

    let single: Vec<Record> = query.retrieve().await.unwrap();
    assert_eq!(names(&single), ["again"]);

    let requests = port.requests();
    assert_eq!(requests.len(), 4);
    assert_eq!(requests[3].page_info.page_number, 7);
    assert_eq!(requests[3].page_info.paging_cookie.as_deref(), Some("saved"));
    // Everything but the position is carried into every page request.
    assert!(requests.iter().all(|q| q.page_info.return_total_record_count));
    assert!(requests.iter().all(|q| q.page_info.count == Some(2)));
}

#[tokio::test]
async fn test_retrieve_all_failure_discards_partial_results() {
    init_logging();
    let mut responses = three_pages();
    responses[1] = Err(Throttled);
    let port = ScriptedPort::new(responses);

    let mut query = port.query("account");
    query.page_info(PagingState::new().with_page(3).with_cookie("mine"));

    let err = query.retrieve_all::<Record>().await.unwrap_err();

    assert!(err.is_retrieval());
    assert!(err.retrieval_source().unwrap().downcast_ref::<Throttled>().is_some());
    assert_eq!(port.requests().len(), 2);
    assert_eq!(query.expression().page_info.page_number, 3);
    assert_eq!(query.expression().page_info.paging_cookie.as_deref(), Some("mine"));
}

#[tokio::test]
async fn test_retrieve_all_keeps_duplicates_across_pages() {
    init_logging();
    let port = ScriptedPort::new([
        Ok(Page::new(vec![account("dup")])
            .with_more_records(true)
            .with_paging_cookie("c1")),
        Ok(Page::new(vec![account("dup")])),
    ]);

    let records: Vec<Record> = port.query("account").retrieve_all().await.unwrap();
    assert_eq!(names(&records), ["dup", "dup"]);
}

#[tokio::test]
async fn test_pages_exposes_continuation_state() {
    init_logging();
    let port = ScriptedPort::new([
        Ok(Page::new(vec![account("a1")])
            .with_more_records(true)
            .with_paging_cookie("c1")
            .with_total_record_count(2)),
        Ok(Page::new(vec![account("a2")]).with_total_record_count(2)),
    ]);

    let query = port.query("account");
    let pages: Vec<Page<Record>> = query.pages::<Record>().try_collect().await.unwrap();

    assert_eq!(pages.len(), 2);
    assert!(pages[0].more_records());
    assert_eq!(pages[0].paging_cookie(), Some("c1"));
    assert_eq!(pages[1].total_record_count(), Some(2));
    assert!(!pages[1].more_records());
}

#[tokio::test]
async fn test_request_carries_links_and_flags() {
    init_logging();
    let port = ScriptedPort::default();

    let mut query = port.query("account");
    query
        .include_columns(["name"])
        .database_lock(true)
        .unique_records(true)
        .record_count(Some(25))
        .link(|link| {
            link.from_attribute("primarycontactid")
                .to_entity("contact")
                .to_attribute("contactid")
                .alias("pc");
        });

    let _: Vec<Record> = query.retrieve().await.unwrap();

    let sent = &port.requests()[0];
    assert!(!sent.no_lock);
    assert!(sent.distinct);
    assert_eq!(sent.top_count, Some(25));
    assert_eq!(sent.links.len(), 1);
    assert_eq!(sent.links[0].from_entity, "account");
    assert!(sent.to_fetchxml().contains(
        r#"<link-entity name="contact" from="contactid" to="primarycontactid" link-type="inner" alias="pc"></link-entity>"#
    ));
}

#[derive(Debug, Deserialize, PartialEq)]
struct Account {
    name: String,
}

impl FromRecord for Account {
    fn from_record(record: Record) -> Result<Self, Error> {
        record.deserialize_into()
    }
}

#[tokio::test]
async fn test_records_map_into_typed_results() {
    init_logging();
    let port = ScriptedPort::new([Ok(Page::new(vec![account("Contoso")]))]);

    let accounts: Vec<Account> = QueryBuilder::new(&port, "account").retrieve().await.unwrap();
    assert_eq!(
        accounts,
        [Account {
            name: "Contoso".to_string()
        }]
    );
}

#[tokio::test]
async fn test_mapping_failure_propagates() {
    init_logging();
    let port = ScriptedPort::new([Ok(Page::new(vec![Record::new("account").set("name", 5i32)]))]);

    let err = port.query("account").retrieve::<Account>().await.unwrap_err();
    assert!(matches!(err, Error::Json(_)));
}
