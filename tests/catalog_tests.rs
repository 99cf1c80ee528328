use std::cell::RefCell;

use devportal::catalog::{CatalogSource, CatalogViewModel, PageDirection, QueryOutcome, ViewMode};
use devportal::error::PortalError;
use devportal::models::{CatalogEntry, ResultPage, SearchQuery};

/// In-memory catalog that records every query it answers.
struct FakeCatalog {
    names: Vec<String>,
    fail: bool,
    seen: RefCell<Vec<SearchQuery>>,
}

impl FakeCatalog {
    fn new(count: usize) -> Self {
        Self {
            names: (0..count).map(|i| format!("service-{:02}", i)).collect(),
            fail: false,
            seen: RefCell::new(vec![]),
        }
    }
}

impl CatalogSource for FakeCatalog {
    async fn search(&self, query: &SearchQuery) -> Result<ResultPage, PortalError> {
        self.seen.borrow_mut().push(query.clone());
        if self.fail {
            return Err(PortalError::Network("connection reset".into()));
        }
        let matching: Vec<&String> = self.names.iter().filter(|n| n.contains(&query.text)).collect();
        let items = matching
            .iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .map(|n| CatalogEntry {
                id: n.to_string(),
                name: n.to_string(),
                versions: vec![],
                description: None,
                has_documentation: false,
            })
            .collect();
        Ok(ResultPage { items, total_count: matching.len() as u64 })
    }
}

#[tokio::test]
async fn test_browse_thirty_seven_services() {
    let source = FakeCatalog::new(37);
    let mut vm = CatalogViewModel::new(12, 12);

    let t = vm.refresh();
    assert_eq!(vm.run(&source, t).await, QueryOutcome::Updated);
    assert_eq!(vm.pagination().current_range(), Some((1, 12)));

    let t = vm.change_page(PageDirection::Next).unwrap();
    vm.run(&source, t).await;
    assert_eq!(vm.pagination().current_range(), Some((13, 24)));
    assert_eq!(vm.page().items[0].name, "service-12");

    let t = vm.change_page(PageDirection::Last).unwrap();
    vm.run(&source, t).await;
    assert_eq!(vm.pagination().current_range(), Some((37, 37)));
    assert_eq!(vm.page().items.len(), 1);

    assert!(vm.change_page(PageDirection::Next).is_none());
    assert_eq!(source.seen.borrow().len(), 3);
}

#[tokio::test]
async fn test_out_of_order_responses() {
    let source = FakeCatalog::new(37);
    let mut vm = CatalogViewModel::new(12, 12);

    let first = vm.submit_query("service-0");
    let second = vm.submit_query("service-1");
    let (r1, r2) = futures_util::join!(source.search(first.query()), source.search(second.query()));

    assert_eq!(vm.apply(second, r2), QueryOutcome::Updated);
    assert_eq!(vm.apply(first, r1), QueryOutcome::Stale);
    assert_eq!(vm.text(), "service-1");
    assert_eq!(vm.page().total_count, 10);
    assert!(vm.page().items.iter().all(|e| e.name.starts_with("service-1")));
}

#[tokio::test]
async fn test_table_view_requeries_from_start() {
    let source = FakeCatalog::new(37);
    let mut vm = CatalogViewModel::new(12, 20);

    let t = vm.refresh();
    vm.run(&source, t).await;
    let t = vm.change_page(PageDirection::Next).unwrap();
    vm.run(&source, t).await;

    let t = vm.toggle_view_mode().unwrap();
    vm.run(&source, t).await;
    assert_eq!(vm.view_mode(), ViewMode::Table);
    assert_eq!(vm.pagination().current_range(), Some((1, 20)));
    let last = source.seen.borrow().last().cloned().unwrap();
    assert_eq!(last, SearchQuery { text: String::new(), offset: 0, limit: 20 });
}

#[tokio::test]
async fn test_failed_query_keeps_results_and_retries_same_place() {
    let mut source = FakeCatalog::new(37);
    let mut vm = CatalogViewModel::new(12, 12);
    let t = vm.refresh();
    vm.run(&source, t).await;

    source.fail = true;
    let t = vm.change_page(PageDirection::Next).unwrap();
    assert_eq!(vm.run(&source, t).await, QueryOutcome::Failed);
    assert_eq!(vm.page().items[0].name, "service-00");
    assert!(vm.error().unwrap().is_network());
    assert_eq!(vm.take_notices().len(), 1);

    source.fail = false;
    let t = vm.refresh();
    assert_eq!(vm.run(&source, t).await, QueryOutcome::Updated);
    assert!(vm.error().is_none());
    assert_eq!(vm.page().items[0].name, "service-12");
}

#[tokio::test]
async fn test_next_fail_next_does_not_skip_a_page() {
    let mut source = FakeCatalog::new(37);
    let mut vm = CatalogViewModel::new(12, 12);
    let t = vm.refresh();
    vm.run(&source, t).await;

    source.fail = true;
    let t = vm.change_page(PageDirection::Next).unwrap();
    vm.run(&source, t).await;
    assert_eq!(vm.page().items[0].name, "service-00");
    assert_eq!(vm.pagination().current_range(), Some((1, 12)));

    source.fail = false;
    let t = vm.change_page(PageDirection::Next).unwrap();
    assert_eq!(vm.run(&source, t).await, QueryOutcome::Updated);
    assert_eq!(vm.page().items[0].name, "service-12");
    assert_eq!(vm.pagination().current_range(), Some((13, 24)));
    let offsets: Vec<u64> = source.seen.borrow().iter().map(|q| q.offset).collect();
    assert_eq!(offsets, vec![0, 12, 12]);
}

#[tokio::test]
async fn test_catalog_shrinking_under_last_page_requeries() {
    let mut source = FakeCatalog::new(37);
    let mut vm = CatalogViewModel::new(12, 12);
    let t = vm.refresh();
    vm.run(&source, t).await;
    let t = vm.change_page(PageDirection::Last).unwrap();
    vm.run(&source, t).await;
    assert_eq!(vm.pagination().offset(), 36);

    source.names.truncate(13);
    let t = vm.refresh();
    assert_eq!(vm.run(&source, t).await, QueryOutcome::Updated);
    assert_eq!(vm.pagination().offset(), 12);
    assert_eq!(vm.pagination().current_range(), Some((13, 13)));
    assert_eq!(vm.page().items.len(), 1);
    assert_eq!(vm.page().items[0].name, "service-12");
    assert!(vm.can_toggle_view());

    let last = source.seen.borrow().last().cloned().unwrap();
    assert_eq!(last, SearchQuery { text: String::new(), offset: 12, limit: 12 });
}

#[tokio::test]
async fn test_no_results() {
    let source = FakeCatalog::new(5);
    let mut vm = CatalogViewModel::new(12, 12);
    let t = vm.submit_query("nothing-matches");
    vm.run(&source, t).await;
    assert!(vm.page().is_empty());
    assert_eq!(vm.pagination().current_range(), None);
    assert!(!vm.can_toggle_view());
}
