//! Scenario tests for the feed store, driven through the same request and
//! outcome plumbing the worker uses.

use medshelf::domain::{Model, ModelStatus, ProductRecord};
use medshelf::feed::{Completion, FeedSettings, FeedStore, FetchRequest, Page};
use medshelf::search::CatalogIndex;
use medshelf::storage::{JsonStorage, Storage};

fn record(id: &str, title: &str, downloads: u64, created_at: &str) -> ProductRecord {
    ProductRecord {
        id: id.to_string(),
        title: title.to_string(),
        author: "Dr. Osei".to_string(),
        downloads,
        status: ModelStatus::Published,
        created_at: created_at.to_string(),
        ..ProductRecord::default()
    }
}

/// A published catalog of `n` models titled "Scan 0".."Scan n-1".
fn catalog(n: usize) -> Vec<ProductRecord> {
    (0..n)
        .map(|i| {
            record(
                &format!("model-{i}"),
                &format!("Scan {i}"),
                0,
                &format!("2025-01-{:02}T00:00:00.000Z", i % 28 + 1),
            )
        })
        .collect()
}

fn page_of(models: &[&str]) -> Page {
    Page {
        models: models.iter().map(|id| Model::new(*id, *id, "Dr. Osei")).collect(),
        exhausted: false,
    }
}

/// Runs `request` against `index` and applies the outcome.
fn serve(store: &mut FeedStore, index: &CatalogIndex, request: FetchRequest) -> Completion {
    let outcome = request.fulfil(&mut FixedCatalog(Vec::new()), index, index);
    store.complete(outcome)
}

struct FixedCatalog(Vec<ProductRecord>);

impl medshelf::feed::CatalogService for FixedCatalog {
    fn list_products(&mut self) -> medshelf::Result<Vec<ProductRecord>> {
        Ok(self.0.clone())
    }
}

#[test]
fn empty_store_loads_batches_of_eight_until_the_cap() {
    let index = CatalogIndex::new(&catalog(100));
    let mut store = FeedStore::new(FeedSettings::default());
    assert_eq!(store.other().page, 0);
    assert!(store.other().items.is_empty());
    assert!(store.other().has_more);

    let request = store.load_more_other().unwrap();
    assert_eq!(serve(&mut store, &index, request), Completion::Applied);
    assert_eq!(store.other().page, 1);
    assert_eq!(store.other().items.len(), 8);
    assert!(store.other().has_more);

    for _ in 0..4 {
        let request = store.load_more_other().unwrap();
        serve(&mut store, &index, request);
    }
    assert_eq!(store.other().page, 5);
    assert_eq!(store.other().items.len(), 40);
    assert!(!store.other().has_more);
    assert_eq!(store.other().items[8].id, "model-8");
}

#[test]
fn first_page_plus_four_loads_hit_the_cap_and_a_fifth_does_nothing() {
    let index = CatalogIndex::new(&catalog(100));
    let mut store = FeedStore::new(FeedSettings::default());
    let first: Vec<Model> = catalog(8).iter().map(Model::from).collect();
    store.set_other_models(first);
    assert_eq!(store.other().page, 1);

    for expected_page in 2..=5 {
        let request = store.load_more_other().unwrap();
        assert!(matches!(request, FetchRequest::OtherPage { page, .. } if page == expected_page));
        assert_eq!(serve(&mut store, &index, request), Completion::Applied);
    }
    assert_eq!(store.other().page, 5);
    assert_eq!(store.other().items.len(), 40);
    assert!(!store.other().has_more);

    assert!(store.load_more_other().is_none());
    assert_eq!(store.other().page, 5);
    assert_eq!(store.other().items.len(), 40);
    assert!(!store.other().loading);
}

#[test]
fn load_more_while_loading_is_a_no_op() {
    let mut store = FeedStore::new(FeedSettings::default());
    let first = store.load_more_other().unwrap();
    let before = store.other().clone();

    assert!(store.load_more_other().is_none());
    assert_eq!(store.other(), &before);
    assert!(store.other().loading);

    let FetchRequest::OtherPage { ticket, .. } = first else {
        panic!("expected an other page request");
    };
    let outcome = medshelf::feed::FetchOutcome::OtherPage {
        ticket,
        result: Ok(page_of(&["a", "b"])),
    };
    assert_eq!(store.complete(outcome), Completion::Applied);
    assert_eq!(store.other().page, 1);
    assert!(!store.other().loading);
}

#[test]
fn failed_batch_can_be_retried() {
    let mut store = FeedStore::new(FeedSettings::default());
    let request = store.load_more_other().unwrap();
    let outcome = medshelf::feed::FetchOutcome::OtherPage {
        ticket: request.ticket(),
        result: Err("worker unavailable".to_string()),
    };
    assert_eq!(
        store.complete(outcome),
        Completion::Failed("worker unavailable".to_string())
    );
    assert_eq!(store.other().page, 0);
    assert!(store.other().has_more);
    assert!(!store.other().loading);
    assert_eq!(store.last_error(), Some("worker unavailable"));

    let retry = store.load_more_other().unwrap();
    assert!(matches!(retry, FetchRequest::OtherPage { page: 1, .. }));
}

#[test]
fn likes_reach_every_copy_and_nothing_else() {
    let index = CatalogIndex::new(&catalog(20));
    let mut store = FeedStore::new(FeedSettings::default());
    let request = store.load_initial_feeds().unwrap();
    let outcome = request.fulfil(&mut FixedCatalog(catalog(20)), &index, &index);
    store.complete(outcome);
    let request = store.load_more_other().unwrap();
    serve(&mut store, &index, request);

    let target = store.recent()[0].id.clone();
    let untouched = store.recent()[1].id.clone();
    let copies = |store: &FeedStore, id: &str| -> Vec<u64> {
        store
            .recent()
            .iter()
            .chain(store.popular())
            .chain(&store.other().items)
            .chain(&store.search().items)
            .filter(|m| m.id == id)
            .map(|m| m.likes)
            .collect()
    };
    let holders = copies(&store, &target).len();
    assert!(holders >= 2);

    for _ in 0..3 {
        assert_eq!(store.record_like(&target), holders);
    }
    assert!(copies(&store, &target).iter().all(|&likes| likes == 3));
    assert!(copies(&store, &untouched).iter().all(|&likes| likes == 0));
}

#[test]
fn download_reaches_recent_and_search_copies() {
    let products = vec![
        record("model-42", "Aortic Arch", 10, "2025-03-01T00:00:00.000Z"),
        record("model-7", "Cochlea", 4, "2025-02-01T00:00:00.000Z"),
    ];
    let index = CatalogIndex::new(&products);
    let mut store = FeedStore::new(FeedSettings::default());

    let request = store.load_initial_feeds().unwrap();
    store.complete(request.fulfil(&mut FixedCatalog(products.clone()), &index, &index));
    let request = store.start_search("aortic").unwrap();
    serve(&mut store, &index, request);

    let downloads = |models: &[Model], id: &str| models.iter().find(|m| m.id == id).map(|m| m.downloads);
    assert_eq!(downloads(store.recent(), "model-42"), Some(10));
    assert_eq!(downloads(&store.search().items, "model-42"), Some(10));

    store.record_download("model-42");

    assert_eq!(downloads(store.recent(), "model-42"), Some(11));
    assert_eq!(downloads(&store.search().items, "model-42"), Some(11));
    assert_eq!(downloads(store.recent(), "model-7"), Some(4));
}

#[test]
fn cleared_search_stays_cleared() {
    let mut store = FeedStore::new(FeedSettings::default());
    let request = store.start_search("  heart  ").unwrap();
    assert_eq!(store.query(), "heart");
    store.clear_search();

    assert!(!store.is_searching());
    assert_eq!(store.query(), "");
    assert!(store.search().items.is_empty());
    assert!(!store.search().loading);
    assert!(store.load_more_search().is_none());

    let index = CatalogIndex::new(&[record("h", "Heart", 0, "")]);
    assert_eq!(serve(&mut store, &index, request), Completion::Stale);
    assert!(store.search().items.is_empty());
}

#[test]
fn blank_queries_do_not_enter_search() {
    let mut store = FeedStore::new(FeedSettings::default());
    assert!(store.start_search("").is_none());
    assert!(store.start_search("   ").is_none());
    assert!(!store.is_searching());

    let index = CatalogIndex::new(&[record("s", "Skull", 0, "")]);
    let request = store.start_search("skull").unwrap();
    serve(&mut store, &index, request);
    assert!(store.start_search(" \t ").is_none());
    assert!(store.is_searching());
    assert_eq!(store.query(), "skull");
    assert_eq!(store.search().items.len(), 1);
}

#[test]
fn superseded_search_page_is_discarded() {
    let index = CatalogIndex::new(&[
        record("1", "Heart Valve", 0, ""),
        record("2", "Kidney", 0, ""),
    ]);
    let mut store = FeedStore::new(FeedSettings::default());
    let heart = store.start_search("heart").unwrap();
    let kidney = store.start_search("kidney").unwrap();

    assert_eq!(serve(&mut store, &index, heart), Completion::Stale);
    assert!(store.search().loading);
    assert_eq!(serve(&mut store, &index, kidney), Completion::Applied);
    let ids: Vec<&str> = store.search().items.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, ["2"]);
    assert_eq!(store.search().page, 1);
    assert!(!store.search().has_more);
}

#[test]
fn offline_reload_is_served_from_the_cache() {
    let dir = tempfile::tempdir().unwrap();
    let mut storage = JsonStorage::new(dir.path().join("catalog.json")).unwrap();
    storage.replace_products(catalog(12)).unwrap();
    let index = CatalogIndex::new(&storage.get_all_products().unwrap());

    let mut store = FeedStore::new(FeedSettings::default());
    let request = store.load_initial_feeds().unwrap();
    assert!(store.is_loading());
    let outcome = request.fulfil(&mut storage, &index, &index);
    assert_eq!(store.complete(outcome), Completion::Applied);

    assert!(!store.is_loading());
    assert_eq!(store.recent().len(), 8);
    assert_eq!(store.popular().len(), 8);
    assert_eq!(store.recent()[0].id, "model-11");
}

#[test]
fn search_pages_append_until_the_cap() {
    let index = CatalogIndex::new(&catalog(100));
    let mut store = FeedStore::new(FeedSettings::default());

    let request = store.start_search("scan").unwrap();
    assert_eq!(serve(&mut store, &index, request), Completion::Applied);
    assert_eq!(store.search().page, 1);
    assert_eq!(store.search().items.len(), 8);
    assert!(store.search().has_more);

    for expected_page in 2..=5 {
        let request = store.load_more_search().unwrap();
        assert!(matches!(
            &request,
            FetchRequest::SearchPage { page, query, .. } if *page == expected_page && query == "scan"
        ));
        assert!(store.load_more_search().is_none());
        assert!(store.search().loading);
        assert_eq!(serve(&mut store, &index, request), Completion::Applied);
        assert_eq!(store.search().page, expected_page);
    }
    assert_eq!(store.search().items.len(), 40);
    assert!(!store.search().has_more);

    assert!(store.load_more_search().is_none());
    assert_eq!(store.search().page, 5);
    assert_eq!(store.search().items.len(), 40);
}

#[test]
fn failed_search_page_can_be_retried() {
    let index = CatalogIndex::new(&catalog(30));
    let mut store = FeedStore::new(FeedSettings::default());
    let request = store.start_search("scan").unwrap();
    serve(&mut store, &index, request);

    let request = store.load_more_search().unwrap();
    assert_eq!(
        store.complete(request.fail("index unavailable")),
        Completion::Failed("index unavailable".to_string())
    );
    assert_eq!(store.search().page, 1);
    assert_eq!(store.search().items.len(), 8);
    assert!(store.search().has_more);
    assert!(!store.search().loading);
    assert!(store.is_searching());
    assert_eq!(store.last_error(), Some("index unavailable"));

    let retry = store.load_more_search().unwrap();
    assert!(matches!(retry, FetchRequest::SearchPage { page: 2, .. }));
    assert_eq!(serve(&mut store, &index, retry), Completion::Applied);
    assert_eq!(store.search().items.len(), 16);
}

#[test]
fn next_page_of_an_old_query_is_discarded() {
    let mut products = catalog(20);
    products.push(record("h", "Heart Valve", 0, ""));
    let index = CatalogIndex::new(&products);
    let mut store = FeedStore::new(FeedSettings::default());

    let request = store.start_search("scan").unwrap();
    serve(&mut store, &index, request);
    let second_scan_page = store.load_more_search().unwrap();
    let heart = store.start_search("heart").unwrap();

    assert_eq!(serve(&mut store, &index, second_scan_page), Completion::Stale);
    assert!(store.search().items.is_empty());
    assert!(store.search().loading);

    assert_eq!(serve(&mut store, &index, heart), Completion::Applied);
    let ids: Vec<&str> = store.search().items.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, ["h"]);
    assert_eq!(store.search().page, 1);
}
