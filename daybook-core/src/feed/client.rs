//! Feed client: source list management and fetch cycles.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::Local;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{DaybookError, DaybookResult};
use crate::feed::parse::parse_feed;
use crate::feed::snapshot::{FeedSnapshot, FeedStatus, SourceOutcome, SourceReport};
use crate::feed::transport::{FeedTransport, HttpTransport};
use crate::occurrence::Occurrence;
use crate::store::JsonStore;

/// Result of `FeedClient::add_source`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceAdded {
    Added,
    AlreadyPresent,
}

impl fmt::Display for SourceAdded {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SourceAdded::Added => write!(f, "Feed source added"),
            SourceAdded::AlreadyPresent => write!(f, "Feed source already configured"),
        }
    }
}

/// Fetches the configured ICS feeds and holds the latest snapshot.
///
/// The source list lives in the store and is re-read at the start of every
/// cycle. The snapshot lock is only ever held to clone or swap the `Arc`;
/// downloads and parsing happen outside it.
pub struct FeedClient<T = HttpTransport> {
    store: JsonStore,
    transport: T,
    snapshot: RwLock<Arc<FeedSnapshot>>,
}

impl FeedClient<HttpTransport> {
    pub fn http(store: JsonStore) -> DaybookResult<Self> {
        Ok(FeedClient::new(store, HttpTransport::new()?))
    }
}

impl<T: FeedTransport> FeedClient<T> {
    pub fn new(store: JsonStore, transport: T) -> Self {
        FeedClient {
            store,
            transport,
            snapshot: RwLock::new(Arc::new(FeedSnapshot::default())),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The persisted source list.
    pub fn sources(&self) -> Vec<String> {
        self.store.feed_sources()
    }

    /// Add a feed URL. Does not trigger a fetch.
    pub fn add_source(&self, url: &str) -> DaybookResult<SourceAdded> {
        let url = url.trim();
        validate_source(url)?;

        let mut urls = self.store.feed_sources();
        if urls.iter().any(|u| u == url) {
            return Ok(SourceAdded::AlreadyPresent);
        }

        urls.push(url.to_string());
        self.store.save_feed_sources(&urls)?;
        info!(url, "added feed source");
        Ok(SourceAdded::Added)
    }

    /// Remove a feed URL. Returns false when it was not configured.
    pub fn remove_source(&self, url: &str) -> DaybookResult<bool> {
        let url = url.trim();
        let mut urls = self.store.feed_sources();
        let before = urls.len();
        urls.retain(|u| u != url);

        if urls.len() == before {
            return Ok(false);
        }
        self.store.save_feed_sources(&urls)?;
        info!(url, "removed feed source");
        Ok(true)
    }

    /// Run one fetch cycle over every configured source and publish the
    /// result as the new snapshot.
    ///
    /// Per-source failures are counted, logged and skipped; they never
    /// abort the cycle or surface as an error.
    ///
    /// The source list is read from the store with blocking file I/O on the
    /// calling task; it is one small document per cycle.
    pub async fn fetch_all(&self, timeout: Duration) -> Arc<FeedSnapshot> {
        let urls = self.store.feed_sources();

        if urls.is_empty() {
            debug!("no feed sources configured");
            return self.publish(FeedSnapshot::completed(
                Vec::new(),
                FeedStatus::NoSources,
                Vec::new(),
            ));
        }

        let mut occurrences = Vec::new();
        let mut reports = Vec::with_capacity(urls.len());
        let mut failures = 0;

        for (index, url) in urls.iter().enumerate() {
            let outcome = match self.fetch_one(index, url, timeout).await {
                Ok(parsed) => {
                    let count = parsed.len();
                    occurrences.extend(parsed);
                    SourceOutcome::Fetched(count)
                }
                Err(e) => {
                    warn!(url = %url, error = %e, "feed fetch failed");
                    failures += 1;
                    SourceOutcome::Failed(e.to_string())
                }
            };
            reports.push(SourceReport {
                url: url.clone(),
                outcome,
            });
        }

        let status = FeedStatus::from_counts(occurrences.len(), failures);
        info!(
            sources = urls.len(),
            events = occurrences.len(),
            failures,
            "feed cycle complete"
        );

        self.publish(FeedSnapshot::completed(occurrences, status, reports))
    }

    async fn fetch_one(
        &self,
        index: usize,
        url: &str,
        timeout: Duration,
    ) -> DaybookResult<Vec<Occurrence>> {
        let response = self.transport.get(url, timeout).await?;

        if !response.is_success() {
            return Err(DaybookError::Fetch(format!(
                "{url} returned HTTP {}",
                response.status
            )));
        }

        parse_feed(&response.body, index, url, &Local)
    }

    /// The latest published snapshot. Never waits on an in-flight fetch.
    pub fn snapshot(&self) -> Arc<FeedSnapshot> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Independent copy of the latest snapshot's occurrences.
    pub fn occurrences(&self) -> Vec<Occurrence> {
        self.snapshot().occurrences.clone()
    }

    fn publish(&self, snapshot: FeedSnapshot) -> Arc<FeedSnapshot> {
        let snapshot = Arc::new(snapshot);
        *self
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Arc::clone(&snapshot);
        snapshot
    }
}

fn validate_source(url: &str) -> DaybookResult<()> {
    let parsed = Url::parse(url).map_err(|_| DaybookError::InvalidSource(url.to_string()))?;

    match parsed.scheme() {
        "http" | "https" if parsed.has_host() => Ok(()),
        _ => Err(DaybookError::InvalidSource(url.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::transport::fake::{FakeTransport, Gate};
    use crate::occurrence::Source;

    const TIMEOUT: Duration = Duration::from_secs(5);

    const GOOD_FEED: &str = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:TEST\r\n\
BEGIN:VEVENT\r\nUID:one\r\nSUMMARY:Team lunch\r\nDTSTART:20240105T120000\r\nEND:VEVENT\r\n\
BEGIN:VEVENT\r\nUID:two\r\nSUMMARY:Holiday\r\nDTSTART;VALUE=DATE:20240106\r\nEND:VEVENT\r\n\
END:VCALENDAR\r\n";

    const ONE_EVENT_FEED: &str = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:TEST\r\n\
BEGIN:VEVENT\r\nUID:solo\r\nSUMMARY:Review\r\nDTSTART;VALUE=DATE:20240110\r\nEND:VEVENT\r\n\
END:VCALENDAR\r\n";

    fn client(transport: FakeTransport) -> (tempfile::TempDir, FeedClient<FakeTransport>) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path());
        (dir, FeedClient::new(store, transport))
    }

    #[test]
    fn add_source_rejects_non_http_urls() {
        let (_dir, client) = client(FakeTransport::default());

        for bad in ["not-a-url", "ftp://example.com/cal.ics", "file:///tmp/cal.ics", ""] {
            assert!(
                matches!(client.add_source(bad), Err(DaybookError::InvalidSource(_))),
                "{bad} should be rejected"
            );
        }
        assert!(client.sources().is_empty());
    }

    #[test]
    fn add_source_twice_keeps_one_entry() {
        let (_dir, client) = client(FakeTransport::default());

        assert_eq!(
            client.add_source("https://x/cal.ics").unwrap(),
            SourceAdded::Added
        );
        assert_eq!(
            client.add_source(" https://x/cal.ics ").unwrap(),
            SourceAdded::AlreadyPresent
        );
        assert_eq!(client.sources(), vec!["https://x/cal.ics"]);
    }

    #[test]
    fn remove_source_reports_absence() {
        let (_dir, client) = client(FakeTransport::default());
        client.add_source("https://a.example/cal.ics").unwrap();

        assert!(client.remove_source("https://a.example/cal.ics").unwrap());
        assert!(!client.remove_source("https://a.example/cal.ics").unwrap());
        assert!(client.sources().is_empty());
    }

    #[tokio::test]
    async fn initial_snapshot_is_empty_and_pending() {
        let (_dir, client) = client(FakeTransport::default());
        let snapshot = client.snapshot();
        assert!(snapshot.occurrences.is_empty());
        assert_eq!(snapshot.status, FeedStatus::Pending);
        assert!(snapshot.completed_at.is_none());
    }

    #[tokio::test]
    async fn no_sources_is_not_an_error() {
        let transport = FakeTransport::default();
        let (_dir, client) = client(transport);

        let snapshot = client.fetch_all(TIMEOUT).await;

        assert!(snapshot.occurrences.is_empty());
        assert_eq!(snapshot.status, FeedStatus::NoSources);
        assert_eq!(client.snapshot().status, FeedStatus::NoSources);
    }

    #[tokio::test]
    async fn one_failing_source_keeps_the_other() {
        let transport = FakeTransport::default()
            .with_body("https://good.example/cal.ics", GOOD_FEED)
            .with_body("https://bad.example/cal.ics", "this is not a calendar");
        let (_dir, client) = client(transport);
        client.add_source("https://bad.example/cal.ics").unwrap();
        client.add_source("https://good.example/cal.ics").unwrap();

        let snapshot = client.fetch_all(TIMEOUT).await;

        assert_eq!(snapshot.occurrences.len(), 2);
        assert_eq!(
            snapshot.status,
            FeedStatus::Partial { total: 2, failures: 1 }
        );
        // ids carry the feed's position in the source list
        assert_eq!(snapshot.occurrences[0].id, "feed:1:one");
        assert!(snapshot.occurrences.iter().all(|o| o.source == Source::Feed));
        assert!(matches!(snapshot.sources[0].outcome, SourceOutcome::Failed(_)));
        assert_eq!(snapshot.sources[1].outcome, SourceOutcome::Fetched(2));
    }

    #[tokio::test]
    async fn all_sources_failing_reports_failure() {
        let transport = FakeTransport::default()
            .with_status("https://a.example/cal.ics", 500)
            .with_error("https://b.example/cal.ics", "timed out");
        let (_dir, client) = client(transport);
        client.add_source("https://a.example/cal.ics").unwrap();
        client.add_source("https://b.example/cal.ics").unwrap();

        let snapshot = client.fetch_all(TIMEOUT).await;

        assert!(snapshot.occurrences.is_empty());
        assert_eq!(snapshot.status, FeedStatus::Failed { failures: 2 });
    }

    #[tokio::test]
    async fn clean_cycle_replaces_previous_snapshot() {
        let transport = FakeTransport::default().with_status("https://a.example/cal.ics", 404);
        let (_dir, client) = client(transport);
        client.add_source("https://a.example/cal.ics").unwrap();

        let first = client.fetch_all(TIMEOUT).await;
        assert_eq!(first.status, FeedStatus::Failed { failures: 1 });

        client.remove_source("https://a.example/cal.ics").unwrap();
        client.add_source("https://b.example/cal.ics").unwrap();
        client.transport.set(
            "https://b.example/cal.ics",
            Ok(crate::feed::transport::FeedResponse {
                status: 200,
                body: GOOD_FEED.to_string(),
            }),
        );

        let second = client.fetch_all(TIMEOUT).await;
        assert_eq!(second.status, FeedStatus::Clean { total: 2 });

        // A reader holding the old snapshot still sees it unchanged
        assert_eq!(first.status, FeedStatus::Failed { failures: 1 });
        assert_eq!(client.occurrences().len(), 2);
    }

    #[tokio::test]
    async fn snapshot_is_served_while_a_fetch_is_in_flight() {
        let transport = FakeTransport::default().with_body("https://a.example/cal.ics", ONE_EVENT_FEED);
        let (_dir, client) = client(transport);
        client.add_source("https://a.example/cal.ics").unwrap();
        client.fetch_all(TIMEOUT).await;

        let gate = Arc::new(Gate::default());
        client
            .transport()
            .set_gated("https://a.example/cal.ics", GOOD_FEED, Arc::clone(&gate));
        let client = Arc::new(client);

        let fetching = tokio::spawn({
            let client = Arc::clone(&client);
            async move { client.fetch_all(TIMEOUT).await }
        });
        gate.entered().await;

        // The cycle is parked inside the transport; readers get the old snapshot
        let during = client.snapshot();
        assert_eq!(during.status, FeedStatus::Clean { total: 1 });
        assert_eq!(during.occurrences.len(), 1);
        assert!(!fetching.is_finished());

        gate.release();
        let published = fetching.await.unwrap();

        assert_eq!(published.status, FeedStatus::Clean { total: 2 });
        assert_eq!(client.snapshot().occurrences.len(), 2);
        // The earlier handle is untouched by the swap
        assert_eq!(during.occurrences.len(), 1);
    }

    #[tokio::test]
    async fn concurrent_cycles_publish_whole_snapshots_and_last_one_wins() {
        let (_dir, client) = client(FakeTransport::default());
        client.add_source("https://a.example/cal.ics").unwrap();
        let client = Arc::new(client);

        let spawn_fetch = |client: &Arc<FeedClient<FakeTransport>>| {
            let client = Arc::clone(client);
            tokio::spawn(async move { client.fetch_all(TIMEOUT).await })
        };

        let first_gate = Arc::new(Gate::default());
        client
            .transport()
            .set_gated("https://a.example/cal.ics", ONE_EVENT_FEED, Arc::clone(&first_gate));
        let first = spawn_fetch(&client);
        first_gate.entered().await;

        let second_gate = Arc::new(Gate::default());
        client
            .transport()
            .set_gated("https://a.example/cal.ics", GOOD_FEED, Arc::clone(&second_gate));
        let second = spawn_fetch(&client);
        second_gate.entered().await;

        // The cycle that started later finishes first
        second_gate.release();
        let second = second.await.unwrap();
        assert_eq!(second.status, FeedStatus::Clean { total: 2 });
        assert_eq!(client.snapshot().occurrences.len(), 2);

        first_gate.release();
        let first = first.await.unwrap();
        assert_eq!(first.status, FeedStatus::Clean { total: 1 });

        for snapshot in [&first, &second] {
            let FeedStatus::Clean { total } = snapshot.status else {
                panic!("unexpected status {:?}", snapshot.status);
            };
            assert_eq!(snapshot.occurrences.len(), total);
        }

        let current = client.snapshot();
        assert!(Arc::ptr_eq(&current, &first));
        assert_eq!(current.occurrences[0].id, "feed:0:solo");
    }
}
