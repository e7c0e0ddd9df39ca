use crate::core::cache::RunCache;
use crate::core::filter::{filter_and_group, service_names};
use crate::core::lookup::{CatalogLookup, LookupPolicy};
use crate::core::offers::OfferFetcher;
use crate::domain::model::{
    BatchOutcome, BatchSummary, CountryCode, CountryScanEntry, GroupBy, MonetizationType, Report,
    ServiceCountries, ServiceEntry, ServiceName, ServiceOffers, Title, TitleEntry, TitleOutcome,
    TitleResult,
};
use crate::domain::ports::{ConfigProvider, StreamingCatalog};
use crate::utils::error::{Result, ScoutError};
use futures::stream::{self, StreamExt};
use std::collections::{HashMap, HashSet};
use std::time::Duration;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub country: CountryCode,
    /// 非空時改為多國掃描，`country` 不再使用
    pub scan_countries: Vec<CountryCode>,
    pub allowed_types: HashSet<MonetizationType>,
    pub group_by: GroupBy,
    pub service_filter: HashSet<ServiceName>,
    pub concurrency: usize,
    pub request_timeout: Duration,
}

impl BatchRequest {
    pub fn new(country: CountryCode) -> Self {
        Self {
            country,
            scan_countries: Vec::new(),
            allowed_types: HashSet::new(),
            group_by: GroupBy::ByTitle,
            service_filter: HashSet::new(),
            concurrency: 1,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let country: CountryCode = config.country().parse()?;
        let scan_countries = config
            .countries()
            .iter()
            .filter(|c| !c.trim().is_empty())
            .map(|c| c.parse())
            .collect::<Result<Vec<CountryCode>>>()?;

        Ok(Self::new(country)
            .with_scan_countries(scan_countries)
            .with_allowed_types(
                config
                    .monetization_types()
                    .iter()
                    .filter(|t| !t.trim().is_empty())
                    .map(|t| t.as_str().into()),
            )
            .with_service_filter(config.services().iter().map(|s| ServiceName::new(s.trim())))
            .with_group_by(config.group_by())
            .with_concurrency(config.concurrency())
            .with_request_timeout(Duration::from_secs(config.request_timeout_secs())))
    }

    /// 重複的國家只保留第一次出現
    pub fn with_scan_countries<I: IntoIterator<Item = CountryCode>>(mut self, countries: I) -> Self {
        let mut seen = HashSet::new();
        self.scan_countries = countries
            .into_iter()
            .filter(|c| seen.insert(c.clone()))
            .collect();
        self
    }

    pub fn with_allowed_types<I: IntoIterator<Item = MonetizationType>>(mut self, types: I) -> Self {
        self.allowed_types = types.into_iter().collect();
        self
    }

    pub fn with_service_filter<I: IntoIterator<Item = ServiceName>>(mut self, services: I) -> Self {
        self.service_filter = services
            .into_iter()
            .filter(|s| !s.as_str().is_empty())
            .collect();
        self
    }

    pub fn with_group_by(mut self, group_by: GroupBy) -> Self {
        self.group_by = group_by;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn is_country_scan(&self) -> bool {
        !self.scan_countries.is_empty()
    }

    fn countries(&self) -> Vec<&CountryCode> {
        if self.is_country_scan() {
            self.scan_countries.iter().collect()
        } else {
            vec![&self.country]
        }
    }

    /// 服務名單比對不分大小寫；名單為空時全部接受
    fn accepts_service(&self, service: &ServiceName) -> bool {
        self.service_filter.is_empty()
            || self
                .service_filter
                .iter()
                .any(|s| s.as_str().eq_ignore_ascii_case(service.as_str()))
    }
}

type Checked = (TitleOutcome, Vec<ServiceOffers>);

/// 依序對每個片名執行 lookup -> fetch -> filter，並組成報表。
///
/// 單一片名的任何失敗都只會讓該片名記為「無可用服務」，批次一定跑完。
pub struct BatchAggregator<C: StreamingCatalog> {
    catalog: C,
    policy: LookupPolicy,
}

impl<C: StreamingCatalog> BatchAggregator<C> {
    pub fn new(catalog: C) -> Self {
        Self {
            catalog,
            policy: LookupPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: LookupPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub async fn run(&self, titles: &[Title], request: &BatchRequest) -> BatchOutcome {
        // 快取的生命週期等於這次執行；key 含國家，各國互不影響
        let cache = RunCache::new();
        let lookup = CatalogLookup::new(&self.catalog, &cache, self.policy);
        let fetcher = OfferFetcher::new(&self.catalog, &cache);
        let countries = request.countries();

        tracing::info!(
            "📡 Checking {} title(s) in {} (concurrency: {})",
            titles.len(),
            countries
                .iter()
                .map(|c| c.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            request.concurrency
        );

        // 先建立所有 future 再交給 stream；buffered 依提交順序產出結果
        let jobs: Vec<_> = titles
            .iter()
            .enumerate()
            .flat_map(|(index, title)| countries.iter().map(move |country| (index, title, *country)))
            .map(|(index, title, country)| {
                self.check_title((index + 1, titles.len()), title, country, request, &lookup, &fetcher)
            })
            .collect();
        let mut checked = stream::iter(jobs)
            .buffered(request.concurrency)
            .collect::<Vec<Checked>>()
            .await
            .into_iter();

        let mut summary = BatchSummary::default();
        let mut results = Vec::with_capacity(titles.len());
        let mut groups: Vec<(&Title, Vec<(&CountryCode, Vec<ServiceOffers>)>)> =
            Vec::with_capacity(titles.len());
        for title in titles {
            let per_country: Vec<(&CountryCode, Checked)> = countries
                .iter()
                .copied()
                .zip(checked.by_ref().take(countries.len()))
                .collect();

            let mut outcomes = Vec::with_capacity(per_country.len());
            let mut offers = Vec::with_capacity(per_country.len());
            for (country, (outcome, services)) in per_country {
                outcomes.push(outcome);
                offers.push((country, services));
            }

            let outcome = merge_outcomes(outcomes, &offers);
            summary.record(&outcome);
            results.push(TitleResult {
                title: title.clone(),
                outcome,
            });
            groups.push((title, offers));
        }

        let report = if request.is_country_scan() {
            group_by_country(&groups, request)
        } else {
            let single: Vec<(&Title, Vec<ServiceOffers>)> = groups
                .into_iter()
                .map(|(title, mut offers)| (title, offers.pop().map(|(_, s)| s).unwrap_or_default()))
                .collect();
            match request.group_by {
                GroupBy::ByTitle => group_by_title(&single),
                GroupBy::ByService => group_by_service(&single, request),
            }
        };

        tracing::info!(
            "📊 {} attempted: {} available, {} not found, {} unsupported, {} failed",
            summary.attempted,
            summary.available,
            summary.not_found,
            summary.unsupported,
            summary.failed
        );

        BatchOutcome {
            report,
            results,
            summary,
        }
    }

    async fn check_title(
        &self,
        (position, total): (usize, usize),
        title: &Title,
        country: &CountryCode,
        request: &BatchRequest,
        lookup: &CatalogLookup<'_, C>,
        fetcher: &OfferFetcher<'_, C>,
    ) -> Checked {
        let pipeline = async {
            let content = lookup.resolve(title, country).await?;
            let offers = fetcher.fetch_offers(&content, country).await?;
            Ok::<_, ScoutError>(filter_and_group(&offers, &request.allowed_types))
        };

        let result = match tokio::time::timeout(request.request_timeout, pipeline).await {
            Ok(result) => result,
            Err(_) => Err(ScoutError::Timeout {
                seconds: request.request_timeout.as_secs(),
            }),
        };

        match result {
            Ok(services) => {
                tracing::debug!(
                    "[{}/{}] ✅ {} ({}): {:?}",
                    position,
                    total,
                    title,
                    country,
                    service_names(&services)
                );
                (
                    TitleOutcome::Available {
                        services: services.len(),
                    },
                    services,
                )
            }
            Err(ScoutError::LookupMiss { .. }) => {
                tracing::warn!("[{}/{}] 🔍 {} ({}): not found", position, total, title, country);
                (TitleOutcome::NotFound, Vec::new())
            }
            Err(ScoutError::UnsupportedContentType { kind }) => {
                tracing::warn!(
                    "[{}/{}] 🚫 {} ({}): unsupported content type {}",
                    position,
                    total,
                    title,
                    country,
                    kind
                );
                (TitleOutcome::Unsupported { kind }, Vec::new())
            }
            Err(e) => {
                tracing::warn!("[{}/{}] ❌ {} ({}): {}", position, total, title, country, e);
                (
                    TitleOutcome::Failed {
                        reason: e.to_string(),
                    },
                    Vec::new(),
                )
            }
        }
    }
}

/// 多國結果合併成單一片名結果：任一國可用即為可用（服務數取各國聯集），
/// 否則依 Failed、Unsupported、NotFound 的順序取第一個
fn merge_outcomes(
    mut outcomes: Vec<TitleOutcome>,
    offers: &[(&CountryCode, Vec<ServiceOffers>)],
) -> TitleOutcome {
    if outcomes.len() == 1 {
        return outcomes.into_iter().next().unwrap_or(TitleOutcome::NotFound);
    }

    if outcomes
        .iter()
        .any(|o| matches!(o, TitleOutcome::Available { .. }))
    {
        let distinct: HashSet<&ServiceName> = offers
            .iter()
            .flat_map(|(_, services)| services.iter().map(|s| &s.service))
            .collect();
        return TitleOutcome::Available {
            services: distinct.len(),
        };
    }

    let rank = |o: &TitleOutcome| match o {
        TitleOutcome::Available { .. } => 0,
        TitleOutcome::Failed { .. } => 1,
        TitleOutcome::Unsupported { .. } => 2,
        TitleOutcome::NotFound => 3,
    };
    // sort_by_key 是穩定排序，同級時保留國家順序
    outcomes.sort_by_key(rank);
    outcomes.into_iter().next().unwrap_or(TitleOutcome::NotFound)
}

/// 重複出現的片名合併為第一次出現的條目
fn group_by_title(groups: &[(&Title, Vec<ServiceOffers>)]) -> Report {
    let mut seen: HashSet<&Title> = HashSet::new();
    let mut entries = Vec::new();

    for (title, services) in groups {
        if seen.insert(*title) {
            entries.push(TitleEntry {
                title: (*title).clone(),
                services: service_names(services),
            });
        }
    }

    Report::ByTitle(entries)
}

fn group_by_service(groups: &[(&Title, Vec<ServiceOffers>)], request: &BatchRequest) -> Report {
    let mut entries: Vec<ServiceEntry> = Vec::new();
    let mut positions: HashMap<ServiceName, usize> = HashMap::new();

    for (title, services) in groups {
        for group in services.iter().filter(|g| request.accepts_service(&g.service)) {
            let position = *positions.entry(group.service.clone()).or_insert_with(|| {
                entries.push(ServiceEntry {
                    service: group.service.clone(),
                    titles: Vec::new(),
                });
                entries.len() - 1
            });

            let titles = &mut entries[position].titles;
            if !titles.contains(*title) {
                titles.push((*title).clone());
            }
        }
    }

    Report::ByService(entries)
}

/// 每個片名列出服務 -> 國家；服務名單在此模式同樣生效
fn group_by_country(
    groups: &[(&Title, Vec<(&CountryCode, Vec<ServiceOffers>)>)],
    request: &BatchRequest,
) -> Report {
    let mut seen: HashSet<&Title> = HashSet::new();
    let mut entries = Vec::new();

    for (title, per_country) in groups {
        if !seen.insert(*title) {
            continue;
        }

        let mut services: Vec<ServiceCountries> = Vec::new();
        for (country, offers) in per_country {
            for group in offers.iter().filter(|g| request.accepts_service(&g.service)) {
                match services.iter_mut().find(|s| s.service == group.service) {
                    Some(existing) => existing.countries.push((*country).clone()),
                    None => services.push(ServiceCountries {
                        service: group.service.clone(),
                        countries: vec![(*country).clone()],
                    }),
                }
            }
        }

        entries.push(CountryScanEntry {
            title: (*title).clone(),
            services,
        });
    }

    Report::ByCountry(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::{offer, MockCatalog};
    use crate::domain::model::ContentKind;

    fn titles(names: &[&str]) -> Vec<Title> {
        names.iter().map(|n| Title::from(*n)).collect()
    }

    fn request(country: &str) -> BatchRequest {
        BatchRequest::new(country.parse().unwrap())
    }

    fn flatrate_only(country: &str) -> BatchRequest {
        request(country).with_allowed_types(vec![MonetizationType::parse("FLATRATE")])
    }

    fn names(services: &[&str]) -> Vec<ServiceName> {
        services.iter().map(|s| ServiceName::from(*s)).collect()
    }

    #[tokio::test]
    async fn test_spotlight_by_title() {
        let catalog = MockCatalog::new().with_movie(
            "Spotlight",
            "tm1",
            vec![offer("FLATRATE", "netflix-basic", "Netflix")],
        );
        let aggregator = BatchAggregator::new(catalog);

        let outcome = aggregator.run(&titles(&["Spotlight"]), &flatrate_only("US")).await;

        assert_eq!(
            outcome.report,
            Report::ByTitle(vec![TitleEntry {
                title: Title::from("Spotlight"),
                services: names(&["Netflix"]),
            }])
        );
        assert_eq!(outcome.summary.available, 1);
    }

    #[tokio::test]
    async fn test_unknown_title_has_empty_entry_and_no_fetch() {
        let catalog = MockCatalog::new();
        let aggregator = BatchAggregator::new(catalog.clone());

        let outcome = aggregator
            .run(&titles(&["Unknown Obscure Film XYZ"]), &flatrate_only("US"))
            .await;

        assert_eq!(
            outcome.report.services_for(&Title::from("Unknown Obscure Film XYZ")),
            Some(&[][..])
        );
        assert_eq!(outcome.results[0].outcome, TitleOutcome::NotFound);
        assert!(catalog.node_fetches().await.is_empty());
    }

    #[tokio::test]
    async fn test_by_service_preserves_input_order() {
        let catalog = MockCatalog::new()
            .with_movie("Title A", "tm1", vec![offer("FLATRATE", "nfx", "Netflix")])
            .with_movie("Title B", "tm2", vec![offer("FLATRATE", "nfx", "Netflix")]);
        let aggregator = BatchAggregator::new(catalog);
        let req = request("US").with_group_by(GroupBy::ByService);

        let outcome = aggregator.run(&titles(&["Title A", "Title B"]), &req).await;

        assert_eq!(
            outcome.report,
            Report::ByService(vec![ServiceEntry {
                service: ServiceName::from("Netflix"),
                titles: titles(&["Title A", "Title B"]),
            }])
        );
    }

    #[tokio::test]
    async fn test_every_title_appears_once_despite_failures() {
        let catalog = MockCatalog::new()
            .with_movie("Good", "tm1", vec![offer("FLATRATE", "nfx", "Netflix")])
            .with_candidates("Series", vec![("ts1", ContentKind::Show)])
            .with_failing_search("Broken")
            .with_movie("Gone", "tm3", vec![])
            .with_failing_node("tm3");
        let aggregator = BatchAggregator::new(catalog);
        let input = titles(&["Good", "Series", "Broken", "Missing", "Gone"]);

        let outcome = aggregator.run(&input, &request("IT")).await;

        match &outcome.report {
            Report::ByTitle(entries) => {
                let reported: Vec<&Title> = entries.iter().map(|e| &e.title).collect();
                assert_eq!(reported, input.iter().collect::<Vec<_>>());
                assert!(entries[1..].iter().all(|e| e.services.is_empty()));
            }
            other => panic!("unexpected report: {:?}", other),
        }

        assert_eq!(outcome.results[1].outcome, TitleOutcome::Unsupported { kind: "Show".to_string() });
        assert!(matches!(outcome.results[2].outcome, TitleOutcome::Failed { .. }));
        assert_eq!(outcome.results[3].outcome, TitleOutcome::NotFound);
        assert!(matches!(outcome.results[4].outcome, TitleOutcome::Failed { .. }));
        assert_eq!(
            outcome.summary,
            BatchSummary {
                attempted: 5,
                available: 1,
                not_found: 1,
                unsupported: 1,
                failed: 2,
            }
        );
    }

    #[tokio::test]
    async fn test_service_filter_bounds_by_service_keys() {
        let catalog = MockCatalog::new()
            .with_movie(
                "Title A",
                "tm1",
                vec![offer("FLATRATE", "nfx", "Netflix"), offer("FLATRATE", "mubi", "MUBI")],
            )
            .with_movie("Title B", "tm2", vec![offer("ADS", "pluto", "Pluto TV")]);
        let aggregator = BatchAggregator::new(catalog);
        let req = request("IT")
            .with_group_by(GroupBy::ByService)
            .with_service_filter(vec![ServiceName::from("netflix"), ServiceName::from("Pluto TV")]);

        let outcome = aggregator.run(&titles(&["Title A", "Title B"]), &req).await;

        match outcome.report {
            Report::ByService(entries) => {
                let keys: Vec<&str> = entries.iter().map(|e| e.service.as_str()).collect();
                assert_eq!(keys, vec!["Netflix", "Pluto TV"]);
            }
            other => panic!("unexpected report: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_run_is_idempotent() {
        let catalog = MockCatalog::new()
            .with_movie("A", "tm1", vec![offer("FLATRATE", "nfx", "Netflix"), offer("ADS", "pluto", "Pluto TV")])
            .with_movie("B", "tm2", vec![offer("flatrate", "mubi", "MUBI")]);
        let aggregator = BatchAggregator::new(catalog);
        let req = request("IT").with_group_by(GroupBy::ByService);
        let input = titles(&["A", "B", "C"]);

        let first = aggregator.run(&input, &req).await;
        let second = aggregator.run(&input, &req).await;

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first.report).unwrap(),
            serde_json::to_string(&second.report).unwrap()
        );
    }

    #[tokio::test]
    async fn test_concurrent_run_matches_sequential_order() {
        let catalog = MockCatalog::new()
            .with_movie("Slow", "tm1", vec![offer("FLATRATE", "nfx", "Netflix")])
            .with_slow_search("Slow", Duration::from_millis(100))
            .with_movie("Fast", "tm2", vec![offer("FLATRATE", "nfx", "Netflix")]);
        let aggregator = BatchAggregator::new(catalog);
        let input = titles(&["Slow", "Fast"]);

        let sequential = aggregator
            .run(&input, &request("IT").with_group_by(GroupBy::ByService))
            .await;
        let concurrent = aggregator
            .run(
                &input,
                &request("IT").with_group_by(GroupBy::ByService).with_concurrency(4),
            )
            .await;

        assert_eq!(sequential.report, concurrent.report);
        assert_eq!(
            concurrent.report.titles_for(&ServiceName::from("Netflix")),
            Some(&titles(&["Slow", "Fast"])[..])
        );
    }

    #[tokio::test]
    async fn test_run_can_be_spawned() {
        let catalog = MockCatalog::new()
            .with_movie("Spotlight", "tm1", vec![offer("FLATRATE", "nfx", "Netflix")]);

        // tokio::spawn 要求 future 為 Send
        let handle = tokio::spawn(async move {
            let aggregator = BatchAggregator::new(catalog);
            let input = titles(&["Spotlight", "Heat"]);
            aggregator.run(&input, &request("US").with_concurrency(2)).await
        });
        let outcome = handle.await.unwrap();

        assert_eq!(outcome.summary.attempted, 2);
        assert_eq!(outcome.summary.available, 1);
    }

    #[tokio::test]
    async fn test_timeout_degrades_only_slow_title() {
        let catalog = MockCatalog::new()
            .with_movie("Slow", "tm1", vec![offer("FLATRATE", "nfx", "Netflix")])
            .with_slow_search("Slow", Duration::from_millis(500))
            .with_movie("Fast", "tm2", vec![offer("FLATRATE", "nfx", "Netflix")]);
        let aggregator = BatchAggregator::new(catalog);
        let req = request("IT")
            .with_concurrency(2)
            .with_request_timeout(Duration::from_millis(50));

        let outcome = aggregator.run(&titles(&["Slow", "Fast"]), &req).await;

        assert!(matches!(outcome.results[0].outcome, TitleOutcome::Failed { .. }));
        assert_eq!(outcome.results[1].outcome, TitleOutcome::Available { services: 1 });
        assert_eq!(outcome.report.services_for(&Title::from("Slow")), Some(&[][..]));
        assert_eq!(
            outcome.report.services_for(&Title::from("Fast")),
            Some(&names(&["Netflix"])[..])
        );
    }

    #[tokio::test]
    async fn test_duplicate_titles_are_looked_up_once() {
        let catalog = MockCatalog::new()
            .with_movie("Spotlight", "tm1", vec![offer("FLATRATE", "nfx", "Netflix")]);
        let aggregator = BatchAggregator::new(catalog.clone());

        let outcome = aggregator
            .run(&titles(&["Spotlight", "Spotlight"]), &request("US"))
            .await;

        assert_eq!(outcome.report.len(), 1);
        assert_eq!(outcome.summary.attempted, 2);
        assert_eq!(catalog.search_count().await, 1);
        assert_eq!(catalog.node_fetches().await, vec!["tm1".to_string()]);
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_titles_share_one_search() {
        let catalog = MockCatalog::new()
            .with_movie("Spotlight", "tm1", vec![offer("FLATRATE", "nfx", "Netflix")])
            .with_slow_search("Spotlight", Duration::from_millis(50));
        let aggregator = BatchAggregator::new(catalog.clone());
        let req = request("US").with_concurrency(2);

        let outcome = aggregator
            .run(&titles(&["Spotlight", "Spotlight"]), &req)
            .await;

        assert_eq!(outcome.results[0].outcome, outcome.results[1].outcome);
        assert_eq!(catalog.search_count().await, 1);
        assert_eq!(catalog.node_fetches().await, vec!["tm1".to_string()]);
    }

    #[tokio::test]
    async fn test_country_scan_lists_countries_per_service() {
        let catalog = MockCatalog::new()
            .with_movie("Spotlight", "tm1", vec![offer("FLATRATE", "nfx", "Netflix")])
            .with_offers_in(
                "FR",
                "tm1",
                vec![offer("FLATRATE", "mubi", "MUBI"), offer("FLATRATE", "nfx", "Netflix")],
            )
            .with_movie("Dune", "tm2", vec![offer("FLATRATE", "mubi", "MUBI")])
            .with_missing_in("DE", "Dune");
        let aggregator = BatchAggregator::new(catalog.clone());
        let de: CountryCode = "DE".parse().unwrap();
        let fr: CountryCode = "FR".parse().unwrap();
        let req = flatrate_only("IT")
            .with_scan_countries(vec![de.clone(), fr.clone(), de.clone()])
            .with_concurrency(3);

        let outcome = aggregator
            .run(&titles(&["Spotlight", "Dune", "Heat"]), &req)
            .await;

        assert_eq!(
            outcome.report,
            Report::ByCountry(vec![
                CountryScanEntry {
                    title: Title::from("Spotlight"),
                    services: vec![
                        ServiceCountries {
                            service: ServiceName::from("Netflix"),
                            countries: vec![de.clone(), fr.clone()],
                        },
                        ServiceCountries {
                            service: ServiceName::from("MUBI"),
                            countries: vec![fr.clone()],
                        },
                    ],
                },
                CountryScanEntry {
                    title: Title::from("Dune"),
                    services: vec![ServiceCountries {
                        service: ServiceName::from("MUBI"),
                        countries: vec![fr.clone()],
                    }],
                },
                CountryScanEntry {
                    title: Title::from("Heat"),
                    services: vec![],
                },
            ])
        );
        assert_eq!(
            outcome
                .report
                .countries_for(&Title::from("Dune"), &ServiceName::from("MUBI")),
            Some(&[fr][..])
        );

        // 任一國可用即為可用，服務數為各國聯集
        assert_eq!(outcome.results[0].outcome, TitleOutcome::Available { services: 2 });
        assert_eq!(outcome.results[1].outcome, TitleOutcome::Available { services: 1 });
        assert_eq!(outcome.results[2].outcome, TitleOutcome::NotFound);
        assert_eq!(outcome.summary.attempted, 3);

        // 重複的 DE 只查一次：3 個片名 x 2 個國家
        assert_eq!(catalog.search_count().await, 6);
        assert_eq!(catalog.node_fetches().await.len(), 3);
    }

    #[tokio::test]
    async fn test_country_scan_applies_service_filter() {
        let catalog = MockCatalog::new().with_movie(
            "Spotlight",
            "tm1",
            vec![offer("FLATRATE", "nfx", "Netflix"), offer("FLATRATE", "mubi", "MUBI")],
        );
        let aggregator = BatchAggregator::new(catalog);
        let req = request("IT")
            .with_scan_countries(vec!["DE".parse().unwrap(), "FR".parse().unwrap()])
            .with_service_filter(vec![ServiceName::from("mubi")]);

        let outcome = aggregator.run(&titles(&["Spotlight"]), &req).await;

        match outcome.report {
            Report::ByCountry(entries) => {
                let services: Vec<&str> =
                    entries[0].services.iter().map(|s| s.service.as_str()).collect();
                assert_eq!(services, vec!["MUBI"]);
                assert_eq!(entries[0].services[0].countries.len(), 2);
            }
            other => panic!("unexpected report: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_country_scan_failure_outranks_miss() {
        let catalog = MockCatalog::new()
            .with_movie("Gone", "tm1", vec![])
            .with_failing_node("tm1")
            .with_missing_in("FR", "Gone");
        let aggregator = BatchAggregator::new(catalog);
        let req = request("IT").with_scan_countries(vec!["FR".parse().unwrap(), "DE".parse().unwrap()]);

        let outcome = aggregator.run(&titles(&["Gone"]), &req).await;

        assert!(matches!(outcome.results[0].outcome, TitleOutcome::Failed { .. }));
        assert_eq!(outcome.summary.failed, 1);
    }

    #[tokio::test]
    async fn test_from_config_rejects_bad_country() {
        struct BadCountry;

        impl ConfigProvider for BadCountry {
            fn api_endpoint(&self) -> &str {
                "https://example.com/graphql"
            }
            fn language(&self) -> &str {
                "en"
            }
            fn input_path(&self) -> &str {
                "watchlist.csv"
            }
            fn title_column(&self) -> usize {
                1
            }
            fn output_path(&self) -> Option<&str> {
                None
            }
            fn output_format(&self) -> crate::domain::model::OutputFormat {
                crate::domain::model::OutputFormat::Text
            }
            fn country(&self) -> &str {
                "Italy"
            }
            fn countries(&self) -> &[String] {
                &[]
            }
            fn monetization_types(&self) -> &[String] {
                &[]
            }
            fn services(&self) -> &[String] {
                &[]
            }
            fn group_by(&self) -> GroupBy {
                GroupBy::ByTitle
            }
            fn concurrency(&self) -> usize {
                1
            }
            fn request_timeout_secs(&self) -> u64 {
                30
            }
        }

        assert!(BatchRequest::from_config(&BadCountry).is_err());
    }
}
