#[allow(unused)]
mod support;

use std::sync::Arc;

use ayush_mapping::{InMemoryStore, MappingEngine, System};
use support::{engine_with, link, sample_engine, sample_store, term, unfiltered_engine_with, CountingStore};

#[tokio::test]
async fn blank_query_does_not_touch_the_store() -> anyhow::Result<()> {
    let store = Arc::new(CountingStore::new(sample_store()));
    let engine = MappingEngine::from_store(store.clone());

    for query in ["", "   ", "\t\n"] {
        let result = engine.search(query, None, 50).await?;
        assert!(result.concepts.is_empty());
        assert_eq!(result.total_count, 0);
    }
    assert_eq!(store.calls(), 0);

    engine.search("jvara", None, 50).await?;
    assert_eq!(store.calls(), 1);
    Ok(())
}

#[tokio::test]
async fn groups_links_under_their_concept() -> anyhow::Result<()> {
    let engine = engine_with(InMemoryStore::new(
        vec![term("AAE-10", "Vata A", "ayurveda"), term("AAE-11", "Vata B", "ayurveda")],
        vec![
            link("AAE-10", "T1", "Target one", 0.9),
            link("AAE-10", "T2", "Target two", 0.7),
            link("AAE-11", "T3", "Target three", 0.6),
        ],
    ));

    let result = engine.search("vata", None, 50).await?;
    assert_eq!(result.total_count, 2);
    assert_eq!(result.concepts[0].code, "AAE-10");
    let a_targets: Vec<_> = result.concepts[0]
        .mappings
        .iter()
        .map(|m| m.target_code.as_str())
        .collect();
    assert_eq!(a_targets, ["T1", "T2"]);
    assert_eq!(result.concepts[1].mappings.len(), 1);
    assert_eq!(result.concepts[1].mappings[0].target_code, "T3");
    Ok(())
}

#[tokio::test]
async fn matches_code_display_and_native_term() -> anyhow::Result<()> {
    let engine = sample_engine();

    let by_code = engine.search("sse-", None, 50).await?;
    assert_eq!(by_code.concepts.len(), 1);
    assert_eq!(by_code.concepts[0].code, "SSE-1");

    let by_display = engine.search("KASA", None, 50).await?;
    assert_eq!(by_display.concepts[0].code, "AAE-2");

    let by_native = engine.search("ज्वर", None, 50).await?;
    assert_eq!(by_native.concepts[0].code, "AAE-1");
    // Search keeps generic targets; relevance filtering belongs to translate.
    assert_eq!(by_native.concepts[0].mappings.len(), 3);
    Ok(())
}

#[tokio::test]
async fn concepts_without_links_are_included() -> anyhow::Result<()> {
    let result = sample_engine().search("atisara", None, 50).await?;
    assert_eq!(result.total_count, 1);
    assert!(result.concepts[0].mappings.is_empty());
    Ok(())
}

#[tokio::test]
async fn system_filter_and_limit() -> anyhow::Result<()> {
    let engine = sample_engine();

    // Target titles are not searched, so "Fever of unknown origin" does not count.
    let all = engine.search("u", None, 50).await?;
    let codes: Vec<_> = all.concepts.iter().map(|c| c.code.as_str()).collect();
    assert_eq!(codes, ["AYU-1", "UUE-1", "SSE-1"]);

    let unani = engine.search("u", Some(System::Unani), 50).await?;
    assert_eq!(unani.total_count, 1);
    assert_eq!(unani.concepts[0].code, "UUE-1");

    let limited = engine.search("u", None, 2).await?;
    assert_eq!(limited.total_count, 2);
    Ok(())
}

#[tokio::test]
async fn search_is_independent_of_pushdown() -> anyhow::Result<()> {
    let pushed = sample_engine();
    let unfiltered = unfiltered_engine_with(sample_store());

    for (query, system, limit) in [
        ("a", None, 50),
        ("a", Some(System::Ayurveda), 2),
        ("fever", None, 50),
        ("sse", Some(System::Siddha), 50),
        ("nothing matches", None, 50),
    ] {
        assert_eq!(
            pushed.search(query, system, limit).await?,
            unfiltered.search(query, system, limit).await?,
            "{query}"
        );
    }
    Ok(())
}
