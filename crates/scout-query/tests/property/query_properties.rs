use chrono::Utc;
use proptest::prelude::*;
use scout_core::models::SearchFilters;
use scout_query::QueryBuilder;

fn arb_keyword() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z]{1,12}",
        "[a-z]{1,8} [a-z]{1,8}",
        "#[a-z]{2,10}",
    ]
}

fn arb_filters() -> impl Strategy<Value = SearchFilters> {
    (
        proptest::option::of(0u32..500),
        proptest::option::of(0u32..500),
        any::<bool>(),
        any::<bool>(),
        proptest::option::of(0u32..30),
    )
        .prop_map(|(likes, retweets, ex_replies, ex_retweets, days)| SearchFilters {
            min_likes: likes,
            min_retweets: retweets,
            exclude_replies: ex_replies,
            exclude_retweets: ex_retweets,
            language: Some("en".into()),
            days_back: days,
            ..Default::default()
        })
}

proptest! {
    #[test]
    fn every_query_respects_both_ceilings(
        keywords in proptest::collection::vec(arb_keyword(), 1..80),
        filters in arb_filters(),
        max_length in 60usize..600,
        max_terms in 1usize..30,
    ) {
        let builder = QueryBuilder::new(max_length, max_terms);
        let plan = builder.plan(&keywords, &filters, Utc::now()).unwrap();
        for q in &plan.queries {
            prop_assert!(q.len() <= max_length, "{} > {}", q.len(), max_length);
            prop_assert!(q.or_terms() <= max_terms);
            prop_assert!(q.or_terms() >= 1);
        }
    }

    #[test]
    fn every_keyword_is_placed_or_rejected(
        keywords in proptest::collection::vec(arb_keyword(), 1..60),
        max_length in 20usize..200,
    ) {
        let builder = QueryBuilder::new(max_length, 25);
        let plan = builder.plan(&keywords, &SearchFilters::default(), Utc::now()).unwrap();

        let mut unique = keywords.clone();
        unique.sort();
        unique.dedup();

        let placed: usize = plan.queries.iter().map(|q| q.or_terms()).sum();
        prop_assert_eq!(placed + plan.rejected.len(), unique.len());
    }
}
