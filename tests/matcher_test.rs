//! Properties every matcher must hold, checked on generated doc-ID sets.

use std::collections::BTreeSet;
use std::sync::Arc;

use lucerne::DocId;
use lucerne::index::{EncodedPostings, MemoryPostingList, Posting, PostingList, PostingListConfig};
use lucerne::query::matcher::{
    BitVecMatcher, ConjunctionMatcher, DisjunctionMatcher, FilteredMatcher, MatchAllMatcher,
    Matcher, MockMatcher, NotMatcher, RequiredOptionalMatcher, SeriesMatcher, TermMatcher,
};
use lucerne::query::{TfIdfSimilarity, TopDocs};
use lucerne::util::bit_set::BitSet;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const DOC_MAX: DocId = 400;

fn random_set(rng: &mut StdRng, density: f64) -> Vec<DocId> {
    (1..=DOC_MAX).filter(|_| rng.random_bool(density)).collect()
}

fn mock(doc_ids: &[DocId]) -> Matcher {
    MockMatcher::from_doc_ids(doc_ids.to_vec()).into()
}

fn drain(matcher: &mut Matcher) -> Vec<DocId> {
    let mut docs = Vec::new();
    loop {
        let doc_id = matcher.next().unwrap();
        if doc_id == 0 {
            return docs;
        }
        docs.push(doc_id);
    }
}

/// Every matcher kind built from three generated sets, with the doc IDs it
/// should produce.
fn cases(seed: u64) -> Vec<(&'static str, Matcher, Vec<DocId>)> {
    let mut rng = StdRng::seed_from_u64(seed);
    let a = random_set(&mut rng, 0.3);
    let b = random_set(&mut rng, 0.5);
    let c = random_set(&mut rng, 0.1);
    let set = |docs: &[DocId]| docs.iter().copied().collect::<BTreeSet<_>>();
    let (sa, sb, sc) = (set(&a), set(&b), set(&c));
    let sim = TfIdfSimilarity::new();

    let postings: Vec<Posting> = a.iter().map(|&doc_id| Posting::with_positions(doc_id, 1, vec![0])).collect();
    let config = PostingListConfig { skip_interval: 4 };
    let encoded = Arc::new(EncodedPostings::encode(&postings, &config).unwrap());
    let term: Box<dyn PostingList> = Box::new(MemoryPostingList::new(encoded));

    let bits = Arc::new(BitSet::from_bits(DOC_MAX as usize + 1, c.iter().copied()));

    vec![
        (
            "conjunction",
            ConjunctionMatcher::new(vec![mock(&a), mock(&b)], &sim).into(),
            sa.intersection(&sb).copied().collect(),
        ),
        (
            "disjunction",
            DisjunctionMatcher::new(vec![mock(&a), mock(&b), mock(&c)], &sim).into(),
            sa.union(&sb).copied().collect::<BTreeSet<_>>().union(&sc).copied().collect(),
        ),
        (
            "required_optional",
            RequiredOptionalMatcher::new(mock(&a), mock(&b), &sim, true).into(),
            a.clone(),
        ),
        (
            "not",
            NotMatcher::new(mock(&b), DOC_MAX).into(),
            (1..=DOC_MAX).filter(|doc_id| !sb.contains(doc_id)).collect(),
        ),
        (
            "filtered",
            FilteredMatcher::new(mock(&b), mock(&c)).into(),
            sb.difference(&sc).copied().collect(),
        ),
        ("bit_vec", BitVecMatcher::new(bits, DOC_MAX).into(), c.clone()),
        (
            "series",
            SeriesMatcher::new(vec![mock(&a), mock(&c)], vec![0, DOC_MAX])
                .unwrap()
                .into(),
            a.iter()
                .copied()
                .chain(c.iter().map(|doc_id| doc_id + DOC_MAX))
                .collect(),
        ),
        (
            "term",
            TermMatcher::new(term, Arc::new(sim), 1.0, 1.0).into(),
            a.clone(),
        ),
        (
            "match_all",
            MatchAllMatcher::new(DOC_MAX, 1.0).into(),
            (1..=DOC_MAX).collect(),
        ),
    ]
}

#[test]
fn test_matchers_produce_expected_ascending_ids() {
    for seed in 0..8 {
        for (name, mut matcher, expected) in cases(seed) {
            let got = drain(&mut matcher);
            assert!(
                got.windows(2).all(|pair| pair[0] < pair[1]),
                "{name} not strictly ascending (seed {seed})"
            );
            assert_eq!(got, expected, "{name} (seed {seed})");
            // Exhausted matchers stay exhausted.
            assert_eq!(matcher.next().unwrap(), 0, "{name}");
            assert_eq!(matcher.advance(1).unwrap(), 0, "{name}");
        }
    }
}

#[test]
fn test_advance_matches_next_loop() {
    let mut rng = StdRng::seed_from_u64(99);
    for seed in 0..4 {
        let targets: Vec<DocId> = (0..20).map(|_| rng.random_range(0..=DOC_MAX + 2)).collect();
        for (name, mut matcher, expected) in cases(seed) {
            let mut current: DocId = 0;
            for &target in &targets {
                let effective = target.max(current + 1);
                let want = expected
                    .iter()
                    .copied()
                    .find(|&doc_id| doc_id >= effective)
                    .unwrap_or(0);
                let got = matcher.advance(target).unwrap();
                assert_eq!(got, want, "{name}: advance({target}) from {current}");
                if got == 0 {
                    break;
                }
                current = got;
            }
        }
    }
}

#[test]
fn test_scores_available_on_every_match() {
    for (name, mut matcher, _) in cases(3) {
        while matcher.next().unwrap() != 0 {
            let score = matcher.score();
            assert!(score.is_finite() && score >= 0.0, "{name}: {score}");
        }
    }
}

#[test]
fn test_top_docs_wire_format_round_trip() {
    let mut rng = StdRng::seed_from_u64(5);
    let match_docs = (1..=50)
        .map(|doc_id| lucerne::query::MatchDoc::new(doc_id, rng.random_range(0.0..10.0)))
        .collect();
    let top_docs = TopDocs::new(match_docs, 1234);
    let bytes = top_docs.to_bytes().unwrap();
    assert_eq!(TopDocs::from_bytes(&bytes).unwrap(), top_docs);
}
