use wordle_tree::{
    codec, generate, load_dictionary, Error, FeedbackPattern, GeneratorConfig, LookupTree, Outcome, Vocabulary,
    Walker, Word,
};

fn w(s: &str) -> Word {
    Word::encode(s).unwrap()
}

fn build(v: &Vocabulary, depth: u32, start: &str) -> (wordle_tree::DecisionTree, LookupTree) {
    let config = GeneratorConfig {
        depth,
        start: Some(w(start)),
    };
    let tree = generate(v, &config, None).unwrap();
    let lookup = LookupTree::from_bytes(codec::encode(&tree).unwrap()).unwrap();
    (tree, lookup)
}

fn pair() -> Vocabulary {
    Vocabulary::from_words(["crane", "slate"]).unwrap()
}

#[test]
fn test_every_word_solved_within_depth() {
    let dict = load_dictionary().unwrap();
    let (tree, lookup) = build(&dict, 6, "roate");
    let walker = Walker::new(&lookup);

    for &answer in dict.words() {
        let trace = walker.solve(answer);
        let expected = tree.guesses_for(answer).unwrap();
        assert_eq!(trace.guesses(), expected);
        assert_eq!(
            trace.outcome,
            Outcome::Solved {
                turns: expected.len() as u32
            }
        );
        assert!(trace.steps.last().unwrap().feedback.is_win());
        assert!(trace.steps.len() <= 6);
    }
}

#[test]
fn test_start_word_solves_in_one() {
    let (_, lookup) = build(&pair(), 2, "crane");
    let trace = Walker::new(&lookup).solve(w("crane"));
    assert_eq!(trace.outcome, Outcome::Solved { turns: 1 });
    assert_eq!(trace.guesses(), vec![w("crane")]);
}

#[test]
fn test_missing_branch() {
    let (_, lookup) = build(&pair(), 2, "crane");
    let trace = Walker::new(&lookup).solve(w("quick"));
    let code = FeedbackPattern::calculate(w("crane"), w("quick")).0;

    assert_eq!(trace.outcome, Outcome::BranchMissing { turn: 1, code });
    assert_eq!(trace.steps.len(), 1);
    assert!(!trace.is_solved());
    assert!(matches!(
        trace.into_result(),
        Err(Error::BranchMissing { turn: 1, code: c }) if c == code
    ));
}

#[test]
fn test_depth_exhausted() {
    let (tree, _) = build(&pair(), 2, "crane");
    let mut bytes = codec::encode(&tree).unwrap();
    bytes[8..12].copy_from_slice(&1u32.to_le_bytes());
    let lookup = LookupTree::from_bytes(bytes).unwrap();
    assert_eq!(lookup.depth(), 1);

    let trace = Walker::new(&lookup).solve(w("slate"));
    assert_eq!(trace.outcome, Outcome::DepthExhausted { depth: 1 });
    assert_eq!(trace.guesses(), vec![w("crane")]);
    assert!(matches!(trace.into_result(), Err(Error::DepthExhausted { depth: 1 })));
}

#[test]
fn test_benchmark_report() {
    let dict = load_dictionary().unwrap();
    let v = Vocabulary::from_words(dict.words().iter().take(150).map(|word| word.to_string())).unwrap();
    let (_, lookup) = build(&v, 6, "crane");

    let report = Walker::new(&lookup).benchmark(&v);
    assert_eq!(report.solved(), v.len());
    assert!(report.failures.is_empty());
    assert_eq!(report.distribution[0], (1, 1));
    assert!(report.distribution.windows(2).all(|pair| pair[0].0 < pair[1].0));
    assert!(report.distribution.iter().all(|&(turns, _)| turns <= 6));

    let average = report.average_turns();
    assert!(average > 1.0 && average <= 6.0);
}

#[test]
fn test_benchmark_counts_failures() {
    let (tree, _) = build(&pair(), 2, "crane");
    let mut bytes = codec::encode(&tree).unwrap();
    bytes[8..12].copy_from_slice(&1u32.to_le_bytes());
    let lookup = LookupTree::from_bytes(bytes).unwrap();

    let report = Walker::new(&lookup).benchmark(&pair());
    assert_eq!(report.distribution, vec![(1, 1)]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].answer, w("slate"));
    assert_eq!(report.average_turns(), 1.0);
}

#[test]
fn test_trace_json() {
    let (_, lookup) = build(&pair(), 2, "crane");
    let trace = Walker::new(&lookup).solve(w("slate"));
    let json = serde_json::to_value(&trace).unwrap();

    assert_eq!(json["answer"], "slate");
    assert_eq!(json["steps"][0]["guess"], "crane");
    assert_eq!(
        json["steps"][0]["feedback"],
        FeedbackPattern::calculate(w("crane"), w("slate")).0
    );
    assert_eq!(json["steps"][1]["feedback"], 242);
    assert_eq!(json["outcome"]["status"], "solved");
    assert_eq!(json["outcome"]["turns"], 2);
}

#[test]
fn test_benchmark_ignores_header_depth_for_sizing() {
    let (tree, _) = build(&pair(), 2, "crane");
    let mut bytes = codec::encode(&tree).unwrap();
    bytes[8..12].copy_from_slice(&u32::MAX.to_le_bytes());
    let lookup = LookupTree::from_bytes(bytes).unwrap();

    let report = Walker::new(&lookup).benchmark(&pair());
    assert_eq!(report.distribution, vec![(1, 1), (2, 1)]);
    assert!(report.failures.is_empty());
}
