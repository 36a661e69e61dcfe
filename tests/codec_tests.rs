use std::fs;

use wordle_tree::codec::{self, HEADER_LEN, MAGIC, VERSION};
use wordle_tree::{generate, generate_to_file, load_dictionary, DecisionTree, Error, GeneratorConfig, LookupTree, Vocabulary, Word};

fn w(s: &str) -> Word {
    Word::encode(s).unwrap()
}

fn sample_vocab() -> Vocabulary {
    let dict = load_dictionary().unwrap();
    Vocabulary::from_words(dict.words().iter().take(150).map(|word| word.to_string())).unwrap()
}

fn sample_tree(v: &Vocabulary) -> DecisionTree {
    let config = GeneratorConfig {
        depth: 6,
        start: Some(w("crane")),
    };
    generate(v, &config, None).unwrap()
}

fn first_entry_with_child(bytes: &[u8]) -> usize {
    let root = u32::from_le_bytes(bytes[12..16].try_into().unwrap()) as usize;
    let count = u32::from_le_bytes(bytes[root..root + 4].try_into().unwrap()) as usize;
    (0..count)
        .map(|i| root + 4 + i * 16)
        .find(|&at| bytes[at + 12..at + 16] != [0; 4])
        .unwrap()
}

#[test]
fn test_header_layout() {
    let v = sample_vocab();
    let tree = sample_tree(&v);
    let bytes = codec::encode(&tree).unwrap();

    assert_eq!(&bytes[0..4], &MAGIC);
    assert_eq!(&bytes[0..4], b"WDTR");
    assert_eq!(bytes[4..8], VERSION.to_le_bytes());
    assert_eq!(bytes[8..12], 6u32.to_le_bytes());
    assert_eq!(bytes[12..16], (HEADER_LEN as u32).to_le_bytes());
    assert_eq!(bytes[16..24], w("crane").raw().to_le_bytes());
    assert_eq!(&bytes[24..29], b"crane");
    assert_eq!(bytes[29..32], [0, 0, 0]);

    let root_count = u32::from_le_bytes(bytes[32..36].try_into().unwrap());
    assert_eq!(root_count as usize, tree.root.edges.len());
}

#[test]
fn test_entries_match_tree() {
    let v = sample_vocab();
    let tree = sample_tree(&v);
    let lookup = LookupTree::from_bytes(codec::encode(&tree).unwrap()).unwrap();

    assert_eq!(lookup.depth(), 6);
    assert_eq!(lookup.start(), w("crane"));
    assert_eq!(lookup.root().offset(), HEADER_LEN as u32);

    let entries: Vec<_> = lookup.entries(lookup.root()).collect();
    assert_eq!(entries.len(), tree.root.edges.len());
    for (entry, edge) in entries.iter().zip(&tree.root.edges) {
        assert_eq!(entry.pattern, edge.pattern);
        assert_eq!(entry.guess, edge.next.guess);
        assert_eq!(entry.child.is_none(), edge.next.is_leaf());
        assert_eq!(lookup.find_child(lookup.root(), edge.pattern), Some(*entry));
    }
}

#[test]
fn test_single_word_tree() {
    let v = Vocabulary::from_words(["crane"]).unwrap();
    let tree = generate(&v, &GeneratorConfig::default(), None).unwrap();
    let bytes = codec::encode(&tree).unwrap();
    assert_eq!(bytes.len(), HEADER_LEN + 4);

    let lookup = LookupTree::from_bytes(bytes).unwrap();
    assert_eq!(lookup.entries(lookup.root()).count(), 0);
}

#[test]
fn test_write_and_load_file() {
    let v = sample_vocab();
    let path = std::env::temp_dir().join(format!("wordle_tree_{}_lookup.bin", std::process::id()));
    let config = GeneratorConfig {
        depth: 6,
        start: Some(w("crane")),
    };
    let tree = generate_to_file(&v, &config, None, &path).unwrap();

    let lookup = LookupTree::load(&path, 6, w("crane")).unwrap();
    assert_eq!(lookup.len(), codec::encode(&tree).unwrap().len());

    assert!(matches!(
        LookupTree::load(&path, 5, w("crane")),
        Err(Error::DepthMismatch { expected: 5, found: 6 })
    ));
    match LookupTree::load(&path, 6, w("slate")) {
        Err(Error::StartMismatch { expected, found }) => {
            assert_eq!(expected, "slate");
            assert_eq!(found, "crane");
        }
        other => panic!("unexpected result: {other:?}"),
    }

    fs::remove_file(&path).unwrap();
}

#[test]
fn test_failed_generation_writes_nothing() {
    let v = Vocabulary::from_words(["crane", "slate"]).unwrap();
    let path = std::env::temp_dir().join(format!("wordle_tree_{}_failed.bin", std::process::id()));
    let config = GeneratorConfig {
        depth: 1,
        start: None,
    };
    assert!(generate_to_file(&v, &config, None, &path).is_err());
    assert!(!path.exists());
}

#[test]
fn test_missing_file() {
    let path = std::env::temp_dir().join("wordle_tree_no_such_tree.bin");
    assert!(matches!(LookupTree::load(&path, 6, w("crane")), Err(Error::Io(_))));
}

#[test]
fn test_bad_magic() {
    let v = sample_vocab();
    let mut bytes = codec::encode(&sample_tree(&v)).unwrap();
    bytes[0] = b'X';
    assert!(matches!(LookupTree::from_bytes(bytes), Err(Error::BadMagic)));
}

#[test]
fn test_unsupported_version() {
    let v = sample_vocab();
    let mut bytes = codec::encode(&sample_tree(&v)).unwrap();
    bytes[4..8].copy_from_slice(&2u32.to_le_bytes());
    assert!(matches!(LookupTree::from_bytes(bytes), Err(Error::UnsupportedVersion(2))));
}

#[test]
fn test_zero_depth_rejected() {
    let v = Vocabulary::from_words(["crane", "slate"]).unwrap();
    let config = GeneratorConfig {
        depth: 2,
        start: Some(w("crane")),
    };
    let mut bytes = codec::encode(&generate(&v, &config, None).unwrap()).unwrap();
    bytes[8..12].copy_from_slice(&0u32.to_le_bytes());
    assert!(matches!(LookupTree::from_bytes(bytes), Err(Error::TreeCorrupt(_))));
}

#[test]
fn test_truncated_files() {
    let v = sample_vocab();
    let bytes = codec::encode(&sample_tree(&v)).unwrap();

    assert!(matches!(LookupTree::from_bytes(bytes[..10].to_vec()), Err(Error::TreeCorrupt(_))));
    assert!(matches!(
        LookupTree::from_bytes(bytes[..bytes.len() - 1].to_vec()),
        Err(Error::TreeCorrupt(_))
    ));
}

#[test]
fn test_corrupt_structure() {
    let v = sample_vocab();
    let bytes = codec::encode(&sample_tree(&v)).unwrap();

    let mut start_letters = bytes.clone();
    start_letters[24] = b'x';
    assert!(matches!(LookupTree::from_bytes(start_letters), Err(Error::TreeCorrupt(_))));

    let mut root_in_header = bytes.clone();
    root_in_header[12..16].copy_from_slice(&4u32.to_le_bytes());
    assert!(matches!(LookupTree::from_bytes(root_in_header), Err(Error::TreeCorrupt(_))));

    let mut bad_pattern = bytes.clone();
    bad_pattern[36..38].copy_from_slice(&243u16.to_le_bytes());
    assert!(matches!(LookupTree::from_bytes(bad_pattern), Err(Error::TreeCorrupt(_))));

    let mut bad_guess = bytes.clone();
    bad_guess[40..48].copy_from_slice(&0u64.to_le_bytes());
    assert!(matches!(LookupTree::from_bytes(bad_guess), Err(Error::TreeCorrupt(_))));

    let at = first_entry_with_child(&bytes);
    let mut backwards = bytes.clone();
    backwards[at + 12..at + 16].copy_from_slice(&(HEADER_LEN as u32).to_le_bytes());
    assert!(matches!(LookupTree::from_bytes(backwards), Err(Error::TreeCorrupt(_))));

    let mut out_of_bounds = bytes.clone();
    out_of_bounds[at + 12..at + 16].copy_from_slice(&(bytes.len() as u32 + 100).to_le_bytes());
    assert!(matches!(LookupTree::from_bytes(out_of_bounds), Err(Error::TreeCorrupt(_))));
}

#[test]
fn test_dump_lists_header_and_nodes() {
    let v = sample_vocab();
    let tree = sample_tree(&v);
    let lookup = LookupTree::from_bytes(codec::encode(&tree).unwrap()).unwrap();

    let mut out = Vec::new();
    lookup.dump(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    let header = text.lines().next().unwrap();
    assert!(header.contains("version=1"));
    assert!(header.contains("depth=6"));
    assert!(header.contains("start=crane"));
    assert!(text.contains(&format!("node@{}", HEADER_LEN)));
    assert_eq!(text.matches("node@").count(), tree.node_count() - count_leaves(&tree.root));
}

fn count_leaves(node: &wordle_tree::tree::Node) -> usize {
    if node.is_leaf() {
        return 1;
    }
    node.edges.iter().map(|edge| count_leaves(&edge.next)).sum()
}
