use std::fs;
use std::path::PathBuf;

use wordle_tree::{Error, FeedbackMatrix, FeedbackPattern, Vocabulary};

fn vocab(words: &[&str]) -> Vocabulary {
    Vocabulary::from_words(words).unwrap()
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("wordle_tree_{}_{name}", std::process::id()))
}

fn sample() -> Vocabulary {
    vocab(&["sassy", "glass", "crane", "charm", "speed", "creep", "geese", "eerie"])
}

#[test]
fn test_compute_matches_calculate() {
    let v = sample();
    let matrix = FeedbackMatrix::compute(&v);
    assert_eq!(matrix.size(), v.len());
    assert!(!matrix.is_mapped());

    for (g, &guess) in v.words().iter().enumerate() {
        for (a, &answer) in v.words().iter().enumerate() {
            assert_eq!(matrix.get(g, a), FeedbackPattern::calculate(guess, answer));
            assert_eq!(matrix.row(g)[a], matrix.get(g, a).0);
        }
        assert!(matrix.get(g, g).is_win());
    }
    assert_eq!(matrix.get(0, 1).0, 114);
}

#[test]
fn test_compute_empty_vocabulary() {
    let v = Vocabulary::from_words(Vec::<String>::new()).unwrap();
    assert_eq!(FeedbackMatrix::compute(&v).size(), 0);
}

#[test]
fn test_write_then_open_and_read() {
    let v = sample();
    let matrix = FeedbackMatrix::compute(&v);
    let path = temp_path("matrix.bin");
    matrix.write(&path).unwrap();
    assert_eq!(fs::metadata(&path).unwrap().len(), (v.len() * v.len()) as u64);

    let mapped = FeedbackMatrix::open(&path, v.len()).unwrap();
    assert!(mapped.is_mapped());
    let read = FeedbackMatrix::read(&path, v.len()).unwrap();
    assert!(!read.is_mapped());
    for g in 0..v.len() {
        assert_eq!(mapped.row(g), matrix.row(g));
        assert_eq!(read.row(g), matrix.row(g));
    }

    let fallback = FeedbackMatrix::load_or_fallback(&path, &v, true).unwrap();
    assert_eq!(fallback.row(3), matrix.row(3));

    fs::remove_file(&path).unwrap();
}

#[test]
fn test_wrong_size_rejected() {
    let v = sample();
    let path = temp_path("short.bin");
    fs::write(&path, vec![0u8; 10]).unwrap();

    match FeedbackMatrix::read(&path, v.len()) {
        Err(Error::MatrixSize { expected, actual }) => {
            assert_eq!(expected, 64);
            assert_eq!(actual, 10);
        }
        other => panic!("unexpected result: {:?}", other.map(|m| m.size())),
    }
    assert!(FeedbackMatrix::load_or_fallback(&path, &v, false).is_none());

    fs::remove_file(&path).unwrap();
}

#[test]
fn test_invalid_code_rejected() {
    let v = sample();
    let path = temp_path("corrupt.bin");
    let mut bytes = vec![0u8; v.len() * v.len()];
    bytes[17] = 250;
    fs::write(&path, bytes).unwrap();

    match FeedbackMatrix::open(&path, v.len()) {
        Err(Error::MatrixCorrupt { offset, code }) => {
            assert_eq!(offset, 17);
            assert_eq!(code, 250);
        }
        other => panic!("unexpected result: {:?}", other.map(|m| m.size())),
    }

    fs::remove_file(&path).unwrap();
}

#[test]
fn test_missing_file_falls_back() {
    let v = sample();
    let path = temp_path("does_not_exist.bin");
    assert!(matches!(FeedbackMatrix::read(&path, v.len()), Err(Error::Io(_))));
    assert!(FeedbackMatrix::load_or_fallback(&path, &v, true).is_none());
}
