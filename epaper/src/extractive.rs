//! LexRank extractive summarization.
//!
//! Sentences are nodes of a similarity graph (TF-IDF cosine, thresholded), and
//! their centrality is the stationary distribution of a damped random walk
//! over that graph. The best-ranked sentences are returned in document order.

use std::collections::{HashMap, HashSet};
use unicode_segmentation::UnicodeSegmentation;

const SIMILARITY_THRESHOLD: f64 = 0.1;
const DAMPING: f64 = 0.85;
const MAX_ITERATIONS: usize = 100;
const EPSILON: f64 = 1e-6;

/// Summarize `text` into at most `sentence_count` of its own sentences.
/// Returns `None` when the text has no usable sentence.
pub fn lexrank_summary(text: &str, sentence_count: usize) -> Option<String> {
    let sentences = split_sentences(text);
    if sentences.is_empty() || sentence_count == 0 {
        return None;
    }

    let scores = lexrank_scores(&sentences);

    let mut ranked: Vec<usize> = (0..sentences.len()).collect();
    // Stable sort keeps earlier sentences first on equal scores
    ranked.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(sentence_count);
    ranked.sort_unstable();

    let summary = ranked
        .into_iter()
        .map(|i| sentences[i].as_str())
        .collect::<Vec<_>>()
        .join(" ");
    Some(summary)
}

/// Split text into trimmed sentences (UAX #29 sentence boundaries). Blank
/// lines always end a sentence; single line breaks are treated as spaces, so
/// hard-wrapped paragraphs stay whole.
pub fn split_sentences(text: &str) -> Vec<String> {
    paragraphs(text)
        .iter()
        .flat_map(|para| para.unicode_sentences())
        .map(str::trim)
        .filter(|sentence| sentence.chars().any(char::is_alphanumeric))
        .map(str::to_string)
        .collect()
}

fn paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join(" "));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join(" "));
    }
    paragraphs
}

fn tokenize(sentence: &str) -> Vec<String> {
    sentence
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn lexrank_scores(sentences: &[String]) -> Vec<f64> {
    let n = sentences.len();
    let tokens: Vec<Vec<String>> = sentences.iter().map(|s| tokenize(s)).collect();

    let mut document_frequency: HashMap<&str, usize> = HashMap::new();
    for words in &tokens {
        let unique: HashSet<&str> = words.iter().map(String::as_str).collect();
        for word in unique {
            *document_frequency.entry(word).or_default() += 1;
        }
    }
    let idf: HashMap<&str, f64> = document_frequency
        .iter()
        .map(|(&w, &df)| (w, (1.0 + n as f64 / df as f64).ln()))
        .collect();

    let vectors: Vec<HashMap<&str, f64>> = tokens
        .iter()
        .map(|words| {
            let mut tf: HashMap<&str, f64> = HashMap::new();
            for w in words {
                *tf.entry(w.as_str()).or_default() += 1.0;
            }
            let max_tf = tf.values().cloned().fold(0.0, f64::max);
            tf.into_iter()
                .map(|(w, count)| (w, (count / max_tf) * idf[w]))
                .collect()
        })
        .collect();

    // Row-stochastic adjacency over thresholded similarities. Sentences linked to
    // nothing else spread their weight uniformly.
    let mut matrix = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..n {
            if i != j && cosine(&vectors[i], &vectors[j]) > SIMILARITY_THRESHOLD {
                matrix[i][j] = 1.0;
            }
        }
        let degree: f64 = matrix[i].iter().sum();
        if degree > 0.0 {
            matrix[i].iter_mut().for_each(|v| *v /= degree);
        } else {
            matrix[i].iter_mut().for_each(|v| *v = 1.0 / n as f64);
        }
    }

    power_iteration(&matrix)
}

fn cosine(a: &HashMap<&str, f64>, b: &HashMap<&str, f64>) -> f64 {
    let dot: f64 = a
        .iter()
        .filter_map(|(w, x)| b.get(w).map(|y| x * y))
        .sum();
    let norm_a = a.values().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.values().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

fn power_iteration(matrix: &[Vec<f64>]) -> Vec<f64> {
    let n = matrix.len();
    let teleport = (1.0 - DAMPING) / n as f64;
    let mut scores = vec![1.0 / n as f64; n];

    for _ in 0..MAX_ITERATIONS {
        let mut next = vec![teleport; n];
        for (i, row) in matrix.iter().enumerate() {
            for (j, weight) in row.iter().enumerate() {
                next[j] += DAMPING * scores[i] * weight;
            }
        }
        let delta: f64 = next.iter().zip(&scores).map(|(a, b)| (a - b).abs()).sum();
        scores = next;
        if delta < EPSILON {
            break;
        }
    }
    scores
}
