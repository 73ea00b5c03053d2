//! Criterion benchmarks for paperclass.
//!
//! Covers the hot path of every experiment: text analysis, vectorizer
//! fitting and transformation, and chi-squared feature selection.

use std::hint::black_box;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use paperclass::analysis::analyzer::{Analyzer, PipelineAnalyzer};
use paperclass::features::selection::FeatureSelection;
use paperclass::features::vectorizer::{Vectorizer, VectorizerConfig};
use paperclass::features::Weighting;

/// Generate test documents for benchmarking.
fn generate_test_documents(count: usize) -> Vec<String> {
    let words = [
        "germline",
        "apoptosis",
        "hermaphrodite",
        "embryo",
        "larvae",
        "dauer",
        "neuron",
        "axon",
        "synapse",
        "muscle",
        "mutant",
        "allele",
        "expression",
        "reporter",
        "transgene",
        "rnai",
        "knockdown",
        "phenotype",
        "lifespan",
        "insulin",
        "signaling",
        "receptor",
        "kinase",
        "transcription",
        "chromatin",
        "meiosis",
        "mitosis",
        "gonad",
        "vulva",
        "cuticle",
        "pharynx",
        "intestine",
    ];

    (0..count)
        .map(|i| {
            let doc_length = 200 + (i % 300);
            (0..doc_length)
                .map(|j| words[(i * 7 + j * 13) % words.len()])
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

/// Benchmark text analysis.
fn bench_text_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("text_analysis");
    let texts = generate_test_documents(100);

    let plain = PipelineAnalyzer::for_documents(true, false).unwrap();
    let lemmatizing = PipelineAnalyzer::for_documents(true, true).unwrap();

    group.throughput(Throughput::Elements(100));
    group.bench_function("analyze_regex", |b| {
        b.iter(|| {
            for text in &texts {
                let tokens: Vec<_> = plain.analyze(black_box(text)).unwrap().collect();
                black_box(tokens);
            }
        })
    });
    group.bench_function("analyze_lemmatized", |b| {
        b.iter(|| {
            for text in &texts {
                let tokens: Vec<_> = lemmatizing.analyze(black_box(text)).unwrap().collect();
                black_box(tokens);
            }
        })
    });

    group.finish();
}

/// Benchmark vectorizer fitting and transformation.
fn bench_vectorizer(c: &mut Criterion) {
    let mut group = c.benchmark_group("vectorizer");
    group.sample_size(20);

    let documents = generate_test_documents(500);
    let texts: Vec<&str> = documents.iter().map(String::as_str).collect();

    for (name, weighting) in [("bow", Weighting::Count), ("tfidf", Weighting::TfIdf)] {
        let config = VectorizerConfig::default()
            .with_weighting(weighting)
            .with_ngram_range(1, 2);

        group.throughput(Throughput::Elements(texts.len() as u64));
        group.bench_function(format!("fit_{name}"), |b| {
            b.iter(|| {
                let mut vectorizer = Vectorizer::new(config.clone()).unwrap();
                vectorizer.fit(black_box(&texts)).unwrap();
                black_box(vectorizer)
            })
        });

        let mut fitted = Vectorizer::new(config).unwrap();
        fitted.fit(&texts).unwrap();
        group.bench_function(format!("transform_{name}"), |b| {
            b.iter(|| black_box(fitted.transform(black_box(&texts)).unwrap()))
        });
    }

    group.finish();
}

/// Benchmark chi-squared feature selection.
fn bench_feature_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("feature_selection");

    let documents = generate_test_documents(500);
    let texts: Vec<&str> = documents.iter().map(String::as_str).collect();
    let labels: Vec<i32> = (0..texts.len()).map(|i| (i % 2) as i32).collect();

    let mut vectorizer =
        Vectorizer::new(VectorizerConfig::default().with_ngram_range(1, 2)).unwrap();
    vectorizer.fit(&texts).unwrap();
    let matrix = vectorizer.transform(&texts).unwrap();

    group.bench_function("chi2_top_100", |b| {
        b.iter(|| black_box(FeatureSelection::fit(black_box(&matrix), &labels, 100).unwrap()))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_text_analysis,
    bench_vectorizer,
    bench_feature_selection
);

criterion_main!(benches);
