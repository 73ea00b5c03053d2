#[cfg(test)]
mod tests {
    use std::fs::{self, File};
    use std::io::Write;
    use std::path::Path;

    use flate2::Compression;
    use flate2::write::GzEncoder;

    use paperclass::classifier::{DocumentClassifier, Prediction};
    use paperclass::dataset::Dataset;
    use paperclass::document::{SourceType, extract_text};
    use paperclass::features::FeatureExtraction;
    use paperclass::ml::models::{Model, ModelKind};

    fn write_cas(path: &Path, sofa: &str) {
        let content = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<xmi:XMI xmi:version=\"2.0\">\n<cas:Sofa xmi:id=\"1\" sofaNum=\"1\" sofaID=\"_InitialView\" mimeType=\"text\" sofaString=\"{sofa}\"/>\n</xmi:XMI>\n"
        );
        let mut encoder = GzEncoder::new(File::create(path).unwrap(), Compression::default());
        encoder.write_all(content.as_bytes()).unwrap();
        encoder.finish().unwrap();
    }

    fn article(body: &str) -> String {
        format!(
            "&lt;!DOCTYPE article&gt;&lt;article&gt;&lt;front&gt;&lt;title&gt;Ignored title&lt;/title&gt;&lt;/front&gt;&lt;body&gt;{body}&lt;/body&gt;&lt;/article&gt;"
        )
    }

    #[test]
    fn test_cas_pdf_documents() {
        let dir = tempfile::tempdir().unwrap();
        write_cas(
            &dir.path().join("WBPaper0001.tpcas.gz"),
            "Germline &lt;_pdf page=&quot;1&quot;/&gt;apoptosis &lt;_pdf page=&quot;2&quot;/&gt;in &amp; around the gonad",
        );
        write_cas(&dir.path().join("WBPaper0002.tpcas.gz"), "Axon   guidance\tcues");

        let mut dataset = Dataset::new();
        let added = dataset
            .add_classified_docs(dir.path(), false, SourceType::CasPdf, 1)
            .unwrap();
        assert_eq!(added, 2);
        assert_eq!(
            dataset.texts(),
            vec!["Germline apoptosis in & around the gonad", "Axon guidance cues"]
        );
        assert_eq!(dataset.records()[0].filename, "WBPaper0001.tpcas.gz");
    }

    #[test]
    fn test_cas_xml_documents_keep_only_the_body() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("paper.tpcas.gz");
        write_cas(
            &path,
            &article("&lt;sec&gt;&lt;p&gt;Dauer larvae&lt;/p&gt;&lt;p&gt; resist stress&lt;/p&gt;&lt;/sec&gt;"),
        );

        let text = extract_text(&path, SourceType::CasXml).unwrap();
        assert_eq!(text.as_deref(), Some("Dauer larvae resist stress"));
    }

    #[test]
    fn test_broken_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.pdf"), b"%PDF-1.4 truncated garbage").unwrap();
        fs::write(dir.path().join("b.pdf"), b"not a pdf at all").unwrap();

        let mut dataset = Dataset::new();
        let added = dataset
            .add_classified_docs(dir.path(), true, SourceType::Pdf, 0)
            .unwrap();
        assert_eq!(added, 0);
        assert!(dataset.is_empty());

        let cas_dir = tempfile::tempdir().unwrap();
        write_cas(&cas_dir.path().join("good.tpcas.gz"), "Cell division");
        fs::write(cas_dir.path().join("corrupt.tpcas.gz"), b"\x1f\x8b broken").unwrap();
        let mut no_sofa = GzEncoder::new(
            File::create(cas_dir.path().join("empty.tpcas.gz")).unwrap(),
            Compression::default(),
        );
        no_sofa.write_all(b"<xmi:XMI/>").unwrap();
        no_sofa.finish().unwrap();

        let added = dataset
            .add_classified_docs(cas_dir.path(), true, SourceType::CasPdf, 1)
            .unwrap();
        assert_eq!(added, 1);
        assert_eq!(dataset.records()[0].filename, "good.tpcas.gz");
    }

    #[test]
    fn test_recursive_and_flat_walks() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("top.txt"), "Top level paper").unwrap();
        let nested = dir.path().join("2020").join("march");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("deep.txt"), "Nested paper").unwrap();

        let mut flat = Dataset::new();
        assert_eq!(
            flat.add_classified_docs(dir.path(), false, SourceType::Text, 1)
                .unwrap(),
            1
        );

        let mut deep = Dataset::new();
        assert_eq!(
            deep.add_classified_docs(dir.path(), true, SourceType::Text, 1)
                .unwrap(),
            2
        );
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut dataset = Dataset::new();
        assert!(
            dataset
                .add_classified_docs(dir.path().join("absent"), true, SourceType::Text, 1)
                .is_err()
        );
    }

    #[test]
    fn test_unreadable_files_are_listed_last_in_predictions() {
        let dir = tempfile::tempdir().unwrap();
        let positive = dir.path().join("positive");
        let negative = dir.path().join("negative");
        fs::create_dir_all(&positive).unwrap();
        fs::create_dir_all(&negative).unwrap();
        for i in 0..4 {
            write_cas(
                &positive.join(format!("p{i}.tpcas.gz")),
                "germline apoptosis in the gonad",
            );
            write_cas(
                &negative.join(format!("n{i}.tpcas.gz")),
                "axon guidance of migrating neurons",
            );
        }

        let mut classifier: DocumentClassifier<Model> = DocumentClassifier::with_seed(4);
        classifier
            .add_classified_docs(&positive, false, SourceType::CasPdf, 1)
            .unwrap();
        classifier
            .add_classified_docs(&negative, false, SourceType::CasPdf, 0)
            .unwrap();
        classifier.generate_training_and_test_sets(1.0).unwrap();
        classifier
            .extract_features(&FeatureExtraction::default())
            .unwrap();
        classifier.train(ModelKind::Prototype.build(), false).unwrap();

        let unseen = dir.path().join("unseen");
        fs::create_dir_all(&unseen).unwrap();
        fs::write(unseen.join("a_broken.tpcas.gz"), b"garbage").unwrap();
        write_cas(&unseen.join("b.tpcas.gz"), "apoptosis of germline cells");
        write_cas(&unseen.join("c.tpcas.gz"), "neurons extend an axon");

        let predictions = classifier
            .predict_files(&unseen, SourceType::CasPdf, false)
            .unwrap();
        assert_eq!(
            predictions,
            vec![
                Prediction {
                    filename: "b.tpcas.gz".to_string(),
                    label: Some(1),
                },
                Prediction {
                    filename: "c.tpcas.gz".to_string(),
                    label: Some(0),
                },
                Prediction {
                    filename: "a_broken.tpcas.gz".to_string(),
                    label: None,
                },
            ]
        );

        assert_eq!(
            classifier
                .predict_file(unseen.join("a_broken.tpcas.gz"), SourceType::CasPdf, false)
                .unwrap(),
            None
        );

        let empty = dir.path().join("empty");
        fs::create_dir_all(&empty).unwrap();
        assert!(
            classifier
                .predict_files(&empty, SourceType::CasPdf, false)
                .unwrap()
                .is_empty()
        );
    }
}
