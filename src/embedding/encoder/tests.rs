use super::*;
use std::path::PathBuf;

use crate::embedding::TextEmbedder;

mod config_tests {
    use super::*;

    #[test]
    fn test_encoder_config_default_is_stub() {
        let config = EncoderConfig::default();
        assert!(config.source.is_stub());
        assert_eq!(config.stub_dim, crate::constants::DEFAULT_EMBEDDING_DIM);
        assert!(config.query_prefix.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_missing_directory() {
        let config = EncoderConfig::new(ModelSource::Directory(PathBuf::from(
            "/nonexistent/e5-small-v2",
        )));
        assert!(matches!(
            config.validate(),
            Err(EmbeddingError::ModelNotFound { .. })
        ));
    }

    #[test]
    fn test_validate_directory_without_weights() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.json"), "{}").unwrap();
        std::fs::write(dir.path().join("tokenizer.json"), "{}").unwrap();

        let config = EncoderConfig::new(ModelSource::Directory(dir.path().to_path_buf()));
        match config.validate() {
            Err(EmbeddingError::ModelNotFound { path }) => {
                assert!(path.ends_with("model.safetensors"));
            }
            other => panic!("expected ModelNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_zero_seq_len() {
        let config = EncoderConfig {
            max_seq_len: 0,
            ..EncoderConfig::stub()
        };
        assert!(matches!(
            config.validate(),
            Err(EmbeddingError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_with_query_prefix() {
        let config = EncoderConfig::stub().with_query_prefix(E5_QUERY_PREFIX);
        assert_eq!(config.query_prefix, "query: ");
    }
}

mod stub_tests {
    use super::*;

    #[test]
    fn test_stub_dimension() {
        let encoder = QueryEncoder::stub().unwrap();
        assert!(encoder.is_stub());
        assert_eq!(encoder.dimension(), 384);

        let v = encoder.embed_query("marriage age").unwrap();
        assert_eq!(v.len(), 384);
    }

    #[test]
    fn test_stub_is_deterministic() {
        let encoder = QueryEncoder::stub().unwrap();
        let a = encoder.embed_query("What is the legal marriage age?").unwrap();
        let b = encoder.embed_query("What is the legal marriage age?").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_stub_ignores_surrounding_whitespace() {
        let encoder = QueryEncoder::stub().unwrap();
        let a = encoder.embed_query("  citizenship  ").unwrap();
        let b = encoder.embed_query("citizenship").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_stub_distinguishes_texts() {
        let encoder = QueryEncoder::stub().unwrap();
        let a = encoder.embed_query("divorce").unwrap();
        let b = encoder.embed_query("inheritance").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_stub_unit_norm() {
        let encoder = QueryEncoder::stub().unwrap();
        let v = encoder.embed_query("land registration").unwrap();
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4, "norm was {norm}");
    }

    #[test]
    fn test_query_prefix_changes_the_vector() {
        let plain = QueryEncoder::stub().unwrap();
        let prefixed =
            QueryEncoder::load(EncoderConfig::stub().with_query_prefix(E5_QUERY_PREFIX)).unwrap();

        let a = plain.embed_query("citizenship").unwrap();
        let b = prefixed.embed_query("citizenship").unwrap();
        let c = plain.embed_query("query: citizenship").unwrap();
        assert_ne!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn test_debug_output() {
        let encoder = QueryEncoder::stub().unwrap();
        let s = format!("{:?}", encoder);
        assert!(s.contains("QueryEncoder"));
        assert!(s.contains("Stub(dim=384)"));
    }
}

#[test]
fn test_normalize_zero_vector() {
    assert_eq!(normalize(vec![0.0, 0.0]), vec![0.0, 0.0]);
}

#[test]
fn test_normalize_scales() {
    let v = normalize(vec![3.0, 4.0]);
    assert!((v[0] - 0.6).abs() < 1e-6);
    assert!((v[1] - 0.8).abs() < 1e-6);
}
