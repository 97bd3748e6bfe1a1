//! Integration tests that download real models.
//! Run with: cargo test --features integration

#![cfg(feature = "integration")]

use emotion_pipelines::emotion::{
    select_classifier, EmotionBertModel, EmotionPipelineBuilder, ModelSource, ModelTier,
    SelectionConfig,
};
use emotion_pipelines::error::Result;
use emotion_pipelines::scoring::score_one;

#[test]
fn fallback_model_scores_every_label() -> Result<()> {
    let pipeline = EmotionPipelineBuilder::bert(EmotionBertModel::default_source())
        .cpu()
        .build()?;

    let output = pipeline.run("I am so happy today!!! 😀")?;
    assert_eq!(output.results.len(), pipeline.labels().len());

    let total: f32 = output.results.iter().map(|p| p.score).sum();
    assert!((total - 1.0).abs() < 1e-3);
    assert_eq!(output.results.primary().unwrap().label, "joy");
    Ok(())
}

#[test]
fn fallback_model_batch() -> Result<()> {
    let pipeline = EmotionPipelineBuilder::bert(EmotionBertModel::default_source())
        .cpu()
        .build()?;

    let rows = ["What a wonderful surprise", "I am terrified of the dark", ""];
    let output = pipeline.run_batch(&rows)?;
    assert_eq!(output.rows.len(), rows.len());
    assert_eq!(output.summary.total(), rows.len());
    Ok(())
}

#[test]
fn pipelines_share_cached_weights() -> Result<()> {
    let a = EmotionPipelineBuilder::bert(EmotionBertModel::default_source()).build()?;
    let b = EmotionPipelineBuilder::bert(EmotionBertModel::default_source()).build()?;

    let x = a.run("I can't stop crying")?;
    let y = b.run("I can't stop crying")?;
    assert_eq!(x.results, y.results);
    Ok(())
}

#[test]
fn broken_local_model_falls_back() -> Result<()> {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.json"), "{ not json").unwrap();

    let config = SelectionConfig {
        local_model_dir: dir.path().to_path_buf(),
        ..SelectionConfig::default()
    };
    let classifier = select_classifier(&config)?;
    assert_eq!(classifier.tier(), ModelTier::Fallback);

    let results = score_one(&classifier, "This is the best day ever")?;
    assert_eq!(results.len(), classifier.labels().len());
    Ok(())
}

#[test]
fn missing_local_model_uses_fresh_head() -> Result<()> {
    let config = SelectionConfig {
        local_model_dir: "definitely/not/here".into(),
        base_model: ModelSource::hub("answerdotai/ModernBERT-base"),
        ..SelectionConfig::default()
    };
    let classifier = select_classifier(&config)?;
    assert_eq!(classifier.tier(), ModelTier::FreshHead);
    assert_eq!(classifier.labels(), ["fear", "anger", "joy", "sadness"]);
    Ok(())
}
