use std::path::Path;
use std::sync::Arc;

use image::{DynamicImage, RgbaImage};
use tempfile::TempDir;

use subtitle_extractor_rust::{
    ConfigBuilder, Deduplicator, FrameStore, MockRecognizer, OutputFormat, SubtitlePipeline,
    VideoProcessor,
};
use subtitle_extractor_rust::subtitles::{write_srt, write_transcript};

/// Write `count` decodable PNG frames named frame_0001.. into `dir`.
async fn write_frames(dir: &Path, count: u32) {
    for index in 1..=count {
        let image = DynamicImage::ImageRgba8(RgbaImage::new(64, 48));
        image
            .save(dir.join(format!("frame_{:04}", index)).with_extension("png"))
            .unwrap();
    }
}

async fn prepared_store(temp_dir: &TempDir) -> FrameStore {
    let store = FrameStore::at(temp_dir.path().join("workspace"));
    store.prepare().await.unwrap();
    store
}

#[tokio::test]
async fn test_pipeline_filters_and_deduplicates_end_to_end() {
    let temp_dir = TempDir::new().unwrap();
    let store = prepared_store(&temp_dir).await;
    write_frames(&store.frames_dir(), 5).await;

    let frames = VideoProcessor::collect_frames(&store.frames_dir())
        .await
        .unwrap();
    assert_eq!(frames.len(), 5);

    // Frames 2 (empty) and 5 (noise) must be rejected by the quality gate
    let recognizer = MockRecognizer::from_texts(&["Hello", "", "Hello", "World!!!", "..."]);
    let config = ConfigBuilder::new().build();
    let pipeline = SubtitlePipeline::new(config, Arc::new(recognizer));

    let entries = pipeline.process_frames(&frames, &store).await;

    let indices: Vec<u32> = entries.iter().map(|e| e.frame_index).collect();
    let texts: Vec<&str> = entries.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(indices, vec![1, 3, 4]);
    assert_eq!(texts, vec!["Hello", "Hello", "World!!!"]);

    // Dedup drops the repeated "Hello" from frame 3, keeping the earliest
    let deduped = Deduplicator::with_threshold(0.9).deduplicate(entries);
    let indices: Vec<u32> = deduped.iter().map(|e| e.frame_index).collect();
    assert_eq!(indices, vec![1, 4]);
}

#[tokio::test]
async fn test_pipeline_output_files_are_bit_exact() {
    let temp_dir = TempDir::new().unwrap();
    let store = prepared_store(&temp_dir).await;
    write_frames(&store.frames_dir(), 5).await;

    let frames = VideoProcessor::collect_frames(&store.frames_dir())
        .await
        .unwrap();

    let recognizer = MockRecognizer::from_texts(&["Hello", "", "Hello", "World!!!", "..."]);
    let config = ConfigBuilder::new().build();
    let pipeline = SubtitlePipeline::new(config, Arc::new(recognizer));

    let entries = pipeline.process_frames(&frames, &store).await;
    let deduped = Deduplicator::with_threshold(0.9).deduplicate(entries);

    let txt_path = temp_dir.path().join("result.txt");
    write_transcript(&deduped, &txt_path).await.unwrap();
    let content = tokio::fs::read_to_string(&txt_path).await.unwrap();
    assert_eq!(content, "frame_0001: Hello\nframe_0004: World!!!\n");

    let srt_path = temp_dir.path().join("result.srt");
    write_srt(&deduped, 1.0, &srt_path).await.unwrap();
    let content = tokio::fs::read_to_string(&srt_path).await.unwrap();
    assert_eq!(
        content,
        "1\n00:00:01,000 --> 00:00:02,000\nHello\n\n\
         2\n00:00:04,000 --> 00:00:05,000\nWorld!!!\n\n"
    );
}

#[tokio::test]
async fn test_recognition_failure_skips_frame_without_aborting() {
    let temp_dir = TempDir::new().unwrap();
    let store = prepared_store(&temp_dir).await;
    write_frames(&store.frames_dir(), 3).await;

    let frames = VideoProcessor::collect_frames(&store.frames_dir())
        .await
        .unwrap();

    let recognizer = MockRecognizer::from_texts(&["First line", "Second line", "Third line"])
        .failing_on("frame_0002");
    let config = ConfigBuilder::new().build();
    let pipeline = SubtitlePipeline::new(config, Arc::new(recognizer));

    let entries = pipeline.process_frames(&frames, &store).await;

    let indices: Vec<u32> = entries.iter().map(|e| e.frame_index).collect();
    assert_eq!(indices, vec![1, 3]);
}

#[tokio::test]
async fn test_unreadable_frame_skipped_and_discarded() {
    let temp_dir = TempDir::new().unwrap();
    let store = prepared_store(&temp_dir).await;
    write_frames(&store.frames_dir(), 2).await;

    // Corrupt the first frame
    let bad_frame = store.frames_dir().join("frame_0001.png");
    tokio::fs::write(&bad_frame, b"not a png").await.unwrap();

    let frames = VideoProcessor::collect_frames(&store.frames_dir())
        .await
        .unwrap();

    let recognizer = MockRecognizer::from_texts(&["First line", "Second line"]);
    let config = ConfigBuilder::new().build();
    let pipeline = SubtitlePipeline::new(config, Arc::new(recognizer));

    let entries = pipeline.process_frames(&frames, &store).await;

    let indices: Vec<u32> = entries.iter().map(|e| e.frame_index).collect();
    assert_eq!(indices, vec![2]);
    assert!(!bad_frame.exists());
}

#[tokio::test]
async fn test_content_labels_are_sanitized_and_unique() {
    let temp_dir = TempDir::new().unwrap();
    let store = prepared_store(&temp_dir).await;
    write_frames(&store.frames_dir(), 2).await;

    let frames = VideoProcessor::collect_frames(&store.frames_dir())
        .await
        .unwrap();

    let recognizer = MockRecognizer::from_texts(&["Same words", "Same words"]);
    let config = ConfigBuilder::new()
        .with_dedupe(false)
        .label_by_content(true)
        .build();
    let pipeline = SubtitlePipeline::new(config, Arc::new(recognizer));

    let entries = pipeline.process_frames(&frames, &store).await;

    let labels: Vec<&str> = entries.iter().map(|e| e.label.as_str()).collect();
    assert_eq!(labels, vec!["Same_words_0001", "Same_words_0002"]);
}

#[tokio::test]
async fn test_rejected_frames_are_discarded_from_storage() {
    let temp_dir = TempDir::new().unwrap();
    let store = prepared_store(&temp_dir).await;
    write_frames(&store.frames_dir(), 2).await;

    let frames = VideoProcessor::collect_frames(&store.frames_dir())
        .await
        .unwrap();

    let recognizer = MockRecognizer::from_texts(&["Keep this one", "..."]);
    let config = ConfigBuilder::new().build();
    let pipeline = SubtitlePipeline::new(config, Arc::new(recognizer));

    let entries = pipeline.process_frames(&frames, &store).await;
    assert_eq!(entries.len(), 1);

    // The noise frame's assets are gone; the accepted frame remains
    assert!(!store.frames_dir().join("frame_0002.png").exists());
    assert!(store.frames_dir().join("frame_0001.png").exists());
}

#[test]
fn test_output_format_extensions_match_writers() {
    assert_eq!(OutputFormat::Transcript.extension(), "txt");
    assert_eq!(OutputFormat::Srt.extension(), "srt");
}
