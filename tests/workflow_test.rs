//! End-to-end runs of the demo workflows against in-memory fakes.

mod common;

use common::{FakeModel, MemoryBucket};
use dial_multimodal::{
    models::{
        Attachment, CompletionResponse, ContentPart, CustomContent, ImageSource, MessageContent,
    },
    workflow::{
        attachment_vision::{self, AttachmentVisionOptions},
        image_to_text::{self, ImageToTextOptions, ELEPHANT_URL},
        text_to_image::{self, TextToImageOptions, DALL_E_DEPLOYMENT, GOOGLE_IMAGE_DEPLOYMENT},
        StepStatus,
    },
    DialError,
};
use serde_json::json;

fn write_image(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("dialx-banner.png");
    std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();
    path
}

fn image_urls(content: &MessageContent) -> Vec<String> {
    match content {
        MessageContent::Parts(parts) => parts
            .iter()
            .filter_map(|part| match part {
                ContentPart::ImageUrl { image_url } => Some(image_url.url.clone()),
                ContentPart::Text { .. } => None,
            })
            .collect(),
        MessageContent::Text(_) => Vec::new(),
    }
}

#[tokio::test]
async fn image_to_text_sends_inline_then_remote_image() {
    let dir = tempfile::tempdir().unwrap();
    let options = ImageToTextOptions::builder()
        .image_path(write_image(dir.path()))
        .build();
    let model = FakeModel::new();

    let report = image_to_text::run(&model, &options).await;

    assert!(report.is_success(), "{}", report);
    let calls = model.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls.iter().all(|c| c.deployment == "gpt-4o"));

    let inline = image_urls(&calls[0].messages[0].content);
    let image = dial_multimodal::models::ImageUrl {
        url: inline[0].clone(),
        detail: None,
    };
    match image.source().unwrap() {
        ImageSource::Inline { mime_type, data } => {
            assert_eq!(mime_type, "image/png");
            assert_eq!(data, vec![0x89, b'P', b'N', b'G']);
        }
        other => panic!("expected inline image, got {:?}", other),
    }
    assert_eq!(image_urls(&calls[1].messages[0].content), vec![ELEPHANT_URL]);
}

#[tokio::test]
async fn image_to_text_missing_file_only_fails_that_step() {
    let options = ImageToTextOptions::builder()
        .image_path("/definitely/not/here.png")
        .build();
    let model = FakeModel::new();

    let report = image_to_text::run(&model, &options).await;

    assert!(matches!(
        report.step("base64-image").unwrap().status,
        StepStatus::Failed(DialError::Io(_))
    ));
    assert!(report.step("url-image").unwrap().is_success());
    assert_eq!(model.calls().len(), 1);
}

#[tokio::test]
async fn comparison_continues_after_one_model_fails() {
    let dir = tempfile::tempdir().unwrap();
    let options = AttachmentVisionOptions::builder()
        .image_path(write_image(dir.path()))
        .build();
    let model = FakeModel::new().fail("claude-3-5-sonnet-20241022", "model overloaded");
    let bucket = MemoryBucket::new();

    let report = attachment_vision::run(&model, &bucket, &options).await;

    assert!(report.step("upload").unwrap().is_success());
    assert!(report.step("analyze").unwrap().is_success());
    assert!(report.step("compare:gpt-4o-mini").unwrap().is_success());
    assert!(matches!(
        report.step("compare:claude-3-5-sonnet-20241022").unwrap().status,
        StepStatus::Failed(DialError::CompletionFailed(_))
    ));
    match &report.step("compare:gemini-1.5-pro-002").unwrap().status {
        StepStatus::Succeeded(answer) => assert_eq!(answer, "gemini-1.5-pro-002 says hello"),
        other => panic!("expected success, got {:?}", other),
    }
    assert!(report.step("multi-attachment").unwrap().is_success());

    let calls = model.calls();
    let deployments: Vec<&str> = calls.iter().map(|c| c.deployment.as_str()).collect();
    assert_eq!(
        deployments,
        vec![
            "gpt-4o",
            "gpt-4o-mini",
            "claude-3-5-sonnet-20241022",
            "gemini-1.5-pro-002",
            "gpt-4o"
        ]
    );

    let first = &calls[0].messages[0];
    assert_eq!(first.attachments().len(), 1);
    assert_eq!(first.attachments()[0].title.as_deref(), Some("dialx-banner.png"));
    assert_eq!(first.attachments()[0].mime_type.as_deref(), Some("image/png"));
    assert!(first.attachments()[0].resolved_url().is_some());
    assert_eq!(calls[4].messages[0].attachments().len(), 2);
    assert_eq!(bucket.file_count(), 2);
    assert_eq!(bucket.opened(), bucket.closed());
}

#[tokio::test]
async fn failed_upload_skips_dependent_steps() {
    let dir = tempfile::tempdir().unwrap();
    let options = AttachmentVisionOptions::builder()
        .image_path(write_image(dir.path()))
        .compare_models(vec!["gpt-4o-mini".to_string()])
        .build();
    let model = FakeModel::new();
    let bucket = MemoryBucket::new();
    bucket.omit_url();

    let report = attachment_vision::run(&model, &bucket, &options).await;

    assert!(matches!(
        report.step("upload").unwrap().status,
        StepStatus::Failed(DialError::UploadFailed(_))
    ));
    for step in ["analyze", "compare:gpt-4o-mini", "multi-attachment"] {
        assert!(matches!(
            report.step(step).unwrap().status,
            StepStatus::Skipped(_)
        ));
    }
    assert!(model.calls().is_empty());
}

#[tokio::test]
async fn text_to_image_passes_provider_fields_and_saves_images() {
    let bucket = MemoryBucket::new();
    bucket.insert("files/b/bali.png", b"bali");
    let generated = CompletionResponse {
        content: "![image](files/b/bali.png)".into(),
        custom_content: Some(CustomContent::with_attachments(vec![
            Attachment {
                title: Some("Image".into()),
                url: Some("files/b/bali.png".into()),
                mime_type: Some("image/png".into()),
            },
            Attachment {
                title: None,
                url: None,
                mime_type: Some("image/jpeg".into()),
            },
        ])),
    };
    let model = FakeModel::new()
        .reply(DALL_E_DEPLOYMENT, generated)
        .fail(GOOGLE_IMAGE_DEPLOYMENT, "unsupported field: guidanceScale");
    let dir = tempfile::tempdir().unwrap();
    let options = TextToImageOptions::builder()
        .output_dir(dir.path().join("generated_images"))
        .build();

    let report = text_to_image::run(&model, &bucket, &options).await;

    let names: Vec<&str> = report.steps.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "generate",
            "generate-configured",
            "generate-google",
            "style:natural",
            "style:vivid"
        ]
    );
    assert_eq!(report.succeeded().count(), 4);
    assert!(matches!(
        report.step("generate-google").unwrap().status,
        StepStatus::Failed(DialError::CompletionFailed(_))
    ));

    let calls = model.calls();
    assert!(calls[0].custom_fields.is_none());
    assert_eq!(
        serde_json::to_value(calls[1].custom_fields.as_ref().unwrap()).unwrap(),
        json!({"size": "1792x1024", "style": "vivid", "quality": "hd", "n": 1})
    );
    assert_eq!(
        serde_json::to_value(calls[2].custom_fields.as_ref().unwrap()).unwrap(),
        json!({"aspectRatio": "16:9", "seed": 42, "guidanceScale": 7.5})
    );
    assert_eq!(
        serde_json::to_value(calls[3].custom_fields.as_ref().unwrap()).unwrap(),
        json!({"size": "1024x1024", "style": "natural", "quality": "hd"})
    );

    let saved = std::fs::read_dir(dir.path().join("generated_images"))
        .unwrap()
        .count();
    // four successful generations, one saved image each
    assert_eq!(saved, 4);
    match &report.step("generate").unwrap().status {
        StepStatus::Succeeded(summary) => {
            assert_eq!(summary, "saved 1 of 2 image(s), 1 skipped, 0 failed")
        }
        other => panic!("expected success, got {:?}", other),
    }
}

#[tokio::test]
async fn text_to_image_without_attachments_still_succeeds() {
    let model = FakeModel::new();
    let bucket = MemoryBucket::new();
    let dir = tempfile::tempdir().unwrap();
    let options = TextToImageOptions::builder()
        .output_dir(dir.path().to_path_buf())
        .build();

    let report = text_to_image::run(&model, &bucket, &options).await;

    assert!(report.is_success(), "{}", report);
    assert_eq!(bucket.opened(), 0);
}
