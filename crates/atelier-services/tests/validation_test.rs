mod helpers;

use atelier_core::models::{
    CreateEditedImageRequest, CreateGeneratedVideoRequest, CreateLineageRequest,
    CreateMediaAssetRequest, CreateProjectRequest,
};
use atelier_core::AppError;
use atelier_services::MediaUpload;
use helpers::TestEnv;
use uuid::Uuid;

const BLANKS: [&str; 3] = ["", "   ", "\t\n"];

fn edited_image(project_id: &str, user_id: &str) -> CreateEditedImageRequest {
    CreateEditedImageRequest {
        project_id: project_id.to_string(),
        user_id: user_id.to_string(),
        lineage_id: None,
        parent_id: None,
        source_asset_id: None,
        prompt: "add snow".to_string(),
        context: None,
        ai_model: "test-model".to_string(),
        storage_path: "u/p/edit.png".to_string(),
        width: None,
        height: None,
        version: None,
    }
}

fn generated_video(project_id: &str, user_id: &str) -> CreateGeneratedVideoRequest {
    CreateGeneratedVideoRequest {
        project_id: project_id.to_string(),
        user_id: user_id.to_string(),
        lineage_id: None,
        name: None,
        prompt: "pan left".to_string(),
        model: "test-video".to_string(),
        generation_params: None,
        storage_path: None,
        status: None,
    }
}

fn assert_required(err: AppError, field: &str) {
    match err {
        AppError::InvalidInput(message) => assert_eq!(message, format!("{} is required", field)),
        other => panic!("expected InvalidInput for {}, got {:?}", field, other),
    }
}

#[tokio::test]
async fn test_edited_image_blank_ids_fail_before_any_call() {
    let env = TestEnv::new();
    let id = Uuid::new_v4().to_string();

    for blank in BLANKS {
        let err = env
            .services
            .edited_images
            .create(edited_image(blank, &id))
            .await
            .unwrap_err();
        assert_required(err, "project_id");

        let err = env
            .services
            .edited_images
            .create(edited_image(&id, blank))
            .await
            .unwrap_err();
        assert_required(err, "user_id");
    }

    assert!(env.log.is_empty(), "unexpected calls: {:?}", env.log.entries());
}

#[tokio::test]
async fn test_generated_video_blank_ids_fail_before_any_call() {
    let env = TestEnv::new();
    let id = Uuid::new_v4().to_string();

    for blank in BLANKS {
        let err = env
            .services
            .generated_videos
            .create(generated_video(blank, &id))
            .await
            .unwrap_err();
        assert_required(err, "project_id");

        let err = env
            .services
            .generated_videos
            .create(generated_video(&id, blank))
            .await
            .unwrap_err();
        assert_required(err, "user_id");
    }

    assert!(env.log.is_empty(), "unexpected calls: {:?}", env.log.entries());
}

#[tokio::test]
async fn test_other_creates_reject_blank_ids() {
    let env = TestEnv::new();
    let id = Uuid::new_v4().to_string();

    let err = env
        .services
        .projects
        .create(CreateProjectRequest {
            user_id: " ".to_string(),
            name: "Trip".to_string(),
            description: None,
            thumbnail_url: None,
        })
        .await
        .unwrap_err();
    assert!(err.is_validation());

    let err = env
        .services
        .media_assets
        .create(CreateMediaAssetRequest {
            project_id: id.clone(),
            user_id: "".to_string(),
            lineage_id: None,
            file_name: "a.png".to_string(),
            file_type: "image/png".to_string(),
            file_size: 10,
            width: None,
            height: None,
            storage_path: "u/p/a.png".to_string(),
            sort_order: None,
        })
        .await
        .unwrap_err();
    assert!(err.is_validation());

    let err = env
        .services
        .lineages
        .create(CreateLineageRequest {
            project_id: "  ".to_string(),
            user_id: id.clone(),
            root_media_asset_id: id.clone(),
            name: None,
            metadata: None,
        })
        .await
        .unwrap_err();
    assert!(err.is_validation());

    let err = env
        .services
        .media_assets
        .upload(MediaUpload {
            project_id: "".to_string(),
            user_id: id,
            lineage_id: None,
            file_name: "a.png".to_string(),
            content_type: "image/png".to_string(),
            data: vec![1, 2, 3],
            width: None,
            height: None,
        })
        .await
        .unwrap_err();
    assert_required(err, "project_id");

    assert!(env.log.is_empty(), "unexpected calls: {:?}", env.log.entries());
}
