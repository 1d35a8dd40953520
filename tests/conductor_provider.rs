use std::sync::Arc;

use transcode_broker::conductor::api::{Node, OutputGroupType, PRODUCT_SERVER};
use transcode_broker::conductor::{ElementalConductorProvider, NAME, SimulatedConductor};
use transcode_broker::config::ConductorConfig;
use transcode_broker::core::{Preset, ProviderError, Status, TranscodingProvider};

fn config() -> ConductorConfig {
    ConductorConfig {
        host: "https://conductor.example.com".into(),
        user_login: "admin".into(),
        api_key: "secret-key".into(),
        auth_expires: 30,
        access_key_id: "AKIA".into(),
        secret_access_key: "s3cr3t".into(),
        destination: "s3://out/".into(),
    }
}

fn provider_with(backend: Arc<SimulatedConductor>) -> ElementalConductorProvider {
    ElementalConductorProvider::new(&config(), backend).unwrap()
}

fn presets() -> Vec<Preset> {
    vec![
        Preset::new("720p", "mp4").with_mapping(NAME, "15"),
        Preset::new("hls_1080p", ".ts").with_mapping(NAME, "16"),
    ]
}

#[tokio::test]
async fn test_transcode_submits_job() {
    let backend = Arc::new(SimulatedConductor::default());
    let provider = provider_with(backend.clone());

    let status = provider
        .transcode("s3://bucket/path/video.mov", &presets())
        .await
        .unwrap();

    assert_eq!(status.provider_name, "elementalconductor");
    assert_eq!(status.provider_job_id, "1");
    assert_eq!(status.status, Status::Queued);
    assert!(status.provider_status.is_empty());

    let submitted = backend.submitted("1").expect("job recorded");
    let job = submitted.job;
    assert_eq!(job.input.file_input.uri, "s3://bucket/path/video.mov");
    assert_eq!(job.output_group.destination.uri, "s3://out/video");
    assert_eq!(job.output_group.kind, OutputGroupType::AppleLive);
    assert_eq!(job.stream_assembly.len(), 2);
    assert_eq!(job.stream_assembly[1].name, "stream_1");
    assert_eq!(job.stream_assembly[1].preset, "16");
}

#[tokio::test]
async fn test_transcode_missing_mapping_submits_nothing() {
    let backend = Arc::new(SimulatedConductor::default());
    let provider = provider_with(backend.clone());

    let mut presets = presets();
    presets.push(Preset::new("unmapped", "mp4"));

    let err = provider.transcode("s3://in/a.mov", &presets).await.unwrap_err();

    assert!(matches!(err, ProviderError::PresetNotFound { preset } if preset == "unmapped"));
    assert_eq!(backend.job_count(), 0);
}

#[tokio::test]
async fn test_job_status_follows_backend() {
    let backend = Arc::new(SimulatedConductor::default());
    let provider = provider_with(backend.clone());

    let submitted = provider.transcode("s3://in/a.mov", &presets()).await.unwrap();
    let id = submitted.provider_job_id;

    let queued = provider.job_status(&id).await.unwrap();
    assert_eq!(queued.status, Status::Queued);
    assert_eq!(queued.provider_job_id, id);
    let mut keys: Vec<&str> = queued.provider_status.keys().map(String::as_str).collect();
    keys.sort();
    assert_eq!(keys, vec!["pct_complete", "submitted"]);

    assert!(backend.set_status(&id, "Running", 40));
    let running = provider.job_status(&id).await.unwrap();
    assert_eq!(running.status, Status::Started);
    assert_eq!(running.provider_status["pct_complete"], "40");
    assert!(running.provider_status.contains_key("start_time"));

    assert!(backend.set_status(&id, "COMPLETE", 100));
    let done = provider.job_status(&id).await.unwrap();
    assert_eq!(done.status, Status::Finished);
    assert!(done.provider_status.contains_key("complete_time"));
    assert!(!done.provider_status.contains_key("error_messages"));
}

#[tokio::test]
async fn test_job_status_error_includes_messages() {
    let backend = Arc::new(SimulatedConductor::default());
    let provider = provider_with(backend.clone());

    let id = provider
        .transcode("s3://in/a.mov", &presets())
        .await
        .unwrap()
        .provider_job_id;
    backend.set_status(&id, "error", 12);

    let failed = provider.job_status(&id).await.unwrap();
    assert_eq!(failed.status, Status::Failed);
    assert!(failed.provider_status.contains_key("errored_time"));
    assert!(failed.provider_status.contains_key("error_messages"));
}

#[tokio::test]
async fn test_job_status_unknown_job_is_transport_error() {
    let provider = provider_with(Arc::new(SimulatedConductor::default()));
    let err = provider.job_status("404").await.unwrap_err();
    assert!(matches!(err, ProviderError::Transport(_)));
}

#[tokio::test]
async fn test_healthcheck_passes_with_enough_nodes() {
    let backend = Arc::new(SimulatedConductor::with_nodes(
        vec![
            Node::new(PRODUCT_SERVER, "active"),
            Node::new(PRODUCT_SERVER, "active"),
            Node::new(PRODUCT_SERVER, "offline"),
        ],
        2,
    ));
    assert!(provider_with(backend).healthcheck().await.is_ok());
}

#[tokio::test]
async fn test_healthcheck_reports_shortage() {
    let backend = Arc::new(SimulatedConductor::with_nodes(
        vec![
            Node::new(PRODUCT_SERVER, "active"),
            Node::new("Elemental Conductor File", "active"),
        ],
        3,
    ));

    let err = provider_with(backend).healthcheck().await.unwrap_err();
    match err {
        ProviderError::Capacity { required, active } => {
            assert_eq!(required, 3);
            assert_eq!(active, 1);
        }
        other => panic!("expected Capacity error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_outage_surfaces_transport_error() {
    let backend = Arc::new(SimulatedConductor::default());
    let provider = provider_with(backend.clone());

    backend.fail_with("maintenance window");
    let err = provider.healthcheck().await.unwrap_err();
    assert!(matches!(err, ProviderError::Transport(_)));
    assert!(err.to_string().contains("maintenance window"));

    let err = provider.transcode("s3://in/a.mov", &presets()).await.unwrap_err();
    assert!(matches!(err, ProviderError::Transport(_)));

    backend.restore();
    assert!(provider.healthcheck().await.is_ok());
}

#[test]
fn test_incomplete_config_is_rejected() {
    let config = ConductorConfig {
        api_key: String::new(),
        ..config()
    };
    let result = ElementalConductorProvider::new(&config, Arc::new(SimulatedConductor::default()));
    assert!(matches!(
        result,
        Err(ProviderError::InvalidConfig { missing }) if missing == vec!["ELEMENTALCONDUCTOR_API_KEY"]
    ));
}
