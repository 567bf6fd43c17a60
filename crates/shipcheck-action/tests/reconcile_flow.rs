//! End-to-end verification flow as driven by a reconcile loop

use std::sync::Arc;

use shipcheck_action::{
    Configuration, MockStorageDriver, ReleaseObject, Settings, Verdict, VerifyError, is_installed,
    last_release, release_target_changed, verify_last_storage_item, verify_release,
    verify_snapshot,
};
use shipcheck_core::{Algorithm, ChartMetadata, Release, Values, shorten_name};

fn chart(version: &str) -> ChartMetadata {
    ChartMetadata::parse("app-chart", version).unwrap()
}

fn values() -> Values {
    Values::from_yaml("replicas: 2\nimage:\n  repository: nginx\n  tag: \"1.27\"\n").unwrap()
}

/// Install a release the way a controller would and record its snapshot
fn install(driver: &MockStorageDriver, config: &Configuration, object: &mut ReleaseObject) {
    let mut release = Release::for_install(
        shorten_name(&object.release_name()),
        object.release_namespace().to_string(),
        chart("1.0.0"),
        values(),
        "apiVersion: apps/v1\nkind: Deployment\n".to_string(),
    );
    release.mark_deployed();
    driver.put(&config.storage_namespace, release.clone());

    let snapshot = config.snapshot(&release, &values()).unwrap();
    object.status.storage_namespace = Some(config.storage_namespace.clone());
    object.status.history.push(snapshot);
}

fn setup() -> (MockStorageDriver, Configuration, ReleaseObject) {
    let driver = MockStorageDriver::new();
    let object = ReleaseObject::new("app", "default");
    let config = Configuration::new(Arc::new(driver.clone()), object.storage_namespace());
    (driver, config, object)
}

#[tokio::test]
async fn test_fresh_object_is_not_installed() {
    let (_, config, object) = setup();

    assert!(!release_target_changed(&object, "app-chart"));
    assert!(!is_installed(&config, &object.release_name()).await.unwrap());

    let err = verify_snapshot(&config, object.current()).await.unwrap_err();
    assert_eq!(err.verdict(), Some(Verdict::NotFound));
}

#[tokio::test]
async fn test_unchanged_release_is_consistent() {
    let (driver, config, mut object) = setup();
    install(&driver, &config, &mut object);
    driver.reset_counts();

    assert!(!release_target_changed(&object, "app-chart"));
    assert!(is_installed(&config, &object.release_name()).await.unwrap());

    let release = verify_snapshot(&config, object.current()).await.unwrap();
    verify_release(
        Some(&release),
        object.current(),
        Some(&chart("1.0.0")),
        &values(),
    )
    .unwrap();

    let latest = verify_last_storage_item(&config, object.current())
        .await
        .unwrap();
    assert_eq!(latest, release);
    assert_eq!(driver.operation_counts().reads(), 3);
}

#[tokio::test]
async fn test_chart_upgrade_is_drift() {
    let (driver, config, mut object) = setup();
    install(&driver, &config, &mut object);

    let release = verify_snapshot(&config, object.current()).await.unwrap();
    let err = verify_release(
        Some(&release),
        object.current(),
        Some(&chart("1.1.0")),
        &values(),
    )
    .unwrap_err();

    assert_eq!(err.verdict(), Some(Verdict::ChartChanged));
    assert!(err.is_drift());
}

#[tokio::test]
async fn test_values_change_is_drift() {
    let (driver, config, mut object) = setup();
    install(&driver, &config, &mut object);

    let mut changed = values();
    changed.set("replicas", 4.into()).unwrap();

    let release = last_release(&config, &object.release_name()).await.unwrap();
    let err = verify_release(Some(&release), object.current(), Some(&chart("1.0.0")), &changed)
        .unwrap_err();
    assert_eq!(err.verdict(), Some(Verdict::ConfigChanged));
}

#[tokio::test]
async fn test_out_of_band_rollback_is_unobserved() {
    let (driver, config, mut object) = setup();
    install(&driver, &config, &mut object);

    let mut replaced = last_release(&config, &object.release_name()).await.unwrap();
    replaced.config = Values::from_yaml("replicas: 1\n").unwrap();
    driver.put(&config.storage_namespace, replaced);

    let err = verify_snapshot(&config, object.current()).await.unwrap_err();
    assert!(matches!(err, VerifyError::ReleaseNotObserved { .. }));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_uninstalled_out_of_band_disappears() {
    let (driver, config, mut object) = setup();
    install(&driver, &config, &mut object);

    let current = object.current().unwrap();
    driver.remove(&config.storage_namespace, &current.name, current.version);

    let err = verify_snapshot(&config, object.current()).await.unwrap_err();
    assert_eq!(err.verdict(), Some(Verdict::Disappeared));
    assert!(!is_installed(&config, &object.release_name()).await.unwrap());
}

#[tokio::test]
async fn test_storage_outage_is_transient() {
    let (driver, config, mut object) = setup();
    install(&driver, &config, &mut object);
    driver.fail_reads("the server is currently unable to handle the request");

    let err = verify_snapshot(&config, object.current()).await.unwrap_err();
    assert!(err.is_transient());
    assert_eq!(err.verdict(), None);
    assert!(is_installed(&config, &object.release_name()).await.is_err());
}

#[tokio::test]
async fn test_moved_target_namespace_triggers_cleanup() {
    let (driver, config, mut object) = setup();
    install(&driver, &config, &mut object);

    object.spec.target_namespace = Some("apps".to_string());
    assert!(release_target_changed(&object, "app-chart"));
}

#[tokio::test]
async fn test_target_namespace_apart_from_storage_namespace() {
    let driver = MockStorageDriver::new();
    let mut object = ReleaseObject::new("app", "flux-system");
    object.spec.target_namespace = Some("apps".to_string());
    let config = Configuration::new(Arc::new(driver.clone()), object.storage_namespace());

    install(&driver, &config, &mut object);

    assert_eq!(config.storage_namespace, "flux-system");
    assert_eq!(object.release_namespace(), "apps");
    assert!(!release_target_changed(&object, "app-chart"));
    assert!(is_installed(&config, &object.release_name()).await.unwrap());

    let release = verify_snapshot(&config, object.current()).await.unwrap();
    assert_eq!(release.name, "apps-app");
    assert_eq!(release.namespace, "apps");
    verify_release(
        Some(&release),
        object.current(),
        Some(&chart("1.0.0")),
        &values(),
    )
    .unwrap();

    let latest = verify_last_storage_item(&config, object.current())
        .await
        .unwrap();
    assert_eq!(latest, release);

    let elsewhere = Configuration::new(Arc::new(driver.clone()), "apps");
    assert!(!is_installed(&elsewhere, &object.release_name()).await.unwrap());
}

#[tokio::test]
async fn test_long_release_name_round_trips() {
    let driver = MockStorageDriver::new();
    let mut object = ReleaseObject::new("a-very-long-release-object-name-for-testing", "default");
    object.spec.target_namespace = Some("a-long-target-namespace-name".to_string());
    let config = Configuration::new(Arc::new(driver.clone()), object.storage_namespace());

    install(&driver, &config, &mut object);

    assert!(object.release_name().len() > shipcheck_core::MAX_RELEASE_NAME_LENGTH);
    assert!(!release_target_changed(&object, "app-chart"));
    assert!(is_installed(&config, &object.release_name()).await.unwrap());
    assert!(verify_snapshot(&config, object.current()).await.is_ok());
}

#[tokio::test]
async fn test_sha512_snapshots() {
    let driver = MockStorageDriver::new();
    let mut object = ReleaseObject::new("app", "default");
    let config = Configuration::new(Arc::new(driver.clone()), "default").with_settings(
        Settings::from_yaml("digestAlgorithm: sha512\n").unwrap(),
    );

    install(&driver, &config, &mut object);

    let snapshot = object.current().unwrap();
    assert!(snapshot.digest.starts_with("sha512:"));
    assert!(snapshot.config_digest.starts_with("sha512:"));
    assert_eq!(config.settings.digest_algorithm, Algorithm::Sha512);

    let release = verify_snapshot(&config, object.current()).await.unwrap();
    verify_release(Some(&release), object.current(), None, &values()).unwrap();
}
