//! Publishing migration stubs into a project directory on disk.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use tenantry::publish::{LocalFilesystem, Publisher};
use tenantry::{TenancyBootstrap, TenancyConfig};
use tempfile::TempDir;

fn write_stub(dir: &Path, name: &str) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join(name), format!("-- {}\n", name)).unwrap();
}

fn listing(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn bootstrap(bundle: &Path, project: &Path) -> TenancyBootstrap {
    TenancyBootstrap::new(TenancyConfig::default())
        .with_bundle_root(bundle)
        .with_config_source(bundle.join("config/tenants.toml"))
        .with_project_root(project)
        .with_filesystem(Arc::new(LocalFilesystem))
}

#[test]
fn test_republish_keeps_existing_names() {
    let bundle = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    let stubs = bundle.path().join("database/migrations");
    write_stub(&stubs, "2021_01_01_000000_create_widgets_table.sql");
    write_stub(&stubs, "2021_01_01_000001_create_gadgets_table.sql");

    // An earlier release already published widgets.
    let target = project.path().join("database/migrations/tenantry/tenants");
    write_stub(&target, "2019_05_02_101112_create_widgets_table.sql");

    let bootstrap = bootstrap(bundle.path(), project.path());
    let plan = bootstrap.plan().unwrap();

    assert_eq!(
        plan.destination_of(&stubs.join("2021_01_01_000000_create_widgets_table.sql")),
        Some(target.join("2019_05_02_101112_create_widgets_table.sql").as_path())
    );
    let gadgets = plan
        .destination_of(&stubs.join("2021_01_01_000001_create_gadgets_table.sql"))
        .unwrap();
    assert!(gadgets.to_string_lossy().ends_with("_create_gadgets_table.sql"));
    assert!(!gadgets.ends_with("2021_01_01_000001_create_gadgets_table.sql"));

    let registry = bootstrap.publishes_with(plan).unwrap();
    let report = Publisher::new(bootstrap.filesystem())
        .publish_all(&registry)
        .unwrap();
    assert_eq!(report.copied.len(), 1);
    assert_eq!(report.skipped.len(), 1);

    let published = listing(&target);
    assert_eq!(published.len(), 2);

    // A second run plans every stub onto what is now on disk.
    let again = bootstrap.plan().unwrap();
    assert_eq!(again.matched().count(), 2);
    let report = Publisher::new(bootstrap.filesystem())
        .publish_all(&bootstrap.publishes_with(again).unwrap())
        .unwrap();
    assert!(report.copied.is_empty());
    assert_eq!(listing(&target), published);
}

#[test]
fn test_missing_stub_directory_publishes_nothing() {
    let bundle = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();

    let bootstrap = bootstrap(bundle.path(), project.path());
    assert!(bootstrap.plan().unwrap().is_empty());

    let registry = bootstrap.publishes().unwrap();
    let report = Publisher::new(bootstrap.filesystem())
        .publish_all(&registry)
        .unwrap();
    assert!(report.copied.is_empty());
    assert!(!project.path().join("database").exists());
}

#[test]
fn test_config_is_published_next_to_migrations() {
    let bundle = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    fs::create_dir_all(bundle.path().join("config")).unwrap();
    fs::write(bundle.path().join("config/tenants.toml"), "resolver = \"domain\"\n").unwrap();
    write_stub(
        &bundle.path().join("database/migrations"),
        "2020_01_01_000001_create_tenants_table.sql",
    );

    let bootstrap = bootstrap(bundle.path(), project.path());
    let registry = bootstrap.publishes().unwrap();
    let report = Publisher::new(bootstrap.filesystem())
        .publish_tag(&registry, &bootstrap.config_tag())
        .unwrap();

    assert_eq!(report.copied, [project.path().join("config/tenantry.tenants.toml")]);
    assert_eq!(
        fs::read_to_string(project.path().join("config/tenantry.tenants.toml")).unwrap(),
        "resolver = \"domain\"\n"
    );
    assert!(!project.path().join("database").exists());
}
