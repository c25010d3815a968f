//! Integration tests for configuration layering

use super::test_utils::{with_env, TestSite};
use ctos::config::ConfigLoader;
use std::path::PathBuf;

#[test]
fn test_defaults_without_files() {
    let site = TestSite::new();
    let config = with_env(&[("XDG_CONFIG_HOME", site.root().to_str().unwrap())], || {
        ConfigLoader::load(site.root()).unwrap()
    });

    assert_eq!(config.build.content_dir, PathBuf::from("content"));
    assert_eq!(config.build.output_dir, PathBuf::from("public"));
    assert_eq!(config.build.manifest_name, "init.json");
    assert_eq!(config.counter.window_secs, 86_400);
    assert_eq!(config.server.listen_addr, "127.0.0.1:8787");
    assert!(config.validate().is_ok());
}

#[test]
fn test_site_file_overrides_defaults() {
    let site = TestSite::new();
    std::fs::write(
        site.root().join("ctos.toml"),
        r#"
[build]
output_dir = "dist"
asset_extensions = [".jpg", ".png", ".gif"]

[counter]
window_secs = 3600
"#,
    )
    .unwrap();

    let config = with_env(&[("XDG_CONFIG_HOME", site.root().to_str().unwrap())], || {
        ConfigLoader::load(site.root()).unwrap()
    });

    assert_eq!(config.build.output_dir, PathBuf::from("dist"));
    assert_eq!(config.build.content_dir, PathBuf::from("content"));
    assert!(config.build.asset_extensions.contains(&".gif".to_string()));
    assert_eq!(config.counter.window_secs, 3600);
}

#[test]
fn test_environment_file_layers_over_site_file() {
    let site = TestSite::new();
    std::fs::write(site.root().join("ctos.toml"), "[build]\noutput_dir = \"dist\"\n").unwrap();
    std::fs::create_dir_all(site.root().join("config")).unwrap();
    std::fs::write(
        site.root().join("config/production.toml"),
        "[build]\noutput_dir = \"release\"\n",
    )
    .unwrap();

    let config = with_env(
        &[
            ("XDG_CONFIG_HOME", site.root().to_str().unwrap()),
            ("CTOS_ENV", "production"),
        ],
        || ConfigLoader::load(site.root()).unwrap(),
    );

    assert_eq!(config.build.output_dir, PathBuf::from("release"));
}

#[test]
fn test_env_var_overrides_files() {
    let site = TestSite::new();
    std::fs::write(site.root().join("ctos.toml"), "[build]\noutput_dir = \"dist\"\n").unwrap();

    let config = with_env(
        &[
            ("XDG_CONFIG_HOME", site.root().to_str().unwrap()),
            ("CTOS_BUILD__OUTPUT_DIR", "from-env"),
        ],
        || ConfigLoader::load(site.root()).unwrap(),
    );

    assert_eq!(config.build.output_dir, PathBuf::from("from-env"));
}

#[test]
fn test_global_file_is_lowest_file_layer() {
    let site = TestSite::new();
    let xdg = site.root().join("xdg");
    std::fs::create_dir_all(xdg.join("ctos")).unwrap();
    std::fs::write(
        xdg.join("ctos/config.toml"),
        "[server]\nlisten_addr = \"0.0.0.0:9000\"\n[build]\noutput_dir = \"global\"\n",
    )
    .unwrap();
    std::fs::write(site.root().join("ctos.toml"), "[build]\noutput_dir = \"site\"\n").unwrap();

    let config = with_env(&[("XDG_CONFIG_HOME", xdg.to_str().unwrap())], || {
        ConfigLoader::load(site.root()).unwrap()
    });

    assert_eq!(config.server.listen_addr, "0.0.0.0:9000");
    assert_eq!(config.build.output_dir, PathBuf::from("site"));
}

#[test]
fn test_invalid_values_fail_validation() {
    let site = TestSite::new();
    let file = site.root().join("bad.toml");
    std::fs::write(
        &file,
        "[build]\ndocument_extensions = [\"md\"]\n[counter]\nwindow_secs = 0\n",
    )
    .unwrap();

    let config = ConfigLoader::load_from_file(&file).unwrap();
    let errors = config.validate().unwrap_err();
    assert_eq!(errors.len(), 2);
}
