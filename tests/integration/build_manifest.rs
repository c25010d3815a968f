//! End-to-end build tests: output tree and manifest shape

use super::test_utils::TestSite;
use ctos::build::SiteBuilder;
use serde_json::Value;
use std::fs;

fn read_manifest(site: &TestSite) -> Value {
    let text = fs::read_to_string(site.output("init.json")).unwrap();
    serde_json::from_str(&text).unwrap()
}

#[tokio::test]
async fn test_markdown_document_with_link() {
    let site = TestSite::new();
    site.content_file("Apps/Notes.md", "<!-- link: notes -->\n# Notes\n\nSome *text*.\n");

    SiteBuilder::new(site.build_config()).run().await.unwrap();

    let manifest = read_manifest(&site);
    let notes = &manifest["fs"]["Apps"]["contents"]["Notes"];
    assert_eq!(notes["type"], "html");
    assert_eq!(notes["path"], "/Apps/Notes.html");
    assert_eq!(notes["name"], "Notes");
    assert_eq!(notes["icon"], "text");
    assert_eq!(notes["style"], "large");
    assert_eq!(notes["link"], "notes");
    assert_eq!(manifest["link"], serde_json::json!(["/Apps/Notes"]));
    assert_eq!(manifest["startup"], serde_json::json!([]));

    let folder = &manifest["fs"]["Apps"];
    assert_eq!(folder["type"], "folder");
    assert_eq!(folder["path"], "/Apps");
    assert_eq!(folder["icon"], "folder");
    assert_eq!(folder["style"], "medium");

    let html = fs::read_to_string(site.output("Apps/Notes.html")).unwrap();
    assert!(html.contains("<h1>Notes</h1>"));
    assert!(html.contains("<em>text</em>"));
    assert!(!site.output("Apps/Notes.md").exists());
}

#[tokio::test]
async fn test_standalone_app_copied_verbatim_and_not_enumerated() {
    let site = TestSite::new();
    site.content_file(
        "Games/Snake/index.html",
        "<!-- name: Snake Game -->\n<!-- icon: snake -->\n<canvas></canvas>\n",
    );
    site.content_file("Games/Snake/game.js", "loop();");
    site.content_file("Games/Snake/levels/one.md", "# never rendered");

    SiteBuilder::new(site.build_config()).run().await.unwrap();

    let manifest = read_manifest(&site);
    let snake = &manifest["fs"]["Games"]["contents"]["Snake"];
    assert_eq!(snake["type"], "iframe");
    assert_eq!(snake["path"], "/Games/Snake");
    assert_eq!(snake["name"], "Snake Game");
    assert_eq!(snake["icon"], "snake");
    assert_eq!(snake["style"], "large");
    assert!(snake.get("contents").is_none());

    for file in ["index.html", "game.js", "levels/one.md"] {
        let source = fs::read(site.root().join("content/Games/Snake").join(file)).unwrap();
        let copied = fs::read(site.output("Games/Snake").join(file)).unwrap();
        assert_eq!(source, copied, "{} must be byte-identical", file);
    }
    assert!(!site.output("Games/Snake/levels/one.html").exists());
}

#[tokio::test]
async fn test_folder_metadata_and_startup_order() {
    let site = TestSite::new();
    site.content_file("Docs/metadata", "icon: books\nstartup: 2\n");
    site.content_file("Welcome.html", "<!-- startup: 1 -->\n<p>hello</p>\n");
    site.content_file("Docs/Guide.md", "<!-- tags: a, b, c -->\n");

    SiteBuilder::new(site.build_config()).run().await.unwrap();

    let manifest = read_manifest(&site);
    assert_eq!(manifest["fs"]["Docs"]["icon"], "books");
    assert_eq!(
        manifest["fs"]["Docs"]["contents"]["Guide"]["tags"],
        serde_json::json!(["a", "b", "c"])
    );
    assert_eq!(
        manifest["startup"],
        serde_json::json!(["/Welcome", "/Docs"])
    );
    assert_eq!(
        fs::read_to_string(site.output("Welcome.html")).unwrap(),
        "<!-- startup: 1 -->\n<p>hello</p>\n"
    );
}

#[tokio::test]
async fn test_shell_and_assets_copied() {
    let site = TestSite::new();
    site.content_file("Pictures/cat.png", "png-bytes");
    site.content_file("notes.txt", "ignored");

    let report = SiteBuilder::new(site.build_config()).run().await.unwrap();

    assert_eq!(
        fs::read_to_string(site.output("index.html")).unwrap(),
        "<html>shell</html>"
    );
    assert!(site.output("ctos/desktop.js").exists());
    assert!(site.output("favicon.png").exists());
    assert_eq!(
        fs::read_to_string(site.output("Pictures/cat.png")).unwrap(),
        "png-bytes"
    );
    assert!(!site.output("notes.txt").exists());

    let manifest = read_manifest(&site);
    assert_eq!(
        manifest["fs"]["Pictures"]["contents"],
        serde_json::json!({}),
        "assets get no manifest node"
    );
    assert_eq!(report.assets, 1);
    assert_eq!(report.skipped, 1);
}

#[tokio::test]
async fn test_previous_output_is_cleared() {
    let site = TestSite::new();
    fs::create_dir_all(site.output("stale")).unwrap();
    fs::write(site.output("stale/old.html"), "old").unwrap();

    SiteBuilder::new(site.build_config()).run().await.unwrap();

    assert!(!site.output("stale").exists());
    assert!(site.output("init.json").exists());
}

#[tokio::test]
async fn test_missing_shell_aborts_build() {
    let site = TestSite::new();
    fs::remove_dir_all(site.root().join("ctos")).unwrap();

    let result = SiteBuilder::new(site.build_config()).run().await;
    assert!(result.is_err());
    assert!(!site.output("init.json").exists());
}

#[tokio::test]
async fn test_empty_content_root() {
    let site = TestSite::new();

    SiteBuilder::new(site.build_config()).run().await.unwrap();

    assert_eq!(
        read_manifest(&site),
        serde_json::json!({ "fs": {}, "link": [], "startup": [] })
    );
}

#[cfg(unix)]
#[tokio::test]
async fn test_symlink_inside_app_survives_copy() {
    let site = TestSite::new();
    site.content_file("Game/index.html", "<canvas></canvas>\n");
    site.content_file("Game/real.js", "loop();");
    std::os::unix::fs::symlink("real.js", site.root().join("content/Game/alias.js")).unwrap();

    SiteBuilder::new(site.build_config()).run().await.unwrap();

    let alias = site.output("Game/alias.js");
    assert!(fs::symlink_metadata(&alias).unwrap().file_type().is_symlink());
    assert_eq!(fs::read_to_string(&alias).unwrap(), "loop();");
}

#[tokio::test]
async fn test_latin1_document_does_not_abort_build() {
    let site = TestSite::new();
    fs::write(site.root().join("content/Menu.html"), b"<p>caf\xe9</p>\n").unwrap();

    SiteBuilder::new(site.build_config()).run().await.unwrap();

    let manifest = read_manifest(&site);
    assert_eq!(manifest["fs"]["Menu"]["type"], "html");
    assert_eq!(fs::read(site.output("Menu.html")).unwrap(), b"<p>caf\xe9</p>\n");
}
