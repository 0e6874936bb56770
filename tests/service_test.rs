//! End-to-end tests driving the public `DocService` API against a real
//! documentation tree on disk.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use mintsync::config::Settings;
use mintsync::report::{NullProgress, ProgressSink};
use mintsync::service::DocService;

/// A non-hidden subdirectory under the tempdir, since the project scanner
/// skips dotted directories and temp roots can be created under `/tmp/.tmpX`.
fn create_project() -> (TempDir, PathBuf, DocService) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let docs_dir = temp_dir.path().join("docs");
    fs::create_dir(&docs_dir).expect("Failed to create docs subdirectory");
    let service = DocService::new(Settings::default(), &docs_dir).expect("service setup");
    let root = service.resolver().root_dir().to_path_buf();
    (temp_dir, root, service)
}

#[test]
fn rename_updates_link_and_navigation_but_not_unrelated_import() {
    let (_temp_dir, root, service) = create_project();

    fs::create_dir(root.join("snippets")).unwrap();
    fs::write(root.join("snippets/note.mdx"), "A note.\n").unwrap();
    fs::write(root.join("setup.mdx"), "# Setup\n").unwrap();
    fs::write(
        root.join("guide.mdx"),
        concat!(
            "import Snippet from '/snippets/note.mdx'\n",
            "\n",
            "# Guide\n",
            "\n",
            "See [Setup](/setup) before you start.\n",
        ),
    )
    .unwrap();
    fs::write(
        root.join("docs.json"),
        concat!(
            "{\n",
            "  \"name\": \"Docs\",\n",
            "  \"navigation\": {\n",
            "    \"groups\": [\n",
            "      { \"group\": \"Start\", \"pages\": [\"setup\", \"guide\"] }\n",
            "    ]\n",
            "  }\n",
            "}\n",
        ),
    )
    .unwrap();

    let result = service.update_references_for_file(
        &root.join("setup.mdx"),
        &root.join("getting-started.mdx"),
        &mut NullProgress,
    );

    assert_eq!(result.links_updated, 1);
    assert_eq!(result.imports_updated, 0);
    assert_eq!(result.navigation_updated, 1);
    assert!(result.errors.is_empty());
    assert_eq!(
        result.updated_files.iter().cloned().collect::<Vec<_>>(),
        vec!["docs.json".to_string(), "guide.mdx".to_string()]
    );

    let guide = fs::read_to_string(root.join("guide.mdx")).unwrap();
    assert!(guide.contains("[Setup](/getting-started)"));
    assert!(guide.contains("import Snippet from '/snippets/note.mdx'"));

    let config: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(root.join("docs.json")).unwrap()).unwrap();
    assert_eq!(
        config["navigation"]["groups"][0]["pages"][0],
        "getting-started"
    );
    assert_eq!(config["navigation"]["groups"][0]["pages"][1], "guide");
}

#[test]
fn snippet_move_updates_imports_only() {
    let (_temp_dir, root, service) = create_project();

    fs::create_dir_all(root.join("shared")).unwrap();
    fs::write(root.join("shared/note.mdx"), "A note.\n").unwrap();
    fs::write(
        root.join("guide.mdx"),
        "import Note from '/snippets/note.mdx'\n\n# Guide\n",
    )
    .unwrap();

    let result = service.update_references_for_file(
        &root.join("snippets/note.mdx"),
        &root.join("shared/note.mdx"),
        &mut NullProgress,
    );

    assert_eq!(result.links_updated, 0);
    assert_eq!(result.imports_updated, 1);
    assert_eq!(result.navigation_updated, 0);
    let guide = fs::read_to_string(root.join("guide.mdx")).unwrap();
    assert!(guide.contains("import Note from '/shared/note.mdx'"));
}

#[test]
fn folder_rename_rewrites_links_to_every_moved_page() {
    let (_temp_dir, root, service) = create_project();

    fs::create_dir(root.join("manuals")).unwrap();
    fs::write(root.join("manuals/intro.mdx"), "# Intro\n").unwrap();
    fs::write(root.join("manuals/advanced.mdx"), "See [Intro](/guides/intro).\n").unwrap();
    fs::write(
        root.join("index.mdx"),
        "[Intro](/guides/intro)\n[Advanced](/guides/advanced)\n",
    )
    .unwrap();
    fs::write(
        root.join("docs.json"),
        "{\"navigation\": {\"pages\": [\"guides/intro\", \"guides/advanced\"]}}",
    )
    .unwrap();

    let result = service.handle_folder_rename(
        &root.join("guides"),
        &root.join("manuals"),
        &mut NullProgress,
    );

    assert_eq!(result.links_updated, 3);
    assert_eq!(result.navigation_updated, 2);

    let index = fs::read_to_string(root.join("index.mdx")).unwrap();
    assert!(index.contains("(/manuals/intro)"));
    assert!(index.contains("(/manuals/advanced)"));
    let advanced = fs::read_to_string(root.join("manuals/advanced.mdx")).unwrap();
    assert!(advanced.contains("(/manuals/intro)"));

    let config: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(root.join("docs.json")).unwrap()).unwrap();
    assert_eq!(config["navigation"]["pages"][0], "manuals/intro");
    assert_eq!(config["navigation"]["pages"][1], "manuals/advanced");
}

#[test]
fn running_the_same_update_twice_changes_nothing_further() {
    let (_temp_dir, root, service) = create_project();

    fs::write(root.join("guide.mdx"), "[Setup](/setup)\n").unwrap();

    let first = service.update_references_for_file(
        &root.join("setup.mdx"),
        &root.join("getting-started.mdx"),
        &mut NullProgress,
    );
    assert_eq!(first.links_updated, 1);

    let second = service.update_references_for_file(
        &root.join("setup.mdx"),
        &root.join("getting-started.mdx"),
        &mut NullProgress,
    );
    assert_eq!(second.links_updated, 0);
    assert!(!second.has_changes());
}

#[test]
fn progress_milestones_fire_exactly_once_each() {
    struct Recorder(Vec<(u8, String)>);
    impl ProgressSink for Recorder {
        fn report(&mut self, percent: u8, message: &str) {
            self.0.push((percent, message.to_string()));
        }
    }

    let (_temp_dir, root, service) = create_project();
    let mut recorder = Recorder(Vec::new());
    service.update_references_for_file(
        &root.join("a.mdx"),
        &root.join("b.mdx"),
        &mut recorder,
    );

    let percents: Vec<u8> = recorder.0.iter().map(|(p, _)| *p).collect();
    assert_eq!(percents, vec![10, 30, 60, 90, 100]);
    assert_eq!(recorder.0[0].1, "Updating internal links...");
    assert_eq!(recorder.0[4].1, "All updates completed");
}
