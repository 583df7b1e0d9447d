//! Custom test assertions for integration tests

use image_converter::{EntryId, Event, ImageConverter};
use std::io::{Cursor, Read};
use std::path::Path;
use std::time::Duration;

/// Wait for a specific event on an existing subscription
pub async fn wait_for_event<F>(
    events: &mut tokio::sync::broadcast::Receiver<Event>,
    timeout: Duration,
    predicate: F,
) -> Option<Event>
where
    F: Fn(&Event) -> bool,
{
    let result = tokio::time::timeout(timeout, async {
        loop {
            match events.recv().await {
                Ok(event) if predicate(&event) => {
                    return Some(event);
                }
                Ok(_) => continue,
                Err(_) => return None,
            }
        }
    })
    .await;

    result.ok().flatten()
}

/// Read every entry of a ZIP archive as (name, content)
pub fn read_archive(bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("valid zip archive");
    let mut files = Vec::new();
    for i in 0..archive.len() {
        let mut file = archive.by_index(i).expect("readable zip entry");
        let mut content = Vec::new();
        file.read_to_end(&mut content).expect("readable zip content");
        files.push((file.name().to_string(), content));
    }
    files
}

/// Assert that a byte blob decodes as an image of the given size
pub fn assert_image_dimensions(bytes: &[u8], width: u32, height: u32) {
    let img = image::load_from_memory(bytes).expect("output decodes");
    assert_eq!(
        (img.width(), img.height()),
        (width, height),
        "unexpected output dimensions"
    );
}

/// Assert that files exist in a directory
pub fn assert_files_exist(dir: &Path, expected_files: &[&str]) {
    for filename in expected_files {
        let path = dir.join(filename);
        assert!(
            path.exists(),
            "Expected file '{}' to exist in {:?}",
            filename,
            dir
        );
    }
}

/// Assert that an entry is gone together with its output
pub async fn assert_entry_gone(converter: &ImageConverter, id: EntryId) {
    assert!(converter.entry_status(id).await.is_none(), "entry {id} still active");
    assert!(converter.converted(id).await.is_none(), "entry {id} still has an output");
    assert!(!converter.active_ids().await.contains(&id));
}
