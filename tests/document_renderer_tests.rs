use std::io::Write;

use roview::pdf::{DocumentRenderer, OpenError, PageSource, RenderError};
use roview::test_utils::{RecordingGraphics, write_sample_pdf};
use roview::viewer::{Command, FrameInput, Viewer, ViewerConfig, Viewport};
use tempfile::TempDir;

fn sample(pages: usize) -> (TempDir, DocumentRenderer) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.pdf");
    write_sample_pdf(&path, pages, 200, 300).unwrap();
    let doc = DocumentRenderer::open(&path).unwrap();
    (dir, doc)
}

#[test]
fn test_open_counts_pages() {
    let (_dir, doc) = sample(3);
    assert_eq!(doc.page_count(), 3);
    assert_eq!(doc.zoom().get(), 1.0);
    assert!(doc.path().ends_with("sample.pdf"));
}

#[test]
fn test_page_bounds_are_natural_size() {
    let (_dir, doc) = sample(2);
    let bounds = doc.page_bounds(1).unwrap();
    assert!((bounds.width - 200.0).abs() < 0.01);
    assert!((bounds.height - 300.0).abs() < 0.01);
}

#[test]
fn test_render_is_deterministic() {
    let (_dir, mut doc) = sample(2);
    doc.set_zoom(1.5);
    let first = doc.render_page(1).unwrap();
    let second = doc.render_page(1).unwrap();

    assert_eq!(first, second);
    assert!(first.is_consistent());
    assert!(first.stride >= first.width as usize * 3);
}

#[test]
fn test_render_size_follows_zoom() {
    let (_dir, mut doc) = sample(1);

    let natural = doc.render_page(0).unwrap();
    assert!((natural.width as i64 - 200).abs() <= 1);
    assert!((natural.height as i64 - 300).abs() <= 1);

    doc.set_zoom(2.0);
    let doubled = doc.render_page(0).unwrap();
    assert!((doubled.width as i64 - 400).abs() <= 1);
    assert!((doubled.height as i64 - 600).abs() <= 1);
}

#[test]
fn test_set_zoom_clamps() {
    let (_dir, mut doc) = sample(1);

    doc.set_zoom(0.05);
    assert_eq!(doc.zoom().get(), 0.1);
    doc.set_zoom(25.0);
    assert_eq!(doc.zoom().get(), 20.0);
    doc.set_zoom(5.0);
    assert_eq!(doc.zoom().get(), 5.0);
}

#[test]
fn test_render_fit_box_keeps_aspect_and_zoom() {
    let (_dir, mut doc) = sample(2);
    doc.set_zoom(2.0);

    let raster = doc.render_fit_box(1, 100, 100).unwrap();
    assert!((raster.width as i64 - 67).abs() <= 1);
    assert!((raster.height as i64 - 100).abs() <= 1);
    assert!(raster.is_consistent());
    assert_eq!(doc.zoom().get(), 2.0);

    assert!(doc.is_valid_page(1));
    assert!(!doc.is_valid_page(2));
    assert!(matches!(
        doc.render_fit_box(2, 100, 100),
        Err(RenderError::PageOutOfRange { index: 2, count: 2 })
    ));
}

#[test]
fn test_out_of_range_page_fails() {
    let (_dir, mut doc) = sample(2);

    assert!(matches!(
        doc.render_page(2),
        Err(RenderError::PageOutOfRange { index: 2, count: 2 })
    ));
    assert!(matches!(
        doc.page_bounds(usize::MAX),
        Err(RenderError::PageOutOfRange { .. })
    ));
}

#[test]
fn test_missing_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let result = DocumentRenderer::open(dir.path().join("missing.pdf"));
    assert!(matches!(result, Err(OpenError::NotFound { .. })));
}

#[test]
fn test_garbage_file_fails_to_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("garbage.pdf");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(b"this is not a document at all").unwrap();
    drop(file);

    let result = DocumentRenderer::open(&path);
    assert!(matches!(
        result,
        Err(OpenError::Engine { .. } | OpenError::NoPages { .. })
    ));
}

#[test]
fn test_zero_page_document_fails_to_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.pdf");
    write_sample_pdf(&path, 0, 200, 300).unwrap();

    let err = DocumentRenderer::open(&path).err().unwrap();
    assert!(matches!(
        err,
        OpenError::NoPages { .. } | OpenError::Engine { .. }
    ));
    assert!(err.to_string().contains("empty.pdf"));
}

#[test]
fn test_viewer_fits_real_page_to_width() {
    let (_dir, doc) = sample(3);
    let mut gfx = RecordingGraphics::new();
    let mut viewer = Viewer::start(
        doc,
        Viewport::new(800, 1200),
        ViewerConfig::default(),
        &mut gfx,
    );

    let surface = viewer.surface().unwrap();
    assert!((surface.width as i64 - 780).abs() <= 1);
    assert!((surface.height as i64 - 1170).abs() <= 2);

    viewer.update(&FrameInput::navigate(Command::NextPage), 1.0 / 60.0, &mut gfx);
    assert_eq!(viewer.current_page(), 1);
    assert!(viewer.page_rendered());

    viewer.update(&FrameInput::resize(Viewport::new(400, 1200)), 1.0 / 60.0, &mut gfx);
    let surface = viewer.surface().unwrap();
    assert!((surface.width as i64 - 380).abs() <= 1);

    viewer.shutdown(&mut gfx);
    assert_eq!(gfx.live_count(), 0);
    assert_eq!(gfx.invalid_destroys, 0);
}
