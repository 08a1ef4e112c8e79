use std::sync::Arc;

use sumi::{
    Color, Error, FontSystem, Padding, RenderOptions, WarningKind, compose, compose_text_image,
    render_text_image, testing::BlockFont,
};

#[test]
fn test_markup_document_dimensions() {
    let font = BlockFont::new().with_font("yz.ttf");
    let text = "<f font=yz.ttf fs=40 fc=#ff0000>标题</f>\n正文 text\n\n<f fs=10>x</f> tail";
    let rendered = compose(text, &RenderOptions::default().with_padding(5), &font).unwrap();

    assert!(rendered.warnings.is_empty(), "{:?}", rendered.warnings);
    let line = BlockFont::line_height;
    // widest line: "正文 text" = 2*20 + 5*10
    assert_eq!(rendered.surface.width(), 90 + 10);
    assert_eq!(
        rendered.surface.height(),
        line(40) + line(20) * 3 + 10
    );
}

#[test]
fn test_styled_text_uses_its_color() {
    let font = BlockFont::new();
    let surface = compose_text_image(
        "<f fc=red>a</f>",
        &RenderOptions::default().with_background_color(Color::WHITE),
        &font,
    )
    .unwrap();

    // sole styled segment on the line, drawn over a white background
    let height = surface.height();
    assert_eq!(surface.pixel(0, height - 1), Some(Color::rgb(255, 0, 0)));
    assert_eq!(surface.pixel(0, 0), Some(Color::WHITE));
}

#[test]
fn test_malformed_markup_renders_literally() {
    let font = BlockFont::new();
    let text = "<f fs=30>never closed";
    let rendered = compose(text, &RenderOptions::default(), &font).unwrap();
    assert!(rendered.warnings.is_empty());
    assert_eq!(rendered.surface.width(), 10 * text.len() as u32);
    assert_eq!(rendered.surface.height(), BlockFont::line_height(20));
}

#[test]
fn test_warnings_do_not_abort_render() {
    let font = BlockFont::new().failing_on("boom");
    let rendered = compose(
        "<f fs=30>boom</f> fine\n<f font=missing.otf>ok</f>",
        &RenderOptions::default(),
        &font,
    )
    .unwrap();

    let kinds: Vec<_> = rendered.warnings.iter().map(|w| &w.kind).collect();
    assert!(matches!(kinds[0], WarningKind::Measure(_)));
    assert!(matches!(kinds[1], WarningKind::FontFallback(name) if name == "missing.otf"));
    assert!(rendered.surface.width() > 0);
}

#[test]
fn test_empty_font_system_yields_empty_canvas() {
    // without any face nothing can be measured
    let fonts = FontSystem::new();
    let err = compose_text_image("hello", &RenderOptions::default(), &fonts).unwrap_err();
    assert!(matches!(err, Error::EmptyCanvas { .. }));
}

#[test]
fn test_options_from_json() {
    let options: RenderOptions = serde_json::from_str(
        r##"{
            "font_size": 32,
            "background_color": "#00000000",
            "font_color": "(255, 0, 0)",
            "padding": [1, 2, 3, 4],
            "font": "yz.ttf"
        }"##,
    )
    .unwrap();

    assert!(options.auto_parse);
    assert_eq!(options.font_size, 32);
    assert_eq!(options.background_color, Color::rgba(0, 0, 0, 0));
    assert_eq!(options.font_color, Color::rgb(255, 0, 0));
    assert_eq!(options.padding, Padding::from([1, 2, 3, 4]));
    assert_eq!(options.font.as_deref(), Some("yz.ttf"));

    let uniform: RenderOptions = serde_json::from_str(r#"{"padding": 8}"#).unwrap();
    assert_eq!(uniform.padding, Padding::Uniform(8));
    assert_eq!(uniform.font_size, 20);

    assert!(serde_json::from_str::<RenderOptions>(r#"{"font_color": "nope"}"#).is_err());
}

#[test]
fn test_options_round_trip_through_json() {
    let options = RenderOptions::default()
        .with_padding((4, 3, 2, 1))
        .with_font_color(Color::rgb(1, 2, 3));
    let json = serde_json::to_string(&options).unwrap();
    let back: RenderOptions = serde_json::from_str(&json).unwrap();
    assert_eq!(back, options);
}

#[tokio::test]
async fn test_async_render_matches_sync() {
    let font = Arc::new(BlockFont::new());
    let options = RenderOptions::default().with_padding(2);
    let text = "a <f fs=30>b</f>\nc";

    let rendered = render_text_image(text, options.clone(), Arc::clone(&font))
        .await
        .unwrap();
    let expected = compose_text_image(text, &options, font.as_ref()).unwrap();
    assert_eq!(rendered.surface, expected);
}

#[tokio::test]
async fn test_concurrent_renders() {
    let font = Arc::new(BlockFont::new());
    let handles: Vec<_> = (1..=8)
        .map(|n| {
            let font = Arc::clone(&font);
            tokio::spawn(async move {
                let text = format!("<f fs={}>x</f>", n * 10);
                render_text_image(text, RenderOptions::default(), font).await
            })
        })
        .collect();

    for (n, handle) in (1..=8u32).zip(handles) {
        let rendered = handle.await.unwrap().unwrap();
        assert_eq!(rendered.surface.width(), (n * 10 / 2).max(1));
    }
}

#[test]
fn test_png_output() {
    let font = BlockFont::new();
    let surface = compose_text_image("png", &RenderOptions::default(), &font).unwrap();
    let uri = surface.to_base64().unwrap();
    assert!(uri.starts_with("base64://iVBOR"));
}
