//! End-to-end pipeline scenarios with the standard extensions.

use std::sync::{Arc, Mutex};

use notecast_extensions::standard_pipeline;
use notecast_pipeline::{
    Destination, Document, JobKind, NullImages, Pipeline, Rendered, Services,
};
use notecast_remote::{RemoteError, RenderQueue, RenderService};
use notecast_resources::{AmmoniaSanitizer, CardStore, ImageRegistry, Sanitize};

struct FakeService {
    calls: Arc<Mutex<Vec<String>>>,
}

impl RenderService for FakeService {
    fn render(&self, _kind: JobKind, source: &str) -> Result<String, RemoteError> {
        self.calls.lock().unwrap().push(source.to_owned());
        Ok(format!("<svg>{source}</svg>"))
    }
}

fn queue() -> (RenderQueue, Arc<Mutex<Vec<String>>>) {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let queue = RenderQueue::new(FakeService {
        calls: Arc::clone(&calls),
    });
    (queue, calls)
}

fn parse_rich(pipeline: &mut Pipeline, remote: &mut RenderQueue, text: &str) -> Rendered {
    let mut images = NullImages;
    let mut services = Services {
        remote,
        images: &mut images,
    };
    pipeline
        .parse(&Document::new("doc", text), Destination::RichHtml, &mut services)
        .expect("parse")
}

#[test]
fn scenario_basic_document() {
    let mut pipeline = standard_pipeline().unwrap();
    let (mut remote, calls) = queue();
    let rendered = parse_rich(&mut pipeline, &mut remote, "# Title\n\nSome *text*.");

    assert!(rendered.output.contains(">Title</h1>"));
    assert!(rendered.output.contains("<p>Some <em>text</em>.</p>"));
    assert_eq!(rendered.placeholders_allocated, 0);
    assert_eq!(rendered.placeholders_pending, 0);
    assert!(calls.lock().unwrap().is_empty());
    assert_eq!(rendered.title.as_deref(), Some("Title"));
}

#[test]
fn scenario_identical_formulas_share_one_request() {
    let mut pipeline = standard_pipeline().unwrap();
    let (mut remote, calls) = queue();
    let rendered = parse_rich(&mut pipeline, &mut remote, "First $x^2$ then $x^2$ again.");

    assert_eq!(rendered.placeholders_allocated, 2);
    assert_eq!(rendered.placeholders_pending, 0);
    assert_eq!(calls.lock().unwrap().len(), 1);
    assert_eq!(rendered.output.matches("<svg>x^2</svg>").count(), 2);
}

#[test]
fn scenario_shared_image_resolves_once() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("img")).unwrap();
    std::fs::write(dir.path().join("img/pic.png"), b"png-bytes").unwrap();

    struct CountingUploader(Mutex<usize>);
    impl notecast_resources::ImageUploader for CountingUploader {
        fn upload(
            &self,
            _data: &[u8],
            filename: &str,
            _token: &str,
        ) -> Result<String, notecast_resources::UploadError> {
            *self.0.lock().unwrap() += 1;
            Ok(format!("https://cdn.example.com/{filename}"))
        }
    }

    let mut pipeline = standard_pipeline().unwrap();
    let (mut remote, _) = queue();
    let mut registry = ImageRegistry::new(dir.path());
    let mut services = Services {
        remote: &mut remote,
        images: &mut registry,
    };
    let rendered = pipeline
        .parse(
            &Document::new("doc", "![a](./img/pic.png)\n\n![b](img/pic.png)"),
            Destination::RichHtml,
            &mut services,
        )
        .unwrap();

    assert_eq!(registry.len(), 1);

    let uploader = CountingUploader(Mutex::new(0));
    registry.upload_all(&uploader, "token");
    registry.upload_all(&uploader, "token");
    assert_eq!(*uploader.0.lock().unwrap(), 1);

    let mut html = rendered.output;
    registry.replace_all(&mut html);
    let url = registry.resolved_url("img/pic.png").unwrap();
    assert_eq!(html.matches(url).count(), 2);
    assert!(!html.contains(r#"src="img/pic.png""#));
}

#[test]
fn scenario_unrecognized_block_falls_back() {
    let mut pipeline = standard_pipeline().unwrap();
    let (mut remote, _) = queue();
    let rendered = parse_rich(
        &mut pipeline,
        &mut remote,
        "> [!mystery]\n> not a known box",
    );
    assert!(rendered.output.contains("<blockquote>"));
    assert!(rendered.output.contains("not a known box"));
}

#[test]
fn widget_round_trip_through_sanitizer() {
    let mut pipeline = standard_pipeline().unwrap();

    struct WidgetService;
    impl RenderService for WidgetService {
        fn render(&self, kind: JobKind, _source: &str) -> Result<String, RemoteError> {
            assert_eq!(kind, JobKind::Widget);
            // Markup a sanitizer would normally mangle.
            Ok(r#"<div data-chart="{&quot;a&quot;:1}" onclick="boot()">chart</div>"#.to_owned())
        }
    }

    let mut remote = RenderQueue::new(WidgetService);
    let mut images = NullImages;
    let mut services = Services {
        remote: &mut remote,
        images: &mut images,
    };
    let rendered = pipeline
        .parse(
            &Document::new("doc", "> [!widget]\n> {\"a\":1}"),
            Destination::RichHtml,
            &mut services,
        )
        .unwrap();

    let mut cards = CardStore::new();
    cards.capture(&rendered.output);
    assert_eq!(cards.len(), 1);

    let sanitizer = AmmoniaSanitizer::new();
    let mut sanitized = sanitizer.sanitize(&rendered.output);
    assert!(!sanitized.contains("onclick"));

    cards.restore(&mut sanitized);
    assert!(sanitized.contains(r#"onclick="boot()""#));
    assert!(sanitized.contains("data-chart"));
}

#[test]
fn heading_numbers_and_footnotes_are_ordered() {
    let mut pipeline = standard_pipeline().unwrap();
    let (mut remote, _) = queue();
    let rendered = parse_rich(
        &mut pipeline,
        &mut remote,
        "# T\n\n## One\n\nref[^z]\n\n## Two\n\nref[^a]\n\n[^z]: zed\n[^a]: ay\n",
    );
    let one = rendered.output.find(">01</span> One").unwrap();
    let two = rendered.output.find(">02</span> Two").unwrap();
    assert!(one < two);
    // Footnote indices follow reference order, not label order.
    let first = rendered.output.find("[1]").unwrap();
    let second = rendered.output.find("[2]").unwrap();
    assert!(first < second);
    assert!(rendered.output.contains("nc-footnotes"));
}

#[test]
fn plain_text_destination_uses_glyphs_and_strips_markup() {
    let mut pipeline = standard_pipeline().unwrap();
    let (mut remote, calls) = queue();
    let mut images = NullImages;
    let mut services = Services {
        remote: &mut remote,
        images: &mut images,
    };
    let rendered = pipeline
        .parse(
            &Document::new(
                "doc",
                "## Plan\n\n- alpha\n- beta\n\n1. one\n2. two\n\n<div>raw</div>\n\nmath $x^2$",
            ),
            Destination::PlainText,
            &mut services,
        )
        .unwrap();

    assert!(rendered.output.contains("❖ Plan"));
    assert!(rendered.output.contains("🔹 alpha"));
    assert!(rendered.output.contains("① one"));
    assert!(rendered.output.contains("② two"));
    assert!(rendered.output.contains("$x^2$"));
    assert!(!rendered.output.contains("<div>"));
    assert!(!rendered.output.contains("\n\n\n"));
    // Plain destinations never touch the remote endpoint.
    assert!(calls.lock().unwrap().is_empty());
}

#[test]
fn re_render_resets_session_counters() {
    let mut pipeline = standard_pipeline().unwrap();
    let (mut remote, _) = queue();
    let first = parse_rich(&mut pipeline, &mut remote, "## A\n\n## B");
    let second = parse_rich(&mut pipeline, &mut remote, "## C");
    assert!(first.output.contains(">01</span> A"));
    assert!(first.output.contains(">02</span> B"));
    // Counters restart per session.
    assert!(second.output.contains(">01</span> C"));
}

#[test]
fn external_links_become_references() {
    let mut pipeline = standard_pipeline().unwrap();
    let (mut remote, _) = queue();
    let rendered = parse_rich(
        &mut pipeline,
        &mut remote,
        "See [docs](https://docs.example.com) and [home](https://example.com).",
    );
    assert!(rendered.output.contains(r#"docs<sup class="nc-ref">[1]</sup>"#));
    assert!(rendered.output.contains(r#"home<sup class="nc-ref">[2]</sup>"#));
    assert!(rendered.output.contains("References"));
    assert!(rendered.output.contains("<li>https://docs.example.com</li>"));
}
