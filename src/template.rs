//! Built-in HTML page for rendered flowcharts.
//!
//! Kept as a constant (like the prompts) so the page layout can be read and
//! changed in one place. Callers can supply their own page via
//! [`crate::pipeline::render::Template::new`]; it must contain
//! [`crate::pipeline::render::DIAGRAM_SLOT`] exactly once.

macro_rules! mermaid_cdn_url {
    () => {
        "https://cdn.jsdelivr.net/npm/mermaid@10/dist/mermaid.esm.min.mjs"
    };
}

/// Pinned Mermaid ES module loaded by the viewer.
pub const MERMAID_CDN_URL: &str = mermaid_cdn_url!();

/// Default page. The diagram source replaces `{{ diagram }}` inside the
/// `.mermaid` element.
pub const DEFAULT_TEMPLATE: &str = concat!(
    r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Mermaid Flowchart</title>
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Helvetica, Arial, sans-serif;
            margin: 0;
            padding: 20px;
            background-color: #ffffff;
        }
        h1 {
            text-align: center;
            color: #333;
            margin-bottom: 30px;
        }
        .mermaid {
            display: flex;
            justify-content: center;
            align-items: center;
            min-height: 80vh;
            font-size: 13px;
        }
        .mermaid .node rect,
        .mermaid .node circle,
        .mermaid .node ellipse,
        .mermaid .node polygon {
            fill: #f9f9f9;
            stroke: #999;
            stroke-width: 1px;
        }
        .mermaid .edgePath path {
            stroke: #666;
            stroke-width: 1px;
        }
        .flowchart-link {
            marker-end: none !important;
        }
        .mermaid .node .label {
            color: #333;
            font-size: 13px;
        }
    </style>
</head>
<body>
    <h1>Generated Mindmap</h1>
    <div class="mermaid">
{{ diagram }}
    </div>
    <script type="module">
        import mermaid from '"#,
    mermaid_cdn_url!(),
    r#"';
        mermaid.initialize({ startOnLoad: true });
    </script>
</body>
</html>
"#
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_references_pinned_cdn() {
        assert!(DEFAULT_TEMPLATE.contains(MERMAID_CDN_URL));
        assert_eq!(DEFAULT_TEMPLATE.matches("{{ diagram }}").count(), 1);
    }

    #[test]
    fn cdn_url_is_spliced_into_import() {
        let import = format!("import mermaid from '{MERMAID_CDN_URL}';");
        assert!(DEFAULT_TEMPLATE.contains(&import));
        assert_eq!(DEFAULT_TEMPLATE.matches("cdn.jsdelivr.net").count(), 1);
    }
}
