//! HTML output through the editor's builder contract

use serde::{Deserialize, Serialize};
use serde_json::Value;
use zebra_editor::{
    Builder, CellType, Children, Editor, EditorResult, HeaderType, ListItemKind, ListType,
    StoreData,
};

/// Options for HTML output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HtmlOptions {
    /// Pretty print HTML
    #[serde(default = "default_pretty")]
    pub pretty: bool,

    /// Indentation string
    #[serde(default = "default_indent")]
    pub indent: String,

    /// Wrap the article in a complete page
    #[serde(default)]
    pub full_document: bool,
}

fn default_pretty() -> bool {
    true
}

fn default_indent() -> String {
    "  ".to_string()
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            pretty: default_pretty(),
            indent: default_indent(),
            full_document: false,
        }
    }
}

/// Rendered element tree
#[derive(Debug, Clone, PartialEq)]
pub enum HtmlNode {
    Element {
        tag: &'static str,
        attributes: Vec<(String, String)>,
        children: Vec<HtmlNode>,
        block: bool,
    },
    Text(String),
}

impl HtmlNode {
    fn block(
        tag: &'static str,
        attributes: Vec<(String, String)>,
        children: Vec<HtmlNode>,
    ) -> Self {
        HtmlNode::Element {
            tag,
            attributes,
            children,
            block: true,
        }
    }

    fn inline(
        tag: &'static str,
        attributes: Vec<(String, String)>,
        children: Vec<HtmlNode>,
    ) -> Self {
        HtmlNode::Element {
            tag,
            attributes,
            children,
            block: false,
        }
    }

    fn is_block(&self) -> bool {
        matches!(self, HtmlNode::Element { block: true, .. })
    }
}

/// Builds `HtmlNode`s from components
#[derive(Debug, Default)]
pub struct HtmlBuilder;

/// `style` and `data` as element attributes
fn attributes(style: &StoreData, data: &StoreData) -> Vec<(String, String)> {
    let mut attributes = Vec::new();
    if !style.is_empty() {
        let css = style
            .iter()
            .map(|(key, value)| format!("{}: {}", kebab_case(key), value_text(value)))
            .collect::<Vec<_>>()
            .join("; ");
        attributes.push(("style".to_string(), css));
    }
    for (key, value) in data {
        attributes.push((format!("data-{}", kebab_case(key)), value_text(value)));
    }
    attributes
}

fn with_src(src: &str, style: &StoreData, data: &StoreData) -> Vec<(String, String)> {
    let mut attrs = vec![("src".to_string(), src.to_string())];
    attrs.extend(attributes(style, data));
    attrs
}

fn kebab_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl Builder for HtmlBuilder {
    type Output = HtmlNode;

    fn build_article(
        &self,
        _: &str,
        children: Children<'_, HtmlNode>,
        style: &StoreData,
        data: &StoreData,
    ) -> HtmlNode {
        HtmlNode::block("article", attributes(style, data), children())
    }

    fn build_customer_collection(
        &self,
        _: &str,
        tag: &str,
        children: Children<'_, HtmlNode>,
        style: &StoreData,
        data: &StoreData,
    ) -> HtmlNode {
        let mut attrs = vec![("data-type".to_string(), tag.to_string())];
        attrs.extend(attributes(style, data));
        HtmlNode::block("div", attrs, children())
    }

    fn build_table(
        &self,
        _: &str,
        children: Children<'_, HtmlNode>,
        style: &StoreData,
        data: &StoreData,
    ) -> HtmlNode {
        let body = HtmlNode::block("tbody", Vec::new(), children());
        HtmlNode::block("table", attributes(style, data), vec![body])
    }

    fn build_table_row(
        &self,
        _: &str,
        children: Children<'_, HtmlNode>,
        style: &StoreData,
        data: &StoreData,
    ) -> HtmlNode {
        HtmlNode::block("tr", attributes(style, data), children())
    }

    fn build_table_cell(
        &self,
        _: &str,
        cell_type: CellType,
        children: Children<'_, HtmlNode>,
        style: &StoreData,
        data: &StoreData,
    ) -> HtmlNode {
        HtmlNode::block(cell_type.as_str(), attributes(style, data), children())
    }

    fn build_list(
        &self,
        _: &str,
        list_type: ListType,
        children: Children<'_, HtmlNode>,
        style: &StoreData,
        data: &StoreData,
    ) -> HtmlNode {
        let mut attrs = attributes(style, data);
        let tag = match list_type {
            ListType::Ol => "ol",
            ListType::Ul => "ul",
            ListType::Nl => {
                attrs.push(("class".to_string(), "list-none".to_string()));
                "ul"
            }
        };
        HtmlNode::block(tag, attrs, children())
    }

    fn build_list_item(&self, item: HtmlNode, kind: ListItemKind) -> HtmlNode {
        let attrs = match kind {
            ListItemKind::Content => Vec::new(),
            ListItemKind::Nested => vec![("class".to_string(), "list-none".to_string())],
        };
        HtmlNode::block("li", attrs, vec![item])
    }

    fn build_paragraph(
        &self,
        _: &str,
        children: Children<'_, HtmlNode>,
        style: &StoreData,
        data: &StoreData,
    ) -> HtmlNode {
        HtmlNode::block("p", attributes(style, data), children())
    }

    fn build_header(
        &self,
        _: &str,
        header_type: HeaderType,
        children: Children<'_, HtmlNode>,
        style: &StoreData,
        data: &StoreData,
    ) -> HtmlNode {
        HtmlNode::block(header_type.as_str(), attributes(style, data), children())
    }

    fn build_code_block(
        &self,
        _: &str,
        content: &str,
        language: &str,
        style: &StoreData,
        data: &StoreData,
    ) -> HtmlNode {
        let mut code_attrs = Vec::new();
        if !language.is_empty() {
            code_attrs.push(("class".to_string(), format!("language-{}", language)));
        }
        let code = HtmlNode::inline("code", code_attrs, vec![HtmlNode::Text(content.to_string())]);
        HtmlNode::block("pre", attributes(style, data), vec![code])
    }

    fn build_image(&self, _: &str, src: &str, style: &StoreData, data: &StoreData) -> HtmlNode {
        let attrs = with_src(src, &StoreData::new(), &StoreData::new());
        let image = HtmlNode::inline("img", attrs, Vec::new());
        HtmlNode::block("figure", attributes(style, data), vec![image])
    }

    fn build_audio(&self, _: &str, src: &str, style: &StoreData, data: &StoreData) -> HtmlNode {
        let mut attrs = with_src(src, style, data);
        attrs.push(("controls".to_string(), String::new()));
        HtmlNode::block("audio", attrs, Vec::new())
    }

    fn build_video(&self, _: &str, src: &str, style: &StoreData, data: &StoreData) -> HtmlNode {
        let mut attrs = with_src(src, style, data);
        attrs.push(("controls".to_string(), String::new()));
        HtmlNode::block("video", attrs, Vec::new())
    }

    fn build_character_list(
        &self,
        _: &str,
        text: &str,
        style: &StoreData,
        data: &StoreData,
    ) -> HtmlNode {
        let text = HtmlNode::Text(text.to_string());
        if style.is_empty() && data.is_empty() {
            text
        } else {
            HtmlNode::inline("span", attributes(style, data), vec![text])
        }
    }

    fn build_inline_image(
        &self,
        _: &str,
        src: &str,
        style: &StoreData,
        data: &StoreData,
    ) -> HtmlNode {
        let mut attrs = with_src(src, style, data);
        attrs.push(("class".to_string(), "inline-image".to_string()));
        HtmlNode::inline("img", attrs, Vec::new())
    }
}

struct Context<'a> {
    options: &'a HtmlOptions,
    depth: usize,
    buffer: String,
}

impl<'a> Context<'a> {
    fn new(options: &'a HtmlOptions) -> Self {
        Self {
            options,
            depth: 0,
            buffer: String::new(),
        }
    }

    fn add(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn add_line(&mut self, text: &str) {
        if self.options.pretty {
            self.add_indent();
        }
        self.add(text);
        if self.options.pretty {
            self.add("\n");
        }
    }

    fn add_indent(&mut self) {
        for _ in 0..self.depth {
            self.buffer.push_str(&self.options.indent);
        }
    }

    fn indent(&mut self) {
        self.depth += 1;
    }

    fn dedent(&mut self) {
        if self.depth > 0 {
            self.depth -= 1;
        }
    }

    fn get_output(self) -> String {
        self.buffer
    }
}

fn is_void(tag: &str) -> bool {
    matches!(tag, "img")
}

fn open_tag(tag: &str, attributes: &[(String, String)]) -> String {
    let mut out = format!("<{}", tag);
    for (name, value) in attributes {
        if value.is_empty() && name == "controls" {
            out.push_str(&format!(" {}", name));
        } else {
            out.push_str(&format!(" {}=\"{}\"", name, escape(value)));
        }
    }
    out.push('>');
    out
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// A node and its subtree on one line
fn inline_html(node: &HtmlNode) -> String {
    match node {
        HtmlNode::Text(text) => escape(text),
        HtmlNode::Element {
            tag,
            attributes,
            children,
            ..
        } => {
            let mut out = open_tag(tag, attributes);
            if !is_void(tag) {
                for child in children {
                    out.push_str(&inline_html(child));
                }
                out.push_str(&format!("</{}>", tag));
            }
            out
        }
    }
}

fn write_node(node: &HtmlNode, ctx: &mut Context) {
    match node {
        HtmlNode::Element {
            tag,
            attributes,
            children,
            ..
        } if children.iter().any(HtmlNode::is_block) => {
            ctx.add_line(&open_tag(tag, attributes));
            ctx.indent();
            for child in children {
                write_node(child, ctx);
            }
            ctx.dedent();
            ctx.add_line(&format!("</{}>", tag));
        }
        _ => ctx.add_line(&inline_html(node)),
    }
}

/// Render the editor's article as HTML
pub fn render_html(editor: &Editor, options: &HtmlOptions) -> EditorResult<String> {
    let article = editor.render(&HtmlBuilder)?;
    let mut ctx = Context::new(options);

    if options.full_document {
        ctx.add_line("<!DOCTYPE html>");
        ctx.add_line("<html>");
        ctx.indent();
        ctx.add_line("<head>");
        ctx.indent();
        ctx.add_line("<meta charset=\"UTF-8\">");
        ctx.add_line(&format!(
            "<title>{}</title>",
            escape(&editor.config().document_name)
        ));
        ctx.dedent();
        ctx.add_line("</head>");
        ctx.add_line("<body>");
        ctx.indent();
        write_node(&article, &mut ctx);
        ctx.dedent();
        ctx.add_line("</body>");
        ctx.dedent();
        ctx.add_line("</html>");
    } else {
        write_node(&article, &mut ctx);
    }

    Ok(ctx.get_output())
}

#[cfg(test)]
mod tests {
    use super::*;
    use zebra_editor::EditorConfig;

    const DOC: &str = r#"{"type":"ARTICLE","children":[
        {"type":"TITLE","headerType":"h2","children":[{"type":"CHARACTER","content":"A & B"}]},
        {"type":"PARAGRAPH","style":{"textAlign":"center"},"children":[
            {"type":"CHARACTER","content":"x<y "},
            {"type":"CHARACTER","style":{"fontWeight":"bold"},"content":"bold"}
        ]},
        {"type":"LIST","listType":"ol","children":[
            {"type":"PARAGRAPH","children":[{"type":"CHARACTER","content":"one"}]}
        ]}
    ]}"#;

    fn html(options: &HtmlOptions) -> String {
        let editor = Editor::from_json(EditorConfig::default(), DOC).unwrap();
        render_html(&editor, options).unwrap()
    }

    #[test]
    fn test_pretty_output() {
        let output = html(&HtmlOptions::default());

        let expected = "<article>\n  <h2>A &amp; B</h2>\n  \
            <p style=\"text-align: center\">x&lt;y <span style=\"font-weight: bold\">bold</span></p>\n  \
            <ol>\n    <li>\n      <p>one</p>\n    </li>\n  </ol>\n</article>\n";
        assert_eq!(output, expected);
    }

    #[test]
    fn test_compact_output() {
        let options = HtmlOptions {
            pretty: false,
            ..HtmlOptions::default()
        };

        let output = html(&options);

        assert!(output.starts_with("<article><h2>A &amp; B</h2><p"));
        assert!(output.ends_with("<ol><li><p>one</p></li></ol></article>"));
    }

    #[test]
    fn test_full_document() {
        let options = HtmlOptions {
            full_document: true,
            ..HtmlOptions::default()
        };

        let output = html(&options);

        assert!(output.starts_with("<!DOCTYPE html>\n<html>\n"));
        assert!(output.contains("<title>untitled</title>"));
        assert!(output.contains("    <article>\n"));
    }

    #[test]
    fn test_table_and_media() {
        let doc = r#"{"type":"ARTICLE","children":[
            {"type":"MEDIA","mediaType":"video","src":"a.mp4"},
            {"type":"TABLE","col":1,"needHead":false,"children":[
                {"type":"TABLE_ROW","cellType":"td","children":[
                    {"type":"TABLE_CELL","cellType":"td","children":[{"type":"TABLE_ITEM","children":[{"type":"CHARACTER","content":"c"}]}]}
                ]}
            ]}
        ]}"#;
        let editor = Editor::from_json(EditorConfig::default(), doc).unwrap();
        let options = HtmlOptions {
            pretty: false,
            ..HtmlOptions::default()
        };

        let output = render_html(&editor, &options).unwrap();

        assert_eq!(
            output,
            "<article><video src=\"a.mp4\" controls></video>\
             <table><tbody><tr><td><p data-tag=\"p\">c</p></td></tr></tbody></table></article>"
        );
    }

    #[test]
    fn test_kebab_case() {
        assert_eq!(kebab_case("fontWeight"), "font-weight");
        assert_eq!(kebab_case("color"), "color");
    }
}
