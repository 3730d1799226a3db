//! `ContentExtractor`: noise removal and HTML → {HTML, TEXT, MARKDOWN}.
//!
//! Shared between the static and dynamic fetch paths so both produce
//! identical output quality from the same rendered HTML.

use noetic_common::types::OutputFormat;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

const NOISE_SELECTORS: &[&str] = &[
    "nav", "header", "footer", "aside",
    ".advertisement", ".ad", ".ads", ".adsbygoogle", "[data-ad]", "[data-ad-slot]",
    ".cookie-banner", ".cookie-consent", ".popup", ".modal",
    ".share", ".social-share", ".social-widget",
    ".related-posts", ".related-articles",
    ".newsletter-signup", ".newsletter",
    ".comments", "#comments", ".comment-section",
    "script", "style", "noscript",
    "iframe[src*='ads']", "iframe[src*='doubleclick']",
];

const MAIN_SELECTORS: &[&str] = &["main", "article", "[role=main]", ".content", ".post-content", "#content"];

pub struct ExtractedPage {
    pub title: String,
    pub content: String,
    pub links: Vec<String>,
    pub images: Vec<String>,
    pub word_count: usize,
}

pub struct ContentExtractor;

impl ContentExtractor {
    #[must_use]
    pub fn extract(
        html: &str,
        base_url: &str,
        format: OutputFormat,
        include_links: bool,
        include_images: bool,
    ) -> ExtractedPage {
        let document = Html::parse_document(html);
        let title = extract_title(&document);

        let cleaned_html = strip_noise(html);
        let cleaned_document = Html::parse_document(&cleaned_html);
        let root = select_main_root(&cleaned_document);

        let base = Url::parse(base_url).ok();
        let content = match root {
            Some(root) => render(root, format, &base),
            None => cleaned_document.root_element().text().collect::<Vec<_>>().join(" "),
        };

        let links = if include_links { extract_links(&cleaned_document, base_url) } else { Vec::new() };
        let images = if include_images { extract_images(&cleaned_document, base_url) } else { Vec::new() };
        let word_count = count_words(&content);

        ExtractedPage { title, content, links, images, word_count }
    }
}

fn extract_title(document: &Html) -> String {
    let selector = Selector::parse("title").unwrap();
    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

/// Removes every noise element by serializing a filtered clone: `scraper`
/// has no in-place DOM mutation, so this reparses the document with a
/// html5ever-compatible walk that skips matched subtrees.
fn strip_noise(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut excluded: HashSet<ego_tree::NodeId> = HashSet::new();
    for selector_str in NOISE_SELECTORS {
        if let Ok(selector) = Selector::parse(selector_str) {
            for el in document.select(&selector) {
                excluded.insert(el.id());
            }
        }
    }
    render_excluding(document.root_element(), &excluded)
}

fn render_excluding(el: ElementRef, excluded: &HashSet<ego_tree::NodeId>) -> String {
    let mut out = String::new();
    render_excluding_into(el, excluded, &mut out);
    out
}

fn render_excluding_into(el: ElementRef, excluded: &HashSet<ego_tree::NodeId>, out: &mut String) {
    if excluded.contains(&el.id()) {
        return;
    }
    out.push('<');
    out.push_str(el.value().name());
    for (name, value) in el.value().attrs() {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&html_escape::encode_double_quoted_attribute(value));
        out.push('"');
    }
    out.push('>');
    for child in el.children() {
        if let Some(child_el) = ElementRef::wrap(child) {
            render_excluding_into(child_el, excluded, out);
        } else if let Some(text) = child.value().as_text() {
            out.push_str(text);
        }
    }
    out.push_str("</");
    out.push_str(el.value().name());
    out.push('>');
}

fn select_main_root(document: &Html) -> Option<ElementRef> {
    for selector_str in MAIN_SELECTORS {
        if let Ok(selector) = Selector::parse(selector_str) {
            if let Some(el) = document.select(&selector).next() {
                return Some(el);
            }
        }
    }
    let body_selector = Selector::parse("body").unwrap();
    document.select(&body_selector).next()
}

fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

fn extract_links(document: &Html, base_url: &str) -> Vec<String> {
    let selector = Selector::parse("a[href]").unwrap();
    let base = Url::parse(base_url).ok();
    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for el in document.select(&selector) {
        if let Some(href) = el.value().attr("href") {
            if let Some(abs) = resolve(&base, href) {
                if seen.insert(abs.clone()) {
                    links.push(abs);
                }
            }
        }
    }
    links
}

fn extract_images(document: &Html, base_url: &str) -> Vec<String> {
    let selector = Selector::parse("img[src]").unwrap();
    let base = Url::parse(base_url).ok();
    let mut seen = HashSet::new();
    let mut images = Vec::new();
    for el in document.select(&selector) {
        if let Some(src) = el.value().attr("src") {
            if let Some(abs) = resolve(&base, src) {
                if seen.insert(abs.clone()) {
                    images.push(abs);
                }
            }
        }
    }
    images
}

fn resolve(base: &Option<Url>, href: &str) -> Option<String> {
    match base {
        Some(base) => base.join(href).ok().map(|u| u.to_string()),
        None => Url::parse(href).ok().map(|u| u.to_string()),
    }
}

fn render(root: ElementRef, format: OutputFormat, base: &Option<Url>) -> String {
    match format {
        OutputFormat::Html => root.html(),
        OutputFormat::Text => root.text().collect::<Vec<_>>().join(" ").split_whitespace().collect::<Vec<_>>().join(" "),
        OutputFormat::Markdown => to_markdown(root, base),
    }
}

fn to_markdown(root: ElementRef, base: &Option<Url>) -> String {
    let mut out = String::new();
    block_to_markdown(root, &mut out, base);
    out.trim().to_string()
}

fn block_to_markdown(el: ElementRef, out: &mut String, base: &Option<Url>) {
    let tag = el.value().name();
    match tag {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = tag[1..].parse::<usize>().unwrap_or(1);
            out.push_str(&"#".repeat(level));
            out.push(' ');
            out.push_str(&inline_to_markdown(el, base));
            out.push_str("\n\n");
        }
        "p" => {
            out.push_str(&inline_to_markdown(el, base));
            out.push_str("\n\n");
        }
        "ul" => {
            for li in el.children().filter_map(ElementRef::wrap).filter(|c| c.value().name() == "li") {
                out.push_str("- ");
                out.push_str(&inline_to_markdown(li, base));
                out.push('\n');
            }
            out.push('\n');
        }
        "ol" => {
            for (i, li) in el.children().filter_map(ElementRef::wrap).filter(|c| c.value().name() == "li").enumerate() {
                out.push_str(&format!("{}. ", i + 1));
                out.push_str(&inline_to_markdown(li, base));
                out.push('\n');
            }
            out.push('\n');
        }
        "pre" | "code" => {
            let lang = el
                .children()
                .filter_map(ElementRef::wrap)
                .find_map(|c| guess_language(&c))
                .or_else(|| guess_language(&el))
                .unwrap_or_default();
            out.push_str("```");
            out.push_str(&lang);
            out.push('\n');
            out.push_str(&el.text().collect::<String>());
            out.push_str("\n```\n\n");
        }
        "blockquote" => {
            for line in inline_to_markdown(el, base).lines() {
                out.push_str("> ");
                out.push_str(line);
                out.push('\n');
            }
            out.push('\n');
        }
        "hr" => out.push_str("---\n\n"),
        "table" => {
            render_table(el, out, base);
        }
        "dl" => {
            for child in el.children().filter_map(ElementRef::wrap) {
                match child.value().name() {
                    "dt" => {
                        out.push_str("**");
                        out.push_str(&inline_to_markdown(child, base));
                        out.push_str("**\n");
                    }
                    "dd" => {
                        out.push_str(": ");
                        out.push_str(&inline_to_markdown(child, base));
                        out.push('\n');
                    }
                    _ => {}
                }
            }
            out.push('\n');
        }
        "div" | "section" => {
            for child in el.children().filter_map(ElementRef::wrap) {
                block_to_markdown(child, out, base);
            }
        }
        _ => {
            let text = el.text().collect::<String>();
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                out.push_str(trimmed);
                out.push_str("\n\n");
            }
        }
    }
}

fn guess_language(el: &ElementRef) -> Option<String> {
    el.value().attr("class").and_then(|class| {
        class.split_whitespace().find_map(|token| {
            token.strip_prefix("language-").or_else(|| token.strip_prefix("lang-")).map(str::to_string)
        })
    })
}

fn render_table(el: ElementRef, out: &mut String, base: &Option<Url>) {
    let rows: Vec<ElementRef> = el
        .select(&Selector::parse("tr").unwrap())
        .collect();
    let Some(header) = rows.first() else { return };
    let header_cells: Vec<String> = header.children().filter_map(ElementRef::wrap).map(|c| inline_to_markdown(c, base)).collect();
    if header_cells.is_empty() {
        return;
    }
    out.push_str("| ");
    out.push_str(&header_cells.join(" | "));
    out.push_str(" |\n|");
    out.push_str(&" --- |".repeat(header_cells.len()));
    out.push('\n');
    for row in &rows[1..] {
        let cells: Vec<String> = row.children().filter_map(ElementRef::wrap).map(|c| inline_to_markdown(c, base)).collect();
        if cells.is_empty() {
            continue;
        }
        out.push_str("| ");
        out.push_str(&cells.join(" | "));
        out.push_str(" |\n");
    }
    out.push('\n');
}

fn inline_to_markdown(el: ElementRef, base: &Option<Url>) -> String {
    let mut out = String::new();
    for child in el.children() {
        if let Some(child_el) = ElementRef::wrap(child) {
            match child_el.value().name() {
                "a" => {
                    let href = child_el.value().attr("href").unwrap_or_default();
                    let resolved = resolve(base, href).unwrap_or_else(|| href.to_string());
                    out.push('[');
                    out.push_str(&inline_to_markdown(child_el, base));
                    out.push_str("](");
                    out.push_str(&resolved);
                    out.push(')');
                }
                "strong" | "b" => {
                    out.push_str("**");
                    out.push_str(&inline_to_markdown(child_el, base));
                    out.push_str("**");
                }
                "em" | "i" => {
                    out.push('*');
                    out.push_str(&inline_to_markdown(child_el, base));
                    out.push('*');
                }
                "code" => {
                    out.push('`');
                    out.push_str(&child_el.text().collect::<String>());
                    out.push('`');
                }
                "br" => out.push('\n'),
                _ => out.push_str(&inline_to_markdown(child_el, base)),
            }
        } else if let Some(text) = child.value().as_text() {
            out.push_str(text);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_nav_and_ad_elements_before_extraction() {
        let html = r#"<html><body><nav>menu</nav><main><p>hello world</p></main><div class="ad">buy now</div></body></html>"#;
        let page = ContentExtractor::extract(html, "https://example.com", OutputFormat::Text, false, false);
        assert!(page.content.contains("hello world"));
        assert!(!page.content.contains("buy now"));
        assert!(!page.content.contains("menu"));
    }

    #[test]
    fn markdown_converts_headings_and_links() {
        let html = r#"<html><body><article><h1>Title</h1><p>See <a href="/x">link</a></p></article></body></html>"#;
        let page = ContentExtractor::extract(html, "https://example.com", OutputFormat::Markdown, false, false);
        assert!(page.content.starts_with("# Title"));
        assert!(page.content.contains("[link](https://example.com/x)"));
    }

    #[test]
    fn word_count_is_zero_for_blank_content() {
        let html = r#"<html><body><main></main></body></html>"#;
        let page = ContentExtractor::extract(html, "https://example.com", OutputFormat::Text, false, false);
        assert_eq!(page.word_count, 0);
    }

    #[test]
    fn links_and_images_are_absolute_and_deduplicated() {
        let html = r#"<html><body><main><a href="/a">a</a><a href="/a">dup</a><img src="/img.png"></main></body></html>"#;
        let page = ContentExtractor::extract(html, "https://example.com", OutputFormat::Text, true, true);
        assert_eq!(page.links, vec!["https://example.com/a".to_string()]);
        assert_eq!(page.images, vec!["https://example.com/img.png".to_string()]);
    }
}
