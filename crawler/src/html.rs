use lazy_static::lazy_static;
use scraper::{Html, Selector};
use url::Url;

lazy_static! {
    static ref ANCHOR: Selector = Selector::parse("a[href]").expect("valid selector");
}

/// Elements whose text never reaches the index.
const HIDDEN: &[&str] = &["head", "script", "style", "noscript", "svg", "template"];

/// Visible text of a page, with entities decoded and each text node separated by a space.
pub fn strip_tags(html: &str) -> String {
    let doc = Html::parse_document(html);
    let mut text = String::new();
    for node in doc.tree.root().descendants() {
        let Some(chunk) = node.value().as_text() else { continue };
        let hidden = node
            .ancestors()
            .any(|a| a.value().as_element().is_some_and(|e| HIDDEN.contains(&e.name())));
        if !hidden {
            text.push_str(chunk);
            text.push(' ');
        }
    }
    text
}

/// Absolute http(s) targets of every `<a href>` on the page, resolved against `base`,
/// without fragments, in document order.
pub fn list_links(base: &Url, html: &str) -> Vec<Url> {
    let doc = Html::parse_document(html);
    let mut links = Vec::new();
    for a in doc.select(&ANCHOR) {
        let Some(href) = a.value().attr("href") else { continue };
        let href = href.trim();
        if let Ok(mut u) = Url::parse(href).or_else(|_| base.join(href)) {
            if matches!(u.scheme(), "http" | "https") {
                u.set_fragment(None);
                links.push(u);
            }
        }
    }
    links
}
