use scraper::{ElementRef, Html, Selector};

use crate::record::ProductDraft;

/// Image attributes tried in order; the first non-empty one wins.
/// Whitespace-only values count as present.
/// Lazy-loading pages keep a placeholder in `src`, so `data-src` goes first.
pub const IMAGE_URL_ATTRS: &[&str] = &["data-src", "src"];

/// Select every element matching `selector`, in document order.
///
/// A selector that fails to parse matches nothing.
pub fn select_products<'a>(document: &'a Html, selector: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(selector) {
        Ok(selector) => document.select(&selector).collect(),
        Err(e) => {
            log::warn!("Invalid selector '{}': {}", selector, e);
            Vec::new()
        }
    }
}

/// The node's own `href`, verbatim.
pub fn derive_title(node: &ElementRef) -> Option<String> {
    node.value().attr("href").map(str::to_string)
}

/// URL of the first `<img>` below the node.
pub fn derive_image_url(node: &ElementRef) -> Option<String> {
    let img_selector = Selector::parse("img").ok()?;
    let img = node.select(&img_selector).next()?;

    IMAGE_URL_ATTRS
        .iter()
        .filter_map(|attr| img.value().attr(attr))
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// Parse `html` and turn every match of `selector` into a draft.
///
/// The parsed document does not outlive this call, so callers are free to
/// await between parsing and probing.
pub fn extract_drafts(html: &str, selector: &str) -> Vec<ProductDraft> {
    let document = Html::parse_document(html);
    let nodes = select_products(&document, selector);
    log::debug!("Selector '{}' matched {} node(s)", selector, nodes.len());

    nodes
        .iter()
        .map(|node| ProductDraft {
            title: derive_title(node),
            image_url: derive_image_url(node),
        })
        .collect()
}
