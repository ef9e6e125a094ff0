// src/core/transport/html.rs

use scraper::{Html, Selector};

/// A parsed HTML page exposing the handful of views the probes need.
pub struct Page {
    document: Html,
    raw: String,
}

impl Page {
    pub fn parse(body: &str) -> Self {
        Self {
            document: Html::parse_document(body),
            raw: body.to_string(),
        }
    }

    /// Visible text of the whole document, concatenated in document order.
    pub fn text(&self) -> String {
        self.document.root_element().text().collect()
    }

    /// Text content of every `<a>` element.
    pub fn link_texts(&self) -> Vec<String> {
        self.select_all("a", |el| Some(el.text().collect::<String>()))
    }

    /// `alt` attribute of every `<img>` element that has one.
    pub fn image_alts(&self) -> Vec<String> {
        self.select_all("img", |el| el.value().attr("alt").map(str::to_string))
    }

    /// The raw markup, as fetched.
    pub fn markup(&self) -> &str {
        &self.raw
    }

    fn select_all<F>(&self, selector: &str, extract: F) -> Vec<String>
    where
        F: Fn(scraper::ElementRef<'_>) -> Option<String>,
    {
        match Selector::parse(selector) {
            Ok(selector) => self.document.select(&selector).filter_map(extract).collect(),
            Err(_) => Vec::new(),
        }
    }
}
