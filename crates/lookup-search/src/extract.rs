//! Turns rendered pages into person records.
//!
//! Selectors come from a source definition and are compiled once per
//! backend. Extraction never fails: a fragment that lacks an id or a name is
//! dropped, and an unrecognizable document yields no records.

use crate::error::{Result, SearchError};
use lookup_core::{Person, SearchResult};
use lookup_sources::{DetailSelectors, ListingSelectors};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;
use tracing::debug;

/// Markers of a reCAPTCHA interstitial, checked on every page.
const CAPTCHA_MARKERS: &str =
    ".g-recaptcha, #recaptcha, iframe[src*='recaptcha'], script[src*='recaptcha']";

fn captcha_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse(CAPTCHA_MARKERS).expect("valid captcha selector"))
}

fn digits() -> &'static Regex {
    static DIGITS: OnceLock<Regex> = OnceLock::new();
    DIGITS.get_or_init(|| Regex::new(r"\d+").expect("valid regex"))
}

fn compile(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| SearchError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

fn compile_optional(selector: Option<&str>) -> Result<Option<Selector>> {
    selector.map(compile).transpose()
}

/// Whitespace-normalized text of the first match inside `scope`.
fn text_of(scope: &ElementRef, selector: &Selector) -> Option<String> {
    scope
        .select(selector)
        .next()
        .map(|el| el.text().collect::<Vec<_>>().join(" "))
        .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|text| !text.is_empty())
}

fn optional_text(scope: &ElementRef, selector: Option<&Selector>) -> String {
    selector
        .and_then(|sel| text_of(scope, sel))
        .unwrap_or_default()
}

/// Parse an age out of display text such as `"Age: 42"`.
///
/// Anything without a number, or with one too large to be an age, is `0`.
pub fn parse_age(text: &str) -> u32 {
    digits()
        .find(text)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// Derive a record id from a profile link: the last path segment, ignoring
/// any query string, fragment or trailing slash.
pub fn id_from_href(href: &str) -> Option<String> {
    let path = href.split(['?', '#']).next().unwrap_or_default();
    let segment = path.trim_end_matches('/').rsplit('/').next()?.trim();

    if segment.is_empty() || segment.contains(':') {
        None
    } else {
        Some(segment.to_string())
    }
}

/// What a listing page turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingPage {
    /// An anti-bot page was served instead of results
    Blocked,
    /// The site explicitly reported no matches
    NoResults,
    /// Records extracted from the page, possibly none
    Matches(SearchResult),
}

/// Extracts search result cards from a listing page.
#[derive(Debug)]
pub struct ListingExtractor {
    record: Selector,
    link: Selector,
    name: Selector,
    age: Option<Selector>,
    address: Option<Selector>,
    no_results: Option<Selector>,
    blocked: Option<Selector>,
}

impl ListingExtractor {
    pub fn new(selectors: &ListingSelectors) -> Result<Self> {
        Ok(Self {
            record: compile(&selectors.record)?,
            link: compile(&selectors.link)?,
            name: compile(&selectors.name)?,
            age: compile_optional(selectors.age.as_deref())?,
            address: compile_optional(selectors.address.as_deref())?,
            no_results: compile_optional(selectors.no_results.as_deref())?,
            blocked: compile_optional(selectors.blocked.as_deref())?,
        })
    }

    /// Classify the page and extract its records.
    pub fn interpret(&self, html: &str) -> ListingPage {
        let document = Html::parse_document(html);

        if is_blocked(&document, self.blocked.as_ref()) {
            return ListingPage::Blocked;
        }

        if let Some(no_results) = &self.no_results {
            if document.select(no_results).next().is_some() {
                return ListingPage::NoResults;
            }
        }

        let mut matches = Vec::new();
        let mut dropped = 0usize;

        for fragment in document.select(&self.record) {
            match self.extract_fragment(&fragment) {
                Some(person) => matches.push(person),
                None => dropped += 1,
            }
        }

        if dropped > 0 {
            debug!(kept = matches.len(), dropped, "dropped result fragments without id or name");
        }

        ListingPage::Matches(SearchResult::new(matches))
    }

    /// Extract every well-formed record; blocked or empty pages yield none.
    pub fn extract(&self, html: &str) -> SearchResult {
        match self.interpret(html) {
            ListingPage::Matches(result) => result,
            ListingPage::Blocked | ListingPage::NoResults => SearchResult::empty(),
        }
    }

    fn extract_fragment(&self, fragment: &ElementRef) -> Option<Person> {
        let id = fragment
            .select(&self.link)
            .find_map(|el| el.value().attr("href"))
            .and_then(id_from_href)?;
        let name = text_of(fragment, &self.name)?;

        let age = self
            .age
            .as_ref()
            .and_then(|sel| text_of(fragment, sel))
            .map_or(0, |text| parse_age(&text));

        Some(
            Person::new(id, name)
                .with_age(age)
                .with_address(optional_text(fragment, self.address.as_ref())),
        )
    }
}

/// What a detail page turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailPage {
    /// An anti-bot page was served instead of the record
    Blocked,
    /// The page does not look like a record (missing name)
    Missing,
    /// The record on the page
    Found(Person),
}

/// Extracts one person from a single-record page.
#[derive(Debug)]
pub struct DetailExtractor {
    name: Selector,
    age: Option<Selector>,
    address: Option<Selector>,
    phone: Option<Selector>,
    email: Option<Selector>,
    blocked: Option<Selector>,
}

impl DetailExtractor {
    pub fn new(selectors: &DetailSelectors) -> Result<Self> {
        Ok(Self {
            name: compile(&selectors.name)?,
            age: compile_optional(selectors.age.as_deref())?,
            address: compile_optional(selectors.address.as_deref())?,
            phone: compile_optional(selectors.phone.as_deref())?,
            email: compile_optional(selectors.email.as_deref())?,
            blocked: compile_optional(selectors.blocked.as_deref())?,
        })
    }

    /// Classify the page and extract the record, keyed by `known_id`.
    pub fn interpret(&self, html: &str, known_id: &str) -> DetailPage {
        let document = Html::parse_document(html);

        if is_blocked(&document, self.blocked.as_ref()) {
            return DetailPage::Blocked;
        }

        let root = document.root_element();
        let Some(name) = text_of(&root, &self.name) else {
            debug!(id = known_id, "detail page has no name, treating as missing");
            return DetailPage::Missing;
        };

        let age = self
            .age
            .as_ref()
            .and_then(|sel| text_of(&root, sel))
            .map_or(0, |text| parse_age(&text));

        DetailPage::Found(
            Person::new(known_id, name)
                .with_age(age)
                .with_address(optional_text(&root, self.address.as_ref()))
                .with_phone(optional_text(&root, self.phone.as_ref()))
                .with_email(optional_text(&root, self.email.as_ref())),
        )
    }

    /// Extract the record, or `None` if the page is not a valid detail page.
    pub fn extract(&self, html: &str, known_id: &str) -> Option<Person> {
        match self.interpret(html, known_id) {
            DetailPage::Found(person) => Some(person),
            DetailPage::Blocked | DetailPage::Missing => None,
        }
    }
}

fn is_blocked(document: &Html, blocked: Option<&Selector>) -> bool {
    if document.select(captcha_selector()).next().is_some() {
        return true;
    }
    blocked.is_some_and(|sel| document.select(sel).next().is_some())
}
