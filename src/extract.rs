//! Account page extraction
//!
//! Pulls balance, data usage and remaining data out of the account summary
//! page. Each field is extracted independently; a field whose markup is not
//! found is left as `None`.

use crate::schema::Reading;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::debug;

static BALANCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<b class="red" data-cs-mask>([\d,.]+)€</b>"#).expect("balance regex")
});

static SIZE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+[.,]?\d*)\s?(KB|MB|GB|TB)").expect("size regex"));

const USAGE_SELECTOR: &str = "span.red";
const REMAINING_VALUE_SELECTOR: &str = "span.big.red";
const REMAINING_UNIT_SELECTOR: &str = "span.small.red";

/// Parse the raw account page into a `Reading`
pub fn parse(html: &str) -> Reading {
    let doc = Html::parse_document(html);

    let balance = extract_balance(html);
    let (data_usage, data_usage_unit) = extract_usage(&doc).unzip();
    let remaining_data = select_text(&doc, REMAINING_VALUE_SELECTOR).map(|v| v.replace(',', "."));
    let remaining_data_unit = select_text(&doc, REMAINING_UNIT_SELECTOR);

    let reading = Reading {
        balance,
        data_usage,
        data_usage_unit,
        remaining_data,
        remaining_data_unit,
    };
    log_gaps(&reading);
    reading
}

/// Balance as published, e.g. "12,34" (no separator normalization)
fn extract_balance(html: &str) -> Option<String> {
    BALANCE_RE.captures(html).map(|c| c[1].to_string())
}

/// First `span.red` whose text looks like "<number> <unit>"
fn extract_usage(doc: &Html) -> Option<(String, String)> {
    let selector = Selector::parse(USAGE_SELECTOR).ok()?;
    doc.select(&selector).find_map(|el| {
        let text = element_text(&el);
        SIZE_RE
            .captures(&text)
            .map(|c| (c[1].replace(',', "."), c[2].to_string()))
    })
}

fn select_text(doc: &Html, sel: &str) -> Option<String> {
    let selector = Selector::parse(sel).ok()?;
    doc.select(&selector)
        .next()
        .map(|el| element_text(&el).trim().to_string())
}

fn element_text(el: &ElementRef<'_>) -> String {
    el.text().collect::<String>()
}

fn log_gaps(reading: &Reading) {
    let fields = [
        ("balance", reading.balance.is_none()),
        ("data_usage", reading.data_usage.is_none()),
        ("remaining_data", reading.remaining_data.is_none()),
        ("remaining_data_unit", reading.remaining_data_unit.is_none()),
    ];
    for (field, missing) in fields {
        if missing {
            debug!(field, "pattern not found on account page");
        }
    }
}
