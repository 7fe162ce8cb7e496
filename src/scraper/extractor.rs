use itertools::Itertools;
use lazy_static::lazy_static;
use log::{debug, info, warn};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use strum_macros::Display;

use crate::cards::card_record::CardRecord;
use crate::cards::cardnumber::CardNumber;
use crate::cards::rarity::looks_like_rarity;
use crate::utilities::constants::{
    MAX_RARITIES_PER_CARD, NAME_NOT_FOUND, RARITY_NOT_FOUND, RARITY_TRUNCATION_MARKER,
};
use crate::utilities::string_manipulators::{collapse_whitespace, strip_quotes};

lazy_static! {
    static ref TABLE_BODY: Selector = Selector::parse("tbody").unwrap();
    static ref ROW: Selector = Selector::parse("tr").unwrap();
    static ref CELL: Selector = Selector::parse("td").unwrap();
    static ref LANG_SPAN: Selector = Selector::parse("span[lang]").unwrap();
    static ref WITH_TITLE: Selector = Selector::parse("[title]").unwrap();
    static ref WITH_ALT: Selector = Selector::parse("[alt]").unwrap();
}

/// A regex whose first capture group is the card number.
struct NumberStrategy {
    name: &'static str,
    pattern: Regex,
}

impl NumberStrategy {
    fn new(name: &'static str, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            name,
            pattern: Regex::new(pattern)?,
        })
    }

    fn find(&self, row_html: &str) -> Option<String> {
        self.pattern
            .captures(row_html)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }
}

#[derive(Debug, Clone, Copy, Display)]
enum NameStrategy {
    #[strum(serialize = "lang-span")]
    LangSpan,
    #[strum(serialize = "quoted-cell")]
    QuotedCell,
}

#[derive(Debug, Clone, Copy, Display)]
enum RarityStrategy {
    #[strum(serialize = "title-attribute")]
    TitleAttribute,
    #[strum(serialize = "alt-attribute")]
    AltAttribute,
    #[strum(serialize = "cell-text")]
    CellText,
}

const NAME_STRATEGIES: [NameStrategy; 2] = [NameStrategy::LangSpan, NameStrategy::QuotedCell];
const RARITY_STRATEGIES: [RarityStrategy; 3] = [
    RarityStrategy::TitleAttribute,
    RarityStrategy::AltAttribute,
    RarityStrategy::CellText,
];

/// Pulls card records out of a wiki set card list page.
///
/// Card numbers are matched against the row markup, loosest pattern last; the
/// first strategy that matches wins. Names prefer the localized `<span lang>`
/// over a quoted plain cell. Every rarity strategy contributes, duplicates are
/// dropped in first-seen order.
pub struct CardExtractor {
    code_in_markup: Regex,
    number_strategies: Vec<NumberStrategy>,
    language: String,
}

impl CardExtractor {
    /// `region` is the region part of card numbers, `FR` in `RA02-FR001`.
    pub fn new(region: &str) -> Result<Self, regex::Error> {
        let region = region.trim().to_uppercase();
        let escaped = regex::escape(&region);

        let number_strategies = vec![
            NumberStrategy::new(
                "card-link",
                &format!(r#"<a href="[^"]*?([A-Z0-9]{{4}}-{}\d+)""#, escaped),
            )?,
            NumberStrategy::new(
                "title-attribute",
                &format!(r#"title="([A-Z0-9]{{4}}-{}\d+)""#, escaped),
            )?,
            NumberStrategy::new(
                "bare-code",
                &format!(r"\b([A-Z0-9]{{2,5}}-{}\d{{2,4}})\b", escaped),
            )?,
        ];

        Ok(Self {
            code_in_markup: Regex::new(&format!(r"[A-Z0-9]{{2,5}}-{}\d+", escaped))?,
            number_strategies,
            language: region.to_lowercase(),
        })
    }

    pub fn extract_cards(&self, html: &str) -> Vec<CardRecord> {
        let document = Html::parse_document(html);
        let cards: Vec<CardRecord> = self
            .card_rows(&document)
            .into_iter()
            .filter_map(|row| self.extract_row(row))
            .collect();
        info!("{} cards extracted", cards.len());
        cards
    }

    /// Rows of the first table body mentioning a card code, or every row that
    /// mentions one when no such body exists.
    fn card_rows<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        if let Some(body) = document
            .select(&TABLE_BODY)
            .find(|body| self.code_in_markup.is_match(&body.html()))
        {
            return body
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|child| child.value().name() == "tr")
                .collect();
        }

        warn!("No card table found, scanning every row of the page");
        document
            .select(&ROW)
            .filter(|row| self.code_in_markup.is_match(&row.html()))
            .collect()
    }

    fn extract_row(&self, row: ElementRef) -> Option<CardRecord> {
        let row_html = row.html();
        let (strategy, raw_number) = self
            .number_strategies
            .iter()
            .find_map(|strategy| strategy.find(&row_html).map(|n| (strategy.name, n)))?;

        let number = match CardNumber::new(&raw_number) {
            Ok(number) => number,
            Err(e) => {
                warn!("Skipping row: {}", e);
                return None;
            }
        };
        debug!("{} matched by {}", number, strategy);

        let name = NAME_STRATEGIES
            .iter()
            .find_map(|strategy| self.name_with(*strategy, row))
            .unwrap_or_else(|| NAME_NOT_FOUND.to_string());

        Some(CardRecord::new(number, name, self.rarities(row)))
    }

    fn name_with(&self, strategy: NameStrategy, row: ElementRef) -> Option<String> {
        let name = match strategy {
            NameStrategy::LangSpan => row
                .select(&LANG_SPAN)
                .find(|span| {
                    span.value()
                        .attr("lang")
                        .map(|lang| lang.eq_ignore_ascii_case(&self.language))
                        .unwrap_or(false)
                })
                .map(|span| {
                    let text = collapse_whitespace(&span.text().collect::<String>());
                    strip_quotes(&text).to_string()
                }),
            NameStrategy::QuotedCell => {
                // Only cells holding nothing but text, like "<td>"Name"</td>".
                let plain_cells: Vec<String> = row
                    .select(&CELL)
                    .filter(|cell| cell.children().all(|child| child.value().is_text()))
                    .map(|cell| cell.text().collect::<String>().trim().to_string())
                    .collect();
                plain_cells
                    .get(1)
                    .filter(|text| text.len() >= 2 && text.starts_with('"') && text.ends_with('"'))
                    .map(|text| text[1..text.len() - 1].trim().to_string())
            }
        }?;

        if name.is_empty() {
            return None;
        }
        debug!("name {:?} matched by {}", name, strategy);
        Some(name)
    }

    fn rarities(&self, row: ElementRef) -> Vec<String> {
        let mut rarities: Vec<String> = RARITY_STRATEGIES
            .iter()
            .flat_map(|strategy| rarities_with(*strategy, row))
            .unique()
            .collect();

        if rarities.is_empty() {
            return vec![RARITY_NOT_FOUND.to_string()];
        }
        if rarities.len() > MAX_RARITIES_PER_CARD {
            rarities.truncate(MAX_RARITIES_PER_CARD);
            rarities.push(RARITY_TRUNCATION_MARKER.to_string());
        }
        rarities
    }
}

fn rarities_with(strategy: RarityStrategy, row: ElementRef) -> Vec<String> {
    let candidates: Vec<&str> = match strategy {
        RarityStrategy::TitleAttribute => row
            .select(&WITH_TITLE)
            .filter_map(|element| element.value().attr("title"))
            .collect(),
        RarityStrategy::AltAttribute => row
            .select(&WITH_ALT)
            .filter_map(|element| element.value().attr("alt"))
            .collect(),
        // Quoted text is a card name, never a rarity.
        RarityStrategy::CellText => row.text().filter(|text| !text.trim().starts_with('"')).collect(),
    };

    candidates
        .into_iter()
        .map(collapse_whitespace)
        .filter(|candidate| !candidate.is_empty() && looks_like_rarity(candidate))
        .collect()
}
