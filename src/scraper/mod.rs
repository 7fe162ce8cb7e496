pub mod csv_writer;
pub mod extractor;
pub mod fetcher;

pub use csv_writer::write_cards_csv_file;
pub use fetcher::CardListScraper;
