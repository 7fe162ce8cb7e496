pub mod collection_browser;
pub mod converter_panel;
pub mod copies_window;
pub mod import_panel;
pub mod menu_bar;
pub mod overview;
pub mod tabs;
