pub mod test_font;
