//! CSS selectors for the contest table
//!
//! The contest page has exactly one layout: a `table.gridview` whose first
//! row is the column header and whose remaining rows each describe one event.

use lazy_static::lazy_static;
use scraper::Selector;

// Helper macro to parse selectors safely at compile time
macro_rules! parse_selector {
    ($s:expr) => {
        Selector::parse($s).expect(concat!("Invalid CSS selector: ", $s))
    };
}

lazy_static! {
    /// The event listing table
    pub static ref TABLE: Selector = parse_selector!("table.gridview");

    /// Rows of the listing table, header row included
    pub static ref ROW: Selector = parse_selector!("tr");

    /// Month header inside the first cell
    pub static ref MONTH: Selector = parse_selector!("span");

    /// Title link inside the title cell
    pub static ref ANCHOR: Selector = parse_selector!("a");

    /// Certificate icon inside the certificate cell
    pub static ref ICON: Selector = parse_selector!("img");

    /// Distance offerings inside the distance cell
    pub static ref DISTANCE_BUTTON: Selector = parse_selector!("button");
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn test_selectors_compile() {
        lazy_static::initialize(&TABLE);
        lazy_static::initialize(&ROW);
        lazy_static::initialize(&MONTH);
        lazy_static::initialize(&ANCHOR);
        lazy_static::initialize(&ICON);
        lazy_static::initialize(&DISTANCE_BUTTON);
    }

    #[test]
    fn test_table_selector_ignores_other_tables() {
        let html = r#"
            <table class="layout"><tr><td>menu</td></tr></table>
            <table class="gridview"><tr><th>月份</th></tr><tr><td>x</td></tr></table>
        "#;
        let doc = Html::parse_document(html);
        let tables: Vec<_> = doc.select(&TABLE).collect();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].select(&ROW).count(), 2);
    }
}
