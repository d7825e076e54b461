use super::ui;
use crate::core::converter::CurrencyConverter;
use crate::core::currency::CurrencyInfo;
use comfy_table::Cell;

fn currencies_table(currencies: &[CurrencyInfo]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell(""),
        ui::header_cell("Code"),
        ui::header_cell("Name"),
        ui::header_cell("Symbol"),
    ]);
    for info in currencies {
        table.add_row(vec![
            Cell::new(info.flag.as_deref().unwrap_or("")),
            Cell::new(&info.code),
            Cell::new(&info.name),
            Cell::new(&info.symbol),
        ]);
    }
    table.to_string()
}

/// Prints matches for `query`, or the popular and full sections when there is none.
pub fn search(converter: &CurrencyConverter, query: Option<&str>) {
    match query {
        Some(query) => {
            let found = converter.search_currencies(query);
            if found.is_empty() {
                println!(
                    "{}",
                    ui::style_text(&format!("No currency matches '{query}'"), ui::StyleType::Subtle)
                );
            } else {
                println!("{}", currencies_table(&found));
            }
        }
        None => {
            let sections = converter.get_currency_sections();
            println!("{}\n", ui::style_text("Popular", ui::StyleType::Title));
            println!("{}", currencies_table(&sections.popular));
            println!("\n{}\n", ui::style_text("All currencies", ui::StyleType::Title));
            println!("{}", currencies_table(&sections.all));
        }
    }
}

pub async fn convert(converter: &CurrencyConverter, amount: f64, from: &str, to: &str) {
    let converted = converter.convert(amount, from, to).await;
    let symbol = converter
        .get_currency_info(to)
        .map_or_else(|| to.to_ascii_uppercase(), |info| info.symbol);
    println!(
        "{amount:.2} {} = {}",
        from.to_ascii_uppercase(),
        ui::style_text(&format!("{symbol}{converted:.2}"), ui::StyleType::TotalValue)
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::currency::CurrencyCatalog;

    #[test]
    fn test_currencies_table_shows_codes() {
        let catalog = CurrencyCatalog::built_in();
        let output = currencies_table(&catalog.search("krona"));
        assert!(output.contains("SEK"));
        assert!(output.contains("ISK"));
        assert!(!output.contains("USD"));
    }
}
